//! Criterion benchmarks for maze generation and Q-learning.
//!
//! Run with:
//!   cargo bench
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::SeedableRng;

use qmaze::{Cell, MazeGraph, QLearningSolver, TrainingConfig};

fn make_maze(side: usize, seed: u64) -> MazeGraph {
    let mut maze = MazeGraph::generate_seeded(side, side, seed).expect("positive dimensions");
    maze.set_end(Cell::new(side - 1, side - 1))
        .expect("goal inside the maze");
    maze
}

/// Benchmark generate() with varying grid sizes.
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for side in [8usize, 32, 128].iter() {
        group.throughput(Throughput::Elements((side * side) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(side), side, |b, &side| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| {
                let maze = MazeGraph::generate(side, side, &mut rng).expect("positive dimensions");
                black_box(maze.edges().len())
            });
        });
    }

    group.finish();
}

/// Benchmark a full train-to-convergence run on small mazes.
fn bench_train(c: &mut Criterion) {
    let mut group = c.benchmark_group("train");
    group.sample_size(20);

    let config = TrainingConfig::default();
    for side in [3usize, 5, 8].iter() {
        let maze = make_maze(*side, 7);
        group.bench_with_input(BenchmarkId::from_parameter(side), side, |b, _| {
            let mut rng = StdRng::seed_from_u64(42);
            b.iter(|| {
                let mut solver = QLearningSolver::from_maze(&maze)
                    .expect("maze fits the solver")
                    .expect("goal is set");
                let outcome = solver.train(&config, &mut rng).expect("valid config");
                black_box(outcome.epochs())
            });
        });
    }

    group.finish();
}

/// Benchmark greedy path extraction on a trained solver.
fn bench_solve(c: &mut Criterion) {
    let maze = make_maze(8, 7);
    let mut solver = QLearningSolver::from_maze(&maze)
        .expect("maze fits the solver")
        .expect("goal is set");
    let mut rng = StdRng::seed_from_u64(1);
    solver
        .train(&TrainingConfig::default(), &mut rng)
        .expect("valid config");

    c.bench_function("solve_8x8", |b| {
        b.iter(|| black_box(solver.solve(Cell::new(0, 0)).len()));
    });
}

criterion_group!(benches, bench_generate, bench_train, bench_solve);
criterion_main!(benches);
