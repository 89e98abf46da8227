//! Headless front end for qmaze.
//!
//! Generates a maze, trains a Q-learning agent towards the goal and prints
//! the greedy path it learned.
//!
//! Examples:
//!   qmaze --rows 8 --cols 8 --seed 42
//!   qmaze --start 0,0 --goal 5,3 --gamma 0.9
//!   qmaze --config maze.json --json
//!
//! Settings are read from `--config`, else from `<config dir>/qmaze/config.json`
//! if present; flags override the file. Ctrl-C stops training after the
//! current epoch. Set `RUST_LOG=debug` for per-epoch progress.

mod config;
mod error;
mod paths;
mod render;
mod report;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use qmaze::Cell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use config::{parse_cell, ShellConfig};
use error::CliError;
use paths::AppPaths;
use report::{outcome_name, Report};
use session::Session;

#[derive(Parser, Debug)]
#[command(name = "qmaze")]
#[command(about = "Generate a perfect maze and solve it with Q-learning", long_about = None)]
struct Args {
    /// Number of maze rows
    #[arg(long)]
    rows: Option<usize>,

    /// Number of maze columns
    #[arg(long)]
    cols: Option<usize>,

    /// RNG seed for both generation and training (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Start cell as ROW,COL (defaults to the top-left cell)
    #[arg(long, value_parser = parse_cell)]
    start: Option<Cell>,

    /// Goal cell as ROW,COL (defaults to the bottom-right cell)
    #[arg(long, value_parser = parse_cell)]
    goal: Option<Cell>,

    /// Discount factor, in [0, 1]
    #[arg(long)]
    gamma: Option<f64>,

    /// Stop once the total Q change over an epoch is below this
    #[arg(long)]
    min_change: Option<f64>,

    /// Random-walk episodes per epoch
    #[arg(long)]
    episodes_per_epoch: Option<usize>,

    /// Give up after this many epochs
    #[arg(long)]
    max_epochs: Option<usize>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a JSON report instead of the drawing
    #[arg(long)]
    json: bool,
}

impl Args {
    fn apply(&self, config: &mut ShellConfig) {
        if let Some(rows) = self.rows {
            config.maze.rows = rows;
        }
        if let Some(cols) = self.cols {
            config.maze.cols = cols;
        }
        if self.seed.is_some() {
            config.maze.seed = self.seed;
        }
        if self.start.is_some() {
            config.start = self.start;
        }
        if self.goal.is_some() {
            config.goal = self.goal;
        }
        if let Some(gamma) = self.gamma {
            config.training.gamma = gamma;
        }
        if let Some(min_change) = self.min_change {
            config.training.min_change_per_epoch = min_change;
        }
        if let Some(episodes) = self.episodes_per_epoch {
            config.training.episodes_per_epoch = episodes;
        }
        if self.max_epochs.is_some() {
            config.training.max_epochs = self.max_epochs;
        }
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    run_with_paths(args, &AppPaths::new()).await
}

async fn run_with_paths(args: Args, paths: &AppPaths) -> Result<(), CliError> {
    debug!("Config directory: {:?}", paths.config_dir());

    let mut config = ShellConfig::load(args.config.as_deref(), paths)?;
    args.apply(&mut config);

    let seed = config.maze.seed.unwrap_or_else(rand::random);
    info!("Seed: {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut session = Session::new();
    session.generate_maze(config.maze.rows, config.maze.cols, &mut rng)?;
    let (start, goal) = (config.start_cell(), config.goal_cell());
    session.set_start(start)?;
    session.set_end(goal)?;

    // Ctrl-C only raises the flag; the training thread checks it between epochs.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Ctrl-C: stopping training after the current epoch");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let training = config.training.clone();
    let (mut session, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = session.train(&training, &mut rng, &cancel);
        (session, outcome)
    })
    .await?;
    let outcome = outcome?;
    debug!("Agent status: {:?}", session.solver().status());
    info!(
        "Training {} after {} epochs",
        outcome_name(&outcome),
        outcome.epochs()
    );

    match session.run_agent() {
        Ok(path) => info!("Path from {} has {} cells", start, path.len()),
        Err(CliError::NotTrained) => warn!("Agent is not trained; no path to show"),
        Err(e) => return Err(e),
    }

    let maze = session.maze().ok_or(CliError::MazeNotGenerated)?;
    let report = Report::new(maze, seed, start, goal, &outcome);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render::render(maze));
        println!(
            "seed={} outcome={} epochs={} path_len={} reached_goal={} shortest={}",
            report.seed,
            report.outcome,
            report.epochs,
            report.path.len(),
            report.reached_goal,
            report.shortest,
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging; RUST_LOG overrides the default level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
