use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use search_grader::runner::{self, Mode, RunConfig};
use search_grader::solve::{PushOrder, Reference};
use search_grader::Budget;
use tracing_subscriber::EnvFilter;

/// Grade search algorithms against gold solution files, or author them.
#[derive(Parser)]
#[command(name = "search-grader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding `.test` files and their `.solution` files
    dir: PathBuf,

    /// Write `.solution` files with the reference suite instead of grading
    #[arg(long)]
    generate: bool,

    /// Run the reference suite with reverse push order
    #[arg(long)]
    reverse: bool,

    /// Only run cases whose file name contains this
    #[arg(long)]
    filter: Option<String>,

    /// Maximum expansions per problem
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Wall-clock limit per problem, in seconds
    #[arg(long, default_value_t = 60.0)]
    time_limit: f64,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(self) -> Result<RunConfig> {
        anyhow::ensure!(
            self.time_limit.is_finite() && self.time_limit > 0.0,
            "time limit must be a positive number of seconds"
        );
        Ok(RunConfig {
            dir: self.dir,
            mode: if self.generate {
                Mode::Generate
            } else {
                Mode::Grade
            },
            push_order: if self.reverse {
                PushOrder::Reverse
            } else {
                PushOrder::Forward
            },
            filter: self.filter,
            budget: Budget {
                max_expansions: self.max_expansions,
                time_limit: Some(Duration::from_secs_f64(self.time_limit)),
            },
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if cli.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.config().and_then(|config| run(&config)) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &RunConfig) -> Result<bool> {
    match config.mode {
        Mode::Generate => {
            let count = runner::generate(config)?;
            println!("Wrote {count} solution files");
            Ok(true)
        }
        Mode::Grade => {
            let summary = runner::grade(config, &Reference::new(config.push_order))?;
            println!("{summary}");
            Ok(summary.all_passed())
        }
    }
}
