//! pytest-launch - Adaptive pytest launcher
//!
//! Collects the test count for a selection, picks a worker count with a
//! fixed threshold heuristic, and runs pytest as a validated child process
//! with a pinned working directory and hard timeouts.
//!
//! ## Usage
//!
//! ```bash
//! # Run the whole suite
//! pytest-launch
//!
//! # Run one directory with extra pytest flags
//! pytest-launch tests/api -- -x --maxfail=3
//!
//! # Show the plan without running anything
//! pytest-launch tests --dry-run --format json
//! ```
//!
//! Exit codes: pytest's own exit code passes through verbatim; exit code 70
//! is reserved for launcher failures (collection failure, validation
//! rejection, timeout, spawn failure). On SIGTERM or SIGINT the in-flight
//! child is killed and the launcher exits 143 or 130.

use clap::Parser;
use tracing::info;

mod cli;
mod collector;
mod config;
mod error;
mod invoker;
mod models;
mod policy;
mod proc;
mod utils;

use cli::Args;
use collector::TestCollector;
use config::LaunchConfig;
use error::LaunchError;
use invoker::Invoker;
use models::ExecutionPlan;
use policy::select_workers;
use utils::logger::init_logger;
use utils::timer::Timer;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.verbose);

    match run(args).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("pytest-launch: error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(args: Args) -> Result<i32, LaunchError> {
    let project_root = std::fs::canonicalize(&args.project_root).map_err(|e| {
        LaunchError::Validation(format!(
            "project root '{}': {e}",
            args.project_root.display()
        ))
    })?;

    let config = LaunchConfig::new(project_root)
        .collect_timeout(args.collect_timeout)
        .run_timeout(args.run_timeout);

    let invoker = Invoker::new(config.clone());

    // Reject bad arguments before any subprocess runs
    invoker.validate(&args.selection)?;
    invoker.validate(&args.runner_args)?;

    let timer = Timer::start("collection");
    let collector = TestCollector::new(config.clone());
    let test_count = collector.collect(&args.selection).await?;
    timer.stop();

    let workers = select_workers(test_count, config.max_workers, config.threshold());
    info!("Collected {} test(s), using {} worker(s)", test_count, workers);

    let plan = ExecutionPlan::build(&config, &args.selection, &args.runner_args, workers);

    if args.dry_run {
        match args.format.as_str() {
            "json" => println!("{}", plan.to_json()),
            _ => println!("{}", plan.format_table()),
        }
        return Ok(0);
    }

    let timer = Timer::start("execution");
    let exit_code = invoker.run(&plan).await?;
    timer.stop();

    Ok(exit_code)
}
