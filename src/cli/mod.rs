//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::Parser;
use std::path::PathBuf;

/// Adaptive pytest launcher
#[derive(Parser, Debug)]
#[command(name = "pytest-launch")]
#[command(version = "0.1.0")]
#[command(about = "Collects the test count, picks a worker count, and runs pytest safely")]
#[command(long_about = None)]
pub struct Args {
    /// Test paths or node ids to select (empty runs the whole suite)
    pub selection: Vec<String>,

    /// Extra flags passed to pytest unchanged, after `--`
    #[arg(last = true)]
    pub runner_args: Vec<String>,

    /// Project root pinned as the working directory for every subprocess
    #[arg(long, default_value = ".")]
    pub project_root: PathBuf,

    /// Collection phase timeout in seconds
    #[arg(long, default_value = "120")]
    pub collect_timeout: u64,

    /// Execution phase timeout in seconds
    #[arg(long, default_value = "3600")]
    pub run_timeout: u64,

    /// Print the execution plan without running pytest
    #[arg(long)]
    pub dry_run: bool,

    /// Output format for --dry-run (table, json)
    #[arg(short, long, default_value = "table")]
    pub format: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
