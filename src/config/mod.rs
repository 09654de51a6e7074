//! Launcher configuration
//!
//! Compile-time tunables and the immutable launch configuration threaded
//! through every component.

#![allow(dead_code)]

use std::path::PathBuf;

/// Worker pool ceiling for parallel runs
pub const DEFAULT_MAX_WORKERS: usize = 12;

/// Collection phase timeout in seconds
pub const DEFAULT_COLLECT_TIMEOUT_SECS: u64 = 120;

/// Execution phase timeout in seconds
pub const DEFAULT_RUN_TIMEOUT_SECS: u64 = 3600;

/// Maximum number of caller-supplied arguments
pub const MAX_ARG_COUNT: usize = 256;

/// Maximum length of a single argument in bytes
pub const MAX_ARG_LEN: usize = 4096;

/// Interpreter used to run pytest as `python3 -m pytest`
pub const RUNNER_PROGRAM: &str = "python3";

/// Launch configuration
///
/// Built once per invocation; the project root must already be canonical
/// (see `main`), since path validation resolves arguments against it.
#[derive(Clone, Debug)]
pub struct LaunchConfig {
    /// Working directory pinned for every subprocess
    pub project_root: PathBuf,

    /// Worker count used when the suite exceeds the threshold
    pub max_workers: usize,

    /// Timeout for the collection subprocess
    pub collect_timeout_secs: u64,

    /// Timeout for the execution subprocess
    pub run_timeout_secs: u64,

    /// Program used to run pytest as `<program> -m pytest`
    pub runner_program: String,
}

impl LaunchConfig {
    /// Create a configuration with default tunables
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            max_workers: DEFAULT_MAX_WORKERS,
            collect_timeout_secs: DEFAULT_COLLECT_TIMEOUT_SECS,
            run_timeout_secs: DEFAULT_RUN_TIMEOUT_SECS,
            runner_program: RUNNER_PROGRAM.to_string(),
        }
    }

    pub fn max_workers(mut self, count: usize) -> Self {
        self.max_workers = count;
        self
    }

    pub fn collect_timeout(mut self, secs: u64) -> Self {
        self.collect_timeout_secs = secs;
        self
    }

    pub fn run_timeout(mut self, secs: u64) -> Self {
        self.run_timeout_secs = secs;
        self
    }

    pub fn runner_program(mut self, program: impl Into<String>) -> Self {
        self.runner_program = program.into();
        self
    }

    /// Parallel cutoff: suites at or below this size run on a single worker,
    /// since worker startup overhead exceeds the parallelism benefit.
    pub fn threshold(&self) -> usize {
        self.max_workers * 2
    }
}
