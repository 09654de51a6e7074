//! Execution plan model
//!
//! The fully-resolved command computed from the collection result and the
//! worker-count decision. Computed once, consumed once.

use serde::Serialize;
use std::path::PathBuf;

use crate::config::LaunchConfig;

/// Immutable plan for the execution subprocess
#[derive(Clone, Debug, Serialize)]
pub struct ExecutionPlan {
    /// Worker count decided by the policy
    pub workers: usize,

    /// Program to spawn (never shell-interpreted)
    pub program: String,

    /// Full argument list, one element per argv entry
    pub args: Vec<String>,

    /// Working directory pinned for the child process
    pub working_dir: PathBuf,

    /// Hard timeout for the child process
    pub timeout_secs: u64,
}

impl ExecutionPlan {
    /// Build the final argument list for the run.
    ///
    /// `-n <workers>` (pytest-xdist) is appended only for parallel runs;
    /// a single-worker run uses plain pytest with no worker pool at all.
    pub fn build(
        config: &LaunchConfig,
        selection: &[String],
        runner_args: &[String],
        workers: usize,
    ) -> Self {
        let mut args = vec!["-m".to_string(), "pytest".to_string()];
        args.extend(selection.iter().cloned());
        args.extend(runner_args.iter().cloned());

        if workers > 1 {
            args.push("-n".to_string());
            args.push(workers.to_string());
        }

        Self {
            workers,
            program: config.runner_program.clone(),
            args,
            working_dir: config.project_root.clone(),
            timeout_secs: config.run_timeout_secs,
        }
    }

    /// Render the command for logs and the dry-run table. Display only; the
    /// child is always spawned from the argv array, never from this string.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    pub fn format_table(&self) -> String {
        format!(
            "Execution plan:\n  command:     {}\n  workers:     {}\n  working dir: {}\n  timeout:     {}s",
            self.command_line(),
            self.workers,
            self.working_dir.display(),
            self.timeout_secs
        )
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
