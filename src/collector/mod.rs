//! Test collection
//!
//! Determines how many tests a selection would run, without executing them,
//! by invoking pytest in collection-only mode as a bounded child process.

use std::process::Stdio;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tracing::debug;

use crate::config::LaunchConfig;
use crate::error::{LaunchError, Phase};
use crate::proc::supervise;

/// pytest exit code meaning "no tests collected"
const NO_TESTS_COLLECTED: i32 = 5;

/// Test collector
pub struct TestCollector {
    config: LaunchConfig,
}

impl TestCollector {
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }

    /// Count the tests a selection would run.
    ///
    /// Runs `<runner> -m pytest --collect-only -q` with the working
    /// directory pinned to the project root. A stalled collection (import
    /// loop, hung conftest) is killed at the timeout; a failed collection
    /// is reported as [`LaunchError::Collection`] rather than guessed
    /// around.
    pub async fn collect(&self, selection: &[String]) -> Result<usize, LaunchError> {
        debug!("Collecting tests for selection: {:?}", selection);

        let program = &self.config.runner_program;
        let mut cmd = Command::new(program);
        cmd.args(["-m", "pytest", "--collect-only", "-q"])
            .args(selection)
            .current_dir(&self.config.project_root)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| LaunchError::Spawn {
            program: program.clone(),
            source: e,
        })?;

        // Drain both pipes while waiting so a large collection listing
        // cannot fill the pipe buffer and stall the child.
        let stdout_task = tokio::spawn(drain(child.stdout.take()));
        let stderr_task = tokio::spawn(drain(child.stderr.take()));

        let status = supervise(
            &mut child,
            program,
            Phase::Collection,
            self.config.collect_timeout_secs,
        )
        .await?;

        let stdout = stdout_task.await.unwrap_or_default();
        let stderr = stderr_task.await.unwrap_or_default();

        match status.code() {
            Some(0) => parse_collected_count(&stdout).ok_or_else(|| {
                LaunchError::Collection(
                    "no collection summary found in pytest output".to_string(),
                )
            }),
            Some(NO_TESTS_COLLECTED) => Ok(0),
            _ => {
                let detail = if stderr.trim().is_empty() {
                    tail(&stdout, 5)
                } else {
                    tail(&stderr, 5)
                };
                Err(LaunchError::Collection(format!(
                    "pytest exited with {status}: {detail}"
                )))
            }
        }
    }
}

async fn drain<R>(pipe: Option<R>) -> String
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Parse the selected test count from `pytest --collect-only -q` output.
///
/// Handles the summary shapes pytest emits:
/// `12 tests collected in 0.20s`, `1 test collected in 0.01s`,
/// `3/12 tests collected (9 deselected) in 0.10s`, `collected 12 items`,
/// and `no tests collected` / `no tests ran`.
pub fn parse_collected_count(stdout: &str) -> Option<usize> {
    for line in stdout.lines().rev() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("no tests collected") || line.starts_with("no tests ran") {
            return Some(0);
        }

        if !line.contains("collected") {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let first = tokens.next()?;

        // "3/12 tests collected" counts selected tests only
        let selected = first.split('/').next().unwrap_or(first);
        if let Ok(count) = selected.parse::<usize>() {
            return Some(count);
        }

        // verbose shape: "collected 12 items"
        if first == "collected" {
            if let Some(Ok(count)) = tokens.next().map(str::parse::<usize>) {
                return Some(count);
            }
        }
    }

    None
}

fn tail(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
