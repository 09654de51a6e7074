//! Child process supervision
//!
//! Shared wait logic for the collection and execution subprocesses: a hard
//! timeout, and termination-signal handling so a cancelled launcher kills
//! its in-flight child instead of orphaning it.

use std::process::ExitStatus;
use std::time::Duration;
use tokio::process::Child;
use tokio::time::timeout;
use tracing::warn;

use crate::error::{LaunchError, Phase};

/// Wait for a child within `timeout_secs`, killing it on timeout or when
/// the launcher itself is told to stop.
///
/// A SIGTERM or SIGINT to the launcher terminates the process without
/// running destructors, so `kill_on_drop` alone cannot reap the child on
/// that path; the signal branch here kills the child explicitly and then
/// exits with the conventional 128+signum code.
pub async fn supervise(
    child: &mut Child,
    program: &str,
    phase: Phase,
    timeout_secs: u64,
) -> Result<ExitStatus, LaunchError> {
    let bound = Duration::from_secs(timeout_secs);

    tokio::select! {
        result = timeout(bound, child.wait()) => match result {
            Ok(Ok(status)) => Ok(status),
            Ok(Err(e)) => Err(LaunchError::Spawn {
                program: program.to_string(),
                source: e,
            }),
            Err(_) => {
                warn!("{} did not finish within {}s, terminating", phase, timeout_secs);
                let _ = child.kill().await;
                Err(LaunchError::Timeout { phase, timeout_secs })
            }
        },
        exit_code = shutdown_signal() => {
            warn!("Termination signal received, stopping child process");
            let _ = child.kill().await;
            std::process::exit(exit_code);
        }
    }
}

/// Resolves when the launcher receives SIGTERM or SIGINT, yielding the
/// conventional 128+signum exit code.
async fn shutdown_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => 143,
            _ = sigint.recv() => 130,
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        130
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::process::Command;

    #[tokio::test]
    async fn test_supervise_returns_exit_status() {
        let mut child = Command::new("sh").args(["-c", "exit 3"]).spawn().unwrap();
        let status = supervise(&mut child, "sh", Phase::Execution, 10).await.unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[tokio::test]
    async fn test_supervise_kills_on_timeout() {
        let mut child = Command::new("sleep")
            .arg("30")
            .kill_on_drop(true)
            .spawn()
            .unwrap();

        let result = supervise(&mut child, "sleep", Phase::Collection, 1).await;
        assert!(matches!(
            result,
            Err(LaunchError::Timeout {
                phase: Phase::Collection,
                ..
            })
        ));
    }
}
