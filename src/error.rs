//! Launcher error taxonomy
//!
//! Defines the four failure classes of the launcher itself, kept distinct
//! from test failures reported through the runner's exit code.

use std::fmt;
use thiserror::Error;

/// Exit code reserved for launcher failures (EX_SOFTWARE). The runner's own
/// exit codes pass through verbatim and never collide with this value.
pub const INTERNAL_ERROR_CODE: i32 = 70;

/// Subprocess phase that produced an error
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Collection,
    Execution,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Collection => write!(f, "Test collection"),
            Phase::Execution => write!(f, "Test execution"),
        }
    }
}

/// Launcher errors
///
/// All variants are fatal to the current invocation; retries belong to the
/// calling CI layer, which observes [`INTERNAL_ERROR_CODE`].
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Test collection failed: {0}")]
    Collection(String),

    #[error("Rejected argument: {0}")]
    Validation(String),

    #[error("{phase} timed out after {timeout_secs} seconds")]
    Timeout { phase: Phase, timeout_secs: u64 },

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl LaunchError {
    pub fn exit_code(&self) -> i32 {
        INTERNAL_ERROR_CODE
    }
}
