//! Secure subprocess invocation
//!
//! Validates caller-supplied arguments and runs the final pytest command as
//! a child process. The child is always spawned from an argv array with a
//! pinned working directory and a hard timeout; no command shell is ever
//! involved, so shell metacharacters in arguments stay literal text.

use std::path::{Component, Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::{LaunchConfig, MAX_ARG_COUNT, MAX_ARG_LEN};
use crate::error::{LaunchError, Phase, INTERNAL_ERROR_CODE};
use crate::models::ExecutionPlan;
use crate::proc::supervise;

/// Subprocess invoker
pub struct Invoker {
    config: LaunchConfig,
}

impl Invoker {
    pub fn new(config: LaunchConfig) -> Self {
        Self { config }
    }

    /// Check caller-supplied arguments before any subprocess is spawned.
    ///
    /// Rejects pathological argument lists (count, length, embedded NUL)
    /// and any path-like argument that resolves outside the project root.
    pub fn validate(&self, args: &[String]) -> Result<(), LaunchError> {
        if args.len() > MAX_ARG_COUNT {
            return Err(LaunchError::Validation(format!(
                "too many arguments ({} > {MAX_ARG_COUNT})",
                args.len()
            )));
        }

        for arg in args {
            if arg.len() > MAX_ARG_LEN {
                return Err(LaunchError::Validation(format!(
                    "argument exceeds {MAX_ARG_LEN} bytes"
                )));
            }
            if arg.contains('\0') {
                return Err(LaunchError::Validation(
                    "argument contains a NUL byte".to_string(),
                ));
            }
            if is_path_like(arg) {
                resolve_within(&self.config.project_root, arg)?;
            }
        }

        Ok(())
    }

    /// Run the planned command, returning the child's exit code unchanged.
    ///
    /// Stdio is inherited so pytest's own output (assertion diffs, stack
    /// traces) passes through unmodified. On timeout the child is killed
    /// and the failure is reported distinctly from a test failure.
    pub async fn run(&self, plan: &ExecutionPlan) -> Result<i32, LaunchError> {
        self.validate(&plan.args)?;

        info!("Running: {}", plan.command_line());

        let mut child = Command::new(&plan.program)
            .args(&plan.args)
            .current_dir(&plan.working_dir)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| LaunchError::Spawn {
                program: plan.program.clone(),
                source: e,
            })?;

        let status = supervise(
            &mut child,
            &plan.program,
            Phase::Execution,
            plan.timeout_secs,
        )
        .await?;

        debug!("Runner exited with {}", status);
        // A child killed by a signal has no exit code; report the reserved
        // internal code instead of inventing a test result.
        Ok(status.code().unwrap_or(INTERNAL_ERROR_CODE))
    }
}

/// Whether an argument should be treated as a filesystem path. Flags start
/// with `-` and are passed through untouched.
pub fn is_path_like(arg: &str) -> bool {
    !arg.is_empty() && !arg.starts_with('-')
}

/// Resolve an argument against the project root, rejecting anything that
/// escapes it.
///
/// Resolution is lexical (`..` and `.` components folded without touching
/// the filesystem), so nonexistent selection paths still validate; the root
/// itself must already be canonical.
pub fn resolve_within(root: &Path, arg: &str) -> Result<PathBuf, LaunchError> {
    // pytest node ids carry a `::test_name` suffix after the file path
    let path_part = arg.split("::").next().unwrap_or(arg);

    let candidate = Path::new(path_part);
    let joined = if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    };

    let mut resolved = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::ParentDir => {
                if !resolved.pop() {
                    return Err(LaunchError::Validation(format!(
                        "'{arg}' resolves outside the project root"
                    )));
                }
            }
            Component::CurDir => {}
            other => resolved.push(other),
        }
    }

    if resolved.starts_with(root) {
        Ok(resolved)
    } else {
        Err(LaunchError::Validation(format!(
            "'{arg}' resolves outside the project root"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn test_root() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        (dir, root)
    }

    fn invoker(root: &Path) -> Invoker {
        Invoker::new(LaunchConfig::new(root))
    }

    #[test]
    fn test_traversal_is_rejected() {
        let (_dir, root) = test_root();
        let result = resolve_within(&root, "../../etc/passwd");
        assert!(matches!(result, Err(LaunchError::Validation(_))));
    }

    #[test]
    fn test_relative_path_inside_root_is_accepted() {
        let (_dir, root) = test_root();
        let resolved = resolve_within(&root, "tests/test_api.py").unwrap();
        assert_eq!(resolved, root.join("tests/test_api.py"));
    }

    #[test]
    fn test_node_id_suffix_is_stripped() {
        let (_dir, root) = test_root();
        let resolved = resolve_within(&root, "tests/test_api.py::test_login").unwrap();
        assert_eq!(resolved, root.join("tests/test_api.py"));
    }

    #[test]
    fn test_dotdot_that_stays_inside_is_accepted() {
        let (_dir, root) = test_root();
        let resolved = resolve_within(&root, "tests/../tests/test_api.py").unwrap();
        assert_eq!(resolved, root.join("tests/test_api.py"));
    }

    #[test]
    fn test_absolute_path_outside_root_is_rejected() {
        let (_dir, root) = test_root();
        let result = resolve_within(&root, "/etc/passwd");
        assert!(matches!(result, Err(LaunchError::Validation(_))));
    }

    #[test]
    fn test_absolute_path_inside_root_is_accepted() {
        let (_dir, root) = test_root();
        let inside = root.join("tests").display().to_string();
        assert!(resolve_within(&root, &inside).is_ok());
    }

    #[test]
    fn test_flags_are_not_path_checked() {
        assert!(!is_path_like("--maxfail=3"));
        assert!(!is_path_like("-x"));
        assert!(is_path_like("tests/test_api.py"));
        assert!(!is_path_like(""));
    }

    #[test]
    fn test_shell_metacharacters_are_literal_paths() {
        // argv invocation means `;` and friends never split a command; the
        // argument just fails to match a file later, inside the root
        let (_dir, root) = test_root();
        let invoker = invoker(&root);
        assert!(invoker.validate(&["tests; echo owned".to_string()]).is_ok());
        assert!(invoker.validate(&["a && b | c".to_string()]).is_ok());
    }

    #[test]
    fn test_too_many_arguments_rejected() {
        let (_dir, root) = test_root();
        let invoker = invoker(&root);
        let args: Vec<String> = (0..MAX_ARG_COUNT + 1).map(|i| i.to_string()).collect();
        assert!(matches!(
            invoker.validate(&args),
            Err(LaunchError::Validation(_))
        ));
    }

    #[test]
    fn test_oversized_argument_rejected() {
        let (_dir, root) = test_root();
        let invoker = invoker(&root);
        let args = vec!["x".repeat(MAX_ARG_LEN + 1)];
        assert!(matches!(
            invoker.validate(&args),
            Err(LaunchError::Validation(_))
        ));
    }

    #[test]
    fn test_nul_byte_rejected() {
        let (_dir, root) = test_root();
        let invoker = invoker(&root);
        assert!(matches!(
            invoker.validate(&["tests\0evil".to_string()]),
            Err(LaunchError::Validation(_))
        ));
    }

    #[test]
    fn test_traversal_rejected_before_spawn() {
        let (_dir, root) = test_root();
        let invoker = invoker(&root);
        let result = invoker.validate(&["../outside/test_x.py".to_string()]);
        assert!(matches!(result, Err(LaunchError::Validation(_))));
    }

    fn plan(root: &Path, program: &str, args: &[&str], timeout_secs: u64) -> ExecutionPlan {
        ExecutionPlan {
            workers: 1,
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
            working_dir: root.to_path_buf(),
            timeout_secs,
        }
    }

    #[tokio::test]
    async fn test_spawn_failure_is_reported() {
        let (_dir, root) = test_root();
        let invoker = invoker(&root);
        let plan = plan(&root, "definitely-not-a-real-program", &[], 10);
        let result = invoker.run(&plan).await;
        assert!(matches!(result, Err(LaunchError::Spawn { .. })));
    }

    #[tokio::test]
    async fn test_exit_code_passes_through() {
        let (_dir, root) = test_root();
        let invoker = invoker(&root);
        let plan = plan(&root, "sh", &["-c", "exit 7"], 10);
        assert_eq!(invoker.run(&plan).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_zero_exit_code_passes_through() {
        let (_dir, root) = test_root();
        let invoker = invoker(&root);
        let plan = plan(&root, "sh", &["-c", "true"], 10);
        assert_eq!(invoker.run(&plan).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_timeout_kills_the_child() {
        let (_dir, root) = test_root();
        let invoker = invoker(&root);
        let plan = plan(&root, "sleep", &["30"], 1);

        let start = std::time::Instant::now();
        let result = invoker.run(&plan).await;

        assert!(matches!(
            result,
            Err(LaunchError::Timeout {
                phase: Phase::Execution,
                ..
            })
        ));
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
