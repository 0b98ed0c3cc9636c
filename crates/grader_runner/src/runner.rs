//! Command runner trait and types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{CommandSpec, RunConfig};
use crate::error::{RunnerError, RunnerResult};

/// Result of one external command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Rendered command line
    pub command: String,
    /// Exit code (-1 when the process was killed by a signal)
    pub exit_code: i32,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Non-empty stderr lines, trimmed.
    pub fn stderr_lines(&self) -> Vec<String> {
        self.stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Convert a non-zero exit into `RunnerError::NonZeroExit`.
    pub fn into_checked(self) -> RunnerResult<Self> {
        if self.success() {
            Ok(self)
        } else {
            Err(RunnerError::non_zero_exit(
                self.command.clone(),
                self.exit_code,
                &self.stderr,
            ))
        }
    }
}

/// Executes external commands.
///
/// Execution is synchronous: `run` returns once the child has exited.
pub trait CommandRunner {
    /// Run a command to completion.
    fn run(&self, spec: &CommandSpec, config: &RunConfig) -> RunnerResult<ExecutionResult>;

    /// Check whether `program` can be found.
    fn is_available(&self, program: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i32, stdout: &str, stderr: &str) -> ExecutionResult {
        let now = Utc::now();
        ExecutionResult {
            command: "tool".to_string(),
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            started_at: now,
            finished_at: now,
            duration_ms: 0,
        }
    }

    #[test]
    fn test_combined_output() {
        assert_eq!(result(0, "out", "").combined_output(), "out");
        assert_eq!(result(0, "", "err").combined_output(), "err");
        assert_eq!(result(0, "out", "err").combined_output(), "out\nerr");
    }

    #[test]
    fn test_stderr_lines_skip_blanks() {
        let r = result(0, "", "  DEPRECATION: old pip \n\n second\n");
        assert_eq!(r.stderr_lines(), vec!["DEPRECATION: old pip", "second"]);
    }

    #[test]
    fn test_into_checked() {
        assert!(result(0, "ok", "").into_checked().is_ok());

        let err = result(3, "", "bad input").into_checked().unwrap_err();
        assert_eq!(err.exit_code(), Some(3));
        assert!(err.to_string().contains("bad input"));
    }

    #[test]
    fn test_execution_result_json() {
        let json = serde_json::to_value(result(0, "out", "")).unwrap();
        assert_eq!(json["command"], "tool");
        assert_eq!(json["exit_code"], 0);
    }
}
