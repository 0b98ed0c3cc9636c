//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while running external commands.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` exited with code {code}: {stderr_tail}")]
    NonZeroExit {
        command: String,
        code: i32,
        stderr_tail: String,
    },

    #[error("Command `{command}` timed out after {seconds} seconds")]
    Timeout { command: String, seconds: u64 },

    #[error("Failed to wait for `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Build a `NonZeroExit` from a finished command's stderr.
    ///
    /// Only the last non-empty stderr line is kept.
    pub fn non_zero_exit(command: impl Into<String>, code: i32, stderr: &str) -> Self {
        let stderr_tail = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("no output on stderr")
            .trim()
            .to_string();
        Self::NonZeroExit {
            command: command.into(),
            code,
            stderr_tail,
        }
    }

    /// Exit code of the external command, when the error carries one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}
