//! Error types for the tasks module.

use std::path::PathBuf;

use grader_runner::RunnerError;
use thiserror::Error;

/// Result type alias for task operations.
pub type TaskResult<T> = Result<T, TaskError>;

/// Errors that can occur while running a task.
#[derive(Error, Debug)]
pub enum TaskError {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Malformed scanner output on line {line_number}: {content:?}")]
    MalformedLine { line_number: usize, content: String },

    #[error("Failed to write report to {}: {source}", .path.display())]
    WriteReport {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TaskError {
    /// Exit code of the external command that failed, if any.
    pub fn command_exit_code(&self) -> Option<i32> {
        match self {
            Self::Runner(err) => err.exit_code(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line_message() {
        let err = TaskError::MalformedLine {
            line_number: 3,
            content: "no comma here".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed scanner output on line 3: \"no comma here\""
        );
    }

    #[test]
    fn test_runner_errors_are_transparent() {
        let err = TaskError::from(RunnerError::non_zero_exit("cloc --xml", 2, "bad path"));
        assert_eq!(err.command_exit_code(), Some(2));
        assert_eq!(err.to_string(), "Command `cloc --xml` exited with code 2: bad path");
    }
}
