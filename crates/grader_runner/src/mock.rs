//! Mock command runner for testing.
//!
//! Provides a configurable mock implementation of the `CommandRunner` trait
//! so tasks can be tested without `cloc`, `pip` or the SPDX scanner.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;

use crate::config::{CommandSpec, RunConfig};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// Predefined mock response for a command execution.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            duration_ms: 100,
        }
    }

    pub fn failure(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            duration_ms: 100,
        }
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}

/// Captured call information for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub method: String,
    pub program: String,
    pub args: Vec<String>,
    pub workdir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub stream_logs: bool,
}

impl CapturedCall {
    /// Program followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Mock command runner for testing.
///
/// This runner captures all calls and returns predefined responses,
/// allowing tests to verify which commands a task issues without
/// actually running them.
#[derive(Clone)]
pub struct MockRunner {
    /// Predefined responses for run calls.
    responses: Arc<RwLock<Vec<MockResponse>>>,
    /// Index of next response to return.
    response_index: Arc<AtomicUsize>,
    /// Captured calls for verification.
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    /// Programs that are "installed".
    installed_programs: Arc<RwLock<Vec<String>>>,
    /// Simulated failure to return (as a string message for ExecutionFailed).
    simulate_failure: Arc<RwLock<Option<String>>>,
    /// Turn non-zero responses into errors, like `ShellRunner`.
    fail_fast: bool,
}

impl Default for MockRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRunner {
    /// Create a new mock runner.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(Vec::new())),
            response_index: Arc::new(AtomicUsize::new(0)),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
            installed_programs: Arc::new(RwLock::new(Vec::new())),
            simulate_failure: Arc::new(RwLock::new(None)),
            fail_fast: true,
        }
    }

    /// Add a mock response for the next run call.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Set multiple responses.
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.write() = responses;
        self
    }

    /// Add a program that `is_available` should report.
    pub fn add_installed(self, program: impl Into<String>) -> Self {
        self.installed_programs.write().push(program.into());
        self
    }

    /// Set a failure to simulate.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    pub fn fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }

    /// Clear all captured calls.
    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }

    /// Get all captured calls.
    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    /// Get the number of calls made.
    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// Check if a specific method was called.
    pub fn was_called(&self, method: &str) -> bool {
        self.captured_calls
            .read()
            .iter()
            .any(|c| c.method == method)
    }

    /// Get calls to a specific method.
    pub fn get_method_calls(&self, method: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .cloned()
            .collect()
    }

    /// Command lines of every `run` call, in order.
    pub fn commands(&self) -> Vec<Vec<String>> {
        self.get_method_calls("run")
            .iter()
            .map(CapturedCall::argv)
            .collect()
    }

    /// Record a call.
    fn record_call(&self, call: CapturedCall) {
        self.captured_calls.write().push(call);
    }

    /// Get the next response.
    fn next_response(&self) -> MockResponse {
        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses
            .get(index % responses.len())
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }

    /// Check for simulated failure.
    fn check_failure(&self) -> RunnerResult<()> {
        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(RunnerError::ExecutionFailed(msg));
        }
        Ok(())
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, spec: &CommandSpec, config: &RunConfig) -> RunnerResult<ExecutionResult> {
        self.record_call(CapturedCall {
            method: "run".to_string(),
            program: spec.program.clone(),
            args: spec.args.clone(),
            workdir: spec.workdir.clone(),
            env: spec.env.clone(),
            stream_logs: config.stream_logs,
        });

        self.check_failure()?;

        let response = self.next_response();
        let started_at = Utc::now();
        let finished_at = started_at + chrono::Duration::milliseconds(response.duration_ms as i64);

        let result = ExecutionResult {
            command: spec.display(),
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at,
            finished_at,
            duration_ms: response.duration_ms,
        };

        if self.fail_fast {
            result.into_checked()
        } else {
            Ok(result)
        }
    }

    fn is_available(&self, program: &str) -> bool {
        self.record_call(CapturedCall {
            method: "is_available".to_string(),
            program: program.to_string(),
            args: Vec::new(),
            workdir: None,
            env: BTreeMap::new(),
            stream_logs: false,
        });
        self.installed_programs.read().iter().any(|p| p == program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_basic() {
        let runner = MockRunner::new().add_response(MockResponse::success("<results/>"));

        let spec = CommandSpec::new("cloc").args(["--xml", "src/"]);
        let result = runner.run(&spec, &RunConfig::default()).unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "<results/>");
        assert_eq!(result.command, "cloc --xml src/");
    }

    #[test]
    fn test_mock_runner_captures_calls() {
        let runner = MockRunner::new();

        let spec = CommandSpec::new("pip")
            .args(["install", "-r", "requirements.txt"])
            .workdir("/repo")
            .env("PIP_NO_INPUT", "1");

        let _ = runner.run(&spec, &RunConfig::default().stream_logs(true));

        let calls = runner.get_method_calls("run");
        assert_eq!(calls.len(), 1);

        let call = &calls[0];
        assert_eq!(call.program, "pip");
        assert_eq!(call.args, vec!["install", "-r", "requirements.txt"]);
        assert_eq!(call.workdir, Some(PathBuf::from("/repo")));
        assert_eq!(call.env.get("PIP_NO_INPUT"), Some(&"1".to_string()));
        assert!(call.stream_logs);
    }

    #[test]
    fn test_mock_runner_failure_simulation() {
        let runner = MockRunner::new().simulate_failure("simulated error");

        let spec = CommandSpec::new("cloc");
        let result = runner.run(&spec, &RunConfig::default());
        assert!(matches!(result, Err(RunnerError::ExecutionFailed(_))));
    }

    #[test]
    fn test_mock_runner_fail_fast() {
        let spec = CommandSpec::new("pip");

        let strict = MockRunner::new().add_response(MockResponse::failure(2, "no such file"));
        let err = strict.run(&spec, &RunConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), Some(2));

        let lenient = MockRunner::new()
            .fail_fast(false)
            .add_response(MockResponse::failure(2, "no such file"));
        let result = lenient.run(&spec, &RunConfig::default()).unwrap();
        assert_eq!(result.exit_code, 2);
    }

    #[test]
    fn test_mock_runner_multiple_responses() {
        let runner = MockRunner::new().fail_fast(false).with_responses(vec![
            MockResponse::success("first"),
            MockResponse::success("second"),
            MockResponse::failure(1, "third failed"),
        ]);

        let spec = CommandSpec::new("tool");

        let r1 = runner.run(&spec, &RunConfig::default()).unwrap();
        assert_eq!(r1.stdout, "first");

        let r2 = runner.run(&spec, &RunConfig::default()).unwrap();
        assert_eq!(r2.stdout, "second");

        let r3 = runner.run(&spec, &RunConfig::default()).unwrap();
        assert_eq!(r3.exit_code, 1);
        assert_eq!(r3.stderr, "third failed");
    }

    #[test]
    fn test_mock_runner_installed_programs() {
        let runner = MockRunner::new().add_installed("cloc");

        assert!(runner.is_available("cloc"));
        assert!(!runner.is_available("python"));
        assert_eq!(runner.get_method_calls("is_available").len(), 2);
    }
}
