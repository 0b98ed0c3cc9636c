//! Process-based command runner.
//!
//! Spawns the requested program directly (no shell), drains stdout and
//! stderr on two reader threads, and waits for the exit status.

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, error, info};

use crate::config::{CommandSpec, RunConfig, RunOptions};
use crate::error::{RunnerError, RunnerResult};
use crate::runner::{CommandRunner, ExecutionResult};

/// Log output from a running command.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: chrono::DateTime<Utc>,
    pub stream: LogStream,
    pub message: String,
}

/// Log stream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

impl LogLine {
    /// Text printed for this line; CI mode prefixes a timestamp and the stream.
    pub fn render(&self, ci_mode: bool) -> String {
        if ci_mode {
            format!(
                "[{}] [{}] {}",
                self.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                self.stream,
                self.message
            )
        } else {
            self.message.clone()
        }
    }
}

/// Log handler callback type.
pub type LogHandler = Arc<dyn Fn(LogLine) + Send + Sync>;

/// Handler used when none is supplied: stdout lines go to stdout, stderr
/// lines to stderr.
pub fn console_handler(ci_mode: bool) -> LogHandler {
    Arc::new(move |line: LogLine| {
        let text = line.render(ci_mode);
        let result = match line.stream {
            LogStream::Stdout => writeln!(std::io::stdout().lock(), "{}", text),
            LogStream::Stderr => writeln!(std::io::stderr().lock(), "{}", text),
        };
        if let Err(e) = result {
            debug!("Failed to echo {} line: {}", line.stream, e);
        }
    })
}

/// How a reader thread echoes the lines it collects.
#[derive(Clone)]
struct Echo {
    enabled: bool,
    handler: LogHandler,
}

impl Echo {
    /// Echo one raw chunk, without its line terminator.
    fn chunk(&self, stream: LogStream, chunk: &[u8]) {
        if !self.enabled {
            return;
        }
        let chunk = chunk.strip_suffix(b"\n").unwrap_or(chunk);
        let chunk = chunk.strip_suffix(b"\r").unwrap_or(chunk);
        (self.handler)(LogLine {
            timestamp: Utc::now(),
            stream,
            message: String::from_utf8_lossy(chunk).into_owned(),
        });
    }
}

/// Runner that executes commands as child processes.
pub struct ShellRunner {
    options: RunOptions,
    log_handler: Option<LogHandler>,
}

impl ShellRunner {
    pub fn new(options: RunOptions) -> Self {
        Self {
            options,
            log_handler: None,
        }
    }

    /// Set a log handler for streamed lines.
    pub fn with_log_handler(mut self, handler: LogHandler) -> Self {
        self.log_handler = Some(handler);
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn is_dry_run(&self) -> bool {
        self.options.dry_run
    }

    fn build_command(spec: &CommandSpec) -> Command {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        if let Some(dir) = &spec.workdir {
            cmd.current_dir(dir);
        }
        for (key, value) in &spec.env {
            cmd.env(key, value);
        }
        // Installers may prompt, so the child shares our stdin.
        cmd.stdin(Stdio::inherit());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd
    }

    /// Execute a command and capture its output.
    fn execute(&self, spec: &CommandSpec, config: &RunConfig) -> RunnerResult<(i32, String, String)> {
        let command = spec.display();
        debug!("Executing: {}", command);

        let mut child = Self::build_command(spec)
            .spawn()
            .map_err(|source| RunnerError::SpawnFailed {
                program: spec.program.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stderr was not captured".to_string()))?;

        let echo = Echo {
            enabled: config.stream_logs,
            handler: self
                .log_handler
                .clone()
                .unwrap_or_else(|| console_handler(self.options.ci_mode)),
        };
        let stdout_handle = collect_stream(stdout, LogStream::Stdout, echo.clone());
        let stderr_handle = collect_stream(stderr, LogStream::Stderr, echo);

        let status = wait_for(&mut child, &command, config.timeout_seconds)?;

        let stdout_output = stdout_handle.join().unwrap_or_default();
        let stderr_output = stderr_handle.join().unwrap_or_default();

        Ok((
            status.code().unwrap_or(-1),
            String::from_utf8_lossy(&stdout_output).into_owned(),
            String::from_utf8_lossy(&stderr_output).into_owned(),
        ))
    }
}

/// Drain a child pipe on its own thread, echoing each line as it arrives.
///
/// The bytes are kept exactly as the child wrote them.
fn collect_stream<R>(reader: R, stream: LogStream, echo: Echo) -> JoinHandle<Vec<u8>>
where
    R: Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut output = Vec::new();
        let mut chunk = Vec::new();
        loop {
            chunk.clear();
            match reader.read_until(b'\n', &mut chunk) {
                Ok(0) => break,
                Ok(_) => {
                    echo.chunk(stream, &chunk);
                    output.extend_from_slice(&chunk);
                }
                Err(e) => {
                    debug!("Failed to read {}: {}", stream, e);
                    break;
                }
            }
        }
        output
    })
}

/// Wait for the child, killing it once `timeout_seconds` elapses (0 = wait forever).
fn wait_for(child: &mut Child, command: &str, timeout_seconds: u64) -> RunnerResult<ExitStatus> {
    let wait_error = |source: std::io::Error| RunnerError::Wait {
        command: command.to_string(),
        source,
    };

    if timeout_seconds == 0 {
        return child.wait().map_err(wait_error);
    }

    let timeout = Duration::from_secs(timeout_seconds);
    let start = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(RunnerError::Timeout {
                        command: command.to_string(),
                        seconds: timeout_seconds,
                    });
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => return Err(wait_error(e)),
        }
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, spec: &CommandSpec, config: &RunConfig) -> RunnerResult<ExecutionResult> {
        let command = spec.display();

        if self.options.dry_run {
            info!("[DRY-RUN] Would execute: {}", command);
            let now = Utc::now();
            return Ok(ExecutionResult {
                command,
                exit_code: 0,
                stdout: String::new(),
                stderr: String::new(),
                started_at: now,
                finished_at: now,
                duration_ms: 0,
            });
        }

        let started_at = Utc::now();
        let (exit_code, stdout, stderr) = self.execute(spec, config)?;
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        if exit_code == 0 {
            debug!("`{}` completed in {}ms", command, duration_ms);
        } else {
            error!(
                "`{}` failed with exit code {} after {}ms",
                command, exit_code, duration_ms
            );
        }

        let result = ExecutionResult {
            command,
            exit_code,
            stdout,
            stderr,
            started_at,
            finished_at,
            duration_ms,
        };

        if self.options.fail_fast {
            result.into_checked()
        } else {
            Ok(result)
        }
    }

    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_run_does_not_spawn() {
        let runner = ShellRunner::new(RunOptions::new().dry_run(true));
        assert!(runner.is_dry_run());

        let spec = CommandSpec::new("definitely-not-a-real-program-4711");
        let result = runner.run(&spec, &RunConfig::default()).unwrap();
        assert!(result.success());
        assert_eq!(result.command, "definitely-not-a-real-program-4711");
        assert!(result.stdout.is_empty());
    }

    #[test]
    fn test_spawn_failure() {
        let runner = ShellRunner::new(RunOptions::new());
        let spec = CommandSpec::new("definitely-not-a-real-program-4711");
        let err = runner.run(&spec, &RunConfig::default()).unwrap_err();
        assert!(matches!(err, RunnerError::SpawnFailed { .. }));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let runner = ShellRunner::new(RunOptions::new());
        assert!(!runner.is_available("definitely-not-a-real-program-4711"));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_stdout_and_stderr() {
        let runner = ShellRunner::new(RunOptions::new());
        let spec = CommandSpec::new("sh").args(["-c", "echo out; echo err 1>&2"]);
        let result = runner.run(&spec, &RunConfig::default()).unwrap();

        assert!(result.success());
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert!(result.finished_at >= result.started_at);
    }

    #[cfg(unix)]
    #[test]
    fn test_fail_fast_reports_exit_code() {
        let runner = ShellRunner::new(RunOptions::new().fail_fast(true));
        let spec = CommandSpec::new("sh").args(["-c", "echo broken 1>&2; exit 7"]);
        let err = runner.run(&spec, &RunConfig::default()).unwrap_err();

        assert_eq!(err.exit_code(), Some(7));
        assert!(err.to_string().contains("broken"));
    }

    #[cfg(unix)]
    #[test]
    fn test_without_fail_fast_returns_result() {
        let runner = ShellRunner::new(RunOptions::new().fail_fast(false));
        let spec = CommandSpec::new("sh").args(["-c", "exit 3"]);
        let result = runner.run(&spec, &RunConfig::default()).unwrap();
        assert_eq!(result.exit_code, 3);
        assert!(!result.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let runner = ShellRunner::new(RunOptions::new());
        let spec = CommandSpec::new("sleep").arg("5");
        let err = runner
            .run(&spec, &RunConfig::default().timeout(1))
            .unwrap_err();
        assert!(matches!(err, RunnerError::Timeout { seconds: 1, .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_log_handler_receives_streamed_lines() {
        use parking_lot::Mutex;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let runner = ShellRunner::new(RunOptions::new()).with_log_handler(Arc::new(move |line: LogLine| {
            sink.lock().push((line.stream, line.message));
        }));

        let spec = CommandSpec::new("sh").args(["-c", "echo installing"]);
        runner
            .run(&spec, &RunConfig::default().stream_logs(true))
            .unwrap();

        let seen = seen.lock();
        assert_eq!(seen.as_slice(), &[(LogStream::Stdout, "installing".to_string())]);
    }

    #[cfg(unix)]
    #[test]
    fn test_invalid_utf8_does_not_truncate_output() {
        let runner = ShellRunner::new(RunOptions::new());
        let spec = CommandSpec::new("sh").args(["-c", "printf 'a\\n\\377b\\nc\\n'"]);
        let result = runner.run(&spec, &RunConfig::default()).unwrap();

        assert_eq!(result.stdout, "a\n\u{FFFD}b\nc\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_output_is_kept_verbatim() {
        let runner = ShellRunner::new(RunOptions::new());
        let spec = CommandSpec::new("sh").args(["-c", "printf 'x\\r\\ny'; printf 'e\\r\\n' 1>&2"]);
        let result = runner.run(&spec, &RunConfig::default()).unwrap();

        assert_eq!(result.stdout, "x\r\ny");
        assert_eq!(result.stderr, "e\r\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_echoed_lines_drop_terminators() {
        use parking_lot::Mutex;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let runner = ShellRunner::new(RunOptions::new()).with_log_handler(Arc::new(move |line: LogLine| {
            sink.lock().push(line.message);
        }));

        let spec = CommandSpec::new("sh").args(["-c", "printf 'one\\r\\ntwo\\n\\377three'"]);
        let result = runner
            .run(&spec, &RunConfig::default().stream_logs(true))
            .unwrap();

        assert_eq!(seen.lock().as_slice(), &["one", "two", "\u{FFFD}three"]);
        assert_eq!(result.stdout, "one\r\ntwo\n\u{FFFD}three");
    }

    #[test]
    fn test_log_line_render() {
        let line = LogLine {
            timestamp: chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 5, 1, 12, 30, 0).unwrap(),
            stream: LogStream::Stderr,
            message: "Collecting cloc".to_string(),
        };
        assert_eq!(line.render(false), "Collecting cloc");
        assert_eq!(
            line.render(true),
            "[2024-05-01T12:30:00.000Z] [stderr] Collecting cloc"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_workdir_and_env() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ShellRunner::new(RunOptions::new());
        let spec = CommandSpec::new("sh")
            .args(["-c", "pwd; echo $GRADER_TEST_VALUE"])
            .workdir(dir.path())
            .env("GRADER_TEST_VALUE", "42");

        let result = runner.run(&spec, &RunConfig::default()).unwrap();
        let lines: Vec<&str> = result.stdout.lines().collect();
        let expected = dir.path().canonicalize().unwrap();
        assert_eq!(std::path::Path::new(lines[0]).canonicalize().unwrap(), expected);
        assert_eq!(lines[1], "42");
    }
}
