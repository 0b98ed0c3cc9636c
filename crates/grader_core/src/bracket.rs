//! The operation bracket.
//!
//! [`Reporter::introduce`] wraps a unit of work between a start banner and a
//! closing banner:
//!
//! 1. A `START` line with the label is printed and a timer starts.
//! 2. The work runs and receives the reporter, so it can nest brackets or
//!    print tool output to the same sink.
//! 3. `Ok(Completion::Clean)` prints `SUCCESS`; `Ok(Completion::Warned)` prints
//!    one `NOTE` per warning followed by `WARNING`.
//! 4. `Err(e)` prints `ERROR` and hands `e` back untouched. A panic prints
//!    `ERROR` and keeps unwinding.
//!
//! Exactly one closing line is printed per invocation.

use std::io::{self, Stdout, Write};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::status::{Completion, Status};
use crate::style::OutputStyle;

/// Wall-clock time spent in a bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Elapsed(Duration);

impl Elapsed {
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }
}

impl From<Duration> for Elapsed {
    fn from(duration: Duration) -> Self {
        Self(duration)
    }
}

impl std::fmt::Display for Elapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} seconds", self.0.as_secs_f64())
    }
}

/// Monotonic stopwatch started when a bracket opens.
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    started: Instant,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Elapsed {
        Elapsed(self.started.elapsed())
    }

    /// Closing message for `label`: the label, a space, then the elapsed time.
    pub fn summary(&self, label: &str) -> String {
        format!("{} {}", label.trim_end(), self.elapsed())
    }
}

/// Writes status lines to a sink using a fixed [`OutputStyle`].
pub struct Reporter<W: Write = Stdout> {
    out: W,
    style: OutputStyle,
}

impl Reporter<Stdout> {
    /// Reporter printing to the process's standard output.
    pub fn stdout(style: OutputStyle) -> Self {
        Self::new(io::stdout(), style)
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, style: OutputStyle) -> Self {
        Self { out, style }
    }

    pub fn style(&self) -> OutputStyle {
        self.style
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print one status line.
    ///
    /// Sink failures are logged and dropped; reporting never fails a task.
    pub fn emit(&mut self, status: Status, message: &str) {
        let line = self.style.render_line(status, message);
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|_| self.out.flush()) {
            debug!("Failed to write {} line: {}", status, e);
        }
    }

    pub fn started(&mut self, message: &str) {
        self.emit(Status::Started, message);
    }

    pub fn success(&mut self, message: &str) {
        self.emit(Status::Success, message);
    }

    pub fn warning(&mut self, message: &str) {
        self.emit(Status::Warning, message);
    }

    pub fn error(&mut self, message: &str) {
        self.emit(Status::Error, message);
    }

    pub fn note(&mut self, message: &str) {
        self.emit(Status::Note, message);
    }

    /// Print text exactly as given, adding a final newline if it lacks one.
    pub fn raw(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|_| {
                if text.ends_with('\n') {
                    Ok(())
                } else {
                    self.out.write_all(b"\n")
                }
            })
            .and_then(|_| self.out.flush());
        if let Err(e) = result {
            debug!("Failed to write raw output: {}", e);
        }
    }

    /// Run `work` inside a start/finish bracket labelled `label`.
    pub fn introduce<T, E, F>(&mut self, label: &str, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<Completion<T>, E>,
    {
        let timer = Timer::start();
        self.started(label);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(&mut *self)));

        match outcome {
            Ok(Ok(completion)) => {
                let (value, warnings) = completion.into_parts();
                if warnings.is_empty() {
                    self.success(&timer.summary(label));
                } else {
                    for warning in &warnings {
                        self.note(warning);
                    }
                    self.warning(&timer.summary(label));
                }
                Ok(value)
            }
            Ok(Err(err)) => {
                self.error(&timer.summary(label));
                Err(err)
            }
            Err(payload) => {
                self.error(&timer.summary(label));
                panic::resume_unwind(payload)
            }
        }
    }
}
