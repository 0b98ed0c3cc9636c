//! # grader_runner
//!
//! External command execution for license-grader.
//!
//! Every task shells out to some tool (`apt-get`, `pip`, `cloc`, the SPDX
//! scanner). This crate puts those invocations behind a small trait so tasks
//! can be tested without the tools installed.
//!
//! # Features
//!
//! - **Shell Runner**: spawns real processes, captures or streams output
//! - **Dry-Run Mode**: log commands without executing them
//! - **CI Integration**: timestamped log lines when `CI` is set
//! - **Fail Fast**: non-zero exits become errors carrying the exit code
//! - **Mock Runner**: scripted responses and call capture for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use grader_runner::{CommandRunner, CommandSpec, RunConfig, RunOptions, ShellRunner};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = ShellRunner::new(RunOptions::default());
//!
//!     let spec = CommandSpec::new("cloc").arg("--xml").arg("src/");
//!     let result = runner.run(&spec, &RunConfig::default())?;
//!     println!("{}", result.stdout);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod mock;
pub mod runner;
pub mod shell;

pub use config::{CommandSpec, RunConfig, RunOptions};
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use runner::{CommandRunner, ExecutionResult};
pub use shell::{console_handler, LogHandler, LogLine, LogStream, ShellRunner};
