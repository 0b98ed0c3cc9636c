//! CLI command definitions.
//!
//! This module defines the command structure for the license-grader CLI.
//! Each subcommand maps to one task in `grader_tasks`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::debug;

use grader_core::{ColorChoice, OutputStyle, Reporter};
use grader_runner::{LogHandler, LogLine, LogStream, RunOptions, ShellRunner};
use grader_tasks::{TaskConfig, TaskContext};

pub mod analyse;
pub mod scan;
pub mod setup;

/// license-grader - license and source analysis workflow
#[derive(Parser)]
#[command(name = "grader")]
#[command(version, about = "license-grader - license and source analysis workflow")]
#[command(long_about = r#"
license-grader wraps the tools used to grade a source package: it installs
them, counts lines of code with cloc and turns SPDX scanner output into XML.

TASKS:
  setup    → Install cloc and the Python requirements
  analyse  → Run `cloc --xml` on a source package
  scan     → Scan an SPDX document and print the licenses as XML

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or configuration
  3 - Malformed scanner output
  n - Exit code of the failing external command
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// When to color status lines
    #[arg(long, global = true, value_enum, default_value_t = ColorArg::Auto)]
    pub color: ColorArg,

    /// Task configuration file (defaults to ./grader.yaml when present)
    #[arg(long, global = true, env = "GRADER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print the commands instead of running them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install the tools the other tasks need
    Setup(setup::SetupArgs),

    /// Count lines of code in a source package
    Analyse(analyse::AnalyseArgs),

    /// Scan an SPDX document and report its licenses
    Scan(scan::ScanArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

impl From<ColorArg> for ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => ColorChoice::Auto,
            ColorArg::Always => ColorChoice::Always,
            ColorArg::Never => ColorChoice::Never,
        }
    }
}

/// Everything a command needs: the runner, the loaded configuration and
/// the resolved output style.
pub struct Session {
    runner: ShellRunner,
    config: TaskConfig,
    style: OutputStyle,
}

impl Session {
    pub fn open(cli: &Cli) -> Result<Self> {
        let current_dir = std::env::current_dir()?;
        let config = TaskConfig::discover(cli.config.as_deref(), &current_dir)
            .context("Failed to load task configuration")?;

        let style = ColorChoice::from(cli.color).resolve();
        debug!("Output style: {:?}", style);

        let options = RunOptions::new().dry_run(cli.dry_run);
        let handler = echo_handler(style, options.ci_mode);
        let runner = ShellRunner::new(options).with_log_handler(handler);

        Ok(Self {
            runner,
            config,
            style,
        })
    }

    pub fn context(&self) -> TaskContext<'_> {
        TaskContext::new(&self.runner, &self.config)
    }

    pub fn reporter(&self) -> Reporter {
        Reporter::stdout(self.style)
    }
}

/// Streamed stdout lines are printed through a `Reporter`, so they share
/// the sink of the status lines around them. Stderr lines stay on stderr.
fn echo_handler(style: OutputStyle, ci_mode: bool) -> LogHandler {
    std::sync::Arc::new(move |line: LogLine| match line.stream {
        LogStream::Stdout => echo_line(&mut Reporter::stdout(style), &line, ci_mode),
        LogStream::Stderr => {
            let _ = writeln!(std::io::stderr().lock(), "{}", line.render(ci_mode));
        }
    })
}

fn echo_line<W: Write>(reporter: &mut Reporter<W>, line: &LogLine, ci_mode: bool) {
    reporter.raw(&line.render(ci_mode));
}
