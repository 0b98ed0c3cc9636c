//! license-grader CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 3: Malformed scanner output
//! - any other code: exit code of the failing external command

use std::process::ExitCode;

use clap::Parser;
use grader_runner::RunnerError;
use grader_tasks::TaskError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands, Session};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const MALFORMED_OUTPUT: u8 = 3;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = Session::open(&cli).and_then(|session| match cli.command {
        Commands::Setup(args) => commands::setup::execute(args, &session),
        Commands::Analyse(args) => commands::analyse::execute(args, &session),
        Commands::Scan(args) => commands::scan::execute(args, &session),
    });

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

/// Log to stderr so stdout carries only banners and tool output.
fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("grader={},warn", level)));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<TaskError>() {
            return match err {
                TaskError::Runner(runner) => runner_exit_code(runner),
                TaskError::Config(_) | TaskError::Yaml(_) => ExitCodes::INVALID_ARGS,
                TaskError::MalformedLine { .. } => ExitCodes::MALFORMED_OUTPUT,
                _ => ExitCodes::GENERAL_ERROR,
            };
        }
        if let Some(err) = cause.downcast_ref::<RunnerError>() {
            return runner_exit_code(err);
        }
    }
    ExitCodes::GENERAL_ERROR
}

/// The external command's own code, kept inside 1..=255.
fn runner_exit_code(err: &RunnerError) -> u8 {
    match err.exit_code() {
        Some(code) => code.clamp(1, 255) as u8,
        None => ExitCodes::GENERAL_ERROR,
    }
}
