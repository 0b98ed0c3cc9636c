//! Scan command - Scan an SPDX document and report its licenses.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, ValueEnum};
use tracing::info;

use grader_tasks::{scan, ParseMode, ReportFormat, ScanOptions};

use super::Session;

#[derive(Args)]
pub struct ScanArgs {
    /// SPDX document (file or link) handed to the scanner
    spdx_file: Option<String>,

    /// Do not run the setup steps first
    #[arg(long)]
    skip_setup: bool,

    /// Skip malformed scanner lines instead of failing
    #[arg(long)]
    lenient: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = FormatArg::Xml)]
    format: FormatArg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Xml,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xml => ReportFormat::Xml,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

pub fn execute(args: ScanArgs, session: &Session) -> Result<()> {
    let ctx = session.context();
    let mut reporter = session.reporter();

    let options = ScanOptions {
        spdx_file: args.spdx_file.unwrap_or_default(),
        skip_setup: args.skip_setup,
        mode: if args.lenient {
            ParseMode::Lenient
        } else {
            ParseMode::Strict
        },
        format: args.format.into(),
        out: args.out,
    };
    let records = scan(&ctx, &mut reporter, &options)?;

    info!("Reported {} license record(s)", records.len());
    Ok(())
}
