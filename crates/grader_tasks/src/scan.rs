//! The `scan` task: run the SPDX scanner and reformat its output.

use std::io::Write;
use std::path::PathBuf;

use grader_core::{Completion, Reporter};
use grader_runner::RunConfig;
use tracing::info;

use crate::context::TaskContext;
use crate::error::{TaskError, TaskResult};
use crate::report::{render, ReportFormat};
use crate::setup::{run_setup, SetupOptions};
use crate::spdx::{parse_scan_output, LicenseRecord, ParseMode};

pub const SCAN_LABEL: &str = "Scanning the SPDX file:";

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// SPDX document or link handed to the scanner; empty means none.
    pub spdx_file: String,
    pub skip_setup: bool,
    pub mode: ParseMode,
    pub format: ReportFormat,
    /// Write the report here instead of the reporter's sink.
    pub out: Option<PathBuf>,
}

/// Scan `options.spdx_file` and emit the records as a report.
///
/// Skipped lines (lenient mode) and scanner stderr lines are reported as
/// warnings.
pub fn scan<W: Write>(
    ctx: &TaskContext<'_>,
    reporter: &mut Reporter<W>,
    options: &ScanOptions,
) -> TaskResult<Vec<LicenseRecord>> {
    reporter.introduce(SCAN_LABEL, |reporter| -> TaskResult<Completion<Vec<LicenseRecord>>> {
        if !options.skip_setup {
            run_setup(ctx, reporter, SetupOptions::default())?;
        }

        let scan = &ctx.config().scan;
        let spec = scan.command(&options.spdx_file);
        let result = ctx.run(&spec, &RunConfig::default().timeout(scan.timeout_seconds))?;

        let parsed = parse_scan_output(&result.stdout, options.mode)?;
        info!("Scanner reported {} file(s)", parsed.records.len());

        let document = render(&parsed.records, options.format)?;
        match &options.out {
            Some(path) => {
                std::fs::write(path, format!("{}\n", document)).map_err(|source| {
                    TaskError::WriteReport {
                        path: path.clone(),
                        source,
                    }
                })?;
                info!("Wrote {} report to {}", options.format, path.display());
            }
            None => reporter.raw(&document),
        }

        let mut warnings = result.stderr_lines();
        warnings.extend(parsed.warnings);
        Ok(Completion::from_warnings(parsed.records, warnings))
    })
}
