//! # grader_tasks
//!
//! The developer-workflow tasks of license-grader.
//!
//! - [`setup`](setup::run_setup) installs the line counter and the Python
//!   requirements, one bracket per step.
//! - [`analyse`](analyse::analyse) runs `cloc --xml` on a source package and
//!   prints the report unchanged.
//! - [`scan`](scan::scan) runs the SPDX scanner and turns its
//!   `file,license` lines into an XML (or JSON) document.
//!
//! Every task runs inside a [`grader_core::Reporter`] bracket and executes
//! commands through a [`grader_runner::CommandRunner`], so the whole flow can
//! be exercised with a `MockRunner`.

pub mod analyse;
pub mod config;
pub mod context;
pub mod error;
pub mod report;
pub mod scan;
pub mod setup;
pub mod spdx;

pub use analyse::{analyse, AnalyseOptions, ANALYSE_LABEL};
pub use config::{AnalyseConfig, ScanConfig, SetupStep, TaskConfig, DEFAULT_CONFIG_FILE};
pub use context::TaskContext;
pub use error::{TaskError, TaskResult};
pub use report::{render, to_json, to_xml, ReportFormat};
pub use scan::{scan, ScanOptions, SCAN_LABEL};
pub use setup::{run_setup, SetupOptions, StepOutcome};
pub use spdx::{parse_scan_output, LicenseRecord, ParseMode, ScanOutput};
