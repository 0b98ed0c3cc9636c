//! Parsing of the SPDX scanner's plaintext output.
//!
//! The scanner prints one `file,license` pair per line.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{TaskError, TaskResult};

/// License information reported for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub file: String,
    pub license_info: String,
}

impl LicenseRecord {
    pub fn new(file: impl Into<String>, license_info: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            license_info: license_info.into(),
        }
    }

    /// Parse one `file,license` line.
    ///
    /// Returns `None` unless the line has exactly two fields and a non-empty
    /// file name. Fields are trimmed.
    pub fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.split(',');
        let file = fields.next()?.trim();
        let license_info = fields.next()?.trim();
        if fields.next().is_some() || file.is_empty() {
            return None;
        }
        Some(Self::new(file, license_info))
    }
}

/// What to do with lines that are not `file,license` pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Fail on the first malformed line.
    #[default]
    Strict,
    /// Skip malformed lines and report each one as a warning.
    Lenient,
}

/// Records parsed from one scanner run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    pub records: Vec<LicenseRecord>,
    pub warnings: Vec<String>,
}

/// Parse the scanner's stdout into license records, in input order.
///
/// Blank lines are ignored and a trailing `\r` is stripped from each line.
/// Line numbers in errors and warnings are 1-based.
pub fn parse_scan_output(output: &str, mode: ParseMode) -> TaskResult<ScanOutput> {
    let mut parsed = ScanOutput::default();

    for (index, raw) in output.split('\n').enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.trim().is_empty() {
            continue;
        }

        match LicenseRecord::parse_line(line) {
            Some(record) => parsed.records.push(record),
            None => {
                let line_number = index + 1;
                match mode {
                    ParseMode::Strict => {
                        return Err(TaskError::MalformedLine {
                            line_number,
                            content: line.to_string(),
                        });
                    }
                    ParseMode::Lenient => {
                        warn!("Skipping malformed scanner line {}: {:?}", line_number, line);
                        parsed
                            .warnings
                            .push(format!("Skipped malformed line {}: {}", line_number, line));
                    }
                }
            }
        }
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line() {
        assert_eq!(
            LicenseRecord::parse_line(" foo.c , MIT "),
            Some(LicenseRecord::new("foo.c", "MIT"))
        );
        assert_eq!(
            LicenseRecord::parse_line("unknown.h,"),
            Some(LicenseRecord::new("unknown.h", ""))
        );
        assert_eq!(LicenseRecord::parse_line("no comma"), None);
        assert_eq!(LicenseRecord::parse_line("a,b,c"), None);
        assert_eq!(LicenseRecord::parse_line(",MIT"), None);
    }

    #[test]
    fn test_parse_in_order() {
        let parsed = parse_scan_output("foo.c,MIT\nbar.c,GPL-2.0\n", ParseMode::Strict).unwrap();
        assert_eq!(
            parsed.records,
            vec![
                LicenseRecord::new("foo.c", "MIT"),
                LicenseRecord::new("bar.c", "GPL-2.0"),
            ]
        );
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let parsed =
            parse_scan_output("\r\nfoo.c,MIT\r\n\n   \nbar.c,Apache-2.0\r\n", ParseMode::Strict)
                .unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.records[1].license_info, "Apache-2.0");
    }

    #[test]
    fn test_empty_output() {
        let parsed = parse_scan_output("", ParseMode::Strict).unwrap();
        assert!(parsed.records.is_empty());
    }

    #[test]
    fn test_strict_reports_line_number() {
        let err = parse_scan_output("foo.c,MIT\n\nScanning done\n", ParseMode::Strict).unwrap_err();
        match err {
            TaskError::MalformedLine {
                line_number,
                content,
            } => {
                assert_eq!(line_number, 3);
                assert_eq!(content, "Scanning done");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_lenient_skips_with_warnings() {
        let parsed =
            parse_scan_output("header\nfoo.c,MIT\na,b,c\n", ParseMode::Lenient).unwrap();
        assert_eq!(parsed.records, vec![LicenseRecord::new("foo.c", "MIT")]);
        assert_eq!(
            parsed.warnings,
            vec![
                "Skipped malformed line 1: header".to_string(),
                "Skipped malformed line 3: a,b,c".to_string(),
            ]
        );
    }
}
