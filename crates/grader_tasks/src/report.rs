//! Rendering of license records.
//!
//! XML is the default output:
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <root>
//!   <data>
//!     <file val="foo.c"/>
//!     <license_info val="MIT"/>
//!   </data>
//! </root>
//! ```

use std::str::FromStr;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::error::{TaskError, TaskResult};
use crate::spdx::LicenseRecord;

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Xml,
    Json,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Xml => "xml",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReportFormat {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xml" => Ok(Self::Xml),
            "json" => Ok(Self::Json),
            other => Err(TaskError::Config(format!("unknown report format '{}'", other))),
        }
    }
}

/// Render `records` in the requested format.
pub fn render(records: &[LicenseRecord], format: ReportFormat) -> TaskResult<String> {
    match format {
        ReportFormat::Xml => to_xml(records),
        ReportFormat::Json => to_json(records),
    }
}

/// `<root><data>` document with one `file`/`license_info` pair per record.
pub fn to_xml(records: &[LicenseRecord]) -> TaskResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("root")))?;
    writer.write_event(Event::Start(BytesStart::new("data")))?;
    for record in records {
        writer.write_event(Event::Empty(
            BytesStart::new("file").with_attributes([("val", record.file.as_str())]),
        ))?;
        writer.write_event(Event::Empty(
            BytesStart::new("license_info")
                .with_attributes([("val", record.license_info.as_str())]),
        ))?;
    }
    writer.write_event(Event::End(BytesEnd::new("data")))?;
    writer.write_event(Event::End(BytesEnd::new("root")))?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Pretty-printed JSON array of records.
pub fn to_json(records: &[LicenseRecord]) -> TaskResult<String> {
    serde_json::to_string_pretty(records).map_err(TaskError::from)
}
