//! Status kinds and the completion value returned by bracketed work.

use serde::{Deserialize, Serialize};

/// Kind of a status line.
///
/// `Started` opens a bracket; `Success`, `Warning` and `Error` close it.
/// `Note` lines are informational and may appear between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Started,
    Success,
    Warning,
    Error,
    Note,
}

impl Status {
    /// Fixed-width tag printed at the start of the line.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Started => "  START  ",
            Self::Success => " SUCCESS ",
            Self::Warning => " WARNING ",
            Self::Error => "  ERROR  ",
            Self::Note => "  NOTE   ",
        }
    }

    /// Decorative mark shown on capable terminals.
    pub fn mark(&self) -> &'static str {
        match self {
            Self::Started => "\u{2712}",
            Self::Success => "\u{2714}",
            Self::Warning => "\u{26A0}",
            Self::Error => "\u{2718}",
            Self::Note => "\u{2710}",
        }
    }

    /// Whether this status closes a bracket.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Success | Self::Warning | Self::Error)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Started => "started",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Note => "note",
        };
        write!(f, "{}", name)
    }
}

/// Value produced by work that ran to completion.
///
/// `Warned` replaces the mutable "signal" map of a classic context manager:
/// work that wants a warning banner says so in its return value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Completion<T> {
    /// Finished without anything worth flagging.
    Clean(T),
    /// Finished, but with non-fatal problems to report.
    Warned { value: T, warnings: Vec<String> },
}

impl<T> Completion<T> {
    pub fn clean(value: T) -> Self {
        Self::Clean(value)
    }

    pub fn warned<I, S>(value: T, warnings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Warned {
            value,
            warnings: warnings.into_iter().map(Into::into).collect(),
        }
    }

    /// `Clean` when `warnings` is empty, `Warned` otherwise.
    pub fn from_warnings(value: T, warnings: Vec<String>) -> Self {
        if warnings.is_empty() {
            Self::Clean(value)
        } else {
            Self::Warned { value, warnings }
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            Self::Clean(_) => &[],
            Self::Warned { warnings, .. } => warnings,
        }
    }

    /// Closing status a bracket reports for this completion.
    pub fn status(&self) -> Status {
        if self.warnings().is_empty() {
            Status::Success
        } else {
            Status::Warning
        }
    }

    pub fn into_parts(self) -> (T, Vec<String>) {
        match self {
            Self::Clean(value) => (value, Vec::new()),
            Self::Warned { value, warnings } => (value, warnings),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Completion<U> {
        match self {
            Self::Clean(value) => Completion::Clean(f(value)),
            Self::Warned { value, warnings } => Completion::Warned {
                value: f(value),
                warnings,
            },
        }
    }
}
