//! Output styling for status lines.
//!
//! Terminal detection happens once, in [`ColorChoice::resolve`]. The result is
//! a plain [`OutputStyle`] value handed to the reporter, so rendering never
//! consults global state and can be exercised without a terminal.

use std::io::IsTerminal;
use std::str::FromStr;

use crossterm::style::{Color, Stylize};
use serde::{Deserialize, Serialize};

use crate::status::Status;

/// User preference for colored output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Decorate only when stdout is a terminal and `NO_COLOR` is unset.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    /// Resolve the preference against the current process environment.
    pub fn resolve(self) -> OutputStyle {
        match self {
            Self::Always => OutputStyle::decorated(),
            Self::Never => OutputStyle::plain(),
            Self::Auto => {
                let is_tty = std::io::stdout().is_terminal();
                let no_color = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
                OutputStyle::detect(is_tty, no_color, cfg!(windows))
            }
        }
    }
}

impl FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            other => Err(format!("unknown color choice: {other}")),
        }
    }
}

/// How status lines are decorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputStyle {
    /// Emit ANSI colors and attributes.
    pub color: bool,
    /// Emit the unicode status marks.
    pub marks: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self::plain()
    }
}

impl OutputStyle {
    pub const fn plain() -> Self {
        Self {
            color: false,
            marks: false,
        }
    }

    pub const fn decorated() -> Self {
        Self {
            color: true,
            marks: true,
        }
    }

    /// Pick a style from terminal facts.
    ///
    /// Marks are dropped on Windows consoles, which often lack the glyphs.
    pub fn detect(is_tty: bool, no_color: bool, is_windows: bool) -> Self {
        Self {
            color: is_tty && !no_color,
            marks: is_tty && !is_windows,
        }
    }

    /// Render one status line, without the trailing newline.
    pub fn render_line(&self, status: Status, message: &str) -> String {
        let tag = status.tag();
        let tag = if self.color {
            tag.white().on_black().bold().to_string()
        } else {
            tag.to_string()
        };

        let body = if self.color {
            message.white().bold().to_string()
        } else {
            message.to_string()
        };

        if !self.marks {
            return format!("{} {}", tag, body);
        }

        let mark = status.mark();
        match status {
            // The start mark leads the label; every other mark trails the message.
            Status::Started => format!("{} {} {}", tag, mark, body),
            _ => {
                let mark = if self.color {
                    mark.with(mark_color(status)).to_string()
                } else {
                    mark.to_string()
                };
                format!("{} {} {}", tag, body, mark)
            }
        }
    }
}

fn mark_color(status: Status) -> Color {
    match status {
        Status::Success => Color::Green,
        Status::Warning => Color::Yellow,
        Status::Error => Color::Red,
        Status::Note => Color::Cyan,
        Status::Started => Color::White,
    }
}
