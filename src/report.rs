//! Human-readable error reports, and the fail-fast exit for callers that
//! want a surfaced error to end the process.
use crate::core::Result;
use std::fmt;

/// Exit status used by [`die`].
pub const FATAL_EXIT_CODE: i32 = 1;

/// A titled error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub title: String,
    pub message: String,
}

impl ErrorReport {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorReport {
            title: title.into(),
            message: message.into(),
        }
    }

    /// Renders the report as an HTML fragment.
    pub fn to_html(&self) -> String {
        format!(
            "<h3>PrefSql</h3>\n<h4>{}</h4>\n<p>The error is: <em>{}</em></p>",
            escape_html(&self.title),
            escape_html(&self.message)
        )
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PrefSql: {}", self.title)?;
        write!(f, "The error is: {}", self.message)
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Prints the report to stdout and terminates the process.
pub fn die(report: &ErrorReport) -> ! {
    println!("{}", report);
    std::process::exit(FATAL_EXIT_CODE)
}

/// Restores fail-fast handling on any PrefSql result.
pub trait OrDie<T> {
    /// Returns the value, or prints the error's report and exits.
    fn or_die(self) -> T;
}

impl<T> OrDie<T> for Result<T> {
    fn or_die(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => die(&err.report()),
        }
    }
}
