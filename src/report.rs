//! The error report that enrichment writes into.
//!
//! [`ErrorReport`] stands in for the message object of the logging client that owns the
//! report. Enrichment reads the stack trace from [`ErrorReport::detail`], sets
//! [`ErrorReport::code`] and appends [`Annotation`]s; it never removes or reorders
//! existing annotations.

use std::fmt;

/// First line number of the attached code window.
pub const CODE_START_LINE_KEY: &str = "X-ELMAHIO-CODESTARTLINE";
/// Line that threw.
pub const CODE_LINE_KEY: &str = "X-ELMAHIO-CODELINE";
/// Source file the code window was taken from.
pub const CODE_FILENAME_KEY: &str = "X-ELMAHIO-CODEFILENAME";
/// `<file>:<start>-<line>`, used instead of the three keys above by the inline-marker style.
pub const CODE_SNIPPET_KEY: &str = "X-ELMAHIO-CODESNIPPET";
/// Message of an unexpected failure during enrichment.
pub const CODE_ERROR_KEY: &str = "X-ELMAHIO-CODEERROR";

/// A key/value pair attached to a report.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    /// Annotation key, e.g. [`CODE_LINE_KEY`]
    pub key: String,
    /// Annotation value
    pub value: String,
}

impl Annotation {
    /// Create an annotation.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Annotation {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// An error report carrying a stack trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorReport {
    /// Full exception text including the stack trace
    pub detail: Option<String>,
    /// Source code around the line that threw
    pub code: Option<String>,
    /// Additional key/value data
    pub data: Vec<Annotation>,
}

impl ErrorReport {
    /// A report with the given exception text.
    pub fn new(detail: impl Into<String>) -> Self {
        ErrorReport {
            detail: Some(detail.into()),
            ..ErrorReport::default()
        }
    }

    /// Value of the first annotation with `key`.
    #[must_use]
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|annotation| annotation.key == key)
            .map(|annotation| annotation.value.as_str())
    }

    /// Append an annotation.
    pub fn push_annotation(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data.push(Annotation::new(key, value));
    }
}
