//! Extraction of the code window around the line that threw.
//!
//! The window starts ten lines before the target line and spans at most 21 lines, clipped at
//! the start and end of the file. Lines are split on the platform line terminator.

use crate::{
    report::{
        Annotation, CODE_FILENAME_KEY, CODE_LINE_KEY, CODE_SNIPPET_KEY, CODE_START_LINE_KEY,
    },
    stacktrace::StackFrame,
};

/// Line terminator that source text is split on.
#[cfg(windows)]
pub const LINE_TERMINATOR: &str = "\r\n";
/// Line terminator that source text is split on.
#[cfg(not(windows))]
pub const LINE_TERMINATOR: &str = "\n";

/// Lines included before the target line.
pub const LINES_BEFORE: u32 = 10;
/// Maximum number of lines in a window.
pub const WINDOW_SIZE: usize = 21;

/// Appended to the target line by [`SnippetStyle::InlineMarker`].
pub const INLINE_MARKER: &str = " // <-- An error is thrown in this line";

/// How a snippet is rendered into a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnippetStyle {
    /// The bare window; start line, target line and file name go into three annotations
    #[default]
    Windowed,
    /// The window with the target line marked; one annotation `<file>:<start>-<target>`
    InlineMarker,
}

/// A window of source lines around a target line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// The window, lines joined by [`LINE_TERMINATOR`]
    pub text: String,
    /// 1-based number of the first line of the window
    pub start_line: u32,
    /// 1-based number of the line that threw
    pub target_line: u32,
    /// Source file the window was taken from
    pub file: String,
}

/// Cut the window around `target_line` (1-based) out of `source`.
///
/// Returns `None` if the source has fewer than `target_line - 1` lines or the window is
/// blank.
#[must_use]
pub fn extract(source: &str, target_line: u32) -> Option<Snippet> {
    if target_line == 0 {
        return None;
    }

    let lines: Vec<&str> = source.split(LINE_TERMINATOR).collect();
    let target_index = (target_line - 1) as usize;
    if lines.len() < target_index {
        return None;
    }

    let start_index = target_index.saturating_sub(LINES_BEFORE as usize);
    let end_index = lines.len().min(start_index + WINDOW_SIZE);
    let text = lines[start_index..end_index].join(LINE_TERMINATOR);
    if text.trim().is_empty() {
        return None;
    }

    Some(Snippet {
        text,
        start_line: u32::try_from(start_index + 1).ok()?,
        target_line,
        file: String::new(),
    })
}

impl Snippet {
    /// Cut the window for the location of `frame`.
    #[must_use]
    pub fn for_frame(source: &str, frame: &StackFrame) -> Option<Snippet> {
        let mut snippet = extract(source, frame.line)?;
        snippet.file = frame.file_name().to_string();
        Some(snippet)
    }

    /// The window as it goes into the report's code field.
    #[must_use]
    pub fn render(&self, style: SnippetStyle) -> String {
        match style {
            SnippetStyle::Windowed => self.text.clone(),
            SnippetStyle::InlineMarker => {
                let target_offset = (self.target_line - self.start_line) as usize;
                self.text
                    .split(LINE_TERMINATOR)
                    .enumerate()
                    .map(|(offset, line)| {
                        if offset == target_offset {
                            format!("{line}{INLINE_MARKER}")
                        } else {
                            line.to_string()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(LINE_TERMINATOR)
            }
        }
    }

    /// The annotations that describe this window.
    #[must_use]
    pub fn annotations(&self, style: SnippetStyle) -> Vec<Annotation> {
        match style {
            SnippetStyle::Windowed => vec![
                Annotation::new(CODE_START_LINE_KEY, self.start_line.to_string()),
                Annotation::new(CODE_LINE_KEY, self.target_line.to_string()),
                Annotation::new(CODE_FILENAME_KEY, self.file.clone()),
            ],
            SnippetStyle::InlineMarker => vec![Annotation::new(
                CODE_SNIPPET_KEY,
                format!("{}:{}-{}", self.file, self.start_line, self.target_line),
            )],
        }
    }
}
