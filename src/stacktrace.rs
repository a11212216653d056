//! Parsing of .NET stack trace text into frames.
//!
//! A frame line has the shape
//!
//! ```text
//!    at <DeclaringType>.<Method>(<Type> <name>, ...) in <file>:line <number>
//! ```
//!
//! where the ` in <file>:line <number>` suffix only appears when debug information was
//! available to the runtime. Every other line (the exception message, `---> ` headers of
//! inner exceptions, `--- End of inner exception stack trace ---` and
//! `--- End of stack trace from previous location ---` markers) is skipped.
//!
//! # Examples
//!
//! ```rust
//! use dotsource::stacktrace::parse;
//!
//! let trace = "System.DivideByZeroException: Attempted to divide by zero.\n   \
//!     at MyApp.Program.<>c.<Main>b__0_0(Int32 x) in /src/MyApp/Program.cs:line 14\n   \
//!     at MyApp.Program.Main(String[] args)";
//!
//! let frames: Vec<_> = parse(trace).collect();
//! assert_eq!(frames.len(), 2);
//! assert_eq!(frames[0].declaring_type, "MyApp.Program.<>c");
//! assert_eq!(frames[0].method_name, "<Main>b__0_0");
//! assert_eq!(frames[0].line, 14);
//! assert!(!frames[1].has_location());
//! ```

use std::{fmt, sync::OnceLock};

use regex::{Captures, Regex};

static FRAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn frame_regex() -> &'static Regex {
    FRAME_REGEX.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^\s*at\s+
            # Everything up to the last '.' before the method; may hold '<>' segments
            (?P<type>.*[^.])
            \.
            # '.ctor' and '.cctor' keep their leading dot, generic methods their '[T]'
            (?P<method>\.?[^.(\s\[]+(?:\[[^\]]*\])?)
            \((?P<params>[^)]*)\)
            (?:\s+in\s+(?P<file>.+):line\s+(?P<line>\d+))?
            \s*$
            ",
        )
        .expect("Failed to compile stack frame regex")
    })
}

/// One `at ...` line of a stack trace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StackFrame {
    /// Full name of the type declaring the method, including compiler generated segments
    pub declaring_type: String,
    /// Method name, with its generic arguments if any
    pub method_name: String,
    /// The parameter list as written between the parentheses
    pub parameter_list: String,
    /// The individual `<Type> <name>` entries of the parameter list
    pub parameters: Vec<String>,
    /// Source file, as recorded at build time
    pub file: Option<String>,
    /// 1-based source line, 0 if unknown
    pub line: u32,
}

impl StackFrame {
    /// Parse a single line; `None` if it is not a frame line.
    #[must_use]
    pub fn parse_line(line: &str) -> Option<StackFrame> {
        frame_regex().captures(line).map(|captures| Self::from_captures(&captures))
    }

    fn from_captures(captures: &Captures<'_>) -> StackFrame {
        let group = |name: &str| captures.name(name).map_or("", |group| group.as_str());
        let parameter_list = group("params").to_string();

        StackFrame {
            declaring_type: group("type").trim().to_string(),
            method_name: group("method").to_string(),
            parameters: split_parameters(&parameter_list),
            parameter_list,
            file: captures
                .name("file")
                .map(|file| file.as_str().trim().to_string()),
            // A line number past u32 is treated as absent
            line: captures
                .name("line")
                .and_then(|line| line.as_str().parse().ok())
                .unwrap_or(0),
        }
    }

    /// `true` if the frame names a source file and a line.
    #[must_use]
    pub fn has_location(&self) -> bool {
        self.line > 0
            && self
                .file
                .as_deref()
                .is_some_and(|file| !file.trim().is_empty())
    }

    /// The source file, empty if unknown.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.file.as_deref().unwrap_or("")
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "at {}.{}({})",
            self.declaring_type, self.method_name, self.parameter_list
        )?;
        if self.has_location() {
            write!(f, " in {}:line {}", self.file_name(), self.line)?;
        }
        Ok(())
    }
}

/// Split a parameter list on the commas that are not inside generic brackets.
fn split_parameters(list: &str) -> Vec<String> {
    let mut parameters = Vec::new();
    let mut depth = 0_usize;
    let mut start = 0;

    for (index, character) in list.char_indices() {
        match character {
            '[' | '<' => depth += 1,
            ']' | '>' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parameters.push(&list[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parameters.push(&list[start..]);

    parameters
        .into_iter()
        .map(str::trim)
        .filter(|parameter| !parameter.is_empty())
        .map(str::to_string)
        .collect()
}

/// Lazy iterator over the frames of a stack trace, in trace order.
#[derive(Debug, Clone)]
pub struct StackTraceIter<'a> {
    lines: std::str::Lines<'a>,
}

impl Iterator for StackTraceIter<'_> {
    type Item = StackFrame;

    fn next(&mut self) -> Option<Self::Item> {
        self.lines.by_ref().find_map(StackFrame::parse_line)
    }
}

/// Parse the frames of a stack trace.
///
/// Never fails: lines that are not frames are skipped. Both `\n` and `\r\n` line endings
/// are accepted.
#[must_use]
pub fn parse(text: &str) -> StackTraceIter<'_> {
    StackTraceIter {
        lines: text.lines(),
    }
}
