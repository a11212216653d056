//! Helpers shared by the integration tests.
#![allow(dead_code)]

#[path = "../../src/test/builders.rs"]
pub mod builders;

use std::path::{Path, PathBuf};

use dotsource::{snippet::LINE_TERMINATOR, Error, Result};

/// Write `contents` to `dir/name` and return the full path.
pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}

/// `path` as it appears in a stack trace.
pub fn trace_path(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| Error::Error(format!("Path is not UTF-8 - {}", path.display())))
}

/// Lines `first..=last` of [`builders::numbered_source`], joined for comparison with a
/// rendered snippet.
pub fn numbered_window(first: usize, last: usize) -> String {
    (first..=last)
        .map(|line| format!("    var line{line} = {line};"))
        .collect::<Vec<_>>()
        .join(LINE_TERMINATOR)
}

/// A trace whose frames are `(type, method, location)` with `location` as `(file, line)`.
pub fn trace(frames: &[(&str, &str, Option<(&str, u32)>)]) -> String {
    let mut text = String::from("System.InvalidOperationException: Operation is not valid.");
    for (declaring_type, method, location) in frames {
        text.push_str("\n   at ");
        text.push_str(declaring_type);
        text.push('.');
        text.push_str(method);
        text.push_str("()");
        if let Some((file, line)) = location {
            text.push_str(&format!(" in {file}:line {line}"));
        }
    }
    text
}
