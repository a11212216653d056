//! Source text resolution for stack frames.
//!
//! A [`SourceResolver`] turns a frame into the full text of the file it points at. Two
//! strategies exist:
//!
//! - [`FileSystemResolver`] reads the file at the recorded path, for hosts that deploy their
//!   sources
//! - [`PdbResolver`] reads the source embedded in the Portable PDB of the module defining
//!   the frame's type, for hosts that only deploy binaries
//!
//! Both share a [`SourceCache`], so a file is read or decompressed at most once per
//! process unless caching is bypassed.

mod cache;
mod filesystem;
mod locator;
mod pdb;

use std::{path::PathBuf, sync::Arc};

use crate::{stacktrace::StackFrame, Result};

pub use cache::SourceCache;
pub use filesystem::FileSystemResolver;
pub use locator::{ModuleLocator, StaticModuleLocator};
pub use pdb::{simplify_type_name, PdbResolver};

/// Immutable source text, shared between the cache and its readers.
pub type SourceText = Arc<str>;

/// Key of a [`SourceCache`] entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKey {
    /// A file read from disk
    Path(PathBuf),
    /// A document name resolved through debug information
    Document(String),
}

/// A strategy producing the source text for a stack frame.
pub trait SourceResolver: Send + Sync {
    /// Short name used in log messages.
    fn name(&self) -> &'static str;

    /// `true` if `frame` meets the preconditions of [`SourceResolver::resolve`].
    fn is_candidate(&self, frame: &StackFrame) -> bool;

    /// Produce the full, non-blank source text of the file `frame` points at.
    ///
    /// With `use_cache` set, cached text is returned without I/O. Resolved text is added to
    /// the cache regardless.
    ///
    /// # Errors
    /// Returns a recoverable error (see [`crate::Error::is_recoverable`]) if this frame
    /// cannot be resolved, and any other error for damaged files.
    fn resolve(&self, frame: &StackFrame, use_cache: bool) -> Result<SourceText>;
}

impl<T: SourceResolver + ?Sized> SourceResolver for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn is_candidate(&self, frame: &StackFrame) -> bool {
        (**self).is_candidate(frame)
    }

    fn resolve(&self, frame: &StackFrame, use_cache: bool) -> Result<SourceText> {
        (**self).resolve(frame, use_cache)
    }
}

impl<T: SourceResolver + ?Sized> SourceResolver for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn is_candidate(&self, frame: &StackFrame) -> bool {
        (**self).is_candidate(frame)
    }

    fn resolve(&self, frame: &StackFrame, use_cache: bool) -> Result<SourceText> {
        (**self).resolve(frame, use_cache)
    }
}
