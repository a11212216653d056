//! Source resolution from the local file system.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{stacktrace::StackFrame, utils::decode_source_text, Error, Result};

use super::{SourceCache, SourceKey, SourceResolver, SourceText};

/// Reads source files at the paths recorded in stack frames.
///
/// Suitable when sources are deployed alongside the binaries at the path they had on the
/// build machine.
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    cache: Arc<SourceCache>,
}

impl FileSystemResolver {
    /// A resolver backed by `cache`.
    #[must_use]
    pub fn new(cache: Arc<SourceCache>) -> Self {
        FileSystemResolver { cache }
    }

    /// A resolver backed by [`SourceCache::global`].
    #[must_use]
    pub fn with_global_cache() -> Self {
        Self::new(SourceCache::global())
    }

    /// The cache this resolver reads and populates.
    #[must_use]
    pub fn cache(&self) -> &Arc<SourceCache> {
        &self.cache
    }
}

impl SourceResolver for FileSystemResolver {
    fn name(&self) -> &'static str {
        "file system"
    }

    fn is_candidate(&self, frame: &StackFrame) -> bool {
        frame.has_location() && Path::new(frame.file_name()).is_file()
    }

    fn resolve(&self, frame: &StackFrame, use_cache: bool) -> Result<SourceText> {
        if !frame.has_location() {
            return Err(Error::NoLocation);
        }

        let path = PathBuf::from(frame.file_name());
        let key = SourceKey::Path(path.clone());
        if use_cache {
            if let Some(text) = self.cache.get(&key) {
                log::debug!("Source cache hit for {}", path.display());
                return Ok(text);
            }
        }

        let text = decode_source_text(&std::fs::read(&path)?);
        if text.trim().is_empty() {
            return Err(Error::EmptySource);
        }

        let text: SourceText = Arc::from(text);
        self.cache.insert(key, text.clone());
        Ok(text)
    }
}
