//! Source resolution through embedded Portable PDB sources.

use std::sync::Arc;

use crate::{metadata::pdb::DebugInfoSource, stacktrace::StackFrame, Error, Result};

use super::{ModuleLocator, SourceCache, SourceKey, SourceResolver, SourceText};

/// Strip compiler generated segments (those starting with `<`) from a type name.
///
/// `MyApp.Program.<>c__DisplayClass0_0` becomes `MyApp.Program`. A name made only of such
/// segments is returned unchanged.
#[must_use]
pub fn simplify_type_name(type_name: &str) -> String {
    let simplified = type_name
        .split('.')
        .filter(|segment| !segment.starts_with('<'))
        .collect::<Vec<_>>()
        .join(".");

    if simplified.is_empty() {
        type_name.to_string()
    } else {
        simplified
    }
}

/// Reads the source text embedded in the Portable PDB of the module defining a frame's type.
///
/// The PDB is either the `.pdb` file next to the module or the one embedded in the
/// module's debug directory. Files are opened per resolution and closed before it returns.
#[derive(Clone)]
pub struct PdbResolver {
    cache: Arc<SourceCache>,
    locator: Arc<dyn ModuleLocator>,
}

impl PdbResolver {
    /// A resolver backed by `cache` that finds modules through `locator`.
    pub fn new(cache: Arc<SourceCache>, locator: impl ModuleLocator + 'static) -> Self {
        PdbResolver {
            cache,
            locator: Arc::new(locator),
        }
    }

    /// A resolver sharing an existing locator.
    #[must_use]
    pub fn from_shared(cache: Arc<SourceCache>, locator: Arc<dyn ModuleLocator>) -> Self {
        PdbResolver { cache, locator }
    }

    /// A resolver backed by [`SourceCache::global`].
    pub fn with_global_cache(locator: impl ModuleLocator + 'static) -> Self {
        Self::new(SourceCache::global(), locator)
    }

    /// The cache this resolver reads and populates.
    #[must_use]
    pub fn cache(&self) -> &Arc<SourceCache> {
        &self.cache
    }
}

impl std::fmt::Debug for PdbResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdbResolver")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl SourceResolver for PdbResolver {
    fn name(&self) -> &'static str {
        "portable pdb"
    }

    fn is_candidate(&self, frame: &StackFrame) -> bool {
        frame.has_location()
    }

    fn resolve(&self, frame: &StackFrame, use_cache: bool) -> Result<SourceText> {
        if !frame.has_location() {
            return Err(Error::NoLocation);
        }

        let document = frame.file_name();
        let key = SourceKey::Document(document.to_string());
        if use_cache {
            if let Some(text) = self.cache.get(&key) {
                log::debug!("Source cache hit for document {}", document);
                return Ok(text);
            }
        }

        let type_name = simplify_type_name(&frame.declaring_type);
        let module = self
            .locator
            .locate(&type_name)
            .ok_or_else(|| Error::ModuleNotFound(type_name.clone()))?;

        let source = DebugInfoSource::locate(&module)?;
        log::debug!(
            "Reading embedded source of {} from {}",
            document,
            source.path().display()
        );

        let text = source.open()?.source_text(document)?;
        if text.trim().is_empty() {
            return Err(Error::EmptySource);
        }

        let text: SourceText = Arc::from(text);
        self.cache.insert(key, text.clone());
        Ok(text)
    }
}
