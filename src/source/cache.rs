//! Process-wide cache of resolved source text.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use super::{SourceKey, SourceText};

static GLOBAL_CACHE: OnceLock<Arc<SourceCache>> = OnceLock::new();

/// Concurrent map from [`SourceKey`] to resolved text.
///
/// Entries are never evicted. Only non-blank text is stored, so a file that was empty or
/// unreadable is retried on the next lookup.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: DashMap<SourceKey, SourceText>,
}

impl SourceCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        SourceCache::default()
    }

    /// The cache shared by the convenience entry points of this crate.
    #[must_use]
    pub fn global() -> Arc<SourceCache> {
        GLOBAL_CACHE
            .get_or_init(|| Arc::new(SourceCache::new()))
            .clone()
    }

    /// Cached text for `key`.
    #[must_use]
    pub fn get(&self, key: &SourceKey) -> Option<SourceText> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Store `text` under `key`, replacing any previous entry.
    ///
    /// Returns `false` without storing anything if `text` is blank.
    pub fn insert(&self, key: SourceKey, text: SourceText) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        self.entries.insert(key, text);
        true
    }

    /// `true` if `key` has an entry.
    #[must_use]
    pub fn contains(&self, key: &SourceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
