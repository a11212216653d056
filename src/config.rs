//! Enrichment configuration.

use crate::snippet::SnippetStyle;

/// Configuration of a [`crate::MessageEnricher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnricherConfig {
    /// Serve source text from the cache when present. Resolved text is cached either way.
    pub use_cache: bool,
    /// How the snippet is written into the report
    pub style: SnippetStyle,
    /// Attach the message of an unexpected failure as a diagnostic annotation
    pub report_errors: bool,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            use_cache: true,
            style: SnippetStyle::Windowed,
            report_errors: true,
        }
    }
}

impl EnricherConfig {
    /// Always re-read sources, for hosts whose sources change while running.
    #[must_use]
    pub fn uncached() -> Self {
        Self {
            use_cache: false,
            ..Self::default()
        }
    }

    /// Leave the report untouched when enrichment fails unexpectedly.
    #[must_use]
    pub fn silent() -> Self {
        Self {
            report_errors: false,
            ..Self::default()
        }
    }

    /// Set [`EnricherConfig::use_cache`].
    #[must_use]
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Set [`EnricherConfig::style`].
    #[must_use]
    pub fn with_style(mut self, style: SnippetStyle) -> Self {
        self.style = style;
        self
    }

    /// Set [`EnricherConfig::report_errors`].
    #[must_use]
    pub fn with_error_reporting(mut self, report_errors: bool) -> Self {
        self.report_errors = report_errors;
        self
    }
}
