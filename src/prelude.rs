//! # dotsource Prelude
//!
//! The types needed to enrich reports, for glob import.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotsource operations
pub use crate::Error;

/// The result type used throughout dotsource
pub use crate::Result;

// ================================================================================================
// Enrichment
// ================================================================================================

/// The enrichment pipeline and its results
pub use crate::enricher::{EnrichmentOutcome, ErrorReportExt, MessageEnricher, Stage};

/// Configuration of the pipeline
pub use crate::config::EnricherConfig;

/// The report written by enrichment
pub use crate::report::{Annotation, ErrorReport};

/// Code windows
pub use crate::snippet::{Snippet, SnippetStyle};

// ================================================================================================
// Sources
// ================================================================================================

/// Stack trace parsing
pub use crate::stacktrace::{parse as parse_stack_trace, StackFrame};

/// Resolution strategies
pub use crate::source::{
    FileSystemResolver, ModuleLocator, PdbResolver, SourceCache, SourceKey, SourceResolver,
    SourceText, StaticModuleLocator,
};

/// Portable PDB access
pub use crate::metadata::pdb::{DebugInfoSource, PortablePdb};
