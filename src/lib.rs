// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
//#![deny(unsafe_code)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # dotsource
//!
//! Attach the source code around the line that threw to .NET error reports.
//!
//! Given the text of an exception with its stack trace, `dotsource` finds the first frame
//! whose source can be recovered, cuts a window of up to 21 lines around the failing line
//! and writes it into the report together with a few annotations. Source text comes from
//! one of two places:
//!
//! - **The file system** - the file at the path recorded in the frame, when sources are
//!   deployed with the application
//! - **Portable PDBs** - source text embedded at build time
//!   (`<EmbedAllSources>true</EmbedAllSources>`), read from the `.pdb` next to the module
//!   or from the PDB embedded in the module itself
//!
//! Enrichment is best-effort: it never fails the caller and leaves the report untouched
//! unless a snippet was produced.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dotsource::prelude::*;
//!
//! let mut report = ErrorReport::new(
//!     "System.NullReferenceException: Object reference not set to an instance of an object.\n   \
//!      at MyApp.Program.Main(String[] args) in /src/MyApp/Program.cs:line 14",
//! );
//!
//! // Sources deployed on disk
//! report.with_source_code_from_file_system(true);
//!
//! // Sources embedded in the PDB of the module defining the failing type
//! let locator = StaticModuleLocator::new().with_module("MyApp", "/app/MyApp.dll");
//! report.with_source_code_from_pdb(locator, true);
//!
//! if let Some(code) = &report.code {
//!     println!("{code}");
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`stacktrace`] - Parse stack trace text into [`stacktrace::StackFrame`]s
//! - [`source`] - [`source::SourceResolver`] strategies and the shared [`source::SourceCache`]
//! - [`metadata`] - Portable PDB decoding down to the embedded source records
//! - [`file`] - PE modules and their debug directory
//! - [`snippet`] - The code window and its rendering
//! - [`enricher`] - The [`MessageEnricher`] pipeline and convenience entry points
//! - [`report`] - The [`ErrorReport`] that enrichment writes into
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade: skipped frames and cache hits at `debug`,
//! ambiguous debug records and failed enrichments at `warn`. No logger is installed.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit- and integration-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust,no_run
/// use dotsource::prelude::*;
///
/// let mut report = ErrorReport::new("System.Exception: boom");
/// let outcome = report.with_source_code_from_file_system(true);
/// println!("{outcome}");
/// ```
pub mod prelude;

/// Enrichment configuration
pub mod config;
/// The enrichment pipeline
pub mod enricher;
/// PE modules, backends and little-endian reading
pub mod file;
/// Portable PDB metadata
pub mod metadata;
/// The error report written by enrichment
pub mod report;
/// Code windows around a line
pub mod snippet;
/// Source resolution strategies and caching
pub mod source;
/// Stack trace parsing
pub mod stacktrace;
/// Decompression and text decoding helpers
pub mod utils;

/// `dotsource` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotsource` Error type
///
/// # Examples
///
/// ```rust,no_run
/// use dotsource::{metadata::pdb::PortablePdb, Error};
///
/// match PortablePdb::from_file(std::path::Path::new("MyApp.pdb")) {
///     Ok(pdb) => println!("{} documents", pdb.document_count()),
///     Err(Error::NotSupported) => println!("PDB stores type-system tables"),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

pub use config::EnricherConfig;
pub use enricher::{
    with_source_code_from_file_system, with_source_code_from_pdb, EnrichmentOutcome,
    ErrorReportExt, MessageEnricher, Stage,
};
pub use report::{Annotation, ErrorReport};
pub use snippet::{Snippet, SnippetStyle};
pub use stacktrace::StackFrame;
