//! Custom debug information records of a Portable PDB.
//!
//! Each `CustomDebugInformation` row attaches a GUID-identified blob to a metadata entity.
//! [`CustomDebugKind`] classifies the GUID; [`EmbeddedSource`] decodes the one record kind
//! this crate consumes, the source text that compilers embed for
//! `<EmbedAllSources>true</EmbedAllSources>` builds.
//!
//! # Examples
//!
//! ```rust,ignore
//! use dotsource::metadata::customdebuginformation::{CustomDebugKind, EmbeddedSource};
//!
//! if CustomDebugKind::from_guid(kind_guid) == CustomDebugKind::EmbeddedSource {
//!     let text = EmbeddedSource::parse(value_blob)?.decode_text()?;
//!     println!("{text}");
//! }
//! # Ok::<(), dotsource::Error>(())
//! ```

mod embeddedsource;
mod types;

pub use embeddedsource::EmbeddedSource;
pub use types::{
    CustomDebugKind, COMPILATION_METADATA, COMPILATION_OPTIONS, EMBEDDED_SOURCE, SOURCE_LINK,
};
