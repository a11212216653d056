//! Readers for the Portable PDB debug tables.
//!
//! Only the rows needed to locate embedded source are decoded into types
//! ([`DocumentRaw`], [`CustomDebugInformationRaw`]); the remaining debug tables are sized so
//! that the tables stream can be laid out, see [`TableInfo::debug_row_size`].

pub mod customdebuginformation;
pub mod document;
pub mod types;

pub use customdebuginformation::CustomDebugInformationRaw;
pub use document::DocumentRaw;
pub use types::*;
