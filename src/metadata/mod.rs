//! Portable PDB metadata decoding.
//!
//! A Portable PDB is an ECMA-335 metadata image holding only debug tables. This module
//! decodes as much of it as is needed to read the source text that compilers embed for each
//! document.
//!
//! # Key Components
//!
//! - [`pdb`] - [`pdb::PortablePdb`] and [`pdb::DebugInfoSource`], the entry points
//! - [`root`] - The `BSJB` metadata root and stream directory
//! - [`streams`] - The `#Pdb`, `#~`, `#Blob` and `#GUID` streams
//! - [`tables`] - Debug table layout and the `Document` and `CustomDebugInformation` rows
//! - [`customdebuginformation`] - Record kinds and embedded source decoding
//! - [`token`] - Metadata tokens
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotsource::metadata::pdb::PortablePdb;
//! use std::path::Path;
//!
//! let pdb = PortablePdb::from_file(Path::new("MyApp.pdb"))?;
//! println!("{} documents", pdb.document_count());
//! # Ok::<(), dotsource::Error>(())
//! ```

/// Custom debug information record kinds and embedded source records
pub mod customdebuginformation;
/// Portable PDB images and embedded source lookup
pub mod pdb;
/// The metadata root
pub mod root;
/// Metadata streams and heaps
pub mod streams;
/// Debug tables
pub mod tables;
/// Metadata tokens
pub mod token;
