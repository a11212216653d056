//! The `Document` table (0x30) of a Portable PDB.
//!
//! Each row names a source document and identifies its language and content hash. The
//! name is not a plain string: it is a blob holding a separator character followed by
//! compressed blob indices of the path segments, see [`DocumentRaw::resolve_name`].

mod raw;

pub use raw::*;
