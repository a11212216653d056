//! Metadata streams of a Portable PDB image.
//!
//! - [`PdbStream`] - `#Pdb`, build id and external row counts
//! - [`TablesHeader`] - `#~`, the debug tables
//! - [`Blob`] - `#Blob`, document names and record values
//! - [`Guid`] - `#GUID`, languages and record kinds
//! - [`StreamHeader`] - an entry of the stream directory in the metadata root

mod blob;
mod guid;
mod pdbstream;
mod streamheader;
mod tablesheader;

pub use blob::Blob;
pub use guid::Guid;
pub use pdbstream::PdbStream;
pub use streamheader::{StreamHeader, KNOWN_STREAMS};
pub use tablesheader::TablesHeader;
