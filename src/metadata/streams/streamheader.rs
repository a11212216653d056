//! Stream directory entries of a metadata root.
//!
//! Each entry is `offset: u32`, `size: u32` and a NUL-terminated ASCII name padded to a
//! 4-byte boundary (ECMA-335 II.24.2.2). Portable PDB images add the `#Pdb` stream to the
//! usual heaps.

use crate::{file::io::read_le, Result};

/// Stream names accepted in a metadata root.
pub const KNOWN_STREAMS: [&str; 8] = [
    "#Pdb", "#~", "#-", "#Strings", "#US", "#Blob", "#GUID", "#JTD",
];

/// Longest stream name, excluding the terminator.
const MAX_NAME_LEN: usize = 32;

/// A single stream directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    /// Offset of the stream, relative to the metadata root
    pub offset: u32,
    /// Size of the stream in bytes
    pub size: u32,
    /// Stream name, e.g. `#Blob`
    pub name: String,
}

impl StreamHeader {
    /// Read a stream header from the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is truncated and
    /// [`crate::Error::Malformed`] for an unknown stream name.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(out_of_bounds_error!());
        }

        let name_area = &data[8..data.len().min(8 + MAX_NAME_LEN + 1)];
        let name_len = name_area
            .iter()
            .position(|byte| *byte == 0)
            .unwrap_or(name_area.len());
        let name: String = name_area[..name_len].iter().copied().map(char::from).collect();

        if !KNOWN_STREAMS.iter().any(|valid_name| name == *valid_name) {
            return Err(malformed_error!("Invalid stream header name - {}", name));
        }

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name,
        })
    }

    /// Size of this entry in the stream directory, including name padding.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        8 + ((self.name.len() + 1 + 3) & !3)
    }
}
