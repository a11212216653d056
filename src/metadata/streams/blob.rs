//! The `#Blob` heap.
//!
//! Entries are length-prefixed with an ECMA-335 compressed unsigned integer and addressed
//! by their byte offset into the heap. Offset 0 always holds the empty blob. Portable PDB
//! images keep document names, embedded sources and other debug record values here.

use crate::{file::parser::Parser, Result};

/// Read access to a `#Blob` heap.
#[derive(Debug, Clone, Copy)]
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Wrap the raw bytes of a `#Blob` stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap does not start with the empty blob.
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// The blob at byte offset `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index or the declared length runs past
    /// the heap.
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        if index >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        let skip = parser.pos();

        let Some(data_start) = index.checked_add(skip) else {
            return Err(out_of_bounds_error!());
        };

        let Some(data_end) = data_start.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };

        if data_end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(&self.data[data_start..data_end])
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always `false` for a successfully constructed heap.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
