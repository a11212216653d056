//! The `#GUID` heap.
//!
//! A packed array of 16-byte GUIDs addressed by a 1-based index; index 0 means "no GUID".
//! Portable PDB images store document languages, hash algorithms and the kinds of custom
//! debug information records here.

use crate::Result;

const GUID_SIZE: usize = 16;

/// Read access to a `#GUID` heap.
#[derive(Debug, Clone, Copy)]
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Wrap the raw bytes of a `#GUID` stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the stream length is not a multiple of 16.
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() % GUID_SIZE != 0 {
            return Err(malformed_error!(
                "#GUID heap size {} is not a multiple of 16",
                data.len()
            ));
        }

        Ok(Guid { data })
    }

    /// The GUID at the 1-based `index`; index 0 yields the nil GUID.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `index` is past the last entry.
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        if index == 0 {
            return Ok(uguid::Guid::ZERO);
        }

        let Some(offset_end) = index.checked_mul(GUID_SIZE) else {
            return Err(out_of_bounds_error!());
        };
        if offset_end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let mut buffer = [0u8; GUID_SIZE];
        buffer.copy_from_slice(&self.data[offset_end - GUID_SIZE..offset_end]);

        Ok(uguid::Guid::from_bytes(buffer))
    }

    /// Number of GUIDs in the heap.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / GUID_SIZE
    }
}
