//! Sequential cursor over a byte slice.
//!
//! [`crate::file::parser::Parser`] tracks a position inside borrowed data and provides the
//! ECMA-335 compressed-integer decoding used by blob-heap lengths and by document-name
//! blobs in Portable PDB files. All reads are bounds-checked.
//!
//! # Examples
//!
//! ```rust,ignore
//! use dotsource::file::parser::Parser;
//!
//! // '/' separator followed by two compressed blob indices
//! let blob = [b'/', 0x01, 0x81, 0x02];
//! let mut parser = Parser::new(&blob);
//!
//! assert_eq!(parser.read_le::<u8>()?, b'/');
//! assert_eq!(parser.read_compressed_uint()?, 1);
//! assert_eq!(parser.read_compressed_uint()?, 0x102);
//! assert!(!parser.has_more_data());
//! # Ok::<(), dotsource::Error>(())
//! ```

use crate::{
    file::io::{read_le_at, LeBytes},
    Result,
};

/// A position-tracking reader over borrowed binary data.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Total length of the underlying data.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying data is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` while unread bytes remain.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Current read position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Move the read position to `pos`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is past the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Read a little-endian primitive and advance.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated data.
    pub fn read_le<T: LeBytes>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Read an ECMA-335 II.23.2 compressed unsigned integer (1, 2 or 4 bytes).
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated data and
    /// [`crate::Error::Malformed`] for an invalid lead byte (`111xxxxx`).
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = self.read_le::<u8>()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok(u32::from(first_byte));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let second_byte = self.read_le::<u8>()?;
            let value = ((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte);
            return Ok(value);
        }

        // 4-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let b1 = u32::from(self.read_le::<u8>()?);
            let b2 = u32::from(self.read_le::<u8>()?);
            let b3 = u32::from(self.read_le::<u8>()?);
            let value = ((u32::from(first_byte) & 0x1F) << 24) | (b1 << 16) | (b2 << 8) | b3;
            return Ok(value);
        }

        Err(malformed_error!("Invalid compressed uint - {}", first_byte))
    }

    /// Borrow the next `length` bytes and advance past them.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self
            .position
            .checked_add(length)
            .ok_or(out_of_bounds_error!())?;

        if end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Borrow all unread bytes and move to the end.
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.position.min(self.data.len())..];
        self.position = self.data.len();
        bytes
    }
}
