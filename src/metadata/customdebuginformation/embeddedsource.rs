//! Embedded source records.
//!
//! The value blob of an [`super::CustomDebugKind::EmbeddedSource`] record is:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | Uncompressed size, 0 if the content is stored as-is |
//! | 4 | .. | Content, raw DEFLATE when the size is non-zero |

use crate::{
    file::parser::Parser,
    utils::{decode_source_text, inflate_exact},
    Result,
};

/// An undecoded embedded source record borrowing the `#Blob` heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddedSource<'a> {
    /// Size of the inflated content, 0 for uncompressed content
    pub uncompressed_size: u32,
    /// The stored content
    pub payload: &'a [u8],
}

impl<'a> EmbeddedSource<'a> {
    /// Split an embedded source blob into its size header and payload.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the blob is shorter than the size header.
    pub fn parse(blob: &'a [u8]) -> Result<EmbeddedSource<'a>> {
        let mut parser = Parser::new(blob);
        let uncompressed_size = parser.read_le::<u32>()?;

        Ok(EmbeddedSource {
            uncompressed_size,
            payload: parser.read_remaining(),
        })
    }

    /// `true` if the payload is DEFLATE compressed.
    #[must_use]
    pub fn is_compressed(&self) -> bool {
        self.uncompressed_size != 0
    }

    /// The source bytes, inflated if necessary.
    ///
    /// # Errors
    /// Returns [`crate::Error::Decompress`] for a corrupt stream and
    /// [`crate::Error::DecompressedSizeMismatch`] if it does not inflate to exactly
    /// `uncompressed_size` bytes.
    pub fn decode(&self) -> Result<Vec<u8>> {
        if !self.is_compressed() {
            return Ok(self.payload.to_vec());
        }

        let expected = usize::try_from(self.uncompressed_size).map_err(|_| {
            malformed_error!(
                "Embedded source size too large - {}",
                self.uncompressed_size
            )
        })?;

        inflate_exact(self.payload, expected)
    }

    /// The source as text, with byte order marks honoured.
    ///
    /// # Errors
    /// See [`EmbeddedSource::decode`].
    pub fn decode_text(&self) -> Result<String> {
        Ok(decode_source_text(&self.decode()?))
    }
}
