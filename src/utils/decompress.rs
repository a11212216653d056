//! Raw DEFLATE inflation with an exact-size contract.
//!
//! Both the `MPDB` payload of an embedded Portable PDB and compressed embedded-source
//! records store a raw DEFLATE stream (no zlib or gzip framing) next to the size the
//! stream must inflate to. [`inflate_exact`] enforces that size: the decoder is capped at
//! one byte past the declared length, so a corrupt or hostile stream can never grow the
//! output buffer beyond it.

use std::io::Read;

use flate2::read::DeflateDecoder;

use crate::{Error, Result};

/// Upper bound for the initial allocation; larger outputs grow on demand.
const MAX_PREALLOCATION: usize = 16 * 1024 * 1024;

/// Inflate a raw DEFLATE stream that must produce exactly `expected` bytes.
///
/// # Errors
/// Returns [`crate::Error::Decompress`] if the stream is invalid and
/// [`crate::Error::DecompressedSizeMismatch`] if it inflates to any other length.
pub fn inflate_exact(data: &[u8], expected: usize) -> Result<Vec<u8>> {
    let limit = u64::try_from(expected)
        .map_err(|_| malformed_error!("Declared size too large - {}", expected))?
        .saturating_add(1);

    let mut decoder = DeflateDecoder::new(data).take(limit);
    let mut decompressed = Vec::with_capacity(expected.min(MAX_PREALLOCATION));

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|error| Error::Decompress(error.to_string()))?;

    if decompressed.len() != expected {
        log::warn!(
            "DEFLATE stream inflated to {} bytes, {} declared",
            decompressed.len(),
            expected
        );
        return Err(Error::DecompressedSizeMismatch {
            expected,
            actual: decompressed.len(),
        });
    }

    Ok(decompressed)
}
