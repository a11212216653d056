//! PE debug directory entries and the embedded Portable PDB payload.
//!
//! The debug data directory points at an array of 28-byte `IMAGE_DEBUG_DIRECTORY` records.
//! Compilers emitting `<DebugType>embedded</DebugType>` add a record of type
//! [`DebugEntryType::EmbeddedPortablePdb`] whose payload is:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | Signature `MPDB` (0x4244504D) |
//! | 4 | 4 | Size of the decompressed Portable PDB image |
//! | 8 | .. | Raw DEFLATE stream of the Portable PDB image |

use crate::{
    file::{io::read_le_at, parser::Parser},
    utils::inflate_exact,
    Result,
};

/// Size of one `IMAGE_DEBUG_DIRECTORY` record.
pub const DEBUG_DIRECTORY_ENTRY_SIZE: usize = 28;

/// Signature of an embedded Portable PDB payload, `MPDB` little-endian.
pub const EMBEDDED_PDB_SIGNATURE: u32 = 0x4244_504D;

/// The `Type` field of a debug directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugEntryType {
    /// `IMAGE_DEBUG_TYPE_CODEVIEW`, points at an external PDB
    CodeView,
    /// `IMAGE_DEBUG_TYPE_REPRO`, deterministic build marker
    Reproducible,
    /// Deflate-compressed Portable PDB stored inside the image
    EmbeddedPortablePdb,
    /// Checksum of the associated PDB
    PdbChecksum,
    /// Any other type value
    Other(u32),
}

impl From<u32> for DebugEntryType {
    fn from(value: u32) -> Self {
        match value {
            2 => DebugEntryType::CodeView,
            16 => DebugEntryType::Reproducible,
            17 => DebugEntryType::EmbeddedPortablePdb,
            19 => DebugEntryType::PdbChecksum,
            other => DebugEntryType::Other(other),
        }
    }
}

/// One `IMAGE_DEBUG_DIRECTORY` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugDirectoryEntry {
    /// Reserved, zero
    pub characteristics: u32,
    /// Time stamp, or a hash for deterministic builds
    pub time_date_stamp: u32,
    /// Major version of the debug format
    pub major_version: u16,
    /// Minor version of the debug format
    pub minor_version: u16,
    /// Entry type
    pub entry_type: DebugEntryType,
    /// Payload size in bytes
    pub size_of_data: u32,
    /// RVA of the payload when loaded, 0 if not mapped
    pub address_of_raw_data: u32,
    /// File offset of the payload
    pub pointer_to_raw_data: u32,
}

impl DebugDirectoryEntry {
    /// Read a single record from the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than a record.
    pub fn read(data: &[u8]) -> Result<Self> {
        let mut offset = 0;

        Ok(DebugDirectoryEntry {
            characteristics: read_le_at::<u32>(data, &mut offset)?,
            time_date_stamp: read_le_at::<u32>(data, &mut offset)?,
            major_version: read_le_at::<u16>(data, &mut offset)?,
            minor_version: read_le_at::<u16>(data, &mut offset)?,
            entry_type: DebugEntryType::from(read_le_at::<u32>(data, &mut offset)?),
            size_of_data: read_le_at::<u32>(data, &mut offset)?,
            address_of_raw_data: read_le_at::<u32>(data, &mut offset)?,
            pointer_to_raw_data: read_le_at::<u32>(data, &mut offset)?,
        })
    }

    /// Read every record of a debug directory.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the directory size is not a multiple of the
    /// record size.
    pub fn read_all(data: &[u8]) -> Result<Vec<Self>> {
        if data.len() % DEBUG_DIRECTORY_ENTRY_SIZE != 0 {
            return Err(malformed_error!(
                "Debug directory size {} is not a multiple of {}",
                data.len(),
                DEBUG_DIRECTORY_ENTRY_SIZE
            ));
        }

        data.chunks_exact(DEBUG_DIRECTORY_ENTRY_SIZE)
            .map(Self::read)
            .collect()
    }
}

/// Inflate the Portable PDB image carried by an embedded-PDB debug entry payload.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for a bad signature, and
/// [`crate::Error::Decompress`] or [`crate::Error::DecompressedSizeMismatch`] if the
/// DEFLATE stream is corrupt.
pub fn decode_embedded_pdb(payload: &[u8]) -> Result<Vec<u8>> {
    let mut parser = Parser::new(payload);

    let signature = parser.read_le::<u32>()?;
    if signature != EMBEDDED_PDB_SIGNATURE {
        return Err(malformed_error!(
            "Invalid embedded PDB signature - 0x{:08X}",
            signature
        ));
    }

    let size = parser.read_le::<u32>()?;
    let expected = usize::try_from(size)
        .map_err(|_| malformed_error!("Embedded PDB size too large - {}", size))?;

    inflate_exact(parser.read_remaining(), expected)
}
