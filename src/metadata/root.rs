//! Metadata root header and stream directory.
//!
//! Both assemblies and Portable PDB images start their metadata with the `BSJB` root
//! (ECMA-335 II.24.2.1). For a Portable PDB the version string is `PDB v1.0` and the stream
//! directory lists `#Pdb`, `#~`, `#Strings`, `#US`, `#Blob` and `#GUID`.
//!
//! # Example
//!
//! ```rust,ignore
//! use dotsource::metadata::root::Root;
//! let root = Root::read(&[
//!            0x42, 0x53, 0x4A, 0x42,
//!            0x01, 0x00,
//!            0x01, 0x00,
//!            0x00, 0x00, 0x00, 0x00,
//!            0x04, 0x00, 0x00, 0x00,
//!            b'P', b'D', b'B', 0x00,
//!            0x00, 0x00,
//!            0x01, 0x00,
//!            0x24, 0x00, 0x00, 0x00, // StreamHeader
//!            0x00, 0x00, 0x00, 0x00,
//!            b'#', b'~', 0x00, 0x00,
//!        ])?;
//! assert_eq!(root.version, "PDB");
//! # Ok::<(), dotsource::Error>(())
//! ```

use crate::{
    file::io::{read_le, read_le_at},
    metadata::streams::StreamHeader,
    Result,
};

/// `BSJB`, the metadata root signature.
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// Upper bound on the number of streams in a well-formed root.
const MAX_STREAMS: u16 = 8;

/// The metadata root.
#[derive(Debug, Clone)]
pub struct Root {
    /// Magic signature, always `BSJB`
    pub signature: u32,
    /// Major version, 1
    pub major_version: u16,
    /// Minor version, 1
    pub minor_version: u16,
    /// Reserved, 0
    pub reserved: u32,
    /// Length of the padded version string
    pub length: u32,
    /// Version string with padding removed
    pub version: String,
    /// Reserved, 0
    pub flags: u16,
    /// Number of stream headers
    pub stream_number: u16,
    /// The stream directory
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Read the metadata root at the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for truncated input and
    /// [`crate::Error::Malformed`] for a bad signature, an invalid stream count, duplicate
    /// stream names or streams that extend past the data.
    pub fn read(data: &[u8]) -> Result<Root> {
        if data.len() < 32 {
            return Err(out_of_bounds_error!());
        }

        let signature = read_le::<u32>(data)?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - {}",
                signature
            ));
        }

        let version_string_length = read_le_at::<u32>(data, &mut 12)?;
        let version_end = usize::try_from(version_string_length)
            .ok()
            .and_then(|length| length.checked_add(16))
            .ok_or_else(|| {
                malformed_error!(
                    "Version string length causing integer overflow - {}",
                    version_string_length
                )
            })?;
        if version_end.saturating_add(4) > data.len() {
            return Err(out_of_bounds_error!());
        }

        let version: String = data[16..version_end]
            .iter()
            .take_while(|byte| **byte != 0)
            .copied()
            .map(char::from)
            .collect();

        let flags = read_le::<u16>(&data[version_end..])?;
        let stream_count = read_le::<u16>(&data[version_end + 2..])?;
        if stream_count == 0
            || stream_count > MAX_STREAMS
            || (stream_count as usize * 9) > data.len()
        {
            return Err(malformed_error!("Invalid stream count - {}", stream_count));
        }

        let mut streams: Vec<StreamHeader> = Vec::with_capacity(stream_count as usize);
        let mut stream_offset = version_end + 4;
        for _ in 0..stream_count {
            if stream_offset > data.len() {
                return Err(out_of_bounds_error!());
            }

            let new_stream = StreamHeader::from(&data[stream_offset..])?;
            match new_stream.offset.checked_add(new_stream.size) {
                Some(range) => {
                    if range as usize > data.len() {
                        return Err(out_of_bounds_error!());
                    }
                }
                None => {
                    return Err(malformed_error!(
                        "Stream offset and size cause integer overflow - {} + {}",
                        new_stream.offset,
                        new_stream.size
                    ))
                }
            }

            if streams.iter().any(|stream| stream.name == new_stream.name) {
                return Err(malformed_error!("Duplicate stream - {}", new_stream.name));
            }

            stream_offset += new_stream.encoded_len();
            streams.push(new_stream);
        }

        Ok(Root {
            signature,
            major_version: read_le::<u16>(&data[4..])?,
            minor_version: read_le::<u16>(&data[6..])?,
            reserved: read_le::<u32>(&data[8..])?,
            length: version_string_length,
            version,
            flags,
            stream_number: stream_count,
            stream_headers: streams,
        })
    }

    /// The directory entry of the stream called `name`.
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&StreamHeader> {
        self.stream_headers.iter().find(|stream| stream.name == name)
    }
}
