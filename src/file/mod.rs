//! PE module loading and debug directory access.
//!
//! A module only matters to this crate as a carrier of debug information: when no `.pdb`
//! file sits next to it, the Portable PDB may be embedded in the module's debug directory.
//! [`crate::file::File`] parses the PE headers with [`goblin`] and exposes exactly what is
//! needed to find and inflate that embedded image.
//!
//! # Architecture
//!
//! - [`crate::file::Backend`] abstracts over the byte source
//!   ([`crate::file::physical::Physical`] for memory-mapped files,
//!   [`crate::file::memory::Memory`] for owned buffers)
//! - [`crate::file::File`] owns a backend and the goblin [`goblin::pe::PE`] borrowing from it
//! - [`crate::file::debugdirectory`] decodes debug directory records and `MPDB` payloads
//! - [`crate::file::io`] and [`crate::file::parser`] provide bounds-checked little-endian reads
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotsource::file::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("MyApp.dll"))?;
//! if let Some(pdb) = file.embedded_pdb()? {
//!     println!("embedded Portable PDB, {} bytes", pdb.len());
//! }
//! # Ok::<(), dotsource::Error>(())
//! ```

pub mod debugdirectory;
pub mod io;
pub mod memory;
pub mod parser;
pub mod physical;

use std::path::Path;

use crate::{
    Error::{Empty, GoblinErr},
    Result,
};
use debugdirectory::{decode_embedded_pdb, DebugDirectoryEntry, DebugEntryType};
use goblin::pe::{
    data_directories::DataDirectoryType, options::ParseOptions, section_table::SectionTable, PE,
};
use memory::Memory;
use ouroboros::self_referencing;
use physical::Physical;

/// Backing storage of a loaded image.
pub trait Backend: Send + Sync {
    /// Returns a slice of the data at the given offset and length.
    ///
    /// # Errors
    ///
    /// Returns an error if the requested range is out of bounds.
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]>;

    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

#[self_referencing]
/// A loaded PE module.
///
/// The PE headers are parsed once on load; every other accessor works on the borrowed
/// [`goblin::pe::PE`] view. Dropping the `File` releases the mapping and the file handle.
///
/// # Examples
///
/// ```rust,no_run
/// use dotsource::file::File;
/// use std::path::Path;
///
/// let file = File::from_file(Path::new("MyApp.dll"))?;
/// for entry in file.debug_directory()? {
///     println!("{:?} - {} bytes", entry.entry_type, entry.size_of_data);
/// }
/// # Ok::<(), dotsource::Error>(())
/// ```
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// The parsed PE structure, referencing the data.
    #[borrows(data)]
    #[not_covariant]
    pe: PE<'this>,
}

impl File {
    /// Loads a PE module from the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, is empty, is not a PE image or has no
    /// optional header.
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a PE module from a memory buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer is empty, is not a PE image or has no optional header.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let data = Box::new(data);

        File::try_new(data, |data| {
            let data = data.as_ref();
            match PE::parse_with_opts(data.data(), &parse_options()) {
                Ok(pe) => {
                    if pe.header.optional_header.is_none() {
                        Err(malformed_error!("File does not have an OptionalHeader"))
                    } else {
                        Ok(pe)
                    }
                }
                Err(error) => Err(GoblinErr(error)),
            }
        })
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Returns `true` if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw image bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.with_data(|data| data.data())
    }

    /// Bounds-checked slice of the raw image.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the range exceeds the file.
    pub fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        self.with_data(|data| data.data_slice(offset, len))
    }

    /// Iterator over the section headers.
    pub fn sections(&self) -> impl Iterator<Item = &SectionTable> {
        self.with_pe(|pe| pe.sections.iter())
    }

    /// RVA and size of a data directory, if present and non-empty.
    #[must_use]
    pub fn get_data_directory(&self, dir_type: DataDirectoryType) -> Option<(u32, u32)> {
        self.with_pe(|pe| {
            pe.header
                .optional_header
                .as_ref()?
                .data_directories
                .dirs()
                .find(|(directory_type, directory)| {
                    *directory_type == dir_type
                        && directory.virtual_address != 0
                        && directory.size != 0
                })
                .map(|(_, directory)| (directory.virtual_address, directory.size))
        })
    }

    /// Converts a relative virtual address (RVA) to a file offset.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] if no section contains `rva`.
    pub fn rva_to_offset(&self, rva: usize) -> Result<usize> {
        let rva_u32 =
            u32::try_from(rva).map_err(|_| malformed_error!("RVA too large to fit in u32: {}", rva))?;

        self.with_pe(|pe| {
            for section in &pe.sections {
                let span = section.virtual_size.max(section.size_of_raw_data);
                let Some(section_max) = section.virtual_address.checked_add(span) else {
                    return Err(malformed_error!(
                        "Section malformed, causing integer overflow - {} + {}",
                        section.virtual_address,
                        span
                    ));
                };

                if section.virtual_address <= rva_u32 && section_max > rva_u32 {
                    return Ok((rva - section.virtual_address as usize)
                        + section.pointer_to_raw_data as usize);
                }
            }

            Err(malformed_error!(
                "RVA could not be converted to offset - {}",
                rva
            ))
        })
    }

    /// All records of the debug directory, empty if the module has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory lies outside the file or is malformed.
    pub fn debug_directory(&self) -> Result<Vec<DebugDirectoryEntry>> {
        let Some((rva, size)) = self.get_data_directory(DataDirectoryType::DebugTable) else {
            return Ok(Vec::new());
        };

        let offset = self.rva_to_offset(rva as usize)?;
        let data = self.data_slice(offset, size as usize)?;

        DebugDirectoryEntry::read_all(data)
    }

    /// The payload of a debug directory record.
    ///
    /// Uses the file pointer of the record and falls back to its RVA when the pointer is 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload lies outside the file.
    pub fn debug_entry_data(&self, entry: &DebugDirectoryEntry) -> Result<&[u8]> {
        let offset = if entry.pointer_to_raw_data != 0 {
            entry.pointer_to_raw_data as usize
        } else if entry.address_of_raw_data != 0 {
            self.rva_to_offset(entry.address_of_raw_data as usize)?
        } else {
            return Err(malformed_error!(
                "Debug directory entry {:?} has no data location",
                entry.entry_type
            ));
        };

        self.data_slice(offset, entry.size_of_data as usize)
    }

    /// Inflate the embedded Portable PDB image, if the module carries one.
    ///
    /// The first [`DebugEntryType::EmbeddedPortablePdb`] record is used.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is malformed or its DEFLATE payload is corrupt.
    pub fn embedded_pdb(&self) -> Result<Option<Vec<u8>>> {
        let entries = self.debug_directory()?;
        let Some(entry) = entries
            .iter()
            .find(|entry| entry.entry_type == DebugEntryType::EmbeddedPortablePdb)
        else {
            return Ok(None);
        };

        let payload = self.debug_entry_data(entry)?;
        decode_embedded_pdb(payload).map(Some)
    }
}

/// Only headers, sections and the debug directory are read. Tables a module can carry
/// broken without affecting its debug information are left unparsed.
fn parse_options() -> ParseOptions {
    let mut options = ParseOptions::default()
        .with_parse_imports(false)
        .with_parse_resources(false)
        .with_parse_tls_data(false);
    options.parse_attribute_certificates = false;
    options
}
