//! Memory-mapped file backend.
//!
//! Standalone `.pdb` files and module binaries are mapped read-only with [`memmap2`]. The
//! mapping, and with it the underlying file handle, lives exactly as long as the
//! [`crate::file::physical::Physical`] value, so dropping the parsed PDB or module releases
//! the file again.
//!
//! # Examples
//!
//! ```rust,ignore
//! use dotsource::file::{Backend, Physical};
//! use std::path::Path;
//!
//! let physical = Physical::new(Path::new("MyApp.pdb"))?;
//! assert_eq!(physical.data_slice(0, 4)?, b"BSJB");
//! # Ok::<(), dotsource::Error>(())
//! ```

use super::Backend;
use crate::{
    Error::{Error, FileError},
    Result,
};

use memmap2::Mmap;
use std::{fs, path::Path};

/// A read-only memory mapping of a file on disk.
#[derive(Debug)]
pub struct Physical {
    /// Memory-mapped file data
    data: Mmap,
}

impl Physical {
    /// Open and map the file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened or
    /// [`crate::Error::Error`] if memory mapping fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Physical> {
        let file = match fs::File::open(path) {
            Ok(file) => file,
            Err(error) => return Err(FileError(error)),
        };

        // Zero-length files cannot be mapped on every platform
        if file.metadata().map_err(FileError)?.len() == 0 {
            return Err(crate::Error::Empty);
        }

        let mmap = match unsafe { Mmap::map(&file) } {
            Ok(mmap) => mmap,
            Err(error) => return Err(Error(error.to_string())),
        };

        Ok(Physical { data: mmap })
    }
}

impl Backend for Physical {
    fn data_slice(&self, offset: usize, len: usize) -> Result<&[u8]> {
        let Some(offset_end) = offset.checked_add(len) else {
            return Err(out_of_bounds_error!());
        };

        if offset_end > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        Ok(&self.data[offset..offset_end])
    }

    fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    fn len(&self) -> usize {
        self.data.len()
    }
}
