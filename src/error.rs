use std::path::PathBuf;

use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Most variants never reach a caller of the enrichment API: the
/// [`crate::MessageEnricher`] treats every resolver error as "skip this candidate" and only
/// surfaces unexpected failures as a diagnostic annotation. The variants are public so that
/// the lower-level building blocks ([`crate::metadata::pdb::PortablePdb`],
/// [`crate::source::SourceResolver`]) can be used and matched on directly.
///
/// # Error Categories
///
/// ## Binary format errors
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a buffer
/// - [`Error::Malformed`] - Corrupted or invalid PE / metadata structure
/// - [`Error::NotSupported`] - Structure is valid but uses an unsupported feature
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::GoblinErr`] - PE parsing errors from the goblin crate
///
/// ## Resolution errors
/// - [`Error::NoLocation`] - Frame has no usable `file:line` information
/// - [`Error::ModuleNotFound`] - No loaded module defines the frame's type
/// - [`Error::NoDebugInformation`] - Module has neither a `.pdb` nor an embedded PDB
/// - [`Error::DocumentNotFound`] - PDB does not list the frame's document
/// - [`Error::EmbeddedSourceMissing`] / [`Error::EmbeddedSourceAmbiguous`] - The document
///   does not carry exactly one embedded source record
/// - [`Error::DecompressedSizeMismatch`] / [`Error::Decompress`] - Corrupt DEFLATE payload
/// - [`Error::EmptySource`] - Resolved source text is empty or whitespace only
///
/// # Examples
///
/// ```rust,no_run
/// use dotsource::{metadata::pdb::PortablePdb, Error};
/// use std::path::Path;
///
/// match PortablePdb::from_file(Path::new("MyApp.pdb")) {
///     Ok(pdb) => println!("{} documents", pdb.document_count()),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed PDB: {} ({}:{})", message, file, line);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The data is damaged and could not be parsed.
    ///
    /// Includes the source location where the malformation was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing.
    #[error("Out of Bound read would have occurred! - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// This file type or feature is not supported.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    /// Error from the goblin crate during PE parsing.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),

    /// The stack frame does not carry a file name and a line number.
    #[error("Stack frame has no source location")]
    NoLocation,

    /// No loaded module defines the requested type.
    #[error("No module defines type '{0}'")]
    ModuleNotFound(String),

    /// The module has neither a sibling `.pdb` file nor an embedded Portable PDB.
    #[error("No debug information available for '{}'", .0.display())]
    NoDebugInformation(PathBuf),

    /// The Portable PDB does not contain a document with this name.
    #[error("Document '{0}' not found in debug information")]
    DocumentNotFound(String),

    /// The document exists but has no embedded source record.
    #[error("Document '{0}' has no embedded source")]
    EmbeddedSourceMissing(String),

    /// The document has more than one embedded source record.
    #[error("Document '{0}' has {1} embedded source records")]
    EmbeddedSourceAmbiguous(String, usize),

    /// The inflated embedded source does not match its declared size.
    #[error("Decompressed size mismatch - expected {expected} bytes, got {actual}")]
    DecompressedSizeMismatch {
        /// Size declared in the record header
        expected: usize,
        /// Size actually produced by the decoder (capped at `expected + 1`)
        actual: usize,
    },

    /// The DEFLATE stream could not be decoded.
    #[error("Deflate decompression error: {0}")]
    Decompress(String),

    /// Resolution produced empty or whitespace-only text.
    #[error("Resolved source is empty")]
    EmptySource,
}

impl Error {
    /// `true` if the error only rules out the current candidate frame.
    ///
    /// Missing files, modules, documents or records and corrupt embedded sources are
    /// recoverable: enrichment moves on to the next frame. Structural damage of the module
    /// or its metadata is not, and ends the enrichment attempt.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::NoLocation
                | Error::ModuleNotFound(_)
                | Error::NoDebugInformation(_)
                | Error::DocumentNotFound(_)
                | Error::EmbeddedSourceMissing(_)
                | Error::EmbeddedSourceAmbiguous(..)
                | Error::DecompressedSizeMismatch { .. }
                | Error::Decompress(_)
                | Error::EmptySource
                | Error::FileError(_)
        )
    }
}
