//! Well-known kinds of custom debug information records.

use uguid::{guid, Guid};

/// Kind GUID of an embedded source record.
pub const EMBEDDED_SOURCE: Guid = guid!("0E8A571B-6926-466E-B4AD-8AB04611F5FE");
/// Kind GUID of a Source Link JSON document.
pub const SOURCE_LINK: Guid = guid!("CC110556-A091-4D38-9FEC-25AB9A351A6A");
/// Kind GUID of the compilation metadata references record.
pub const COMPILATION_METADATA: Guid = guid!("B5FEEC05-8CD0-4A83-96DA-466284BB4BD8");
/// Kind GUID of the compiler options record.
pub const COMPILATION_OPTIONS: Guid = guid!("B1C2ABE1-8BF0-497A-A9B1-02FA8571E544");

/// The kind of a `CustomDebugInformation` row, identified by the GUID in its `Kind` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomDebugKind {
    /// Source text of a document, possibly DEFLATE compressed
    EmbeddedSource,
    /// Source Link mapping of documents to URLs
    SourceLink,
    /// References of the compilation
    CompilationMetadata,
    /// Options passed to the compiler
    CompilationOptions,
    /// Any other kind
    Unknown(Guid),
}

impl CustomDebugKind {
    /// Classify a kind GUID.
    #[must_use]
    pub fn from_guid(guid: Guid) -> Self {
        [
            CustomDebugKind::EmbeddedSource,
            CustomDebugKind::SourceLink,
            CustomDebugKind::CompilationMetadata,
            CustomDebugKind::CompilationOptions,
        ]
        .into_iter()
        .find(|kind| kind.guid() == guid)
        .unwrap_or(CustomDebugKind::Unknown(guid))
    }

    /// The kind GUID.
    #[must_use]
    pub fn guid(&self) -> Guid {
        match self {
            CustomDebugKind::EmbeddedSource => EMBEDDED_SOURCE,
            CustomDebugKind::SourceLink => SOURCE_LINK,
            CustomDebugKind::CompilationMetadata => COMPILATION_METADATA,
            CustomDebugKind::CompilationOptions => COMPILATION_OPTIONS,
            CustomDebugKind::Unknown(guid) => *guid,
        }
    }
}

impl From<Guid> for CustomDebugKind {
    fn from(guid: Guid) -> Self {
        CustomDebugKind::from_guid(guid)
    }
}
