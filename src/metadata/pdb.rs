//! Portable PDB images and embedded source lookup.
//!
//! A [`PortablePdb`] owns the bytes of one Portable PDB metadata image, either a standalone
//! `.pdb` file (memory-mapped) or the inflated payload of a module's embedded-PDB debug
//! directory entry. The stream directory, the `#Pdb` stream and the layout of the `#~`
//! tables are validated once on load; heaps and tables are re-sliced on demand.
//!
//! [`DebugInfoSource`] decides where the debug information of a module lives.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotsource::metadata::pdb::DebugInfoSource;
//! use std::path::Path;
//!
//! let pdb = DebugInfoSource::locate(Path::new("bin/MyApp.dll"))?.open()?;
//! for document in pdb.documents()? {
//!     println!("{}", document.name);
//! }
//!
//! let text = pdb.source_text("/src/MyApp/Program.cs")?;
//! println!("{text}");
//! # Ok::<(), dotsource::Error>(())
//! ```

use std::path::{Path, PathBuf};

use crate::{
    file::{memory::Memory, physical::Physical, Backend, File},
    metadata::{
        customdebuginformation::{CustomDebugKind, EmbeddedSource},
        root::Root,
        streams::{Blob, Guid, PdbStream, TablesHeader},
        tables::{CustomDebugInformationRaw, DocumentRaw, MetadataTable, TableId},
        token::Token,
    },
    Error, Result,
};

/// Where the debug information of a module is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugInfoSource {
    /// A `.pdb` file next to the module
    Standalone(PathBuf),
    /// The module itself, through its embedded-PDB debug directory entry
    Embedded(PathBuf),
}

impl DebugInfoSource {
    /// Pick the debug information source of a `.dll` or `.exe` module.
    ///
    /// A sibling file with the module's stem and a `.pdb` extension wins; otherwise the
    /// module is expected to embed its PDB. Whether it actually does is only known once
    /// [`DebugInfoSource::open`] reads the debug directory.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoDebugInformation`] if `module` is not a `.dll` or `.exe`
    /// file.
    pub fn locate(module: &Path) -> Result<DebugInfoSource> {
        let is_module = module
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| {
                extension.eq_ignore_ascii_case("dll") || extension.eq_ignore_ascii_case("exe")
            });
        if !is_module {
            return Err(Error::NoDebugInformation(module.to_path_buf()));
        }

        let pdb = module.with_extension("pdb");
        if pdb.is_file() {
            Ok(DebugInfoSource::Standalone(pdb))
        } else {
            Ok(DebugInfoSource::Embedded(module.to_path_buf()))
        }
    }

    /// The file this source reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            DebugInfoSource::Standalone(path) | DebugInfoSource::Embedded(path) => path,
        }
    }

    /// Load the Portable PDB.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoDebugInformation`] if an embedding module has no
    /// embedded-PDB entry, or any error of [`PortablePdb::from_file`] and
    /// [`PortablePdb::from_module`].
    pub fn open(&self) -> Result<PortablePdb> {
        match self {
            DebugInfoSource::Standalone(path) => PortablePdb::from_file(path),
            DebugInfoSource::Embedded(path) => PortablePdb::from_module(path),
        }
    }
}

/// A document listed in the `Document` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdbDocument {
    /// 1-based row id
    pub rid: u32,
    /// Metadata token, `0x30xxxxxx`
    pub token: Token,
    /// Decoded document name, usually an absolute path on the build machine
    pub name: String,
    /// Source language GUID
    pub language: uguid::Guid,
}

/// A loaded Portable PDB image.
pub struct PortablePdb {
    data: Box<dyn Backend>,
    root: Root,
    pdb: PdbStream,
}

impl PortablePdb {
    /// Load a standalone Portable PDB file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be mapped or is not a valid Portable PDB.
    pub fn from_file(path: &Path) -> Result<PortablePdb> {
        Self::load(Physical::new(path)?)
    }

    /// Load a Portable PDB image from memory.
    ///
    /// # Errors
    /// Returns an error if the buffer is not a valid Portable PDB.
    pub fn from_mem(data: Vec<u8>) -> Result<PortablePdb> {
        Self::load(Memory::new(data))
    }

    /// Load the Portable PDB embedded in a module's debug directory.
    ///
    /// The module is released before this returns.
    ///
    /// # Errors
    /// Returns [`crate::Error::NoDebugInformation`] if the module has no embedded-PDB
    /// entry, and an error if the module or the inflated image is malformed.
    pub fn from_module(path: &Path) -> Result<PortablePdb> {
        let image = {
            let module = File::from_file(path)?;
            module.embedded_pdb()?
        };

        match image {
            Some(image) => Self::from_mem(image),
            None => Err(Error::NoDebugInformation(path.to_path_buf())),
        }
    }

    fn load<T: Backend + 'static>(data: T) -> Result<PortablePdb> {
        if data.len() == 0 {
            return Err(Error::Empty);
        }

        let root = Root::read(data.data())?;
        let pdb = {
            let header = root
                .stream("#Pdb")
                .ok_or_else(|| malformed_error!("Metadata has no #Pdb stream"))?;
            PdbStream::read(stream_slice(data.data(), header.offset, header.size)?)?
        };

        let pdb = PortablePdb {
            data: Box::new(data),
            root,
            pdb,
        };

        // Validate the remaining streams once so later accessors only fail on row content
        pdb.tables()?;
        pdb.blobs()?;
        pdb.guids()?;

        Ok(pdb)
    }

    /// The metadata root.
    #[must_use]
    pub fn root(&self) -> &Root {
        &self.root
    }

    /// The decoded `#Pdb` stream.
    #[must_use]
    pub fn pdb_stream(&self) -> &PdbStream {
        &self.pdb
    }

    fn stream(&self, name: &str) -> Result<&[u8]> {
        let header = self
            .root
            .stream(name)
            .ok_or_else(|| malformed_error!("Metadata has no {} stream", name))?;

        stream_slice(self.data.data(), header.offset, header.size)
    }

    /// The `#Blob` heap.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the stream is missing or invalid.
    pub fn blobs(&self) -> Result<Blob<'_>> {
        Blob::from(self.stream("#Blob")?)
    }

    /// The `#GUID` heap, empty if the image has none.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the stream is not a whole number of GUIDs.
    pub fn guids(&self) -> Result<Guid<'_>> {
        match self.root.stream("#GUID") {
            Some(_) => Guid::from(self.stream("#GUID")?),
            None => Guid::from(&[]),
        }
    }

    /// The debug tables.
    ///
    /// # Errors
    /// Returns an error if the `#~` stream is missing or malformed.
    pub fn tables(&self) -> Result<TablesHeader<'_>> {
        TablesHeader::from(self.stream("#~")?, &self.pdb.type_system_rows)
    }

    /// Number of rows in the `Document` table.
    #[must_use]
    pub fn document_count(&self) -> u32 {
        self.tables()
            .map_or(0, |tables| tables.rows(TableId::Document))
    }

    /// All documents, in table order.
    ///
    /// # Errors
    /// Returns an error if a row or a document name cannot be decoded.
    pub fn documents(&self) -> Result<Vec<PdbDocument>> {
        let tables = self.tables()?;
        let blobs = self.blobs()?;
        let guids = self.guids()?;

        let Some(table) = tables.table::<DocumentRaw>() else {
            return Ok(Vec::new());
        };

        table
            .iter()
            .map(|row| -> Result<PdbDocument> {
                let row = row?;
                Ok(PdbDocument {
                    rid: row.rid,
                    token: row.token,
                    name: row.resolve_name(&blobs)?,
                    language: row.resolve_language(&guids)?,
                })
            })
            .collect()
    }

    /// The undecoded embedded source record of the document called `name`.
    ///
    /// Documents are compared by exact name. When a document with this name carries no
    /// usable record, later documents with the same name are tried.
    ///
    /// # Errors
    /// Returns [`crate::Error::DocumentNotFound`] if no document has this name,
    /// [`crate::Error::EmbeddedSourceMissing`] or
    /// [`crate::Error::EmbeddedSourceAmbiguous`] if none of the matching documents has
    /// exactly one embedded source record, and an error for malformed rows.
    pub fn embedded_source(&self, name: &str) -> Result<EmbeddedSource<'_>> {
        let tables = self.tables()?;
        let blobs = self.blobs()?;
        let guids = self.guids()?;

        let Some(documents) = tables.table::<DocumentRaw>() else {
            return Err(Error::DocumentNotFound(name.to_string()));
        };
        let records = tables.table::<CustomDebugInformationRaw>();

        let mut last_error = None;
        for document in &documents {
            let document = document?;
            if document.resolve_name(&blobs)? != name {
                continue;
            }

            log::trace!("Document {} matches '{}'", document.token, name);
            match find_embedded_source(records.as_ref(), &blobs, &guids, name, document.rid) {
                Ok(source) => return Ok(source),
                Err(error @ Error::EmbeddedSourceMissing(_)) => {
                    last_error = Some(error);
                }
                Err(error @ Error::EmbeddedSourceAmbiguous(..)) => {
                    log::warn!("{}", error);
                    last_error = Some(error);
                }
                Err(error) => return Err(error),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::DocumentNotFound(name.to_string())))
    }

    /// The embedded source text of the document called `name`.
    ///
    /// # Errors
    /// See [`PortablePdb::embedded_source`] and [`EmbeddedSource::decode`]. A record whose
    /// content does not inflate to its declared size fails the lookup.
    pub fn source_text(&self, name: &str) -> Result<String> {
        self.embedded_source(name)?.decode_text()
    }
}

fn stream_slice(data: &[u8], offset: u32, size: u32) -> Result<&[u8]> {
    let start = offset as usize;
    let Some(end) = start.checked_add(size as usize) else {
        return Err(out_of_bounds_error!());
    };
    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    Ok(&data[start..end])
}

fn find_embedded_source<'a>(
    records: Option<&MetadataTable<'_, CustomDebugInformationRaw>>,
    blobs: &Blob<'a>,
    guids: &Guid<'_>,
    name: &str,
    document: u32,
) -> Result<EmbeddedSource<'a>> {
    let mut values = Vec::new();
    if let Some(records) = records {
        for record in records {
            let record = record?;
            if !record.is_attached_to_document(document) {
                continue;
            }

            match CustomDebugKind::from_guid(guids.get(record.kind as usize)?) {
                CustomDebugKind::EmbeddedSource => values.push(record.value),
                kind => {
                    log::trace!("Skipping {:?} record {} of '{}'", kind, record.token, name);
                }
            }
        }
    }

    match values.as_slice() {
        [value] => EmbeddedSource::parse(blobs.get(*value as usize)?),
        [] => Err(Error::EmbeddedSourceMissing(name.to_string())),
        _ => Err(Error::EmbeddedSourceAmbiguous(name.to_string(), values.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::builders::{
        embedded_source_blob, embedded_source_blob_with_size, metadata_root, PdbBuilder,
        PeBuilder, CSHARP_LANGUAGE, EMBEDDED_SOURCE_KIND, SOURCE_LINK_KIND,
    };

    const PROGRAM: &str = "/src/App/Program.cs";
    const PROGRAM_TEXT: &str = "class Program\n{\n    static void Main() { }\n}\n";

    #[test]
    fn documents_and_source() {
        let image = PdbBuilder::new()
            .document("/src/App/Util.cs")
            .embedded_source(PROGRAM, PROGRAM_TEXT)
            .build();
        let pdb = PortablePdb::from_mem(image).unwrap();

        assert_eq!(pdb.root().version, "PDB v1.0");
        assert_eq!(pdb.pdb_stream().rows(TableId::MethodDef), 4);
        assert_eq!(pdb.document_count(), 2);

        let documents = pdb.documents().unwrap();
        assert_eq!(documents[0].name, "/src/App/Util.cs");
        assert_eq!(documents[1].name, PROGRAM);
        assert_eq!(documents[1].rid, 2);
        assert_eq!(documents[1].token.value(), 0x3000_0002);
        assert_eq!(documents[1].language.to_bytes(), CSHARP_LANGUAGE);

        assert_eq!(pdb.source_text(PROGRAM).unwrap(), PROGRAM_TEXT);
    }

    #[test]
    fn uncompressed_source() {
        let image = PdbBuilder::new()
            .document_with_record(
                PROGRAM,
                EMBEDDED_SOURCE_KIND,
                embedded_source_blob(PROGRAM_TEXT, false),
            )
            .build();
        let pdb = PortablePdb::from_mem(image).unwrap();

        let source = pdb.embedded_source(PROGRAM).unwrap();
        assert!(!source.is_compressed());
        assert_eq!(pdb.source_text(PROGRAM).unwrap(), PROGRAM_TEXT);
    }

    #[test]
    fn names_compare_exactly() {
        let image = PdbBuilder::new()
            .embedded_source(PROGRAM, PROGRAM_TEXT)
            .build();
        let pdb = PortablePdb::from_mem(image).unwrap();

        assert!(matches!(
            pdb.source_text("/src/app/program.cs"),
            Err(Error::DocumentNotFound(_))
        ));
        assert!(matches!(
            pdb.source_text("Program.cs"),
            Err(Error::DocumentNotFound(_))
        ));
    }

    #[test]
    fn document_without_source() {
        let image = PdbBuilder::new()
            .document_with_record(PROGRAM, SOURCE_LINK_KIND, b"{}".to_vec())
            .build();
        let pdb = PortablePdb::from_mem(image).unwrap();

        assert!(matches!(
            pdb.source_text(PROGRAM),
            Err(Error::EmbeddedSourceMissing(_))
        ));
    }

    #[test]
    fn other_record_kinds_ignored() {
        let image = PdbBuilder::new()
            .document_with_record(PROGRAM, SOURCE_LINK_KIND, b"{}".to_vec())
            .record(1, [0xAB; 16], vec![1, 2, 3])
            .record(1, EMBEDDED_SOURCE_KIND, embedded_source_blob(PROGRAM_TEXT, true))
            .build();
        let pdb = PortablePdb::from_mem(image).unwrap();

        assert_eq!(pdb.source_text(PROGRAM).unwrap(), PROGRAM_TEXT);
    }

    #[test]
    fn ambiguous_records() {
        let image = PdbBuilder::new()
            .embedded_source(PROGRAM, PROGRAM_TEXT)
            .record(1, EMBEDDED_SOURCE_KIND, embedded_source_blob("other", false))
            .build();
        let pdb = PortablePdb::from_mem(image).unwrap();

        assert!(matches!(
            pdb.source_text(PROGRAM),
            Err(Error::EmbeddedSourceAmbiguous(_, 2))
        ));
    }

    #[test]
    fn later_document_with_same_name() {
        let image = PdbBuilder::new()
            .document(PROGRAM)
            .embedded_source(PROGRAM, PROGRAM_TEXT)
            .build();
        let pdb = PortablePdb::from_mem(image).unwrap();

        assert_eq!(pdb.source_text(PROGRAM).unwrap(), PROGRAM_TEXT);
    }

    #[test]
    fn size_mismatch_fails_the_document() {
        let image = PdbBuilder::new()
            .document_with_record(
                PROGRAM,
                EMBEDDED_SOURCE_KIND,
                embedded_source_blob_with_size(3, PROGRAM_TEXT),
            )
            .embedded_source(PROGRAM, PROGRAM_TEXT)
            .build();
        let pdb = PortablePdb::from_mem(image).unwrap();

        assert!(matches!(
            pdb.source_text(PROGRAM),
            Err(Error::DecompressedSizeMismatch { expected: 3, .. })
        ));
    }

    #[test]
    fn large_external_tables() {
        let image = PdbBuilder::new()
            .method_def_rows(0x1_0000)
            .type_def_rows(10)
            .embedded_source(PROGRAM, PROGRAM_TEXT)
            .build();
        let pdb = PortablePdb::from_mem(image).unwrap();

        assert_eq!(pdb.pdb_stream().rows(TableId::TypeDef), 10);
        assert_eq!(pdb.source_text(PROGRAM).unwrap(), PROGRAM_TEXT);
    }

    #[test]
    fn no_documents() {
        let pdb = PortablePdb::from_mem(PdbBuilder::new().build()).unwrap();

        assert_eq!(pdb.document_count(), 0);
        assert!(pdb.documents().unwrap().is_empty());
        assert!(matches!(
            pdb.source_text(PROGRAM),
            Err(Error::DocumentNotFound(_))
        ));
    }

    #[test]
    fn missing_pdb_stream() {
        let image = metadata_root(&[("#Blob", vec![0, 0, 0, 0])]);

        assert!(matches!(
            PortablePdb::from_mem(image),
            Err(Error::Malformed { .. })
        ));
        assert!(matches!(PortablePdb::from_mem(vec![]), Err(Error::Empty)));
    }

    #[test]
    fn embedded_in_module() {
        let pdb = PdbBuilder::new()
            .embedded_source(PROGRAM, PROGRAM_TEXT)
            .build();
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("App.dll");
        std::fs::write(&module, PeBuilder::new().embedded_pdb(&pdb).build()).unwrap();

        let source = DebugInfoSource::locate(&module).unwrap();
        assert_eq!(source, DebugInfoSource::Embedded(module.clone()));
        assert_eq!(
            source.open().unwrap().source_text(PROGRAM).unwrap(),
            PROGRAM_TEXT
        );
    }

    #[test]
    fn standalone_preferred() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("App.EXE");
        let standalone = dir.path().join("App.pdb");
        std::fs::write(&module, PeBuilder::new().build()).unwrap();
        std::fs::write(
            &standalone,
            PdbBuilder::new()
                .embedded_source(PROGRAM, PROGRAM_TEXT)
                .build(),
        )
        .unwrap();

        let source = DebugInfoSource::locate(&module).unwrap();
        assert_eq!(source, DebugInfoSource::Standalone(standalone.clone()));
        assert_eq!(source.path(), standalone.as_path());
        assert_eq!(
            source.open().unwrap().source_text(PROGRAM).unwrap(),
            PROGRAM_TEXT
        );
    }

    #[test]
    fn module_without_debug_information() {
        let dir = tempfile::tempdir().unwrap();
        let module = dir.path().join("App.dll");
        std::fs::write(&module, PeBuilder::new().build()).unwrap();

        assert!(matches!(
            DebugInfoSource::locate(&module).unwrap().open(),
            Err(Error::NoDebugInformation(_))
        ));
        assert!(matches!(
            DebugInfoSource::locate(&dir.path().join("App.so")),
            Err(Error::NoDebugInformation(_))
        ));
    }
}
