//! Byte-level builders for crafted Portable PDB images and PE32 modules.
//!
//! Shared by the unit tests in `src/` and, through a `#[path]` module, by the integration
//! tests under `tests/`. Everything is written by hand following ECMA-335 II.24 and the
//! Portable PDB v1.0 layout, so no sample binaries need to be checked in.
#![allow(dead_code)]

use std::io::Write;

use flate2::{write::DeflateEncoder, Compression};

/// `0E8A571B-6926-466E-B4AD-8AB04611F5FE` in heap byte order.
pub const EMBEDDED_SOURCE_KIND: [u8; 16] = [
    0x1B, 0x57, 0x8A, 0x0E, 0x26, 0x69, 0x6E, 0x46, 0xB4, 0xAD, 0x8A, 0xB0, 0x46, 0x11, 0xF5, 0xFE,
];

/// `CC110556-A091-4D38-9FEC-25AB9A351A6A` in heap byte order.
pub const SOURCE_LINK_KIND: [u8; 16] = [
    0x56, 0x05, 0x11, 0xCC, 0x91, 0xA0, 0x38, 0x4D, 0x9F, 0xEC, 0x25, 0xAB, 0x9A, 0x35, 0x1A, 0x6A,
];

/// C# language GUID `3F5162F8-07C6-11D3-9053-00C04FA302A1` in heap byte order.
pub const CSHARP_LANGUAGE: [u8; 16] = [
    0xF8, 0x62, 0x51, 0x3F, 0xC6, 0x07, 0xD3, 0x11, 0x90, 0x53, 0x00, 0xC0, 0x4F, 0xA3, 0x02, 0xA1,
];

const DOCUMENT_TAG: u32 = 22;
const HAS_CUSTOM_DEBUG_INFORMATION_TAG_BITS: u32 = 5;
const METHOD_DEF: u32 = 0x06;

/// Raw DEFLATE (no zlib header) of `data`.
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Value blob of an embedded-source record: `u32` size followed by the payload.
pub fn embedded_source_blob(text: &str, compress: bool) -> Vec<u8> {
    if compress {
        embedded_source_blob_with_size(text.len() as u32, text)
    } else {
        let mut blob = 0u32.to_le_bytes().to_vec();
        blob.extend_from_slice(text.as_bytes());
        blob
    }
}

/// Compressed embedded-source blob that declares `declared` bytes regardless of `text`.
pub fn embedded_source_blob_with_size(declared: u32, text: &str) -> Vec<u8> {
    let mut blob = declared.to_le_bytes().to_vec();
    blob.extend(deflate(text.as_bytes()));
    blob
}

/// ECMA-335 II.23.2 compressed unsigned integer.
pub fn compressed_uint(value: u32) -> Vec<u8> {
    if value < 0x80 {
        vec![value as u8]
    } else if value < 0x4000 {
        vec![0x80 | (value >> 8) as u8, value as u8]
    } else {
        vec![
            0xC0 | (value >> 24) as u8,
            (value >> 16) as u8,
            (value >> 8) as u8,
            value as u8,
        ]
    }
}

fn pad4(buffer: &mut Vec<u8>) {
    while buffer.len() % 4 != 0 {
        buffer.push(0);
    }
}

fn bits_for(rows: u32) -> u32 {
    if rows == 0 {
        1
    } else {
        32 - rows.leading_zeros()
    }
}

fn write_index(buffer: &mut Vec<u8>, value: u32, large: bool) {
    if large {
        buffer.extend_from_slice(&value.to_le_bytes());
    } else {
        buffer.extend_from_slice(&(value as u16).to_le_bytes());
    }
}

struct Heaps {
    blob: Vec<u8>,
    guids: Vec<[u8; 16]>,
}

impl Heaps {
    fn new() -> Self {
        Heaps {
            blob: vec![0],
            guids: Vec::new(),
        }
    }

    fn blob(&mut self, bytes: &[u8]) -> u32 {
        if bytes.is_empty() {
            return 0;
        }

        let index = self.blob.len() as u32;
        self.blob.extend(compressed_uint(bytes.len() as u32));
        self.blob.extend_from_slice(bytes);
        index
    }

    fn guid(&mut self, guid: [u8; 16]) -> u32 {
        if let Some(position) = self.guids.iter().position(|g| *g == guid) {
            return position as u32 + 1;
        }

        self.guids.push(guid);
        self.guids.len() as u32
    }

    fn document_name(&mut self, name: &str) -> u32 {
        let mut encoded = vec![b'/'];
        for part in name.split('/') {
            let index = self.blob(part.as_bytes());
            encoded.extend(compressed_uint(index));
        }

        self.blob(&encoded)
    }
}

/// A `CustomDebugInformation` row attached to a document.
#[derive(Clone)]
pub struct DebugRecord {
    pub document: u32,
    pub kind: [u8; 16],
    pub value: Vec<u8>,
}

/// Builds a standalone Portable PDB image.
///
/// Documents get row ids in insertion order starting at 1.
#[derive(Clone)]
pub struct PdbBuilder {
    documents: Vec<String>,
    records: Vec<DebugRecord>,
    method_def_rows: u32,
    type_def_rows: Option<u32>,
}

impl Default for PdbBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdbBuilder {
    pub fn new() -> Self {
        PdbBuilder {
            documents: Vec::new(),
            records: Vec::new(),
            method_def_rows: 4,
            type_def_rows: None,
        }
    }

    /// Add a document without any debug records.
    pub fn document(mut self, name: &str) -> Self {
        self.documents.push(name.to_string());
        self
    }

    /// Add a document with a compressed embedded-source record.
    pub fn embedded_source(self, name: &str, text: &str) -> Self {
        self.document_with_record(name, EMBEDDED_SOURCE_KIND, embedded_source_blob(text, true))
    }

    /// Add a document with a single debug record of the given kind.
    pub fn document_with_record(mut self, name: &str, kind: [u8; 16], value: Vec<u8>) -> Self {
        self.documents.push(name.to_string());
        let document = self.documents.len() as u32;
        self.records.push(DebugRecord {
            document,
            kind,
            value,
        });
        self
    }

    /// Attach another record to an existing document row id.
    pub fn record(mut self, document: u32, kind: [u8; 16], value: Vec<u8>) -> Self {
        self.records.push(DebugRecord {
            document,
            kind,
            value,
        });
        self
    }

    /// Row count announced for the external `MethodDef` table.
    pub fn method_def_rows(mut self, rows: u32) -> Self {
        self.method_def_rows = rows;
        self
    }

    /// Also reference an external `TypeDef` table.
    pub fn type_def_rows(mut self, rows: u32) -> Self {
        self.type_def_rows = Some(rows);
        self
    }

    /// Serialize the `#Pdb`, `#~`, `#Strings`, `#Blob` and `#GUID` streams under a
    /// `BSJB` metadata root.
    pub fn build(&self) -> Vec<u8> {
        let mut heaps = Heaps::new();

        let documents: Vec<(u32, u32)> = self
            .documents
            .iter()
            .map(|name| (heaps.document_name(name), heaps.guid(CSHARP_LANGUAGE)))
            .collect();

        let mut records = self.records.clone();
        records.sort_by_key(|record| record.document);
        let records: Vec<(u32, u32, u32)> = records
            .iter()
            .map(|record| {
                (
                    record.document,
                    heaps.guid(record.kind),
                    heaps.blob(&record.value),
                )
            })
            .collect();

        pad4(&mut heaps.blob);
        let large_blob = heaps.blob.len() > 0xFFFF;
        let large_guid = heaps.guids.len() > 0xFFFF;

        let document_rows = self.documents.len() as u32;
        let max_rows = document_rows
            .max(self.method_def_rows)
            .max(self.type_def_rows.unwrap_or(0));
        let large_parent = bits_for(max_rows) + HAS_CUSTOM_DEBUG_INFORMATION_TAG_BITS > 16;

        // #~
        let mut valid = 0u64;
        if !documents.is_empty() {
            valid |= 1 << 0x30;
        }
        if !records.is_empty() {
            valid |= 1 << 0x37;
        }

        let mut tables = Vec::new();
        tables.extend_from_slice(&0u32.to_le_bytes());
        tables.push(2);
        tables.push(0);
        let mut heap_sizes = 0u8;
        if large_guid {
            heap_sizes |= 0x02;
        }
        if large_blob {
            heap_sizes |= 0x04;
        }
        tables.push(heap_sizes);
        tables.push(1);
        tables.extend_from_slice(&valid.to_le_bytes());
        tables.extend_from_slice(&valid.to_le_bytes());
        if !documents.is_empty() {
            tables.extend_from_slice(&document_rows.to_le_bytes());
        }
        if !records.is_empty() {
            tables.extend_from_slice(&(records.len() as u32).to_le_bytes());
        }

        for (name, language) in &documents {
            write_index(&mut tables, *name, large_blob);
            write_index(&mut tables, 0, large_guid);
            write_index(&mut tables, 0, large_blob);
            write_index(&mut tables, *language, large_guid);
        }

        for (document, kind, value) in &records {
            let parent = (document << HAS_CUSTOM_DEBUG_INFORMATION_TAG_BITS) | DOCUMENT_TAG;
            write_index(&mut tables, parent, large_parent);
            write_index(&mut tables, *kind, large_guid);
            write_index(&mut tables, *value, large_blob);
        }
        pad4(&mut tables);

        // #Pdb
        let mut pdb = vec![0xAB; 20];
        pdb.extend_from_slice(&0u32.to_le_bytes());
        let mut referenced = 0u64;
        if self.type_def_rows.is_some() {
            referenced |= 1 << 0x02;
        }
        if self.method_def_rows > 0 {
            referenced |= 1 << METHOD_DEF;
        }
        pdb.extend_from_slice(&referenced.to_le_bytes());
        if let Some(rows) = self.type_def_rows {
            pdb.extend_from_slice(&rows.to_le_bytes());
        }
        if self.method_def_rows > 0 {
            pdb.extend_from_slice(&self.method_def_rows.to_le_bytes());
        }

        let strings = vec![0u8; 4];
        let guid_heap: Vec<u8> = heaps.guids.iter().flatten().copied().collect();

        metadata_root(&[
            ("#Pdb", pdb),
            ("#~", tables),
            ("#Strings", strings),
            ("#Blob", heaps.blob),
            ("#GUID", guid_heap),
        ])
    }
}

/// Wrap `streams` in a `BSJB` metadata root.
pub fn metadata_root(streams: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let version = b"PDB v1.0\0\0\0\0";

    let mut headers_len = 0;
    for (name, _) in streams {
        headers_len += 8 + (name.len() + 1).div_ceil(4) * 4;
    }

    let mut root = Vec::new();
    root.extend_from_slice(&0x424A_5342u32.to_le_bytes());
    root.extend_from_slice(&1u16.to_le_bytes());
    root.extend_from_slice(&1u16.to_le_bytes());
    root.extend_from_slice(&0u32.to_le_bytes());
    root.extend_from_slice(&(version.len() as u32).to_le_bytes());
    root.extend_from_slice(version);
    root.extend_from_slice(&0u16.to_le_bytes());
    root.extend_from_slice(&(streams.len() as u16).to_le_bytes());

    let mut offset = root.len() + headers_len;
    for (name, data) in streams {
        root.extend_from_slice(&(offset as u32).to_le_bytes());
        root.extend_from_slice(&(data.len() as u32).to_le_bytes());
        root.extend_from_slice(name.as_bytes());
        root.push(0);
        pad4(&mut root);
        offset += data.len().div_ceil(4) * 4;
    }

    for (_, data) in streams {
        root.extend_from_slice(data);
        pad4(&mut root);
    }

    root
}

/// `MPDB` payload of an embedded Portable PDB debug directory entry.
pub fn embedded_pdb_payload(pdb: &[u8]) -> Vec<u8> {
    let mut payload = 0x4244_504Du32.to_le_bytes().to_vec();
    payload.extend_from_slice(&(pdb.len() as u32).to_le_bytes());
    payload.extend(deflate(pdb));
    payload
}

/// Debug directory entry type of an embedded Portable PDB.
pub const DEBUG_TYPE_EMBEDDED_PORTABLE_PDB: u32 = 17;
/// Debug directory entry type with no defined payload.
pub const DEBUG_TYPE_UNKNOWN: u32 = 0;

const FILE_ALIGNMENT: usize = 0x200;
const SECTION_ALIGNMENT: usize = 0x2000;
const TEXT_RVA: usize = 0x2000;

/// Builds a minimal PE32 image with a single `.text` section holding a debug directory.
#[derive(Default, Clone)]
pub struct PeBuilder {
    entries: Vec<(u32, Vec<u8>)>,
    directories: Vec<(usize, u32, u32)>,
}

impl PeBuilder {
    pub fn new() -> Self {
        PeBuilder::default()
    }

    /// Append a debug directory entry of `entry_type` carrying `data`.
    pub fn debug_entry(mut self, entry_type: u32, data: Vec<u8>) -> Self {
        self.entries.push((entry_type, data));
        self
    }

    /// Append an embedded Portable PDB entry for `pdb`.
    pub fn embedded_pdb(self, pdb: &[u8]) -> Self {
        self.debug_entry(DEBUG_TYPE_EMBEDDED_PORTABLE_PDB, embedded_pdb_payload(pdb))
    }

    /// Point data directory `index` at `rva`/`size` without backing it with any data.
    pub fn data_directory(mut self, index: usize, rva: u32, size: u32) -> Self {
        self.directories.push((index, rva, size));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let directory_len = self.entries.len() * 28;

        let mut payload_offsets = Vec::new();
        let mut section_len = directory_len;
        for (_, data) in &self.entries {
            section_len = section_len.div_ceil(4) * 4;
            payload_offsets.push(section_len);
            section_len += data.len();
        }

        let mut section = Vec::new();
        for ((entry_type, data), offset) in self.entries.iter().zip(&payload_offsets) {
            section.extend_from_slice(&0u32.to_le_bytes());
            section.extend_from_slice(&0u32.to_le_bytes());
            section.extend_from_slice(&0x0100u16.to_le_bytes());
            section.extend_from_slice(&0x0100u16.to_le_bytes());
            section.extend_from_slice(&entry_type.to_le_bytes());
            section.extend_from_slice(&(data.len() as u32).to_le_bytes());
            section.extend_from_slice(&((TEXT_RVA + offset) as u32).to_le_bytes());
            section.extend_from_slice(&((FILE_ALIGNMENT + offset) as u32).to_le_bytes());
        }
        for ((_, data), offset) in self.entries.iter().zip(&payload_offsets) {
            section.resize(*offset, 0);
            section.extend_from_slice(data);
        }

        let virtual_size = section_len.max(1);
        let raw_size = virtual_size.div_ceil(FILE_ALIGNMENT) * FILE_ALIGNMENT;
        section.resize(raw_size, 0);
        let size_of_image = TEXT_RVA + virtual_size.div_ceil(SECTION_ALIGNMENT) * SECTION_ALIGNMENT;

        let mut image = vec![0u8; 0x80];
        image[0] = b'M';
        image[1] = b'Z';
        image[0x3C..0x40].copy_from_slice(&0x80u32.to_le_bytes());

        // PE signature + COFF header
        image.extend_from_slice(b"PE\0\0");
        image.extend_from_slice(&0x014Cu16.to_le_bytes());
        image.extend_from_slice(&1u16.to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&0xE0u16.to_le_bytes());
        image.extend_from_slice(&0x2102u16.to_le_bytes());

        // PE32 optional header, standard fields
        image.extend_from_slice(&0x010Bu16.to_le_bytes());
        image.push(48);
        image.push(0);
        image.extend_from_slice(&(raw_size as u32).to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&(TEXT_RVA as u32).to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());

        // Windows-specific fields
        image.extend_from_slice(&0x1000_0000u32.to_le_bytes());
        image.extend_from_slice(&(SECTION_ALIGNMENT as u32).to_le_bytes());
        image.extend_from_slice(&(FILE_ALIGNMENT as u32).to_le_bytes());
        image.extend_from_slice(&4u16.to_le_bytes());
        image.extend_from_slice(&0u16.to_le_bytes());
        image.extend_from_slice(&0u16.to_le_bytes());
        image.extend_from_slice(&0u16.to_le_bytes());
        image.extend_from_slice(&4u16.to_le_bytes());
        image.extend_from_slice(&0u16.to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&(size_of_image as u32).to_le_bytes());
        image.extend_from_slice(&(FILE_ALIGNMENT as u32).to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&3u16.to_le_bytes());
        image.extend_from_slice(&0x8540u16.to_le_bytes());
        image.extend_from_slice(&0x0010_0000u32.to_le_bytes());
        image.extend_from_slice(&0x1000u32.to_le_bytes());
        image.extend_from_slice(&0x0010_0000u32.to_le_bytes());
        image.extend_from_slice(&0x1000u32.to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&16u32.to_le_bytes());

        // Data directories, only the debug directory (index 6) is backed by data
        for index in 0..16 {
            if index == 6 && directory_len > 0 {
                image.extend_from_slice(&(TEXT_RVA as u32).to_le_bytes());
                image.extend_from_slice(&(directory_len as u32).to_le_bytes());
            } else if let Some((_, rva, size)) =
                self.directories.iter().find(|(entry, ..)| *entry == index)
            {
                image.extend_from_slice(&rva.to_le_bytes());
                image.extend_from_slice(&size.to_le_bytes());
            } else {
                image.extend_from_slice(&0u64.to_le_bytes());
            }
        }

        // Section table
        image.extend_from_slice(b".text\0\0\0");
        image.extend_from_slice(&(virtual_size as u32).to_le_bytes());
        image.extend_from_slice(&(TEXT_RVA as u32).to_le_bytes());
        image.extend_from_slice(&(raw_size as u32).to_le_bytes());
        image.extend_from_slice(&(FILE_ALIGNMENT as u32).to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&0u32.to_le_bytes());
        image.extend_from_slice(&0u16.to_le_bytes());
        image.extend_from_slice(&0u16.to_le_bytes());
        image.extend_from_slice(&0x6000_0020u32.to_le_bytes());

        image.resize(FILE_ALIGNMENT, 0);
        image.extend(section);
        image
    }
}

/// `count` lines of C#-looking source, numbered from 1.
pub fn numbered_source(count: usize, line_ending: &str) -> String {
    (1..=count)
        .map(|line| format!("    var line{line} = {line};"))
        .collect::<Vec<_>>()
        .join(line_ending)
}
