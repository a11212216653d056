use crate::{
    file::{io::read_le_at_dyn, parser::Parser},
    metadata::{
        streams::{Blob, Guid},
        tables::{RowReadable, TableId, TableInfo},
        token::Token,
    },
    Result,
};

/// A `Document` row with unresolved heap indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocumentRaw {
    /// 1-based row id
    pub rid: u32,
    /// Metadata token, `0x30xxxxxx`
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// `#Blob` index of the encoded document name
    pub name: u32,
    /// `#GUID` index of the hash algorithm
    pub hash_algorithm: u32,
    /// `#Blob` index of the content hash
    pub hash: u32,
    /// `#GUID` index of the source language
    pub language: u32,
}

impl DocumentRaw {
    /// Decode the document name.
    ///
    /// The name blob starts with a separator byte (0 for none) followed by compressed
    /// `#Blob` indices of UTF-8 path segments; the segments are joined with the separator.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a non-ASCII separator or a broken part
    /// index, and [`crate::Error::OutOfBounds`] if a blob index is past the heap.
    pub fn resolve_name(&self, blobs: &Blob) -> Result<String> {
        let blob = blobs.get(self.name as usize)?;
        if blob.is_empty() {
            return Ok(String::new());
        }

        let mut parser = Parser::new(blob);
        let separator = parser.read_le::<u8>()?;
        if !separator.is_ascii() {
            return Err(malformed_error!(
                "Invalid document name separator - 0x{:02X}",
                separator
            ));
        }

        let mut name = String::new();
        let mut first = true;
        while parser.has_more_data() {
            let part_index = parser.read_compressed_uint()?;
            if !first && separator != 0 {
                name.push(char::from(separator));
            }
            first = false;

            let part = blobs.get(part_index as usize)?;
            name.push_str(&String::from_utf8_lossy(part));
        }

        Ok(name)
    }

    /// The language GUID of this document.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index is past the heap.
    pub fn resolve_language(&self, guids: &Guid) -> Result<uguid::Guid> {
        guids.get(self.language as usize)
    }
}

impl RowReadable for DocumentRaw {
    const TABLE_ID: TableId = TableId::Document;

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        Ok(DocumentRaw {
            rid,
            token: Token::from_parts(TableId::Document, rid),
            offset: *offset,
            name: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            hash_algorithm: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            hash: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            language: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
        })
    }
}
