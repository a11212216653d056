use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfo},
        token::Token,
    },
    Result,
};

/// A `CustomDebugInformation` row with unresolved heap indices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomDebugInformationRaw {
    /// 1-based row id
    pub rid: u32,
    /// Metadata token, `0x37xxxxxx`
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// The entity this record belongs to
    pub parent: CodedIndex,
    /// `#GUID` index of the record kind
    pub kind: u32,
    /// `#Blob` index of the record value
    pub value: u32,
}

impl CustomDebugInformationRaw {
    /// `true` if this record belongs to the `Document` row `rid`.
    #[must_use]
    pub fn is_attached_to_document(&self, rid: u32) -> bool {
        self.parent.tag == TableId::Document && self.parent.row == rid
    }
}

impl RowReadable for CustomDebugInformationRaw {
    const TABLE_ID: TableId = TableId::CustomDebugInformation;

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self> {
        let row_offset = *offset;

        Ok(CustomDebugInformationRaw {
            rid,
            token: Token::from_parts(TableId::CustomDebugInformation, rid),
            offset: row_offset,
            parent: CodedIndex::read(
                data,
                offset,
                sizes,
                CodedIndexType::HasCustomDebugInformation,
            )?,
            kind: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
