use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::read_le_at,
    metadata::tables::types::{CodedIndexType, TableId},
    Result,
};

/// Row count of one table and the index width it implies.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// Number of rows
    pub rows: u32,
    /// Bits needed to address every row
    pub bits: u8,
    /// `true` if a simple index into this table needs 4 bytes
    pub is_large: bool,
}

impl TableRowInfo {
    /// Size information for a table with `rows` rows.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (32 - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: bits > 16,
        }
    }
}

/// Column widths of a tables stream.
///
/// Index columns are 2 bytes unless the referenced heap or table is too large for 16 bits.
/// In a Portable PDB the debug tables can point into type-system tables that live in the
/// owning assembly; their row counts come from the `#Pdb` stream and are merged in here so
/// that coded indices such as `HasCustomDebugInformation` are sized correctly.
#[derive(Clone, Debug)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
}

impl TableInfo {
    /// Read the row counts of a tables stream and merge external row counts.
    ///
    /// ## Arguments
    /// * 'data'            - The tables stream, starting at its header
    /// * 'valid_bitvec'    - Bit vector of present tables
    /// * 'external_rows'   - Row counts of tables stored in another image
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the row counts are truncated and
    /// [`crate::Error::Malformed`] if the bit vector names an undefined table.
    pub fn new(data: &[u8], valid_bitvec: u64, external_rows: &[(TableId, u32)]) -> Result<Self> {
        let mut table_info = vec![TableRowInfo::default(); TableId::SLOTS];

        let mut next_row_offset = 24;
        for bit in 0..64_u8 {
            if valid_bitvec & (1_u64 << bit) == 0 {
                continue;
            }

            let Some(table_id) = TableId::from_id(bit) else {
                return Err(malformed_error!("Unknown table 0x{:02X} in tables stream", bit));
            };

            let row_count = read_le_at::<u32>(data, &mut next_row_offset)?;
            table_info[table_id as usize] = TableRowInfo::new(row_count);
        }

        for (table_id, rows) in external_rows {
            table_info[*table_id as usize] = TableRowInfo::new(*rows);
        }

        let heap_size_flags = read_le_at::<u8>(data, &mut 6)?;
        let mut table_info = TableInfo {
            rows: table_info,
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: heap_size_flags & 1 == 1,
            is_large_index_guid: heap_size_flags & 2 == 2,
            is_large_index_blob: heap_size_flags & 4 == 4,
        };

        table_info.calculate_coded_index_bits();
        Ok(table_info)
    }

    /// Build size information directly from row counts.
    #[cfg(test)]
    pub fn new_test(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        let mut table_info = TableInfo {
            rows: vec![TableRowInfo::default(); TableId::SLOTS],
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
        };

        for valid_table in valid_tables {
            table_info.rows[valid_table.0 as usize] = TableRowInfo::new(valid_table.1);
        }

        table_info.calculate_coded_index_bits();
        table_info
    }

    /// Split a coded index value into table and row.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag does not name a table of this kind.
    pub fn decode_coded_index(
        &self,
        value: u32,
        coded_index_type: CodedIndexType,
    ) -> Result<(TableId, u32)> {
        let tables = coded_index_type.tables();
        let tag_bits = coded_index_type.tag_bits();
        let tag_mask = (1_u32 << tag_bits) - 1;

        let tag = value & tag_mask;
        let index = value >> tag_bits;

        match tables.get(tag as usize) {
            Some(table) => Ok((*table, index)),
            None => Err(malformed_error!(
                "Invalid tag {} for coded index {:?}",
                tag,
                coded_index_type
            )),
        }
    }

    /// Row information of `table`.
    #[must_use]
    pub fn get(&self, table: TableId) -> &TableRowInfo {
        &self.rows[table as usize]
    }

    /// `true` if `#Strings` indices are 4 bytes.
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// `true` if `#GUID` indices are 4 bytes.
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.is_large_index_guid
    }

    /// `true` if `#Blob` indices are 4 bytes.
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Width of a `#Strings` index column.
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Width of a `#GUID` index column.
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Width of a `#Blob` index column.
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Width of a simple index into `table_id`.
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].is_large {
            4
        } else {
            2
        }
    }

    /// Bits needed by a coded index of this kind.
    #[must_use]
    pub fn coded_index_bits(&self, coded_index_type: CodedIndexType) -> u8 {
        self.coded_indexes[coded_index_type as usize]
    }

    /// Width of a coded index column of this kind.
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.coded_indexes[coded_index_type as usize] > 16 {
            4
        } else {
            2
        }
    }

    /// Row size of a debug table, `None` for type-system tables.
    #[must_use]
    pub fn debug_row_size(&self, table_id: TableId) -> Option<u32> {
        let size = match table_id {
            TableId::Document => {
                self.blob_bytes() + self.guid_bytes() + self.blob_bytes() + self.guid_bytes()
            }
            TableId::MethodDebugInformation => {
                self.table_index_bytes(TableId::Document) + self.blob_bytes()
            }
            TableId::LocalScope => {
                self.table_index_bytes(TableId::MethodDef)
                    + self.table_index_bytes(TableId::ImportScope)
                    + self.table_index_bytes(TableId::LocalVariable)
                    + self.table_index_bytes(TableId::LocalConstant)
                    + 4
                    + 4
            }
            TableId::LocalVariable => 2 + 2 + self.str_bytes(),
            TableId::LocalConstant => self.str_bytes() + self.blob_bytes(),
            TableId::ImportScope => {
                self.table_index_bytes(TableId::ImportScope) + self.blob_bytes()
            }
            TableId::StateMachineMethod => {
                self.table_index_bytes(TableId::MethodDef) + self.table_index_bytes(TableId::MethodDef)
            }
            TableId::CustomDebugInformation => {
                self.coded_index_bytes(CodedIndexType::HasCustomDebugInformation)
                    + self.guid_bytes()
                    + self.blob_bytes()
            }
            _ => return None,
        };

        Some(u32::from(size))
    }

    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let max_bits = coded_index
                .tables()
                .iter()
                .map(|table| self.rows[*table as usize].bits)
                .max()
                .unwrap_or(1);

            self.coded_indexes[coded_index as usize] = max_bits + coded_index.tag_bits();
        }
    }
}
