//! The `#~` tables stream of a Portable PDB.
//!
//! Layout (ECMA-335 II.24.2.6):
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | Reserved |
//! | 4 | 1 | Major version |
//! | 5 | 1 | Minor version |
//! | 6 | 1 | Heap size flags (`#Strings` 0x01, `#GUID` 0x02, `#Blob` 0x04) |
//! | 7 | 1 | Reserved |
//! | 8 | 8 | Bit vector of present tables |
//! | 16 | 8 | Bit vector of sorted tables |
//! | 24 | 4 * n | Row count of each present table |
//! | .. | .. | Table rows, in table-number order |
//!
//! A standalone Portable PDB only stores the debug tables (0x30 - 0x37). Indices into the
//! type-system tables of the owning assembly are sized with the row counts recorded in the
//! `#Pdb` stream, which is why [`TablesHeader::from`] takes them as input.

use crate::{
    file::io::read_le,
    metadata::tables::{MetadataTable, RowReadable, TableId, TableInfo},
    Result,
};

/// Heap size flag announcing an extra 4-byte field after the row counts.
const EXTRA_DATA_FLAG: u8 = 0x40;

#[derive(Debug, Clone, Copy)]
struct TableLocation {
    offset: usize,
    rows: u32,
    row_size: u32,
}

/// Parsed header of a tables stream with the location of every present table.
pub struct TablesHeader<'a> {
    /// Major schema version, 2
    pub major_version: u8,
    /// Minor schema version, 0
    pub minor_version: u8,
    /// Bit vector of present tables
    pub valid: u64,
    /// Bit vector of sorted tables
    pub sorted: u64,
    /// Row counts and column widths
    pub info: TableInfo,
    data: &'a [u8],
    tables: Vec<Option<TableLocation>>,
}

impl<'a> TablesHeader<'a> {
    /// Parse the header of a Portable PDB tables stream.
    ///
    /// ## Arguments
    /// * 'data'            - The `#~` stream
    /// * 'external_rows'   - Row counts of the referenced type-system tables from `#Pdb`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is truncated and
    /// [`crate::Error::NotSupported`] if it stores type-system tables.
    pub fn from(data: &'a [u8], external_rows: &[(TableId, u32)]) -> Result<TablesHeader<'a>> {
        if data.len() < 24 {
            return Err(out_of_bounds_error!());
        }

        let valid = read_le::<u64>(&data[8..])?;
        let info = TableInfo::new(data, valid, external_rows)?;

        let heap_sizes = read_le::<u8>(&data[6..])?;
        let mut current_offset = 24 + valid.count_ones() as usize * 4;
        if heap_sizes & EXTRA_DATA_FLAG != 0 {
            current_offset += 4;
        }

        let mut tables = vec![None; TableId::SLOTS];
        for bit in 0..64_u8 {
            if valid & (1_u64 << bit) == 0 {
                continue;
            }

            // TableInfo::new already rejected undefined table numbers
            let Some(table_id) = TableId::from_id(bit) else {
                continue;
            };
            let Some(row_size) = info.debug_row_size(table_id) else {
                return Err(crate::Error::NotSupported);
            };

            let rows = info.get(table_id).rows;
            let size = rows as usize * row_size as usize;
            let Some(end) = current_offset.checked_add(size) else {
                return Err(out_of_bounds_error!());
            };
            if end > data.len() {
                return Err(out_of_bounds_error!());
            }

            tables[table_id as usize] = Some(TableLocation {
                offset: current_offset,
                rows,
                row_size,
            });
            current_offset = end;
        }

        Ok(TablesHeader {
            major_version: read_le::<u8>(&data[4..])?,
            minor_version: read_le::<u8>(&data[5..])?,
            valid,
            sorted: read_le::<u64>(&data[16..])?,
            info,
            data,
            tables,
        })
    }

    /// Number of tables present in this stream.
    #[must_use]
    pub fn table_count(&self) -> u32 {
        self.valid.count_ones()
    }

    /// `true` if the table is present.
    #[must_use]
    pub fn has_table(&self, table_id: TableId) -> bool {
        self.tables[table_id as usize].is_some()
    }

    /// Row count of a table, 0 if absent.
    #[must_use]
    pub fn rows(&self, table_id: TableId) -> u32 {
        self.tables[table_id as usize].map_or(0, |table| table.rows)
    }

    /// Typed view over the rows of `T`'s table, `None` if absent.
    pub fn table<T: RowReadable>(&self) -> Option<MetadataTable<'_, T>> {
        let location = self.tables[T::TABLE_ID as usize]?;
        let size = location.rows as usize * location.row_size as usize;
        let data = &self.data[location.offset..location.offset + size];

        MetadataTable::new(data, location.rows, location.row_size, &self.info).ok()
    }
}
