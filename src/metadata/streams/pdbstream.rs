//! The `#Pdb` stream of a Portable PDB.
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 20 | PDB id (GUID + stamp of the owning build) |
//! | 20 | 4 | Entry point `MethodDef` token, 0 if none |
//! | 24 | 8 | Bit vector of referenced type-system tables |
//! | 32 | 4 * n | Row count of each referenced table, in table-number order |

use crate::{
    file::parser::Parser,
    metadata::{tables::TableId, token::Token},
    Result,
};

/// The decoded `#Pdb` stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdbStream {
    /// Identifies the build this PDB belongs to
    pub id: [u8; 20],
    /// Entry point of the owning assembly
    pub entry_point: Token,
    /// Bit vector of type-system tables referenced by the debug tables
    pub referenced_tables: u64,
    /// Row counts of the referenced tables
    pub type_system_rows: Vec<(TableId, u32)>,
}

impl PdbStream {
    /// Decode a `#Pdb` stream.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the stream is truncated and
    /// [`crate::Error::Malformed`] if it references a debug or undefined table.
    pub fn read(data: &[u8]) -> Result<PdbStream> {
        let mut parser = Parser::new(data);

        let mut id = [0u8; 20];
        id.copy_from_slice(parser.read_bytes(20)?);
        let entry_point = Token::new(parser.read_le::<u32>()?);
        let referenced_tables = parser.read_le::<u64>()?;

        let mut type_system_rows = Vec::with_capacity(referenced_tables.count_ones() as usize);
        for bit in 0..64_u8 {
            if referenced_tables & (1_u64 << bit) == 0 {
                continue;
            }

            match TableId::from_id(bit) {
                Some(table_id) if !table_id.is_debug_table() => {
                    type_system_rows.push((table_id, parser.read_le::<u32>()?));
                }
                _ => {
                    return Err(malformed_error!(
                        "Invalid referenced type-system table 0x{:02X}",
                        bit
                    ))
                }
            }
        }

        Ok(PdbStream {
            id,
            entry_point,
            referenced_tables,
            type_system_rows,
        })
    }

    /// Row count of a referenced type-system table, 0 if not referenced.
    #[must_use]
    pub fn rows(&self, table_id: TableId) -> u32 {
        self.type_system_rows
            .iter()
            .find(|(table, _)| *table == table_id)
            .map_or(0, |(_, rows)| *rows)
    }
}
