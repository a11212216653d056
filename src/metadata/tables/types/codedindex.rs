use strum::{EnumCount, EnumIter};

use crate::{
    file::io::read_le_at,
    metadata::{
        tables::types::{TableId, TableInfo},
        token::Token,
    },
    Result,
};

/// Coded index kinds that appear in Portable PDB debug tables.
///
/// A coded index stores a table tag in its low bits and a row id in the rest; the number
/// of tag bits depends on how many tables the kind can point into (ECMA-335 II.24.2.6).
#[derive(Debug, Hash, Eq, PartialEq, Clone, Copy, EnumIter, EnumCount)]
#[repr(usize)]
pub enum CodedIndexType {
    /// Parent column of `CustomDebugInformation`, 27 possible tables.
    HasCustomDebugInformation,
}

impl CodedIndexType {
    /// Tables addressable by this kind, ordered by tag value.
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::HasCustomDebugInformation => &[
                TableId::MethodDef,
                TableId::Field,
                TableId::TypeRef,
                TableId::TypeDef,
                TableId::Param,
                TableId::InterfaceImpl,
                TableId::MemberRef,
                TableId::Module,
                TableId::DeclSecurity,
                TableId::Property,
                TableId::Event,
                TableId::StandAloneSig,
                TableId::ModuleRef,
                TableId::TypeSpec,
                TableId::Assembly,
                TableId::AssemblyRef,
                TableId::File,
                TableId::ExportedType,
                TableId::ManifestResource,
                TableId::GenericParam,
                TableId::GenericParamConstraint,
                TableId::MethodSpec,
                TableId::Document,
                TableId::LocalScope,
                TableId::LocalVariable,
                TableId::LocalConstant,
                TableId::ImportScope,
            ],
        }
    }

    /// Number of low bits used for the table tag.
    #[must_use]
    pub fn tag_bits(&self) -> u8 {
        let count = self.tables().len();
        // ceil(log2(count))
        (usize::BITS - (count - 1).leading_zeros()) as u8
    }
}

/// A decoded coded index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodedIndex {
    /// The table being referenced
    pub tag: TableId,
    /// The 1-based row id within that table, 0 for a nil reference
    pub row: u32,
    /// Token of the referenced row
    pub token: Token,
}

impl CodedIndex {
    /// Build a coded index from its parts.
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag, row),
        }
    }

    /// Read and decode a 2- or 4-byte coded index column.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated data and
    /// [`crate::Error::Malformed`] for an unassigned tag.
    pub fn read(
        data: &[u8],
        offset: &mut usize,
        info: &TableInfo,
        ci_type: CodedIndexType,
    ) -> Result<Self> {
        let coded_index = if info.coded_index_bytes(ci_type) == 4 {
            read_le_at::<u32>(data, offset)?
        } else {
            u32::from(read_le_at::<u16>(data, offset)?)
        };

        let (tag, row) = info.decode_coded_index(coded_index, ci_type)?;
        Ok(CodedIndex::new(tag, row))
    }
}
