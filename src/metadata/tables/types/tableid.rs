use strum::{EnumCount, EnumIter, IntoEnumIterator};

/// Identifiers of the ECMA-335 type-system tables and the Portable PDB debug tables.
///
/// The discriminant is the table number used in the `valid` bit vector of a tables stream,
/// in the `#Pdb` stream's referenced-tables mask and in the top byte of a metadata token.
///
/// ## Reference
/// * [ECMA-335 Partition II, Section 22](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Metadata Tables
/// * [Portable PDB v1.0](https://github.com/dotnet/runtime/blob/main/docs/design/specs/PortablePdb-Metadata.md) - Debug tables
#[derive(Clone, Copy, PartialEq, Debug, EnumIter, EnumCount, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TableId {
    /// `Module` table (0x00)
    Module = 0x00,
    /// `TypeRef` table (0x01)
    TypeRef = 0x01,
    /// `TypeDef` table (0x02)
    TypeDef = 0x02,
    /// `FieldPtr` table (0x03)
    FieldPtr = 0x03,
    /// `Field` table (0x04)
    Field = 0x04,
    /// `MethodPtr` table (0x05)
    MethodPtr = 0x05,
    /// `MethodDef` table (0x06)
    MethodDef = 0x06,
    /// `ParamPtr` table (0x07)
    ParamPtr = 0x07,
    /// `Param` table (0x08)
    Param = 0x08,
    /// `InterfaceImpl` table (0x09)
    InterfaceImpl = 0x09,
    /// `MemberRef` table (0x0A)
    MemberRef = 0x0A,
    /// `Constant` table (0x0B)
    Constant = 0x0B,
    /// `CustomAttribute` table (0x0C)
    CustomAttribute = 0x0C,
    /// `FieldMarshal` table (0x0D)
    FieldMarshal = 0x0D,
    /// `DeclSecurity` table (0x0E)
    DeclSecurity = 0x0E,
    /// `ClassLayout` table (0x0F)
    ClassLayout = 0x0F,
    /// `FieldLayout` table (0x10)
    FieldLayout = 0x10,
    /// `StandAloneSig` table (0x11)
    StandAloneSig = 0x11,
    /// `EventMap` table (0x12)
    EventMap = 0x12,
    /// `EventPtr` table (0x13)
    EventPtr = 0x13,
    /// `Event` table (0x14)
    Event = 0x14,
    /// `PropertyMap` table (0x15)
    PropertyMap = 0x15,
    /// `PropertyPtr` table (0x16)
    PropertyPtr = 0x16,
    /// `Property` table (0x17)
    Property = 0x17,
    /// `MethodSemantics` table (0x18)
    MethodSemantics = 0x18,
    /// `MethodImpl` table (0x19)
    MethodImpl = 0x19,
    /// `ModuleRef` table (0x1A)
    ModuleRef = 0x1A,
    /// `TypeSpec` table (0x1B)
    TypeSpec = 0x1B,
    /// `ImplMap` table (0x1C)
    ImplMap = 0x1C,
    /// `FieldRVA` table (0x1D)
    FieldRVA = 0x1D,
    /// `EncLog` table (0x1E)
    EncLog = 0x1E,
    /// `EncMap` table (0x1F)
    EncMap = 0x1F,
    /// `Assembly` table (0x20)
    Assembly = 0x20,
    /// `AssemblyProcessor` table (0x21)
    AssemblyProcessor = 0x21,
    /// `AssemblyOS` table (0x22)
    AssemblyOS = 0x22,
    /// `AssemblyRef` table (0x23)
    AssemblyRef = 0x23,
    /// `AssemblyRefProcessor` table (0x24)
    AssemblyRefProcessor = 0x24,
    /// `AssemblyRefOS` table (0x25)
    AssemblyRefOS = 0x25,
    /// `File` table (0x26)
    File = 0x26,
    /// `ExportedType` table (0x27)
    ExportedType = 0x27,
    /// `ManifestResource` table (0x28)
    ManifestResource = 0x28,
    /// `NestedClass` table (0x29)
    NestedClass = 0x29,
    /// `GenericParam` table (0x2A)
    GenericParam = 0x2A,
    /// `MethodSpec` table (0x2B)
    MethodSpec = 0x2B,
    /// `GenericParamConstraint` table (0x2C)
    GenericParamConstraint = 0x2C,
    /// `Document` table (0x30) - source documents referenced by sequence points
    Document = 0x30,
    /// `MethodDebugInformation` table (0x31) - sequence points per method
    MethodDebugInformation = 0x31,
    /// `LocalScope` table (0x32) - lexical scopes of locals
    LocalScope = 0x32,
    /// `LocalVariable` table (0x33)
    LocalVariable = 0x33,
    /// `LocalConstant` table (0x34)
    LocalConstant = 0x34,
    /// `ImportScope` table (0x35) - namespace imports
    ImportScope = 0x35,
    /// `StateMachineMethod` table (0x36) - async/iterator kickoff methods
    StateMachineMethod = 0x36,
    /// `CustomDebugInformation` table (0x37) - GUID-tagged debug records
    CustomDebugInformation = 0x37,
}

impl TableId {
    /// Look up a table by its number.
    #[must_use]
    pub fn from_id(id: u8) -> Option<TableId> {
        TableId::iter().find(|table| *table as u8 == id)
    }

    /// `true` for the Portable PDB debug tables (0x30 - 0x37).
    #[must_use]
    pub fn is_debug_table(self) -> bool {
        self >= TableId::Document
    }

    /// Highest defined table number plus one, the size of per-table lookup arrays.
    pub const SLOTS: usize = TableId::CustomDebugInformation as usize + 1;

    /// Number of defined tables.
    #[must_use]
    pub fn count() -> usize {
        TableId::COUNT
    }
}
