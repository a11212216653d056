//! Building blocks shared by all table readers.
//!
//! - [`TableId`] - table numbers of the type-system and debug tables
//! - [`TableInfo`] - row counts and the resulting column widths
//! - [`CodedIndexType`] / [`CodedIndex`] - tagged references into a set of tables
//! - [`RowReadable`] / [`MetadataTable`] - typed access to the rows of one table

mod codedindex;
mod table;
mod tableid;
mod tableinfo;

pub use codedindex::{CodedIndex, CodedIndexType};
pub use table::{MetadataTable, RowReadable, TableIterator};
pub use tableid::TableId;
pub use tableinfo::{TableInfo, TableRowInfo};
