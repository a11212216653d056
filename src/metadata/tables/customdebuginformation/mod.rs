//! The `CustomDebugInformation` table (0x37) of a Portable PDB.
//!
//! Rows attach a GUID-tagged blob to a parent entity, addressed by a
//! `HasCustomDebugInformation` coded index. Embedded source text is stored this way with
//! a `Document` row as parent. Rows are sorted by parent.

mod raw;

pub use raw::*;
