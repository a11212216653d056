//! Bounds-checked little-endian reads for PE and Portable PDB structures.
//!
//! Every on-disk structure this crate decodes (debug directory entries, the metadata root,
//! stream headers, table rows, heap indices) is little-endian. The helpers in this module
//! read primitive values from byte slices with explicit bounds checks, returning
//! [`crate::Error::OutOfBounds`] instead of panicking on truncated input.
//!
//! # Usage Examples
//!
//! ```rust,ignore
//! use dotsource::file::io::{read_le, read_le_at};
//!
//! let data = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
//! let mut offset = 0;
//!
//! let first: u16 = read_le_at(&data, &mut offset)?;  // offset: 0 -> 2
//! let second: u16 = read_le_at(&data, &mut offset)?; // offset: 2 -> 4
//! let third: u32 = read_le_at(&data, &mut offset)?;  // offset: 4 -> 8
//!
//! assert_eq!((first, second, third), (1, 2, 3));
//! assert_eq!(read_le::<u32>(&data[4..])?, 3);
//! # Ok::<(), dotsource::Error>(())
//! ```
//!
//! Metadata table columns are either 2 or 4 bytes wide depending on heap and table sizes;
//! [`crate::file::io::read_le_at_dyn`] reads such a column and widens it to `u32`.

use crate::Result;

/// Primitive types that can be decoded from their little-endian byte representation.
pub trait LeBytes: Sized {
    /// The fixed-size byte array backing this type.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]>;

    /// Decode a value from little-endian bytes.
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_le_bytes {
    ($($ty:ty),*) => {
        $(
            impl LeBytes for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_le_bytes!(u8, i8, u16, i16, u32, i32, u64, i64);

/// Read a value from the start of `data` in little-endian byte order.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `data` is shorter than `T`.
pub fn read_le<T: LeBytes>(data: &[u8]) -> Result<T> {
    let mut offset = 0_usize;
    read_le_at(data, &mut offset)
}

/// Read a value at `offset` in little-endian byte order and advance `offset` past it.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the read would cross the end of `data`. The
/// offset is left untouched in that case.
pub fn read_le_at<T: LeBytes>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    let Some(end) = offset.checked_add(type_len) else {
        return Err(out_of_bounds_error!());
    };

    if end > data.len() {
        return Err(out_of_bounds_error!());
    }

    let Ok(read) = data[*offset..end].try_into() else {
        return Err(out_of_bounds_error!());
    };

    *offset = end;

    Ok(T::from_le_bytes(read))
}

/// Read a 2- or 4-byte column at `offset`, widened to `u32`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the column crosses the end of `data`.
pub fn read_le_at_dyn(data: &[u8], offset: &mut usize, is_large: bool) -> Result<u32> {
    let res = if is_large {
        read_le_at::<u32>(data, offset)?
    } else {
        u32::from(read_le_at::<u16>(data, offset)?)
    };

    Ok(res)
}
