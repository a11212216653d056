use std::marker::PhantomData;

use crate::{
    metadata::tables::types::{TableId, TableInfo},
    Result,
};

/// A row type that can be decoded from a tables stream.
pub trait RowReadable: Sized {
    /// The table this row belongs to.
    const TABLE_ID: TableId;

    /// Decode the row at `offset` and advance `offset` past it.
    ///
    /// ## Arguments
    /// * 'data'    - The rows of the table
    /// * 'offset'  - Read position, advanced by the row size
    /// * 'rid'     - 1-based row id of the row being read
    /// * 'sizes'   - Column widths of the tables stream
    ///
    /// # Errors
    /// Returns an error if the row is truncated or references an invalid table.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfo) -> Result<Self>;
}

/// Typed, random-access view over the rows of one table.
pub struct MetadataTable<'a, T> {
    data: &'a [u8],
    row_count: u32,
    row_size: u32,
    sizes: &'a TableInfo,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: RowReadable> MetadataTable<'a, T> {
    /// Wrap the rows of a table.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `data` cannot hold `row_count` rows.
    pub fn new(data: &'a [u8], row_count: u32, row_size: u32, sizes: &'a TableInfo) -> Result<Self> {
        let needed = u64::from(row_count) * u64::from(row_size);
        if needed > data.len() as u64 {
            return Err(out_of_bounds_error!());
        }

        Ok(MetadataTable {
            data,
            row_count,
            row_size,
            sizes,
            _marker: PhantomData,
        })
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Size of one row in bytes.
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// The row with 1-based id `rid`, `None` if out of range.
    pub fn get(&self, rid: u32) -> Option<Result<T>> {
        if rid == 0 || rid > self.row_count {
            return None;
        }

        let mut offset = (rid as usize - 1) * self.row_size as usize;
        Some(T::row_read(self.data, &mut offset, rid, self.sizes))
    }

    /// Iterate all rows in order.
    pub fn iter(&self) -> TableIterator<'_, 'a, T> {
        TableIterator {
            table: self,
            next_rid: 1,
        }
    }
}

impl<'t, 'a, T: RowReadable> IntoIterator for &'t MetadataTable<'a, T> {
    type Item = Result<T>;
    type IntoIter = TableIterator<'t, 'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the rows of a [`MetadataTable`].
pub struct TableIterator<'t, 'a, T> {
    table: &'t MetadataTable<'a, T>,
    next_rid: u32,
}

impl<T: RowReadable> Iterator for TableIterator<'_, '_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.table.get(self.next_rid)?;
        self.next_rid += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.table.row_count + 1).saturating_sub(self.next_rid) as usize;
        (remaining, Some(remaining))
    }
}
