use super::frag_types::ChargedFragType;
use crate::errors::{
    LookupError,
    Result,
    ShapeError,
};
use crate::models::{
    Array2D,
    FragRange,
    PrecursorTable,
    contiguous_frag_ranges,
};

/// Flat fragment table: one row per cleavage position of one precursor,
/// one column per charged fragment type.
///
/// The table does not know which precursor a row belongs to, that is
/// carried by the [`FragRange`] of each precursor.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentTable {
    values: Array2D<f64>,
    columns: Vec<ChargedFragType>,
}

impl FragmentTable {
    /// Zero table, every charged fragment type can appear only once.
    pub fn zeros(nrows: usize, columns: &[ChargedFragType]) -> Result<Self> {
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].contains(col) {
                return Err(ShapeError::DuplicateColumn {
                    column: col.to_string(),
                }
                .into());
            }
        }
        Ok(Self {
            values: Array2D::new_filled(nrows, columns.len(), 0.0),
            columns: columns.to_vec(),
        })
    }

    /// Zero table for precursors of the given lengths (in that order)
    /// and their contiguous row ranges.
    pub fn allocate(
        peplens: &[usize],
        charged_frag_types: &[ChargedFragType],
    ) -> Result<(Self, Vec<FragRange>)> {
        if let Some(&peplen) = peplens.iter().find(|&&x| x == 0) {
            return Err(ShapeError::PeptideTooShort { peplen }.into());
        }
        let ranges = contiguous_frag_ranges(peplens.iter().copied());
        let nrows = ranges.last().map(|x| x.end).unwrap_or(0);
        Ok((Self::zeros(nrows, charged_frag_types)?, ranges))
    }

    /// Zero table with the row layout of `reference` and its own columns.
    pub fn allocate_like(reference: &FragmentTable, charged_frag_types: &[ChargedFragType]) -> Result<Self> {
        Self::zeros(reference.nrows(), charged_frag_types)
    }

    pub fn nrows(&self) -> usize {
        self.values.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.values.ncols()
    }

    pub fn columns(&self) -> &[ChargedFragType] {
        &self.columns
    }

    pub fn values(&self) -> &Array2D<f64> {
        &self.values
    }

    pub fn get(&self, row: usize, column: &ChargedFragType) -> Option<f64> {
        self.values.get(row, self.column_index(column)?)
    }

    pub fn row(&self, row: usize) -> Option<&[f64]> {
        self.values.get_row(row)
    }

    pub fn column_index(&self, column: &ChargedFragType) -> Option<usize> {
        self.columns.iter().position(|x| x == column)
    }

    fn column_indices(&self, columns: &[ChargedFragType]) -> Result<Vec<usize>> {
        columns
            .iter()
            .map(|col| {
                self.column_index(col).ok_or_else(|| {
                    LookupError::UnknownColumn {
                        column: col.to_string(),
                    }
                    .into()
                })
            })
            .collect()
    }

    pub fn column_values(&self, column: &ChargedFragType) -> Result<Vec<f64>> {
        let idx = self.column_indices(std::slice::from_ref(column))?[0];
        Ok(self.values.column(idx).unwrap_or_default())
    }

    fn check_ranges(&self, ranges: &[FragRange]) -> Result<usize> {
        let mut total = 0;
        for range in ranges {
            if range.start > range.end || range.end > self.nrows() {
                return Err(ShapeError::FragmentRangeOutOfBounds {
                    end: range.end,
                    nrows: self.nrows(),
                }
                .into());
            }
            total += range.len();
        }
        Ok(total)
    }

    /// Gathers the rows of several ranges into one block, in range order.
    ///
    /// `columns` selects (and orders) the returned columns, `None`
    /// returns all of them.
    pub fn read_slice(&self, ranges: &[FragRange], columns: Option<&[ChargedFragType]>) -> Result<Array2D<f64>> {
        let col_idxs = match columns {
            Some(cols) => self.column_indices(cols)?,
            None => (0..self.ncols()).collect(),
        };
        let nrows = self.check_ranges(ranges)?;
        let mut values = Vec::with_capacity(nrows * col_idxs.len());
        for range in ranges {
            for row in range.as_range() {
                let row = self.values.get_row(row).unwrap_or_default();
                values.extend(col_idxs.iter().map(|&ci| row[ci]));
            }
        }
        Array2D::from_flat_vector(values, nrows, col_idxs.len())
    }

    /// Scatters a block of rows into several ranges, the inverse of
    /// [`FragmentTable::read_slice`].
    ///
    /// Everything is checked before the first write, a failing call
    /// leaves the table untouched.
    pub fn write_slice(
        &mut self,
        values: &Array2D<f64>,
        ranges: &[FragRange],
        columns: &[ChargedFragType],
    ) -> Result<()> {
        let col_idxs = self.column_indices(columns)?;
        if values.ncols() != col_idxs.len() {
            return Err(ShapeError::ExpectedSlicesSameLength {
                expected: col_idxs.len(),
                other: values.ncols(),
                context: "Columns of the block written into a fragment table".to_string(),
            }
            .into());
        }
        let nrows = self.check_ranges(ranges)?;
        if values.nrows() != nrows {
            return Err(ShapeError::ExpectedSlicesSameLength {
                expected: nrows,
                other: values.nrows(),
                context: "Rows of the block written into a fragment table".to_string(),
            }
            .into());
        }

        let mut src_row = 0;
        for range in ranges {
            for row in range.as_range() {
                let src = &values.values()[src_row * col_idxs.len()..(src_row + 1) * col_idxs.len()];
                for (&ci, &v) in col_idxs.iter().zip(src.iter()) {
                    self.values.insert(row, ci, v);
                }
                src_row += 1;
            }
        }
        Ok(())
    }

    /// The whole table as one row-major slice.
    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        let nrows = self.nrows();
        self.values.rows_slice_mut(0, nrows).unwrap_or_default()
    }

    /// Disjoint mutable row-major slices, one per range and in the order
    /// of `ranges`. Ranges have to be inside the table and must not overlap.
    pub(crate) fn range_slices_mut(&mut self, ranges: &[FragRange]) -> Result<Vec<&mut [f64]>> {
        self.check_ranges(ranges)?;
        let mut order: Vec<usize> = (0..ranges.len()).collect();
        order.sort_by_key(|&i| (ranges[i].start, ranges[i].end));
        for w in order.windows(2) {
            let (prev, next) = (ranges[w[0]], ranges[w[1]]);
            if prev.end > next.start {
                return Err(ShapeError::OverlappingFragmentRanges {
                    end: prev.end,
                    next_start: next.start,
                }
                .into());
            }
        }

        let ncols = self.ncols();
        let mut out: Vec<Option<&mut [f64]>> = (0..ranges.len()).map(|_| None).collect();
        let mut rest = self.values_mut();
        let mut consumed = 0;
        for i in order {
            let range = ranges[i];
            let (_, tail) = std::mem::take(&mut rest).split_at_mut((range.start - consumed) * ncols);
            let (block, tail) = tail.split_at_mut(range.len() * ncols);
            out[i] = Some(block);
            rest = tail;
            consumed = range.end;
        }
        Ok(out.into_iter().flatten().collect())
    }

    fn check_same_columns(&self, other: &FragmentTable, context: &str) -> Result<()> {
        if self.columns != other.columns {
            return Err(ShapeError::ColumnMismatch {
                context: context.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Concatenates batches built independently, shifting the fragment
/// ranges of every batch by the number of rows of the batches before it.
///
/// `other_table_batches` are the companion tables sharing the layout of
/// `table_batches` (intensities, masks ...), one list per kind of table,
/// each with one table per batch.
pub fn concat_precursor_fragment_tables(
    precursor_batches: Vec<PrecursorTable>,
    table_batches: Vec<FragmentTable>,
    other_table_batches: Vec<Vec<FragmentTable>>,
) -> Result<(PrecursorTable, FragmentTable, Vec<FragmentTable>)> {
    if precursor_batches.len() != table_batches.len() {
        return Err(ShapeError::ExpectedSlicesSameLength {
            expected: precursor_batches.len(),
            other: table_batches.len(),
            context: "Precursor and fragment table batches".to_string(),
        }
        .into());
    }
    for others in other_table_batches.iter() {
        if others.len() != table_batches.len() {
            return Err(ShapeError::ExpectedSlicesSameLength {
                expected: table_batches.len(),
                other: others.len(),
                context: "Companion fragment table batches".to_string(),
            }
            .into());
        }
        for (main, other) in table_batches.iter().zip(others.iter()) {
            if main.nrows() != other.nrows() {
                return Err(ShapeError::ExpectedSlicesSameLength {
                    expected: main.nrows(),
                    other: other.nrows(),
                    context: "Rows of a companion fragment table".to_string(),
                }
                .into());
            }
        }
    }
    let Some(first) = table_batches.first() else {
        return Err(ShapeError::EmptyBatchList.into());
    };
    for table in table_batches.iter().skip(1) {
        first.check_same_columns(table, "Fragment table batches")?;
    }
    for others in other_table_batches.iter() {
        for table in others.iter().skip(1) {
            others[0].check_same_columns(table, "Companion fragment table batches")?;
        }
    }

    let mut precursors = Vec::with_capacity(precursor_batches.iter().map(|x| x.len()).sum());
    let mut offset = 0;
    for (batch, table) in precursor_batches.into_iter().zip(table_batches.iter()) {
        let ranges = batch.frag_ranges()?;
        for (mut prec, range) in batch.into_inner().into_iter().zip(ranges) {
            prec.frag_range = Some(range.shifted(offset));
            precursors.push(prec);
        }
        offset += table.nrows();
    }

    let mut table_iter = table_batches.into_iter();
    let mut out_table = table_iter.next().ok_or(ShapeError::EmptyBatchList)?;
    for table in table_iter {
        out_table.values.extend_rows(&table.values)?;
    }

    let mut out_others = Vec::with_capacity(other_table_batches.len());
    for others in other_table_batches {
        let mut iter = others.into_iter();
        let mut out = iter.next().ok_or(ShapeError::EmptyBatchList)?;
        for table in iter {
            out.values.extend_rows(&table.values)?;
        }
        out_others.push(out);
    }

    Ok((
        PrecursorTable::from_validated(precursors),
        out_table,
        out_others,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragments::get_charged_frag_types;

    #[test]
    fn test_allocate() {
        let types = get_charged_frag_types(&["b", "y"], 1).unwrap();
        let (table, ranges) = FragmentTable::allocate(&[3, 5, 2], &types).unwrap();
        assert_eq!(table.nrows(), 2 + 4 + 1);
        assert_eq!(table.ncols(), 2);
        assert_eq!(
            ranges,
            vec![FragRange::new(0, 2), FragRange::new(2, 6), FragRange::new(6, 7)]
        );
        assert!(FragmentTable::allocate(&[3, 0], &types).is_err());

        let like = FragmentTable::allocate_like(&table, &types[..1]).unwrap();
        assert_eq!(like.nrows(), 7);
        assert_eq!(like.columns(), &types[..1]);
    }

    #[test]
    fn test_read_write_slice() {
        let types = get_charged_frag_types(&["b", "y"], 1).unwrap();
        let mut table = FragmentTable::zeros(6, &types).unwrap();
        let ranges = [FragRange::new(4, 6), FragRange::new(0, 1)];
        let block = Array2D::new(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        table.write_slice(&block, &ranges, &types).unwrap();
        assert_eq!(table.row(4), Some(&[1.0, 2.0][..]));
        assert_eq!(table.row(0), Some(&[5.0, 6.0][..]));
        assert_eq!(table.row(1), Some(&[0.0, 0.0][..]));

        assert_eq!(table.read_slice(&ranges, None).unwrap(), block);
        let y_only = table.read_slice(&ranges, Some(&types[1..])).unwrap();
        assert_eq!(y_only.values(), &[2.0, 4.0, 6.0]);

        // Reversed column order scatters to the right columns
        let swapped = [types[1], types[0]];
        let block = Array2D::new(vec![vec![9.0, 8.0]]).unwrap();
        table.write_slice(&block, &[FragRange::new(2, 3)], &swapped).unwrap();
        assert_eq!(table.row(2), Some(&[8.0, 9.0][..]));
    }

    #[test]
    fn test_write_slice_errors_leave_table_untouched() {
        let types = get_charged_frag_types(&["b"], 1).unwrap();
        let mut table = FragmentTable::zeros(3, &types).unwrap();
        let before = table.clone();

        let block = Array2D::new(vec![vec![1.0], vec![2.0]]).unwrap();
        assert!(table.write_slice(&block, &[FragRange::new(2, 4)], &types).is_err());
        assert!(table.write_slice(&block, &[FragRange::new(0, 1)], &types).is_err());
        let missing = get_charged_frag_types(&["y"], 1).unwrap();
        assert!(matches!(
            table.write_slice(&block, &[FragRange::new(0, 2)], &missing),
            Err(crate::errors::PepFragError::Lookup(LookupError::UnknownColumn { .. }))
        ));
        assert_eq!(table, before);
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let types = get_charged_frag_types(&["b", "b"], 1).unwrap();
        assert!(matches!(
            FragmentTable::zeros(3, &types),
            Err(crate::errors::PepFragError::Shape(ShapeError::DuplicateColumn { .. }))
        ));
        assert!(FragmentTable::allocate(&[4], &types).is_err());

        let unique = get_charged_frag_types(&["b", "y"], 1).unwrap();
        let (table, _) = FragmentTable::allocate(&[4], &unique).unwrap();
        assert!(FragmentTable::allocate_like(&table, &types).is_err());
    }

    #[test]
    fn test_range_slices_mut() {
        let types = get_charged_frag_types(&["b", "y"], 1).unwrap();
        let mut table = FragmentTable::zeros(6, &types).unwrap();
        let ranges = [FragRange::new(3, 6), FragRange::new(0, 2), FragRange::new(2, 2)];
        {
            let slices = table.range_slices_mut(&ranges).unwrap();
            assert_eq!(slices.iter().map(|x| x.len()).collect::<Vec<_>>(), vec![6, 4, 0]);
            for (i, slice) in slices.into_iter().enumerate() {
                slice.fill(i as f64 + 1.0);
            }
        }
        assert_eq!(table.row(0), Some(&[2.0, 2.0][..]));
        assert_eq!(table.row(2), Some(&[0.0, 0.0][..]));
        assert_eq!(table.row(5), Some(&[1.0, 1.0][..]));

        let overlapping = [FragRange::new(0, 3), FragRange::new(2, 4)];
        assert!(matches!(
            table.range_slices_mut(&overlapping),
            Err(crate::errors::PepFragError::Shape(
                ShapeError::OverlappingFragmentRanges { end: 3, next_start: 2 }
            ))
        ));
    }
}
