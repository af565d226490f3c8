use crate::errors::{
    Result,
    ShapeError,
};

/// Simple row-major 2D array.
///
/// `values` is a flattened array of values
/// `major_dim` is the number of values in each row
/// `minor_dim` is the number of rows
///
/// Note on memory layout:
///
/// Values that belong to the same row are adjacent
/// in memory, so a contiguous range of rows is a contiguous
/// slice of `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct Array2D<T: Clone + Copy> {
    pub(super) values: Vec<T>,
    pub(super) major_dim: usize,
    pub(super) minor_dim: usize,
}

impl<T: Clone + Copy + Default> Array2D<T> {
    pub fn new<S: AsRef<[T]>, C: AsRef<[S]>>(values: C) -> Result<Array2D<T>> {
        let nrows = values.as_ref().len();
        let ncols = values.as_ref().first().map(|x| x.as_ref().len()).unwrap_or(0);

        let values: Vec<T> = values
            .as_ref()
            .iter()
            .flat_map(|x| x.as_ref())
            .cloned()
            .collect();

        if values.len() != nrows * ncols {
            return Err(ShapeError::ExpectedSlicesSameLength {
                expected: nrows * ncols,
                other: values.len(),
                context: "Rows of a 2D array".to_string(),
            }
            .into());
        }

        Ok(Array2D {
            values,
            major_dim: ncols,
            minor_dim: nrows,
        })
    }

    /// Builds the array from its columns.
    ///
    /// `nrows` is passed explicitly so that arrays with no columns
    /// still know how many rows they have.
    pub fn new_transposed<S: AsRef<[T]>, C: AsRef<[S]>>(
        columns: C,
        nrows: usize,
    ) -> Result<Array2D<T>> {
        let ncols = columns.as_ref().len();
        let mut out_values = vec![T::default(); nrows * ncols];

        for (ci, col) in columns.as_ref().iter().enumerate() {
            if col.as_ref().len() != nrows {
                return Err(ShapeError::ExpectedSlicesSameLength {
                    expected: nrows,
                    other: col.as_ref().len(),
                    context: format!("Column {} of a 2D array", ci),
                }
                .into());
            }
            for (ri, val) in col.as_ref().iter().enumerate() {
                out_values[ri * ncols + ci] = *val;
            }
        }

        Ok(Array2D {
            values: out_values,
            major_dim: ncols,
            minor_dim: nrows,
        })
    }

    pub fn from_flat_vector(values: Vec<T>, nrows: usize, ncols: usize) -> Result<Array2D<T>> {
        if values.len() != nrows * ncols {
            return Err(ShapeError::ExpectedSlicesSameLength {
                expected: nrows * ncols,
                other: values.len(),
                context: "Flat vector of a 2D array".to_string(),
            }
            .into());
        }
        Ok(Array2D {
            values,
            major_dim: ncols,
            minor_dim: nrows,
        })
    }

    pub fn new_filled(nrows: usize, ncols: usize, value: T) -> Array2D<T> {
        Array2D {
            values: vec![value; nrows * ncols],
            major_dim: ncols,
            minor_dim: nrows,
        }
    }

    /// Apply a function to each row of the array
    ///
    /// Example:
    /// ```
    /// use pepfrag::models::Array2D;
    /// let array = Array2D::new(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
    /// let result: Vec<u32> = array.row_apply(|x| x.iter().sum()).collect();
    /// assert_eq!(result, vec![6, 15]);
    ///
    /// let array = Array2D::new_transposed(vec![vec![1, 2, 3], vec![4, 5, 6]], 3).unwrap();
    /// let result: Vec<u32> = array.row_apply(|x| x.iter().sum()).collect();
    /// assert_eq!(result, vec![5, 7, 9]);
    /// ```
    pub fn row_apply<'a: 'b, 'b, W, F: FnMut(&[T]) -> W + 'b>(
        &'a self,
        f: F,
    ) -> impl Iterator<Item = W> + 'b {
        // `chunks` panics on a zero chunk size, arrays without columns
        // yield one empty slice per row instead.
        let ncols = self.major_dim;
        let nrows = self.minor_dim;
        let values = &self.values;
        (0..nrows)
            .map(move |i| &values[i * ncols..(i + 1) * ncols])
            .map(f)
    }

    pub fn insert(&mut self, row_idx: usize, col_idx: usize, value: T) {
        let idx = row_idx * self.major_dim + col_idx;
        self.values[idx] = value;
    }

    pub fn get(&self, row_idx: usize, col_idx: usize) -> Option<T> {
        if row_idx >= self.minor_dim || col_idx >= self.major_dim {
            return None;
        }
        Some(self.values[row_idx * self.major_dim + col_idx])
    }

    pub fn get_row(&self, index: usize) -> Option<&[T]> {
        if index >= self.minor_dim {
            return None;
        }
        let start = index * self.major_dim;
        Some(&self.values[start..start + self.major_dim])
    }

    /// Contiguous block of rows `[start, end)` as a flat slice.
    pub fn rows_slice_mut(&mut self, start: usize, end: usize) -> Option<&mut [T]> {
        if start > end || end > self.minor_dim {
            return None;
        }
        Some(&mut self.values[start * self.major_dim..end * self.major_dim])
    }

    /// One column, copied out.
    pub fn column(&self, col_idx: usize) -> Option<Vec<T>> {
        if col_idx >= self.major_dim {
            return None;
        }
        Some(
            (0..self.minor_dim)
                .map(|r| self.values[r * self.major_dim + col_idx])
                .collect(),
        )
    }

    /// Appends the rows of `other` below the rows of `self`.
    pub fn extend_rows(&mut self, other: &Array2D<T>) -> Result<()> {
        if other.major_dim != self.major_dim {
            return Err(ShapeError::ExpectedSlicesSameLength {
                expected: self.major_dim,
                other: other.major_dim,
                context: "Number of columns when stacking arrays".to_string(),
            }
            .into());
        }
        self.values.extend_from_slice(&other.values);
        self.minor_dim += other.minor_dim;
        Ok(())
    }

    pub fn nrows(&self) -> usize {
        self.minor_dim
    }

    pub fn ncols(&self) -> usize {
        self.major_dim
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }
}
