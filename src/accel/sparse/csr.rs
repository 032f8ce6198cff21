// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use arrow::{
    array::{Array, ArrayRef, Float32Array, Int32Array, LargeListArray, StructArray},
    buffer::OffsetBuffer,
};
use arrow_schema::{DataType, Field, Fields};

use crate::errors::{RecError, RecResult};

use super::SparseIndexType;

/// A compressed sparse row matrix of `f32` values.
///
/// Rows are stored as an Arrow large list of `{index, value}` structs; the
/// index field carries a [SparseIndexType] recording the column count.
#[derive(Debug, Clone)]
pub struct CSRMatrix {
    pub n_rows: usize,
    pub n_cols: usize,
    array: LargeListArray,
    pub col_inds: Int32Array,
    pub values: Float32Array,
}

/// Get the Arrow fields for sparse row entries of a given dimension.
fn entry_fields(n_cols: usize) -> Fields {
    Fields::from(vec![
        Field::new("index", DataType::Int32, false)
            .with_extension_type(SparseIndexType::create(n_cols)),
        Field::new("value", DataType::Float32, false),
    ])
}

impl CSRMatrix {
    /// Assemble a matrix from row lengths and concatenated row contents.
    ///
    /// Column indices must lie in `0..n_cols`.
    pub fn from_parts(
        n_cols: usize,
        lengths: Vec<usize>,
        col_inds: Vec<i32>,
        values: Vec<f32>,
    ) -> RecResult<CSRMatrix> {
        let nnz: usize = lengths.iter().sum();
        if col_inds.len() != nnz || values.len() != nnz {
            return Err(RecError::DataIntegrity(format!(
                "row lengths total {} but have {} columns and {} values",
                nnz,
                col_inds.len(),
                values.len()
            )));
        }
        if let Some(bad) = col_inds.iter().find(|c| **c < 0 || **c as usize >= n_cols) {
            return Err(RecError::DataIntegrity(format!(
                "column index {} out of bounds for {} columns",
                bad, n_cols
            )));
        }

        let n_rows = lengths.len();
        let fields = entry_fields(n_cols);
        let col_inds = Int32Array::from(col_inds);
        let values = Float32Array::from(values);
        let entries = StructArray::try_new(
            fields.clone(),
            vec![Arc::new(col_inds.clone()), Arc::new(values.clone())],
            None,
        )?;
        let list_field = Field::new("rows", DataType::Struct(fields), false);
        let array = LargeListArray::try_new(
            Arc::new(list_field),
            OffsetBuffer::from_lengths(lengths),
            Arc::new(entries),
            None,
        )?;

        Ok(CSRMatrix {
            n_rows,
            n_cols,
            array,
            col_inds,
            values,
        })
    }

    /// Get the "length" (number of rows) in the matrix.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Get the number of observed values in the matrix.
    pub fn nnz(&self) -> usize {
        self.col_inds.len()
    }

    /// Get the row pointers as a slice.
    pub fn row_ptrs(&self) -> &[i64] {
        self.array.value_offsets()
    }

    /// Get the extent in the underlying arrays for a row in the matrix.
    pub fn extent(&self, row: usize) -> (usize, usize) {
        let off = self.row_ptrs();
        (off[row] as usize, off[row + 1] as usize)
    }

    /// Get the column indices for a row in the matrix.
    pub fn row_cols(&self, row: usize) -> &[i32] {
        let (start, end) = self.extent(row);
        &self.col_inds.values()[start..end]
    }

    /// Get the values for a row in the matrix.
    pub fn row_vals(&self, row: usize) -> &[f32] {
        let (start, end) = self.extent(row);
        &self.values.values()[start..end]
    }

    /// Iterate over the `(column, value)` entries of a row.
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.row_cols(row)
            .iter()
            .zip(self.row_vals(row))
            .map(|(c, v)| (*c as usize, *v))
    }

    /// Get the underlying Arrow array of rows.
    pub fn to_arrow(&self) -> ArrayRef {
        Arc::new(self.array.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::AsArray;

    fn sample() -> CSRMatrix {
        // [[1, 0, 2], [0, 0, 0], [0, 3, 0]]
        CSRMatrix::from_parts(3, vec![2, 0, 1], vec![0, 2, 1], vec![1.0, 2.0, 3.0]).unwrap()
    }

    #[test]
    fn test_shape() {
        let m = sample();
        assert_eq!(m.n_rows, 3);
        assert_eq!(m.n_cols, 3);
        assert_eq!(m.len(), 3);
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.row_ptrs(), &[0, 2, 2, 3]);
    }

    #[test]
    fn test_rows() {
        let m = sample();
        assert_eq!(m.row_cols(0), &[0, 2]);
        assert_eq!(m.row_vals(0), &[1.0, 2.0]);
        assert!(m.row_cols(1).is_empty());
        let row: Vec<_> = m.row_entries(2).collect();
        assert_eq!(row, vec![(1, 3.0)]);
    }

    #[test]
    fn test_bad_column() {
        let res = CSRMatrix::from_parts(2, vec![1], vec![2], vec![1.0]);
        assert!(matches!(res, Err(RecError::DataIntegrity(_))));
    }

    #[test]
    fn test_bad_lengths() {
        let res = CSRMatrix::from_parts(2, vec![2], vec![0], vec![1.0]);
        assert!(matches!(res, Err(RecError::DataIntegrity(_))));
    }

    #[test]
    fn test_arrow_dimension() {
        let m = sample();
        let arr = m.to_arrow();
        let list = arr.as_list::<i64>();
        assert_eq!(list.len(), 3);
        let fields = match list.value_type() {
            DataType::Struct(fs) => fs,
            t => panic!("unexpected type {}", t),
        };
        let idx: SparseIndexType = fields[0].try_extension_type().unwrap();
        assert_eq!(idx.dimension(), 3);
    }
}
