// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Sparse coordinate arrays.

use arrow::array::{Array, Float32Array, Float32Builder, Int32Array, Int32Builder};
use log::*;

use crate::errors::{RecError, RecResult};

use super::CSRMatrix;

/// A sparse matrix in coordinate form, entries in insertion order.
pub struct COOMatrix {
    pub row: Int32Array,
    pub col: Int32Array,
    pub val: Float32Array,
}

pub struct COOMatrixBuilder {
    row: Int32Builder,
    col: Int32Builder,
    val: Float32Builder,
}

impl COOMatrixBuilder {
    /// Initialize a builder with a specified capacity.
    pub fn with_capacity(cap: usize) -> Self {
        COOMatrixBuilder {
            row: Int32Builder::with_capacity(cap),
            col: Int32Builder::with_capacity(cap),
            val: Float32Builder::with_capacity(cap),
        }
    }

    pub fn add_entry(&mut self, row: i32, col: i32, val: f32) {
        self.row.append_value(row);
        self.col.append_value(col);
        self.val.append_value(val);
    }

    /// Build the final COO matrix from this builder.
    pub fn finish(mut self) -> COOMatrix {
        COOMatrix {
            row: self.row.finish(),
            col: self.col.finish(),
            val: self.val.finish(),
        }
    }
}

impl COOMatrix {
    pub fn len(&self) -> usize {
        self.row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }

    /// Compress into a CSR matrix of the given shape.
    ///
    /// Rows are sorted by column.  When a coordinate appears more than once,
    /// the entry added last is kept.
    pub fn to_csr(&self, n_rows: usize, n_cols: usize) -> RecResult<CSRMatrix> {
        let rows = self.row.values();
        let cols = self.col.values();
        let vals = self.val.values();

        for (r, c) in rows.iter().zip(cols.iter()) {
            if *r < 0 || *r as usize >= n_rows || *c < 0 || *c as usize >= n_cols {
                return Err(RecError::DataIntegrity(format!(
                    "entry ({}, {}) outside {}x{} matrix",
                    r, c, n_rows, n_cols
                )));
            }
        }

        // stable sort, so duplicates stay in insertion order
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by_key(|i| (rows[*i], cols[*i]));

        let mut lengths = vec![0usize; n_rows];
        let mut col_inds: Vec<i32> = Vec::with_capacity(order.len());
        let mut values: Vec<f32> = Vec::with_capacity(order.len());
        let mut last: Option<(i32, i32)> = None;
        let mut n_dupes = 0;
        for i in order {
            let coord = (rows[i], cols[i]);
            if last == Some(coord) {
                // replace the earlier entry
                if let Some(v) = values.last_mut() {
                    *v = vals[i];
                }
                n_dupes += 1;
            } else {
                lengths[coord.0 as usize] += 1;
                col_inds.push(coord.1);
                values.push(vals[i]);
                last = Some(coord);
            }
        }
        if n_dupes > 0 {
            debug!("replaced {} duplicate matrix entries", n_dupes);
        }

        CSRMatrix::from_parts(n_cols, lengths, col_inds, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_rows() {
        let mut bld = COOMatrixBuilder::with_capacity(4);
        bld.add_entry(1, 2, 4.0);
        bld.add_entry(0, 1, 2.0);
        bld.add_entry(1, 0, 3.0);
        bld.add_entry(0, 0, 1.0);
        let csr = bld.finish().to_csr(2, 3).unwrap();
        assert_eq!(csr.row_cols(0), &[0, 1]);
        assert_eq!(csr.row_vals(0), &[1.0, 2.0]);
        assert_eq!(csr.row_cols(1), &[0, 2]);
        assert_eq!(csr.row_vals(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let mut bld = COOMatrixBuilder::with_capacity(3);
        bld.add_entry(0, 1, 5.0);
        bld.add_entry(0, 0, 1.0);
        bld.add_entry(0, 1, 2.0);
        let csr = bld.finish().to_csr(1, 2).unwrap();
        assert_eq!(csr.nnz(), 2);
        assert_eq!(csr.row_cols(0), &[0, 1]);
        assert_eq!(csr.row_vals(0), &[1.0, 2.0]);
    }

    #[test]
    fn test_builder_len() {
        let bld = COOMatrixBuilder::with_capacity(2);
        let coo = bld.finish();
        assert!(coo.is_empty());
        assert_eq!(coo.to_csr(2, 2).unwrap().nnz(), 0);

        let mut bld = COOMatrixBuilder::with_capacity(2);
        bld.add_entry(0, 0, 1.0);
        bld.add_entry(0, 0, 2.0);
        let coo = bld.finish();
        assert!(!coo.is_empty());
        assert_eq!(coo.len(), 2);
    }

    #[test]
    fn test_empty_rows() {
        let mut bld = COOMatrixBuilder::with_capacity(1);
        bld.add_entry(2, 0, 1.0);
        let csr = bld.finish().to_csr(4, 1).unwrap();
        assert_eq!(csr.len(), 4);
        assert_eq!(csr.row_ptrs(), &[0, 0, 0, 1, 1]);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut bld = COOMatrixBuilder::with_capacity(1);
        bld.add_entry(0, 3, 1.0);
        let res = bld.finish().to_csr(1, 3);
        assert!(matches!(res, Err(RecError::DataIntegrity(_))));

        let mut bld = COOMatrixBuilder::with_capacity(1);
        bld.add_entry(-1, 0, 1.0);
        let res = bld.finish().to_csr(1, 3);
        assert!(matches!(res, Err(RecError::DataIntegrity(_))));
    }
}
