// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use log::*;

use crate::{errors::RecResult, sparse::CSRMatrix};

/// Transpose a CSR matrix, carrying its values.
///
/// Rows of the result are sorted by column, since the source rows are
/// scanned in order.
pub fn transpose_csr(csr: &CSRMatrix) -> RecResult<CSRMatrix> {
    let nnz = csr.nnz();
    debug!(
        "transposing {}x{} matrix with {} entries",
        csr.n_rows, csr.n_cols, nnz
    );

    // step 1: count column values
    let mut lengths = vec![0usize; csr.n_cols];
    for c in csr.col_inds.values().iter() {
        lengths[*c as usize] += 1;
    }

    // step 2: convert column counts into insertion positions
    let mut row_ips = Vec::with_capacity(csr.n_cols);
    let mut pos = 0;
    for len in lengths.iter() {
        row_ips.push(pos);
        pos += len;
    }

    // step 3: scatter row indices and values into their new rows
    let mut col_inds = vec![0i32; nnz];
    let mut values = vec![0.0f32; nnz];
    for row in 0..csr.n_rows {
        for (c, v) in csr.row_entries(row) {
            let pos = row_ips[c];
            col_inds[pos] = row as i32;
            values[pos] = v;
            row_ips[c] += 1;
        }
    }

    CSRMatrix::from_parts(csr.n_rows, lengths, col_inds, values)
}
