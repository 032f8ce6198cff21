// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Exact item-item nearest-neighbor search with cosine distance.
use log::*;
use ndarray::Array1;
use ordered_float::OrderedFloat;
use rayon::prelude::*;

use crate::{
    data::transpose_csr,
    errors::{RecError, RecResult},
    sparse::CSRMatrix,
};

/// Brute-force nearest-neighbor index over the items of a rating matrix.
///
/// Distances are cosine distances in `[0, 2]`.  Rows with no entries have
/// distance 1 to every other row.
#[derive(Default)]
pub struct ItemNeighborIndex {
    fitted: Option<FittedIndex>,
}

struct FittedIndex {
    /// Item-user matrix.
    items: CSRMatrix,
    /// User-item matrix, for walking co-rated items.  Shares its buffers
    /// with the matrix the index was fit on.
    users: CSRMatrix,
    norms: Array1<f32>,
}

fn neighbor_key(nbr: &(u32, f32)) -> (OrderedFloat<f32>, u32) {
    (OrderedFloat(nbr.1), nbr.0)
}

impl ItemNeighborIndex {
    /// Create an unfitted index.
    pub fn new() -> Self {
        ItemNeighborIndex { fitted: None }
    }

    /// Fit the index over the items (columns) of a user-item matrix,
    /// replacing any previous fit.
    pub fn fit(&mut self, ratings: &CSRMatrix) -> RecResult<()> {
        debug!(
            "fitting neighbor index over {} items with {} users",
            ratings.n_cols, ratings.n_rows
        );
        let items = transpose_csr(ratings)?;
        let norms: Vec<f32> = (0..items.n_rows)
            .into_par_iter()
            .map(|i| items.row_vals(i).iter().map(|v| v * v).sum::<f32>().sqrt())
            .collect();

        self.fitted = Some(FittedIndex {
            items,
            // Arrow arrays are reference-counted, so this does not copy entries
            users: ratings.clone(),
            norms: Array1::from(norms),
        });
        Ok(())
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Get the number of indexed items (0 if unfitted).
    pub fn n_items(&self) -> usize {
        self.fitted.as_ref().map(|f| f.items.n_rows).unwrap_or(0)
    }

    fn fitted(&self) -> RecResult<&FittedIndex> {
        self.fitted.as_ref().ok_or(RecError::NotFitted)
    }

    /// Compute the cosine distance from an item to every indexed item,
    /// itself included.
    pub fn distances(&self, item: u32) -> RecResult<Array1<f32>> {
        let fit = self.fitted()?;
        let n = fit.items.n_rows;
        let row = item as usize;
        if row >= n {
            return Err(RecError::DataIntegrity(format!(
                "item {} outside index of {} items",
                item, n
            )));
        }

        // accumulate inner products through the users who rated the item
        let mut dots: Array1<f32> = Array1::zeros(n);
        for (u, r) in fit.items.row_entries(row) {
            for (j, s) in fit.users.row_entries(u) {
                dots[j] += r * s;
            }
        }

        let qn = fit.norms[row];
        Ok(Array1::from_shape_fn(n, |j| {
            let denom = qn * fit.norms[j];
            if denom > 0.0 {
                (1.0 - dots[j] / denom).clamp(0.0, 2.0)
            } else {
                1.0
            }
        }))
    }

    /// Find the `k` nearest neighbors of an item, excluding the item itself.
    ///
    /// Results are sorted by increasing distance, with ties broken by item
    /// index.  Requests for more neighbors than exist are capped.
    pub fn query(&self, item: u32, k: usize) -> RecResult<Vec<(u32, f32)>> {
        if k == 0 {
            return Err(RecError::InvalidArgument(
                "neighbor count must be positive".into(),
            ));
        }
        let dists = self.distances(item)?;

        let mut nbrs: Vec<(u32, f32)> = dists
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != item as usize)
            .map(|(j, d)| (j as u32, *d))
            .collect();

        let k = k.min(nbrs.len());
        if k < nbrs.len() {
            nbrs.select_nth_unstable_by_key(k, neighbor_key);
            nbrs.truncate(k);
        }
        nbrs.sort_unstable_by_key(neighbor_key);
        trace!("item {}: found {} neighbors", item, nbrs.len());

        Ok(nbrs)
    }
}
