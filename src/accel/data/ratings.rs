// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Rating event logs.
use std::hash::Hash;

use arrow::array::{Float64Array, Int32Array, RecordBatch, TimestampSecondArray};
use chrono::{DateTime, Utc};
use log::*;
use rustc_hash::FxHashMap;

use crate::{
    errors::{RecError, RecResult},
    sparse::{COOMatrixBuilder, CSRMatrix},
    types::{epoch_seconds, float_values, required_column, ArrowId},
};

use super::IdIndex;

/// A single rating event.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingEvent<Id> {
    pub user: Id,
    pub item: Id,
    pub rating: f64,
    /// Unix-epoch seconds.
    pub timestamp: i64,
}

impl<Id> RatingEvent<Id> {
    pub fn new(user: Id, item: Id, rating: f64, timestamp: i64) -> Self {
        RatingEvent {
            user,
            item,
            rating,
            timestamp,
        }
    }
}

/// Convert Unix-epoch seconds to an instant.
pub fn epoch_instant(secs: i64) -> RecResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| RecError::DataIntegrity(format!("timestamp {} out of range", secs)))
}

/// A log of rating events with users and items resolved to dense indices.
///
/// The log keeps every event (including repeated user-item pairs) in input
/// order; it is immutable once built.
pub struct RatingLog<Id> {
    users: IdIndex<Id>,
    items: IdIndex<Id>,
    user_nums: Int32Array,
    item_nums: Int32Array,
    ratings: Float64Array,
    timestamps: TimestampSecondArray,
    /// Position of the first event for each (user, item) pair.
    first_events: FxHashMap<(u32, u32), usize>,
    item_means: Vec<f64>,
}

impl<Id: Clone + Eq + Hash> RatingLog<Id> {
    /// Build a log from clean rating events.
    pub fn from_events<I: IntoIterator<Item = RatingEvent<Id>>>(events: I) -> RecResult<Self> {
        let events: Vec<RatingEvent<Id>> = events.into_iter().collect();
        let users = IdIndex::from_ids(events.iter().map(|e| e.user.clone()));
        let items = IdIndex::from_ids(events.iter().map(|e| e.item.clone()));
        debug!(
            "indexed {} events with {} users and {} items",
            events.len(),
            users.size(),
            items.size()
        );

        let mut user_nums = Vec::with_capacity(events.len());
        let mut item_nums = Vec::with_capacity(events.len());
        let mut ratings = Vec::with_capacity(events.len());
        let mut timestamps = Vec::with_capacity(events.len());
        let mut first_events = FxHashMap::default();
        let mut sums = vec![0.0f64; items.size()];
        let mut counts = vec![0usize; items.size()];

        for (pos, ev) in events.iter().enumerate() {
            epoch_instant(ev.timestamp)?;
            let u = lookup(&users, &ev.user)?;
            let i = lookup(&items, &ev.item)?;
            user_nums.push(u as i32);
            item_nums.push(i as i32);
            ratings.push(ev.rating);
            timestamps.push(ev.timestamp);
            first_events.entry((u, i)).or_insert(pos);
            sums[i as usize] += ev.rating;
            counts[i as usize] += 1;
        }

        let item_means = sums
            .into_iter()
            .zip(counts)
            .map(|(s, n)| s / n as f64)
            .collect();

        Ok(RatingLog {
            users,
            items,
            user_nums: Int32Array::from(user_nums),
            item_nums: Int32Array::from(item_nums),
            ratings: Float64Array::from(ratings),
            timestamps: TimestampSecondArray::from(timestamps),
            first_events,
            item_means,
        })
    }

    /// Get the user ID index.
    pub fn users(&self) -> &IdIndex<Id> {
        &self.users
    }

    /// Get the item ID index.
    pub fn items(&self) -> &IdIndex<Id> {
        &self.items
    }

    /// Get the number of events in the log.
    pub fn len(&self) -> usize {
        self.ratings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ratings.is_empty()
    }

    /// Get the instant at which a user interacted with an item.
    ///
    /// If the pair was rated more than once, this is the first event's time.
    pub fn interaction_time(&self, user: u32, item: u32) -> RecResult<DateTime<Utc>> {
        let pos = self.first_events.get(&(user, item)).ok_or_else(|| {
            RecError::DataIntegrity(format!("no event for user {} and item {}", user, item))
        })?;
        epoch_instant(self.timestamps.value(*pos))
    }

    /// Get the mean of all ratings for an item, across all users.
    pub fn item_mean(&self, item: u32) -> Option<f64> {
        self.item_means.get(item as usize).copied()
    }

    /// Build the user-item rating matrix.
    ///
    /// Repeated user-item pairs take the rating of the last event.  Matrix
    /// values are single-precision; item means keep the full ratings.
    pub fn rating_matrix(&self) -> RecResult<CSRMatrix> {
        let mut bld = COOMatrixBuilder::with_capacity(self.len());
        for pos in 0..self.len() {
            bld.add_entry(
                self.user_nums.value(pos),
                self.item_nums.value(pos),
                self.ratings.value(pos) as f32,
            );
        }
        let matrix = bld.finish().to_csr(self.users.size(), self.items.size())?;
        debug!(
            "built {}x{} rating matrix with {} entries",
            matrix.n_rows,
            matrix.n_cols,
            matrix.nnz()
        );
        Ok(matrix)
    }
}

impl<Id: ArrowId> RatingLog<Id> {
    /// Build a log from an Arrow record batch.
    ///
    /// The batch needs `user`, `item`, `rating` and `timestamp` columns.
    /// Rows with a missing value in any of them (including NaN ratings) are
    /// dropped.
    pub fn from_record_batch(batch: &RecordBatch) -> RecResult<Self> {
        let users = Id::extract_ids("user", required_column(batch, "user")?)?;
        let items = Id::extract_ids("item", required_column(batch, "item")?)?;
        let ratings = float_values("rating", required_column(batch, "rating")?)?;
        let times = epoch_seconds("timestamp", required_column(batch, "timestamp")?)?;

        let events: Vec<RatingEvent<Id>> = users
            .into_iter()
            .zip(items)
            .zip(ratings)
            .zip(times)
            .filter_map(|(((u, i), r), t)| match (u, i, r, t) {
                (Some(u), Some(i), Some(r), Some(t)) if !r.is_nan() => {
                    Some(RatingEvent::new(u, i, r, t))
                }
                _ => None,
            })
            .collect();

        let dropped = batch.num_rows() - events.len();
        if dropped > 0 {
            debug!("dropped {} incomplete rating rows", dropped);
        }

        Self::from_events(events)
    }
}

fn lookup<Id: Clone + Eq + Hash>(index: &IdIndex<Id>, id: &Id) -> RecResult<u32> {
    index
        .to_index(id)
        .ok_or_else(|| RecError::DataIntegrity("event identifier missing from index".into()))
}
