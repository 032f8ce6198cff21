// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Accumulator for recommendation candidates.
use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;

/// Aggregated evidence for one candidate item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Sum of the distances contributed by each source item.
    pub score: f32,
    /// Earliest interaction time among the contributing source items.
    pub timestamp: DateTime<Utc>,
}

/// Accumulate candidate scores, keyed by item number.
///
/// Slots are allocated for every item; `used` records items in the order they
/// were first seen.
pub struct CandidateAccumulator {
    slots: Vec<Option<Candidate>>,
    used: Vec<u32>,
}

impl CandidateAccumulator {
    pub fn new(n_items: usize) -> Self {
        CandidateAccumulator {
            slots: vec![None; n_items],
            used: Vec::new(),
        }
    }

    /// Add a neighbor contribution for an item.
    pub fn add(&mut self, item: u32, distance: f32, timestamp: DateTime<Utc>) {
        let i = item as usize;
        match self.slots[i].as_mut() {
            Some(c) => {
                c.score += distance;
                c.timestamp = c.timestamp.min(timestamp);
            }
            None => {
                self.slots[i] = Some(Candidate {
                    score: distance,
                    timestamp,
                });
                self.used.push(item);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }

    pub fn get(&self, item: u32) -> Option<&Candidate> {
        self.slots.get(item as usize).and_then(|c| c.as_ref())
    }

    /// Rank candidates by descending score, then descending timestamp.
    ///
    /// Candidates equal on both keys stay in first-seen order.
    pub fn into_ranked(self) -> Vec<(u32, Candidate)> {
        let slots = self.slots;
        let mut ranked: Vec<(u32, Candidate)> = self
            .used
            .into_iter()
            .filter_map(|i| slots[i as usize].map(|c| (i, c)))
            .collect();
        ranked.sort_by_key(|(_i, c)| Reverse((OrderedFloat(c.score), c.timestamp)));
        ranked
    }
}
