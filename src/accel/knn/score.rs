// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Recency-aware item-kNN recommendation.
use std::fmt::Debug;
use std::hash::Hash;

use arrow::array::RecordBatch;
use chrono::{DateTime, Utc};
use log::*;

use crate::{
    config::RecommendOptions,
    data::{IdIndex, RatingEvent, RatingLog},
    errors::{RecError, RecResult},
    ok_or_err,
    sparse::CSRMatrix,
    types::ArrowId,
};

use super::{
    accum::{Candidate, CandidateAccumulator},
    ItemNeighborIndex,
};

/// A recommended item with its mean rating.
pub type Recommendation<Id> = (Id, f64);

/// Item-kNN recommender over a fixed rating log.
///
/// The log, rating matrix and neighbor index are built once and never
/// modified, so a recommender can be shared between threads.
pub struct Recommender<Id> {
    log: RatingLog<Id>,
    matrix: CSRMatrix,
    index: ItemNeighborIndex,
}

impl<Id: Clone + Eq + Hash + Debug> Recommender<Id> {
    /// Train a recommender from rating events.
    pub fn train<I: IntoIterator<Item = RatingEvent<Id>>>(events: I) -> RecResult<Self> {
        Self::from_log(RatingLog::from_events(events)?)
    }

    /// Train a recommender from an indexed rating log.
    pub fn from_log(log: RatingLog<Id>) -> RecResult<Self> {
        let matrix = log.rating_matrix()?;
        let mut index = ItemNeighborIndex::new();
        index.fit(&matrix)?;
        Ok(Recommender { log, matrix, index })
    }

    pub fn users(&self) -> &IdIndex<Id> {
        self.log.users()
    }

    pub fn items(&self) -> &IdIndex<Id> {
        self.log.items()
    }

    /// Get the user-item rating matrix.
    pub fn matrix(&self) -> &CSRMatrix {
        &self.matrix
    }

    /// Get the item neighbor index.
    pub fn index(&self) -> &ItemNeighborIndex {
        &self.index
    }

    /// Compute the ranked candidates for a user, before recency filtering.
    ///
    /// Each item the user rated positively contributes its nearest
    /// neighbors; a neighbor's score is the sum of its distances to those
    /// items, and its timestamp the earliest of the user's interactions with
    /// them.  The result is sorted by score, then timestamp (both
    /// descending), and truncated to the requested count.
    pub fn ranked_candidates(
        &self,
        user: &Id,
        opts: &RecommendOptions,
    ) -> RecResult<Vec<(u32, Candidate)>> {
        opts.validate()?;
        let n = opts.num_recommendations;
        let uno = self
            .users()
            .to_index(user)
            .ok_or_else(|| RecError::UnknownUser(format!("{:?}", user)))?;

        let mut acc = CandidateAccumulator::new(self.matrix.n_cols);
        for (item, rating) in self.matrix.row_entries(uno as usize) {
            if rating <= 0.0 {
                continue;
            }
            let item = item as u32;
            let nbrs = self.index.query(item, n)?;
            let time = self.log.interaction_time(uno, item)?;
            trace!(
                "user {}: item {} rated at {} has {} neighbors",
                uno,
                item,
                time,
                nbrs.len()
            );
            for (nbr, dist) in nbrs {
                acc.add(nbr, dist, time);
            }
        }

        debug!("user {}: accumulated {} candidates", uno, acc.len());
        let mut ranked = acc.into_ranked();
        ranked.truncate(n);
        Ok(ranked)
    }

    /// Recommend items for a user as of a given instant.
    ///
    /// Candidates whose timestamp is not strictly after `now` minus the
    /// recency window are dropped, unless that would drop all of them.
    pub fn recommend(
        &self,
        user: &Id,
        opts: &RecommendOptions,
        now: DateTime<Utc>,
    ) -> RecResult<Vec<Recommendation<Id>>> {
        let ranked = self.ranked_candidates(user, opts)?;

        let cutoff = now
            .checked_sub_signed(opts.recency_window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let recent: Vec<(u32, Candidate)> = ranked
            .iter()
            .filter(|(_i, c)| c.timestamp > cutoff)
            .copied()
            .collect();
        let selected = if recent.is_empty() {
            if !ranked.is_empty() {
                debug!(
                    "no candidates after {}, keeping {} unfiltered",
                    cutoff,
                    ranked.len()
                );
            }
            ranked
        } else {
            recent
        };

        selected
            .into_iter()
            .map(|(item, _c)| {
                let id = ok_or_err!(
                    self.items().from_index(item),
                    DataIntegrity,
                    "item {} has no identifier",
                    item
                )?;
                let mean = ok_or_err!(
                    self.log.item_mean(item),
                    DataIntegrity,
                    "item {} has no ratings",
                    item
                )?;
                Ok((id.clone(), mean))
            })
            .collect()
    }

    /// Recommend items for a user as of the current time.
    pub fn recommend_now(
        &self,
        user: &Id,
        opts: &RecommendOptions,
    ) -> RecResult<Vec<Recommendation<Id>>> {
        self.recommend(user, opts, Utc::now())
    }
}

impl<Id: ArrowId> Recommender<Id> {
    /// Train a recommender from an Arrow record batch of ratings.
    pub fn from_record_batch(batch: &RecordBatch) -> RecResult<Self> {
        Self::from_log(RatingLog::from_record_batch(batch)?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Float32Array, Int64Array, TimestampSecondArray};
    use chrono::TimeDelta;

    use super::*;

    const NOW: i64 = 1_700_000_000;
    const DAY: i64 = 86_400;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(NOW, 0).unwrap()
    }

    fn ev(user: &str, item: &str, rating: f64, time: i64) -> RatingEvent<String> {
        RatingEvent::new(user.to_string(), item.to_string(), rating, time)
    }

    fn s(id: &str) -> String {
        id.to_string()
    }

    fn ids(recs: &[Recommendation<String>]) -> Vec<&str> {
        recs.iter().map(|(i, _)| i.as_str()).collect()
    }

    /// `u` rated A long ago and B recently; C is close to A and D to B.
    fn recency_data() -> Recommender<String> {
        Recommender::train(vec![
            ev("u", "A", 1.0, NOW - 400 * DAY),
            ev("v", "A", 5.0, NOW - 50 * DAY),
            ev("v", "C", 5.0, NOW - 50 * DAY),
            ev("u", "B", 1.0, NOW - 10 * DAY),
            ev("x", "B", 5.0, NOW - 50 * DAY),
            ev("x", "D", 5.0, NOW - 50 * DAY),
        ])
        .unwrap()
    }

    /// A deterministic 6x8 rating grid with scattered gaps.
    fn grid_data() -> Recommender<i64> {
        let mut events = Vec::new();
        for u in 0..6i64 {
            for i in 0..8i64 {
                let r = (u * 3 + i * 5) % 6;
                if r > 0 {
                    let age = ((u * 7 + i * 11) % 30) * 20 * DAY;
                    events.push(RatingEvent::new(100 + u, 200 + i, r as f64, NOW - age));
                }
            }
        }
        Recommender::train(events).unwrap()
    }

    #[test]
    fn test_unknown_user() {
        let rec = recency_data();
        let res = rec.recommend(&s("nobody"), &RecommendOptions::default(), now());
        assert!(matches!(res, Err(RecError::UnknownUser(_))));
    }

    #[test]
    fn test_invalid_options() {
        let rec = recency_data();
        let res = rec.recommend(&s("u"), &RecommendOptions::with_count(0), now());
        assert!(matches!(res, Err(RecError::InvalidArgument(_))));
    }

    #[test]
    fn test_no_rated_items() {
        let rec = Recommender::train(vec![
            ev("u", "A", 5.0, NOW),
            ev("u", "B", 3.0, NOW),
            ev("z", "A", 0.0, NOW),
            ev("z", "B", 0.0, NOW),
        ])
        .unwrap();
        let recs = rec
            .recommend(&s("z"), &RecommendOptions::default(), now())
            .unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn test_small_example() {
        let t0 = NOW - DAY;
        let rec = Recommender::train(vec![
            ev("u1", "i1", 5.0, t0),
            ev("u1", "i2", 3.0, t0),
            ev("u2", "i1", 4.0, NOW),
        ])
        .unwrap();

        let recs = rec
            .recommend(&s("u1"), &RecommendOptions::with_count(1), now())
            .unwrap();
        assert_eq!(recs.len(), 1);

        // i2 is reached from i1 and i1 from i2; neither through itself
        let recs = rec
            .recommend(&s("u1"), &RecommendOptions::with_count(2), now())
            .unwrap();
        assert_eq!(ids(&recs), vec!["i2", "i1"]);
        assert_eq!(recs[0].1, 3.0);
        // i1's mean covers u2's rating too
        assert_eq!(recs[1].1, 4.5);
    }

    #[test]
    fn test_shared_neighbor_accumulates() {
        let rec = Recommender::train(vec![
            ev("u", "A", 1.0, 100),
            ev("u", "B", 1.0, 200),
            ev("v", "A", 5.0, 50),
            ev("v", "C", 5.0, 50),
            ev("w", "B", 5.0, 50),
            ev("w", "C", 5.0, 50),
        ])
        .unwrap();
        let a = rec.items().to_index(&s("A")).unwrap();
        let b = rec.items().to_index(&s("B")).unwrap();
        let c = rec.items().to_index(&s("C")).unwrap();

        let from_a = rec.index().query(a, 1).unwrap();
        let from_b = rec.index().query(b, 1).unwrap();
        assert_eq!(from_a[0].0, c);
        assert_eq!(from_b[0].0, c);

        let cands = rec
            .ranked_candidates(&s("u"), &RecommendOptions::with_count(1))
            .unwrap();
        assert_eq!(cands.len(), 1);
        let (item, cand) = cands[0];
        assert_eq!(item, c);
        assert_eq!(cand.score, from_a[0].1 + from_b[0].1);
        assert_eq!(cand.timestamp.timestamp(), 100);
    }

    #[test]
    fn test_recency_filter() {
        let rec = recency_data();
        let opts = RecommendOptions::with_count(2);

        // A and B are each other's second neighbors and outrank C and D
        let cands = rec.ranked_candidates(&s("u"), &opts).unwrap();
        let cand_ids: Vec<&str> = cands
            .iter()
            .map(|(i, _)| rec.items().from_index(*i).unwrap().as_str())
            .collect();
        assert_eq!(cand_ids, vec!["A", "B"]);

        // B's candidate entry derives from the old rating of A
        let recs = rec.recommend(&s("u"), &opts, now()).unwrap();
        assert_eq!(recs, vec![(s("A"), 3.0)]);

        let wide = opts.window(TimeDelta::days(1000));
        let recs = rec.recommend(&s("u"), &wide, now()).unwrap();
        assert_eq!(recs, vec![(s("A"), 3.0), (s("B"), 3.0)]);
    }

    #[test]
    fn test_recency_tie_break() {
        let rec = recency_data();
        let cands = rec
            .ranked_candidates(&s("u"), &RecommendOptions::with_count(1))
            .unwrap();
        // C and D tie on distance; D came from the more recent rating
        assert_eq!(cands.len(), 1);
        assert_eq!(rec.items().from_index(cands[0].0), Some(&s("D")));
    }

    #[test]
    fn test_recency_fallback() {
        let rec = recency_data();
        let opts = RecommendOptions::with_count(2).window(TimeDelta::days(1));
        let recs = rec.recommend(&s("u"), &opts, now()).unwrap();
        assert_eq!(recs, vec![(s("A"), 3.0), (s("B"), 3.0)]);
    }

    #[test]
    fn test_grid_ordering() {
        let rec = grid_data();
        let opts = RecommendOptions::with_count(3);
        for user in rec.users().ids() {
            let cands = rec.ranked_candidates(user, &opts).unwrap();
            assert!(cands.len() <= 3);
            for w in cands.windows(2) {
                let (a, b) = (w[0].1, w[1].1);
                assert!(a.score > b.score || (a.score == b.score && a.timestamp >= b.timestamp));
            }
        }
    }

    #[test]
    fn test_grid_neighbors_only() {
        let rec = grid_data();
        let opts = RecommendOptions::with_count(3);
        for user in rec.users().ids() {
            let uno = rec.users().to_index(user).unwrap() as usize;
            let rated: Vec<u32> = rec
                .matrix()
                .row_entries(uno)
                .filter(|(_, r)| *r > 0.0)
                .map(|(i, _)| i as u32)
                .collect();

            let recs = rec.recommend(user, &opts, now()).unwrap();
            assert!(recs.len() <= 3);
            for (id, _) in recs {
                let ino = rec.items().to_index(&id).unwrap();
                let found = rated.iter().any(|r| {
                    *r != ino
                        && rec
                            .index()
                            .query(*r, 3)
                            .unwrap()
                            .iter()
                            .any(|(n, _)| *n == ino)
                });
                assert!(found, "item {} is not a neighbor of a rated item", id);
            }
        }
    }

    #[test]
    fn test_grid_fallback_is_exact() {
        let rec = grid_data();
        // no timestamp is strictly after "now", so the filter always empties
        let opts = RecommendOptions::with_count(3).window(TimeDelta::zero());
        for user in rec.users().ids() {
            let cands = rec.ranked_candidates(user, &opts).unwrap();
            let expected: Vec<i64> = cands
                .iter()
                .map(|(i, _)| *rec.items().from_index(*i).unwrap())
                .collect();
            let recs = rec.recommend(user, &opts, now()).unwrap();
            let got: Vec<i64> = recs.iter().map(|(i, _)| *i).collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn test_recommend_now() {
        let t = Utc::now().timestamp();
        let rec = Recommender::train(vec![
            ev("u", "A", 4.0, t - DAY),
            ev("u", "B", 2.0, t - DAY),
            ev("v", "B", 5.0, t - DAY),
            ev("v", "C", 3.0, t - DAY),
        ])
        .unwrap();
        let recs = rec
            .recommend_now(&s("u"), &RecommendOptions::default())
            .unwrap();
        assert!(!recs.is_empty());
        assert!(recs.len() <= 8);
    }

    #[test]
    fn test_json_output() {
        let rec = recency_data();
        let recs = rec
            .recommend(&s("u"), &RecommendOptions::with_count(2), now())
            .unwrap();
        let json = serde_json::to_string(&recs).unwrap();
        assert_eq!(json, r#"[["A",3.0]]"#);
    }

    #[test]
    fn test_mean_keeps_rating_precision() {
        let rec: Recommender<i64> = Recommender::train(vec![
            RatingEvent::new(1, 10, 4.3, NOW),
            RatingEvent::new(1, 20, 4.0, NOW),
            RatingEvent::new(2, 20, 4.0, NOW),
            RatingEvent::new(2, 10, 4.3, NOW),
        ])
        .unwrap();
        let mut recs = rec
            .recommend(&1, &RecommendOptions::with_count(2), now())
            .unwrap();
        recs.sort_by_key(|(i, _)| *i);
        assert_eq!(recs, vec![(10, 4.3), (20, 4.0)]);
        let json = serde_json::to_string(&recs).unwrap();
        assert_eq!(json, "[[10,4.3],[20,4.0]]");
    }

    #[test]
    fn test_index_over_items() {
        let rec = Recommender::train(vec![
            ev("u", "A", 4.0, NOW),
            ev("u", "B", 2.0, NOW),
            ev("u", "C", 3.0, NOW),
        ])
        .unwrap();
        assert_eq!(rec.matrix().n_rows, 1);
        assert_eq!(rec.index().n_items(), 3);
        assert_eq!(rec.index().query(0, 5).unwrap().len(), 2);
    }

    #[test]
    fn test_record_batch() {
        let batch = RecordBatch::try_from_iter(vec![
            (
                "user",
                Arc::new(Int64Array::from(vec![1, 1, 2, 2, 3])) as ArrayRef,
            ),
            (
                "item",
                Arc::new(Int64Array::from(vec![10, 20, 10, 30, 20])) as ArrayRef,
            ),
            (
                "rating",
                Arc::new(Float32Array::from(vec![4.0, 5.0, 3.0, 2.0, 1.0])) as ArrayRef,
            ),
            (
                "timestamp",
                Arc::new(TimestampSecondArray::from(vec![NOW; 5])) as ArrayRef,
            ),
        ])
        .unwrap();

        let rec: Recommender<i64> = Recommender::from_record_batch(&batch).unwrap();
        assert_eq!(rec.matrix().n_rows, 3);
        assert_eq!(rec.matrix().n_cols, 3);
        assert_eq!(rec.index().n_items(), 3);

        let recs = rec
            .recommend(&1, &RecommendOptions::with_count(2), now())
            .unwrap();
        assert_eq!(recs.len(), 2);
        let mean_20 = recs.iter().find(|(i, _)| *i == 20).map(|(_, m)| *m);
        assert_eq!(mean_20, Some(3.0));
    }
}
