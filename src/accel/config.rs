// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Recommendation options.
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::errors::{RecError, RecResult};

pub const DEFAULT_NUM_RECOMMENDATIONS: usize = 8;
pub const DEFAULT_RECENCY_DAYS: i64 = 365;

/// Options controlling a single recommendation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendOptions {
    /// The number of recommendations to produce (also the neighborhood size).
    pub num_recommendations: usize,
    /// How far back (from "now") a candidate's interaction may lie to pass
    /// the recency filter.
    #[serde(rename = "recency_days", with = "days")]
    pub recency_window: TimeDelta,
}

impl Default for RecommendOptions {
    fn default() -> Self {
        RecommendOptions {
            num_recommendations: DEFAULT_NUM_RECOMMENDATIONS,
            recency_window: TimeDelta::days(DEFAULT_RECENCY_DAYS),
        }
    }
}

impl RecommendOptions {
    /// Create options with a recommendation count and the default window.
    pub fn with_count(n: usize) -> Self {
        RecommendOptions {
            num_recommendations: n,
            ..Default::default()
        }
    }

    /// Replace the recency window.
    pub fn window(self, window: TimeDelta) -> Self {
        RecommendOptions {
            recency_window: window,
            ..self
        }
    }

    /// Parse options from a JSON object.
    pub fn from_json(json: &str) -> RecResult<Self> {
        let opts: RecommendOptions = serde_json::from_str(json)
            .map_err(|e| RecError::InvalidArgument(format!("bad options: {}", e)))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> RecResult<()> {
        if self.num_recommendations == 0 {
            return Err(RecError::InvalidArgument(
                "num_recommendations must be positive".into(),
            ));
        }
        if self.recency_window < TimeDelta::zero() {
            return Err(RecError::InvalidArgument(format!(
                "negative recency window {}",
                self.recency_window
            )));
        }
        Ok(())
    }
}

mod days {
    use chrono::TimeDelta;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(td: &TimeDelta, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_i64(td.num_days())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<TimeDelta, D::Error> {
        let days = i64::deserialize(de)?;
        TimeDelta::try_days(days).ok_or_else(|| D::Error::custom("recency window out of range"))
    }
}

#[test]
fn test_defaults() {
    let opts = RecommendOptions::default();
    assert_eq!(opts.num_recommendations, 8);
    assert_eq!(opts.recency_window, TimeDelta::days(365));
    assert!(opts.validate().is_ok());
}

#[test]
fn test_json_partial() {
    let opts = RecommendOptions::from_json(r#"{"num_recommendations": 3}"#).unwrap();
    assert_eq!(opts.num_recommendations, 3);
    assert_eq!(opts.recency_window, TimeDelta::days(365));

    let opts = RecommendOptions::from_json(r#"{"recency_days": 30}"#).unwrap();
    assert_eq!(opts.num_recommendations, 8);
    assert_eq!(opts.recency_window, TimeDelta::days(30));
}

#[test]
fn test_json_round_trip() {
    let opts = RecommendOptions::with_count(5).window(TimeDelta::days(10));
    let json = serde_json::to_string(&opts).unwrap();
    assert_eq!(json, r#"{"num_recommendations":5,"recency_days":10}"#);
}

#[test]
fn test_rejects_zero() {
    let err = RecommendOptions::from_json(r#"{"num_recommendations": 0}"#).unwrap_err();
    assert!(matches!(err, RecError::InvalidArgument(_)));
}

#[test]
fn test_rejects_negative_window() {
    let opts = RecommendOptions::default().window(TimeDelta::days(-1));
    assert!(matches!(opts.validate(), Err(RecError::InvalidArgument(_))));
}
