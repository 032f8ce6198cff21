// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Recency-aware item-kNN recommendation over sparse rating matrices.

pub mod config;
pub mod data;
pub mod errors;
pub mod knn;
pub mod sparse;
pub mod types;

#[cfg(feature = "python")]
mod python;

pub use config::RecommendOptions;
pub use data::{IdIndex, RatingEvent, RatingLog};
pub use errors::{RecError, RecResult};
pub use knn::{Candidate, ItemNeighborIndex, Recommendation, Recommender};
pub use sparse::CSRMatrix;
