// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Item-based k-NN recommendation.

mod accum;
mod index;
mod score;

pub use accum::{Candidate, CandidateAccumulator};
pub use index::ItemNeighborIndex;
pub use score::{Recommendation, Recommender};
