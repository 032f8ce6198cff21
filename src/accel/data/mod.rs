// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Rating data management.

mod ids;
mod ratings;
mod transpose;

pub use ids::IdIndex;
pub use ratings::{epoch_instant, RatingEvent, RatingLog};
pub use transpose::transpose_csr;
