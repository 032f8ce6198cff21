// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Error types for recommendation.
use arrow::error::ArrowError;
use thiserror::Error;

/// Errors raised while building or querying a recommender.
#[derive(Error, Debug)]
pub enum RecError {
    #[error("unknown user {0}")]
    UnknownUser(String),
    #[error("data integrity error: {0}")]
    DataIntegrity(String),
    #[error("similarity index has not been fitted")]
    NotFitted,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),
}

pub type RecResult<T> = Result<T, RecError>;

/// Convert an option into a result with a formatted [RecError].
#[macro_export]
macro_rules! ok_or_err {
    ($val:expr, $variant:ident, $($arg:expr),*) => {
        $val.ok_or_else(|| $crate::errors::RecError::$variant(format!($($arg),*)))
    };
}

#[cfg(feature = "python")]
impl From<RecError> for pyo3::PyErr {
    fn from(err: RecError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyKeyError, PyRuntimeError, PyValueError};
        match err {
            RecError::UnknownUser(_) => PyKeyError::new_err(err.to_string()),
            RecError::NotFitted => PyRuntimeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}
