// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Support for type-checking and converting Arrow input columns.
use std::fmt::Debug;
use std::hash::Hash;

use arrow::{
    array::{Array, ArrayRef, AsArray, RecordBatch},
    compute::cast,
    datatypes::{DataType, Float64Type, Int64Type, TimeUnit},
};
use log::*;

use crate::errors::{RecError, RecResult};
use crate::ok_or_err;

/// Identifier types that can be read from Arrow columns.
pub trait ArrowId: Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Extract the identifiers from an array, with `None` for nulls.
    fn extract_ids(name: &str, array: &ArrayRef) -> RecResult<Vec<Option<Self>>>;
}

impl ArrowId for i64 {
    fn extract_ids(name: &str, array: &ArrayRef) -> RecResult<Vec<Option<i64>>> {
        if !array.data_type().is_integer() {
            return Err(RecError::InvalidArgument(format!(
                "invalid {} type {}, expected integer",
                name,
                array.data_type()
            )));
        }
        let arr = cast(array, &DataType::Int64)?;
        Ok(arr.as_primitive::<Int64Type>().iter().collect())
    }
}

impl ArrowId for String {
    fn extract_ids(name: &str, array: &ArrayRef) -> RecResult<Vec<Option<String>>> {
        trace!("casting {} {} IDs to strings", array.len(), name);
        let arr = cast(array, &DataType::Utf8)?;
        Ok(arr
            .as_string::<i32>()
            .iter()
            .map(|s| s.map(str::to_string))
            .collect())
    }
}

/// Look up a required column of a record batch.
pub(crate) fn required_column<'a>(batch: &'a RecordBatch, name: &str) -> RecResult<&'a ArrayRef> {
    ok_or_err!(
        batch.column_by_name(name),
        InvalidArgument,
        "missing column '{}'",
        name
    )
}

/// Extract a numeric column as `f64` values.
pub(crate) fn float_values(name: &str, array: &ArrayRef) -> RecResult<Vec<Option<f64>>> {
    if !array.data_type().is_numeric() {
        return Err(RecError::InvalidArgument(format!(
            "invalid {} type {}, expected numeric",
            name,
            array.data_type()
        )));
    }
    let arr = cast(array, &DataType::Float64)?;
    Ok(arr.as_primitive::<Float64Type>().iter().collect())
}

/// Extract a timestamp column as Unix-epoch seconds.
///
/// Accepts Arrow timestamps of any unit, or plain integers (taken as seconds).
pub(crate) fn epoch_seconds(name: &str, array: &ArrayRef) -> RecResult<Vec<Option<i64>>> {
    let arr = match array.data_type() {
        DataType::Timestamp(_, _) => {
            let secs = cast(array, &DataType::Timestamp(TimeUnit::Second, None))?;
            cast(&secs, &DataType::Int64)?
        }
        t if t.is_integer() => cast(array, &DataType::Int64)?,
        t => {
            return Err(RecError::InvalidArgument(format!(
                "invalid {} type {}, expected timestamp or integer",
                name, t
            )))
        }
    };
    Ok(arr.as_primitive::<Int64Type>().iter().collect())
}
