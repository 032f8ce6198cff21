// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Python bindings for the recommender.
use arrow::{
    array::{Array, ArrayData, RecordBatch},
    pyarrow::PyArrowType,
};
use chrono::{TimeDelta, Utc};
use log::*;
use numpy::PyArray1;
use pyo3::{
    exceptions::{PyKeyError, PyRuntimeError, PyValueError},
    prelude::*,
};
use rayon::{current_num_threads, ThreadPoolBuilder};

use crate::{
    config::{RecommendOptions, DEFAULT_NUM_RECOMMENDATIONS, DEFAULT_RECENCY_DAYS},
    data::epoch_instant,
    knn::Recommender,
};

/// Item-kNN recommender trained on a PyArrow record batch of ratings.
#[pyclass(name = "Recommender", frozen)]
struct PyRecommender {
    inner: Recommender<i64>,
}

#[pymethods]
impl PyRecommender {
    /// Train a recommender from a batch with `user`, `item`, `rating` and
    /// `timestamp` columns.
    #[new]
    fn new(py: Python<'_>, ratings: PyArrowType<RecordBatch>) -> PyResult<Self> {
        let batch = ratings.0;
        debug!("training recommender on {} rating rows", batch.num_rows());
        let inner = py.allow_threads(|| Recommender::from_record_batch(&batch))?;
        Ok(PyRecommender { inner })
    }

    /// Recommend items for a user, as `(item, mean rating)` pairs.
    ///
    /// `now` is in Unix-epoch seconds and defaults to the current time.
    #[pyo3(signature = (user, n=DEFAULT_NUM_RECOMMENDATIONS, window_days=DEFAULT_RECENCY_DAYS, now=None))]
    fn recommend(
        &self,
        py: Python<'_>,
        user: i64,
        n: usize,
        window_days: i64,
        now: Option<i64>,
    ) -> PyResult<Vec<(i64, f64)>> {
        let window = TimeDelta::try_days(window_days)
            .ok_or_else(|| PyValueError::new_err("recency window out of range"))?;
        let opts = RecommendOptions::with_count(n).window(window);
        let now = match now {
            Some(secs) => epoch_instant(secs)?,
            None => Utc::now(),
        };
        Ok(py.allow_threads(|| self.inner.recommend(&user, &opts, now))?)
    }

    /// Get the nearest neighbors of an item as arrays of item IDs and distances.
    fn neighbors<'py>(
        &self,
        py: Python<'py>,
        item: i64,
        k: usize,
    ) -> PyResult<(Bound<'py, PyArray1<i64>>, Bound<'py, PyArray1<f32>>)> {
        let items = self.inner.items();
        let ino = items
            .to_index(&item)
            .ok_or_else(|| PyKeyError::new_err(format!("unknown item {}", item)))?;
        let nbrs = self.inner.index().query(ino, k)?;

        let mut ids = Vec::with_capacity(nbrs.len());
        let mut dists = Vec::with_capacity(nbrs.len());
        for (i, d) in nbrs {
            let id = items
                .from_index(i)
                .ok_or_else(|| PyRuntimeError::new_err(format!("item {} has no identifier", i)))?;
            ids.push(*id);
            dists.push(d);
        }

        Ok((PyArray1::from_vec(py, ids), PyArray1::from_vec(py, dists)))
    }

    /// Get the user-item rating matrix as an Arrow sparse row array.
    fn rating_matrix(&self) -> PyArrowType<ArrayData> {
        self.inner.matrix().to_arrow().to_data().into()
    }

    #[getter]
    fn n_users(&self) -> usize {
        self.inner.users().size()
    }

    #[getter]
    fn n_items(&self) -> usize {
        self.inner.items().size()
    }
}

#[pyfunction]
fn init_accel_pool(n_threads: usize) -> PyResult<()> {
    debug!(
        "initializing accelerator thread pool with {} threads",
        n_threads
    );
    ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
        .map_err(|_| PyRuntimeError::new_err("Rayon initialization error"))
}

#[pyfunction]
fn thread_count() -> usize {
    current_num_threads()
}

/// Entry point for the accelerator module.
#[pymodule]
fn _accel(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();
    m.add_class::<PyRecommender>()?;
    m.add_function(wrap_pyfunction!(init_accel_pool, m)?)?;
    m.add_function(wrap_pyfunction!(thread_count, m)?)?;
    Ok(())
}
