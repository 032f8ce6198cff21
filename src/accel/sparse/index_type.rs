// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

use arrow::datatypes::DataType;
use arrow_schema::extension::ExtensionType;
use arrow_schema::ArrowError;
use serde::{Deserialize, Serialize};
use serde_json::{from_str, to_string};

/// Arrow extension type for the column indices of sparse rows.
///
/// The metadata records the number of columns, so a row array carries the
/// full matrix shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SparseIndexType {
    meta: SparseMeta,
}

/// Metadata for sparse row indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseMeta {
    /// The number of columns in the sparse row.
    pub dimension: usize,
}

impl SparseIndexType {
    pub fn create(dim: usize) -> SparseIndexType {
        SparseIndexType {
            meta: SparseMeta { dimension: dim },
        }
    }

    pub fn dimension(&self) -> usize {
        self.meta.dimension
    }
}

fn check_index_type(data_type: &DataType) -> Result<(), ArrowError> {
    match data_type {
        DataType::Int32 => Ok(()),
        t => Err(ArrowError::InvalidArgumentError(format!(
            "expected Int32 indices, got {}",
            t
        ))),
    }
}

impl ExtensionType for SparseIndexType {
    type Metadata = SparseMeta;

    const NAME: &'static str = "lenskit.sparse_index";

    fn metadata(&self) -> &Self::Metadata {
        &self.meta
    }

    fn serialize_metadata(&self) -> Option<String> {
        to_string(&self.meta).ok()
    }

    fn deserialize_metadata(metadata: Option<&str>) -> Result<Self::Metadata, ArrowError> {
        let meta_str = metadata
            .ok_or_else(|| ArrowError::SchemaError("sparse index requires metadata".into()))?;
        from_str(meta_str).map_err(|e| ArrowError::JsonError(e.to_string()))
    }

    fn supports_data_type(&self, data_type: &DataType) -> Result<(), ArrowError> {
        check_index_type(data_type)
    }

    fn try_new(data_type: &DataType, metadata: Self::Metadata) -> Result<Self, ArrowError> {
        check_index_type(data_type)?;
        Ok(Self { meta: metadata })
    }
}

#[test]
fn test_field_round_trip() {
    use arrow_schema::Field;

    let field =
        Field::new("index", DataType::Int32, false).with_extension_type(SparseIndexType::create(42));
    let ext: SparseIndexType = field.try_extension_type().unwrap();
    assert_eq!(ext.dimension(), 42);
}

#[test]
fn test_rejects_float_indices() {
    let ext = SparseIndexType::create(5);
    assert!(ext.supports_data_type(&DataType::Float32).is_err());
}
