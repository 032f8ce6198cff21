// This file is part of LensKit.
// Copyright (C) 2018-2023 Boise State University.
// Copyright (C) 2023-2025 Drexel University.
// Licensed under the MIT license, see LICENSE.md for details.
// SPDX-License-Identifier: MIT

//! Mapping between raw entity identifiers and dense indices.
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Bidirectional ID index.
///
/// Each distinct identifier gets the next free index in order of first
/// appearance; repeats are ignored.
#[derive(Debug, Clone)]
pub struct IdIndex<Id> {
    ids: Vec<Id>,
    index: FxHashMap<Id, u32>,
}

impl<Id> Default for IdIndex<Id> {
    fn default() -> Self {
        IdIndex {
            ids: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<Id: Clone + Eq + Hash> IdIndex<Id> {
    /// Build an index from a sequence of (possibly repeated) identifiers.
    pub fn from_ids<I: IntoIterator<Item = Id>>(ids: I) -> Self {
        let mut idx = IdIndex::default();
        for id in ids {
            idx.insert(id);
        }
        idx
    }

    /// Add an identifier, returning its index.
    fn insert(&mut self, id: Id) -> u32 {
        if let Some(i) = self.index.get(&id) {
            return *i;
        }
        let i = self.ids.len() as u32;
        self.index.insert(id.clone(), i);
        self.ids.push(id);
        i
    }

    /// Look up the index for an identifier.
    pub fn to_index(&self, id: &Id) -> Option<u32> {
        self.index.get(id).copied()
    }

    /// Look up the identifier at an index.
    pub fn from_index(&self, idx: u32) -> Option<&Id> {
        self.ids.get(idx as usize)
    }

    /// Get the number of identifiers.
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    /// Get the identifiers in index order.
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let idx: IdIndex<i64> = IdIndex::default();
        assert_eq!(idx.size(), 0);
        assert_eq!(idx.to_index(&5), None);
        assert_eq!(idx.from_index(0), None);
    }

    #[test]
    fn test_first_appearance_order() {
        let idx = IdIndex::from_ids(vec![30, 10, 30, 20, 10]);
        assert_eq!(idx.size(), 3);
        assert_eq!(idx.ids(), &[30, 10, 20]);
        assert_eq!(idx.to_index(&30), Some(0));
        assert_eq!(idx.to_index(&10), Some(1));
        assert_eq!(idx.to_index(&20), Some(2));
        assert_eq!(idx.to_index(&40), None);
    }

    #[test]
    fn test_inverse() {
        let names = ["alice", "bob", "carol"];
        let idx = IdIndex::from_ids(names.iter().map(|s| s.to_string()));
        for (i, n) in names.iter().enumerate() {
            let id = idx.from_index(i as u32).unwrap();
            assert_eq!(id, n);
            assert_eq!(idx.to_index(id), Some(i as u32));
        }
        assert_eq!(idx.from_index(3), None);
    }
}
