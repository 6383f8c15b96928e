//! In-memory working copy of a category's catalog with O(1) dedup.

use std::collections::HashSet;

use super::{Category, MediaRecord};

/// Outcome of offering a record to a [`WorkingCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    Added,
    Duplicate,
}

/// Ordered records plus the set of known file ids.
///
/// Records loaded with duplicate file ids keep only their first occurrence,
/// so a catalog written back from here never violates uniqueness.
#[derive(Debug, Clone)]
pub struct WorkingCatalog {
    category: Category,
    records: Vec<MediaRecord>,
    known_ids: HashSet<String>,
}

impl WorkingCatalog {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            records: Vec::new(),
            known_ids: HashSet::new(),
        }
    }

    pub fn from_records(category: Category, records: Vec<MediaRecord>) -> Self {
        let mut catalog = Self::new(category);
        for record in records {
            if catalog.known_ids.insert(record.file_id.clone()) {
                catalog.records.push(MediaRecord { category, ..record });
            }
        }
        catalog
    }

    /// Append a record unless its file id is already known.
    pub fn insert(&mut self, title: impl Into<String>, file_id: impl Into<String>) -> Insertion {
        let file_id = file_id.into();
        if self.known_ids.contains(&file_id) {
            return Insertion::Duplicate;
        }
        self.known_ids.insert(file_id.clone());
        self.records
            .push(MediaRecord::new(title, file_id, self.category));
        Insertion::Added
    }

    pub fn contains(&self, file_id: &str) -> bool {
        self.known_ids.contains(file_id)
    }

    pub fn get(&self, file_id: &str) -> Option<&MediaRecord> {
        if !self.contains(file_id) {
            return None;
        }
        self.records.iter().find(|r| r.file_id == file_id)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
