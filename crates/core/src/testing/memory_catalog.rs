//! In-memory catalog store for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::catalog::{CatalogError, CatalogStore, Category, MediaRecord, MediaRequest};

/// Catalog store backed by a map, counting loads and saves.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    documents: Mutex<HashMap<Category, Vec<MediaRecord>>>,
    requests: Mutex<Vec<MediaRequest>>,
    save_error: Mutex<Option<CatalogError>>,
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a category without counting it as a save.
    pub fn with_records(self, category: Category, records: Vec<MediaRecord>) -> Self {
        self.documents().insert(category, records);
        self
    }

    /// Seed the pending requests document.
    pub fn with_requests(self, requests: Vec<MediaRequest>) -> Self {
        *self.requests.lock().unwrap_or_else(|e| e.into_inner()) = requests;
        self
    }

    pub fn requests(&self) -> Vec<MediaRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make every subsequent save fail with `error` (or succeed again on `None`).
    pub fn set_save_error(&self, error: Option<CatalogError>) {
        *self
            .save_error
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = error;
    }

    pub fn records(&self, category: Category) -> Vec<MediaRecord> {
        self.documents().get(&category).cloned().unwrap_or_default()
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn injected_error(&self) -> Result<(), CatalogError> {
        match self
            .save_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn documents(&self) -> MutexGuard<'_, HashMap<Category, Vec<MediaRecord>>> {
        self.documents.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CatalogStore for MemoryCatalogStore {
    fn load(&self, category: Category) -> Vec<MediaRecord> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.records(category)
    }

    fn save(&self, category: Category, records: &[MediaRecord]) -> Result<(), CatalogError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.injected_error()?;
        self.documents().insert(category, records.to_vec());
        Ok(())
    }

    fn load_requests(&self) -> Vec<MediaRequest> {
        self.requests()
    }

    fn save_requests(&self, requests: &[MediaRequest]) -> Result<(), CatalogError> {
        self.injected_error()?;
        *self.requests.lock().unwrap_or_else(|e| e.into_inner()) = requests.to_vec();
        Ok(())
    }
}
