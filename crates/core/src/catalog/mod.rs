//! Media catalog - one flat, ordered collection of records per category.
//!
//! The store persists each category as a whole document; the indexer holds a
//! [`WorkingCatalog`] during a run and writes it back through the store.
//! Title requests nobody could satisfy live beside the catalogs in a
//! document of their own.

mod json_store;
mod types;
mod working;

pub use json_store::JsonCatalogStore;
pub use types::*;
pub use working::{Insertion, WorkingCatalog};

/// Trait for catalog storage.
pub trait CatalogStore: Send + Sync {
    /// Load a category's records in stored order.
    ///
    /// A missing or unreadable document yields an empty catalog.
    fn load(&self, category: Category) -> Vec<MediaRecord>;

    /// Replace the category's whole document. Last write wins.
    fn save(&self, category: Category, records: &[MediaRecord]) -> Result<(), CatalogError>;

    /// Reset a category to an empty catalog.
    fn clear(&self, category: Category) -> Result<(), CatalogError> {
        self.save(category, &[])
    }

    /// Case-insensitive title substring search, in catalog order.
    ///
    /// An empty query lists the whole catalog.
    fn search(&self, category: Category, query: &str) -> Vec<MediaRecord> {
        let needle = query.trim().to_lowercase();
        let records = self.load(category);
        if needle.is_empty() {
            return records;
        }
        records
            .into_iter()
            .filter(|r| r.title_matches(&needle))
            .collect()
    }

    /// Load the pending title requests, oldest first.
    ///
    /// A missing or unreadable document yields no requests.
    fn load_requests(&self) -> Vec<MediaRequest>;

    /// Replace the whole requests document.
    fn save_requests(&self, requests: &[MediaRequest]) -> Result<(), CatalogError>;

    /// Drop every pending request.
    fn clear_requests(&self) -> Result<(), CatalogError> {
        self.save_requests(&[])
    }

    /// Append a request unless one for the same title is already pending.
    /// Returns whether it was added.
    fn record_request(&self, request: MediaRequest) -> Result<bool, CatalogError> {
        let mut requests = self.load_requests();
        if requests.iter().any(|r| r.same_title(&request.title)) {
            return Ok(false);
        }
        requests.push(request);
        self.save_requests(&requests)?;
        Ok(true)
    }
}
