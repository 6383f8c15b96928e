//! JSON file catalog store: `<data_dir>/movies.json`, `<data_dir>/tvshows.json`
//! and `<data_dir>/requests.json`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::{CatalogError, CatalogStore, Category, MediaRecord, MediaRequest};

const REQUESTS_DOCUMENT: &str = "requests.json";

/// Persisted entry shape. The category is implied by the document.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry<T> {
    title: T,
    file_id: String,
}

/// Catalog store backed by one pretty-printed JSON array per category.
pub struct JsonCatalogStore {
    data_dir: PathBuf,
}

impl JsonCatalogStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of a category's document.
    pub fn document_path(&self, category: Category) -> PathBuf {
        self.data_dir.join(category.document_name())
    }

    /// Path of the pending requests document.
    pub fn requests_path(&self) -> PathBuf {
        self.data_dir.join(REQUESTS_DOCUMENT)
    }

    fn write_error(path: &Path, e: impl ToString) -> CatalogError {
        CatalogError::Write {
            path: path.display().to_string(),
            message: e.to_string(),
        }
    }

    fn read_document<T: DeserializeOwned>(path: &Path) -> Vec<T> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "document unreadable, treating as empty");
                return Vec::new();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "document malformed, treating as empty");
            Vec::new()
        })
    }

    fn write_document<T: Serialize>(&self, path: &Path, entries: &[T]) -> Result<(), CatalogError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| Self::write_error(&self.data_dir, e))?;

        let json = serde_json::to_vec_pretty(entries)
            .map_err(|e| CatalogError::Encode(e.to_string()))?;

        // Write beside the target and rename over it so readers never see a
        // truncated document.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| Self::write_error(&tmp, e))?;
        fs::rename(&tmp, path).map_err(|e| Self::write_error(path, e))
    }
}

impl CatalogStore for JsonCatalogStore {
    fn load(&self, category: Category) -> Vec<MediaRecord> {
        // Titles may be null in documents written for files without a name.
        Self::read_document::<StoredEntry<Option<String>>>(&self.document_path(category))
            .into_iter()
            .map(|e| MediaRecord::new(e.title.unwrap_or_default(), e.file_id, category))
            .collect()
    }

    fn save(&self, category: Category, records: &[MediaRecord]) -> Result<(), CatalogError> {
        let entries: Vec<StoredEntry<&str>> = records
            .iter()
            .map(|r| StoredEntry {
                title: r.title.as_str(),
                file_id: r.file_id.clone(),
            })
            .collect();
        self.write_document(&self.document_path(category), &entries)?;

        debug!(category = %category, records = records.len(), "catalog saved");
        Ok(())
    }

    fn load_requests(&self) -> Vec<MediaRequest> {
        Self::read_document(&self.requests_path())
    }

    fn save_requests(&self, requests: &[MediaRequest]) -> Result<(), CatalogError> {
        self.write_document(&self.requests_path(), requests)?;
        debug!(requests = requests.len(), "requests saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (JsonCatalogStore, TempDir) {
        let dir = TempDir::new().unwrap();
        (JsonCatalogStore::new(dir.path().join("catalog")), dir)
    }

    #[test]
    fn test_load_missing_document_is_empty() {
        let (store, _dir) = store();
        assert!(store.load(Category::Movie).is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let (store, _dir) = store();
        let records = vec![
            MediaRecord::new("b.mkv", "F2", Category::Movie),
            MediaRecord::new("a.mkv", "F1", Category::Movie),
        ];
        store.save(Category::Movie, &records).unwrap();

        assert_eq!(store.load(Category::Movie), records);
        assert!(store.load(Category::TvShow).is_empty());
    }

    #[test]
    fn test_document_layout_has_title_and_file_id_only() {
        let (store, _dir) = store();
        store
            .save(
                Category::TvShow,
                &[MediaRecord::new("S01E01.mkv", "F1", Category::TvShow)],
            )
            .unwrap();

        let raw = fs::read_to_string(store.document_path(Category::TvShow)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{ "title": "S01E01.mkv", "file_id": "F1" }])
        );
        assert!(store
            .document_path(Category::TvShow)
            .ends_with("tvshows.json"));
    }

    #[test]
    fn test_malformed_document_is_empty() {
        let (store, _dir) = store();
        fs::create_dir_all(store.data_dir()).unwrap();
        fs::write(store.document_path(Category::Movie), "{not json").unwrap();
        assert!(store.load(Category::Movie).is_empty());
    }

    #[test]
    fn test_null_title_loads_as_empty_string() {
        let (store, _dir) = store();
        fs::create_dir_all(store.data_dir()).unwrap();
        fs::write(
            store.document_path(Category::Movie),
            r#"[{"title": null, "file_id": "F9"}]"#,
        )
        .unwrap();

        let records = store.load(Category::Movie);
        assert_eq!(records, vec![MediaRecord::new("", "F9", Category::Movie)]);
    }

    #[test]
    fn test_clear_resets_to_empty() {
        let (store, _dir) = store();
        store
            .save(Category::Movie, &[MediaRecord::new("a", "F1", Category::Movie)])
            .unwrap();
        store.clear(Category::Movie).unwrap();

        assert!(store.load(Category::Movie).is_empty());
        let raw = fs::read_to_string(store.document_path(Category::Movie)).unwrap();
        assert_eq!(raw.trim(), "[]");
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let (store, _dir) = store();
        store
            .save(
                Category::Movie,
                &[
                    MediaRecord::new("Dune.Part.Two.mkv", "F1", Category::Movie),
                    MediaRecord::new("Arrival.mkv", "F2", Category::Movie),
                    MediaRecord::new("DUNE.1984.mkv", "F3", Category::Movie),
                ],
            )
            .unwrap();

        let hits = store.search(Category::Movie, "dune");
        let ids: Vec<_> = hits.iter().map(|r| r.file_id.as_str()).collect();
        assert_eq!(ids, vec!["F1", "F3"]);

        assert_eq!(store.search(Category::Movie, "  ").len(), 3);
        assert!(store.search(Category::Movie, "alien").is_empty());
    }

    #[test]
    fn test_requests_round_trip_and_clear() {
        let (store, _dir) = store();
        assert!(store.load_requests().is_empty());

        assert!(store.record_request(MediaRequest::new("Heat", Some(1))).unwrap());
        assert!(store.record_request(MediaRequest::new("Ronin", None)).unwrap());
        assert!(!store.record_request(MediaRequest::new(" heat ", Some(2))).unwrap());

        let titles: Vec<_> = store.load_requests().into_iter().map(|r| r.title).collect();
        assert_eq!(titles, vec!["Heat", "Ronin"]);
        assert!(store.requests_path().ends_with("requests.json"));

        store.clear_requests().unwrap();
        assert!(store.load_requests().is_empty());
        let raw = fs::read_to_string(store.requests_path()).unwrap();
        assert_eq!(raw.trim(), "[]");
        assert!(store.load(Category::Movie).is_empty());
    }
}
