//! Types for the per-category media catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Catalog category. Each category is persisted as its own document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Movie,
    TvShow,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Movie, Category::TvShow];

    /// Plural slug used for document names and URL paths.
    pub fn slug(&self) -> &'static str {
        match self {
            Category::Movie => "movies",
            Category::TvShow => "tvshows",
        }
    }

    /// File name of the category's catalog document.
    pub fn document_name(&self) -> String {
        format!("{}.json", self.slug())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Category {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Ok(Category::Movie),
            "tv" | "tvshow" | "tvshows" | "tv_show" | "tv_shows" => Ok(Category::TvShow),
            other => Err(CatalogError::UnknownCategory(other.to_string())),
        }
    }
}

/// One indexed media file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub title: String,
    /// Opaque external file id; unique within a category's catalog.
    pub file_id: String,
    pub category: Category,
}

impl MediaRecord {
    pub fn new(title: impl Into<String>, file_id: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            file_id: file_id.into(),
            category,
        }
    }

    /// Case-insensitive title substring match.
    pub fn title_matches(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
    }
}

/// A title someone asked for that the catalog did not have.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_at: Option<DateTime<Utc>>,
}

impl MediaRequest {
    pub fn new(title: impl Into<String>, user_id: Option<i64>) -> Self {
        Self {
            title: title.into(),
            user_id,
            requested_at: Some(Utc::now()),
        }
    }

    /// Whether two requests ask for the same title, ignoring case and
    /// surrounding whitespace.
    pub fn same_title(&self, title: &str) -> bool {
        self.title.trim().to_lowercase() == title.trim().to_lowercase()
    }
}

/// Errors for catalog operations.
#[derive(Debug, Clone, Error)]
pub enum CatalogError {
    #[error("Failed to write catalog {path}: {message}")]
    Write { path: String, message: String },

    #[error("Failed to encode catalog: {0}")]
    Encode(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_aliases() {
        assert_eq!("movies".parse::<Category>().unwrap(), Category::Movie);
        assert_eq!("Movie".parse::<Category>().unwrap(), Category::Movie);
        assert_eq!("tvshows".parse::<Category>().unwrap(), Category::TvShow);
        assert_eq!("tv_show".parse::<Category>().unwrap(), Category::TvShow);
        assert_eq!(" TV ".parse::<Category>().unwrap(), Category::TvShow);
        assert!(matches!(
            "music".parse::<Category>(),
            Err(CatalogError::UnknownCategory(_))
        ));
    }

    #[test]
    fn test_category_serialization() {
        assert_eq!(serde_json::to_string(&Category::Movie).unwrap(), "\"movie\"");
        assert_eq!(serde_json::to_string(&Category::TvShow).unwrap(), "\"tv_show\"");
    }

    #[test]
    fn test_request_title_comparison() {
        let request = MediaRequest::new("Blade Runner", Some(7));
        assert!(request.same_title("  blade runner "));
        assert!(!request.same_title("Blade Runner 2049"));
    }

    #[test]
    fn test_request_without_optional_fields() {
        let request: MediaRequest = serde_json::from_str(r#"{"title":"Heat"}"#).unwrap();
        assert_eq!(request.user_id, None);
        assert_eq!(request.requested_at, None);
        assert_eq!(serde_json::to_string(&request).unwrap(), r#"{"title":"Heat"}"#);
    }

    #[test]
    fn test_document_names() {
        assert_eq!(Category::Movie.document_name(), "movies.json");
        assert_eq!(Category::TvShow.document_name(), "tvshows.json");
        assert_eq!(Category::TvShow.to_string(), "tvshows");
    }

    #[test]
    fn test_title_matches_is_case_insensitive() {
        let record = MediaRecord::new("The.Matrix.1999.1080p.mkv", "F1", Category::Movie);
        assert!(record.title_matches("matrix"));
        assert!(!record.title_matches("reloaded"));
    }
}
