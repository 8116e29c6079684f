//! Anime catalog models
//!
//! The JSON field names follow the catalog's established client contract
//! (`imdbID`, `Title`, `TitleEng`, ...), not the Rust field names.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anime catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub id: Uuid,
    #[serde(rename = "imdbID")]
    pub external_id: String,
    #[serde(rename = "TitleEng")]
    pub title: String,
    #[serde(rename = "Title")]
    pub title_localized: String,
    #[serde(rename = "Poster")]
    pub poster: String,
    #[serde(rename = "Backdrop", default, skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<String>,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Released")]
    pub released: String,
    #[serde(rename = "imdbRating", default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    #[serde(rename = "Episodes", default, skip_serializing_if = "Option::is_none")]
    pub episodes: Option<i32>,
    #[serde(rename = "Genre", default)]
    pub genre: Vec<String>,
    #[serde(rename = "Tags", default)]
    pub tags: Vec<String>,
    #[serde(rename = "OverviewRu")]
    pub overview_localized: String,
}

/// Full anime document as written by administrators
///
/// Used for both create and update; update is a full replace.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimeDocument {
    #[serde(rename = "imdbID", default)]
    pub external_id: String,
    #[serde(rename = "TitleEng", default)]
    pub title: String,
    #[serde(rename = "Title", default)]
    pub title_localized: String,
    #[serde(rename = "Poster", default)]
    pub poster: String,
    #[serde(rename = "Backdrop", default)]
    pub backdrop: Option<String>,
    #[serde(rename = "Year", default)]
    pub year: String,
    #[serde(rename = "Released", default)]
    pub released: String,
    #[serde(rename = "imdbRating", default)]
    pub rating: Option<String>,
    #[serde(rename = "Episodes", default)]
    pub episodes: Option<i32>,
    #[serde(rename = "Genre", default)]
    pub genre: Vec<String>,
    #[serde(rename = "Tags", default)]
    pub tags: Vec<String>,
    #[serde(rename = "OverviewRu", default)]
    pub overview_localized: String,
}

impl AnimeDocument {
    /// Attach an internal id to this document
    pub fn into_anime(self, id: Uuid) -> Anime {
        Anime {
            id,
            external_id: self.external_id,
            title: self.title,
            title_localized: self.title_localized,
            poster: self.poster,
            backdrop: self.backdrop,
            year: self.year,
            released: self.released,
            rating: self.rating,
            episodes: self.episodes,
            genre: self.genre,
            tags: self.tags,
            overview_localized: self.overview_localized,
        }
    }
}

/// Catalog search filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimeFilter {
    /// Match anime having at least one of these genres; empty means any
    pub genres: Vec<String>,
    /// Case-insensitive substring of either title
    pub search: Option<String>,
    /// Maximum number of results
    pub limit: Option<i64>,
}

/// Query parameters for the public catalog listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnimeQuery {
    /// Comma separated genre list
    pub genre: Option<String>,
    /// Search term for the titles
    pub search: Option<String>,
    /// Maximum number of results
    pub limit: Option<String>,
}

/// Response for anime deletion
#[derive(Debug, Clone, Serialize)]
pub struct AnimeDeleted {
    pub message: String,
    #[serde(rename = "imdbID")]
    pub external_id: String,
}
