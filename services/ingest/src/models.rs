//! OMDb payloads and the catalog rows built from them

use serde::Deserialize;

/// Input list entry
#[derive(Debug, Clone, Deserialize)]
pub struct TitleId {
    pub ttid: String,
}

/// OMDb title lookup response
///
/// Every field is optional: a failed lookup only carries `Response` and `Error`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OmdbTitle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub plot: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(rename = "imdbRating", default)]
    pub imdb_rating: Option<String>,
    #[serde(rename = "imdbID", default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl OmdbTitle {
    pub fn is_success(&self) -> bool {
        self.response.eq_ignore_ascii_case("true")
    }
}

/// Catalog row written by the importer
#[derive(Debug, Clone, PartialEq)]
pub struct AnimeRecord {
    pub external_id: String,
    pub title: String,
    pub poster: String,
    pub year: String,
    pub released: String,
    pub rating: Option<String>,
    pub genre: Vec<String>,
    pub overview: String,
}

/// OMDb uses "N/A" for unknown values
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && v != "N/A")
}

impl AnimeRecord {
    /// Map a successful lookup; `None` when the title is missing
    pub fn from_omdb(ttid: &str, title: OmdbTitle) -> Option<Self> {
        let name = present(title.title)?;
        let genre = present(title.genre)
            .map(|g| {
                g.split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Some(Self {
            external_id: present(title.imdb_id).unwrap_or_else(|| ttid.to_string()),
            title: name,
            poster: present(title.poster).unwrap_or_default(),
            year: present(title.year).unwrap_or_default(),
            released: present(title.released).unwrap_or_default(),
            rating: present(title.imdb_rating),
            genre,
            overview: present(title.plot).unwrap_or_default(),
        })
    }
}
