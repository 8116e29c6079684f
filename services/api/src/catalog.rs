//! Anime catalog management

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::anime::{Anime, AnimeDeleted, AnimeDocument, AnimeFilter, AnimeQuery},
    repositories::AnimeStore,
    validation::require_non_empty,
};

/// Catalog manager
#[derive(Clone)]
pub struct CatalogManager {
    anime: Arc<dyn AnimeStore>,
}

fn anime_not_found() -> ApiError {
    ApiError::NotFound("Anime not found".to_string())
}

fn duplicate_external_id() -> ApiError {
    ApiError::Conflict("Anime with this imdbID already exists".to_string())
}

/// Localized genre labels the client may send, with their catalog names
const GENRE_ALIASES: &[(&str, &str)] = &[
    ("Экшен", "Action"),
    ("Приключения", "Adventure"),
    ("Анимация", "Animation"),
    ("Комедия", "Comedy"),
    ("Криминал", "Crime"),
    ("Драма", "Drama"),
    ("Семейный", "Family"),
    ("Фэнтези", "Fantasy"),
    ("Ужасы", "Horror"),
    ("Музыка", "Music"),
    ("Детектив", "Mystery"),
    ("Романтика", "Romance"),
    ("Фантастика", "Sci-Fi"),
    ("Спорт", "Sport"),
    ("Триллер", "Thriller"),
];

/// Catalog name for a genre label; unknown labels pass through unchanged
pub fn canonical_genre(label: &str) -> &str {
    GENRE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == label)
        .map_or(label, |&(_, genre)| genre)
}

/// Turn raw query parameters into a filter
///
/// `genre` is a comma separated list; blank entries are dropped and
/// localized labels are mapped to catalog names.
pub fn parse_filter(query: AnimeQuery) -> ApiResult<AnimeFilter> {
    let genres = query
        .genre
        .map(|genre| {
            genre
                .split(',')
                .map(str::trim)
                .filter(|g| !g.is_empty())
                .map(|g| canonical_genre(g).to_string())
                .collect()
        })
        .unwrap_or_default();

    let search = query.search.filter(|s| !s.trim().is_empty());

    let limit = match query.limit.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => match raw.parse::<i64>() {
            Ok(limit) if limit >= 0 => Some(limit),
            _ => {
                return Err(ApiError::InvalidInput(
                    "limit must be a non-negative integer".to_string(),
                ));
            }
        },
    };

    Ok(AnimeFilter {
        genres,
        search,
        limit,
    })
}

fn validate_document(document: &AnimeDocument) -> ApiResult<()> {
    require_non_empty(&document.external_id, "imdbID")?;
    require_non_empty(&document.title, "TitleEng")?;
    require_non_empty(&document.title_localized, "Title")?;
    Ok(())
}

impl CatalogManager {
    pub fn new(anime: Arc<dyn AnimeStore>) -> Self {
        Self { anime }
    }

    /// Public listing; an empty result is reported as not found
    pub async fn list(&self, filter: &AnimeFilter) -> ApiResult<Vec<Anime>> {
        let anime = self.anime.list(filter).await?;
        if anime.is_empty() {
            return Err(ApiError::NotFound("No anime found".to_string()));
        }
        Ok(anime)
    }

    /// Every catalog entry, possibly none
    pub async fn list_all(&self) -> ApiResult<Vec<Anime>> {
        Ok(self.anime.list(&AnimeFilter::default()).await?)
    }

    pub async fn get(&self, external_id: &str) -> ApiResult<Anime> {
        self.anime
            .find_by_external_id(external_id)
            .await?
            .ok_or_else(anime_not_found)
    }

    pub async fn create(&self, document: AnimeDocument) -> ApiResult<Anime> {
        validate_document(&document)?;

        let anime = document.into_anime(Uuid::new_v4());
        match self.anime.insert(&anime).await {
            Ok(created) => {
                info!("Created anime {}", created.external_id);
                Ok(created)
            }
            Err(e) if e.is_conflict() => Err(duplicate_external_id()),
            Err(e) => Err(e.into()),
        }
    }

    /// Full replace of the entry stored under `external_id`
    pub async fn update(&self, external_id: &str, document: AnimeDocument) -> ApiResult<Anime> {
        validate_document(&document)?;

        match self.anime.replace(external_id, &document).await {
            Ok(Some(updated)) => Ok(updated),
            Ok(None) => Err(anime_not_found()),
            Err(e) if e.is_conflict() => Err(duplicate_external_id()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, external_id: &str) -> ApiResult<AnimeDeleted> {
        if !self.anime.delete(external_id).await? {
            return Err(anime_not_found());
        }

        info!("Deleted anime {}", external_id);
        Ok(AnimeDeleted {
            message: "Anime deleted successfully".to_string(),
            external_id: external_id.to_string(),
        })
    }
}
