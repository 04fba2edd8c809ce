//! Pure data -> view transforms. Nothing here touches the terminal, so every
//! string the renderer shows can be checked directly in tests.

use crate::api::image_url;
use crate::internal::models::{ContentDetails, ContentItem};
use crate::internal::state::MAX_ROW_ITEMS;
use crate::utils::text::{leading_year, truncate_chars};

pub const NOT_AVAILABLE: &str = "N/A";
pub const NO_DESCRIPTION: &str = "No description available.";
pub const HERO_DESCRIPTION_LIMIT: usize = 200;
pub const TOP_CAST: usize = 5;

/// `"★ 8.2"`, or `"N/A"` for a missing (or zero) rating.
pub fn format_rating(vote_average: Option<f64>) -> String {
    match vote_average {
        Some(rating) if rating != 0.0 => format!("★ {:.1}", rating),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Year part of a release/air date, or `"N/A"`.
pub fn format_year(date: Option<&str>) -> String {
    date.and_then(leading_year)
        .unwrap_or(NOT_AVAILABLE)
        .to_string()
}

pub fn truncate_description(description: &str) -> String {
    truncate_chars(description, HERO_DESCRIPTION_LIMIT)
}

/// `"136 min"` for movies, `"60 min/ep"` for shows, empty when unknown.
pub fn format_runtime(details: &ContentDetails) -> String {
    match (details.runtime, details.episode_run_time.first()) {
        (Some(minutes), _) if minutes > 0 => format!("{} min", minutes),
        (_, Some(minutes)) => format!("{} min/ep", minutes),
        _ => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub id: u32,
    pub title: String,
    pub rating: String,
    pub year: String,
    pub image_url: Option<String>,
}

impl CardView {
    pub fn from_item(item: &ContentItem, image_base_url: &str) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
            rating: format_rating(item.vote_average),
            year: format_year(item.release_date.as_deref()),
            image_url: item
                .artwork_path()
                .map(|path| image_url(image_base_url, "w500", path)),
        }
    }
}

/// Cards for one row, at most `MAX_ROW_ITEMS` of them.
pub fn row_cards(items: &[ContentItem], image_base_url: &str) -> Vec<CardView> {
    items
        .iter()
        .take(MAX_ROW_ITEMS)
        .map(|item| CardView::from_item(item, image_base_url))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeroView {
    pub title: String,
    pub rating: String,
    pub year: String,
    pub runtime: Option<String>,
    pub description: String,
    pub background_url: Option<String>,
}

impl HeroView {
    pub fn new(item: &ContentItem, details: &ContentDetails, image_base_url: &str) -> Self {
        let runtime = format_runtime(details);
        Self {
            title: item.title.clone(),
            rating: format_rating(item.vote_average),
            year: format_year(item.release_date.as_deref()),
            runtime: (!runtime.is_empty()).then_some(runtime),
            description: truncate_description(item.overview.as_deref().unwrap_or_default()),
            background_url: item
                .artwork_path()
                .map(|path| image_url(image_base_url, "original", path)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    pub title: String,
    pub rating: String,
    pub year: String,
    pub runtime: String,
    pub description: String,
    pub cast: String,
    pub genres: String,
    pub background_url: Option<String>,
    pub trailer_url: Option<String>,
}

impl DetailView {
    pub fn new(details: &ContentDetails, image_base_url: &str) -> Self {
        let item = &details.item;

        let cast = details
            .credits
            .as_ref()
            .map(|credits| {
                credits
                    .cast
                    .iter()
                    .take(TOP_CAST)
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .filter(|cast| !cast.is_empty())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let genres = match details.genres.is_empty() {
            true => NOT_AVAILABLE.to_string(),
            false => details
                .genres
                .iter()
                .map(|g| g.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        };

        Self {
            title: item.title.clone(),
            rating: format_rating(item.vote_average),
            year: format_year(item.release_date.as_deref()),
            runtime: format_runtime(details),
            description: item
                .overview
                .clone()
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            cast,
            genres,
            background_url: item
                .artwork_path()
                .map(|path| image_url(image_base_url, "original", path)),
            trailer_url: details
                .trailer()
                .map(|v| format!("https://www.youtube.com/watch?v={}", v.key)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub title: String,
    pub year: String,
    pub rating: String,
    pub description: String,
    pub embed_url: String,
}

impl PlayerView {
    pub fn new(item: &ContentItem, embed_url: &str) -> Self {
        Self {
            title: item.title.clone(),
            year: format_year(item.release_date.as_deref()),
            rating: format_rating(item.vote_average),
            description: item
                .overview
                .clone()
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            embed_url: embed_url.to_string(),
        }
    }
}

/// The two fixed looks of the My List toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FavoriteToggleView {
    pub icon: &'static str,
    pub label: &'static str,
    pub hint: &'static str,
}

impl FavoriteToggleView {
    pub fn new(is_favorited: bool) -> Self {
        match is_favorited {
            true => Self {
                icon: "✓",
                label: "In My List",
                hint: "Remove from My List",
            },
            false => Self {
                icon: "+",
                label: "My List",
                hint: "Add to My List",
            },
        }
    }
}
