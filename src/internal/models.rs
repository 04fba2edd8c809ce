use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Kind of catalog entry. Anything that is neither a movie nor a show
/// (e.g. people returned by multi search) decodes as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    #[strum(serialize = "movie")]
    Movie,
    #[strum(serialize = "tv")]
    Tv,
    #[serde(other)]
    #[strum(serialize = "other")]
    Other,
}

impl MediaType {
    /// Path segment used by the catalog API for this media type.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Self::Tv => "tv",
            // Unknown kinds are looked up as movies, same as the player does.
            Self::Movie | Self::Other => "movie",
        }
    }

    pub fn is_playable(&self) -> bool {
        matches!(self, Self::Movie | Self::Tv)
    }
}

/// Wire shape shared by list and detail endpoints. Movies carry `title` and
/// `release_date`, shows carry `name` and `first_air_date`.
#[derive(Debug, Deserialize)]
struct RawContentItem {
    id: u32,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    media_type: Option<MediaType>,
    #[serde(default)]
    overview: Option<String>,
    #[serde(default)]
    vote_average: Option<f64>,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    first_air_date: Option<String>,
    #[serde(default)]
    poster_path: Option<String>,
    #[serde(default)]
    backdrop_path: Option<String>,
}

impl From<RawContentItem> for ContentItem {
    fn from(raw: RawContentItem) -> Self {
        let media_type = match (raw.media_type, &raw.title, &raw.name) {
            (Some(media_type), _, _) => media_type,
            (None, Some(_), _) => MediaType::Movie,
            (None, None, Some(_)) => MediaType::Tv,
            (None, None, None) => MediaType::Movie,
        };

        Self {
            id: raw.id,
            title: raw.title.or(raw.name).unwrap_or_default(),
            media_type,
            overview: raw.overview.filter(|o| !o.is_empty()),
            vote_average: raw.vote_average,
            release_date: raw
                .release_date
                .or(raw.first_air_date)
                .filter(|d| !d.is_empty()),
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
        }
    }
}

/// A single movie or show as returned by the catalog.
///
/// Serializes with the catalog's own field names so the favorites file can be
/// decoded through the same path as API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawContentItem")]
pub struct ContentItem {
    pub id: u32,
    pub title: String,
    pub media_type: MediaType,
    pub overview: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
}

impl ContentItem {
    /// Backdrop if present, poster otherwise.
    pub fn artwork_path(&self) -> Option<&str> {
        self.backdrop_path
            .as_deref()
            .or(self.poster_path.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GenreName {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Video {
    pub key: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Videos {
    #[serde(default)]
    pub results: Vec<Video>,
}

/// Detail endpoint record: the list fields plus the extended ones.
/// `credits` and `videos` are only present when requested through
/// `append_to_response`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentDetails {
    #[serde(flatten)]
    pub item: ContentItem,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    #[serde(default)]
    pub genres: Vec<GenreName>,
    #[serde(default)]
    pub credits: Option<Credits>,
    #[serde(default)]
    pub videos: Option<Videos>,
}

impl ContentDetails {
    /// Details carrying only what the list record already had.
    pub fn from_item(item: ContentItem) -> Self {
        Self {
            item,
            runtime: None,
            episode_run_time: Vec::new(),
            genres: Vec::new(),
            credits: None,
            videos: None,
        }
    }

    pub fn trailer(&self) -> Option<&Video> {
        self.videos
            .as_ref()?
            .results
            .iter()
            .find(|v| v.site == "YouTube" && v.kind == "Trailer")
    }
}

/// `{ "results": [...] }` envelope used by every list endpoint.
#[derive(Debug, Deserialize)]
pub struct ResultPage {
    #[serde(default)]
    pub results: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}
