use crate::config::CatalogConfig;
use crate::internal::cache::Cache;
use crate::internal::models::{ContentDetails, ContentItem, MediaType, ResultPage};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// Failure of a single catalog request. Callers log these and treat the
/// affected row or panel as empty; nothing is retried.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("request to {endpoint} failed: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        endpoint: String,
        status: reqwest::StatusCode,
    },
    #[error("unexpected response shape from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Genres offered as discovery rows, with their catalog ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Comedy,
    Horror,
    Romance,
    Documentary,
}

impl Genre {
    pub fn id(&self) -> u32 {
        match self {
            Self::Action => 28,
            Self::Comedy => 35,
            Self::Horror => 27,
            Self::Romance => 10749,
            Self::Documentary => 99,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TimeWindow {
    #[strum(serialize = "day")]
    Day,
    #[strum(serialize = "week")]
    Week,
}

/// Sub-resources that can be folded into a detail response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DetailExpansion {
    #[strum(serialize = "videos")]
    Videos,
    #[strum(serialize = "credits")]
    Credits,
}

/// The rows shown on the home view, in display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize, Deserialize,
)]
pub enum RowKey {
    Trending,
    Popular,
    TopRated,
    Action,
    Comedy,
    Horror,
    Romance,
    Documentary,
}

impl RowKey {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Trending => "Trending Now",
            Self::Popular => "Popular on Flix",
            Self::TopRated => "Top Rated",
            Self::Action => "Action",
            Self::Comedy => "Comedy",
            Self::Horror => "Horror",
            Self::Romance => "Romance",
            Self::Documentary => "Documentaries",
        }
    }

    pub fn genre(&self) -> Option<Genre> {
        match self {
            Self::Action => Some(Genre::Action),
            Self::Comedy => Some(Genre::Comedy),
            Self::Horror => Some(Genre::Horror),
            Self::Romance => Some(Genre::Romance),
            Self::Documentary => Some(Genre::Documentary),
            Self::Trending | Self::Popular | Self::TopRated => None,
        }
    }

    /// Endpoint path and extra query parameters for this row.
    pub fn request(&self) -> (String, Vec<(&'static str, String)>) {
        let media = MediaType::Movie;
        match (self, self.genre()) {
            (_, Some(genre)) => (
                discover_endpoint(media),
                vec![("with_genres", genre.id().to_string())],
            ),
            (Self::Trending, None) => (trending_endpoint(media, TimeWindow::Week), Vec::new()),
            (Self::Popular, None) => (format!("{}/popular", media.as_api_str()), Vec::new()),
            (_, None) => (format!("{}/top_rated", media.as_api_str()), Vec::new()),
        }
    }
}

pub fn trending_endpoint(media: MediaType, window: TimeWindow) -> String {
    format!("trending/{}/{}", media.as_api_str(), window)
}

pub fn discover_endpoint(media: MediaType) -> String {
    format!("discover/{}", media.as_api_str())
}

pub fn details_endpoint(media: MediaType, id: u32) -> String {
    format!("{}/{}", media.as_api_str(), id)
}

/// Full image URL for a catalog artwork path, e.g. size `w500` or `original`.
pub fn image_url(image_base_url: &str, size: &str, path: &str) -> String {
    format!("{}/{}{}", image_base_url.trim_end_matches('/'), size, path)
}

type DetailsKey = (MediaType, u32, Vec<DetailExpansion>);

/// Read-only client for the movie/TV catalog API.
///
/// Every request carries the `api_key` query parameter. Responses are decoded
/// from text so a shape mismatch is reported as `CatalogError::Decode` rather
/// than being folded into a transport error.
#[derive(Clone)]
pub struct CatalogClient {
    client: Client,
    base_url: String,
    api_key: String,
    details_cache: Cache<DetailsKey, ContentDetails>,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig, enable_metrics: bool) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                Client::new()
            });

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            details_cache: Cache::with_metrics(Duration::from_secs(300), enable_metrics),
        }
    }

    /// Client pointed at an arbitrary server, used against mock servers.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let config = CatalogConfig {
            base_url: base_url.into(),
            api_key: api_key.into(),
            ..CatalogConfig::default()
        };
        Self::new(&config, false)
    }

    /// Issue one GET and decode the body as `T`.
    async fn get_json<T>(&self, endpoint: &str, params: &[(&str, String)]) -> Result<T, CatalogError>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut query: Vec<(&str, &str)> = vec![("api_key", self.api_key.as_str())];
        query.extend(params.iter().map(|(k, v)| (*k, v.as_str())));

        let start = std::time::Instant::now();
        let network = |source| CatalogError::Network {
            endpoint: endpoint.to_string(),
            source,
        };

        let resp = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(network)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(CatalogError::Status {
                endpoint: endpoint.to_string(),
                status,
            });
        }

        let body = resp.text().await.map_err(network)?;
        tracing::debug!(endpoint, elapsed = ?start.elapsed(), bytes = body.len(), "catalog.get");

        serde_json::from_str(&body).map_err(|source| CatalogError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }

    /// Fetch any list endpoint returning `{ results: [...] }`.
    pub async fn fetch_results(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<ContentItem>, CatalogError> {
        let page: ResultPage = self.get_json(endpoint, params).await?;
        Ok(page.results)
    }

    pub async fn fetch_trending(
        &self,
        media: MediaType,
        window: TimeWindow,
    ) -> Result<Vec<ContentItem>, CatalogError> {
        self.fetch_results(&trending_endpoint(media, window), &[])
            .await
    }

    pub async fn fetch_popular(&self, media: MediaType) -> Result<Vec<ContentItem>, CatalogError> {
        self.fetch_results(&format!("{}/popular", media.as_api_str()), &[])
            .await
    }

    pub async fn fetch_top_rated(
        &self,
        media: MediaType,
    ) -> Result<Vec<ContentItem>, CatalogError> {
        self.fetch_results(&format!("{}/top_rated", media.as_api_str()), &[])
            .await
    }

    pub async fn discover(
        &self,
        media: MediaType,
        genre: Genre,
    ) -> Result<Vec<ContentItem>, CatalogError> {
        self.fetch_results(
            &discover_endpoint(media),
            &[("with_genres", genre.id().to_string())],
        )
        .await
    }

    pub async fn fetch_row(&self, row: RowKey) -> Result<Vec<ContentItem>, CatalogError> {
        let (endpoint, params) = row.request();
        self.fetch_results(&endpoint, &params).await
    }

    /// Multi-type search. People and other non-playable kinds are dropped.
    pub async fn search(&self, query: &str) -> Result<Vec<ContentItem>, CatalogError> {
        let results = self
            .fetch_results(
                "search/multi",
                &[("query", query.to_string()), ("page", "1".to_string())],
            )
            .await?;

        Ok(results
            .into_iter()
            .filter(|item| item.media_type.is_playable())
            .collect())
    }

    /// Single item with optional sub-resources folded in.
    pub async fn fetch_details(
        &self,
        media: MediaType,
        id: u32,
        expansions: &[DetailExpansion],
    ) -> Result<ContentDetails, CatalogError> {
        let key = (media, id, expansions.to_vec());
        if let Some(details) = self.details_cache.get(&key) {
            return Ok(details);
        }

        let params = match expansions.is_empty() {
            true => Vec::new(),
            false => {
                let joined = expansions
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(",");
                vec![("append_to_response", joined)]
            }
        };

        let mut details: ContentDetails = self
            .get_json(&details_endpoint(media, id), &params)
            .await?;
        // Detail records never carry media_type; keep the one we asked for.
        if media.is_playable() {
            details.item.media_type = media;
        }

        self.details_cache.set(key, details.clone());
        tracing::debug!(id, cached = self.details_cache.len(), "details cached");
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_genre_ids() {
        assert_eq!(Genre::Action.id(), 28);
        assert_eq!(Genre::Comedy.id(), 35);
        assert_eq!(Genre::Horror.id(), 27);
        assert_eq!(Genre::Romance.id(), 10749);
        assert_eq!(Genre::Documentary.id(), 99);
    }

    #[test]
    fn test_row_requests() {
        assert_eq!(
            RowKey::Trending.request(),
            ("trending/movie/week".to_string(), Vec::new())
        );
        assert_eq!(RowKey::Popular.request().0, "movie/popular");
        assert_eq!(RowKey::TopRated.request().0, "movie/top_rated");
        assert_eq!(
            RowKey::Romance.request(),
            (
                "discover/movie".to_string(),
                vec![("with_genres", "10749".to_string())]
            )
        );
        assert_eq!(RowKey::iter().count(), 8);
    }

    #[test]
    fn test_endpoint_helpers() {
        assert_eq!(details_endpoint(MediaType::Tv, 1399), "tv/1399");
        assert_eq!(
            trending_endpoint(MediaType::Tv, TimeWindow::Day),
            "trending/tv/day"
        );
        assert_eq!(
            image_url("https://image.tmdb.org/t/p/", "w500", "/a.jpg"),
            "https://image.tmdb.org/t/p/w500/a.jpg"
        );
    }

    #[tokio::test]
    async fn test_fetch_results_sends_api_key_and_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/discover/movie")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("api_key".into(), "secret".into()),
                mockito::Matcher::UrlEncoded("with_genres".into(), "28".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": [{"id": 1, "title": "Heat"}]}"#)
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(server.url(), "secret");
        let items = client.discover(MediaType::Movie, Genre::Action).await.unwrap();

        mock.assert_async().await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Heat");
    }

    #[tokio::test]
    async fn test_search_filters_people() {
        let mut server = mockito::Server::new_async().await;
        let body = r#"{"results": [
            {"id": 603, "title": "The Matrix", "media_type": "movie"},
            {"id": 6384, "name": "Keanu Reeves", "media_type": "person"},
            {"id": 1399, "name": "Game of Thrones", "media_type": "tv"}
        ]}"#;
        let mock = server
            .mock("GET", "/search/multi")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("query".into(), "the matrix".into()),
                mockito::Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(server.url(), "k");
        let items = client.search("the matrix").await.unwrap();

        mock.assert_async().await;
        let ids: Vec<u32> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![603, 1399]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/movie/popular")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body(r#"{"status_message": "Invalid API key"}"#)
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(server.url(), "bad");
        let err = client.fetch_popular(MediaType::Movie).await.unwrap_err();
        assert!(matches!(err, CatalogError::Status { status, .. } if status.as_u16() == 401));
    }

    #[tokio::test]
    async fn test_bad_shape_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/movie/top_rated")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(server.url(), "k");
        let err = client.fetch_top_rated(MediaType::Movie).await.unwrap_err();
        assert!(matches!(err, CatalogError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let client = CatalogClient::with_base_url("http://127.0.0.1:1", "k");
        let err = client.fetch_row(RowKey::Trending).await.unwrap_err();
        assert!(matches!(err, CatalogError::Network { .. }));
    }

    #[tokio::test]
    async fn test_details_are_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/tv/1399")
            .match_query(mockito::Matcher::UrlEncoded(
                "append_to_response".into(),
                "credits".into(),
            ))
            .with_status(200)
            .with_body(r#"{"id": 1399, "name": "Game of Thrones", "episode_run_time": [60]}"#)
            .expect(1)
            .create_async()
            .await;

        let client = CatalogClient::with_base_url(server.url(), "k");
        let first = client
            .fetch_details(MediaType::Tv, 1399, &[DetailExpansion::Credits])
            .await
            .unwrap();
        let second = client
            .fetch_details(MediaType::Tv, 1399, &[DetailExpansion::Credits])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(first, second);
        assert_eq!(first.item.media_type, MediaType::Tv);
        assert_eq!(first.episode_run_time, vec![60]);
    }
}
