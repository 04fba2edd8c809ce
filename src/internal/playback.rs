use super::models::{ContentItem, MediaType};

/// Shows always start at the first episode; there is no season picker.
pub const DEFAULT_SEASON: u32 = 1;
pub const DEFAULT_EPISODE: u32 = 1;

/// Embed URL for an item: `{base}/tv/{id}/1/1` for shows,
/// `{base}/movie/{id}` for everything else.
pub fn embed_url(embed_base_url: &str, item: &ContentItem) -> String {
    let base = embed_base_url.trim_end_matches('/');
    match item.media_type {
        MediaType::Tv => format!(
            "{}/tv/{}/{}/{}",
            base, item.id, DEFAULT_SEASON, DEFAULT_EPISODE
        ),
        MediaType::Movie | MediaType::Other => format!("{}/movie/{}", base, item.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32, media_type: MediaType) -> ContentItem {
        ContentItem {
            id,
            title: String::new(),
            media_type,
            overview: None,
            vote_average: None,
            release_date: None,
            poster_path: None,
            backdrop_path: None,
        }
    }

    #[test]
    fn test_tv_starts_at_first_episode() {
        assert_eq!(
            embed_url("https://vidsrc.xyz/embed", &item(1399, MediaType::Tv)),
            "https://vidsrc.xyz/embed/tv/1399/1/1"
        );
    }

    #[test]
    fn test_movie_url() {
        assert_eq!(
            embed_url("https://vidsrc.xyz/embed/", &item(603, MediaType::Movie)),
            "https://vidsrc.xyz/embed/movie/603"
        );
    }

    #[test]
    fn test_unknown_kind_plays_as_movie() {
        assert!(embed_url("http://x", &item(9, MediaType::Other)).ends_with("/movie/9"));
    }
}
