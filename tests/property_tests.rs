use proptest::prelude::*;
use tui_flix::config::AppConfig;
use tui_flix::internal::favorites::{Favorites, MemoryStore};
use tui_flix::internal::models::{ContentItem, MediaType};
use tui_flix::internal::playback::embed_url;
use tui_flix::internal::state::RowCursor;
use tui_flix::internal::ui::view_model::{
    HERO_DESCRIPTION_LIMIT, format_rating, format_year, truncate_description,
};

fn item(id: u32) -> ContentItem {
    ContentItem {
        id,
        title: format!("Title {id}"),
        media_type: MediaType::Movie,
        overview: None,
        vote_average: None,
        release_date: None,
        poster_path: None,
        backdrop_path: None,
    }
}

proptest! {
    #[test]
    fn test_truncate_description_bounds(s in "\\PC{0,400}") {
        let out = truncate_description(&s);
        let len = s.chars().count();

        if len <= HERO_DESCRIPTION_LIMIT {
            prop_assert_eq!(out, s);
        } else {
            prop_assert_eq!(out.chars().count(), HERO_DESCRIPTION_LIMIT + 3);
            prop_assert!(out.ends_with("..."));
            let kept: String = s.chars().take(HERO_DESCRIPTION_LIMIT).collect();
            prop_assert!(out.starts_with(&kept));
        }
    }

    #[test]
    fn test_year_is_leading_segment(year in "[0-9]{4}", rest in "-[0-9]{2}-[0-9]{2}") {
        let date = format!("{year}{rest}");
        prop_assert_eq!(format_year(Some(&date)), year);
    }

    #[test]
    fn test_rating_has_one_decimal(rating in 0.1f64..10.0) {
        let out = format_rating(Some(rating));
        prop_assert!(out.starts_with("★ "));
        let digits = out.trim_start_matches("★ ");
        let (_, decimals) = digits.split_once('.').unwrap();
        prop_assert_eq!(decimals.len(), 1);
    }

    #[test]
    fn test_double_toggle_restores_list(
        existing in prop::collection::btree_set(1u32..500, 0..10),
        id in 1u32..500,
    ) {
        let seeded: Vec<ContentItem> = existing.iter().copied().map(item).collect();
        let store = MemoryStore::with_items(seeded.clone());
        let mut favorites = Favorites::load_or_empty(Box::new(store));

        favorites.toggle(&item(id)).unwrap();
        favorites.toggle(&item(id)).unwrap();

        let after: Vec<u32> = favorites.items().iter().map(|i| i.id).collect();
        let before: Vec<u32> = seeded.iter().map(|i| i.id).collect();
        if existing.contains(&id) {
            // Removed then re-added at the end.
            prop_assert_eq!(after.len(), before.len());
            prop_assert_eq!(after.last().copied(), Some(id));
        } else {
            prop_assert_eq!(after, before);
        }
    }

    #[test]
    fn test_favorites_never_hold_duplicates(ids in prop::collection::vec(1u32..20, 0..40)) {
        let mut favorites = Favorites::load_or_empty(Box::new(MemoryStore::new()));
        for id in &ids {
            favorites.toggle(&item(*id)).unwrap();
        }

        let mut seen = std::collections::HashSet::new();
        for fav in favorites.items() {
            prop_assert!(seen.insert(fav.id));
        }
    }

    #[test]
    fn test_row_scroll_stays_in_bounds(
        steps in prop::collection::vec(prop_oneof![Just(600i32), Just(-600i32)], 0..30),
        len in 0usize..20,
    ) {
        let mut cursor = RowCursor::default();
        for delta in steps {
            cursor.scroll_by(delta, len);
            prop_assert!(cursor.first_visible() <= len.saturating_sub(1));
        }
    }

    #[test]
    fn test_embed_url_shape(id in 1u32..1_000_000) {
        let mut show = item(id);
        show.media_type = MediaType::Tv;
        prop_assert_eq!(
            embed_url("https://vidsrc.xyz/embed", &show),
            format!("https://vidsrc.xyz/embed/tv/{id}/1/1")
        );
        prop_assert_eq!(
            embed_url("https://vidsrc.xyz/embed/", &item(id)),
            format!("https://vidsrc.xyz/embed/movie/{id}")
        );
    }

    #[test]
    fn test_config_parsing_resilience(s in "\\PC*") {
        // Fuzz the config loader with random strings
        // It should return an Err, but not panic
        let _ = ron::from_str::<AppConfig>(&s);
    }
}
