use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::api::RowKey;

use super::favorites::Favorites;
use super::models::{ContentDetails, ContentItem, FetchState};

/// Rows never hold more cards than this.
pub const MAX_ROW_ITEMS: usize = 15;
/// Distance moved by one press of a row's scroll control.
pub const ROW_SCROLL_STEP: i32 = 600;
/// Horizontal extent of one card in scroll units.
pub const CARD_WIDTH: u32 = 200;

/// Top-level navigation entries. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum Category {
    #[strum(serialize = "Home")]
    Home,
    #[strum(serialize = "My List")]
    MyList,
}

impl Category {
    pub fn next(self) -> Self {
        match self {
            Category::Home => Category::MyList,
            Category::MyList => Category::Home,
        }
    }
}

/// Which overlay panel is showing. Opening one panel replaces the other.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    PlayerOpen {
        item: ContentItem,
        embed_url: String,
    },
    InfoOpen {
        item: ContentItem,
        /// `None` until the detail request for `item` lands.
        details: Option<ContentDetails>,
    },
}

/// A row as laid out on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisibleRow {
    Search,
    Catalog(RowKey),
    MyList,
}

impl VisibleRow {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Search => "Search Results",
            Self::Catalog(key) => key.title(),
            Self::MyList => "My List",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRow {
    pub items: Vec<ContentItem>,
    pub fetch: FetchState,
}

/// Selection and horizontal scroll position within one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCursor {
    pub selected: usize,
    pub scroll: u32,
}

impl RowCursor {
    /// Cards a single scroll step covers.
    const PAGE_CARDS: usize = (ROW_SCROLL_STEP as u32 / CARD_WIDTH) as usize;

    /// Index of the first card in view.
    pub fn first_visible(&self) -> usize {
        (self.scroll / CARD_WIDTH) as usize
    }

    fn max_scroll(len: usize) -> u32 {
        (len.saturating_sub(1) as u32) * CARD_WIDTH
    }

    /// Scroll by `delta` units; the row stops at its ends.
    pub fn scroll_by(&mut self, delta: i32, len: usize) {
        let target = (self.scroll as i64 + delta as i64).clamp(0, Self::max_scroll(len) as i64);
        self.scroll = target as u32;

        let first = self.first_visible();
        if self.selected < first || self.selected >= first + Self::PAGE_CARDS {
            self.selected = first.min(len.saturating_sub(1));
        }
    }

    pub fn select_next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        self.selected = (self.selected + 1).min(len - 1);
        self.follow_selection(len);
    }

    pub fn select_prev(&mut self, len: usize) {
        self.selected = self.selected.saturating_sub(1);
        self.follow_selection(len);
    }

    fn follow_selection(&mut self, len: usize) {
        let first = self.first_visible();
        if self.selected < first {
            self.scroll = self.selected as u32 * CARD_WIDTH;
        } else if self.selected >= first + Self::PAGE_CARDS {
            let first = self.selected + 1 - Self::PAGE_CARDS;
            self.scroll = (first as u32 * CARD_WIDTH).min(Self::max_scroll(len));
        }
    }
}

/// Everything the UI shows, owned by the app and mutated only from its
/// action handler.
#[derive(Debug)]
pub struct AppState {
    pub category: Category,
    pub rows: BTreeMap<RowKey, CatalogRow>,
    pub search_query: Option<String>,
    pub search_results: Vec<ContentItem>,
    pub featured: Option<(ContentItem, ContentDetails)>,
    pub panel: PanelState,
    pub favorites: Favorites,
    pub focused_row: usize,
    cursors: HashMap<VisibleRow, RowCursor>,
}

impl AppState {
    pub fn new(favorites: Favorites) -> Self {
        Self {
            category: Category::Home,
            rows: RowKey::iter().map(|k| (k, CatalogRow::default())).collect(),
            search_query: None,
            search_results: Vec::new(),
            featured: None,
            panel: PanelState::Closed,
            favorites,
            focused_row: 0,
            cursors: HashMap::new(),
        }
    }

    /// Back to a fresh home view. Favorites are re-read from their store.
    pub fn reset(&mut self) {
        if let Err(e) = self.favorites.reload() {
            tracing::error!("Failed to reload favorites: {:#}", e);
        }
        self.category = Category::Home;
        self.rows = RowKey::iter().map(|k| (k, CatalogRow::default())).collect();
        self.search_query = None;
        self.search_results.clear();
        self.featured = None;
        self.panel = PanelState::Closed;
        self.focused_row = 0;
        self.cursors.clear();
    }

    pub fn mark_rows_loading(&mut self) {
        for row in self.rows.values_mut() {
            row.fetch = FetchState::Loading;
        }
    }

    pub fn apply_row(&mut self, key: RowKey, mut items: Vec<ContentItem>) {
        items.truncate(MAX_ROW_ITEMS);
        let row = self.rows.entry(key).or_default();
        row.items = items;
        row.fetch = FetchState::Loaded;
        self.cursors.remove(&VisibleRow::Catalog(key));
    }

    /// A failed row stays empty; its siblings are unaffected.
    pub fn row_failed(&mut self, key: RowKey) {
        let row = self.rows.entry(key).or_default();
        row.items.clear();
        row.fetch = FetchState::Failed;
    }

    pub fn pending_row_count(&self) -> usize {
        self.rows
            .values()
            .filter(|r| r.fetch == FetchState::Loading)
            .count()
    }

    /// Replace the search results wholesale and show the search row.
    pub fn apply_search_results(&mut self, query: String, items: Vec<ContentItem>) {
        self.search_query = Some(query);
        self.search_results = items;
        self.category = Category::Home;
        self.focused_row = 0;
        self.cursors.remove(&VisibleRow::Search);
    }

    pub fn clear_search(&mut self) {
        self.search_query = None;
        self.search_results.clear();
        self.focused_row = 0;
    }

    pub fn is_showing_search(&self) -> bool {
        self.category == Category::Home && self.search_query.is_some()
    }

    /// Activate `category`. Returns true when the home view must be reloaded.
    pub fn set_category(&mut self, category: Category) -> bool {
        self.category = category;
        self.focused_row = 0;
        match category {
            Category::MyList => {
                self.search_query = None;
                false
            }
            Category::Home => true,
        }
    }

    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        match self.category {
            Category::MyList => vec![VisibleRow::MyList],
            Category::Home if self.search_query.is_some() => vec![VisibleRow::Search],
            Category::Home => self.rows.keys().map(|k| VisibleRow::Catalog(*k)).collect(),
        }
    }

    pub fn row_items(&self, row: VisibleRow) -> &[ContentItem] {
        match row {
            VisibleRow::Search => &self.search_results,
            VisibleRow::MyList => self.favorites.items(),
            VisibleRow::Catalog(key) => self
                .rows
                .get(&key)
                .map(|r| r.items.as_slice())
                .unwrap_or(&[]),
        }
    }

    pub fn cursor(&self, row: VisibleRow) -> RowCursor {
        self.cursors.get(&row).copied().unwrap_or_default()
    }

    pub fn focused(&self) -> Option<VisibleRow> {
        self.visible_rows().get(self.focused_row).copied()
    }

    pub fn focus_next_row(&mut self) {
        let count = self.visible_rows().len();
        if count > 0 {
            self.focused_row = (self.focused_row + 1).min(count - 1);
        }
    }

    pub fn focus_prev_row(&mut self) {
        self.focused_row = self.focused_row.saturating_sub(1);
    }

    fn with_focused_cursor(&mut self, f: impl FnOnce(&mut RowCursor, usize)) {
        if let Some(row) = self.focused() {
            let len = self.row_items(row).len();
            let cursor = self.cursors.entry(row).or_default();
            f(cursor, len);
        }
    }

    pub fn select_next_card(&mut self) {
        self.with_focused_cursor(|c, len| c.select_next(len));
    }

    pub fn select_prev_card(&mut self) {
        self.with_focused_cursor(|c, len| c.select_prev(len));
    }

    pub fn scroll_focused_row(&mut self, delta: i32) {
        self.with_focused_cursor(|c, len| c.scroll_by(delta, len));
    }

    pub fn selected_item(&self) -> Option<&ContentItem> {
        let row = self.focused()?;
        self.row_items(row).get(self.cursor(row).selected)
    }

    pub fn is_favorited(&self, id: u32) -> bool {
        self.favorites.contains(id)
    }

    /// Toggle `item` in My List, persisting the result.
    pub fn toggle_favorite(&mut self, item: &ContentItem) -> Result<bool> {
        let now_favorited = self.favorites.toggle(item)?;
        // Keep the My List cursor inside the shrunken row.
        let len = self.favorites.len();
        if let Some(cursor) = self.cursors.get_mut(&VisibleRow::MyList) {
            cursor.selected = cursor.selected.min(len.saturating_sub(1));
            cursor.scroll = cursor.scroll.min(RowCursor::max_scroll(len));
        }
        Ok(now_favorited)
    }

    pub fn open_info(&mut self, item: ContentItem) {
        self.panel = PanelState::InfoOpen {
            item,
            details: None,
        };
    }

    /// Attach details to the info panel if they belong to its current item.
    /// Returns false for late responses to an item that is no longer shown.
    pub fn apply_info_details(&mut self, details: ContentDetails) -> bool {
        match &mut self.panel {
            PanelState::InfoOpen { item, details: slot } if item.id == details.item.id => {
                *slot = Some(details);
                true
            }
            _ => false,
        }
    }

    pub fn open_player(&mut self, item: ContentItem, embed_url: String) {
        self.panel = PanelState::PlayerOpen { item, embed_url };
    }

    pub fn info_item(&self) -> Option<&ContentItem> {
        match &self.panel {
            PanelState::InfoOpen { item, .. } => Some(item),
            _ => None,
        }
    }

    pub fn close_info(&mut self) {
        if matches!(self.panel, PanelState::InfoOpen { .. }) {
            self.panel = PanelState::Closed;
        }
    }

    pub fn close_all(&mut self) {
        self.panel = PanelState::Closed;
    }

    pub fn is_panel_open(&self) -> bool {
        self.panel != PanelState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::favorites::MemoryStore;
    use crate::internal::models::MediaType;

    fn item(id: u32) -> ContentItem {
        ContentItem {
            id,
            title: format!("Item {}", id),
            media_type: MediaType::Movie,
            overview: None,
            vote_average: Some(7.0),
            release_date: Some("2020-01-01".to_string()),
            poster_path: None,
            backdrop_path: None,
        }
    }

    fn details(id: u32) -> ContentDetails {
        ContentDetails {
            item: item(id),
            runtime: Some(100),
            episode_run_time: Vec::new(),
            genres: Vec::new(),
            credits: None,
            videos: None,
        }
    }

    fn state() -> AppState {
        AppState::new(Favorites::load_or_empty(Box::new(MemoryStore::new())))
    }

    #[test]
    fn test_rows_are_capped() {
        let mut state = state();
        state.apply_row(RowKey::Trending, (0..20).map(item).collect());
        assert_eq!(state.row_items(VisibleRow::Catalog(RowKey::Trending)).len(), 15);
        assert_eq!(state.rows[&RowKey::Trending].fetch, FetchState::Loaded);
    }

    #[test]
    fn test_failed_row_leaves_siblings() {
        let mut state = state();
        state.mark_rows_loading();
        state.apply_row(RowKey::Popular, vec![item(1)]);
        state.row_failed(RowKey::Horror);

        assert_eq!(state.rows[&RowKey::Horror].fetch, FetchState::Failed);
        assert_eq!(state.row_items(VisibleRow::Catalog(RowKey::Popular)).len(), 1);
        assert_eq!(state.pending_row_count(), 6);
    }

    #[test]
    fn test_opening_player_closes_info() {
        let mut state = state();
        state.open_info(item(603));
        assert_eq!(state.info_item().map(|i| i.id), Some(603));

        state.open_player(item(603), "https://vidsrc.xyz/embed/movie/603".to_string());
        assert!(state.info_item().is_none());
        assert!(matches!(state.panel, PanelState::PlayerOpen { .. }));

        state.open_info(item(1));
        assert!(!matches!(state.panel, PanelState::PlayerOpen { .. }));
    }

    #[test]
    fn test_close_all_is_unconditional() {
        let mut state = state();
        state.close_all();
        assert_eq!(state.panel, PanelState::Closed);

        state.open_player(item(1), String::new());
        state.close_info();
        assert!(state.is_panel_open());
        state.close_all();
        assert!(!state.is_panel_open());
    }

    #[test]
    fn test_late_details_are_ignored() {
        let mut state = state();
        state.open_info(item(1));
        state.open_info(item(2));

        assert!(!state.apply_info_details(details(1)));
        assert!(state.apply_info_details(details(2)));
        assert!(matches!(
            &state.panel,
            PanelState::InfoOpen { details: Some(d), .. } if d.item.id == 2
        ));
    }

    #[test]
    fn test_toggle_favorite_scenario() {
        let mut state = state();
        assert!(state.favorites.is_empty());

        assert!(state.toggle_favorite(&item(603)).unwrap());
        assert_eq!(state.favorites.len(), 1);
        assert!(state.is_favorited(603));

        assert!(!state.toggle_favorite(&item(603)).unwrap());
        assert_eq!(state.favorites.len(), 0);
    }

    #[test]
    fn test_category_switch() {
        let mut state = state();
        assert!(!state.set_category(Category::MyList));
        assert_eq!(state.visible_rows(), vec![VisibleRow::MyList]);
        assert!(state.set_category(Category::Home));
        assert_eq!(state.visible_rows().len(), 8);
    }

    #[test]
    fn test_search_hides_catalog_rows() {
        let mut state = state();
        state.apply_search_results("matrix".to_string(), vec![item(603)]);
        assert_eq!(state.visible_rows(), vec![VisibleRow::Search]);
        assert_eq!(state.selected_item().map(|i| i.id), Some(603));

        state.clear_search();
        assert_eq!(state.visible_rows().len(), 8);
    }

    #[test]
    fn test_scroll_clamps_to_row_ends() {
        let mut cursor = RowCursor::default();
        cursor.scroll_by(-ROW_SCROLL_STEP, 15);
        assert_eq!(cursor.scroll, 0);

        cursor.scroll_by(ROW_SCROLL_STEP, 15);
        assert_eq!(cursor.scroll, 600);
        assert_eq!(cursor.first_visible(), 3);
        assert_eq!(cursor.selected, 3);

        for _ in 0..10 {
            cursor.scroll_by(ROW_SCROLL_STEP, 15);
        }
        assert_eq!(cursor.scroll, 14 * CARD_WIDTH);
    }

    #[test]
    fn test_selection_follows_into_view() {
        let mut cursor = RowCursor::default();
        for _ in 0..4 {
            cursor.select_next(15);
        }
        assert_eq!(cursor.selected, 4);
        assert_eq!(cursor.first_visible(), 2);

        for _ in 0..4 {
            cursor.select_prev(15);
        }
        assert_eq!(cursor.selected, 0);
        assert_eq!(cursor.scroll, 0);
    }

    #[test]
    fn test_reset_rereads_favorites() {
        let store = MemoryStore::new();
        let mut state = AppState::new(Favorites::load_or_empty(Box::new(store.clone())));
        state.toggle_favorite(&item(7)).unwrap();
        state.apply_search_results("x".to_string(), vec![item(1)]);
        state.set_category(Category::MyList);

        state.reset();
        assert_eq!(state.category, Category::Home);
        assert!(state.search_query.is_none());
        assert!(state.is_favorited(7));
    }
}
