use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tokio::sync::mpsc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};

use crate::api::{CatalogClient, DetailExpansion, RowKey, TimeWindow};
use crate::config::AppConfig;
use crate::internal::favorites::{Favorites, JsonFileStore, MemoryStore};
use crate::internal::models::{ContentDetails, ContentItem, MediaType};
use crate::internal::notification::Notification;
use crate::internal::playback;
use crate::internal::search::SearchDebouncer;
use crate::internal::state::{AppState, Category, PanelState, ROW_SCROLL_STEP};
use crate::internal::ui::keybindings::{KeyBindingContext, KeyBindingMap};
use crate::utils::theme::TuiTheme;

use ratatui::Frame;

/// Shown when every request of the initial load failed.
pub const LOAD_FAILED_MESSAGE: &str =
    "Failed to load content. Please check your API key configuration.";

/// The hero banner picks from this many leading trending items.
pub const FEATURED_POOL: usize = 5;

/// Input modes for the UI.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum InputMode {
    Normal,
    Search,
}

/// Actions/messages sent through the app action channel.
///
/// Unit-like variants can be bound to keys in `config.ron`; the skipped ones
/// only ever come from background tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Quit,
    NavigateUp,
    NavigateDown,
    NavigateLeft,
    NavigateRight,
    ScrollRowLeft,
    ScrollRowRight,
    OpenInfo,
    InfoFeatured,
    PlayFeatured,
    PlayInfoItem,
    OpenPlayerInBrowser,
    ToggleFavorite,
    CloseAll,
    SwitchCategory(Category),
    NextCategory,
    EnterSearch,
    LoadHome,
    #[serde(skip)]
    FeaturedLoaded {
        generation: u64,
        item: Box<ContentItem>,
        details: Box<ContentDetails>,
    },
    #[serde(skip)]
    FeaturedFailed { generation: u64 },
    #[serde(skip)]
    RowLoaded {
        generation: u64,
        key: RowKey,
        items: Vec<ContentItem>,
    },
    #[serde(skip)]
    RowFailed { generation: u64, key: RowKey },
    #[serde(skip)]
    SearchCompleted {
        seq: u64,
        query: String,
        items: Vec<ContentItem>,
    },
    #[serde(skip)]
    SearchFailed { seq: u64 },
    #[serde(skip)]
    InfoDetailsLoaded(Box<ContentDetails>),
    #[serde(skip)]
    InfoDetailsFailed { id: u32 },
}

/// Bookkeeping for one round of home requests (featured + every row).
#[derive(Debug, Clone, Default)]
pub struct HomeLoad {
    pub generation: u64,
    pub pending: usize,
    pub failed: usize,
    pub featured_loading: bool,
}

impl HomeLoad {
    fn start(generation: u64) -> Self {
        Self {
            generation,
            pending: RowKey::iter().count() + 1,
            failed: 0,
            featured_loading: true,
        }
    }

    fn record(&mut self, ok: bool) {
        self.pending = self.pending.saturating_sub(1);
        if !ok {
            self.failed += 1;
        }
    }

    /// True once the last response is in and none of them succeeded.
    pub fn all_failed(&self) -> bool {
        self.pending == 0 && self.failed == RowKey::iter().count() + 1
    }
}

/// Uniform pick among the first `FEATURED_POOL` items.
pub fn pick_featured<R: Rng + ?Sized>(items: &[ContentItem], rng: &mut R) -> Option<ContentItem> {
    let pool = items.len().min(FEATURED_POOL);
    match pool {
        0 => None,
        n => items.get(rng.random_range(0..n)).cloned(),
    }
}

/// Trending list, then details for a random pick. The two requests are
/// sequential since the second needs the first's id.
async fn load_featured(client: &CatalogClient) -> Result<(ContentItem, ContentDetails)> {
    let trending = client
        .fetch_trending(MediaType::Movie, TimeWindow::Week)
        .await
        .context("Failed to fetch trending list")?;

    let item = {
        let mut rng = rand::rng();
        pick_featured(&trending, &mut rng)
    }
    .context("Trending list was empty")?;

    let details = client
        .fetch_details(MediaType::Movie, item.id, &[DetailExpansion::Videos])
        .await
        .with_context(|| format!("Failed to fetch details for featured {}", item.id))?;

    Ok((item, details))
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub app_version: String,
    pub state: AppState,
    pub client: Arc<CatalogClient>,
    pub config: AppConfig,
    pub theme: TuiTheme,
    pub notification: Option<Notification>,
    pub spinner_state: usize,
    pub last_spinner_update: Option<tokio::time::Instant>,
    pub input_mode: InputMode,
    pub search_input: String,
    pub debouncer: SearchDebouncer,
    pub home_load: HomeLoad,
    pub keybindings: KeyBindingMap,
    pub action_tx: UnboundedSender<Action>,
    pub action_rx: UnboundedReceiver<Action>,
}

impl App {
    pub fn new() -> Self {
        Self::with_config(AppConfig::load())
    }

    /// Build the app for an already-loaded config, with the on-disk
    /// favorites file.
    #[tracing::instrument(skip(config))]
    pub fn with_config(config: AppConfig) -> Self {
        let start = std::time::Instant::now();
        let client = CatalogClient::new(&config.catalog, config.logging.enable_performance_metrics);

        let favorites = match JsonFileStore::in_config_dir() {
            Ok(store) => {
                tracing::info!(path = %store.path().display(), "Using favorites file");
                Favorites::load_or_empty(Box::new(store))
            }
            Err(e) => {
                tracing::error!("Favorites will not persist this session: {:#}", e);
                Favorites::load_or_empty(Box::new(MemoryStore::new()))
            }
        };

        let app = Self::with_parts(config, client, favorites);
        tracing::info!(elapsed = ?start.elapsed(), "App initialized");
        app
    }

    /// Assemble an app from already-built parts, without touching the
    /// filesystem or environment.
    pub fn with_parts(config: AppConfig, client: CatalogClient, favorites: Favorites) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let mut keybindings =
            crate::internal::ui::keybindings_default::create_default_keybindings();
        if let Some(custom_bindings) = &config.keybindings {
            keybindings.merge_config(custom_bindings);
        }

        let debouncer = SearchDebouncer::new(Duration::from_millis(config.search.debounce_ms));

        Self {
            running: true,
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            state: AppState::new(favorites),
            client: Arc::new(client),
            config,
            theme: TuiTheme::default(),
            notification: None,
            spinner_state: 0,
            last_spinner_update: None,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            debouncer,
            home_load: HomeLoad::default(),
            keybindings,
            action_tx,
            action_rx,
        }
    }

    pub fn notify_info(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification::info(message));
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notification = Some(Notification::error(message));
    }

    pub fn clear_notification(&mut self) {
        self.notification = None;
    }

    pub async fn run(&mut self, mut tui: crate::tui::Tui) -> Result<()> {
        let _ = self.action_tx.send(Action::LoadHome);

        let mut event_interval = tokio::time::interval(Duration::from_millis(16));

        loop {
            let now = tokio::time::Instant::now();
            match self.last_spinner_update {
                Some(last_update) => {
                    if now.duration_since(last_update).as_millis() >= 100 {
                        self.spinner_state = self.spinner_state.wrapping_add(1);
                        self.last_spinner_update = Some(now);
                    }
                }
                None => {
                    self.last_spinner_update = Some(now);
                }
            }

            if let Some(notification) = &self.notification
                && notification.should_dismiss()
            {
                self.clear_notification();
            }

            tui.draw(|f| self.ui(f))?;

            tokio::select! {
                _ = event_interval.tick() => {
                    if event::poll(Duration::from_millis(0))?
                        && let Event::Key(key) = event::read()?
                            && key.kind == KeyEventKind::Press {
                                self.handle_key_event(key);
                            }
                }
                Some(action) = self.action_rx.recv() => {
                    self.handle_action(action).await;
                }
            }

            if !self.running {
                break;
            }
        }
        Ok(())
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        // A blocking alert swallows everything until acknowledged.
        if let Some(notification) = &self.notification
            && notification.is_blocking()
        {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.clear_notification();
            }
            return;
        }

        match self.input_mode {
            InputMode::Search => self.handle_search_input(key),
            InputMode::Normal => self.handle_normal_input(key),
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.schedule_search();
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.schedule_search();
            }
            KeyCode::Enter | KeyCode::Down => {
                self.input_mode = InputMode::Normal;
            }
            KeyCode::Esc => {
                self.search_input.clear();
                self.debouncer.cancel_pending();
                self.state.clear_search();
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    /// Restart the debounce timer for the current input.
    fn schedule_search(&mut self) {
        let client = Arc::clone(&self.client);
        let tx = self.action_tx.clone();

        self.debouncer.schedule(&self.search_input, move |ticket| async move {
            match client.search(&ticket.query).await {
                Ok(items) => {
                    let _ = tx.send(Action::SearchCompleted {
                        seq: ticket.seq,
                        query: ticket.query,
                        items,
                    });
                }
                Err(e) => {
                    tracing::warn!(seq = ticket.seq, query = %ticket.query, error = %e, "Search failed");
                    let _ = tx.send(Action::SearchFailed { seq: ticket.seq });
                }
            }
        });
    }

    pub fn key_context(&self) -> KeyBindingContext {
        match (&self.state.panel, self.state.category) {
            (PanelState::InfoOpen { .. }, _) => KeyBindingContext::InfoPanel,
            (PanelState::PlayerOpen { .. }, _) => KeyBindingContext::PlayerPanel,
            (PanelState::Closed, Category::Home) => KeyBindingContext::Browse,
            (PanelState::Closed, Category::MyList) => KeyBindingContext::MyList,
        }
    }

    fn handle_normal_input(&mut self, key: KeyEvent) {
        if let Some(action) = self.keybindings.get_action(&key, self.key_context()) {
            let _ = self.action_tx.send(action);
        }
    }

    #[tracing::instrument(skip(self, action))]
    pub async fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::NavigateUp => {
                if !self.state.is_panel_open() {
                    self.state.focus_prev_row();
                }
            }
            Action::NavigateDown => {
                if !self.state.is_panel_open() {
                    self.state.focus_next_row();
                }
            }
            Action::NavigateLeft => {
                if !self.state.is_panel_open() {
                    self.state.select_prev_card();
                }
            }
            Action::NavigateRight => {
                if !self.state.is_panel_open() {
                    self.state.select_next_card();
                }
            }
            Action::ScrollRowLeft => {
                if !self.state.is_panel_open() {
                    self.state.scroll_focused_row(-ROW_SCROLL_STEP);
                }
            }
            Action::ScrollRowRight => {
                if !self.state.is_panel_open() {
                    self.state.scroll_focused_row(ROW_SCROLL_STEP);
                }
            }
            Action::OpenInfo => {
                if let Some(item) = self.state.selected_item().cloned() {
                    self.open_info(item);
                }
            }
            Action::InfoFeatured => {
                if let Some((item, _)) = self.state.featured.clone() {
                    self.open_info(item);
                }
            }
            Action::PlayFeatured => {
                if let Some((item, _)) = self.state.featured.clone() {
                    self.play(item);
                }
            }
            Action::PlayInfoItem => {
                if let Some(item) = self.state.info_item().cloned() {
                    self.state.close_info();
                    self.play(item);
                }
            }
            Action::OpenPlayerInBrowser => {
                if let PanelState::PlayerOpen { embed_url, .. } = &self.state.panel {
                    let url = embed_url.clone();
                    self.open_in_browser(&url);
                }
            }
            Action::ToggleFavorite => {
                let target = match self.state.info_item() {
                    Some(item) => Some(item.clone()),
                    None if !self.state.is_panel_open() => self.state.selected_item().cloned(),
                    None => None,
                };
                if let Some(item) = target {
                    self.toggle_favorite(&item);
                }
            }
            Action::CloseAll => match self.state.is_panel_open() {
                true => self.state.close_all(),
                false => {
                    if self.state.is_showing_search() {
                        self.search_input.clear();
                        self.debouncer.cancel_pending();
                        self.state.clear_search();
                    }
                }
            },
            Action::SwitchCategory(category) => self.switch_category(category),
            Action::NextCategory => self.switch_category(self.state.category.next()),
            Action::EnterSearch => {
                if self.state.category == Category::Home && !self.state.is_panel_open() {
                    self.input_mode = InputMode::Search;
                }
            }
            Action::LoadHome => self.load_home(),
            Action::FeaturedLoaded {
                generation,
                item,
                details,
            } => {
                if generation == self.home_load.generation {
                    self.state.featured = Some((*item, *details));
                    self.home_load.featured_loading = false;
                    self.record_home_response(true);
                }
            }
            Action::FeaturedFailed { generation } => {
                if generation == self.home_load.generation {
                    self.home_load.featured_loading = false;
                    self.record_home_response(false);
                }
            }
            Action::RowLoaded {
                generation,
                key,
                items,
            } => {
                if generation == self.home_load.generation {
                    self.state.apply_row(key, items);
                    self.record_home_response(true);
                }
            }
            Action::RowFailed { generation, key } => {
                if generation == self.home_load.generation {
                    self.state.row_failed(key);
                    self.record_home_response(false);
                }
            }
            Action::SearchCompleted { seq, query, items } => {
                if !self.debouncer.is_latest(seq) || self.search_input.trim() != query.trim() {
                    tracing::debug!(seq, query = %query, "Dropping stale search response");
                    return;
                }
                tracing::info!(seq, query = %query, count = items.len(), "Search results applied");
                self.state.apply_search_results(query, items);
            }
            Action::SearchFailed { seq } => {
                tracing::debug!(seq, "Search request failed; keeping current view");
            }
            Action::InfoDetailsLoaded(details) => {
                let id = details.item.id;
                if !self.state.apply_info_details(*details) {
                    tracing::debug!(id, "Ignoring details for an item no longer shown");
                }
            }
            Action::InfoDetailsFailed { id } => {
                // Fall back to the list record so the panel stops loading.
                if let Some(item) = self.state.info_item().filter(|i| i.id == id).cloned() {
                    tracing::warn!(id, "Showing info panel without extended details");
                    self.state.apply_info_details(ContentDetails::from_item(item));
                }
            }
        }
    }

    fn switch_category(&mut self, category: Category) {
        // Leaving the current view abandons any search, pending or in flight.
        self.search_input.clear();
        self.debouncer.cancel_pending();
        self.input_mode = InputMode::Normal;

        if self.state.set_category(category) {
            let _ = self.action_tx.send(Action::LoadHome);
        }
    }

    /// Full home refresh: fresh state (favorites re-read), then the featured
    /// request and every row request concurrently.
    fn load_home(&mut self) {
        self.state.reset();
        self.search_input.clear();
        self.debouncer.cancel_pending();
        self.input_mode = InputMode::Normal;

        let generation = self.home_load.generation + 1;
        self.home_load = HomeLoad::start(generation);
        self.state.mark_rows_loading();
        tracing::info!(generation, "Loading home content");

        let client = Arc::clone(&self.client);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let action = match load_featured(&client).await {
                Ok((item, details)) => Action::FeaturedLoaded {
                    generation,
                    item: Box::new(item),
                    details: Box::new(details),
                },
                Err(e) => {
                    tracing::warn!("Featured content unavailable: {:#}", e);
                    Action::FeaturedFailed { generation }
                }
            };
            let _ = tx.send(action);
        });

        let client = Arc::clone(&self.client);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            futures::stream::iter(RowKey::iter())
                .for_each_concurrent(None, |key| {
                    let client = Arc::clone(&client);
                    let tx = tx.clone();
                    async move {
                        let action = match client.fetch_row(key).await {
                            Ok(items) => Action::RowLoaded {
                                generation,
                                key,
                                items,
                            },
                            Err(e) => {
                                tracing::warn!(row = %key, error = %e, "Row failed to load");
                                Action::RowFailed { generation, key }
                            }
                        };
                        let _ = tx.send(action);
                    }
                })
                .await;
        });
    }

    fn record_home_response(&mut self, ok: bool) {
        self.home_load.record(ok);
        if self.home_load.all_failed() {
            tracing::error!("Every home request failed");
            self.notification = Some(Notification::alert(LOAD_FAILED_MESSAGE));
        } else if self.home_load.pending == 0 {
            tracing::info!(
                failed = self.home_load.failed,
                generation = self.home_load.generation,
                "Home content loaded"
            );
        }
    }

    /// Show the info panel for `item` and fetch its full details.
    fn open_info(&mut self, item: ContentItem) {
        let media = match item.media_type {
            MediaType::Tv => MediaType::Tv,
            _ => MediaType::Movie,
        };
        let id = item.id;
        self.state.open_info(item);

        let client = Arc::clone(&self.client);
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match client
                .fetch_details(media, id, &[DetailExpansion::Credits])
                .await
            {
                Ok(details) => {
                    let _ = tx.send(Action::InfoDetailsLoaded(Box::new(details)));
                }
                Err(e) => {
                    tracing::warn!(id, error = %e, "Failed to load details");
                    let _ = tx.send(Action::InfoDetailsFailed { id });
                }
            }
        });
    }

    fn play(&mut self, item: ContentItem) {
        let url = playback::embed_url(&self.config.playback.embed_base_url, &item);
        tracing::info!(id = item.id, url = %url, "Starting playback");
        self.state.open_player(item, url.clone());
        if self.config.playback.open_in_browser {
            self.open_in_browser(&url);
        }
    }

    fn open_in_browser(&mut self, url: &str) {
        if let Err(e) = open::that(url) {
            tracing::error!(url, error = %e, "Failed to open browser");
            self.notify_error(format!("Could not open browser: {}", e));
        }
    }

    fn toggle_favorite(&mut self, item: &ContentItem) {
        match self.state.toggle_favorite(item) {
            Ok(true) => self.notify_info(format!("Added \"{}\" to My List", item.title)),
            Ok(false) => self.notify_info(format!("Removed \"{}\" from My List", item.title)),
            Err(e) => {
                tracing::error!("{:#}", e);
                self.notify_error("Failed to save My List");
            }
        }
    }

    pub fn get_spinner_char(&self) -> &'static str {
        const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        SPINNER_FRAMES[self.spinner_state % SPINNER_FRAMES.len()]
    }

    pub fn loading_description(&self) -> Option<String> {
        let rows = self.state.pending_row_count();
        match (self.home_load.featured_loading, rows) {
            (_, n) if n > 0 => Some(format!("Loading {} rows...", n)),
            (true, _) => Some("Loading featured...".to_string()),
            _ => match &self.state.panel {
                PanelState::InfoOpen { details: None, .. } => Some("Loading details...".to_string()),
                _ => None,
            },
        }
    }

    pub fn ui(&mut self, f: &mut Frame) {
        super::view::draw(self, f);
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
