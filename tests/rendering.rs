use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};
use tui_flix::api::{CatalogClient, RowKey};
use tui_flix::config::AppConfig;
use tui_flix::internal::favorites::{Favorites, MemoryStore};
use tui_flix::internal::models::{ContentDetails, ContentItem};
use tui_flix::internal::notification::Notification;
use tui_flix::internal::state::Category;
use tui_flix::internal::ui::app::{App, LOAD_FAILED_MESSAGE};
use tui_flix::internal::ui::view_model::CardView;

const MATRIX_DETAILS: &str = r#"{
    "id": 603,
    "title": "The Matrix",
    "overview": "A hacker learns the truth about his reality.",
    "vote_average": 8.2,
    "release_date": "1999-03-30",
    "backdrop_path": "/matrix.jpg",
    "runtime": 136,
    "genres": [{"id": 28, "name": "Action"}],
    "credits": {"cast": [{"name": "Keanu Reeves"}, {"name": "Carrie-Anne Moss"}]}
}"#;

fn matrix_details() -> ContentDetails {
    serde_json::from_str(MATRIX_DETAILS).unwrap()
}

fn matrix() -> ContentItem {
    matrix_details().item
}

fn app_with(favorites: Vec<ContentItem>) -> App {
    let mut config = AppConfig::default();
    config.playback.open_in_browser = false;
    App::with_parts(
        config,
        CatalogClient::with_base_url("http://127.0.0.1:9", "test-key"),
        Favorites::load_or_empty(Box::new(MemoryStore::with_items(favorites))),
    )
}

fn render(app: &mut App) -> String {
    let backend = TestBackend::new(120, 40);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal.draw(|f| app.ui(f)).unwrap();
    buffer_text(terminal.backend().buffer())
}

fn buffer_text(buffer: &Buffer) -> String {
    let width = buffer.area.width as usize;
    buffer
        .content()
        .chunks(width)
        .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_home_shows_hero_and_rows() {
    let mut app = app_with(Vec::new());
    app.state.featured = Some((matrix(), matrix_details()));
    app.state.apply_row(RowKey::Trending, vec![matrix()]);

    let screen = render(&mut app);

    assert!(screen.contains("TUI-FLIX"));
    assert!(screen.contains("Home"));
    assert!(screen.contains("My List"));
    assert!(screen.contains("Featured"));
    assert!(screen.contains("136 min"));
    assert!(screen.contains("Trending Now (1/1)"));
    assert!(screen.contains("The Matrix"));
    assert!(screen.contains("★ 8.2"));
    // Rows that have not loaded yet say so instead of staying blank.
    assert!(screen.contains("Nothing here yet"));
}

#[test]
fn test_my_list_empty_state() {
    let mut app = app_with(Vec::new());
    app.state.set_category(Category::MyList);

    let screen = render(&mut app);

    assert!(screen.contains("Your list is empty"));
    assert!(!screen.contains("Featured"));
}

#[test]
fn test_my_list_shows_saved_titles() {
    let mut app = app_with(vec![matrix()]);
    app.state.set_category(Category::MyList);

    let screen = render(&mut app);

    assert!(screen.contains("My List (1/1)"));
    assert!(screen.contains("The Matrix"));
    assert!(screen.contains("✓"));
}

fn titled(id: u32, title: String) -> ContentItem {
    ContentItem {
        id,
        title,
        ..matrix()
    }
}

#[test]
fn test_long_my_list_renders_last_selected_card() {
    let favorites = (1..=20).map(|n| titled(n, format!("Fav {n}"))).collect();
    let mut app = app_with(favorites);
    app.state.set_category(Category::MyList);
    for _ in 0..19 {
        app.state.select_next_card();
    }
    assert_eq!(app.state.selected_item().map(|i| i.id), Some(20));

    let screen = render(&mut app);

    assert!(screen.contains("My List (20/20)"));
    assert!(screen.contains("Fav 20"));
}

#[test]
fn test_long_search_results_render_last_selected_card() {
    let mut app = app_with(Vec::new());
    let results = (1..=20).map(|n| titled(n, format!("Hit {n}"))).collect();
    app.state.apply_search_results("hit".to_string(), results);
    for _ in 0..19 {
        app.state.select_next_card();
    }

    let screen = render(&mut app);

    assert!(screen.contains("Search Results (20/20)"));
    assert!(screen.contains("Hit 20"));
}

#[test]
fn test_alert_asks_for_acknowledgement() {
    let mut app = app_with(Vec::new());
    app.notification = Some(Notification::alert(LOAD_FAILED_MESSAGE));

    let screen = render(&mut app);

    assert!(screen.contains("check your API key"));
    assert!(screen.contains("Press Enter to dismiss"));
}

#[test]
fn test_info_panel_lists_cast_and_genres() {
    let mut app = app_with(Vec::new());
    app.state.open_info(matrix());

    let loading = render(&mut app);
    assert!(loading.contains("More Info"));
    assert!(loading.contains("Loading details..."));

    assert!(app.state.apply_info_details(matrix_details()));
    let screen = render(&mut app);

    assert!(screen.contains("Keanu Reeves, Carrie-Anne Moss"));
    assert!(screen.contains("Genres: Action"));
    assert!(screen.contains("Add to My List"));
}

#[test]
fn test_player_panel_shows_embed_url() {
    let mut app = app_with(Vec::new());
    app.state
        .open_player(matrix(), "https://vidsrc.xyz/embed/movie/603".to_string());

    let screen = render(&mut app);

    assert!(screen.contains("Now Playing"));
    assert!(screen.contains("https://vidsrc.xyz/embed/movie/603"));
}

#[test]
fn test_card_view_snapshot() {
    let card = CardView::from_item(&matrix(), "https://image.tmdb.org/t/p");
    insta::assert_debug_snapshot!(card, @r#"
    CardView {
        id: 603,
        title: "The Matrix",
        rating: "★ 8.2",
        year: "1999",
        image_url: Some(
            "https://image.tmdb.org/t/p/w500/matrix.jpg",
        ),
    }
    "#);
}
