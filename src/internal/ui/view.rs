use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use strum::IntoEnumIterator;

use super::app::{App, InputMode};
use super::keybindings::KeyBindingContext;
use super::view_model::{CardView, DetailView, FavoriteToggleView, HeroView, PlayerView, row_cards};
use crate::internal::models::FetchState;
use crate::internal::notification::NotificationType;
use crate::internal::state::{Category, PanelState, VisibleRow};

/// Terminal columns given to one card.
pub const CARD_COLUMNS: u16 = 22;
/// Terminal lines given to one row, borders included.
pub const ROW_HEIGHT: u16 = 6;
pub const HERO_HEIGHT: u16 = 8;

#[tracing::instrument(skip(app, f))]
pub fn draw(app: &mut App, f: &mut Frame) {
    let start = std::time::Instant::now();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_top_bar(app, f, chunks[0]);

    match app.state.category {
        Category::Home => {
            let body = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(HERO_HEIGHT), Constraint::Min(0)])
                .split(chunks[1]);
            render_hero(app, f, body[0]);
            render_rows(app, f, body[1]);
        }
        Category::MyList => render_rows(app, f, chunks[1]),
    }

    render_status_bar(app, f, chunks[2]);

    match &app.state.panel {
        PanelState::InfoOpen { .. } => render_info_panel(app, f),
        PanelState::PlayerOpen { .. } => render_player_panel(app, f),
        PanelState::Closed => {}
    }

    if app.input_mode == InputMode::Search {
        render_search_overlay(app, f);
    }

    if app.notification.is_some() {
        render_notification(app, f);
    }

    if app.config.logging.enable_performance_metrics && cfg!(debug_assertions) {
        tracing::debug!(elapsed = ?start.elapsed(), "render.draw");
    }
}

fn render_top_bar(app: &App, f: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(
            " TUI-FLIX ",
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];

    for category in Category::iter() {
        let style = match category == app.state.category {
            true => Style::default()
                .fg(app.theme.selection_fg)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD),
            false => Style::default().fg(app.theme.muted),
        };
        spans.push(Span::styled(format!(" {} ", category), style));
        spans.push(Span::raw(" "));
    }

    if let Some(query) = &app.state.search_query {
        spans.push(Span::styled(
            format!("  Search: {}", query),
            Style::default().fg(app.theme.foreground),
        ));
    }

    let p = Paragraph::new(Line::from(spans)).style(Style::default().bg(app.theme.background));
    f.render_widget(p, area);
}

fn render_hero(app: &App, f: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
        .title(" Featured ")
        .title_style(Style::default().fg(app.theme.accent));

    let lines = match &app.state.featured {
        Some((item, details)) => {
            let hero = HeroView::new(item, details, &app.config.catalog.image_base_url);
            let mut meta = vec![
                Span::styled(hero.rating, Style::default().fg(app.theme.rating)),
                Span::raw("  "),
                Span::raw(hero.year),
            ];
            if let Some(runtime) = hero.runtime {
                meta.push(Span::raw("  "));
                meta.push(Span::raw(runtime));
            }
            vec![
                Line::from(Span::styled(
                    hero.title,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(meta),
                Line::from(hero.description),
                Line::from(Span::styled(
                    "[p] Play   [i] More Info",
                    Style::default().fg(app.theme.muted),
                )),
            ]
        }
        None if app.home_load.featured_loading => vec![Line::from(format!(
            "{} Loading featured title...",
            app.get_spinner_char()
        ))],
        None => vec![Line::from(Span::styled(
            "No featured title available",
            Style::default().fg(app.theme.muted),
        ))],
    };

    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(app.theme.foreground));
    f.render_widget(p, area);
}

fn render_rows(app: &App, f: &mut Frame, area: Rect) {
    let rows = app.state.visible_rows();
    if rows.is_empty() || area.height < ROW_HEIGHT {
        return;
    }

    // Scroll vertically just enough to keep the focused row on screen.
    let fit = (area.height / ROW_HEIGHT) as usize;
    let first = app.state.focused_row.saturating_sub(fit - 1);

    let mut constraints: Vec<Constraint> = rows
        .iter()
        .skip(first)
        .take(fit)
        .map(|_| Constraint::Length(ROW_HEIGHT))
        .collect();
    constraints.push(Constraint::Min(0));

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (offset, (row, chunk)) in rows.iter().skip(first).take(fit).zip(chunks.iter()).enumerate() {
        let focused = first + offset == app.state.focused_row;
        render_row(app, f, *chunk, *row, focused);
    }
}

/// Message shown in place of cards, if the row has none to show.
fn row_placeholder(app: &App, row: VisibleRow) -> Option<String> {
    if !app.state.row_items(row).is_empty() {
        return None;
    }
    let message = match row {
        VisibleRow::Search => format!(
            "No results for \"{}\"",
            app.state.search_query.as_deref().unwrap_or_default()
        ),
        VisibleRow::MyList => {
            "Your list is empty. Press m on any title to add it.".to_string()
        }
        VisibleRow::Catalog(key) => match app.state.rows.get(&key).map(|r| &r.fetch) {
            Some(FetchState::Loading) => format!("{} Loading...", app.get_spinner_char()),
            Some(FetchState::Failed) => "Could not load this row".to_string(),
            _ => "Nothing here yet".to_string(),
        },
    };
    Some(message)
}

fn render_row(app: &App, f: &mut Frame, area: Rect, row: VisibleRow, focused: bool) {
    let items = app.state.row_items(row);
    let cursor = app.state.cursor(row);

    let title = match items.len() {
        0 => format!(" {} ", row.title()),
        n => format!(" {} ({}/{}) ", row.title(), cursor.selected.min(n - 1) + 1, n),
    };
    let (border_color, title_style) = match focused {
        true => (
            app.theme.focused_border,
            Style::default()
                .fg(app.theme.foreground)
                .add_modifier(Modifier::BOLD),
        ),
        false => (app.theme.border, Style::default().fg(app.theme.muted)),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title)
        .title_style(title_style);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if let Some(message) = row_placeholder(app, row) {
        let p = Paragraph::new(message).style(Style::default().fg(app.theme.muted));
        f.render_widget(p, inner);
        return;
    }

    // Only catalog rows are capped; My List and search results show everything.
    let image_base_url = &app.config.catalog.image_base_url;
    let cards: Vec<CardView> = match row {
        VisibleRow::Catalog(_) => row_cards(items, image_base_url),
        VisibleRow::MyList | VisibleRow::Search => items
            .iter()
            .map(|item| CardView::from_item(item, image_base_url))
            .collect(),
    };
    let fit = (inner.width / CARD_COLUMNS).max(1) as usize;
    let mut start = cursor.first_visible().min(cards.len().saturating_sub(1));
    if cursor.selected >= start + fit {
        start = cursor.selected + 1 - fit;
    }

    let mut constraints: Vec<Constraint> = (0..fit).map(|_| Constraint::Length(CARD_COLUMNS)).collect();
    constraints.push(Constraint::Min(0));
    let slots = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(inner);

    for ((index, card), slot) in cards.iter().enumerate().skip(start).take(fit).zip(slots.iter()) {
        let selected = focused && index == cursor.selected;
        let favorited = app.state.is_favorited(card.id);
        render_card(app, f, *slot, card, selected, favorited);
    }
}

fn render_card(app: &App, f: &mut Frame, area: Rect, card: &CardView, selected: bool, favorited: bool) {
    let width = area.width.saturating_sub(2).max(1) as usize;

    let mut lines: Vec<Line> = textwrap::wrap(&card.title, width)
        .into_iter()
        .take(2)
        .map(|l| Line::from(Span::styled(l.into_owned(), Style::default().add_modifier(Modifier::BOLD))))
        .collect();

    let mut meta = vec![
        Span::styled(card.rating.clone(), Style::default().fg(app.theme.rating)),
        Span::raw(" "),
        Span::styled(card.year.clone(), Style::default().fg(app.theme.muted)),
    ];
    if favorited {
        meta.push(Span::styled(" ✓", Style::default().fg(app.theme.accent)));
    }
    lines.push(Line::from(meta));

    let (border_style, body_style) = match selected {
        true => (
            Style::default().fg(app.theme.selection_bg),
            Style::default()
                .fg(app.theme.selection_fg)
                .bg(app.theme.selection_bg),
        ),
        false => (
            Style::default().fg(app.theme.border),
            Style::default().fg(app.theme.foreground),
        ),
    };

    let p = Paragraph::new(lines)
        .style(body_style)
        .block(Block::default().borders(Borders::ALL).border_style(border_style));
    f.render_widget(p, area);
}

/// Rect of `percent_x` by `percent_y` centered in `area`.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(percent_y) / 100) as u16;
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn panel_block<'a>(app: &App, title: &'a str) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent))
        .title(title)
        .title_style(
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .style(Style::default().bg(app.theme.background))
}

fn render_info_panel(app: &App, f: &mut Frame) {
    let PanelState::InfoOpen { item, details } = &app.state.panel else {
        return;
    };
    let area = centered_rect(80, 80, f.area());
    let toggle = FavoriteToggleView::new(app.state.is_favorited(item.id));
    let muted = Style::default().fg(app.theme.muted);

    let mut lines = match details {
        None => vec![
            Line::from(Span::styled(
                item.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(format!("{} Loading details...", app.get_spinner_char())),
        ],
        Some(details) => {
            let view = DetailView::new(details, &app.config.catalog.image_base_url);
            let mut meta = vec![
                Span::styled(view.rating, Style::default().fg(app.theme.rating)),
                Span::raw("  "),
                Span::raw(view.year),
            ];
            if !view.runtime.is_empty() {
                meta.push(Span::raw("  "));
                meta.push(Span::raw(view.runtime));
            }

            let mut lines = vec![
                Line::from(Span::styled(
                    view.title,
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(meta),
                Line::from(""),
                Line::from(view.description),
                Line::from(""),
                Line::from(vec![Span::styled("Cast: ", muted), Span::raw(view.cast)]),
                Line::from(vec![Span::styled("Genres: ", muted), Span::raw(view.genres)]),
            ];
            if let Some(trailer) = view.trailer_url {
                lines.push(Line::from(vec![Span::styled("Trailer: ", muted), Span::raw(trailer)]));
            }
            if let Some(artwork) = view.background_url {
                lines.push(Line::from(vec![Span::styled("Artwork: ", muted), Span::raw(artwork)]));
            }
            lines
        }
    };

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[p] ▶ Play   ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!("[m] {} {}", toggle.icon, toggle.label),
            Style::default().fg(app.theme.accent),
        ),
        Span::styled(format!("  ({})", toggle.hint), muted),
    ]));

    let p = Paragraph::new(lines)
        .block(panel_block(app, " More Info "))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(app.theme.foreground));

    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn render_player_panel(app: &App, f: &mut Frame) {
    let PanelState::PlayerOpen { item, embed_url } = &app.state.panel else {
        return;
    };
    let area = centered_rect(70, 60, f.area());
    let view = PlayerView::new(item, embed_url);
    let muted = Style::default().fg(app.theme.muted);

    let hint = match app.config.playback.open_in_browser {
        true => "Opened in your browser. [o] open again  [Esc] close",
        false => "[o] open in browser  [Esc] close",
    };

    let lines = vec![
        Line::from(Span::styled(
            view.title,
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::raw(view.year),
            Span::raw("  "),
            Span::styled(view.rating, Style::default().fg(app.theme.rating)),
        ]),
        Line::from(""),
        Line::from(view.description),
        Line::from(""),
        Line::from(vec![Span::styled("Stream: ", muted), Span::raw(view.embed_url)]),
        Line::from(""),
        Line::from(Span::styled(hint, muted)),
    ];

    let p = Paragraph::new(lines)
        .block(panel_block(app, " Now Playing "))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(app.theme.foreground));

    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn status_hints(context: KeyBindingContext) -> &'static str {
    match context {
        KeyBindingContext::Browse | KeyBindingContext::Global => {
            "↑↓: Rows | ←→: Titles | [ ]: Scroll | Enter: Info | p: Play | i: Featured Info | m: My List | /: Search | Tab: Category | q: Quit"
        }
        KeyBindingContext::MyList => {
            "←→: Titles | Enter: Info | m: Remove | Tab: Category | q: Quit"
        }
        KeyBindingContext::InfoPanel => "p: Play | m: My List | Esc/q: Close",
        KeyBindingContext::PlayerPanel => "o: Open in Browser | Esc/q: Close",
    }
}

fn render_status_bar(app: &App, f: &mut Frame, area: Rect) {
    let status = match (app.input_mode, app.loading_description()) {
        (InputMode::Search, _) => {
            "Search: Type to search | Enter/↓: Browse results | Esc: Clear".to_string()
        }
        (InputMode::Normal, Some(desc)) => {
            format!("{} {} | {}", app.get_spinner_char(), desc, status_hints(app.key_context()))
        }
        (InputMode::Normal, None) => format!(
            "{} | v{}",
            status_hints(app.key_context()),
            app.app_version
        ),
    };

    let p = Paragraph::new(status)
        .style(
            Style::default()
                .fg(app.theme.selection_fg)
                .bg(app.theme.selection_bg),
        );
    f.render_widget(p, area);
}

fn render_search_overlay(app: &App, f: &mut Frame) {
    let area = f.area();

    let search_width = 60.min(area.width.saturating_sub(4));
    let search_height = 3;
    let search_x = (area.width.saturating_sub(search_width)) / 2;
    let search_area = Rect::new(search_x, 1, search_width, search_height.min(area.height));

    let input_line = format!("{}█", app.search_input);
    let search_box = Paragraph::new(Line::from(Span::styled(
        input_line,
        Style::default().fg(app.theme.foreground),
    )))
    .style(Style::default().bg(app.theme.background))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.selection_bg))
            .title(" Search titles, people, genres ")
            .title_style(
                Style::default()
                    .fg(app.theme.selection_fg)
                    .bg(app.theme.selection_bg)
                    .add_modifier(Modifier::BOLD),
            ),
    );

    f.render_widget(Clear, search_area);
    f.render_widget(search_box, search_area);
}

fn render_notification(app: &App, f: &mut Frame) {
    if let Some(notification) = &app.notification {
        let area = f.area();

        let (bg_color, title, extra_lines) = match notification.notification_type {
            NotificationType::Info => (Color::Blue, "Info", 0),
            NotificationType::Error => (app.theme.error, "Error", 0),
            NotificationType::Alert => (app.theme.accent, "Alert", 1),
        };

        let popup_width = (notification.message.chars().count() as u16 + 4)
            .min(area.width.saturating_sub(4));
        let popup_height = 3 + extra_lines;
        let popup_x = (area.width.saturating_sub(popup_width)) / 2;
        let popup_y = (area.height.saturating_sub(popup_height)) / 2;
        let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height.min(area.height));

        let mut lines = vec![Line::from(notification.message.as_str())];
        if notification.is_blocking() {
            lines.push(Line::from("Press Enter to dismiss"));
        }

        let popup = Paragraph::new(lines)
            .style(
                Style::default()
                    .bg(bg_color)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border))
                    .title(title)
                    .title_style(Style::default().fg(Color::White)),
            )
            .alignment(Alignment::Center);

        f.render_widget(Clear, popup_area);
        f.render_widget(popup, popup_area);
    }
}
