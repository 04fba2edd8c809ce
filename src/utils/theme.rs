use ratatui::style::Color;

/// Colors used by the renderer.
#[derive(Debug, Clone)]
pub struct TuiTheme {
    pub background: Color,
    pub foreground: Color,
    pub accent: Color,
    pub muted: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub border: Color,
    pub focused_border: Color,
    pub rating: Color,
    pub error: Color,
}

impl Default for TuiTheme {
    fn default() -> Self {
        Self {
            background: Color::Reset,
            foreground: Color::Reset,
            accent: Color::Rgb(229, 9, 20),
            muted: Color::DarkGray,
            selection_bg: Color::Rgb(229, 9, 20),
            selection_fg: Color::White,
            border: Color::Gray,
            focused_border: Color::White,
            rating: Color::Yellow,
            error: Color::Red,
        }
    }
}
