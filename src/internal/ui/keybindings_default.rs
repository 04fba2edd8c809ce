use crate::internal::state::Category;
use crate::internal::ui::app::Action;
use crate::internal::ui::keybindings::{KeyBindingContext, KeyBindingMap};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Create default keybindings for the application
pub fn create_default_keybindings() -> KeyBindingMap {
    let mut map = KeyBindingMap::new();

    // Global bindings (work in all contexts)
    add_global_bindings(&mut map);

    // View-specific bindings
    add_browse_bindings(&mut map);
    add_my_list_bindings(&mut map);
    add_info_panel_bindings(&mut map);
    add_player_panel_bindings(&mut map);

    map
}

fn add_global_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::Global;

    // Close / Quit
    map.add_binding(ctx, key('q'), Action::CloseAll);
    map.add_binding(ctx, key_code(KeyCode::Esc), Action::CloseAll);
    map.add_binding(
        ctx,
        KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        Action::Quit,
    );

    // Navigation
    map.add_binding(ctx, key('j'), Action::NavigateDown);
    map.add_binding(ctx, key('k'), Action::NavigateUp);
    map.add_binding(ctx, key('h'), Action::NavigateLeft);
    map.add_binding(ctx, key('l'), Action::NavigateRight);
    map.add_binding(ctx, key_code(KeyCode::Down), Action::NavigateDown);
    map.add_binding(ctx, key_code(KeyCode::Up), Action::NavigateUp);
    map.add_binding(ctx, key_code(KeyCode::Left), Action::NavigateLeft);
    map.add_binding(ctx, key_code(KeyCode::Right), Action::NavigateRight);
    map.add_binding(ctx, key('['), Action::ScrollRowLeft);
    map.add_binding(ctx, key(']'), Action::ScrollRowRight);

    // Categories
    map.add_binding(ctx, key('1'), Action::SwitchCategory(Category::Home));
    map.add_binding(ctx, key('2'), Action::SwitchCategory(Category::MyList));
    map.add_binding(ctx, key_code(KeyCode::Tab), Action::NextCategory);
    map.add_binding(ctx, key('R'), Action::LoadHome);
}

fn add_browse_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::Browse;

    map.add_binding(ctx, key('q'), Action::Quit);
    map.add_binding(ctx, key('/'), Action::EnterSearch);
    map.add_binding(ctx, key_code(KeyCode::Enter), Action::OpenInfo);

    // Hero banner
    map.add_binding(ctx, key('p'), Action::PlayFeatured);
    map.add_binding(ctx, key('i'), Action::InfoFeatured);

    map.add_binding(ctx, key('m'), Action::ToggleFavorite);
}

fn add_my_list_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::MyList;

    map.add_binding(ctx, key('q'), Action::Quit);
    map.add_binding(ctx, key_code(KeyCode::Enter), Action::OpenInfo);
    map.add_binding(ctx, key('m'), Action::ToggleFavorite);
}

fn add_info_panel_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::InfoPanel;

    map.add_binding(ctx, key('p'), Action::PlayInfoItem);
    map.add_binding(ctx, key_code(KeyCode::Enter), Action::PlayInfoItem);
    map.add_binding(ctx, key('m'), Action::ToggleFavorite);
}

fn add_player_panel_bindings(map: &mut KeyBindingMap) {
    let ctx = KeyBindingContext::PlayerPanel;

    map.add_binding(ctx, key('o'), Action::OpenPlayerInBrowser);
}

/// Helper to create a simple char key event
fn key(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::empty())
}

/// Helper to create a key event from KeyCode
fn key_code(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}
