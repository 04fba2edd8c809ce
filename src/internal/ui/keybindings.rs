use crate::internal::ui::app::Action;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Which part of the UI has input, for context-specific keybindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyBindingContext {
    Global,
    Browse,
    MyList,
    InfoPanel,
    PlayerPanel,
}

/// Maps key events to actions
#[derive(Debug, Clone, Default)]
pub struct KeyBindingMap {
    global: HashMap<KeyEvent, Action>,
    browse: HashMap<KeyEvent, Action>,
    my_list: HashMap<KeyEvent, Action>,
    info_panel: HashMap<KeyEvent, Action>,
    player_panel: HashMap<KeyEvent, Action>,
}

impl KeyBindingMap {
    pub fn new() -> Self {
        Self::default()
    }

    fn context_map(&self, context: KeyBindingContext) -> &HashMap<KeyEvent, Action> {
        match context {
            KeyBindingContext::Global => &self.global,
            KeyBindingContext::Browse => &self.browse,
            KeyBindingContext::MyList => &self.my_list,
            KeyBindingContext::InfoPanel => &self.info_panel,
            KeyBindingContext::PlayerPanel => &self.player_panel,
        }
    }

    /// Get the action for a given key event in a specific context
    /// Checks context-specific bindings first, then falls back to global
    pub fn get_action(&self, key: &KeyEvent, context: KeyBindingContext) -> Option<Action> {
        // Uppercase letters arrive with SHIFT set; bindings store them bare.
        let mut modifiers = key.modifiers;
        if let KeyCode::Char(c) = key.code
            && c.is_uppercase()
        {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        let lookup = KeyEvent::new(key.code, modifiers);

        self.context_map(context)
            .get(&lookup)
            .or_else(|| self.global.get(&lookup))
            .cloned()
    }

    /// Add a keybinding for a specific context
    pub fn add_binding(&mut self, context: KeyBindingContext, key: KeyEvent, action: Action) {
        let map = match context {
            KeyBindingContext::Global => &mut self.global,
            KeyBindingContext::Browse => &mut self.browse,
            KeyBindingContext::MyList => &mut self.my_list,
            KeyBindingContext::InfoPanel => &mut self.info_panel,
            KeyBindingContext::PlayerPanel => &mut self.player_panel,
        };
        map.insert(key, action);
    }

    /// Merge custom keybindings from configuration
    pub fn merge_config(&mut self, config: &crate::config::KeyBindingConfig) {
        let mut merge = |ctx: KeyBindingContext, bindings: &HashMap<String, Action>| {
            for (key_str, action) in bindings {
                match parse_key_str(key_str) {
                    Some(key_event) => self.add_binding(ctx, key_event, action.clone()),
                    None => tracing::warn!("Invalid key string in config: {}", key_str),
                }
            }
        };

        merge(KeyBindingContext::Global, &config.global);
        merge(KeyBindingContext::Browse, &config.browse);
        merge(KeyBindingContext::MyList, &config.my_list);
        merge(KeyBindingContext::InfoPanel, &config.info_panel);
        merge(KeyBindingContext::PlayerPanel, &config.player_panel);
    }

    /// All bindings visible in `context`, context-specific ones first.
    pub fn bindings_for(&self, context: KeyBindingContext) -> Vec<(KeyEvent, Action)> {
        let specific = self.context_map(context);
        let mut out: Vec<_> = specific.iter().map(|(k, a)| (*k, a.clone())).collect();
        out.extend(
            self.global
                .iter()
                .filter(|(k, _)| !specific.contains_key(k))
                .map(|(k, a)| (*k, a.clone())),
        );
        out
    }
}

/// Parse a key string into a KeyEvent
/// Supported formats:
/// - Single char: "j", "k", "1"
/// - Special keys: "Enter", "Tab", "Esc", "Up", "Down", "Left", "Right"
/// - With modifiers: "Ctrl+C", "Shift+Tab"
pub fn parse_key_str(key_str: &str) -> Option<KeyEvent> {
    let parts: Vec<&str> = key_str.split('+').collect();

    let mut modifiers = KeyModifiers::empty();
    let key_part = if parts.len() > 1 {
        // Has modifiers
        for modifier in &parts[..parts.len() - 1] {
            match modifier.to_lowercase().as_str() {
                "ctrl" => modifiers |= KeyModifiers::CONTROL,
                "shift" => modifiers |= KeyModifiers::SHIFT,
                "alt" => modifiers |= KeyModifiers::ALT,
                _ => return None, // Invalid modifier
            }
        }
        parts[parts.len() - 1]
    } else {
        parts[0]
    };

    let code = match key_part {
        "Enter" => KeyCode::Enter,
        "Tab" => KeyCode::Tab,
        "Esc" => KeyCode::Esc,
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Backspace" => KeyCode::Backspace,
        "Delete" => KeyCode::Delete,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        s if s.chars().count() == 1 => KeyCode::Char(s.chars().next()?),
        _ => return None, // Unknown key
    };

    Some(KeyEvent::new(code, modifiers))
}
