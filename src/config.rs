use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use strum_macros::Display;
use thiserror::Error;

use crate::internal::ui::app::Action;

/// Environment variable that overrides `catalog.api_key`.
pub const API_KEY_ENV: &str = "TMDB_API_KEY";

/// Values shipped in templates that were never replaced with a real key.
const PLACEHOLDER_API_KEYS: &[&str] = &[
    "${TMDB_API_KEY}",
    "YOUR_TMDB_API_KEY",
    "changeme",
    "365763a878a8f9fe9ab725c84e864923",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("catalog API key is not configured (set TMDB_API_KEY or catalog.api_key)")]
    MissingApiKey,
    #[error("catalog API key is still the placeholder value '{0}'")]
    PlaceholderApiKey(String),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Root of the embed service; movie and tv paths are appended to it.
    pub embed_base_url: String,
    /// Hand the embed URL to the system browser when something is played.
    pub open_in_browser: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            embed_base_url: "https://vidsrc.xyz/embed".to_string(),
            open_in_browser: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { debounce_ms: 500 }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    /// Per-module overrides, e.g. `{"tui_flix::api": Debug}`.
    pub module_levels: HashMap<String, LogLevel>,
    pub log_directory: Option<String>,
    pub enable_performance_metrics: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            module_levels: HashMap::new(),
            log_directory: None,
            enable_performance_metrics: false,
        }
    }
}

impl LoggingConfig {
    /// Filter directive string for `tracing_subscriber::EnvFilter`.
    pub fn filter_directives(&self) -> String {
        let mut filter = self.level.to_string();
        let mut modules: Vec<_> = self.module_levels.iter().collect();
        modules.sort_by(|a, b| a.0.cmp(b.0));
        for (module, level) in modules {
            filter.push_str(&format!(",{}={}", module, level));
        }
        filter
    }
}

/// Per-context key overrides. Keys use the `parse_key_str` syntax.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct KeyBindingConfig {
    pub global: HashMap<String, Action>,
    pub browse: HashMap<String, Action>,
    pub my_list: HashMap<String, Action>,
    pub info_panel: HashMap<String, Action>,
    pub player_panel: HashMap<String, Action>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub catalog: CatalogConfig,
    pub playback: PlaybackConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
    pub keybindings: Option<KeyBindingConfig>,
}

impl AppConfig {
    /// Look for `config.ron` in the working directory, then next to the
    /// executable. Falls back to defaults. The API key env var always wins.
    pub fn load() -> Self {
        let mut candidates = vec![PathBuf::from("config.ron")];
        if let Ok(exe) = std::env::current_exe()
            && let Some(dir) = exe.parent()
        {
            candidates.push(dir.join("config.ron"));
        }

        let mut config = candidates
            .iter()
            .filter(|path| path.exists())
            .find_map(|path| Self::load_from(path))
            .unwrap_or_else(|| {
                tracing::info!("No config file found, using defaults");
                Self::default()
            });

        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.trim().is_empty()
        {
            config.catalog.api_key = key;
        }

        config
    }

    /// Parse a single RON file; logs and returns `None` on failure.
    pub fn load_from(path: &Path) -> Option<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                tracing::error!("Failed to read config at {}: {}", path.display(), e);
                return None;
            }
        };

        match ron::from_str::<AppConfig>(&content) {
            Ok(config) => {
                tracing::info!("Loaded config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                tracing::error!("Failed to parse config at {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn validate_api_key(&self) -> Result<(), ConfigError> {
        let key = self.catalog.api_key.trim();
        match key {
            "" => Err(ConfigError::MissingApiKey),
            k if PLACEHOLDER_API_KEYS.contains(&k) => {
                Err(ConfigError::PlaceholderApiKey(k.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Diagnostic-only credential check run once at startup.
    pub fn report_api_key_problems(&self) {
        if let Err(e) = self.validate_api_key() {
            tracing::error!(error = %e, "Catalog requests will fail until the API key is configured");
            tracing::error!("Get a key from https://www.themoviedb.org/settings/api");
        }
    }
}
