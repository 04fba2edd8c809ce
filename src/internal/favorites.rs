use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::info;

use super::models::ContentItem;

/// Persistence backend for the favorites list. `save` always receives the
/// complete list and overwrites whatever was stored before.
pub trait FavoritesStore: Send {
    fn load(&self) -> Result<Vec<ContentItem>>;
    fn save(&self, items: &[ContentItem]) -> Result<()>;
}

/// One JSON file holding the whole list, under the OS config directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `<config dir>/tui-flix/favorites.json`, creating the directory if needed.
    pub fn in_config_dir() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("tui-flix");

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).with_context(|| {
                format!("Failed to create config directory {}", config_dir.display())
            })?;
            info!(config_dir = %config_dir.display(), "Created config directory for favorites");
        }

        Ok(Self::new(config_dir.join("favorites.json")))
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Where an unreadable favorites file is moved before it can be overwritten.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }
}

impl FavoritesStore for JsonFileStore {
    fn load(&self) -> Result<Vec<ContentItem>> {
        match self.path.exists() {
            true => {
                let content =
                    fs::read_to_string(&self.path).context("Failed to read favorites file")?;
                let items: Vec<ContentItem> = match serde_json::from_str(&content) {
                    Ok(items) => items,
                    Err(e) => {
                        let backup = self.backup_path();
                        fs::rename(&self.path, &backup).with_context(|| {
                            format!("Failed to move unreadable favorites file to {}", backup.display())
                        })?;
                        return Err(anyhow::Error::new(e).context(format!(
                            "Failed to parse favorites file; moved it to {}",
                            backup.display()
                        )));
                    }
                };
                info!(favorites_file = %self.path.display(), count = items.len(), "Loaded favorites");
                Ok(items)
            }
            false => {
                info!(favorites_file = %self.path.display(), "No favorites file yet, starting empty");
                Ok(Vec::new())
            }
        }
    }

    fn save(&self, items: &[ContentItem]) -> Result<()> {
        let content = serde_json::to_string_pretty(items).context("Failed to serialize favorites")?;
        fs::write(&self.path, content).context("Failed to write favorites file")?;
        info!(favorites_file = %self.path.display(), count = items.len(), "Saved favorites");
        Ok(())
    }
}

/// In-memory store. Clones share the same slot so tests can inspect what
/// was persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Vec<ContentItem>>>,
    fail_saves: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<ContentItem>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(items)),
            fail_saves: false,
        }
    }

    /// A store whose every `save` fails.
    pub fn failing() -> Self {
        Self {
            slot: Arc::default(),
            fail_saves: true,
        }
    }

    pub fn snapshot(&self) -> Vec<ContentItem> {
        self.slot.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl FavoritesStore for MemoryStore {
    fn load(&self) -> Result<Vec<ContentItem>> {
        Ok(self.snapshot())
    }

    fn save(&self, items: &[ContentItem]) -> Result<()> {
        if self.fail_saves {
            anyhow::bail!("memory store configured to fail");
        }
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| anyhow::anyhow!("favorites slot poisoned"))?;
        *slot = items.to_vec();
        Ok(())
    }
}

/// The user's "My List": ordered, unique by id, and written through to its
/// store on every change.
pub struct Favorites {
    items: Vec<ContentItem>,
    store: Box<dyn FavoritesStore>,
}

impl std::fmt::Debug for Favorites {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Favorites")
            .field("items", &self.items.len())
            .finish()
    }
}

impl Favorites {
    /// Read the persisted list. Duplicate ids in the file keep their first
    /// occurrence.
    pub fn load(store: Box<dyn FavoritesStore>) -> Result<Self> {
        let items = dedupe(store.load()?);
        Ok(Self { items, store })
    }

    /// Load, or start empty (still bound to `store`) when the stored list is
    /// unreadable.
    pub fn load_or_empty(store: Box<dyn FavoritesStore>) -> Self {
        let items = match store.load() {
            Ok(items) => dedupe(items),
            Err(e) => {
                tracing::error!("Failed to load favorites: {:#}", e);
                Vec::new()
            }
        };
        Self { items, store }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Remove the item if its id is present, append it otherwise, then
    /// persist the full list. Returns whether the item is now a favorite.
    ///
    /// A failed write undoes the in-memory change, so the list never differs
    /// from what the store holds.
    pub fn toggle(&mut self, item: &ContentItem) -> Result<bool> {
        let previous = self.items.clone();
        let now_favorited = match self.items.iter().position(|i| i.id == item.id) {
            Some(index) => {
                self.items.remove(index);
                false
            }
            None => {
                self.items.push(item.clone());
                true
            }
        };

        if let Err(e) = self.store.save(&self.items) {
            self.items = previous;
            return Err(e.context(format!("Failed to persist favorites after toggling {}", item.id)));
        }

        Ok(now_favorited)
    }

    /// Re-read the list from the store, replacing the in-memory copy.
    pub fn reload(&mut self) -> Result<()> {
        self.items = dedupe(self.store.load()?);
        Ok(())
    }
}

fn dedupe(items: Vec<ContentItem>) -> Vec<ContentItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::models::MediaType;

    fn item(id: u32) -> ContentItem {
        ContentItem {
            id,
            title: format!("Item {}", id),
            media_type: MediaType::Movie,
            overview: None,
            vote_average: None,
            release_date: None,
            poster_path: None,
            backdrop_path: None,
        }
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let store = MemoryStore::new();
        let mut favorites = Favorites::load(Box::new(store.clone())).unwrap();

        assert!(favorites.toggle(&item(603)).unwrap());
        assert_eq!(favorites.len(), 1);
        assert!(favorites.contains(603));
        assert_eq!(store.snapshot().len(), 1);

        assert!(!favorites.toggle(&item(603)).unwrap());
        assert!(favorites.is_empty());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_toggle_preserves_order() {
        let mut favorites = Favorites::load(Box::new(MemoryStore::new())).unwrap();
        for id in [3, 1, 2] {
            favorites.toggle(&item(id)).unwrap();
        }
        favorites.toggle(&item(1)).unwrap();

        let ids: Vec<u32> = favorites.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let mut favorites = Favorites::load(Box::new(MemoryStore::failing())).unwrap();
        assert!(favorites.toggle(&item(603)).is_err());
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_load_drops_duplicate_ids() {
        let store = MemoryStore::with_items(vec![item(1), item(2), item(1)]);
        let favorites = Favorites::load(Box::new(store)).unwrap();
        let ids: Vec<u32> = favorites.items().iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_json_file_store_roundtrip() {
        let path = std::env::temp_dir().join(format!(
            "tui_flix_favorites_{}.json",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        let store = JsonFileStore::new(path.clone());

        assert!(store.load().unwrap().is_empty());

        let mut favorites = Favorites::load(Box::new(store.clone())).unwrap();
        favorites.toggle(&item(603)).unwrap();

        let reloaded = Favorites::load(Box::new(store)).unwrap();
        assert_eq!(reloaded.items(), favorites.items());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn test_corrupt_file_is_moved_aside() {
        let path = std::env::temp_dir().join(format!(
            "tui_flix_corrupt_{}.json",
            std::process::id()
        ));
        fs::write(&path, "{ not a list").unwrap();

        let store = JsonFileStore::new(path.clone());
        let backup = store.backup_path();
        let _ = fs::remove_file(&backup);

        let mut favorites = Favorites::load_or_empty(Box::new(store));
        assert!(favorites.is_empty());
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(&backup).unwrap(), "{ not a list");

        // The next save starts a fresh file and leaves the backup alone.
        favorites.toggle(&item(603)).unwrap();
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&backup).unwrap(), "{ not a list");

        let _ = fs::remove_file(path);
        let _ = fs::remove_file(backup);
    }
}
