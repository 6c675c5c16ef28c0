//! User settings persisted in a string-keyed store of JSON-encoded values.
//!
//! Keys: `apiEndpoint` (backend URL), `favorites` (symbol list) and
//! `portfolio` (holdings). Missing or unreadable entries fall back to defaults.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

#[cfg(debug_assertions)]
use crate::config::DEBUG_FLAGS;
use crate::config::ENDPOINTS;
use crate::domain::symbol::normalize_symbol;
use crate::models::Holding;

pub const KEY_API_ENDPOINT: &str = "apiEndpoint";
pub const KEY_FAVORITES: &str = "favorites";
pub const KEY_PORTFOLIO: &str = "portfolio";

pub const DEFAULT_FAVORITES: &[&str] = &["BTCUSDT", "ETHUSDT", "SOLUSDT", "XRPUSDT"];

/// Minimal key-value persistence. Values are opaque strings (JSON in practice).
pub trait KeyValueStore {
    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&mut self, key: &str, value: String);
}

/// In-memory store (tests, and headless runs without a settings file).
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

/// A JSON object on disk holding the same string entries.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: HashMap<String, String>,
}

impl JsonFileStore {
    /// Opens `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .context(format!("Failed to read settings file: {}", path.display()))?;
            serde_json::from_str(&text)
                .context(format!("Failed to parse settings file: {}", path.display()))?
        } else {
            HashMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context(format!("Failed to create directory: {}", parent.display()))?;
            }
        }
        let text = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, text)
            .context(format!("Failed to write settings file: {}", self.path.display()))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_string(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set_string(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserSettings {
    pub backend_url: String,
    pub favorites: Vec<String>,
    pub holdings: Vec<Holding>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            backend_url: ENDPOINTS.backend.base_url.to_string(),
            favorites: DEFAULT_FAVORITES.iter().map(|s| s.to_string()).collect(),
            holdings: Vec::new(),
        }
    }
}

impl UserSettings {
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Self {
        let defaults = Self::default();

        // The endpoint has historically been stored as a bare string as well as JSON.
        let backend_url = store
            .get_string(KEY_API_ENDPOINT)
            .map(|raw| serde_json::from_str::<String>(&raw).unwrap_or(raw))
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or(defaults.backend_url);

        let favorites = read_json::<Vec<String>, S>(store, KEY_FAVORITES)
            .map(|list| {
                list.iter()
                    .map(|s| normalize_symbol(s))
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.favorites);

        let holdings = read_json::<Vec<Holding>, S>(store, KEY_PORTFOLIO).unwrap_or_default();

        Self {
            backend_url,
            favorites,
            holdings,
        }
    }

    pub fn save<S: KeyValueStore + ?Sized>(&self, store: &mut S) {
        write_json(store, KEY_API_ENDPOINT, &self.backend_url);
        write_json(store, KEY_FAVORITES, &self.favorites);
        write_json(store, KEY_PORTFOLIO, &self.holdings);
    }

    /// Parses a comma-separated favorites field ("btcusdt, eth usdt").
    /// Returns `None` when nothing usable is left, leaving the old list in place.
    pub fn parse_favorites(input: &str) -> Option<Vec<String>> {
        let list: Vec<String> = input
            .split(',')
            .map(|s| normalize_symbol(&s.replace(' ', "")))
            .filter(|s| !s.is_empty())
            .collect();
        (!list.is_empty()).then_some(list)
    }
}

fn read_json<T: DeserializeOwned, S: KeyValueStore + ?Sized>(store: &S, key: &str) -> Option<T> {
    let raw = store.get_string(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("⚠️  Ignoring unreadable setting '{}': {}", key, e);
            None
        }
    }
}

fn write_json<T: Serialize + ?Sized, S: KeyValueStore + ?Sized>(store: &mut S, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => {
            #[cfg(debug_assertions)]
            if DEBUG_FLAGS.print_settings_serde {
                log::info!("[settings] {} <- {}", key, json);
            }
            store.set_string(key, json);
        }
        Err(e) => log::error!("Failed to encode setting '{}': {}", key, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_store_yields_defaults() {
        let settings = UserSettings::load(&MemoryStore::default());
        assert_eq!(settings, UserSettings::default());
        assert_eq!(settings.favorites[0], "BTCUSDT");
    }

    #[test]
    fn round_trips_through_store() {
        let mut store = MemoryStore::default();
        let settings = UserSettings {
            backend_url: "http://localhost:8000".to_string(),
            favorites: vec!["ADAUSDT".to_string()],
            holdings: vec![Holding {
                symbol: "ADAUSDT".to_string(),
                quantity: 10.0,
                cost_basis: 0.5,
            }],
        };
        settings.save(&mut store);
        assert_eq!(
            store.get_string(KEY_FAVORITES).as_deref(),
            Some(r#"["ADAUSDT"]"#)
        );
        assert_eq!(UserSettings::load(&store), settings);
    }

    #[test]
    fn bare_endpoint_string_and_bad_json_are_tolerated() {
        let mut store = MemoryStore::default();
        store.set_string(KEY_API_ENDPOINT, "http://example.test/".to_string());
        store.set_string(KEY_FAVORITES, "not json".to_string());
        let settings = UserSettings::load(&store);
        assert_eq!(settings.backend_url, "http://example.test");
        assert_eq!(settings.favorites.len(), DEFAULT_FAVORITES.len());
    }

    #[test]
    fn favorites_field_parsing() {
        assert_eq!(
            UserSettings::parse_favorites(" btcusdt, eth usdt ,,"),
            Some(vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()])
        );
        assert_eq!(UserSettings::parse_favorites(" , "), None);
    }

    #[test]
    fn json_file_store_persists() {
        let path = std::env::temp_dir().join(format!("pulse_dash_settings_{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut store = JsonFileStore::open(&path).unwrap();
        store.set_string(KEY_FAVORITES, r#"["DOGEUSDT"]"#.to_string());
        store.flush().unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(UserSettings::load(&reopened).favorites, vec!["DOGEUSDT".to_string()]);
        let _ = std::fs::remove_file(&path);
    }
}
