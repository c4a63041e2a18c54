//! Game settings and preferences
//!
//! Persisted separately from perks and scores under their own key.

use serde::{Deserialize, Serialize};

use crate::storage::{KeyValueStore, load_json, save_json};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Visible playfield width in world units (spawn x and magnet reach scale with it)
    pub playfield_width: f32,
    /// Vibrate on challenge rewards and loot drops
    pub haptics: bool,
    /// Runs allowed per UTC day (None = unlimited)
    pub daily_run_limit: Option<u32>,
    /// Wallet the backend keys scores by
    pub wallet_address: Option<String>,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
    /// Score service base URL (None = the page's own `/api`, or offline natively)
    pub api_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playfield_width: 900.0,
            haptics: true,
            daily_run_limit: None,
            wallet_address: None,
            seed: None,
            api_url: None,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "snowy-settings";

    /// Whether another run fits under the daily limit
    pub fn allows_run(&self, daily_run_count: u32) -> bool {
        self.daily_run_limit
            .is_none_or(|limit| daily_run_count < limit)
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &impl KeyValueStore) -> Self {
        match load_json::<Settings>(store, Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &impl KeyValueStore) {
        match save_json(store, Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::warn!("Failed to save settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.playfield_width, 900.0);
        assert!(settings.haptics);
        assert!(settings.allows_run(u32::MAX - 1));
    }

    #[test]
    fn test_daily_limit() {
        let settings = Settings {
            daily_run_limit: Some(3),
            ..Default::default()
        };
        assert!(settings.allows_run(2));
        assert!(!settings.allows_run(3));
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let store = MemoryStore::new();
        store.set(Settings::STORAGE_KEY, r#"{"haptics":false}"#).unwrap();
        let settings = Settings::load(&store);
        assert!(!settings.haptics);
        assert_eq!(settings.playfield_width, 900.0);
    }

    #[test]
    fn test_save_then_load() {
        let store = MemoryStore::new();
        let settings = Settings {
            seed: Some(42),
            wallet_address: Some("0xabc".to_string()),
            api_url: Some("https://snowy.example/api".to_string()),
            ..Default::default()
        };
        settings.save(&store);
        assert_eq!(Settings::load(&store), settings);
    }
}
