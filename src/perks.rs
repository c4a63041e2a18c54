//! Cross-run perks
//!
//! The start-speed bonus and cosmetic skins outlive a run. They are stored as
//! one JSON object, read once at startup and written after every change.

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_START_SPEED_BONUS, START_SPEED_STEP};
use crate::storage::{KeyValueStore, load_json, save_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skin {
    #[default]
    Default,
    Frost,
    Blaze,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UnlockedSkins {
    pub frost: bool,
    pub blaze: bool,
}

/// Persisted perk record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Perks {
    pub start_speed_bonus: f32,
    pub player_skin: Skin,
    pub unlocked_skins: UnlockedSkins,
}

impl Perks {
    /// The default skin is always available
    pub fn is_unlocked(&self, skin: Skin) -> bool {
        match skin {
            Skin::Default => true,
            Skin::Frost => self.unlocked_skins.frost,
            Skin::Blaze => self.unlocked_skins.blaze,
        }
    }

    pub fn unlock(&mut self, skin: Skin) {
        match skin {
            Skin::Default => {}
            Skin::Frost => self.unlocked_skins.frost = true,
            Skin::Blaze => self.unlocked_skins.blaze = true,
        }
    }

    pub fn start_speed_maxed(&self) -> bool {
        MAX_START_SPEED_BONUS - self.start_speed_bonus < START_SPEED_STEP / 2.0
    }

    /// Raise the baseline start speed one step (saturating)
    pub fn raise_start_speed(&mut self) {
        self.start_speed_bonus = (self.start_speed_bonus + START_SPEED_STEP).min(MAX_START_SPEED_BONUS);
    }

    /// Repair values a hand-edited or stale record might carry
    fn sanitized(mut self) -> Self {
        if !self.start_speed_bonus.is_finite() {
            self.start_speed_bonus = 0.0;
        }
        self.start_speed_bonus = self.start_speed_bonus.clamp(0.0, MAX_START_SPEED_BONUS);
        if !self.is_unlocked(self.player_skin) {
            self.player_skin = Skin::Default;
        }
        self
    }
}

/// Loads and saves [`Perks`] through a key-value store
#[derive(Debug, Clone)]
pub struct PerkStore<S> {
    store: S,
}

impl<S: KeyValueStore> PerkStore<S> {
    pub const STORAGE_KEY: &'static str = "snowy-perks";

    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Stored perks, or defaults when absent or unreadable
    pub fn load(&self) -> Perks {
        match load_json::<Perks>(&self.store, Self::STORAGE_KEY) {
            Ok(Some(perks)) => {
                log::info!("Loaded perks (start speed +{:.1})", perks.start_speed_bonus);
                perks.sanitized()
            }
            Ok(None) => Perks::default(),
            Err(e) => {
                log::warn!("Discarding stored perks: {e}");
                Perks::default()
            }
        }
    }

    /// Best-effort write
    pub fn save(&self, perks: &Perks) {
        if let Err(e) = save_json(&self.store, Self::STORAGE_KEY, perks) {
            log::warn!("Failed to save perks: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_wire_shape() {
        let perks = Perks {
            start_speed_bonus: 0.4,
            player_skin: Skin::Frost,
            unlocked_skins: UnlockedSkins {
                frost: true,
                blaze: false,
            },
        };
        let json = serde_json::to_value(&perks).unwrap();
        assert_eq!(json["playerSkin"], "frost");
        assert_eq!(json["unlockedSkins"]["frost"], true);
        assert!(json.get("startSpeedBonus").is_some());
    }

    #[test]
    fn test_missing_fields_default() {
        let perks: Perks = serde_json::from_str(r#"{"playerSkin":"blaze"}"#).unwrap();
        assert_eq!(perks.start_speed_bonus, 0.0);
        assert!(!perks.unlocked_skins.blaze);
    }

    #[test]
    fn test_start_speed_saturates() {
        let mut perks = Perks::default();
        for _ in 0..10 {
            perks.raise_start_speed();
        }
        assert_eq!(perks.start_speed_bonus, MAX_START_SPEED_BONUS);
        assert!(perks.start_speed_maxed());
    }

    #[test]
    fn test_store_roundtrip() {
        let store = PerkStore::new(MemoryStore::new());
        assert_eq!(store.load(), Perks::default());
        let mut perks = Perks::default();
        perks.unlock(Skin::Blaze);
        perks.player_skin = Skin::Blaze;
        store.save(&perks);
        assert_eq!(store.load(), perks);
    }

    #[test]
    fn test_corrupt_record_yields_defaults() {
        let memory = MemoryStore::new();
        memory.set(PerkStore::<MemoryStore>::STORAGE_KEY, "[1, 2").unwrap();
        let store = PerkStore::new(memory);
        assert_eq!(store.load(), Perks::default());
    }

    #[test]
    fn test_locked_skin_selection_is_repaired() {
        let memory = MemoryStore::new();
        memory
            .set(
                PerkStore::<MemoryStore>::STORAGE_KEY,
                r#"{"startSpeedBonus":9,"playerSkin":"frost","unlockedSkins":{"frost":false,"blaze":false}}"#,
            )
            .unwrap();
        let perks = PerkStore::new(memory).load();
        assert_eq!(perks.player_skin, Skin::Default);
        assert_eq!(perks.start_speed_bonus, MAX_START_SPEED_BONUS);
    }
}
