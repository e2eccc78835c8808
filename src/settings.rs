//! Game settings
//!
//! Persisted in LocalStorage on the web; every field falls back to the
//! built-in game constants when missing.

use serde::{Deserialize, Serialize};

use crate::GameError;
use crate::consts::{
    CHAIN_WINDOW, DISTANCE_PER_RATIO, HEIGHT_PER_RATIO, SPIN_THRESHOLD, SQUAT_MAX_MS, SQUAT_RESTORE_MS,
};
use crate::sim::JumpParams;

/// Session tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Blocks kept alive (minimum 2)
    pub chain_window: usize,
    /// Hold time for a full-strength jump
    pub squat_max_ms: f64,
    /// Pose restore time after a full-strength squat
    pub squat_restore_ms: f64,
    /// Jumps charged above this ratio spin the hero
    pub spin_threshold: f64,
    /// Jump distance at full charge
    pub distance_per_ratio: f64,
    /// Jump height at full charge
    pub height_per_ratio: f64,
    /// Play the drop-in intro when a room starts
    pub intro: bool,
    /// Our own name on the realtime channel; messages under it are ignored
    pub player_name: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chain_window: CHAIN_WINDOW,
            squat_max_ms: SQUAT_MAX_MS,
            squat_restore_ms: SQUAT_RESTORE_MS,
            spin_threshold: SPIN_THRESHOLD,
            distance_per_ratio: DISTANCE_PER_RATIO,
            height_per_ratio: HEIGHT_PER_RATIO,
            intro: true,
            player_name: None,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, GameError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, GameError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Jump shape for a charge ratio under these settings
    pub fn jump_params(&self, ratio: f64) -> JumpParams {
        JumpParams::scaled(ratio, self.distance_per_ratio, self.height_per_ratio)
    }

    /// Settings from a stored JSON blob, falling back to defaults
    fn from_stored(stored: Option<String>) -> Self {
        match stored.map(|json| Self::from_json(&json)) {
            Some(Ok(settings)) => {
                log::info!("Loaded stored settings");
                settings
            }
            Some(Err(e)) => {
                log::warn!("Ignoring stored settings: {e}");
                Self::default()
            }
            None => Self::default(),
        }
    }

    /// Load settings from LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let stored = local_storage().and_then(|storage| storage.get_item(STORAGE_KEY).ok().flatten());
        Self::from_stored(stored)
    }

    /// Save settings to LocalStorage
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) -> Result<(), GameError> {
        let json = self.to_json()?;
        match local_storage() {
            Some(storage) if storage.set_item(STORAGE_KEY, &json).is_ok() => log::info!("Settings saved"),
            _ => log::warn!("LocalStorage unavailable, settings not saved"),
        }
        Ok(())
    }

    /// Native builds have no settings store
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::from_stored(None)
    }
}

#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "jump_cube_settings";

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok()?
}
