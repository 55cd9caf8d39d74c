//! Per-title progress records
//!
//! Persisted to LocalStorage. Only aggregates are kept (best score and play
//! count), never in-flight game state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::games::TitleId;

/// Aggregate record for one title
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Record {
    pub high_score: u64,
    pub times_played: u32,
    /// Unix timestamp (ms) of the last finished round, 0 if never
    pub last_played: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub records: BTreeMap<TitleId, Record>,
}

impl Progress {
    /// LocalStorage key (used only in wasm32)
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "chaos_arcade_progress";

    pub fn new() -> Self {
        Self::default()
    }

    /// Count a mounted round
    pub fn record_play(&mut self, title: TitleId) {
        self.records.entry(title).or_default().times_played += 1;
    }

    /// Fold in a finished round's score
    /// Returns true if it is a new best
    pub fn record_score(&mut self, title: TitleId, score: u64, timestamp: f64) -> bool {
        let record = self.records.entry(title).or_default();
        record.last_played = timestamp;
        if score > record.high_score {
            record.high_score = score;
            true
        } else {
            false
        }
    }

    pub fn best(&self, title: TitleId) -> u64 {
        self.records.get(&title).map(|r| r.high_score).unwrap_or(0)
    }

    pub fn times_played(&self, title: TitleId) -> u32 {
        self.records.get(&title).map(|r| r.times_played).unwrap_or(0)
    }

    /// Sum of best scores across titles
    pub fn total_score(&self) -> u64 {
        self.records.values().map(|r| r.high_score).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, GameError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load progress from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(progress) => {
                        log::info!("Loaded progress for {} titles", progress.records.len());
                        return progress;
                    }
                    Err(e) => log::warn!("Ignoring stored progress: {}", e),
                }
            }
        }

        log::info!("No progress found, starting fresh");
        Self::new()
    }

    /// Save progress to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::debug!("Progress saved ({} titles)", self.records.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
