//! Durable record of the ledger, lifetime counters and preferences.
//!
//! Only cross-session state is written here; a run in progress never is.
//! Loading is forgiving: every field is decoded on its own and anything
//! missing or malformed falls back to its default.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::{Difficulty, HighScoreEntry, LifetimeStats, Preferences};
use crate::error::StoreError;
use crate::ledger::Ledger;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub high_scores: Vec<HighScoreEntry>,
    pub total_games_played: u64,
    pub total_enemies_defeated: u64,
    pub best_wave: u32,
    pub sound_enabled: bool,
    pub effects_enabled: bool,
    pub difficulty: Difficulty,
}

impl Default for PersistedRecord {
    fn default() -> Self {
        Self::from_parts(&Ledger::new(), LifetimeStats::default(), Preferences::default())
    }
}

impl PersistedRecord {
    pub fn from_parts(ledger: &Ledger, stats: LifetimeStats, prefs: Preferences) -> Self {
        Self {
            high_scores: ledger.entries().to_vec(),
            total_games_played: stats.games_played,
            total_enemies_defeated: stats.enemies_defeated,
            best_wave: stats.best_wave,
            sound_enabled: prefs.sound_enabled,
            effects_enabled: prefs.effects_enabled,
            difficulty: prefs.difficulty,
        }
    }

    pub fn ledger(&self) -> Ledger {
        Ledger::from_entries(self.high_scores.clone())
    }

    pub fn stats(&self) -> LifetimeStats {
        LifetimeStats {
            games_played: self.total_games_played,
            enemies_defeated: self.total_enemies_defeated,
            best_wave: self.best_wave,
        }
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            sound_enabled: self.sound_enabled,
            effects_enabled: self.effects_enabled,
            difficulty: self.difficulty,
        }
    }

    pub fn to_json(&self) -> Result<String, StoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a saved record, never failing.
    pub fn from_json(text: &str) -> Self {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => Self::from_value(&value),
            Err(err) => {
                tracing::warn!(%err, "save file is not valid json, using defaults");
                Self::default()
            }
        }
    }

    fn from_value(value: &Value) -> Self {
        let defaults = Self::default();
        let field = |key: &str| value.get(key).filter(|v| !v.is_null());

        let high_scores = match field("highScores").and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .filter_map(|item| match HighScoreEntry::deserialize(item) {
                    Ok(entry) => Some(entry),
                    Err(err) => {
                        tracing::warn!(%err, "dropping malformed high-score entry");
                        None
                    }
                })
                .collect(),
            None => defaults.high_scores.clone(),
        };

        Self {
            high_scores,
            total_games_played: decode(field("totalGamesPlayed"), "totalGamesPlayed", Value::as_u64)
                .unwrap_or(defaults.total_games_played),
            total_enemies_defeated: decode(
                field("totalEnemiesDefeated"),
                "totalEnemiesDefeated",
                Value::as_u64,
            )
            .unwrap_or(defaults.total_enemies_defeated),
            best_wave: decode(field("bestWave"), "bestWave", |v| {
                v.as_u64().and_then(|n| u32::try_from(n).ok())
            })
            .unwrap_or(defaults.best_wave),
            sound_enabled: decode(field("soundEnabled"), "soundEnabled", Value::as_bool)
                .unwrap_or(defaults.sound_enabled),
            effects_enabled: decode(field("effectsEnabled"), "effectsEnabled", Value::as_bool)
                .unwrap_or(defaults.effects_enabled),
            difficulty: decode(field("difficulty"), "difficulty", |v| {
                v.as_str().and_then(Difficulty::from_label)
            })
            .unwrap_or(defaults.difficulty),
        }
    }
}

fn decode<T>(value: Option<&Value>, key: &str, read: impl Fn(&Value) -> Option<T>) -> Option<T> {
    let value = value?;
    let decoded = read(value);
    if decoded.is_none() {
        tracing::warn!(key, %value, "ignoring malformed saved field");
    }
    decoded
}

// ── Stores ───────────────────────────────────────────────────────────────────

/// Key-value durable store for the [`PersistedRecord`].  Writes are
/// last-write-wins.
pub trait RecordStore {
    /// Read the saved record, or defaults when there is none.
    fn load(&self) -> PersistedRecord;

    fn save(&mut self, record: &PersistedRecord) -> Result<(), StoreError>;
}

/// JSON file on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonFileStore {
    fn load(&self) -> PersistedRecord {
        match fs::read_to_string(&self.path) {
            Ok(text) => PersistedRecord::from_json(&text),
            Err(err) => {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(%err, path = %self.path.display(), "could not read save file");
                }
                PersistedRecord::default()
            }
        }
    }

    fn save(&mut self, record: &PersistedRecord) -> Result<(), StoreError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, record.to_json()?)?;
        Ok(())
    }
}

/// In-memory store.  Clones share the same slot, so a caller can keep a
/// handle and inspect what was written.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with raw saved text.
    pub fn with_contents(text: impl Into<String>) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(text.into()))),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self) -> PersistedRecord {
        self.slot
            .borrow()
            .as_deref()
            .map(PersistedRecord::from_json)
            .unwrap_or_default()
    }

    fn save(&mut self, record: &PersistedRecord) -> Result<(), StoreError> {
        *self.slot.borrow_mut() = Some(record.to_json()?);
        Ok(())
    }
}
