//! Top-10 high-score table.

use crate::config::{LEDGER_CAPACITY, MAX_NAME_LEN};
use crate::entities::HighScoreEntry;
use crate::error::LedgerError;

/// Scores sorted from best to worst, at most [`LEDGER_CAPACITY`] long.
///
/// Ties keep insertion order: an entry never overtakes an older entry with
/// the same score.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<HighScoreEntry>,
}

/// Trim, upper-case and clip a player name.
pub fn normalize_name(name: &str) -> Result<String, LedgerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::EmptyName);
    }
    Ok(trimmed.to_uppercase().chars().take(MAX_NAME_LEN).collect())
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from stored entries, restoring name rules, order and
    /// capacity.  Entries without a usable name are dropped.
    pub fn from_entries(entries: Vec<HighScoreEntry>) -> Self {
        let mut entries: Vec<HighScoreEntry> = entries
            .into_iter()
            .filter_map(|entry| match normalize_name(&entry.name) {
                Ok(name) => Some(HighScoreEntry { name, ..entry }),
                Err(_) => {
                    tracing::warn!(score = entry.score, "dropping unnamed high-score entry");
                    None
                }
            })
            .collect();
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(LEDGER_CAPACITY);
        Self { entries }
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `score` would make it onto the table.
    pub fn qualifies(&self, score: u64) -> bool {
        match self.entries.last() {
            Some(lowest) if self.entries.len() >= LEDGER_CAPACITY => score > lowest.score,
            _ => true,
        }
    }

    /// Insert a score.  Returns the 0-based rank it landed on, or `None` if
    /// it fell off the end of a full table.
    pub fn record(
        &mut self,
        name: &str,
        score: u64,
        wave: u32,
        timestamp: u64,
    ) -> Result<Option<usize>, LedgerError> {
        let name = normalize_name(name)?;
        let rank = self.entries.iter().take_while(|e| e.score >= score).count();
        if rank >= LEDGER_CAPACITY {
            return Ok(None);
        }
        self.entries.insert(
            rank,
            HighScoreEntry {
                name,
                score,
                wave,
                timestamp,
            },
        );
        self.entries.truncate(LEDGER_CAPACITY);
        Ok(Some(rank))
    }
}
