//! Combo streak and score multiplier.

use crate::config::{COMBO_TIER_LENGTH, MAX_MULTIPLIER};

/// Multiplier for a given kill streak: ×1 for 0–4, ×2 for 5–9,
/// ×3 for 10–14 and ×4 from 15 on.
pub fn combo_multiplier(streak: u32) -> u32 {
    (streak / COMBO_TIER_LENGTH + 1).min(MAX_MULTIPLIER)
}

/// Points for destroying an enemy at the given streak.
pub fn points_for(enemy_points: u32, streak: u32) -> u64 {
    u64::from(enemy_points) * u64::from(combo_multiplier(streak))
}

/// Tracks the current kill streak and the best streak of the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ComboTracker {
    pub streak: u32,
    pub peak: u32,
}

impl ComboTracker {
    pub fn multiplier(&self) -> u32 {
        combo_multiplier(self.streak)
    }

    /// Scores a kill at the current multiplier, then extends the streak.
    pub fn register_kill(&mut self, enemy_points: u32) -> u64 {
        let awarded = points_for(enemy_points, self.streak);
        self.streak += 1;
        self.peak = self.peak.max(self.streak);
        awarded
    }

    /// Player took damage: the streak is lost, the peak is kept.
    pub fn break_streak(&mut self) {
        self.streak = 0;
    }
}
