//! Gameplay tuning.  All positions live in a normalised 0–100 playfield,
//! all durations are simulation milliseconds, all speeds are units per
//! delta unit (one reference frame).

use crate::entities::{Difficulty, EnemyKind, PowerUpKind};

// ── Clock ─────────────────────────────────────────────────────────────────────

/// Duration of one delta unit (one frame at 60 FPS).
pub const REFERENCE_FRAME_MS: f32 = 1000.0 / 60.0;

/// Upper bound on a single step's delta, so a stalled host can't
/// teleport enemies through the defense line.
pub const MAX_DELTA: f32 = 4.0;

// ── Player ────────────────────────────────────────────────────────────────────

pub const STARTING_LIVES: u32 = 3;
pub const PLAYER_START_X: f32 = 50.0;
pub const PLAYER_Y: f32 = 90.0;
pub const PLAYER_MIN_X: f32 = 5.0;
pub const PLAYER_MAX_X: f32 = 95.0;
pub const PLAYER_SPEED: f32 = 1.5;
pub const INVULNERABILITY_MS: u64 = 2000;

// ── Projectiles ───────────────────────────────────────────────────────────────

pub const PLAYER_PROJECTILE_VELOCITY: f32 = -2.0;
/// Vertical playable range; projectiles outside it are discarded.
pub const PROJECTILE_MIN_Y: f32 = -5.0;
pub const PROJECTILE_MAX_Y: f32 = 105.0;
pub const MULTI_SHOT_OFFSET: f32 = 3.0;
pub const BASE_FIRE_INTERVAL_MS: u64 = 250;
pub const RAPID_FIRE_INTERVAL_MS: u64 = 100;

// ── Enemies ───────────────────────────────────────────────────────────────────

pub const ENEMY_BASE_SPEED: f32 = 0.05;
/// Enemies at or past this line hit the player and are removed.
pub const DEFENSE_LINE_Y: f32 = 80.0;
pub const SLOW_MOTION_FACTOR: f32 = 0.5;

// ── Power-ups ─────────────────────────────────────────────────────────────────

pub const POWER_UP_DROP_CHANCE: f64 = 0.15;
pub const POWER_UP_DRIFT: f32 = 0.3;
pub const POWER_UP_LIFESPAN_MS: u64 = 8000;
pub const POWER_UP_MAX_Y: f32 = 105.0;
/// Half-extent of the flat power-up pickup box.
pub const PICKUP_HALF_EXTENT: f32 = 5.0;

// ── Scoring ───────────────────────────────────────────────────────────────────

pub const COMBO_TIER_LENGTH: u32 = 5;
pub const MAX_MULTIPLIER: u32 = 4;
/// Divisor applied to the final score before it is reported to the
/// arcade-wide score sink.
pub const BONUS_DIVISOR: u64 = 10;

// ── Ledger ────────────────────────────────────────────────────────────────────

pub const LEDGER_CAPACITY: usize = 10;
pub const MAX_NAME_LEN: usize = 10;

// ── Difficulty tables ────────────────────────────────────────────────────────

pub fn speed_multiplier(difficulty: Difficulty) -> f32 {
    match difficulty {
        Difficulty::Easy => 0.8,
        Difficulty::Normal => 1.5,
        Difficulty::Hard => 2.5,
        Difficulty::Insane => 4.0,
    }
}

/// Hit-box half extents `(width, height)` for each enemy class.
pub fn half_extents(kind: EnemyKind) -> (f32, f32) {
    match kind {
        EnemyKind::Scout => (3.0, 2.0),
        EnemyKind::Fighter => (3.5, 2.5),
        EnemyKind::Bomber => (4.0, 3.0),
    }
}

/// How long a collected effect stays active.
pub fn effect_duration_ms(kind: PowerUpKind) -> u64 {
    match kind {
        PowerUpKind::RapidFire
        | PowerUpKind::Shield
        | PowerUpKind::MultiShot
        | PowerUpKind::SlowMotion => 10_000,
    }
}
