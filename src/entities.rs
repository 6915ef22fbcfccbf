//! Game entity types.  Pure data, no logic.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Scout,
    Fighter,
    Bomber,
}

impl EnemyKind {
    /// Formation rows cycle through the three classes.
    pub fn for_row(row: u32) -> Self {
        match row % 3 {
            0 => EnemyKind::Scout,
            1 => EnemyKind::Fighter,
            _ => EnemyKind::Bomber,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Insane,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Normal,
        Difficulty::Hard,
        Difficulty::Insane,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
            Difficulty::Insane => "insane",
        }
    }

    /// Parses the lowercase label written to the save file.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GameStatus {
    /// Title / menu; no simulation.
    #[default]
    Idle,
    Playing,
    /// Simulation frozen, run retained.
    Paused,
    /// Score already finalised.
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PowerUpKind {
    /// Shortens the minimum interval between volleys.
    RapidFire,
    /// Absorbs exactly one damage event.
    Shield,
    /// Each volley emits three projectiles.
    MultiShot,
    /// Slows enemy descent.
    SlowMotion,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 4] = [
        PowerUpKind::RapidFire,
        PowerUpKind::Shield,
        PowerUpKind::MultiShot,
        PowerUpKind::SlowMotion,
    ];
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

/// A power-up falling through the playfield.
#[derive(Clone, Debug, PartialEq)]
pub struct PowerUp {
    pub id: u64,
    pub kind: PowerUpKind,
    pub x: f32,
    pub y: f32,
    /// Simulation time after which the item vanishes uncollected.
    pub expires_at: u64,
}

/// A timed modifier attached to the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerEffect {
    pub kind: PowerUpKind,
    pub expires_at: u64,
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileOwner {
    Player,
    Enemy,
}

/// Cosmetic marker so a presentation layer can tell volley shots apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileStyle {
    Standard,
    Spread,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    /// Vertical velocity per delta unit; negative travels up.
    pub vy: f32,
    pub owner: ProjectileOwner,
    pub style: ProjectileStyle,
}

// ── Player & enemy ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    /// Horizontal position, kept within [5, 95].
    pub x: f32,
    pub y: f32,
    pub lives: u32,
    pub invulnerable: bool,
    pub effects: Vec<PlayerEffect>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub id: u64,
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    /// Never 0 for a retained enemy.
    pub health: u32,
    pub points: u32,
    pub half_width: f32,
    pub half_height: f32,
}

// ── Ledger ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighScoreEntry {
    pub name: String,
    pub score: u64,
    pub wave: u32,
    /// Unix milliseconds at which the entry was recorded.
    pub timestamp: u64,
}

/// Counters that persist across sessions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LifetimeStats {
    pub games_played: u64,
    pub enemies_defeated: u64,
    pub best_wave: u32,
}

/// User preferences, persisted alongside the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Preferences {
    pub sound_enabled: bool,
    pub effects_enabled: bool,
    pub difficulty: Difficulty,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            effects_enabled: true,
            difficulty: Difficulty::Normal,
        }
    }
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Keys currently held down, polled once per step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

// ── Render snapshot ───────────────────────────────────────────────────────────

/// Read-only copy of everything a presentation layer needs for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub status: GameStatus,
    pub difficulty: Difficulty,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub power_ups: Vec<PowerUp>,
    pub active_power_ups: Vec<PlayerEffect>,
    pub score: u64,
    pub wave: u32,
    pub combo: u32,
    pub peak_combo: u32,
    pub multiplier: u32,
    pub lives: u32,
    pub sim_ms: u64,
}
