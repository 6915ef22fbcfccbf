//! Power-up lifecycle: drops, pickup, timed effects and their queries.
//!
//! Effects are stored as independent entries.  Picking up a kind that is
//! already active appends a second entry with its own expiry; each entry is
//! pruned on its own, so the longest remaining one decides how long the
//! kind stays active.

use rand::Rng;

use crate::config::{
    effect_duration_ms, BASE_FIRE_INTERVAL_MS, POWER_UP_DRIFT, POWER_UP_DROP_CHANCE,
    POWER_UP_LIFESPAN_MS, POWER_UP_MAX_Y, RAPID_FIRE_INTERVAL_MS, SLOW_MOTION_FACTOR,
};
use crate::entities::{Player, PlayerEffect, PowerUp, PowerUpKind};

// ── World objects ────────────────────────────────────────────────────────────

/// Roll the drop chance for a destroyed enemy at `(x, y)`.
pub fn roll_drop(
    rng: &mut impl Rng,
    x: f32,
    y: f32,
    now: u64,
    next_id: &mut u64,
) -> Option<PowerUp> {
    if !rng.gen_bool(POWER_UP_DROP_CHANCE) {
        return None;
    }
    let kind = PowerUpKind::ALL[rng.gen_range(0..PowerUpKind::ALL.len())];
    let id = *next_id;
    *next_id += 1;
    Some(PowerUp {
        id,
        kind,
        x,
        y,
        expires_at: now + POWER_UP_LIFESPAN_MS,
    })
}

/// Drift falling items down and drop the ones that left the field or
/// outlived their lifespan.
pub fn advance_power_ups(power_ups: &mut Vec<PowerUp>, delta: f32, now: u64) {
    for p in power_ups.iter_mut() {
        p.y += POWER_UP_DRIFT * delta;
    }
    power_ups.retain(|p| p.y <= POWER_UP_MAX_Y && p.expires_at > now);
}

// ── Player effects ───────────────────────────────────────────────────────────

/// Turn a collected item into a timed effect on the player.
pub fn apply_pickup(player: &mut Player, kind: PowerUpKind, now: u64) {
    player.effects.push(PlayerEffect {
        kind,
        expires_at: now + effect_duration_ms(kind),
    });
}

pub fn prune_expired(player: &mut Player, now: u64) {
    player.effects.retain(|e| e.expires_at > now);
}

pub fn has_effect(player: &Player, kind: PowerUpKind) -> bool {
    player.effects.iter().any(|e| e.kind == kind)
}

/// Spend one shield entry, if any.  Returns whether a hit was absorbed.
pub fn consume_shield(player: &mut Player) -> bool {
    match player
        .effects
        .iter()
        .position(|e| e.kind == PowerUpKind::Shield)
    {
        Some(i) => {
            let _ = player.effects.remove(i);
            true
        }
        None => false,
    }
}

/// Minimum simulation time between two volleys.
pub fn fire_interval_ms(player: &Player) -> u64 {
    if has_effect(player, PowerUpKind::RapidFire) {
        RAPID_FIRE_INTERVAL_MS
    } else {
        BASE_FIRE_INTERVAL_MS
    }
}

/// Scale applied to enemy descent.
pub fn descent_factor(player: &Player) -> f32 {
    if has_effect(player, PowerUpKind::SlowMotion) {
        SLOW_MOTION_FACTOR
    } else {
        1.0
    }
}
