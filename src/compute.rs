//! Per-step simulation logic.
//!
//! Every function takes the run's [`SessionState`] by exclusive reference and
//! mutates it in place.  Randomness is injected through `rng` so tests can
//! drive the simulation with a seeded or mocked generator.  Nothing here
//! knows about wall-clock time: `sim_ms` is advanced by the caller.

use rand::Rng;

use crate::collision::{power_up_pickups, projectile_hits};
use crate::config::{
    speed_multiplier, DEFENSE_LINE_Y, ENEMY_BASE_SPEED, MULTI_SHOT_OFFSET, PLAYER_MAX_X,
    PLAYER_MIN_X, PLAYER_PROJECTILE_VELOCITY, PLAYER_SPEED, PLAYER_START_X, PLAYER_Y,
    PROJECTILE_MAX_Y, PROJECTILE_MIN_Y, STARTING_LIVES,
};
use crate::entities::{
    Difficulty, Enemy, HeldKeys, Player, PowerUp, PowerUpKind, Projectile, ProjectileOwner,
    ProjectileStyle,
};
use crate::power_ups::{
    advance_power_ups, apply_pickup, consume_shield, descent_factor, fire_interval_ms,
    has_effect, prune_expired, roll_drop,
};
use crate::scoring::ComboTracker;
use crate::wave::spawn_wave;

// ── Session state ────────────────────────────────────────────────────────────

/// Everything that belongs to one run.  Never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionState {
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub power_ups: Vec<PowerUp>,
    pub score: u64,
    pub wave: u32,
    pub combo: ComboTracker,
    pub difficulty: Difficulty,
    /// Simulation clock; only advances while the run is being played.
    pub sim_ms: u64,
    pub last_shot_at: Option<u64>,
    /// Enemies destroyed this run.
    pub kills: u64,
    pub next_id: u64,
}

/// What happened to the player when a damage event reached them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageResult {
    /// Invulnerability window still open.
    Ignored,
    /// A shield entry was spent instead of a life.
    Absorbed,
    LifeLost,
}

/// Summary of one step, used by the state machine for its side effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepOutcome {
    pub kills: u32,
    pub lives_lost: u32,
    pub shields_spent: u32,
    pub breaches: u32,
    pub pickups: u32,
    pub wave_spawned: Option<u32>,
}

// ── Constructors ─────────────────────────────────────────────────────────────

pub fn new_player() -> Player {
    Player {
        x: PLAYER_START_X,
        y: PLAYER_Y,
        lives: STARTING_LIVES,
        invulnerable: false,
        effects: Vec::new(),
    }
}

/// Fresh run at wave 1 with its formation already spawned.
pub fn init_session(difficulty: Difficulty) -> SessionState {
    let mut next_id = 0;
    let enemies = spawn_wave(1, &mut next_id);
    SessionState {
        player: new_player(),
        enemies,
        projectiles: Vec::new(),
        power_ups: Vec::new(),
        score: 0,
        wave: 1,
        combo: ComboTracker::default(),
        difficulty,
        sim_ms: 0,
        last_shot_at: None,
        kills: 0,
        next_id,
    }
}

// ── Input-driven transitions ─────────────────────────────────────────────────

/// Continuous horizontal movement from the held keys.  Holding both
/// directions cancels out.
pub fn move_player(state: &mut SessionState, keys: HeldKeys, delta: f32) {
    let direction = match (keys.left, keys.right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => return,
    };
    state.player.x =
        (state.player.x + direction * PLAYER_SPEED * delta).clamp(PLAYER_MIN_X, PLAYER_MAX_X);
}

/// Fire a volley if the fire interval has elapsed.  Returns whether
/// anything was fired.
pub fn player_fire(state: &mut SessionState) -> bool {
    let interval = fire_interval_ms(&state.player);
    if let Some(last) = state.last_shot_at {
        if state.sim_ms.saturating_sub(last) < interval {
            return false;
        }
    }

    let x = state.player.x;
    let y = state.player.y - 3.0;
    let mut volley = vec![(x, ProjectileStyle::Standard)];
    if has_effect(&state.player, PowerUpKind::MultiShot) {
        volley.push((x - MULTI_SHOT_OFFSET, ProjectileStyle::Spread));
        volley.push((x + MULTI_SHOT_OFFSET, ProjectileStyle::Spread));
    }

    for (px, style) in volley {
        let id = state.next_id;
        state.next_id += 1;
        state.projectiles.push(Projectile {
            id,
            x: px,
            y,
            vy: PLAYER_PROJECTILE_VELOCITY,
            owner: ProjectileOwner::Player,
            style,
        });
    }
    state.last_shot_at = Some(state.sim_ms);
    true
}

// ── Movement ─────────────────────────────────────────────────────────────────

pub fn advance_projectiles(projectiles: &mut Vec<Projectile>, delta: f32) {
    for p in projectiles.iter_mut() {
        p.y += p.vy * delta;
    }
    projectiles.retain(|p| (PROJECTILE_MIN_Y..=PROJECTILE_MAX_Y).contains(&p.y));
}

/// Descent per delta unit for the current difficulty and effects.
pub fn enemy_speed(state: &SessionState) -> f32 {
    ENEMY_BASE_SPEED * speed_multiplier(state.difficulty) * descent_factor(&state.player)
}

pub fn advance_enemies(state: &mut SessionState, delta: f32) {
    let dy = enemy_speed(state) * delta;
    for e in state.enemies.iter_mut() {
        e.y += dy;
    }
}

// ── Damage ───────────────────────────────────────────────────────────────────

/// Run one damage event through invulnerability, then shield, then lives.
pub fn apply_damage(state: &mut SessionState) -> DamageResult {
    if state.player.invulnerable {
        return DamageResult::Ignored;
    }
    absorb_or_lose_life(state)
}

/// Damage that invulnerability doesn't stop: a shield entry is spent if
/// there is one, otherwise a life, which opens a fresh invulnerability
/// window.
pub fn absorb_or_lose_life(state: &mut SessionState) -> DamageResult {
    if consume_shield(&mut state.player) {
        tracing::debug!(sim_ms = state.sim_ms, "shield absorbed a hit");
        return DamageResult::Absorbed;
    }
    state.player.lives = state.player.lives.saturating_sub(1);
    state.player.invulnerable = true;
    state.combo.break_streak();
    tracing::debug!(lives = state.player.lives, "player hit");
    DamageResult::LifeLost
}

fn tally_damage(outcome: &mut StepOutcome, result: DamageResult) {
    match result {
        DamageResult::LifeLost => outcome.lives_lost += 1,
        DamageResult::Absorbed => outcome.shields_spent += 1,
        DamageResult::Ignored => {}
    }
}

/// Enemies at or past the defense line are removed whatever their remaining
/// health.  Each one is a separate hit that ignores invulnerability; only a
/// shield entry can take it instead of a life.
pub fn resolve_breaches(state: &mut SessionState, outcome: &mut StepOutcome) {
    let breaching = state
        .enemies
        .iter()
        .filter(|e| e.y >= DEFENSE_LINE_Y)
        .count();
    if breaching == 0 {
        return;
    }
    state.enemies.retain(|e| e.y < DEFENSE_LINE_Y);
    for _ in 0..breaching {
        outcome.breaches += 1;
        if state.player.lives == 0 {
            continue;
        }
        let result = absorb_or_lose_life(state);
        tally_damage(outcome, result);
    }
}

// ── Collisions ───────────────────────────────────────────────────────────────

/// Apply projectile hits: damage enemies, consume projectiles, score kills
/// and roll power-up drops.
pub fn resolve_hits(state: &mut SessionState, rng: &mut impl Rng, outcome: &mut StepOutcome) {
    let hits = projectile_hits(&state.projectiles, &state.enemies);
    if hits.is_empty() {
        return;
    }

    let mut spent = vec![false; state.projectiles.len()];
    for hit in &hits {
        spent[hit.projectile] = true;
        let enemy = &mut state.enemies[hit.enemy];
        enemy.health = enemy.health.saturating_sub(1);
        if enemy.health > 0 {
            continue;
        }

        let (points, x, y) = (enemy.points, enemy.x, enemy.y);
        state.score += state.combo.register_kill(points);
        state.kills += 1;
        outcome.kills += 1;
        if let Some(drop) = roll_drop(rng, x, y, state.sim_ms, &mut state.next_id) {
            state.power_ups.push(drop);
        }
    }

    let mut index = 0;
    state.projectiles.retain(|_| {
        let keep = !spent[index];
        index += 1;
        keep
    });
    state.enemies.retain(|e| e.health > 0);
}

/// Convert touched power-ups into player effects.
pub fn resolve_pickups(state: &mut SessionState, outcome: &mut StepOutcome) {
    let picked = power_up_pickups(&state.power_ups, &state.player);
    for &i in picked.iter().rev() {
        let item = state.power_ups.remove(i);
        apply_pickup(&mut state.player, item.kind, state.sim_ms);
        outcome.pickups += 1;
    }
}

// ── Per-step tick ────────────────────────────────────────────────────────────

/// Advance the run by `delta` units.  The caller has already moved
/// `sim_ms` forward for this step.
pub fn step_world(
    state: &mut SessionState,
    keys: HeldKeys,
    delta: f32,
    rng: &mut impl Rng,
) -> StepOutcome {
    let mut outcome = StepOutcome::default();

    // ── 1. Input ─────────────────────────────────────────────────────────────
    move_player(state, keys, delta);
    if keys.fire {
        let _ = player_fire(state);
    }

    // ── 2. Movement ──────────────────────────────────────────────────────────
    prune_expired(&mut state.player, state.sim_ms);
    advance_projectiles(&mut state.projectiles, delta);
    advance_enemies(state, delta);
    advance_power_ups(&mut state.power_ups, delta, state.sim_ms);
    resolve_breaches(state, &mut outcome);
    if state.player.lives == 0 {
        return outcome;
    }

    // ── 3. Next wave once the formation is gone ──────────────────────────────
    if state.enemies.is_empty() {
        state.wave += 1;
        state.enemies = spawn_wave(state.wave, &mut state.next_id);
        outcome.wave_spawned = Some(state.wave);
    }

    // ── 4. Collisions ────────────────────────────────────────────────────────
    resolve_hits(state, rng, &mut outcome);
    resolve_pickups(state, &mut outcome);

    outcome
}
