//! Game state machine.
//!
//! ```text
//!   idle ──start──▶ playing ──pause──▶ paused
//!    ▲               │  ▲                │
//!    │               │  └────resume──────┤
//!    │        lives = 0                  │
//!    │               ▼                   │
//!    └──reset─── gameOver      idle ◀─reset
//! ```
//!
//! [`Game`] is the only part of the core with outside side effects: it
//! writes the persisted record and notifies the arcade-wide score sink.
//! Requests that don't fit the current state are silently ignored.

use rand::Rng;

use crate::compute::{init_session, step_world, SessionState, StepOutcome};
use crate::config::{BONUS_DIVISOR, INVULNERABILITY_MS, REFERENCE_FRAME_MS};
use crate::entities::{
    Difficulty, GameStatus, HeldKeys, LifetimeStats, Preferences, Snapshot,
};
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::store::{PersistedRecord, RecordStore};

/// Receives the end-of-game bonus for the cross-game score ledger.
pub trait ScoreSink {
    fn report_bonus(&mut self, units: u64);
}

/// Sink that drops every report.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullScoreSink;

impl ScoreSink for NullScoreSink {
    fn report_bonus(&mut self, _units: u64) {}
}

/// The result of a run that ended naturally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinishedRun {
    pub score: u64,
    pub wave: u32,
    pub peak_combo: u32,
    pub bonus: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DeferredAction {
    ClearInvulnerability,
}

/// A one-shot task that fires once the simulation clock reaches `due_at`.
/// Tasks belonging to an older session are discarded unfired.
#[derive(Clone, Copy, Debug)]
struct DeferredTask {
    session: u64,
    due_at: u64,
    action: DeferredAction,
}

pub struct Game {
    status: GameStatus,
    session: Option<SessionState>,
    session_id: u64,
    tasks: Vec<DeferredTask>,
    ledger: Ledger,
    stats: LifetimeStats,
    prefs: Preferences,
    last_run: Option<FinishedRun>,
    /// Cleared once the run's score has been offered to the ledger.
    awaiting_name: bool,
    store: Box<dyn RecordStore>,
    sink: Box<dyn ScoreSink>,
}

impl Game {
    /// Load the persisted record and sit idle.
    pub fn new(store: Box<dyn RecordStore>, sink: Box<dyn ScoreSink>) -> Self {
        let record = store.load();
        Self {
            status: GameStatus::Idle,
            session: None,
            session_id: 0,
            tasks: Vec::new(),
            ledger: record.ledger(),
            stats: record.stats(),
            prefs: record.preferences(),
            last_run: None,
            awaiting_name: false,
            store,
            sink,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn stats(&self) -> LifetimeStats {
        self.stats
    }

    pub fn preferences(&self) -> Preferences {
        self.prefs
    }

    pub fn last_run(&self) -> Option<FinishedRun> {
        self.last_run
    }

    /// Number of deferred tasks still queued.
    pub fn pending_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the finished run can still be entered into the ledger.
    pub fn awaiting_name(&self) -> bool {
        self.status == GameStatus::GameOver && self.awaiting_name
    }

    /// Render-facing copy of the current run, if there is one.
    pub fn snapshot(&self) -> Option<Snapshot> {
        let s = self.session.as_ref()?;
        Some(Snapshot {
            status: self.status,
            difficulty: s.difficulty,
            player: s.player.clone(),
            enemies: s.enemies.clone(),
            projectiles: s.projectiles.clone(),
            power_ups: s.power_ups.clone(),
            active_power_ups: s.player.effects.clone(),
            score: s.score,
            wave: s.wave,
            combo: s.combo.streak,
            peak_combo: s.combo.peak,
            multiplier: s.combo.multiplier(),
            lives: s.player.lives,
            sim_ms: s.sim_ms,
        })
    }

    // ── Transitions ──────────────────────────────────────────────────────────

    /// `idle → playing`: fresh run at wave 1.
    pub fn start(&mut self) -> bool {
        if self.status != GameStatus::Idle {
            return false;
        }
        self.cancel_tasks();
        self.session_id += 1;
        self.session = Some(init_session(self.prefs.difficulty));
        self.last_run = None;
        self.awaiting_name = false;
        self.stats.games_played += 1;
        self.status = GameStatus::Playing;
        tracing::info!(
            session = self.session_id,
            difficulty = self.prefs.difficulty.label(),
            "game started"
        );
        self.persist();
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        self.status = GameStatus::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.status != GameStatus::Paused {
            return false;
        }
        self.status = GameStatus::Playing;
        true
    }

    /// `paused → idle` abandons the run unrecorded; `gameOver → idle`
    /// leaves the results screen.
    pub fn reset(&mut self) -> bool {
        match self.status {
            GameStatus::Paused => {
                tracing::info!(session = self.session_id, "run abandoned");
            }
            GameStatus::GameOver => {}
            GameStatus::Idle | GameStatus::Playing => return false,
        }
        self.cancel_tasks();
        self.session = None;
        self.awaiting_name = false;
        self.status = GameStatus::Idle;
        true
    }

    // ── Simulation ───────────────────────────────────────────────────────────

    /// Advance the run by `delta` units.  Does nothing unless playing.
    pub fn step(
        &mut self,
        delta: f32,
        keys: HeldKeys,
        rng: &mut impl Rng,
    ) -> Option<StepOutcome> {
        if self.status != GameStatus::Playing {
            return None;
        }
        let session = self.session.as_mut()?;
        session.sim_ms += (delta.max(0.0) * REFERENCE_FRAME_MS).round() as u64;
        let now = session.sim_ms;

        self.run_due_tasks(now);

        let session = self.session.as_mut()?;
        let outcome = step_world(session, keys, delta, rng);
        let (lives, wave) = (session.player.lives, session.wave);

        self.stats.enemies_defeated += u64::from(outcome.kills);
        if outcome.lives_lost > 0 && lives > 0 {
            // The window runs from the latest hit.
            self.tasks
                .retain(|t| t.action != DeferredAction::ClearInvulnerability);
            self.tasks.push(DeferredTask {
                session: self.session_id,
                due_at: now + INVULNERABILITY_MS,
                action: DeferredAction::ClearInvulnerability,
            });
        }
        if let Some(spawned) = outcome.wave_spawned {
            tracing::debug!(wave = spawned, "wave advanced");
        }
        self.stats.best_wave = self.stats.best_wave.max(wave);

        if lives == 0 {
            self.finish();
        }
        Some(outcome)
    }

    fn run_due_tasks(&mut self, now: u64) {
        let current = self.session_id;
        let (due, pending): (Vec<_>, Vec<_>) = self
            .tasks
            .drain(..)
            .filter(|t| t.session == current)
            .partition(|t| t.due_at <= now);
        self.tasks = pending;

        for task in due {
            match task.action {
                DeferredAction::ClearInvulnerability => {
                    if let Some(session) = self.session.as_mut() {
                        session.player.invulnerable = false;
                    }
                }
            }
        }
    }

    fn cancel_tasks(&mut self) {
        self.tasks.clear();
    }

    /// `playing → gameOver`: lock in the score, report the bonus once and
    /// save the lifetime counters.
    fn finish(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let run = FinishedRun {
            score: session.score,
            wave: session.wave,
            peak_combo: session.combo.peak,
            bonus: session.score / BONUS_DIVISOR,
        };
        self.cancel_tasks();
        self.status = GameStatus::GameOver;
        self.last_run = Some(run);
        self.awaiting_name = self.ledger.qualifies(run.score);

        tracing::info!(
            session = self.session_id,
            score = run.score,
            wave = run.wave,
            peak_combo = run.peak_combo,
            "game over"
        );
        self.sink.report_bonus(run.bonus);
        self.persist();
    }

    // ── Ledger ───────────────────────────────────────────────────────────────

    /// Enter the finished run into the ledger under `name`.  Allowed once per
    /// natural game over.  Returns the 0-based rank.
    pub fn submit_high_score(&mut self, name: &str, timestamp: u64) -> Result<usize, LedgerError> {
        if !self.awaiting_name() {
            return Err(LedgerError::NotEligible);
        }
        let run = self.last_run.ok_or(LedgerError::NotEligible)?;
        let rank = self
            .ledger
            .record(name, run.score, run.wave, timestamp)?
            .ok_or(LedgerError::NotEligible)?;
        self.awaiting_name = false;
        tracing::info!(rank = rank + 1, score = run.score, "high score recorded");
        self.persist();
        Ok(rank)
    }

    /// Give up on entering the finished run into the ledger.
    pub fn skip_high_score(&mut self) {
        self.awaiting_name = false;
    }

    // ── Preferences ──────────────────────────────────────────────────────────

    /// Takes effect from the next run.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        if self.prefs.difficulty != difficulty {
            self.prefs.difficulty = difficulty;
            self.persist();
        }
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.prefs.sound_enabled = !self.prefs.sound_enabled;
        self.persist();
        self.prefs.sound_enabled
    }

    pub fn toggle_effects(&mut self) -> bool {
        self.prefs.effects_enabled = !self.prefs.effects_enabled;
        self.persist();
        self.prefs.effects_enabled
    }

    fn persist(&mut self) {
        let record = PersistedRecord::from_parts(&self.ledger, self.stats, self.prefs);
        if let Err(err) = self.store.save(&record) {
            tracing::warn!(%err, "failed to save game record");
        }
    }
}
