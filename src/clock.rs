//! Frame clock and driver.
//!
//! The host calls [`Driver::frame`] from its render loop.  The driver turns
//! elapsed time into delta units (one unit ≈ one frame at 60 FPS), steps the
//! game exactly once per call while it is playing, and goes fully quiet
//! otherwise.  Time that passes while the clock is stopped is never handed
//! to the simulation, which is what keeps effect expiries and
//! invulnerability frozen during a pause.

use std::time::Instant;

use rand::Rng;

use crate::compute::StepOutcome;
use crate::config::{MAX_DELTA, REFERENCE_FRAME_MS};
use crate::entities::{GameStatus, HeldKeys};
use crate::game::Game;

/// Where the driver reads player input from.  Directional and fire keys are
/// polled as a held set every frame; pause is a discrete request.
pub trait InputSource {
    fn held_keys(&self) -> HeldKeys;

    /// Returns `true` once per pause key press.
    fn take_pause_request(&mut self) -> bool;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.last.is_some()
    }

    /// Begin measuring from `now`.  Restarting a running clock rebases it.
    pub fn start(&mut self, now: Instant) {
        self.last = Some(now);
    }

    pub fn stop(&mut self) {
        self.last = None;
    }

    /// Delta units since the previous tick (or since `start`), capped at
    /// [`MAX_DELTA`].  `None` while stopped.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        let last = self.last?;
        let elapsed_ms = now.saturating_duration_since(last).as_secs_f32() * 1000.0;
        self.last = Some(now);
        Some((elapsed_ms / REFERENCE_FRAME_MS).min(MAX_DELTA))
    }
}

/// Couples a [`FrameClock`] to the game's status.
#[derive(Debug, Default)]
pub struct Driver {
    clock: FrameClock,
}

impl Driver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Handle one host frame at time `now`.  Returns the step outcome if a
    /// simulation step ran.
    pub fn frame(
        &mut self,
        game: &mut Game,
        input: &mut impl InputSource,
        now: Instant,
        rng: &mut impl Rng,
    ) -> Option<StepOutcome> {
        if input.take_pause_request() {
            match game.status() {
                GameStatus::Playing => {
                    let _ = game.pause();
                }
                GameStatus::Paused => {
                    let _ = game.resume();
                }
                GameStatus::Idle | GameStatus::GameOver => {}
            }
        }

        if game.status() != GameStatus::Playing {
            self.clock.stop();
            return None;
        }
        if !self.clock.is_running() {
            // First frame after a start or resume only sets the baseline.
            self.clock.start(now);
            return None;
        }

        let delta = self.clock.tick(now)?;
        let outcome = game.step(delta, input.held_keys(), rng);
        if game.status() != GameStatus::Playing {
            self.clock.stop();
        }
        outcome
    }
}
