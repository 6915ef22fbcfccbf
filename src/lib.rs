//! Wave shooter simulation core.
//!
//! The library holds the whole simulation: entity data, the per-frame step,
//! the wave spawner, scoring, power-ups, the game state machine and the
//! persisted high-score ledger. Terminal I/O lives in the binary only.

pub mod clock;
pub mod collision;
pub mod compute;
pub mod config;
pub mod entities;
pub mod error;
pub mod game;
pub mod ledger;
pub mod power_ups;
pub mod scoring;
pub mod store;
pub mod wave;
