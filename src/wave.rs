//! Procedural enemy formations.

use crate::config::half_extents;
use crate::entities::{Enemy, EnemyKind};

const MAX_ROWS: u32 = 5;
const MAX_COLS: u32 = 8;
const GRID_LEFT: f32 = 15.0;
const GRID_RIGHT: f32 = 85.0;
const GRID_TOP: f32 = 5.0;
const ROW_SPACING: f32 = 8.0;

/// `(rows, cols)` of the formation for wave `wave`.
pub fn wave_dimensions(wave: u32) -> (u32, u32) {
    let rows = (2 + wave / 3).min(MAX_ROWS);
    let cols = (4 + wave / 2).min(MAX_COLS);
    (rows, cols)
}

pub fn enemy_health(wave: u32) -> u32 {
    1 + wave / 5
}

pub fn enemy_points(row: u32) -> u32 {
    10 * (row + 1)
}

/// Build the formation for `wave`.  Ids are drawn from `next_id`, which is
/// advanced past every enemy created.
pub fn spawn_wave(wave: u32, next_id: &mut u64) -> Vec<Enemy> {
    let (rows, cols) = wave_dimensions(wave);
    let health = enemy_health(wave);
    let spacing = if cols > 1 {
        (GRID_RIGHT - GRID_LEFT) / (cols - 1) as f32
    } else {
        0.0
    };

    let mut enemies = Vec::with_capacity((rows * cols) as usize);
    for row in 0..rows {
        let kind = EnemyKind::for_row(row);
        let (half_width, half_height) = half_extents(kind);
        for col in 0..cols {
            enemies.push(Enemy {
                id: *next_id,
                kind,
                x: GRID_LEFT + col as f32 * spacing,
                y: GRID_TOP + row as f32 * ROW_SPACING,
                health,
                points: enemy_points(row),
                half_width,
                half_height,
            });
            *next_id += 1;
        }
    }

    tracing::debug!(wave, rows, cols, health, "spawned wave");
    enemies
}
