//! Hit detection.  Pure functions of the current entity sets; callers apply
//! the consequences.

use crate::config::PICKUP_HALF_EXTENT;
use crate::entities::{Enemy, Player, PowerUp, Projectile, ProjectileOwner};

/// A player projectile landing on an enemy, by index into the slices given
/// to [`projectile_hits`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub projectile: usize,
    pub enemy: usize,
}

/// Generous, asymmetric proximity test: one extra unit of horizontal slack
/// and two of vertical slack beyond the enemy's half extents.
pub fn overlaps_enemy(projectile: &Projectile, enemy: &Enemy) -> bool {
    (projectile.x - enemy.x).abs() < enemy.half_width + 1.0
        && (projectile.y - enemy.y).abs() < enemy.half_height + 2.0
}

/// Flat ±5 box around the player.
pub fn overlaps_player(power_up: &PowerUp, player: &Player) -> bool {
    (power_up.x - player.x).abs() < PICKUP_HALF_EXTENT
        && (power_up.y - player.y).abs() < PICKUP_HALF_EXTENT
}

/// Every player projectile that touches an enemy, paired with the first
/// enemy it touches.  A projectile is consumed by one hit at most, and an
/// enemy can't take more hits in one step than it has health.
pub fn projectile_hits(projectiles: &[Projectile], enemies: &[Enemy]) -> Vec<Hit> {
    let mut damage = vec![0u32; enemies.len()];
    let mut hits = Vec::new();

    for (pi, projectile) in projectiles.iter().enumerate() {
        if projectile.owner != ProjectileOwner::Player {
            continue;
        }
        let target = enemies
            .iter()
            .enumerate()
            .find(|(ei, enemy)| damage[*ei] < enemy.health && overlaps_enemy(projectile, enemy));
        if let Some((ei, _)) = target {
            damage[ei] += 1;
            hits.push(Hit {
                projectile: pi,
                enemy: ei,
            });
        }
    }
    hits
}

/// Indices of power-ups the player is touching.
pub fn power_up_pickups(power_ups: &[PowerUp], player: &Player) -> Vec<usize> {
    power_ups
        .iter()
        .enumerate()
        .filter(|(_, p)| overlaps_player(p, player))
        .map(|(i, _)| i)
        .collect()
}
