//! Spawn policy: what an enemy is and how it is thrown
//!
//! Enemies start just below the field and are thrown inward, harder the closer
//! they start to an edge, so every arc crosses the visible area.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::registry::{ActiveObject, EnemyKind};
use crate::consts::*;

/// Bomb forcing for a single spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForceBomb {
    Never,
    Always,
    Random,
}

/// Initial physics of a spawned body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    pub pos: Vec2,
    pub vel: Vec2,
    pub angular_vel: f32,
    /// Spawned bodies never collide with each other
    pub collision_disabled: bool,
}

/// Decide bomb or target. A random roll is a bomb one time in `odds`.
pub fn roll_kind(rng: &mut impl Rng, force: ForceBomb, odds: u32) -> EnemyKind {
    match force {
        ForceBomb::Never => EnemyKind::Target,
        ForceBomb::Always => EnemyKind::Bomb,
        ForceBomb::Random => {
            if rng.random_range(0..odds.max(1)) == 0 {
                EnemyKind::Bomb
            } else {
                EnemyKind::Target
            }
        }
    }
}

/// Horizontal velocity for a spawn x, keyed by quartile of the field width
pub fn horizontal_speed(rng: &mut impl Rng, x: f32) -> f32 {
    let quarter = FIELD_WIDTH / 4.0;
    let units = if x < quarter {
        rng.random_range(8..=15)
    } else if x < quarter * 2.0 {
        rng.random_range(3..=5)
    } else if x < quarter * 3.0 {
        -rng.random_range(3..=5)
    } else {
        -rng.random_range(8..=15)
    };
    units as f32 * VELOCITY_SCALE
}

/// Pick a spawn point and throw for a new enemy
pub fn roll_launch(rng: &mut impl Rng) -> Launch {
    let x = rng.random_range(SPAWN_MARGIN..=FIELD_WIDTH - SPAWN_MARGIN).round();
    let vx = horizontal_speed(rng, x);
    let vy = rng.random_range(24..=32) as f32 * VELOCITY_SCALE;
    let angular_vel = rng.random_range(-3.0..=3.0);

    Launch {
        pos: Vec2::new(x, SPAWN_Y),
        vel: Vec2::new(vx, vy),
        angular_vel,
        collision_disabled: true,
    }
}

/// Build the registry entry for a rolled enemy
pub fn make_enemy(kind: EnemyKind, launch: &Launch) -> ActiveObject {
    ActiveObject::new(kind, launch.pos, launch.vel, launch.angular_vel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_forced_kinds() {
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(roll_kind(&mut rng, ForceBomb::Never, 7), EnemyKind::Target);
            assert_eq!(roll_kind(&mut rng, ForceBomb::Always, 7), EnemyKind::Bomb);
        }
    }

    #[test]
    fn test_random_kind_mixes() {
        let mut rng = Pcg32::seed_from_u64(7);
        let bombs = (0..700)
            .filter(|_| roll_kind(&mut rng, ForceBomb::Random, 7) == EnemyKind::Bomb)
            .count();
        // Expect ~100 of 700
        assert!((40..200).contains(&bombs), "bombs = {bombs}");
    }

    #[test]
    fn test_quartile_directions() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let far_left = horizontal_speed(&mut rng, 100.0);
            let mid_left = horizontal_speed(&mut rng, 300.0);
            let mid_right = horizontal_speed(&mut rng, 600.0);
            let far_right = horizontal_speed(&mut rng, 900.0);
            assert!((320.0..=600.0).contains(&far_left));
            assert!((120.0..=200.0).contains(&mid_left));
            assert!((-200.0..=-120.0).contains(&mid_right));
            assert!((-600.0..=-320.0).contains(&far_right));
        }
    }

    #[test]
    fn test_launch_starts_below_field_and_rises() {
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..200 {
            let launch = roll_launch(&mut rng);
            assert_eq!(launch.pos.y, SPAWN_Y);
            assert!(launch.pos.x >= SPAWN_MARGIN && launch.pos.x <= FIELD_WIDTH - SPAWN_MARGIN);
            assert!((960.0..=1280.0).contains(&launch.vel.y));
            assert!(launch.angular_vel.abs() <= 3.0);
            assert!(launch.collision_disabled);
        }
    }
}
