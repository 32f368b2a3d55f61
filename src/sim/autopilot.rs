//! Idle/demo mode - a bot that slices targets
//!
//! Picks the lowest falling target that has no bomb nearby and swipes through
//! it, then waits out a reaction delay before the next swipe.

use glam::Vec2;

use super::registry::EnemyKind;
use super::tick::Game;

/// Keep this far (center to center) from any bomb when choosing a target
const BOMB_CLEARANCE: f32 = 220.0;
/// Swipe starts and ends this far from the target center
const SWIPE_REACH: Vec2 = Vec2::new(90.0, 60.0);
/// Targets below this are considered lost
const MIN_HEIGHT: f32 = 60.0;

#[derive(Debug, Clone)]
pub struct Autopilot {
    /// Seconds between swipes
    pub reaction: f32,
    cooldown: f32,
    swipes: u32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(0.25)
    }
}

impl Autopilot {
    pub fn new(reaction: f32) -> Self {
        Self {
            reaction,
            cooldown: 0.0,
            swipes: 0,
        }
    }

    pub fn swipes(&self) -> u32 {
        self.swipes
    }

    /// Where the bot would swipe right now, if anywhere
    pub fn pick_target(game: &Game) -> Option<Vec2> {
        let bombs: Vec<Vec2> = game
            .registry()
            .iter()
            .filter(|(_, o)| o.kind == EnemyKind::Bomb)
            .map(|(_, o)| o.pos)
            .collect();

        game.registry()
            .iter()
            .filter(|(_, o)| o.kind == EnemyKind::Target && !o.struck)
            .filter(|(_, o)| o.vel.y < 0.0 && o.pos.y > MIN_HEIGHT)
            .filter(|(_, o)| bombs.iter().all(|b| b.distance(o.pos) > BOMB_CLEARANCE))
            .map(|(_, o)| o.pos)
            .min_by(|a, b| a.y.total_cmp(&b.y))
    }

    /// Feed one frame of touches into the game
    pub fn drive(&mut self, game: &mut Game, dt: f32) {
        if game.state.ended {
            return;
        }
        self.cooldown -= dt;
        if self.cooldown > 0.0 {
            return;
        }
        let Some(target) = Self::pick_target(game) else {
            return;
        };

        game.touches_began(&[target - SWIPE_REACH]);
        game.touches_moved(&[target - SWIPE_REACH * 0.5]);
        game.touches_moved(&[target]);
        game.touches_moved(&[target + SWIPE_REACH * 0.5]);
        game.touches_ended();

        self.swipes += 1;
        self.cooldown = self.reaction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::Beat;
    use crate::tuning::Tuning;

    #[test]
    fn test_slices_a_falling_target() {
        let mut game = Game::with_opening(21, Tuning::default(), &[Beat::SingleSafe]);
        game.advance();
        let mut pilot = Autopilot::default();

        for _ in 0..400 {
            pilot.drive(&mut game, SIM_DT);
            game.tick(SIM_DT);
            if game.state.score > 0 {
                break;
            }
        }
        assert_eq!(game.state.score, 1);
        assert_eq!(game.state.lives, 3);
        assert!(pilot.swipes() >= 1);
    }

    #[test]
    fn test_never_swipes_near_a_bomb() {
        let mut game = Game::with_opening(22, Tuning::default(), &[Beat::SingleSafe]);
        let target = game.spawn_enemy(crate::sim::ForceBomb::Never).unwrap();
        let bomb = game.spawn_enemy(crate::sim::ForceBomb::Always).unwrap();
        // Past the apex, both still airborne
        for _ in 0..130 {
            game.tick(SIM_DT);
        }
        assert!(game.registry().get(target).unwrap().vel.y < 0.0);

        game.report_position(target, Vec2::new(400.0, 400.0));
        game.report_position(bomb, Vec2::new(450.0, 420.0));
        assert_eq!(Autopilot::pick_target(&game), None);

        game.report_position(bomb, Vec2::new(900.0, 100.0));
        assert_eq!(Autopilot::pick_target(&game), Some(Vec2::new(400.0, 400.0)));
    }
}
