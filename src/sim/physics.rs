//! Built-in ballistics
//!
//! Used when no external engine reports positions. The whole step is scaled by
//! the ramp's fall speed, so a speed of 0 freezes everything in place.

use std::f32::consts::TAU;

use super::registry::ActiveObject;
use crate::consts::GRAVITY;

/// Advance one body by `dt` seconds of game time at `speed`
pub fn integrate(object: &mut ActiveObject, dt: f32, speed: f32) {
    let step = dt * speed;
    if step <= 0.0 {
        return;
    }
    object.pos += object.vel * step;
    object.vel.y += GRAVITY * step;
    object.rotation = (object.rotation + object.angular_vel * step).rem_euclid(TAU);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::registry::EnemyKind;
    use glam::Vec2;

    fn thrown() -> ActiveObject {
        ActiveObject::new(EnemyKind::Target, Vec2::new(500.0, -128.0), Vec2::new(160.0, 1200.0), 2.0)
    }

    #[test]
    fn test_frozen_at_zero_speed() {
        let mut object = thrown();
        integrate(&mut object, 1.0 / 60.0, 0.0);
        assert_eq!(object.pos, Vec2::new(500.0, -128.0));
        assert_eq!(object.vel, Vec2::new(160.0, 1200.0));
    }

    #[test]
    fn test_arc_rises_then_falls_off_screen() {
        let mut object = thrown();
        let mut peak = object.pos.y;
        let mut frames = 0;
        while object.pos.y >= -140.0 && frames < 10_000 {
            integrate(&mut object, 1.0 / 60.0, 0.85);
            peak = peak.max(object.pos.y);
            frames += 1;
        }
        // Apex is well inside a 768px tall field
        assert!(peak > 400.0 && peak < 768.0, "peak = {peak}");
        assert!(frames < 10_000);
        assert!(object.pos.x > 500.0);
    }

    #[test]
    fn test_faster_speed_covers_more_ground() {
        let mut slow = thrown();
        let mut fast = thrown();
        integrate(&mut slow, 0.1, 0.85);
        integrate(&mut fast, 0.1, 1.2);
        assert!(fast.pos.y > slow.pos.y);
    }
}
