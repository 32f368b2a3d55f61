//! Fixed timestep simulation tick
//!
//! [`Game`] ties the sequencer, registry and slice pipeline together and owns
//! the end-of-run state machine. Everything runs on one thread: the host calls
//! [`Game::tick`] once per frame and delivers touch events between ticks.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::physics;
use super::registry::{EnemyKind, Handle, HitNode, Registry};
use super::scheduler::{Scheduler, Task};
use super::sequencer::{Beat, RampState, Sequencer};
use super::slice::{GestureTrail, Ribbon, SlicePhase, SlicePipeline};
use super::spawn::{self, ForceBomb};
use super::state::{EffectKind, GameEvent, GameState, LifeIndicator, RemovalCause, SoundEffect};
use crate::consts::*;
use crate::tuning::Tuning;

/// Converts variable frame times into fixed simulation steps
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    /// Number of `SIM_DT` steps to run for a frame that took `frame_dt`
    pub fn steps(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.clamp(0.0, 0.1);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }
}

/// Renderable view of one active object
#[derive(Debug, Clone, Serialize)]
pub struct ObjectView {
    pub handle: Handle,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub rotation: f32,
}

/// Everything a renderer or HUD needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub time: f64,
    pub seed: u64,
    pub score: u32,
    pub lives: u8,
    pub ended: bool,
    pub ended_by_bomb: bool,
    pub beats_played: usize,
    pub ramp: RampState,
    pub indicators: Vec<LifeIndicator>,
    pub objects: Vec<ObjectView>,
    pub ribbon: Ribbon,
    pub slice: SlicePhase,
}

/// One run of the game
pub struct Game {
    pub state: GameState,
    seed: u64,
    tuning: Tuning,
    rng: Pcg32,
    sequencer: Sequencer,
    registry: Registry,
    scheduler: Scheduler,
    slice: SlicePipeline,
    builtin_physics: bool,
}

impl Game {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self::with_opening(seed, tuning, &Beat::OPENING)
    }

    /// Game whose plan starts with `opening` instead of the default ramp-in
    pub fn with_opening(seed: u64, tuning: Tuning, opening: &[Beat]) -> Self {
        Self {
            state: GameState::new(tuning.starting_lives),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            sequencer: Sequencer::with_opening(&tuning, opening),
            registry: Registry::new(),
            scheduler: Scheduler::new(),
            slice: SlicePipeline::default(),
            builtin_physics: true,
            tuning,
        }
    }

    /// Build the beat plan and queue the first beat
    pub fn start(&mut self) {
        self.sequencer.extend_plan(&mut self.rng);
        self.scheduler.schedule(self.tuning.kickoff_delay, Task::Advance);
        self.state.beat_pending = true;
        log::info!(
            "Game started with seed {} ({} beats planned)",
            self.seed,
            self.sequencer.plan().len()
        );
    }

    /// Let an external engine own motion; it must then call `report_position`
    pub fn set_builtin_physics(&mut self, enabled: bool) {
        self.builtin_physics = enabled;
    }

    /// Run the next beat: spawn its immediate enemies and queue the rest
    pub fn advance(&mut self) {
        let Some((_, plan)) = self.sequencer.advance(self.state.ended, &mut self.rng) else {
            return;
        };
        for force in plan.immediate {
            self.spawn_enemy(force);
        }
        for (delay, force) in plan.deferred {
            self.scheduler.schedule(delay, Task::Spawn(force));
        }
        self.state.beat_pending = false;
    }

    /// Roll and throw one enemy. Nothing spawns once the run has ended.
    pub fn spawn_enemy(&mut self, force: ForceBomb) -> Option<Handle> {
        if self.state.ended {
            return None;
        }
        let kind = spawn::roll_kind(&mut self.rng, force, self.tuning.bomb_odds);
        let launch = spawn::roll_launch(&mut self.rng);
        let handle = self.registry.spawn(spawn::make_enemy(kind, &launch));

        self.state.emit(GameEvent::Spawned { handle, kind, launch });
        match kind {
            EnemyKind::Bomb => {
                self.state.start_fuse(handle);
                self.state.emit(GameEvent::Effect {
                    kind: EffectKind::Fuse,
                    pos: launch.pos,
                    attached_to: Some(handle),
                });
            }
            EnemyKind::Target => self.state.emit(GameEvent::Sound(SoundEffect::Launch)),
        }
        Some(handle)
    }

    /// Advance the game by one frame
    pub fn tick(&mut self, dt: f32) {
        self.scheduler.advance_clock(dt as f64);
        self.run_due_tasks();

        self.slice.ribbon.update(dt);
        self.state.update_indicators(dt);

        if self.state.ended {
            return;
        }

        if self.builtin_physics {
            let speed = self.sequencer.ramp().fall_speed;
            self.registry
                .for_each_mut(|_, object| physics::integrate(object, dt, speed));
        }

        self.sweep_offscreen();

        if !self.state.ended && self.registry.is_empty() && !self.state.beat_pending {
            self.scheduler
                .schedule(self.sequencer.ramp().spawn_interval, Task::Advance);
            self.state.beat_pending = true;
        }

        if !self.registry.has_bomb() {
            self.state.stop_fuse();
        }
    }

    fn run_due_tasks(&mut self) {
        while let Some(task) = self.scheduler.pop_due() {
            if self.state.ended {
                log::trace!("Dropping {task:?} after game over");
                continue;
            }
            match task {
                Task::Advance => self.advance(),
                Task::Spawn(force) => {
                    self.spawn_enemy(force);
                }
                Task::SwooshRearm => self.slice.rearm_swoosh(),
            }
        }
    }

    fn sweep_offscreen(&mut self) {
        for (handle, object) in self.registry.sweep_below(OFFSCREEN_Y) {
            self.state.emit(GameEvent::Removed {
                handle,
                cause: RemovalCause::OffScreen,
            });
            // Falling bombs are harmless
            if object.kind == EnemyKind::Target {
                self.lose_life();
            }
        }
    }

    /// Position update from an external physics engine
    pub fn report_position(&mut self, handle: Handle, pos: Vec2) -> bool {
        match self.registry.get_mut(handle) {
            Some(object) => {
                object.pos = pos;
                true
            }
            None => false,
        }
    }

    /// Touch down. Only the first simultaneous touch counts.
    pub fn touches_began(&mut self, touches: &[Vec2]) {
        if self.state.ended {
            return;
        }
        let Some(&point) = touches.first() else {
            return;
        };
        self.slice.begin(point);
    }

    /// Touch drag: extend the slice, then hit test under the newest point
    pub fn touches_moved(&mut self, touches: &[Vec2]) {
        if self.state.ended {
            return;
        }
        let Some(&point) = touches.first() else {
            return;
        };

        if self.slice.extend(point) {
            let variant = self.rng.random_range(1..=3);
            self.state.emit(GameEvent::Sound(SoundEffect::Swoosh(variant)));
            self.scheduler
                .schedule(self.tuning.swoosh_secs, Task::SwooshRearm);
        }

        self.hit_test(point);
    }

    /// Touch up: fade the ribbon out
    pub fn touches_ended(&mut self) {
        if self.state.ended {
            return;
        }
        self.slice.end(self.tuning.ribbon_fade_secs);
    }

    fn hit_test(&mut self, point: Vec2) {
        for node in self.registry.nodes_at(point) {
            if self.state.ended {
                break;
            }
            match node {
                HitNode::Target(handle) => {
                    let Some(object) = self.registry.strike(handle) else {
                        continue;
                    };
                    self.state.emit(GameEvent::Effect {
                        kind: EffectKind::SliceHitEnemy,
                        pos: object.pos,
                        attached_to: None,
                    });
                    self.state.emit(GameEvent::Removed {
                        handle,
                        cause: RemovalCause::Sliced,
                    });
                    self.state.score += 1;
                    self.state.emit(GameEvent::ScoreChanged(self.state.score));
                    self.state.emit(GameEvent::Sound(SoundEffect::Whack));
                }
                HitNode::BombGlyph(glyph) => {
                    let Some(container) = self.registry.resolve_glyph(glyph) else {
                        continue;
                    };
                    let Some(object) = self.registry.strike(container) else {
                        continue;
                    };
                    self.state.emit(GameEvent::Effect {
                        kind: EffectKind::SliceHitBomb,
                        pos: object.pos,
                        attached_to: None,
                    });
                    self.state.emit(GameEvent::Removed {
                        handle: container,
                        cause: RemovalCause::Sliced,
                    });
                    self.state.emit(GameEvent::Sound(SoundEffect::Explosion));
                    self.end_game(true);
                }
            }
        }
    }

    /// A target got away
    pub fn lose_life(&mut self) {
        if self.state.ended || self.state.lives == 0 {
            return;
        }
        self.state.lives -= 1;
        self.state.emit(GameEvent::Sound(SoundEffect::Wrong));

        // Indicators are crossed off left to right
        let total = self.state.indicators.len();
        let indicator = total
            .saturating_sub(1)
            .saturating_sub(self.state.lives as usize);
        if let Some(marker) = self.state.indicators.get_mut(indicator) {
            marker.mark_gone(self.tuning.life_pulse_scale, self.tuning.life_pulse_secs);
        }
        self.state.emit(GameEvent::LifeLost {
            remaining: self.state.lives,
            indicator,
        });

        if self.state.lives == 0 {
            self.end_game(false);
        }
    }

    /// End the run. Calling it again does nothing.
    pub fn end_game(&mut self, by_bomb: bool) {
        if self.state.ended {
            return;
        }
        self.state.ended = true;
        self.state.ended_by_bomb = by_bomb;
        self.sequencer.freeze();
        self.slice.end(self.tuning.ribbon_fade_secs);
        self.state.stop_fuse();

        if by_bomb {
            for marker in &mut self.state.indicators {
                marker.gone = true;
            }
        }

        self.state.emit(GameEvent::GameOver { by_bomb });
        log::info!(
            "Game over ({}) - score {} after {} beats",
            if by_bomb { "bomb" } else { "out of lives" },
            self.state.score,
            self.sequencer.position()
        );
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    pub fn ramp(&self) -> &RampState {
        self.sequencer.ramp()
    }

    pub fn trail(&self) -> &GestureTrail {
        &self.slice.trail
    }

    pub fn ribbon(&self) -> &Ribbon {
        &self.slice.ribbon
    }

    /// Game clock in seconds
    pub fn now(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.now(),
            seed: self.seed,
            score: self.state.score,
            lives: self.state.lives,
            ended: self.state.ended,
            ended_by_bomb: self.state.ended_by_bomb,
            beats_played: self.sequencer.position(),
            ramp: *self.sequencer.ramp(),
            indicators: self.state.indicators.clone(),
            objects: self
                .registry
                .iter()
                .map(|(handle, object)| ObjectView {
                    handle,
                    kind: object.kind,
                    pos: object.pos,
                    rotation: object.rotation,
                })
                .collect(),
            ribbon: self.slice.ribbon.clone(),
            slice: self.slice.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawned(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::Spawned { .. }))
            .count()
    }

    #[test]
    fn test_kickoff_after_two_seconds() {
        let mut game = Game::new(12345, Tuning::default());
        game.start();

        for _ in 0..119 {
            game.tick(SIM_DT);
        }
        assert!(game.registry().is_empty());
        assert_eq!(game.sequencer().position(), 0);

        game.tick(SIM_DT);
        game.tick(SIM_DT);
        assert_eq!(game.sequencer().position(), 1);
        // Opening beat is a guaranteed target
        assert_eq!(game.registry().len(), 1);
        assert!(!game.registry().has_bomb());
    }

    #[test]
    fn test_empty_field_queues_next_beat_once() {
        let mut game = Game::with_opening(1, Tuning::default(), &[Beat::SingleSafe, Beat::SingleSafe]);
        game.advance();
        let (handle, _) = game.registry().iter().next().unwrap();
        let pos = game.registry().get(handle).unwrap().pos;

        game.touches_began(&[pos + Vec2::new(-100.0, 0.0)]);
        game.touches_moved(&[pos]);
        assert!(game.registry().is_empty());

        game.tick(SIM_DT);
        assert!(game.state.beat_pending);
        // Interval after one beat is 0.9 * 0.991
        let wait = (0.9 * 0.991 / SIM_DT as f64).ceil() as usize;
        for _ in 0..wait + 1 {
            game.tick(SIM_DT);
        }
        assert_eq!(game.sequencer().position(), 2);
        assert_eq!(game.registry().len(), 1);
    }

    #[test]
    fn test_missed_target_costs_life() {
        let mut game = Game::with_opening(3, Tuning::default(), &[Beat::SingleSafe]);
        game.advance();
        game.drain_events();

        // Let physics carry it up and back down off-screen
        for _ in 0..600 {
            game.tick(SIM_DT);
            if game.state.lives < 3 {
                break;
            }
        }
        assert_eq!(game.state.lives, 2);
        assert!(game.state.indicators[0].gone);
        assert!(!game.state.indicators[1].gone);
        let events = game.drain_events();
        assert!(events.contains(&GameEvent::Sound(SoundEffect::Wrong)));
        assert!(events.contains(&GameEvent::LifeLost {
            remaining: 2,
            indicator: 0
        }));
    }

    #[test]
    fn test_fuse_stops_when_last_bomb_leaves() {
        let mut game = Game::with_opening(4, Tuning::default(), &[Beat::PairOneBomb]);
        game.advance();
        assert!(game.state.fuse().is_playing());

        let bomb = game
            .registry()
            .iter()
            .find(|(_, o)| o.is_bomb())
            .map(|(h, _)| h)
            .unwrap();
        game.report_position(bomb, Vec2::new(500.0, -500.0));
        game.tick(SIM_DT);

        assert!(!game.registry().has_bomb());
        assert!(!game.state.fuse().is_playing());
        // Bomb fell silently
        assert_eq!(game.state.lives, 3);
        assert!(game.drain_events().contains(&GameEvent::FuseStopped));
    }

    #[test]
    fn test_swoosh_plays_once_until_rearmed() {
        let mut game = Game::new(5, Tuning::default());
        game.touches_began(&[Vec2::new(10.0, 700.0)]);
        for i in 0..5 {
            game.touches_moved(&[Vec2::new(20.0 + i as f32, 700.0)]);
        }
        let swooshes = |events: &[GameEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, GameEvent::Sound(SoundEffect::Swoosh(1..=3))))
                .count()
        };
        assert_eq!(swooshes(&game.drain_events()), 1);

        for _ in 0..40 {
            game.tick(SIM_DT);
        }
        game.touches_moved(&[Vec2::new(40.0, 700.0)]);
        assert_eq!(swooshes(&game.drain_events()), 1);
    }

    #[test]
    fn test_touches_ignored_after_end() {
        let mut game = Game::new(6, Tuning::default());
        game.touches_began(&[Vec2::new(1.0, 1.0)]);
        game.end_game(false);

        game.touches_began(&[Vec2::new(50.0, 50.0)]);
        game.touches_moved(&[Vec2::new(60.0, 60.0)]);
        game.touches_ended();

        assert_eq!(game.trail().len(), 1);
        assert_eq!(game.snapshot().slice, SlicePhase::Idle);
    }

    #[test]
    fn test_game_over_fades_active_slice() {
        let mut game = Game::new(9, Tuning::default());
        game.touches_began(&[Vec2::new(10.0, 700.0)]);
        game.touches_moved(&[Vec2::new(40.0, 700.0)]);
        assert!(game.ribbon().has_geometry());
        assert_eq!(game.ribbon().opacity, 1.0);

        game.end_game(true);
        assert!(game.ribbon().is_fading());

        // Default fade is 0.25s
        for _ in 0..20 {
            game.tick(SIM_DT);
        }
        assert!(!game.ribbon().is_fading());
        assert_eq!(game.ribbon().opacity, 0.0);
    }

    #[test]
    fn test_only_first_touch_counts() {
        let mut game = Game::new(7, Tuning::default());
        game.touches_began(&[Vec2::new(1.0, 1.0), Vec2::new(900.0, 900.0)]);
        game.touches_moved(&[Vec2::new(2.0, 2.0), Vec2::new(901.0, 901.0)]);
        let points: Vec<_> = game.trail().points().collect();
        assert_eq!(points, vec![Vec2::new(1.0, 1.0), Vec2::new(2.0, 2.0)]);

        game.touches_moved(&[]);
        assert_eq!(game.trail().len(), 2);
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = Game::new(99999, Tuning::default());
        let mut b = Game::new(99999, Tuning::default());
        a.start();
        b.start();
        for _ in 0..600 {
            a.tick(SIM_DT);
            b.tick(SIM_DT);
        }
        assert_eq!(a.sequencer().plan(), b.sequencer().plan());
        let ea = a.drain_events();
        let eb = b.drain_events();
        assert_eq!(spawned(&ea), spawned(&eb));
        assert_eq!(ea, eb);
    }

    #[test]
    fn test_frame_clock_caps_substeps() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.steps(SIM_DT * 2.0 + 0.001), 2);
        // Long stalls are clamped
        assert!(clock.steps(5.0) <= MAX_SUBSTEPS);
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let mut game = Game::with_opening(8, Tuning::default(), &[Beat::Triple]);
        game.advance();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.objects.len(), 3);
        assert_eq!(snapshot.beats_played, 1);
        assert_eq!(snapshot.lives, 3);
        assert!(serde_json::to_string(&snapshot).is_ok());
    }
}
