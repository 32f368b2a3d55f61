//! Game state and the events the simulation emits
//!
//! The presentation layer never reaches into the simulation; it drains
//! [`GameEvent`]s and renders from a snapshot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::registry::{EnemyKind, Handle};
use super::spawn::Launch;

/// Fire-and-forget sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Target thrown
    Launch,
    /// Target sliced
    Whack,
    /// Bomb sliced
    Explosion,
    /// Target missed
    Wrong,
    /// Slice gesture, one of three variants (1-3)
    Swoosh(u8),
}

/// Particle effects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    SliceHitEnemy,
    SliceHitBomb,
    /// Burning fuse attached to a bomb
    Fuse,
}

/// Why an object left the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemovalCause {
    /// Scale/fade out where it was hit
    Sliced,
    /// Fell below the field
    OffScreen,
}

/// Something the presentation layer should react to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Spawned { handle: Handle, kind: EnemyKind, launch: Launch },
    Removed { handle: Handle, cause: RemovalCause },
    Sound(SoundEffect),
    FuseStarted { bomb: Handle },
    FuseStopped,
    Effect { kind: EffectKind, pos: Vec2, attached_to: Option<Handle> },
    ScoreChanged(u32),
    LifeLost { remaining: u8, indicator: usize },
    GameOver { by_bomb: bool },
}

/// One HUD life marker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifeIndicator {
    pub gone: bool,
    /// Display scale; pops up when the life is lost then settles to 1
    pub scale: f32,
    pulse: Option<Pulse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct Pulse {
    from: f32,
    elapsed: f32,
    duration: f32,
}

impl Default for LifeIndicator {
    fn default() -> Self {
        Self {
            gone: false,
            scale: 1.0,
            pulse: None,
        }
    }
}

impl LifeIndicator {
    pub fn mark_gone(&mut self, pulse_scale: f32, pulse_secs: f32) {
        self.gone = true;
        self.scale = pulse_scale;
        self.pulse = Some(Pulse {
            from: pulse_scale,
            elapsed: 0.0,
            duration: pulse_secs,
        });
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(pulse) = self.pulse.as_mut() {
            pulse.elapsed += dt;
            let t = pulse.elapsed / pulse.duration;
            self.scale = crate::lerp(pulse.from, 1.0, t);
            if t >= 1.0 {
                self.scale = 1.0;
                self.pulse = None;
            }
        }
    }
}

/// The single looping fuse sound. Starting a new fuse replaces the old one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuseLoop {
    playing: Option<Handle>,
}

impl FuseLoop {
    pub fn is_playing(&self) -> bool {
        self.playing.is_some()
    }
}

/// Score, lives and the end-of-run flag
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    pub score: u32,
    pub lives: u8,
    /// One-way: once set nothing spawns, scores or costs a life
    pub ended: bool,
    pub ended_by_bomb: bool,
    pub indicators: Vec<LifeIndicator>,
    /// A beat is queued (or running) so an empty field must not queue another
    pub beat_pending: bool,
    fuse: FuseLoop,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    pub fn new(lives: u8) -> Self {
        Self {
            score: 0,
            lives,
            ended: false,
            ended_by_bomb: false,
            indicators: vec![LifeIndicator::default(); lives as usize],
            beat_pending: true,
            fuse: FuseLoop::default(),
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take everything emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn fuse(&self) -> &FuseLoop {
        &self.fuse
    }

    pub fn start_fuse(&mut self, bomb: Handle) {
        self.stop_fuse();
        self.fuse.playing = Some(bomb);
        self.emit(GameEvent::FuseStarted { bomb });
    }

    pub fn stop_fuse(&mut self) {
        if self.fuse.playing.take().is_some() {
            self.emit(GameEvent::FuseStopped);
        }
    }

    pub fn update_indicators(&mut self, dt: f32) {
        for indicator in &mut self.indicators {
            indicator.update(dt);
        }
    }
}
