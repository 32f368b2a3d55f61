//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (registry insertion order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod physics;
pub mod registry;
pub mod scheduler;
pub mod sequencer;
pub mod slice;
pub mod spawn;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use registry::{ActiveObject, EnemyKind, GlyphId, Handle, HitNode, Registry};
pub use scheduler::{Scheduler, Task};
pub use sequencer::{Beat, BeatPlan, RampState, Sequencer};
pub use slice::{GestureTrail, Ribbon, SlicePhase, SlicePipeline};
pub use spawn::{ForceBomb, Launch};
pub use state::{
    EffectKind, FuseLoop, GameEvent, GameState, LifeIndicator, RemovalCause, SoundEffect,
};
pub use tick::{FrameClock, Game, ObjectView, Snapshot};
