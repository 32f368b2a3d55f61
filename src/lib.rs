//! Slice Rush - a slice-the-targets arcade game core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawn sequencing, registry, slicing, game state)
//! - `audio`: Routes sound events to a playback backend
//! - `settings`: Player preferences persisted as JSON
//! - `tuning`: Data-driven game balance
//! - `error`: Configuration errors

pub mod audio;
pub mod error;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::ConfigError;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one engine frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play field dimensions (y grows upward, origin bottom-left)
    pub const FIELD_WIDTH: f32 = 1024.0;
    pub const FIELD_HEIGHT: f32 = 768.0;

    /// Horizontal inset of the spawn band from each field edge
    pub const SPAWN_MARGIN: f32 = 64.0;
    /// Spawn height, just below the visible area
    pub const SPAWN_Y: f32 = -128.0;
    /// Objects below this height are off-screen and get swept
    pub const OFFSCREEN_Y: f32 = -140.0;

    /// Gravity in px/s² (-6 m/s² at 150 px per meter)
    pub const GRAVITY: f32 = -900.0;
    /// Launch velocity units are multiplied by this to get px/s
    pub const VELOCITY_SCALE: f32 = 40.0;

    /// Hit radius of targets and bomb glyphs
    pub const ENEMY_RADIUS: f32 = 64.0;

    /// Number of life indicators on the HUD
    pub const MAX_LIVES: u8 = 3;
    /// Maximum touch points kept in the slice trail
    pub const TRAIL_CAP: usize = 12;
}

/// Linear interpolation between two points
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
