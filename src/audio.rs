//! Audio routing
//!
//! Turns sound events from the simulation into calls on a playback backend.
//! One-shots are fire-and-forget; the bomb fuse is the only long-lived player.
//! A backend that cannot find an asset just reports it and the game carries on.

use std::collections::HashSet;

use crate::settings::Settings;
use crate::sim::{GameEvent, SoundEffect};

/// Looping sound played while a bomb is in the air
pub const FUSE_ASSET: &str = "sliceBombFuse.caf";

impl SoundEffect {
    /// Asset file for this sound
    pub fn asset_name(&self) -> &'static str {
        match self {
            SoundEffect::Launch => "launch.caf",
            SoundEffect::Whack => "whack.caf",
            SoundEffect::Explosion => "explosion.caf",
            SoundEffect::Wrong => "wrong.caf",
            SoundEffect::Swoosh(1) => "swoosh1.caf",
            SoundEffect::Swoosh(2) => "swoosh2.caf",
            SoundEffect::Swoosh(_) => "swoosh3.caf",
        }
    }
}

/// Playback surface provided by the host
pub trait AudioBackend {
    /// Play an asset once. Returns false if the asset is unavailable.
    fn play_once(&mut self, asset: &str, volume: f32) -> bool;
    /// Start the single looping player. Returns false if the asset is unavailable.
    fn start_loop(&mut self, asset: &str, volume: f32) -> bool;
    /// Stop the looping player
    fn stop_loop(&mut self);
}

/// Backend that only logs, for headless runs
#[derive(Debug, Clone, Default)]
pub struct LogBackend {
    /// Assets that exist; `None` means everything does
    pub available: Option<HashSet<String>>,
}

impl LogBackend {
    fn has(&self, asset: &str) -> bool {
        self.available
            .as_ref()
            .is_none_or(|assets| assets.contains(asset))
    }
}

impl AudioBackend for LogBackend {
    fn play_once(&mut self, asset: &str, volume: f32) -> bool {
        if !self.has(asset) {
            return false;
        }
        log::debug!("♪ {asset} @ {volume:.2}");
        true
    }

    fn start_loop(&mut self, asset: &str, volume: f32) -> bool {
        if !self.has(asset) {
            return false;
        }
        log::debug!("♪ loop {asset} @ {volume:.2}");
        true
    }

    fn stop_loop(&mut self) {
        log::debug!("♪ loop stopped");
    }
}

/// Audio manager for the game
pub struct AudioManager<B: AudioBackend> {
    backend: B,
    volume: f32,
    fuse_playing: bool,
}

impl<B: AudioBackend> AudioManager<B> {
    pub fn new(backend: B, settings: &Settings) -> Self {
        Self {
            backend,
            volume: settings.effective_volume(),
            fuse_playing: false,
        }
    }

    /// Pick up changed volume/mute preferences
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.volume = settings.effective_volume();
        if self.volume <= 0.0 {
            self.stop_fuse();
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn fuse_playing(&self) -> bool {
        self.fuse_playing
    }

    /// React to one simulation event; non-audio events are ignored
    pub fn handle(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Sound(effect) => self.play(*effect),
            GameEvent::FuseStarted { .. } => {
                self.stop_fuse();
                if self.volume <= 0.0 {
                    return;
                }
                self.fuse_playing = self.backend.start_loop(FUSE_ASSET, self.volume);
                if !self.fuse_playing {
                    log::debug!("Missing sound asset {FUSE_ASSET}, fuse is silent");
                }
            }
            GameEvent::FuseStopped => self.stop_fuse(),
            _ => {}
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        if self.volume <= 0.0 {
            return;
        }
        let asset = effect.asset_name();
        if !self.backend.play_once(asset, self.volume) {
            log::debug!("Missing sound asset {asset}, skipped");
        }
    }

    fn stop_fuse(&mut self) {
        if self.fuse_playing {
            self.backend.stop_loop();
            self.fuse_playing = false;
        }
    }
}
