//! Gesture trail and slice ribbon
//!
//! Touch points feed a short FIFO trail; the ribbon is the polyline through
//! it. Hit testing against the registry happens in the game, after the ribbon
//! for the same touch move has been rebuilt.

use std::collections::VecDeque;

use glam::Vec2;
use serde::Serialize;

use crate::consts::TRAIL_CAP;

/// Most recent touch points, oldest first
#[derive(Debug, Clone)]
pub struct GestureTrail {
    points: VecDeque<Vec2>,
    cap: usize,
}

impl Default for GestureTrail {
    fn default() -> Self {
        Self::with_cap(TRAIL_CAP)
    }
}

impl GestureTrail {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap + 1),
            cap: cap.max(1),
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn push(&mut self, point: Vec2) {
        self.points.push_back(point);
    }

    /// Drop the oldest points beyond the cap
    pub fn trim(&mut self) {
        while self.points.len() > self.cap {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().copied()
    }

    pub fn last(&self) -> Option<Vec2> {
        self.points.back().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
struct Fade {
    from: f32,
    elapsed: f32,
    duration: f32,
}

/// Renderable slice line
#[derive(Debug, Clone, Serialize)]
pub struct Ribbon {
    /// Connected polyline; empty when the trail has fewer than 2 points
    pub path: Vec<Vec2>,
    pub opacity: f32,
    fade: Option<Fade>,
}

impl Default for Ribbon {
    fn default() -> Self {
        Self {
            path: Vec::new(),
            opacity: 1.0,
            fade: None,
        }
    }
}

impl Ribbon {
    pub fn rebuild(&mut self, trail: &GestureTrail) {
        self.path.clear();
        if trail.len() >= 2 {
            self.path.extend(trail.points());
        }
    }

    pub fn has_geometry(&self) -> bool {
        !self.path.is_empty()
    }

    /// Cancel any fade and show fully
    pub fn reset(&mut self) {
        self.fade = None;
        self.opacity = 1.0;
    }

    pub fn fade_out(&mut self, duration: f32) {
        self.fade = Some(Fade {
            from: self.opacity,
            elapsed: 0.0,
            duration,
        });
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn update(&mut self, dt: f32) {
        if let Some(fade) = self.fade.as_mut() {
            fade.elapsed += dt;
            let t = fade.elapsed / fade.duration;
            self.opacity = crate::lerp(fade.from, 0.0, t);
            if t >= 1.0 {
                self.opacity = 0.0;
                self.fade = None;
            }
        }
    }
}

/// Touch tracking state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SlicePhase {
    #[default]
    Idle,
    Tracking,
}

/// Trail, ribbon and swoosh de-dup for the active touch
#[derive(Debug, Clone, Default)]
pub struct SlicePipeline {
    pub phase: SlicePhase,
    pub trail: GestureTrail,
    pub ribbon: Ribbon,
    /// A swoosh is playing; no new one until it re-arms
    pub swoosh_active: bool,
}

impl SlicePipeline {
    pub fn begin(&mut self, point: Vec2) {
        self.phase = SlicePhase::Tracking;
        self.trail.clear();
        self.ribbon.reset();
        self.trail.push(point);
        self.ribbon.rebuild(&self.trail);
    }

    /// Extend the trail and rebuild the ribbon.
    ///
    /// Returns true when a swoosh should start.
    pub fn extend(&mut self, point: Vec2) -> bool {
        self.phase = SlicePhase::Tracking;
        self.trail.push(point);
        self.trail.trim();
        self.ribbon.rebuild(&self.trail);

        if self.swoosh_active {
            false
        } else {
            self.swoosh_active = true;
            true
        }
    }

    pub fn end(&mut self, fade_secs: f32) {
        self.phase = SlicePhase::Idle;
        self.ribbon.fade_out(fade_secs);
    }

    pub fn rearm_swoosh(&mut self) {
        self.swoosh_active = false;
    }
}
