//! Active-object registry
//!
//! Every in-flight enemy lives in an arena slot and is addressed by a
//! generation-checked [`Handle`]. The renderer only ever sees handles, so a
//! stale handle for a removed object resolves to nothing instead of aliasing a
//! newer object that reused the slot.
//!
//! Bombs are two-part: an invisible container (the physics body, owned here)
//! and a visible glyph that hit tests actually land on. A glyph resolves back
//! to its container until the container is removed.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::ENEMY_RADIUS;

/// Stable reference to a registry slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    pub fn index(&self) -> u32 {
        self.index
    }
}

/// Visible bomb glyph attached to a bomb container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlyphId(u32);

/// What a spawned enemy is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Plain target: slice for a point, miss it and lose a life
    Target,
    /// Bomb container: slicing its glyph ends the run
    Bomb,
}

/// One in-flight enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveObject {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Radians per second
    pub angular_vel: f32,
    pub rotation: f32,
    pub radius: f32,
    /// Already hit; ignored by later hit tests
    pub struck: bool,
    /// Set by the registry for bombs
    pub glyph: Option<GlyphId>,
}

impl ActiveObject {
    pub fn new(kind: EnemyKind, pos: Vec2, vel: Vec2, angular_vel: f32) -> Self {
        Self {
            kind,
            pos,
            vel,
            angular_vel,
            rotation: 0.0,
            radius: ENEMY_RADIUS,
            struck: false,
            glyph: None,
        }
    }

    pub fn is_bomb(&self) -> bool {
        self.kind == EnemyKind::Bomb
    }
}

/// A renderable node under a hit-test point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitNode {
    Target(Handle),
    BombGlyph(GlyphId),
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    object: Option<ActiveObject>,
}

/// Arena of active objects with stable insertion order
#[derive(Debug, Clone, Default)]
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Live handles in insertion order
    order: Vec<Handle>,
    glyph_parents: HashMap<GlyphId, Handle>,
    next_glyph: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of a new object and return its handle
    pub fn spawn(&mut self, mut object: ActiveObject) -> Handle {
        let glyph = if object.is_bomb() {
            let glyph = GlyphId(self.next_glyph);
            self.next_glyph += 1;
            Some(glyph)
        } else {
            None
        };
        object.glyph = glyph;

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(object);
                Handle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    object: Some(object),
                });
                Handle { index, generation: 0 }
            }
        };

        if let Some(glyph) = glyph {
            self.glyph_parents.insert(glyph, handle);
        }
        self.order.push(handle);
        handle
    }

    /// Remove an object, detaching its glyph. Stale handles return `None`.
    pub fn remove(&mut self, handle: Handle) -> Option<ActiveObject> {
        let position = self.order.iter().position(|h| *h == handle)?;
        self.remove_at(position)
    }

    fn remove_at(&mut self, position: usize) -> Option<ActiveObject> {
        let handle = self.order.remove(position);
        let slot = self.slots.get_mut(handle.index as usize)?;
        let object = slot.object.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        if let Some(glyph) = object.glyph {
            self.glyph_parents.remove(&glyph);
        }
        Some(object)
    }

    pub fn get(&self, handle: Handle) -> Option<&ActiveObject> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.object.as_ref())
    }

    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut ActiveObject> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.object.as_mut())
    }

    /// Iterate live objects in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &ActiveObject)> + '_ {
        self.order
            .iter()
            .filter_map(move |&h| self.get(h).map(|object| (h, object)))
    }

    /// Mutable pass over every live object, in insertion order
    pub fn for_each_mut(&mut self, mut f: impl FnMut(Handle, &mut ActiveObject)) {
        for &handle in &self.order {
            if let Some(object) = self.slots[handle.index as usize].object.as_mut() {
                f(handle, object);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn has_bomb(&self) -> bool {
        self.iter().any(|(_, object)| object.is_bomb())
    }

    /// Nodes overlapping a point, in insertion order
    pub fn nodes_at(&self, point: Vec2) -> Vec<HitNode> {
        self.iter()
            .filter(|(_, object)| object.pos.distance_squared(point) <= object.radius * object.radius)
            .filter_map(|(handle, object)| match object.kind {
                EnemyKind::Target => Some(HitNode::Target(handle)),
                // The container is invisible; only its glyph is hittable
                EnemyKind::Bomb => object.glyph.map(HitNode::BombGlyph),
            })
            .collect()
    }

    /// Container that owns a glyph, if it is still registered
    pub fn resolve_glyph(&self, glyph: GlyphId) -> Option<Handle> {
        self.glyph_parents.get(&glyph).copied()
    }

    /// Mark an object struck and remove it. Returns `None` if it was already
    /// struck or is gone.
    pub fn strike(&mut self, handle: Handle) -> Option<ActiveObject> {
        let object = self.get_mut(handle)?;
        if object.struck {
            return None;
        }
        object.struck = true;
        self.remove(handle)
    }

    /// Remove every object below `threshold`, scanning newest first
    pub fn sweep_below(&mut self, threshold: f32) -> Vec<(Handle, ActiveObject)> {
        let mut swept = Vec::new();
        for position in (0..self.order.len()).rev() {
            let handle = self.order[position];
            let below = self.get(handle).is_some_and(|object| object.pos.y < threshold);
            if below {
                if let Some(object) = self.remove_at(position) {
                    swept.push((handle, object));
                }
            }
        }
        swept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_at(x: f32, y: f32) -> ActiveObject {
        ActiveObject::new(EnemyKind::Target, Vec2::new(x, y), Vec2::ZERO, 0.0)
    }

    fn bomb_at(x: f32, y: f32) -> ActiveObject {
        ActiveObject::new(EnemyKind::Bomb, Vec2::new(x, y), Vec2::ZERO, 0.0)
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut registry = Registry::new();
        let first = registry.spawn(target_at(0.0, 0.0));
        registry.remove(first).unwrap();

        let second = registry.spawn(target_at(10.0, 10.0));
        assert_eq!(first.index(), second.index());
        assert!(registry.get(first).is_none());
        assert!(registry.remove(first).is_none());
        assert_eq!(registry.get(second).unwrap().pos, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_iteration_keeps_insertion_order() {
        let mut registry = Registry::new();
        let a = registry.spawn(target_at(1.0, 0.0));
        let b = registry.spawn(target_at(2.0, 0.0));
        let c = registry.spawn(target_at(3.0, 0.0));
        registry.remove(b);
        let d = registry.spawn(target_at(4.0, 0.0));

        let handles: Vec<_> = registry.iter().map(|(h, _)| h).collect();
        assert_eq!(handles, vec![a, c, d]);
    }

    #[test]
    fn test_glyph_resolves_until_container_removed() {
        let mut registry = Registry::new();
        let bomb = registry.spawn(bomb_at(100.0, 100.0));
        let glyph = registry.get(bomb).unwrap().glyph.unwrap();

        assert_eq!(registry.nodes_at(Vec2::new(100.0, 100.0)), vec![HitNode::BombGlyph(glyph)]);
        assert_eq!(registry.resolve_glyph(glyph), Some(bomb));

        registry.remove(bomb);
        assert_eq!(registry.resolve_glyph(glyph), None);
    }

    #[test]
    fn test_nodes_at_respects_radius() {
        let mut registry = Registry::new();
        let near = registry.spawn(target_at(0.0, 0.0));
        registry.spawn(target_at(500.0, 0.0));

        assert_eq!(registry.nodes_at(Vec2::new(60.0, 0.0)), vec![HitNode::Target(near)]);
        assert!(registry.nodes_at(Vec2::new(250.0, 0.0)).is_empty());
    }

    #[test]
    fn test_strike_is_exclusive() {
        let mut registry = Registry::new();
        let target = registry.spawn(target_at(0.0, 0.0));
        assert!(registry.strike(target).is_some_and(|o| o.struck));
        assert!(registry.strike(target).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sweep_below_removes_only_fallen() {
        let mut registry = Registry::new();
        let high = registry.spawn(target_at(0.0, 300.0));
        let low_a = registry.spawn(target_at(0.0, -200.0));
        let low_b = registry.spawn(bomb_at(0.0, -150.0));

        let swept: Vec<_> = registry.sweep_below(-140.0).into_iter().map(|(h, _)| h).collect();
        assert_eq!(swept, vec![low_b, low_a]);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(high).is_some());
        assert!(!registry.has_bomb());
    }
}
