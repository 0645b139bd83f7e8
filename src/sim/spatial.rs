//! Spatial query adapter
//!
//! The narrow slice of a 2D physics world the core needs: ray casts and circle
//! overlaps. `BoxWorld` is a small in-memory implementation made of
//! axis-aligned boxes, enough to drive the simulation headless.

use std::ops::BitOr;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::ColliderId;

/// Bit set of collision layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: Self = Self(0);
    pub const DEFAULT: Self = Self(1);
    /// Geometry the camera is kept out of
    pub const CAMERA: Self = Self(1 << 1);
    pub const PLATFORM: Self = Self(1 << 2);
    pub const ALL: Self = Self(u32::MAX);

    #[inline]
    pub fn intersects(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for LayerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// A single ray hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// Where the ray entered the collider (the origin if it started inside)
    pub point: Vec2,
    /// Distance from the ray origin
    pub distance: f32,
    pub collider: ColliderId,
    pub is_trigger: bool,
}

/// Queries against the external collision world
pub trait SpatialQuery {
    /// All hits along the ray, nearest first
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<RaycastHit>;

    /// Some collider overlapping the circle, if any
    fn circle_overlap(&self, center: Vec2, radius: f32, mask: LayerMask) -> Option<ColliderId>;
}

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }

    /// Distance along a unit ray at which it enters the box (slab test)
    ///
    /// Returns `Some(0.0)` if the origin is already inside.
    pub fn ray_entry(&self, origin: Vec2, dir: Vec2) -> Option<f32> {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;

        for axis in 0..2 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < 1e-8 {
                // Parallel to this slab: must already be between its planes
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let t1 = (lo - o) / d;
            let t2 = (hi - o) / d;
            t_min = t_min.max(t1.min(t2));
            t_max = t_max.min(t1.max(t2));
        }

        if t_max < t_min.max(0.0) {
            return None;
        }
        Some(t_min.max(0.0))
    }
}

/// A box collider in `BoxWorld`
#[derive(Debug, Clone)]
pub struct BoxCollider {
    pub id: ColliderId,
    pub bounds: Aabb,
    pub layers: LayerMask,
    pub is_trigger: bool,
    pub enabled: bool,
}

/// In-memory collision world of axis-aligned boxes
#[derive(Debug, Clone, Default)]
pub struct BoxWorld {
    colliders: Vec<BoxCollider>,
    next_id: u32,
}

impl BoxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a solid collider
    pub fn add_solid(&mut self, bounds: Aabb, layers: LayerMask) -> ColliderId {
        self.add(bounds, layers, false)
    }

    /// Add a trigger collider (reported by queries, never blocks)
    pub fn add_trigger(&mut self, bounds: Aabb, layers: LayerMask) -> ColliderId {
        self.add(bounds, layers, true)
    }

    fn add(&mut self, bounds: Aabb, layers: LayerMask, is_trigger: bool) -> ColliderId {
        let id = ColliderId(self.next_id);
        self.next_id += 1;
        self.colliders.push(BoxCollider {
            id,
            bounds,
            layers,
            is_trigger,
            enabled: true,
        });
        id
    }

    pub fn remove(&mut self, id: ColliderId) -> bool {
        let before = self.colliders.len();
        self.colliders.retain(|c| c.id != id);
        self.colliders.len() != before
    }

    pub fn set_enabled(&mut self, id: ColliderId, enabled: bool) {
        if let Some(collider) = self.colliders.iter_mut().find(|c| c.id == id) {
            collider.enabled = enabled;
        }
    }

    pub fn get(&self, id: ColliderId) -> Option<&BoxCollider> {
        self.colliders.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.colliders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colliders.is_empty()
    }

    fn active(&self, mask: LayerMask) -> impl Iterator<Item = &BoxCollider> {
        self.colliders
            .iter()
            .filter(move |c| c.enabled && c.layers.intersects(mask))
    }
}

impl SpatialQuery for BoxWorld {
    fn raycast(
        &self,
        origin: Vec2,
        direction: Vec2,
        max_distance: f32,
        mask: LayerMask,
    ) -> Vec<RaycastHit> {
        let dir = direction.normalize_or_zero();
        if dir == Vec2::ZERO || max_distance < 0.0 {
            return Vec::new();
        }

        let mut hits: Vec<RaycastHit> = self
            .active(mask)
            .filter_map(|c| {
                let t = c.bounds.ray_entry(origin, dir)?;
                (t <= max_distance).then(|| RaycastHit {
                    point: origin + dir * t,
                    distance: t,
                    collider: c.id,
                    is_trigger: c.is_trigger,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits
    }

    fn circle_overlap(&self, center: Vec2, radius: f32, mask: LayerMask) -> Option<ColliderId> {
        self.active(mask)
            .find(|c| c.bounds.overlaps_circle(center, radius))
            .map(|c| c.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_entry_hits_box_ahead() {
        let b = Aabb::new(Vec2::new(5.0, -1.0), Vec2::new(6.0, 1.0));
        let t = b.ray_entry(Vec2::ZERO, Vec2::X).unwrap();
        assert!((t - 5.0).abs() < 1e-6);
        assert!(b.ray_entry(Vec2::ZERO, -Vec2::X).is_none());
        assert!(b.ray_entry(Vec2::new(0.0, 2.0), Vec2::X).is_none());
    }

    #[test]
    fn test_ray_entry_from_inside_is_zero() {
        let b = Aabb::from_center_size(Vec2::ZERO, Vec2::splat(2.0));
        assert_eq!(b.ray_entry(Vec2::ZERO, Vec2::Y), Some(0.0));
    }

    #[test]
    fn test_raycast_sorted_and_bounded() {
        let mut world = BoxWorld::new();
        let far = world.add_solid(
            Aabb::new(Vec2::new(8.0, -1.0), Vec2::new(9.0, 1.0)),
            LayerMask::CAMERA,
        );
        let near = world.add_trigger(
            Aabb::new(Vec2::new(3.0, -1.0), Vec2::new(4.0, 1.0)),
            LayerMask::CAMERA,
        );
        world.add_solid(
            Aabb::new(Vec2::new(1.0, -1.0), Vec2::new(2.0, 1.0)),
            LayerMask::DEFAULT,
        );

        let hits = world.raycast(Vec2::ZERO, Vec2::new(10.0, 0.0), 20.0, LayerMask::CAMERA);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].collider, near);
        assert!(hits[0].is_trigger);
        assert_eq!(hits[1].collider, far);
        assert!((hits[1].point.x - 8.0).abs() < 1e-6);

        let short = world.raycast(Vec2::ZERO, Vec2::X, 5.0, LayerMask::CAMERA);
        assert_eq!(short.len(), 1);
    }

    #[test]
    fn test_disabled_colliders_are_ignored() {
        let mut world = BoxWorld::new();
        let id = world.add_solid(
            Aabb::from_center_size(Vec2::ZERO, Vec2::ONE),
            LayerMask::CAMERA,
        );
        assert_eq!(world.circle_overlap(Vec2::ZERO, 0.1, LayerMask::ALL), Some(id));
        world.set_enabled(id, false);
        assert_eq!(world.circle_overlap(Vec2::ZERO, 0.1, LayerMask::ALL), None);
        assert!(world.raycast(Vec2::new(-3.0, 0.0), Vec2::X, 10.0, LayerMask::ALL).is_empty());
    }

    #[test]
    fn test_circle_overlap_edge() {
        let b = Aabb::new(Vec2::new(1.0, 0.0), Vec2::new(2.0, 1.0));
        assert!(b.overlaps_circle(Vec2::new(0.5, 0.5), 0.5));
        assert!(!b.overlaps_circle(Vec2::new(0.4, 0.5), 0.5));
    }
}
