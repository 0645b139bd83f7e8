//! Camera anchor zones
//!
//! Regions that override the normal player-following framing with their own
//! target view and zoom. Zones are created by level data and only ever
//! activated or deactivated by the camera controller.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::spatial::Aabb;
use super::state::{AnchorZoneId, ColliderId};

/// How a zone picks the camera position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AnchorFraming {
    /// Always frame this exact point
    Fixed(Vec2),
    /// Follow the player but keep the view inside the zone bounds
    Confine,
}

/// A camera anchor zone
#[derive(Debug, Clone)]
pub struct AnchorZone {
    pub id: AnchorZoneId,
    pub bounds: Aabb,
    /// Zoom factor while framed by this zone
    pub zoom: f32,
    pub framing: AnchorFraming,
    /// Trigger collider the player overlaps to be "in" the zone
    pub trigger: ColliderId,
    /// Solid colliders that keep the camera inside the zone while active
    pub camera_colliders: Vec<ColliderId>,
    colliders_active: bool,
}

impl AnchorZone {
    pub fn new(bounds: Aabb, zoom: f32, trigger: ColliderId) -> Self {
        Self {
            id: AnchorZoneId(u32::MAX),
            bounds,
            zoom: if zoom > 0.0 { zoom } else { 1.0 },
            framing: AnchorFraming::Confine,
            trigger,
            camera_colliders: Vec::new(),
            colliders_active: false,
        }
    }

    pub fn with_framing(mut self, framing: AnchorFraming) -> Self {
        self.framing = framing;
        self
    }

    pub fn with_camera_colliders(mut self, colliders: Vec<ColliderId>) -> Self {
        self.camera_colliders = colliders;
        self
    }

    pub fn colliders_active(&self) -> bool {
        self.colliders_active
    }

    pub(crate) fn set_colliders_active(&mut self, active: bool) {
        self.colliders_active = active;
    }

    pub fn owns_collider(&self, collider: ColliderId) -> bool {
        self.trigger == collider || self.camera_colliders.contains(&collider)
    }

    /// Camera position this zone wants for a view of `camera_size`
    pub fn target_camera_position(&self, camera_size: Vec2, player_position: Vec2) -> Vec2 {
        match self.framing {
            AnchorFraming::Fixed(p) => p,
            AnchorFraming::Confine => {
                let half = camera_size / 2.0;
                let center = self.bounds.center();
                let mut target = player_position;
                for axis in 0..2 {
                    let lo = self.bounds.min[axis] + half[axis];
                    let hi = self.bounds.max[axis] - half[axis];
                    target[axis] = if lo > hi {
                        // View larger than the zone on this axis
                        center[axis]
                    } else {
                        target[axis].clamp(lo, hi)
                    };
                }
                target
            }
        }
    }
}

/// Arena of all anchor zones known to the camera
#[derive(Debug, Clone, Default)]
pub struct AnchorZones {
    zones: Vec<AnchorZone>,
    next_id: u32,
}

impl AnchorZones {
    pub fn insert(&mut self, mut zone: AnchorZone) -> AnchorZoneId {
        let id = AnchorZoneId(self.next_id);
        self.next_id += 1;
        zone.id = id;
        zone.colliders_active = false;
        self.zones.push(zone);
        id
    }

    pub fn remove(&mut self, id: AnchorZoneId) -> Option<AnchorZone> {
        let index = self.zones.iter().position(|z| z.id == id)?;
        Some(self.zones.remove(index))
    }

    pub fn get(&self, id: AnchorZoneId) -> Option<&AnchorZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn get_mut(&mut self, id: AnchorZoneId) -> Option<&mut AnchorZone> {
        self.zones.iter_mut().find(|z| z.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnchorZone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zone owning `collider` (its trigger or one of its camera colliders)
    pub fn zone_for_collider(&self, collider: ColliderId) -> Option<AnchorZoneId> {
        self.zones
            .iter()
            .find(|z| z.owns_collider(collider))
            .map(|z| z.id)
    }

    /// Some(active) if `collider` is an anchor-zone camera collider
    pub fn camera_collider_state(&self, collider: ColliderId) -> Option<bool> {
        self.zones
            .iter()
            .find(|z| z.camera_colliders.contains(&collider))
            .map(|z| z.colliders_active)
    }

    /// Number of zones with colliders enabled (0 or 1)
    pub fn active_count(&self) -> usize {
        self.zones.iter().filter(|z| z.colliders_active).count()
    }
}
