//! Shared simulation types
//!
//! Identifiers for engine-owned objects, the game/camera state enums and the
//! player collaborator contract. The core only ever holds these handles and
//! value snapshots, never the objects themselves.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::tick::TickInput;

/// A loaded level (scene)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LevelId(pub u32);

/// A gameplay area spanning one or more levels; selects parallax and ambience
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AreaId(pub u32);

/// A collider in the external spatial world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColliderId(pub u32);

/// A sprite asset handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorZoneId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HiveId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlantId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnerId(pub u32);

/// Spawn points are ordered by (level, index)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpawnPointId {
    pub level: LevelId,
    pub index: i32,
}

impl SpawnPointId {
    pub fn new(level: LevelId, index: i32) -> Self {
        Self { level, index }
    }
}

/// Top-level game flow
///
/// Only moves forward (Pregameplay -> Cutscene -> Gameplay); a level load may
/// put it back to its starting state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Title screen, waiting for the first input
    Pregameplay,
    /// Intro cutscene running; world logic is paused
    Cutscene,
    #[default]
    Gameplay,
}

/// What the camera is currently framing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraMode {
    #[default]
    FocusPlayer,
    TransitionToAnchorZone,
    TransitionToFocusPlayer,
    /// Hard follow, no smoothing (scripted sequences)
    LockOnPlayer,
}

impl CameraMode {
    /// Modes that move the camera across anchor-zone boundaries on purpose
    pub fn ignores_anchor_colliders(self) -> bool {
        matches!(
            self,
            CameraMode::TransitionToAnchorZone
                | CameraMode::TransitionToFocusPlayer
                | CameraMode::LockOnPlayer
        )
    }

    /// Stable mode a transitional mode settles into once the focus is reached
    pub fn settled(self) -> Self {
        match self {
            CameraMode::TransitionToAnchorZone | CameraMode::TransitionToFocusPlayer => {
                CameraMode::FocusPlayer
            }
            other => other,
        }
    }
}

/// Result of a player tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerStatus {
    Alive,
    Died,
}

/// The player character (movement, physics and input live outside the core)
pub trait Player {
    fn position(&self) -> Vec2;
    /// Smoothed, roughly unit-length movement direction used for look-ahead
    fn smooth_moving_direction(&self) -> Vec2;
    /// Radius of the player's collider, if it has one
    fn collider_radius(&self) -> Option<f32>;
    fn tick(&mut self, input: &TickInput) -> PlayerStatus;
    /// Teleport to `position` and clear transient state
    fn reset(&mut self, position: Vec2);
    fn set_visible(&mut self, visible: bool);
    /// Give back the dash after popping a blob or plant
    fn regain_dash(&mut self);
}

/// A kinematic player driven directly by stick input
///
/// Used by the demo driver and tests in place of a full character controller.
#[derive(Debug, Clone)]
pub struct PuppetPlayer {
    pub position: Vec2,
    pub velocity: Vec2,
    pub speed: f32,
    pub radius: Option<f32>,
    pub visible: bool,
    pub dash_available: bool,
    /// Dies when reaching this height or below
    pub kill_height: Option<f32>,
    pub(crate) smooth_direction: Vec2,
    pub resets: u32,
}

impl Default for PuppetPlayer {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            speed: 0.1,
            radius: Some(0.4),
            visible: true,
            dash_available: true,
            kill_height: None,
            smooth_direction: Vec2::ZERO,
            resets: 0,
        }
    }
}

impl PuppetPlayer {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

impl Player for PuppetPlayer {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn smooth_moving_direction(&self) -> Vec2 {
        self.smooth_direction
    }

    fn collider_radius(&self) -> Option<f32> {
        self.radius
    }

    fn tick(&mut self, input: &TickInput) -> PlayerStatus {
        self.velocity = input.stick.clamp_length_max(1.0) * self.speed;
        self.position += self.velocity;
        self.smooth_direction = self
            .smooth_direction
            .lerp(self.velocity.normalize_or_zero(), 0.1);

        match self.kill_height {
            Some(h) if self.position.y <= h => PlayerStatus::Died,
            _ => PlayerStatus::Alive,
        }
    }

    fn reset(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.smooth_direction = Vec2::ZERO;
        self.resets += 1;
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn regain_dash(&mut self) {
        self.dash_available = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_point_ordering() {
        let a = SpawnPointId::new(LevelId(1), 5);
        let b = SpawnPointId::new(LevelId(2), 0);
        let c = SpawnPointId::new(LevelId(1), 7);
        let mut ids = vec![b, c, a];
        ids.sort();
        assert_eq!(ids, vec![a, c, b]);
    }

    #[test]
    fn test_transitional_modes_settle_to_focus_player() {
        assert_eq!(CameraMode::TransitionToAnchorZone.settled(), CameraMode::FocusPlayer);
        assert_eq!(CameraMode::TransitionToFocusPlayer.settled(), CameraMode::FocusPlayer);
        assert_eq!(CameraMode::LockOnPlayer.settled(), CameraMode::LockOnPlayer);
        assert!(!CameraMode::FocusPlayer.ignores_anchor_colliders());
        assert!(CameraMode::LockOnPlayer.ignores_anchor_colliders());
    }

    #[test]
    fn test_puppet_dies_below_kill_height() {
        let mut player = PuppetPlayer {
            kill_height: Some(-1.5),
            speed: 1.0,
            ..Default::default()
        };
        let down = TickInput {
            stick: Vec2::new(0.0, -1.0),
            ..Default::default()
        };
        assert_eq!(player.tick(&down), PlayerStatus::Alive);
        assert_eq!(player.tick(&down), PlayerStatus::Died);
    }
}
