//! Data-driven tuning
//!
//! Read-only configuration for the camera, the world manager and the parallax
//! layers. Loaded from JSON; any field left out falls back to its default.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::SimError;
use crate::sim::parallax::ParallaxAreaConfig;
use crate::sim::spatial::LayerMask;
use crate::sim::{AreaId, LevelId};

/// Camera framing, smoothing and shake parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    /// Full visible height in world units at zoom 1
    pub size_y: f32,
    /// Screen width / height
    pub aspect: f32,
    /// Duration of anchor-zone zoom transitions (seconds)
    pub zoom_time: f32,
    /// Focus position smoothing rate
    pub smoothness: f32,
    /// Camera movement smoothing rate
    pub smoothness_2: f32,
    /// Fraction of the half extent (X) the player may move before the camera follows
    pub move_threshold_percentage_x: f32,
    /// Fraction of the half extent (Y) the player may move before the camera follows
    pub move_threshold_percentage_y: f32,
    /// Look-ahead in the player's moving direction, as a fraction of the visible size
    pub movement_direction_offset_percentages: Vec2,
    /// Max camera travel per tick on each axis
    pub max_speed_free_cam: f32,
    /// Trauma removed every tick
    pub reduce_trauma_per_tick_by: f32,
    /// Time scale of the shake noise
    pub screen_shake_speed: f32,
    pub screen_shake_max_amount_x: f32,
    pub screen_shake_max_amount_y: f32,
    pub trauma_on_player_death: f32,
    pub trauma_on_blob_pop: f32,
    /// Layers the camera collides with
    pub camera_layer_mask: LayerMask,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            size_y: 12.0,
            aspect: 16.0 / 9.0,
            zoom_time: 1.0,
            smoothness: 4.0,
            smoothness_2: 6.0,
            move_threshold_percentage_x: 0.7,
            move_threshold_percentage_y: 0.6,
            movement_direction_offset_percentages: Vec2::new(0.1, 0.05),
            max_speed_free_cam: 0.5,
            reduce_trauma_per_tick_by: 0.02,
            screen_shake_speed: 20.0,
            screen_shake_max_amount_x: 1.0,
            screen_shake_max_amount_y: 0.6,
            trauma_on_player_death: 1.0,
            trauma_on_blob_pop: 0.3,
            camera_layer_mask: LayerMask::CAMERA,
        }
    }
}

impl CameraTuning {
    /// Half extents of the visible area at zoom 1
    pub fn base_half_size(&self) -> Vec2 {
        let half_y = self.size_y / 2.0;
        Vec2::new(half_y * self.aspect, half_y)
    }

    /// Full visible area at zoom 1
    pub fn base_dimensions(&self) -> Vec2 {
        Vec2::new(self.size_y * self.aspect, self.size_y)
    }
}

/// Reset sequence, pop timers and save-point feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Transition in (progress 0 -> 0.5), seconds
    pub transition_length_first_half: f32,
    /// Transition out (progress 0.5 -> 1), seconds
    pub transition_length_second_half: f32,
    /// Ticks a respawning reset plant stays popped
    pub plant_popped_for_ticks: i32,
    /// Ticks a popped blob stays popped (large: blobs effectively never regrow)
    pub blob_popped_for_ticks: u32,
    /// Save effect placement relative to the spawn point
    pub save_effect_offset: Vec2,
    /// Save light fade-in duration, seconds
    pub save_light_duration: f32,
    pub save_light_max_intensity: f32,
    /// Radius used for spawn-point overlap when the player has no collider
    pub spawn_probe_radius: f32,
    /// Level that starts with the intro cutscene
    pub intro_cutscene_level: Option<LevelId>,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            transition_length_first_half: 0.5,
            transition_length_second_half: 0.5,
            plant_popped_for_ticks: 180,
            blob_popped_for_ticks: 10_000,
            save_effect_offset: Vec2::new(0.0, 0.5),
            save_light_duration: 0.7,
            save_light_max_intensity: 1.1,
            spawn_probe_radius: 0.0,
            intro_cutscene_level: None,
        }
    }
}

/// Background layers per area
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallaxTuning {
    /// Number of layer slots allocated up front
    pub max_layers: usize,
    pub areas: Vec<ParallaxAreaConfig>,
}

impl Default for ParallaxTuning {
    fn default() -> Self {
        Self {
            max_layers: 6,
            areas: Vec::new(),
        }
    }
}

impl ParallaxTuning {
    pub fn area(&self, area: AreaId) -> Option<&ParallaxAreaConfig> {
        self.areas.iter().find(|a| a.area == area)
    }
}

/// All tunables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub camera: CameraTuning,
    pub player: PlayerTuning,
    pub parallax: ParallaxTuning,
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let tuning = serde_json::from_str(json)?;
        log::info!("Loaded tuning");
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "camera": { "zoom_time": 2.5 } }"#).unwrap();
        assert_eq!(tuning.camera.zoom_time, 2.5);
        assert_eq!(tuning.camera.size_y, 12.0);
        assert_eq!(tuning.player.blob_popped_for_ticks, 10_000);
        assert_eq!(tuning.parallax.max_layers, 6);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            Tuning::from_json("{ camera: nope"),
            Err(SimError::Serde(_))
        ));
    }

    #[test]
    fn test_base_half_size() {
        let camera = CameraTuning::default();
        let half = camera.base_half_size();
        assert!((half.y - 6.0).abs() < 1e-6);
        assert!((half.x - 6.0 * 16.0 / 9.0).abs() < 1e-5);
    }
}
