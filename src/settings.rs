//! Runtime toggles
//!
//! Debug switches and accessibility preferences that can change while the
//! simulation runs. Unlike `Tuning`, these never describe the game itself.

use serde::{Deserialize, Serialize};

/// Debug and accessibility settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Debug ===
    /// Skip all camera logic (camera stays where it is)
    pub freeze_camera: bool,
    /// Run the camera late tick only every N frames
    pub camera_tick_every: u32,
    /// Run the world tick only every N frames
    pub player_tick_every: u32,
    /// Record camera diagnostics each tick
    pub debug_overlay: bool,
    /// Log the current spawn point whenever it changes
    pub draw_current_spawn_id: bool,

    // === Accessibility ===
    /// Screen shake on impacts
    pub screen_shake: bool,
    /// Reduced motion (disables shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            freeze_camera: false,
            camera_tick_every: 1,
            player_tick_every: 1,
            debug_overlay: false,
            draw_current_spawn_id: false,
            screen_shake: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// True if the camera should run on this tick call
    pub fn camera_runs_on(&self, tick_call: u64) -> bool {
        tick_call % u64::from(self.camera_tick_every.max(1)) == 0
    }

    /// True if the world should run on this tick call
    pub fn world_runs_on(&self, tick_call: u64) -> bool {
        tick_call % u64::from(self.player_tick_every.max(1)) == 0
    }
}
