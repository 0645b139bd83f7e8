//! Thicket - camera and world simulation core for a 2D platformer
//!
//! Core modules:
//! - `sim`: Per-tick simulation (camera controller, parallax, world/player manager)
//! - `tuning`: Data-driven configuration provider
//! - `settings`: Runtime debug and accessibility toggles
//! - `persistence`: Save/load of player progress

pub mod error;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::SimError;
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Simulation constants that are not data-driven
pub mod consts {
    /// Default frame step used by the demo driver and tests (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Focus counts as "reached" when closer than this on both axes
    pub const FOCUS_REACHED_EPSILON: f32 = 0.1;
    /// Moves smaller than this on both axes are skipped
    pub const SIGNIFICANT_MOVE: f32 = 0.01;
    /// Camera speed ramps from the minimum to full over this distance
    pub const SLOW_MOVE_DISTANCE: f32 = 2.0;
    /// Lower bound of the speed ramp, as a fraction of the max speed
    pub const MIN_MOVE_FACTOR: f32 = 0.1;
    /// Max speed multiplier while locked onto the player
    pub const LOCKED_SPEED_MULTIPLIER: f32 = 2.5;
    /// Upper bound of the outside-threshold acceleration
    pub const MAX_OUTSIDE_THRESHOLD_FACTOR: f32 = 1.5;
    /// Lower bound of the movement-similarity damping
    pub const MIN_SIMILARITY_FACTOR: f32 = 0.1;
    /// Height/width ratio used for the follow threshold rectangle
    pub const THRESHOLD_ASPECT_Y: f32 = 9.0 / 16.0;
    /// Extra radius added to the player collider when probing for anchor zones
    pub const ANCHOR_PROBE_PADDING: f32 = 0.1;

    /// Trauma smoothing rate per tick
    pub const TRAUMA_SMOOTHING: f32 = 0.2;

    /// Screen transition progress at which the world is reset
    pub const TRANSITION_HALF: f32 = 0.5;
    /// Screen transition progress when fully finished
    pub const TRANSITION_FULL: f32 = 1.0;

    /// Analog threshold for the reset button
    pub const RESET_INPUT_THRESHOLD: f32 = 0.1;
}

/// Linear interpolation with `t` clamped to [0, 1]
#[inline]
pub fn lerp_clamped(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

/// Vector linear interpolation with `t` clamped to [0, 1]
#[inline]
pub fn lerp_vec_clamped(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a.lerp(b, t.clamp(0.0, 1.0))
}

/// Map `value` from [from_min, from_max] onto [to_min, to_max] (unclamped)
///
/// A degenerate source range maps everything to `to_min`.
#[inline]
pub fn remap(value: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    let span = from_max - from_min;
    if span.abs() <= f32::EPSILON {
        return to_min;
    }
    to_min + (value - from_min) / span * (to_max - to_min)
}

/// Interpolate between two values treated as angles in degrees
///
/// Takes the shortest way around the 360° wrap, `t` clamped to [0, 1].
pub fn lerp_angle_deg(a: f32, b: f32, t: f32) -> f32 {
    let mut delta = (b - a).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    a + delta * t.clamp(0.0, 1.0)
}

/// Hermite smoothstep between `from` and `to`, `t` clamped to [0, 1]
#[inline]
pub fn smoothstep(from: f32, to: f32, t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    let t = -2.0 * t * t * t + 3.0 * t * t;
    to * t + from * (1.0 - t)
}
