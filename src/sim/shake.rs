//! Trauma-driven screen shake
//!
//! Trauma is a scalar that decays by a fixed amount every tick. While it is
//! positive, a smoothed copy of it scales two Perlin noise samples into a
//! local camera offset (amplitude grows with the square of the trauma).

use glam::Vec2;
use noiz::prelude::{common_noise::*, *};

use crate::consts::TRAUMA_SMOOTHING;
use crate::lerp_clamped;
use crate::tuning::CameraTuning;

/// Noise rows for the two axes; far apart so the samples are independent
const NOISE_ROW_X: f32 = 17.31;
const NOISE_ROW_Y: f32 = 53.77;

pub struct Shake {
    trauma: f32,
    smoothed: f32,
    offset: Vec2,
    noise: Noise<Fbm<Perlin>>,
}

impl std::fmt::Debug for Shake {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shake")
            .field("trauma", &self.trauma)
            .field("smoothed", &self.smoothed)
            .field("offset", &self.offset)
            .finish()
    }
}

impl Shake {
    pub fn new(seed: u32) -> Self {
        let mut noise: Noise<Fbm<Perlin>> = Noise::<Fbm<Perlin>>::default();
        noise.set_seed(seed);
        noise.set_frequency(1.0);
        Self {
            trauma: 0.0,
            smoothed: 0.0,
            offset: Vec2::ZERO,
            noise,
        }
    }

    pub fn trauma(&self) -> f32 {
        self.trauma
    }

    pub fn smoothed_trauma(&self) -> f32 {
        self.smoothed
    }

    /// Local camera offset on top of the holder position
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Accumulate trauma; the total never drops below zero
    pub fn add_trauma(&mut self, amount: f32) {
        self.trauma = (self.trauma + amount).max(0.0);
    }

    pub fn reset(&mut self) {
        self.trauma = 0.0;
        self.smoothed = 0.0;
    }

    /// Decay trauma and recompute the offset. `time` is total elapsed seconds.
    pub fn tick(&mut self, time: f32, tuning: &CameraTuning, enabled: bool) {
        if self.trauma == 0.0 {
            return;
        }

        self.trauma -= tuning.reduce_trauma_per_tick_by.max(f32::EPSILON);
        if self.trauma <= 0.0 {
            self.reset();
            self.offset = Vec2::ZERO;
            return;
        }

        self.smoothed = lerp_clamped(self.smoothed, self.trauma, TRAUMA_SMOOTHING);
        if !enabled {
            self.offset = Vec2::ZERO;
            return;
        }

        let t = time * tuning.screen_shake_speed;
        let amount = self.smoothed * self.smoothed;
        let nx = self.sample(bevy_math::Vec3::new(t, NOISE_ROW_X, 0.0));
        let ny = self.sample(bevy_math::Vec3::new(NOISE_ROW_Y, t, 0.0));

        self.offset = Vec2::new(
            amount * nx * tuning.screen_shake_max_amount_x / 2.0,
            amount * ny * tuning.screen_shake_max_amount_y / 2.0,
        );
    }

    /// Noise in [-1, 1]
    fn sample(&self, p: bevy_math::Vec3) -> f32 {
        self.noise.sample_for::<f32>(p).clamp(-1.0, 1.0)
    }
}
