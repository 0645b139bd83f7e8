//! Multi-frame sequences: the reset transition and the save-light ramp
//!
//! Both are plain state advanced once per rendered frame with that frame's
//! delta time. Nothing is scheduled behind the caller's back.

use crate::SimError;
use crate::consts::{TRANSITION_FULL, TRANSITION_HALF};
use crate::smoothstep;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    /// Progress 0 -> 0.5
    TransitionIn { elapsed: f32 },
    /// Progress 0.5 -> 1
    TransitionOut { elapsed: f32 },
    /// Progress held at 1 for one frame before the visual is removed
    Finishing,
}

/// What the caller must do after advancing a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStep {
    None,
    /// Screen is fully covered: reset the world now
    PerformReset,
    /// Visual removed, back to idle
    Finished,
}

/// Screen transition around a world reset
///
/// Once started it always runs to completion; a second start while running
/// is rejected.
#[derive(Debug, Clone)]
pub struct ResetSequence {
    phase: Phase,
    first_half: f32,
    second_half: f32,
    progress: f32,
}

impl Default for ResetSequence {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            first_half: 0.0,
            second_half: 0.0,
            progress: 0.0,
        }
    }
}

impl ResetSequence {
    pub fn is_resetting(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Transition visual progress in [0, 1]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Whether the full-screen transition visual is shown
    pub fn visual_enabled(&self) -> bool {
        self.is_resetting()
    }

    pub fn start(&mut self, first_half: f32, second_half: f32) -> Result<(), SimError> {
        if self.is_resetting() {
            return Err(SimError::ResetInProgress);
        }
        self.first_half = first_half.max(0.0);
        self.second_half = second_half.max(0.0);
        self.progress = 0.0;
        self.phase = Phase::TransitionIn { elapsed: 0.0 };
        Ok(())
    }

    pub fn advance(&mut self, dt: f32) -> ResetStep {
        match self.phase {
            Phase::Idle => ResetStep::None,
            Phase::TransitionIn { elapsed } if elapsed < self.first_half => {
                let elapsed = elapsed + dt;
                self.progress = smoothstep(0.0, TRANSITION_HALF, elapsed / self.first_half)
                    .min(TRANSITION_HALF);
                self.phase = Phase::TransitionIn { elapsed };
                ResetStep::None
            }
            Phase::TransitionIn { .. } => {
                self.progress = TRANSITION_HALF;
                self.step_out(0.0, dt);
                ResetStep::PerformReset
            }
            Phase::TransitionOut { elapsed } => {
                self.step_out(elapsed, dt);
                ResetStep::None
            }
            Phase::Finishing => {
                self.phase = Phase::Idle;
                ResetStep::Finished
            }
        }
    }

    fn step_out(&mut self, elapsed: f32, dt: f32) {
        if elapsed >= self.second_half {
            self.progress = TRANSITION_FULL;
            self.phase = Phase::Finishing;
            return;
        }
        let elapsed = elapsed + dt;
        self.progress = smoothstep(TRANSITION_HALF, TRANSITION_FULL, elapsed / self.second_half)
            .min(TRANSITION_FULL);
        self.phase = Phase::TransitionOut { elapsed };
    }
}

/// Save-point light fading in after a spawn point is reached
#[derive(Debug, Clone, Default)]
pub struct LightRamp {
    elapsed: f32,
    duration: f32,
    max_intensity: f32,
    intensity: f32,
    running: bool,
}

impl LightRamp {
    pub fn start(&mut self, duration: f32, max_intensity: f32) {
        self.elapsed = 0.0;
        self.duration = duration.max(0.0);
        self.max_intensity = max_intensity;
        self.intensity = 0.0;
        self.running = true;
    }

    pub fn advance(&mut self, dt: f32) {
        if !self.running {
            return;
        }
        if self.elapsed >= self.duration {
            self.intensity = self.max_intensity;
            self.running = false;
            return;
        }
        self.elapsed += dt;
        self.intensity = (self.elapsed / self.duration).min(1.0) * self.max_intensity;
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.1;

    #[test]
    fn test_sequence_phases() {
        let mut reset = ResetSequence::default();
        reset.start(0.3, 0.2).unwrap();
        assert!(reset.visual_enabled());

        let mut steps = Vec::new();
        let mut progress = vec![reset.progress()];
        for _ in 0..20 {
            let step = reset.advance(DT);
            progress.push(reset.progress());
            steps.push(step);
            if step == ResetStep::Finished {
                break;
            }
        }

        assert_eq!(steps.iter().filter(|s| **s == ResetStep::PerformReset).count(), 1);
        assert_eq!(steps.last(), Some(&ResetStep::Finished));
        assert!(!reset.is_resetting());

        // Monotonic and the reset happens with the screen half covered
        assert!(progress.windows(2).all(|w| w[1] >= w[0] - 1e-6));
        let perform = steps.iter().position(|s| *s == ResetStep::PerformReset).unwrap();
        assert!(progress[perform] >= TRANSITION_HALF - 1e-6);
        assert_eq!(*progress.last().unwrap(), TRANSITION_FULL);
    }

    #[test]
    fn test_second_start_is_rejected() {
        let mut reset = ResetSequence::default();
        reset.start(0.5, 0.5).unwrap();
        reset.advance(DT);
        let progress = reset.progress();
        assert!(matches!(reset.start(0.5, 0.5), Err(SimError::ResetInProgress)));
        assert!(reset.is_resetting());
        assert_eq!(reset.progress(), progress);
    }

    #[test]
    fn test_zero_lengths_still_perform_reset() {
        let mut reset = ResetSequence::default();
        reset.start(0.0, 0.0).unwrap();
        assert_eq!(reset.advance(DT), ResetStep::PerformReset);
        assert_eq!(reset.advance(DT), ResetStep::Finished);
        assert!(reset.start(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_light_ramp() {
        let mut light = LightRamp::default();
        light.start(0.7, 1.1);
        light.advance(0.35);
        assert!((light.intensity() - 0.55).abs() < 1e-5);
        for _ in 0..10 {
            light.advance(0.35);
        }
        assert!(!light.is_running());
        assert!((light.intensity() - 1.1).abs() < 1e-6);
    }
}
