//! Linear Volume Ramps
//!
//! Step math shared by every fade. A ramp is split into fixed-size time steps;
//! each step writes one volume value and the last step lands exactly on the
//! target, so floating point drift never leaves a channel slightly off.

use std::time::Duration;

/// Default interval between volume writes
pub const DEFAULT_FADE_STEP: Duration = Duration::from_millis(50);

/// A linear ramp between two volumes over a whole number of steps
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeRamp {
    from: f32,
    to: f32,
    steps: u32,
}

impl VolumeRamp {
    /// Build a ramp covering `duration` in increments of `step`
    ///
    /// The step count is `ceil(duration / step)`, never less than one, so a
    /// zero duration still produces a single write of the target volume.
    pub fn new(from: f32, to: f32, duration: Duration, step: Duration) -> Self {
        let step_ms = step.as_millis().max(1);
        let steps = duration.as_millis().div_ceil(step_ms).max(1);
        Self {
            from: from.clamp(0.0, 1.0),
            to: to.clamp(0.0, 1.0),
            steps: u32::try_from(steps).unwrap_or(u32::MAX),
        }
    }

    pub fn from(&self) -> f32 {
        self.from
    }

    pub fn to(&self) -> f32 {
        self.to
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Volume after `step` increments (1-based; `steps()` yields the target)
    #[inline]
    pub fn value_at(&self, step: u32) -> f32 {
        if step >= self.steps {
            return self.to;
        }
        let t = step as f32 / self.steps as f32;
        self.from + (self.to - self.from) * t
    }

    /// Iterate over every volume the ramp writes, in order
    pub fn values(&self) -> impl Iterator<Item = f32> + '_ {
        (1..=self.steps).map(move |step| self.value_at(step))
    }
}
