//! Decelerating tick cadence.

use std::time::Duration;

use super::SpinTiming;

/// Delay schedule for the cursor: fast at first, slowing cubically.
///
/// The delay after tick `t` is `base * (1 + (t / total)^3 * deceleration)`.
/// `total` is chosen so the whole schedule spans roughly the spin duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickCurve {
    base_delay: Duration,
    deceleration: f64,
    total_ticks: u32,
}

impl TickCurve {
    /// Derive a curve that fills `duration`.
    pub fn for_duration(duration: Duration, timing: &SpinTiming) -> Self {
        let base = timing.base_delay.as_secs_f64();
        let deceleration = timing.deceleration.max(0.0);
        // The mean of (t/N)^3 over a full schedule is 1/4.
        let mean_delay = base * (1.0 + deceleration / 4.0);
        let total = if mean_delay > 0.0 {
            (duration.as_secs_f64() / mean_delay).floor()
        } else {
            1.0
        };
        Self {
            base_delay: timing.base_delay,
            deceleration,
            total_ticks: total.clamp(1.0, f64::from(u32::MAX)) as u32,
        }
    }

    /// Number of cursor advances the schedule is built for.
    pub fn total_ticks(&self) -> u32 {
        self.total_ticks
    }

    /// Delay to wait after tick `tick` before the next one.
    pub fn delay_after(&self, tick: u32) -> Duration {
        let progress = f64::from(tick.min(self.total_ticks)) / f64::from(self.total_ticks);
        self.base_delay
            .mul_f64(1.0 + progress.powi(3) * self.deceleration)
    }

    /// Sum of every delay in the schedule.
    pub fn span(&self) -> Duration {
        (0..self.total_ticks).map(|t| self.delay_after(t)).sum()
    }
}
