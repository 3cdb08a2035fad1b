//! Configuration for an application session.

use std::time::Duration;

use sr_core::spin::SpinTiming;

/// Configuration for a session.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// RNG seed for reproducible spins. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Spin animation cadence.
    pub timing: SpinTiming,
}

impl SessionConfig {
    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the progress publishing interval.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.timing = self.timing.with_progress_interval(interval);
        self
    }

    /// Set the base delay between cursor ticks.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.timing = self.timing.with_base_delay(delay);
        self
    }

    /// Set how strongly the cursor slows down towards the end.
    pub fn with_deceleration(mut self, deceleration: f64) -> Self {
        self.timing = self.timing.with_deceleration(deceleration);
        self
    }
}
