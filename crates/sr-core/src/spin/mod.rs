//! The spin scheduler.
//!
//! A spin rolls the dice table for its duration, fixes the winner up front,
//! then animates a cursor across the options on a decelerating schedule while
//! a progress estimate climbs to 100. The state machine here is time-source
//! agnostic: a driver calls [`Spinner::poll`] with the current instant and
//! sleeps until [`Spinner::next_wake`].

pub mod curve;
pub mod scheduler;

pub use curve::TickCurve;
pub use scheduler::{SpinStart, Spinner};

use std::collections::BTreeMap;
use std::time::Duration;

use crate::dice::{DiceFace, DiceTable};
use crate::pity::{PityConfig, Scope};
use crate::selection::SelectionMethod;

/// Cadence settings for the spin animation.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinTiming {
    /// How often the progress estimate is published.
    pub progress_interval: Duration,
    /// Delay between the first cursor ticks.
    pub base_delay: Duration,
    /// How much slower the final ticks are than the first, minus one.
    pub deceleration: f64,
}

impl Default for SpinTiming {
    fn default() -> Self {
        Self {
            progress_interval: Duration::from_millis(40),
            base_delay: Duration::from_millis(50),
            deceleration: 6.0,
        }
    }
}

impl SpinTiming {
    /// Smallest interval the scheduler will use for either process.
    pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

    /// Set the progress interval.
    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval.max(Self::MIN_INTERVAL);
        self
    }

    /// Set the base tick delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay.max(Self::MIN_INTERVAL);
        self
    }

    /// Set the deceleration factor (negative values are treated as 0).
    pub fn with_deceleration(mut self, deceleration: f64) -> Self {
        self.deceleration = deceleration.max(0.0);
        self
    }
}

/// Observable state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinState {
    /// No spin has started, or the last one was cancelled.
    Idle,
    /// A spin is animating.
    Running,
    /// The last spin ran to its end.
    Completed,
    /// The last spin was stopped early.
    Stopped,
}

/// Everything a spin needs at start time.
#[derive(Debug, Clone, Copy)]
pub struct SpinRequest<'a> {
    /// Options to choose from; snapshotted at start.
    pub options: &'a [String],
    /// Table to roll the duration from.
    pub dice: &'a DiceTable,
    /// Miss counters of the active scope.
    pub pity_counts: &'a BTreeMap<String, u32>,
    /// Pity settings.
    pub pity: &'a PityConfig,
    /// Scope the outcome will be recorded under.
    pub scope: &'a Scope,
}

/// The settled outcome of one spin. Produced exactly once per spin.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Index into `options` the spin settled on.
    pub index: usize,
    /// Text of the settled option.
    pub decision: String,
    /// How the outcome was reached.
    pub method: SelectionMethod,
    /// Face rolled at start.
    pub face: DiceFace,
    /// Options as they were when the spin started.
    pub options: Vec<String>,
    /// Scope the spin was started under.
    pub scope: Scope,
}

/// Something a display should react to.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinEvent {
    /// New progress estimate, 0-100.
    Progress(f64),
    /// The cursor moved.
    Cursor {
        /// Option index under the cursor.
        index: usize,
        /// Text of that option.
        text: String,
    },
    /// The spin ran to its end.
    Settled(Resolution),
}
