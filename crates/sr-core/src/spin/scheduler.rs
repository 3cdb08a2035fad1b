//! Spin state machine.

use std::time::{Duration, Instant};

use rand::Rng;

use super::curve::TickCurve;
use super::{Resolution, SpinEvent, SpinRequest, SpinState, SpinTiming};
use crate::dice::DiceFace;
use crate::error::CoreResult;
use crate::pity::Scope;
use crate::selection::{Selection, SelectionMethod, select_winner};

/// What a freshly started spin looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct SpinStart {
    /// Rolled face.
    pub face: DiceFace,
    /// Spin duration.
    pub duration: Duration,
    /// Starting cursor position.
    pub cursor: usize,
    /// Number of ticks the cursor schedule is built for.
    pub total_ticks: u32,
}

#[derive(Debug)]
struct RunningSpin {
    options: Vec<String>,
    scope: Scope,
    face: DiceFace,
    duration: Duration,
    winner: Selection,
    curve: TickCurve,
    started_at: Instant,
    tick: u32,
    cursor: usize,
    next_tick_at: Instant,
    next_progress_at: Instant,
}

impl RunningSpin {
    fn resolve(self, index: usize, method: SelectionMethod) -> Resolution {
        Resolution {
            index,
            decision: self.options[index].clone(),
            method,
            face: self.face,
            options: self.options,
            scope: self.scope,
        }
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    Running(Box<RunningSpin>),
    Completed,
    Stopped,
}

/// Drives one spin at a time.
///
/// Both the progress estimate and the cursor ticks are advanced from
/// [`Spinner::poll`]; every entry point checks the running phase first, so
/// once a spin has settled, stopped or been cancelled no further events are
/// produced for it.
#[derive(Debug)]
pub struct Spinner {
    timing: SpinTiming,
    phase: Phase,
    progress: f64,
    cursor: Option<usize>,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new(SpinTiming::default())
    }
}

impl Spinner {
    /// Create an idle spinner.
    pub fn new(timing: SpinTiming) -> Self {
        Self {
            timing,
            phase: Phase::Idle,
            progress: 0.0,
            cursor: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> SpinState {
        match self.phase {
            Phase::Idle => SpinState::Idle,
            Phase::Running(_) => SpinState::Running,
            Phase::Completed => SpinState::Completed,
            Phase::Stopped => SpinState::Stopped,
        }
    }

    /// Whether a spin is animating.
    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    /// Latest progress estimate, 0-100.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Cursor position of the running spin, or where the last one settled.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Timing settings.
    pub fn timing(&self) -> &SpinTiming {
        &self.timing
    }

    /// Begin a spin.
    ///
    /// Returns `Ok(None)` without doing anything when a spin is already
    /// running or there are no options. Otherwise the face is rolled and the
    /// winner chosen before the first tick.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        request: SpinRequest<'_>,
        now: Instant,
        rng: &mut R,
    ) -> CoreResult<Option<SpinStart>> {
        if self.is_running() || request.options.is_empty() {
            return Ok(None);
        }

        let face = *request.dice.pick_face(rng)?;
        let Some(winner) =
            select_winner(request.options, request.pity_counts, request.pity, rng)
        else {
            return Ok(None);
        };

        let duration = face.duration();
        let curve = TickCurve::for_duration(duration, &self.timing);
        let cursor = rng.random_range(0..request.options.len());

        let spin = RunningSpin {
            options: request.options.to_vec(),
            scope: request.scope.clone(),
            face,
            duration,
            winner,
            curve,
            started_at: now,
            tick: 0,
            cursor,
            next_tick_at: now + curve.delay_after(0),
            next_progress_at: now + self.timing.progress_interval,
        };

        self.phase = Phase::Running(Box::new(spin));
        self.progress = 0.0;
        self.cursor = Some(cursor);

        Ok(Some(SpinStart {
            face,
            duration,
            cursor,
            total_ticks: curve.total_ticks(),
        }))
    }

    /// When the driver should call [`Spinner::poll`] next, if a spin is running.
    pub fn next_wake(&self) -> Option<Instant> {
        let Phase::Running(spin) = &self.phase else {
            return None;
        };
        let end = spin.started_at + spin.duration;
        Some(spin.next_tick_at.min(spin.next_progress_at).min(end))
    }

    /// Advance both processes to `now` and report what changed.
    ///
    /// When the cursor schedule runs out or the duration has elapsed, the
    /// cursor is forced onto the winner chosen at start, the spin completes,
    /// and a [`SpinEvent::Settled`] is the last event returned.
    pub fn poll(&mut self, now: Instant) -> Vec<SpinEvent> {
        let Phase::Running(spin) = &mut self.phase else {
            return Vec::new();
        };
        let mut events = Vec::new();
        let elapsed = now.saturating_duration_since(spin.started_at);

        if elapsed < spin.duration && now >= spin.next_progress_at {
            let percent = percent_of(elapsed, spin.duration);
            self.progress = percent;
            events.push(SpinEvent::Progress(percent));
            while spin.next_progress_at <= now {
                spin.next_progress_at += self.timing.progress_interval;
            }
        }

        let mut finished = elapsed >= spin.duration;
        while !finished && now >= spin.next_tick_at {
            spin.tick += 1;
            if spin.tick > spin.curve.total_ticks() {
                finished = true;
                break;
            }
            spin.cursor = (spin.cursor + 1) % spin.options.len();
            self.cursor = Some(spin.cursor);
            events.push(SpinEvent::Cursor {
                index: spin.cursor,
                text: spin.options[spin.cursor].clone(),
            });
            spin.next_tick_at += spin.curve.delay_after(spin.tick);
        }

        if finished {
            events.extend(self.complete());
        }
        events
    }

    /// Stop the running spin where the cursor stands.
    ///
    /// The outcome is the option under the cursor with method
    /// `manual-stop`, not the winner chosen at start. Progress resets to 0.
    /// Returns `None` when nothing is running.
    pub fn stop(&mut self) -> Option<Resolution> {
        if !self.is_running() {
            return None;
        }
        let Phase::Running(spin) = std::mem::replace(&mut self.phase, Phase::Stopped) else {
            return None;
        };
        self.progress = 0.0;
        let index = spin.cursor;
        self.cursor = Some(index);
        Some(spin.resolve(index, SelectionMethod::ManualStop))
    }

    /// Abandon the running spin without an outcome. Returns whether a spin
    /// was running.
    pub fn cancel(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.phase = Phase::Idle;
        self.progress = 0.0;
        self.cursor = None;
        true
    }

    fn complete(&mut self) -> Vec<SpinEvent> {
        let Phase::Running(spin) = std::mem::replace(&mut self.phase, Phase::Completed) else {
            return Vec::new();
        };
        let winner = spin.winner;
        self.progress = 100.0;
        self.cursor = Some(winner.index);
        let text = spin.options[winner.index].clone();
        vec![
            SpinEvent::Cursor {
                index: winner.index,
                text,
            },
            SpinEvent::Progress(100.0),
            SpinEvent::Settled(spin.resolve(winner.index, winner.method)),
        ]
    }
}

fn percent_of(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 100.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64() * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::dice::{DiceFace, DiceTable};
    use crate::pity::PityConfig;

    struct Fixture {
        options: Vec<String>,
        dice: DiceTable,
        counts: BTreeMap<String, u32>,
        pity: PityConfig,
        scope: Scope,
    }

    impl Fixture {
        fn new(options: &[&str]) -> Self {
            Self {
                options: options.iter().map(|s| s.to_string()).collect(),
                dice: DiceTable::new(vec![DiceFace::new(1, 2.0), DiceFace::new(2, 2.0)])
                    .unwrap(),
                counts: BTreeMap::new(),
                pity: PityConfig::default(),
                scope: Scope::Global,
            }
        }

        fn request(&self) -> SpinRequest<'_> {
            SpinRequest {
                options: &self.options,
                dice: &self.dice,
                pity_counts: &self.counts,
                pity: &self.pity,
                scope: &self.scope,
            }
        }
    }

    /// Poll at every wake-up until the spin settles.
    fn run_to_end(spinner: &mut Spinner) -> (Vec<SpinEvent>, Instant) {
        let mut all = Vec::new();
        let mut last = Instant::now();
        while let Some(wake) = spinner.next_wake() {
            last = wake;
            all.extend(spinner.poll(wake));
        }
        (all, last)
    }

    #[test]
    fn starts_idle() {
        let spinner = Spinner::default();
        assert_eq!(spinner.state(), SpinState::Idle);
        assert_eq!(spinner.progress(), 0.0);
        assert!(spinner.next_wake().is_none());
    }

    #[test]
    fn start_with_no_options_is_ignored() {
        let fx = Fixture::new(&[]);
        let mut spinner = Spinner::default();
        let mut rng = StdRng::seed_from_u64(1);
        let started = spinner.start(fx.request(), Instant::now(), &mut rng).unwrap();
        assert!(started.is_none());
        assert_eq!(spinner.state(), SpinState::Idle);
    }

    #[test]
    fn start_while_running_is_ignored() {
        let fx = Fixture::new(&["A", "B"]);
        let mut spinner = Spinner::default();
        let mut rng = StdRng::seed_from_u64(1);
        let t0 = Instant::now();
        assert!(spinner.start(fx.request(), t0, &mut rng).unwrap().is_some());
        assert!(spinner.start(fx.request(), t0, &mut rng).unwrap().is_none());
        assert_eq!(spinner.state(), SpinState::Running);
    }

    #[test]
    fn natural_completion_settles_on_winner_once() {
        let mut fx = Fixture::new(&["A", "B", "C"]);
        fx.pity = PityConfig::default().with_hard_threshold(2);
        fx.counts.insert("C".to_string(), 2);
        let mut spinner = Spinner::default();
        let mut rng = StdRng::seed_from_u64(3);
        let t0 = Instant::now();
        let start = spinner.start(fx.request(), t0, &mut rng).unwrap().unwrap();
        assert_eq!(start.duration, Duration::from_secs(2));

        let (events, last) = run_to_end(&mut spinner);
        let settled: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SpinEvent::Settled(r) => Some(r),
                _ => None,
            })
            .collect();
        assert_eq!(settled.len(), 1);
        assert_eq!(settled[0].index, 2);
        assert_eq!(settled[0].decision, "C");
        assert_eq!(settled[0].method, SelectionMethod::HardPity);
        assert_eq!(spinner.state(), SpinState::Completed);
        assert_eq!(spinner.progress(), 100.0);
        assert_eq!(spinner.cursor(), Some(2));
        assert!(last <= t0 + start.duration);

        // Late timers have no effect.
        assert!(spinner.poll(last + Duration::from_secs(5)).is_empty());
        assert!(spinner.stop().is_none());
    }

    #[test]
    fn progress_climbs_and_stays_in_range() {
        let fx = Fixture::new(&["A", "B"]);
        let mut spinner = Spinner::default();
        let mut rng = StdRng::seed_from_u64(8);
        spinner.start(fx.request(), Instant::now(), &mut rng).unwrap();
        let (events, _) = run_to_end(&mut spinner);
        let progress: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                SpinEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert!(progress.len() > 10);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert!(progress.iter().all(|p| (0.0..=100.0).contains(p)));
        assert_eq!(progress.last().copied(), Some(100.0));
    }

    #[test]
    fn cursor_advances_one_step_and_wraps() {
        let fx = Fixture::new(&["A", "B", "C"]);
        let mut spinner = Spinner::default();
        let mut rng = StdRng::seed_from_u64(11);
        let start = spinner
            .start(fx.request(), Instant::now(), &mut rng)
            .unwrap()
            .unwrap();
        let mut previous = start.cursor;
        let mut ticks = 0;
        while let Some(wake) = spinner.next_wake() {
            for event in spinner.poll(wake) {
                if let SpinEvent::Cursor { index, text } = event {
                    if spinner.is_running() {
                        assert_eq!(index, (previous + 1) % 3);
                        ticks += 1;
                    }
                    assert_eq!(text, fx.options[index]);
                    previous = index;
                }
            }
        }
        assert!(ticks > 5);
    }

    #[test]
    fn stop_resolves_at_cursor_not_winner() {
        let mut fx = Fixture::new(&["A", "B", "C", "D"]);
        fx.pity = PityConfig::default().with_hard_threshold(1);
        fx.counts.insert("D".to_string(), 1);
        let mut spinner = Spinner::default();
        let mut rng = StdRng::seed_from_u64(21);
        let t0 = Instant::now();
        spinner.start(fx.request(), t0, &mut rng).unwrap();

        // Advance until the cursor rests somewhere other than the winner.
        while spinner.cursor() == Some(3) {
            let wake = spinner.next_wake().unwrap();
            spinner.poll(wake);
        }
        let cursor = spinner.cursor().unwrap();
        let resolution = spinner.stop().unwrap();
        assert_eq!(resolution.index, cursor);
        assert_ne!(resolution.index, 3);
        assert_eq!(resolution.method, SelectionMethod::ManualStop);
        assert_eq!(resolution.decision, fx.options[cursor]);
        assert_eq!(spinner.state(), SpinState::Stopped);
        assert_eq!(spinner.progress(), 0.0);

        // Nothing fires after a stop, and a second stop is a no-op.
        assert!(spinner.poll(t0 + Duration::from_secs(10)).is_empty());
        assert!(spinner.stop().is_none());
        assert!(spinner.next_wake().is_none());
    }

    #[test]
    fn cancel_produces_no_outcome() {
        let fx = Fixture::new(&["A", "B"]);
        let mut spinner = Spinner::default();
        let mut rng = StdRng::seed_from_u64(2);
        let t0 = Instant::now();
        spinner.start(fx.request(), t0, &mut rng).unwrap();
        assert!(spinner.cancel());
        assert_eq!(spinner.state(), SpinState::Idle);
        assert!(spinner.poll(t0 + Duration::from_secs(10)).is_empty());
        assert!(!spinner.cancel());
    }

    #[test]
    fn can_spin_again_after_settling() {
        let fx = Fixture::new(&["A", "B"]);
        let mut spinner = Spinner::default();
        let mut rng = StdRng::seed_from_u64(4);
        spinner.start(fx.request(), Instant::now(), &mut rng).unwrap();
        spinner.stop();
        assert!(
            spinner
                .start(fx.request(), Instant::now(), &mut rng)
                .unwrap()
                .is_some()
        );
        run_to_end(&mut spinner);
        assert_eq!(spinner.state(), SpinState::Completed);
        assert!(
            spinner
                .start(fx.request(), Instant::now(), &mut rng)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn late_poll_settles_immediately() {
        let fx = Fixture::new(&["A", "B"]);
        let mut spinner = Spinner::default();
        let mut rng = StdRng::seed_from_u64(6);
        let t0 = Instant::now();
        spinner.start(fx.request(), t0, &mut rng).unwrap();
        let events = spinner.poll(t0 + Duration::from_secs(30));
        assert!(matches!(events.last(), Some(SpinEvent::Settled(_))));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, SpinEvent::Progress(p) if *p < 100.0))
        );
    }
}
