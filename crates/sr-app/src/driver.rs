//! Real-time spin driver.
//!
//! Sleeps until the spinner's next wake time, polls it, and hands every
//! event to an observer, until the spin settles or the stop future
//! resolves first.

use std::future::Future;

use tokio::time::{self, Instant};
use tracing::debug;

use sr_core::{Resolution, SpinEvent, SpinStart};

use crate::error::AppResult;
use crate::session::Session;

/// Receives spin updates as they happen.
pub trait SpinObserver {
    /// The spin has started.
    fn started(&mut self, _start: &SpinStart) {}

    /// Something changed on screen.
    fn event(&mut self, _event: &SpinEvent) {}
}

impl SpinObserver for () {}

/// How a driven spin ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SpinOutcome {
    /// Nothing to spin, or a spin was already running.
    NotStarted,
    /// The spin ran to its end.
    Completed(Resolution),
    /// The stop future fired first.
    Stopped(Resolution),
}

/// Start a spin on `session` and drive it in real time.
///
/// `stop` is raced against every wait; when it resolves the spin stops on
/// the option under the cursor. Either way the outcome is recorded by the
/// session before this returns.
pub async fn drive_spin<F, O>(
    session: &mut Session,
    stop: F,
    observer: &mut O,
) -> AppResult<SpinOutcome>
where
    F: Future<Output = ()>,
    O: SpinObserver + ?Sized,
{
    let Some(start) = session.start_spin(Instant::now().into_std())? else {
        return Ok(SpinOutcome::NotStarted);
    };
    observer.started(&start);
    tokio::pin!(stop);

    while let Some(wake) = session.next_wake() {
        tokio::select! {
            biased;
            () = &mut stop => {
                debug!("stop requested");
                return Ok(match session.stop_spin() {
                    Some(resolution) => SpinOutcome::Stopped(resolution),
                    None => SpinOutcome::NotStarted,
                });
            }
            () = time::sleep_until(Instant::from_std(wake)) => {}
        }

        for event in session.poll_spin(Instant::now().into_std()) {
            observer.event(&event);
            if let SpinEvent::Settled(resolution) = event {
                return Ok(SpinOutcome::Completed(resolution));
            }
        }
    }

    Ok(SpinOutcome::NotStarted)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use sr_core::{DiceFaceDraft, SelectionMethod, SpinState};

    use super::*;
    use crate::config::SessionConfig;
    use crate::store::MemoryStore;

    #[derive(Default)]
    struct Recorder {
        started: Option<SpinStart>,
        events: Vec<SpinEvent>,
    }

    impl SpinObserver for Recorder {
        fn started(&mut self, start: &SpinStart) {
            self.started = Some(start.clone());
        }

        fn event(&mut self, event: &SpinEvent) {
            self.events.push(event.clone());
        }
    }

    fn one_second_session(items: &[&str]) -> Session {
        let mut s = Session::open(
            Box::new(MemoryStore::new()),
            SessionConfig::default().with_seed(3),
        );
        for item in items {
            s.add_decision(item).unwrap();
        }
        s.save_dice_table(&[DiceFaceDraft::new("1", "1"), DiceFaceDraft::new("2", "1")])
            .unwrap();
        s
    }

    #[tokio::test(start_paused = true)]
    async fn runs_to_completion() {
        let mut s = one_second_session(&["A", "B", "C"]);
        let mut recorder = Recorder::default();
        let began = Instant::now();

        let outcome = drive_spin(&mut s, std::future::pending(), &mut recorder)
            .await
            .unwrap();

        let SpinOutcome::Completed(resolution) = outcome else {
            panic!("expected completion, got {outcome:?}");
        };
        assert!(began.elapsed() < Duration::from_millis(1100));
        assert!(recorder.started.is_some());
        assert!(
            recorder
                .events
                .iter()
                .any(|e| matches!(e, SpinEvent::Cursor { .. }))
        );
        assert!(matches!(
            recorder.events.last(),
            Some(SpinEvent::Settled(_))
        ));
        assert_ne!(resolution.method, SelectionMethod::ManualStop);
        assert_eq!(s.spinner().state(), SpinState::Completed);
        assert_eq!(s.history().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_future_stops_on_cursor() {
        let mut s = one_second_session(&["A", "B", "C"]);
        let mut recorder = Recorder::default();

        let outcome = drive_spin(
            &mut s,
            time::sleep(Duration::from_millis(300)),
            &mut recorder,
        )
        .await
        .unwrap();

        let SpinOutcome::Stopped(resolution) = outcome else {
            panic!("expected stop, got {outcome:?}");
        };
        assert_eq!(resolution.method, SelectionMethod::ManualStop);
        assert_eq!(Some(resolution.index), s.spinner().cursor());
        assert_eq!(s.spinner().state(), SpinState::Stopped);
        assert_eq!(s.spinner().progress(), 0.0);
        assert_eq!(s.history().len(), 1);
        assert!(
            !recorder
                .events
                .iter()
                .any(|e| matches!(e, SpinEvent::Settled(_)))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn empty_list_does_not_start() {
        let mut s = one_second_session(&[]);
        let outcome = drive_spin(&mut s, std::future::pending(), &mut ())
            .await
            .unwrap();
        assert_eq!(outcome, SpinOutcome::NotStarted);
        assert!(s.history().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn progress_is_published_while_running() {
        let mut s = one_second_session(&["A", "B"]);
        let mut recorder = Recorder::default();
        drive_spin(&mut s, std::future::pending(), &mut recorder)
            .await
            .unwrap();

        let progress: Vec<f64> = recorder
            .events
            .iter()
            .filter_map(|e| match e {
                SpinEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert!(progress.len() > 2);
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(progress.last(), Some(&100.0));
    }
}
