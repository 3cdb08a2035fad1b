use std::io::{self, Write};
use std::time::Duration;

use colored::Colorize;

use sr_app::{SpinObserver, SpinOutcome, drive_spin};
use sr_core::{SpinEvent, SpinStart};

use super::Context;

/// Redraws one status line as the cursor moves.
struct LineDisplay {
    quiet: bool,
    progress: f64,
    text: String,
    width: usize,
}

impl LineDisplay {
    fn redraw(&mut self) {
        let line = format!("  [{:>3.0}%] {}", self.progress, self.text);
        let pad = self.width.saturating_sub(line.chars().count());
        self.width = self.width.max(line.chars().count());
        let mut out = io::stdout().lock();
        // A closed stdout only loses the animation.
        let _ = write!(out, "\r{line}{}", " ".repeat(pad));
        let _ = out.flush();
    }
}

impl SpinObserver for LineDisplay {
    fn started(&mut self, start: &SpinStart) {
        println!(
            "  {} rolled {} {}",
            "Dice".bold(),
            start.face.face,
            format!("({}s)", start.face.duration_secs).dimmed()
        );
    }

    fn event(&mut self, event: &SpinEvent) {
        if self.quiet {
            return;
        }
        match event {
            SpinEvent::Progress(percent) => self.progress = *percent,
            SpinEvent::Cursor { text, .. } => self.text.clone_from(text),
            SpinEvent::Settled(_) => return,
        }
        self.redraw();
    }
}

pub fn run(ctx: &Context, stop_after: Option<u64>, quiet: bool) -> Result<(), String> {
    let mut session = ctx.open_session();
    if session.decisions().is_empty() {
        println!("  No decisions to spin. Add some with `spinnrad add`.");
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;

    let mut display = LineDisplay {
        quiet,
        progress: 0.0,
        text: String::new(),
        width: 0,
    };
    let stop = async move {
        let interrupted = async {
            if tokio::signal::ctrl_c().await.is_err() {
                // No signal support: only the timer can stop the spin.
                std::future::pending::<()>().await;
            }
        };
        match stop_after {
            Some(ms) => {
                tokio::select! {
                    () = interrupted => {}
                    () = tokio::time::sleep(Duration::from_millis(ms)) => {}
                }
            }
            None => interrupted.await,
        }
    };

    let outcome = runtime
        .block_on(drive_spin(&mut session, stop, &mut display))
        .map_err(|e| e.to_string())?;

    if !quiet {
        println!();
    }
    match outcome {
        SpinOutcome::Completed(resolution) => {
            println!(
                "  {} {} {}",
                "Result:".bold(),
                resolution.decision.green().bold(),
                format!("({})", resolution.method).dimmed()
            );
        }
        SpinOutcome::Stopped(resolution) => {
            println!(
                "  {} {} {}",
                "Stopped on:".bold(),
                resolution.decision.yellow().bold(),
                format!("({})", resolution.method).dimmed()
            );
        }
        SpinOutcome::NotStarted => println!("  Nothing to spin."),
    }
    Ok(())
}
