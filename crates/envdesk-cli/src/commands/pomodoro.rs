//! Pomodoro command implementation.
//!
//! Runs the timer in the foreground with a countdown bar. The timer is ticked
//! once per second by a tokio interval; phase changes ring the terminal bell.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use envdesk_core::{Pomodoro, PomodoroEvent, PomodoroSettings, PomodoroStatus};
use indicatif::ProgressBar;
use tokio::time::{MissedTickBehavior, interval};

use crate::cli::PomodoroArgs;
use crate::style;

/// Merge command-line duration overrides into the configured settings.
pub fn apply_overrides(mut settings: PomodoroSettings, args: &PomodoroArgs) -> PomodoroSettings {
    if let Some(work) = args.work {
        settings.work_duration = work;
    }
    if let Some(short_break) = args.short_break {
        settings.break_duration = short_break;
    }
    if let Some(long_break) = args.long_break {
        settings.long_break_duration = long_break;
    }
    if let Some(sessions) = args.sessions {
        settings.sessions_before_long_break = sessions;
    }
    settings
}

/// Whether a completed phase reaches the requested number of work sessions.
fn cycles_done(event: &PomodoroEvent, cycles: u32) -> bool {
    match event {
        PomodoroEvent::PhaseCompleted {
            from: PomodoroStatus::Work,
            session_count,
            ..
        } => cycles > 0 && *session_count >= cycles,
        _ => false,
    }
}

fn phase_bar(timer: &Pomodoro, no_color: bool) -> ProgressBar {
    let total = timer.settings().seconds_for(timer.status());
    let bar = style::countdown_bar(total, no_color);
    bar.set_prefix(format!(
        "{} #{}",
        style::format_phase(timer.status(), no_color),
        timer.display_session()
    ));
    bar.set_message(timer.format_time_left());
    bar
}

fn ring_bell() {
    let mut stderr = std::io::stderr();
    let _ = stderr.write_all(b"\x07");
    let _ = stderr.flush();
}

pub async fn cmd_pomodoro(
    settings: PomodoroSettings,
    cycles: u32,
    quiet: bool,
    no_color: bool,
) -> Result<()> {
    let mut timer = Pomodoro::new(settings);
    timer.start();

    if !quiet {
        eprintln!(
            "Pomodoro: {}m work, {}m break, {}m long break every {} sessions",
            settings.work_duration,
            settings.break_duration,
            settings.long_break_duration,
            settings.sessions_before_long_break
        );
        eprintln!("Press Ctrl+C to stop");
    }

    let mut bar = phase_bar(&timer, no_color);
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                bar.abandon_with_message("stopped");
                timer.stop();
                eprintln!("\nCompleted {} work sessions.", timer.state().session_count);
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        let Some(event) = timer.tick() else {
            bar.set_position(u64::from(
                timer
                    .settings()
                    .seconds_for(timer.status())
                    .saturating_sub(timer.state().seconds_remaining),
            ));
            bar.set_message(timer.format_time_left());
            continue;
        };

        bar.finish_and_clear();
        ring_bell();

        if let PomodoroEvent::PhaseCompleted { from, to, .. } = event
            && !quiet
        {
            let message = format!("{} complete, {} next", from.title(), to.title());
            eprintln!("{}", style::format_success(&message, no_color));
        }

        if cycles_done(&event, cycles) {
            timer.stop();
            eprintln!("Completed {} work sessions.", cycles);
            return Ok(());
        }

        bar = phase_bar(&timer, no_color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(work: Option<u32>, short_break: Option<u32>) -> PomodoroArgs {
        PomodoroArgs {
            work,
            short_break,
            long_break: None,
            sessions: None,
        }
    }

    #[test]
    fn test_apply_overrides() {
        let settings = apply_overrides(PomodoroSettings::default(), &args(Some(50), Some(10)));
        assert_eq!(settings.work_duration, 50);
        assert_eq!(settings.break_duration, 10);
        assert_eq!(settings.long_break_duration, 15);
        assert_eq!(settings.sessions_before_long_break, 4);
    }

    #[test]
    fn test_no_overrides_keeps_settings() {
        let settings = apply_overrides(PomodoroSettings::default(), &args(None, None));
        assert_eq!(settings, PomodoroSettings::default());
    }

    #[test]
    fn test_cycles_done() {
        let after_work = PomodoroEvent::PhaseCompleted {
            from: PomodoroStatus::Work,
            to: PomodoroStatus::Break,
            session_count: 2,
        };
        assert!(cycles_done(&after_work, 2));
        assert!(!cycles_done(&after_work, 3));
        assert!(!cycles_done(&after_work, 0));

        let after_break = PomodoroEvent::PhaseCompleted {
            from: PomodoroStatus::Break,
            to: PomodoroStatus::Work,
            session_count: 2,
        };
        assert!(!cycles_done(&after_break, 2));
        assert!(!cycles_done(&PomodoroEvent::Paused, 1));
    }
}
