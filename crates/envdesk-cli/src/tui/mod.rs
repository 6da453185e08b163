//! Main entry point for the TUI dashboard.
//!
//! Ties the components together and runs the event loop:
//!
//! - Terminal setup and restoration
//! - Channel creation for worker communication
//! - Input handling, rendering and the Pomodoro clock
//! - Graceful shutdown coordination

pub mod app;
pub mod input;
pub mod ui;
pub mod worker;

pub use app::App;
pub use worker::DashboardWorker;

use std::io::{self, Write, stdout};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use envdesk_core::{Command, Config, DashboardEvent, StoreClient, SuggestionEngine, TelemetrySource};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::info;

/// Set up the terminal for TUI rendering.
///
/// Enables raw mode, mouse capture, and switches to the alternate screen buffer.
pub fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to its original state.
pub fn restore_terminal() -> Result<()> {
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Run the dashboard until the user quits.
pub async fn run(
    config: Config,
    source: Arc<dyn TelemetrySource>,
    engine: SuggestionEngine,
    store: Option<StoreClient>,
) -> Result<()> {
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(32);
    let (event_tx, event_rx) = mpsc::channel::<DashboardEvent>(32);

    info!(
        model = engine.has_model(),
        store = store.is_some(),
        "Starting dashboard"
    );
    let worker = DashboardWorker::new(cmd_rx, event_tx, source, engine, store, &config);
    let worker_handle = tokio::spawn(worker.run());

    let mut app = App::new(event_rx, &config);
    let mut terminal = setup_terminal()?;

    let result = run_event_loop(&mut terminal, &mut app, &cmd_tx).await;

    let _ = cmd_tx.try_send(Command::Shutdown);
    restore_terminal()?;
    let _ = worker_handle.await;

    result
}

/// Main event loop for the TUI.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    command_tx: &mpsc::Sender<Command>,
) -> Result<()> {
    while !app.should_quit() {
        app.tick_spinner();
        app.clean_expired_messages();
        app.tick_pomodoro();

        if app.pending_bell {
            app.pending_bell = false;
            let mut out = stdout();
            out.write_all(b"\x07")?;
            out.flush()?;
        }

        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            let action = input::handle_key(key.code, app.show_help);
            if let Some(cmd) = input::apply_action(app, action) {
                let _ = command_tx.try_send(cmd);
            }
        }

        while let Ok(event) = app.event_rx.try_recv() {
            app.handle_dashboard_event(event);
        }

        // Yield so the worker task gets scheduled between frames.
        tokio::task::yield_now().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    #[test]
    fn test_terminal_functions_exist() {
        // Real terminal tests need a TTY.
        let _ = restore_terminal;
        let _ = setup_terminal;
    }

    #[test]
    fn test_input_handling_quit() {
        let action = input::handle_key(KeyCode::Char('q'), false);
        assert_eq!(action, input::Action::Quit);
    }

    #[test]
    fn test_input_handling_refresh() {
        let action = input::handle_key(KeyCode::Char('g'), false);
        assert_eq!(action, input::Action::RefreshSuggestions);
    }
}
