//! Command implementations for the CLI.

mod config;
mod history;
mod pomodoro;
mod read;
mod send;
mod suggest;
mod watch;

pub use config::cmd_config;
pub use history::{HistoryArgs, cmd_history};
pub use pomodoro::{apply_overrides, cmd_pomodoro};
pub use read::cmd_read;
pub use send::cmd_send;
pub use suggest::{SuggestArgs, cmd_suggest};
pub use watch::{WatchArgs, cmd_watch};
