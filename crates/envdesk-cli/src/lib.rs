//! Command-line interface and terminal dashboard for the envdesk workspace
//! comfort monitor.
//!
//! # Features
//!
//! - **Current readings**: live telemetry merged over mock data, with range
//!   status, trend and provenance per metric
//! - **History**: recent samples per metric
//! - **Continuous monitoring**: watch mode for ongoing data collection
//! - **Suggestions**: model-generated workspace suggestions with a rule-based
//!   fallback
//! - **Pomodoro**: a foreground countdown timer
//! - **Hardware commands**: queue adjustments through the store
//! - **Multiple output formats**: text, JSON and CSV
//! - **Dashboard**: an interactive terminal UI (`tui` feature)
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `read` | Read current workspace conditions |
//! | `history` | Show recent telemetry history |
//! | `watch` | Continuously poll telemetry |
//! | `suggest` | Generate workspace suggestions |
//! | `pomodoro` | Run a Pomodoro timer |
//! | `send` | Queue a hardware command |
//! | `config` | Manage configuration |
//! | `dashboard` | Launch the terminal dashboard |
//! | `completions` | Generate shell completions |
//!
//! # Environment Variables
//!
//! - `THINGSPEAK_CHANNEL_ID`, `THINGSPEAK_API_KEY`: telemetry channel
//! - `HUGGINGFACE_TOKEN`: suggestion model token
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY`: command store
//! - `ENVDESK_CONFIG`: configuration file path
//! - `ENVDESK_OFFLINE`: use mock telemetry and offline suggestions
//! - `NO_COLOR`: disable colored output when set
//!
//! # Examples
//!
//! ```bash
//! envdesk read --format json
//! envdesk history --metric temperature -n 12
//! envdesk pomodoro --work 50 --break 10
//! envdesk send decrease_temperature 2
//! ```

// Re-export core dependencies for convenience
pub use envdesk_core;
pub use envdesk_types;

// Dashboard module, used by the `dashboard` subcommand
#[cfg(feature = "tui")]
pub mod tui;
