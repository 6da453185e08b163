//! Core library for the envdesk workspace comfort monitor.
//!
//! This crate polls an IoT telemetry channel for light, temperature, humidity
//! and noise, merges live values with mock fallbacks, generates workspace
//! suggestions with a hosted language model, and drives a Pomodoro timer.
//!
//! # Features
//!
//! - **Telemetry client**: latest values and short histories from a
//!   ThingSpeak-style channel
//! - **Polling**: interval pollers that keep the previous value on failure
//! - **Merging**: per-metric substitution of mock data for missing live data
//! - **Suggestions**: prompt building, model output extraction and
//!   normalization, with rule-based or placeholder fallback
//! - **Pomodoro**: a four-state countdown machine
//! - **Store**: a thin client for the command and sensor tables
//!
//! # Metrics
//!
//! | Metric | Field | Unit | Default optimal |
//! |--------|-------|------|-----------------|
//! | Light | `field1` | lux | 300-500 |
//! | Noise | `field2` | dB | 40-60 |
//! | Humidity | `field3` | % | 40-60 |
//! | Temperature | `field4` | °C | 21-25 |
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use envdesk_core::{TelemetryClient, TelemetryPoller};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TelemetryClient::new("https://api.thingspeak.com", "2850123", None)?;
//!     let mut poller = TelemetryPoller::new(Arc::new(client), 24);
//!
//!     let state = poller.initialize().await;
//!     if let Some(lux) = state.latest(envdesk_types::Metric::Light) {
//!         println!("Light: {lux} lux");
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dashboard;
pub mod error;
pub mod feed;
pub mod messages;
pub mod mock;
pub mod pomodoro;
pub mod poller;
pub mod store;
pub mod suggestions;
pub mod telemetry;
pub mod thresholds;
pub mod trend;

// Re-export the data model
pub use envdesk_types::types;
pub use envdesk_types::{
    DataPoint, EnvironmentSnapshot, History, Metric, OptimalRange, PomodoroSettings,
    PomodoroState, PomodoroStatus, Reading, Suggestion, SuggestionAction, SuggestionKind, Trend,
};

// Core exports
pub use config::{Config, ConfigError, ValidationError, default_config_path};
pub use dashboard::{DataSource, MergedView, Provenance, merge};
pub use error::{Error, Result};
pub use feed::EnvironmentFeed;
pub use messages::{Command, DashboardEvent};
pub use mock::{MockTelemetry, mock_environment, simulate_update};
pub use pomodoro::{Pomodoro, PomodoroEvent};
pub use poller::{PollOutcome, TelemetryPoller, TelemetryState};
pub use store::{CommandStatus, HardwareCommandRow, SensorDataRow, StoreClient};
pub use suggestions::{
    FallbackMode, InferenceBackend, InferenceClient, SuggestionBatch, SuggestionEngine,
    SuggestionSource, change_key,
};
pub use telemetry::{TelemetryClient, TelemetrySource};
pub use thresholds::{RangeStatus, Thresholds};
pub use trend::analyze_trend;
