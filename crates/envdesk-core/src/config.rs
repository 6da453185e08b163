//! Workspace monitor configuration.
//!
//! Configuration lives in a TOML file (see [`default_config_path`]). Every
//! section is optional; missing fields take their defaults. Secrets can be
//! supplied through environment variables instead of the file, see
//! [`Config::apply_env_overrides`].
//!
//! ```toml
//! [telemetry]
//! channel_id = "2850123"
//! api_key = "ABCDEF0123456789"
//! poll_interval_secs = 15
//!
//! [inference]
//! fallback = "rules"
//!
//! [pomodoro]
//! work_duration = 50
//! break_duration = 10
//!
//! [ranges.temperature]
//! min = 20.0
//! max = 24.0
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use envdesk_types::{Metric, OptimalRange, PomodoroSettings};

use crate::pomodoro::validate_settings;
use crate::suggestions::FallbackMode;
use crate::suggestions::inference::{DEFAULT_INFERENCE_URL, DEFAULT_MAX_NEW_TOKENS, DEFAULT_TEMPERATURE};
use crate::telemetry::{DEFAULT_BASE_URL, DEFAULT_HISTORY_COUNT};
use crate::thresholds::Thresholds;

/// Environment variable holding the telemetry read key.
pub const ENV_TELEMETRY_API_KEY: &str = "THINGSPEAK_API_KEY";
/// Environment variable holding the telemetry channel id.
pub const ENV_TELEMETRY_CHANNEL_ID: &str = "THINGSPEAK_CHANNEL_ID";
/// Environment variable holding the inference token.
pub const ENV_INFERENCE_TOKEN: &str = "HUGGINGFACE_TOKEN";
/// Environment variable holding the store URL.
pub const ENV_STORE_URL: &str = "SUPABASE_URL";
/// Environment variable holding the store key.
pub const ENV_STORE_ANON_KEY: &str = "SUPABASE_ANON_KEY";

/// Minimum polling interval accepted for any timer.
const MIN_INTERVAL_SECS: u64 = 1;
/// Maximum polling interval accepted for any timer (1 day).
const MAX_INTERVAL_SECS: u64 = 86_400;

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Telemetry channel settings.
    pub telemetry: TelemetryConfig,
    /// Suggestion model settings.
    pub inference: InferenceConfig,
    /// Persistence store settings.
    pub store: StoreConfig,
    /// Pomodoro durations.
    pub pomodoro: PomodoroSettings,
    /// Optimal range overrides.
    pub ranges: RangesConfig,
    /// Display preferences.
    pub display: DisplayConfig,
}

impl Config {
    /// Load configuration from the default path, or defaults if the file
    /// does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Save configuration to a file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration, reporting every problem at once.
    ///
    /// ```
    /// use envdesk_core::Config;
    ///
    /// let config = Config::default();
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.telemetry.validate());
        errors.extend(self.inference.validate());
        errors.extend(self.store.validate());
        errors.extend(validate_settings(&self.pomodoro));
        errors.extend(self.ranges.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    /// Load and validate configuration from a file.
    pub fn load_validated<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Override secrets and ids from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override secrets and ids using `lookup`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_TELEMETRY_API_KEY) {
            self.telemetry.api_key = Some(v);
        }
        if let Some(v) = get(ENV_TELEMETRY_CHANNEL_ID) {
            self.telemetry.channel_id = Some(v);
        }
        if let Some(v) = get(ENV_INFERENCE_TOKEN) {
            self.inference.token = Some(v);
        }
        if let Some(v) = get(ENV_STORE_URL) {
            self.store.url = Some(v);
        }
        if let Some(v) = get(ENV_STORE_ANON_KEY) {
            self.store.anon_key = Some(v);
        }
    }

    /// Optimal ranges with overrides applied.
    pub fn thresholds(&self) -> Thresholds {
        Metric::ALL
            .into_iter()
            .fold(Thresholds::default(), |thresholds, metric| {
                match self.ranges.get(metric) {
                    Some(range) => thresholds.with_range(metric, range),
                    None => thresholds,
                }
            })
    }
}

/// Telemetry channel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// API base URL.
    pub base_url: String,
    /// Channel id. Without one the dashboard runs on mock data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    /// Read API key for private channels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Latest-value poll interval.
    pub poll_interval_secs: u64,
    /// Secondary feed refresh interval.
    pub feed_interval_secs: u64,
    /// Points fetched for the initial history.
    pub history_count: usize,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            channel_id: None,
            api_key: None,
            poll_interval_secs: 15,
            feed_interval_secs: 30,
            history_count: DEFAULT_HISTORY_COUNT,
        }
    }
}

impl TelemetryConfig {
    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Feed interval as a [`Duration`].
    pub fn feed_interval(&self) -> Duration {
        Duration::from_secs(self.feed_interval_secs)
    }

    /// Whether a channel is configured.
    pub fn is_configured(&self) -> bool {
        self.channel_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Validate telemetry configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        validate_url(&mut errors, "telemetry.base_url", &self.base_url);
        validate_interval(&mut errors, "telemetry.poll_interval_secs", self.poll_interval_secs);
        validate_interval(&mut errors, "telemetry.feed_interval_secs", self.feed_interval_secs);
        if self.history_count == 0 || self.history_count > 8000 {
            errors.push(ValidationError::new(
                "telemetry.history_count",
                format!("{} is out of range (1-8000)", self.history_count),
            ));
        }
        errors
    }
}

/// Suggestion model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Model endpoint.
    pub url: String,
    /// Bearer token. Without one, fallback suggestions are used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Generation budget.
    pub max_new_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Periodic regeneration interval.
    pub refresh_interval_secs: u64,
    /// What to show when the model fails.
    pub fallback: FallbackMode,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_INFERENCE_URL.to_string(),
            token: None,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            refresh_interval_secs: 300,
            fallback: FallbackMode::default(),
        }
    }
}

impl InferenceConfig {
    /// Refresh interval as a [`Duration`].
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Validate inference configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        validate_url(&mut errors, "inference.url", &self.url);
        validate_interval(
            &mut errors,
            "inference.refresh_interval_secs",
            self.refresh_interval_secs,
        );
        if self.max_new_tokens == 0 {
            errors.push(ValidationError::new(
                "inference.max_new_tokens",
                "must be at least 1",
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            errors.push(ValidationError::new(
                "inference.temperature",
                format!("{} is out of range (0.0-2.0)", self.temperature),
            ));
        }
        errors
    }
}

/// Persistence store configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Project URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Anonymous API key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anon_key: Option<String>,
}

impl StoreConfig {
    /// Whether both URL and key are present.
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.anon_key.is_some()
    }

    /// Validate store configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if let Some(url) = &self.url {
            validate_url(&mut errors, "store.url", url);
        }
        errors
    }
}

/// Per-metric optimal range overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangesConfig {
    /// Light range in lux.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<OptimalRange>,
    /// Temperature range in °C.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<OptimalRange>,
    /// Humidity range in %.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<OptimalRange>,
    /// Noise range in dB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise: Option<OptimalRange>,
}

impl RangesConfig {
    /// Override for `metric`, if any.
    pub fn get(&self, metric: Metric) -> Option<OptimalRange> {
        match metric {
            Metric::Light => self.light,
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Noise => self.noise,
        }
    }

    /// Validate range overrides.
    pub fn validate(&self) -> Vec<ValidationError> {
        Metric::ALL
            .into_iter()
            .filter_map(|metric| {
                let range = self.get(metric)?;
                (range.min > range.max || !range.min.is_finite() || !range.max.is_finite())
                    .then(|| {
                        ValidationError::new(
                            format!("ranges.{}", metric.as_str()),
                            format!("invalid range {range}: min must not exceed max"),
                        )
                    })
            })
            .collect()
    }
}

/// Display preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Color theme: `dark` or `light`.
    pub theme: String,
    /// Disable colored output.
    pub no_color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            no_color: false,
        }
    }
}

fn validate_url(errors: &mut Vec<ValidationError>, field: &str, url: &str) {
    if url.is_empty() {
        errors.push(ValidationError::new(field, "URL cannot be empty"));
    } else if !url.starts_with("http://") && !url.starts_with("https://") {
        errors.push(ValidationError::new(
            field,
            format!("invalid URL '{url}': must start with http:// or https://"),
        ));
    }
}

fn validate_interval(errors: &mut Vec<ValidationError>, field: &str, secs: u64) {
    if !(MIN_INTERVAL_SECS..=MAX_INTERVAL_SECS).contains(&secs) {
        errors.push(ValidationError::new(
            field,
            format!("{secs} is out of range ({MIN_INTERVAL_SECS}-{MAX_INTERVAL_SECS} seconds)"),
        ));
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., `telemetry.base_url`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    /// Create a validation error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("envdesk")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.telemetry.base_url, "https://api.thingspeak.com");
        assert_eq!(config.telemetry.poll_interval(), Duration::from_secs(15));
        assert_eq!(config.telemetry.feed_interval(), Duration::from_secs(30));
        assert_eq!(config.telemetry.history_count, 24);
        assert_eq!(config.inference.refresh_interval(), Duration::from_secs(300));
        assert_eq!(config.inference.max_new_tokens, 500);
        assert_eq!(config.inference.fallback, FallbackMode::Rules);
        assert_eq!(config.pomodoro, PomodoroSettings::default());
        assert!(!config.telemetry.is_configured());
        assert!(!config.store.is_configured());
    }

    #[test]
    fn test_default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_save_and_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.telemetry.channel_id = Some("2850123".to_string());
        config.inference.fallback = FallbackMode::Placeholder;
        config.pomodoro.work_duration = 50;
        config.ranges.temperature = Some(OptimalRange::new(20.0, 24.0));

        config.save(&config_path).unwrap();
        let loaded = Config::load(&config_path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_config_load_nonexistent() {
        let result = Config::load("/nonexistent/path/config.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("invalid.toml");
        std::fs::write(&config_path, "this is not valid { toml").unwrap();

        let result = Config::load(&config_path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_config_partial_toml() {
        let toml = r#"
            [telemetry]
            channel_id = "42"
            poll_interval_secs = 60

            [inference]
            fallback = "placeholder"

            [pomodoro]
            work_duration = 30

            [ranges.noise]
            min = 30.0
            max = 50.0
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.telemetry.channel_id.as_deref(), Some("42"));
        assert_eq!(config.telemetry.poll_interval_secs, 60);
        assert_eq!(config.telemetry.feed_interval_secs, 30);
        assert_eq!(config.inference.fallback, FallbackMode::Placeholder);
        assert_eq!(config.pomodoro.work_duration, 30);
        assert_eq!(config.pomodoro.break_duration, 5);

        let thresholds = config.thresholds();
        assert_eq!(thresholds.range(Metric::Noise), OptimalRange::new(30.0, 50.0));
        assert_eq!(thresholds.range(Metric::Light), Metric::Light.default_optimal());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.telemetry.base_url = "api.thingspeak.com".to_string();
        config.telemetry.poll_interval_secs = 0;
        config.inference.temperature = 5.0;
        config.pomodoro.break_duration = 0;
        config.ranges.light = Some(OptimalRange::new(500.0, 300.0));

        let Err(ConfigError::Validation(errors)) = config.validate() else {
            panic!("expected validation errors");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "telemetry.base_url",
                "telemetry.poll_interval_secs",
                "inference.temperature",
                "pomodoro.break_duration",
                "ranges.light",
            ]
        );
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_TELEMETRY_API_KEY, "READKEY"),
            (ENV_TELEMETRY_CHANNEL_ID, "99"),
            (ENV_INFERENCE_TOKEN, "hf_token"),
            (ENV_STORE_URL, ""),
        ]);

        let mut config = Config::default();
        config.store.url = Some("https://example.supabase.co".to_string());
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.telemetry.api_key.as_deref(), Some("READKEY"));
        assert_eq!(config.telemetry.channel_id.as_deref(), Some("99"));
        assert_eq!(config.inference.token.as_deref(), Some("hf_token"));
        // Empty values never clobber the file.
        assert_eq!(
            config.store.url.as_deref(),
            Some("https://example.supabase.co")
        );
        assert_eq!(config.store.anon_key, None);
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("envdesk/config.toml"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let error = ConfigError::Validation(vec![
            ValidationError::new("telemetry.base_url", "URL cannot be empty"),
            ValidationError::new("pomodoro.work_duration", "must be at least 1 minute"),
        ]);
        let display = error.to_string();
        assert!(display.contains("Configuration validation failed"));
        assert!(display.contains("  - telemetry.base_url: URL cannot be empty"));
        assert!(display.contains("  - pomodoro.work_duration: must be at least 1 minute"));
    }
}
