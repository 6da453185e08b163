//! Utility functions for CLI operations.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use envdesk_core::{
    Config, FallbackMode, InferenceClient, MergedView, MockTelemetry, StoreClient,
    SuggestionEngine, TelemetryClient, TelemetryPoller, TelemetrySource, mock_environment,
};
use time::OffsetDateTime;
use tracing::debug;

/// Load configuration from `path` or the default location, apply environment
/// overrides, and validate the result.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_default().context("Failed to load config")?,
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

/// Pick the telemetry source: the channel when one is configured, drifting
/// mock data otherwise.
pub fn telemetry_source(config: &Config, offline: bool) -> Result<Arc<dyn TelemetrySource>> {
    let channel = config
        .telemetry
        .channel_id
        .as_deref()
        .filter(|_| !offline && config.telemetry.is_configured());

    match channel {
        Some(channel) => {
            debug!(channel, base_url = %config.telemetry.base_url, "Using telemetry channel");
            let client = TelemetryClient::new(
                &config.telemetry.base_url,
                channel,
                config.telemetry.api_key.as_deref(),
            )
            .context("Failed to create telemetry client")?;
            Ok(Arc::new(client))
        }
        None => {
            debug!(offline, "Using mock telemetry");
            Ok(Arc::new(MockTelemetry::new().with_drift(true)))
        }
    }
}

/// Build the suggestion engine. Offline mode never contacts the model.
pub fn suggestion_engine(
    config: &Config,
    offline: bool,
    fallback: Option<FallbackMode>,
) -> Result<SuggestionEngine> {
    let fallback = fallback.unwrap_or(config.inference.fallback);
    if offline {
        return Ok(SuggestionEngine::offline(fallback));
    }

    let client = InferenceClient::new(&config.inference.url, config.inference.token.as_deref())
        .context("Failed to create inference client")?
        .with_parameters(
            config.inference.max_new_tokens,
            config.inference.temperature,
        );
    Ok(SuggestionEngine::new(Arc::new(client), fallback))
}

/// Build the store client when both URL and key are configured.
pub fn store_client(config: &Config) -> Result<Option<StoreClient>> {
    match (config.store.url.as_deref(), config.store.anon_key.as_deref()) {
        (Some(url), Some(key)) if config.store.is_configured() => {
            let client = StoreClient::new(url, key).context("Failed to create store client")?;
            Ok(Some(client))
        }
        _ => Ok(None),
    }
}

/// Fetch live telemetry once and merge it over mock data, with the configured
/// optimal ranges applied.
pub async fn current_view(source: Arc<dyn TelemetrySource>, config: &Config) -> MergedView {
    let mut poller = TelemetryPoller::new(source, config.telemetry.history_count);
    let state = poller.initialize().await;

    let mut fallback = mock_environment();
    config.thresholds().apply_to(&mut fallback);
    MergedView::build(state, &fallback, OffsetDateTime::now_utc())
}

/// Write output to file or stdout
pub fn write_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            print!("{}", content);
            io::stdout().flush()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use envdesk_core::Metric;
    use envdesk_core::dashboard::DataSource;

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pomodoro]\nwork_duration = 50\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.pomodoro.work_duration, 50);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[pomodoro]\nwork_duration = 0\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("pomodoro.work_duration"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }

    #[test]
    fn test_store_client_requires_both_fields() {
        let mut config = Config::default();
        assert!(store_client(&config).unwrap().is_none());

        config.store.url = Some("https://example.supabase.co".to_string());
        assert!(store_client(&config).unwrap().is_none());

        config.store.anon_key = Some("anon".to_string());
        assert!(store_client(&config).unwrap().is_some());
    }

    #[test]
    fn test_offline_engine_has_no_model() {
        let engine = suggestion_engine(&Config::default(), true, Some(FallbackMode::Placeholder))
            .unwrap();
        assert!(!engine.has_model());
        assert_eq!(engine.fallback_mode(), FallbackMode::Placeholder);
    }

    #[tokio::test]
    async fn test_current_view_offline_is_live_mock() {
        let config = Config::default();
        let source = telemetry_source(&config, true).unwrap();
        let view = current_view(source, &config).await;

        // Mock telemetry answers every request, so all values are live.
        assert!(view.has_live_values());
        assert_eq!(view.provenance(Metric::Light).value, DataSource::Live);
    }

    #[test]
    fn test_write_output_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        write_output(Some(&path), "hello\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }
}
