//! Workspace suggestion generation.
//!
//! A generation cycle builds a prompt from the current readings, asks an
//! [`InferenceBackend`] for text, extracts and normalizes a JSON array of
//! suggestions from it, and on any failure substitutes fallback suggestions.
//!
//! ```text
//! snapshot ──► build_prompt ──► backend.generate ──► parse_suggestions ──► batch
//!                                     │ error / missing token        │ error
//!                                     └──────────► fallback ◄────────┘
//! ```
//!
//! Each batch replaces the previous one wholesale.

pub mod inference;
pub mod parse;
pub mod prompt;
pub mod rules;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use envdesk_types::{EnvironmentSnapshot, Suggestion};

use crate::error::{Error, Result};

pub use inference::{InferenceBackend, InferenceClient};
pub use parse::parse_suggestions;
pub use prompt::build_prompt;
pub use rules::{placeholder, rule_based};

/// What to show when the model cannot be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    /// Threshold-based suggestions.
    #[default]
    Rules,
    /// A single "unable to analyze" suggestion with a refresh action.
    Placeholder,
}

impl std::str::FromStr for FallbackMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rules" => Ok(FallbackMode::Rules),
            "placeholder" => Ok(FallbackMode::Placeholder),
            other => Err(format!(
                "unknown fallback mode '{other}': expected 'rules' or 'placeholder'"
            )),
        }
    }
}

/// Where a batch of suggestions came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    /// Parsed from model output.
    Model,
    /// Threshold rules.
    Rules,
    /// The placeholder suggestion.
    Placeholder,
}

impl std::fmt::Display for SuggestionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuggestionSource::Model => write!(f, "model"),
            SuggestionSource::Rules => write!(f, "rules"),
            SuggestionSource::Placeholder => write!(f, "placeholder"),
        }
    }
}

/// One generation cycle's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionBatch {
    /// The suggestions, in display order.
    pub suggestions: Vec<Suggestion>,
    /// Where they came from.
    pub source: SuggestionSource,
    /// When they were generated.
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

/// Coarse buckets of the current readings.
///
/// Light is bucketed by 20 lux, temperature by 1 °C, humidity and noise by 5
/// units. A change of key means the readings moved enough to regenerate.
pub fn change_key(snapshot: &EnvironmentSnapshot) -> [i64; 4] {
    [
        (snapshot.light.value / 20.0).round() as i64,
        snapshot.temperature.value.round() as i64,
        (snapshot.humidity.value / 5.0).round() as i64,
        (snapshot.noise.value / 5.0).round() as i64,
    ]
}

/// Generates suggestions with a model and a fallback.
pub struct SuggestionEngine {
    backend: Option<Arc<dyn InferenceBackend>>,
    fallback: FallbackMode,
}

impl std::fmt::Debug for SuggestionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionEngine")
            .field("has_backend", &self.backend.is_some())
            .field("fallback", &self.fallback)
            .finish()
    }
}

impl SuggestionEngine {
    /// Engine backed by `backend`.
    pub fn new(backend: Arc<dyn InferenceBackend>, fallback: FallbackMode) -> Self {
        Self {
            backend: Some(backend),
            fallback,
        }
    }

    /// Engine with no model; every cycle uses the fallback.
    pub fn offline(fallback: FallbackMode) -> Self {
        Self {
            backend: None,
            fallback,
        }
    }

    /// Configured fallback mode.
    pub fn fallback_mode(&self) -> FallbackMode {
        self.fallback
    }

    /// Whether a usable model backend is present.
    pub fn has_model(&self) -> bool {
        self.backend.as_ref().is_some_and(|b| b.is_configured())
    }

    /// Ask the model for suggestions without any fallback.
    pub async fn try_generate(&self, snapshot: &EnvironmentSnapshot) -> Result<Vec<Suggestion>> {
        let backend = self
            .backend
            .as_ref()
            .filter(|b| b.is_configured())
            .ok_or(Error::MissingCredentials("inference token"))?;

        let prompt = build_prompt(snapshot);
        let text = backend.generate(&prompt).await?;
        debug!(response_len = text.len(), "Model responded");
        parse_suggestions(&text)
    }

    /// Fallback suggestions for `snapshot` per the configured mode.
    pub fn fallback(&self, snapshot: &EnvironmentSnapshot) -> SuggestionBatch {
        let (suggestions, source) = match self.fallback {
            FallbackMode::Rules => (rule_based(snapshot), SuggestionSource::Rules),
            FallbackMode::Placeholder => (vec![placeholder()], SuggestionSource::Placeholder),
        };
        SuggestionBatch {
            suggestions,
            source,
            generated_at: OffsetDateTime::now_utc(),
        }
    }

    /// Run one generation cycle. Never fails; errors select the fallback.
    pub async fn generate(&self, snapshot: &EnvironmentSnapshot) -> SuggestionBatch {
        match self.try_generate(snapshot).await {
            Ok(suggestions) => {
                info!(count = suggestions.len(), "Generated suggestions");
                SuggestionBatch {
                    suggestions,
                    source: SuggestionSource::Model,
                    generated_at: OffsetDateTime::now_utc(),
                }
            }
            Err(Error::MissingCredentials(what)) => {
                debug!(missing = what, "No model configured, using fallback suggestions");
                self.fallback(snapshot)
            }
            Err(e) => {
                warn!(error = %e, fallback = ?self.fallback, "Suggestion generation failed");
                self.fallback(snapshot)
            }
        }
    }

    /// Run a cycle only when some metric has live data.
    ///
    /// Returns `None` (keep previous suggestions) otherwise.
    pub async fn refresh(
        &self,
        snapshot: &EnvironmentSnapshot,
        has_live_data: bool,
    ) -> Option<SuggestionBatch> {
        if !has_live_data {
            debug!("No live telemetry yet, skipping suggestion refresh");
            return None;
        }
        Some(self.generate(snapshot).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use envdesk_types::{Metric, SuggestionKind};

    use crate::mock::mock_environment;

    struct ScriptedBackend {
        reply: std::result::Result<String, u16>,
        calls: AtomicU32,
    }

    impl ScriptedBackend {
        fn ok(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                calls: AtomicU32::new(0),
            })
        }

        fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl InferenceBackend for ScriptedBackend {
        async fn generate(&self, prompt: &str) -> Result<String> {
            assert!(prompt.contains("Current readings:"));
            self.calls.fetch_add(1, Ordering::Relaxed);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(Error::api(*status, "boom")),
            }
        }
    }

    struct Unconfigured;

    #[async_trait]
    impl InferenceBackend for Unconfigured {
        fn is_configured(&self) -> bool {
            false
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            panic!("must not be called without credentials");
        }
    }

    fn hot_snapshot() -> EnvironmentSnapshot {
        let mut snapshot = mock_environment();
        snapshot.light.value = 400.0;
        snapshot.temperature.value = 28.0;
        snapshot
    }

    #[tokio::test]
    async fn test_model_success() {
        let backend = ScriptedBackend::ok(
            r#"Sure: [ {"id": "m1", "type": "success", "message": "All good", "action": {"label": "Keep", "command": "none"}, "parameter": 0} ]"#,
        );
        let engine = SuggestionEngine::new(backend.clone(), FallbackMode::Rules);

        let batch = engine.generate(&hot_snapshot()).await;
        assert_eq!(batch.source, SuggestionSource::Model);
        assert_eq!(batch.suggestions.len(), 1);
        assert_eq!(batch.suggestions[0].category, SuggestionKind::Success);
        assert_eq!(backend.calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_api_error_uses_rules() {
        let engine = SuggestionEngine::new(ScriptedBackend::failing(503), FallbackMode::Rules);
        let batch = engine.generate(&hot_snapshot()).await;

        assert_eq!(batch.source, SuggestionSource::Rules);
        assert_eq!(batch.suggestions[0].command(), Some("decrease_temperature"));
    }

    #[tokio::test]
    async fn test_parse_error_uses_placeholder() {
        let engine = SuggestionEngine::new(
            ScriptedBackend::ok("I cannot help with that."),
            FallbackMode::Placeholder,
        );
        let batch = engine.generate(&hot_snapshot()).await;

        assert_eq!(batch.source, SuggestionSource::Placeholder);
        assert_eq!(batch.suggestions, vec![placeholder()]);
    }

    #[tokio::test]
    async fn test_unconfigured_backend_skips_call() {
        let engine = SuggestionEngine::new(Arc::new(Unconfigured), FallbackMode::Rules);
        assert!(!engine.has_model());

        let batch = engine.generate(&hot_snapshot()).await;
        assert_eq!(batch.source, SuggestionSource::Rules);
        assert!(matches!(
            engine.try_generate(&hot_snapshot()).await,
            Err(Error::MissingCredentials(_))
        ));
    }

    #[tokio::test]
    async fn test_offline_engine() {
        let engine = SuggestionEngine::offline(FallbackMode::Placeholder);
        let batch = engine.generate(&mock_environment()).await;
        assert_eq!(batch.source, SuggestionSource::Placeholder);
    }

    #[tokio::test]
    async fn test_refresh_requires_live_data() {
        let backend = ScriptedBackend::ok("[]");
        let engine = SuggestionEngine::new(backend.clone(), FallbackMode::Rules);

        assert!(engine.refresh(&mock_environment(), false).await.is_none());
        assert_eq!(backend.calls.load(Ordering::Relaxed), 0);

        let batch = engine.refresh(&mock_environment(), true).await.unwrap();
        assert_eq!(batch.source, SuggestionSource::Model);
        assert!(batch.suggestions.is_empty());
    }

    #[test]
    fn test_change_key_buckets() {
        let mut snapshot = mock_environment();
        snapshot.light.value = 401.0;
        snapshot.temperature.value = 22.4;
        snapshot.humidity.value = 47.0;
        snapshot.noise.value = 52.0;
        let key = change_key(&snapshot);
        assert_eq!(key, [20, 22, 9, 10]);

        snapshot.get_mut(Metric::Light).value = 405.0;
        assert_eq!(change_key(&snapshot), key);
        snapshot.get_mut(Metric::Temperature).value = 22.6;
        assert_ne!(change_key(&snapshot), key);
    }

    #[test]
    fn test_fallback_mode_parse() {
        assert_eq!("rules".parse::<FallbackMode>().unwrap(), FallbackMode::Rules);
        assert_eq!(
            "Placeholder".parse::<FallbackMode>().unwrap(),
            FallbackMode::Placeholder
        );
        assert!("magic".parse::<FallbackMode>().is_err());
    }
}
