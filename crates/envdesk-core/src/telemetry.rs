//! HTTP client for a ThingSpeak-style telemetry channel.
//!
//! The channel exposes four numeric fields that carry the workspace metrics
//! (see [`Metric::field_name`]). Two endpoints are used:
//!
//! - `GET {base}/channels/{id}/feeds/last/{count}.json` for recent history
//! - `GET {base}/channels/{id}/feeds/last.json` for the latest entry
//!
//! Field values arrive as strings (or `null`). They are coerced with a
//! leading-numeric-prefix parse; anything that does not parse becomes `0`.
//!
//! # Example
//!
//! ```no_run
//! use envdesk_core::telemetry::{TelemetryClient, TelemetrySource};
//! use envdesk_types::Metric;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TelemetryClient::new("https://api.thingspeak.com", "2939374", Some("READKEY"))?;
//!
//! let light = client.latest(Metric::Light).await?;
//! let history = client.history(Metric::Temperature, 24).await?;
//! println!("light={light} lux, {} temperature samples", history.len());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use envdesk_types::{DataPoint, Metric};

use crate::error::{Error, Result, error_from_response, normalize_base_url};

/// Default telemetry API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.thingspeak.com";

/// Default number of history entries requested.
pub const DEFAULT_HISTORY_COUNT: usize = 24;

/// A source of per-metric telemetry.
///
/// Implemented by [`TelemetryClient`] and by [`crate::mock::MockTelemetry`],
/// so pollers can be driven by either.
#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Fetch the last `count` samples of `metric`, oldest first.
    async fn history(&self, metric: Metric, count: usize) -> Result<Vec<DataPoint>>;

    /// Fetch the most recent value of `metric`.
    async fn latest(&self, metric: Metric) -> Result<f64>;
}

/// One entry of a channel feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedEntry {
    /// Entry creation time (RFC 3339).
    #[serde(default)]
    pub created_at: Option<String>,
    /// Sequential entry id.
    #[serde(default)]
    pub entry_id: Option<u64>,
    #[serde(default)]
    pub field1: Option<serde_json::Value>,
    #[serde(default)]
    pub field2: Option<serde_json::Value>,
    #[serde(default)]
    pub field3: Option<serde_json::Value>,
    #[serde(default)]
    pub field4: Option<serde_json::Value>,
}

impl FeedEntry {
    /// Coerced value of `metric` in this entry.
    pub fn value(&self, metric: Metric) -> f64 {
        let raw = match metric {
            Metric::Light => &self.field1,
            Metric::Noise => &self.field2,
            Metric::Humidity => &self.field3,
            Metric::Temperature => &self.field4,
        };
        raw.as_ref().map(coerce_value).unwrap_or(0.0)
    }

    /// Parsed `created_at`, if present and valid.
    pub fn timestamp(&self) -> Option<OffsetDateTime> {
        self.created_at
            .as_deref()
            .and_then(|s| OffsetDateTime::parse(s, &Rfc3339).ok())
    }

    /// Build a data point for `metric`, stamped with `created_at` or `fallback`.
    pub fn data_point(&self, metric: Metric, fallback: OffsetDateTime) -> DataPoint {
        DataPoint::new(self.value(metric), self.timestamp().unwrap_or(fallback))
    }
}

/// Response of the `feeds/last/{count}.json` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelFeed {
    /// Channel metadata, passed through untouched.
    #[serde(default)]
    pub channel: Option<serde_json::Value>,
    /// Entries, oldest first.
    #[serde(default)]
    pub feeds: Vec<FeedEntry>,
}

/// Coerce a raw field value to a number.
///
/// Numbers pass through; strings are parsed by their longest numeric prefix
/// (`"21.5C"` → `21.5`). Anything else, and any non-finite result, is `0`.
pub fn coerce_value(raw: &serde_json::Value) -> f64 {
    let parsed = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => parse_numeric_prefix(s),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parse the longest leading decimal number in `s`, ignoring leading whitespace.
fn parse_numeric_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;

    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts if at least one digit follows it.
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// HTTP client for a telemetry channel.
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    client: Client,
    base_url: String,
    channel_id: String,
    api_key: Option<String>,
}

impl TelemetryClient {
    /// Create a new telemetry client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API base URL (e.g. "https://api.thingspeak.com")
    /// * `channel_id` - Channel identifier
    /// * `api_key` - Read API key, if the channel is private
    pub fn new(base_url: &str, channel_id: &str, api_key: Option<&str>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(Error::Http)?;

        Self::with_client(base_url, channel_id, api_key, client)
    }

    /// Create a client with a custom reqwest Client.
    pub fn with_client(
        base_url: &str,
        channel_id: &str,
        api_key: Option<&str>,
        client: Client,
    ) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self {
            client,
            base_url,
            channel_id: channel_id.trim().to_string(),
            api_key: api_key.filter(|k| !k.is_empty()).map(String::from),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the channel id.
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Fetch the last `count` feed entries, oldest first.
    pub async fn feeds(&self, count: usize) -> Result<Vec<FeedEntry>> {
        let url = format!(
            "{}/channels/{}/feeds/last/{}.json",
            self.base_url, self.channel_id, count
        );
        let feed: ChannelFeed = self.get(&url).await?;
        debug!(entries = feed.feeds.len(), "Fetched channel feed");
        Ok(feed.feeds)
    }

    /// Fetch the latest feed entry.
    pub async fn last_entry(&self) -> Result<FeedEntry> {
        let url = format!(
            "{}/channels/{}/feeds/last.json",
            self.base_url, self.channel_id
        );
        self.get(&url).await
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.query(&[("api_key", key.as_str())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            Error::invalid_response(format!("unexpected telemetry payload: {e}"))
        })
    }
}

#[async_trait]
impl TelemetrySource for TelemetryClient {
    async fn history(&self, metric: Metric, count: usize) -> Result<Vec<DataPoint>> {
        let now = OffsetDateTime::now_utc();
        let entries = self.feeds(count).await?;
        Ok(entries
            .iter()
            .map(|entry| entry.data_point(metric, now))
            .collect())
    }

    async fn latest(&self, metric: Metric) -> Result<f64> {
        let entry = self.last_entry().await?;
        let value = entry.value(metric);
        debug!(metric = %metric, value, "Fetched latest value");
        Ok(value)
    }
}
