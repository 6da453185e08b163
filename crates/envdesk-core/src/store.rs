//! Client for the hosted persistence store.
//!
//! The store is a PostgREST endpoint with two tables:
//!
//! | Table | Columns |
//! |-------|---------|
//! | `sensor_data` | `id, type, value, optimal_min, optimal_max, unit, updated_at` |
//! | `hardware_commands` | `id, command, value, status, created_at, completed_at` |
//!
//! Commands inserted into `hardware_commands` are picked up by the workspace
//! hardware, which marks them completed or failed. The store is not part of
//! the telemetry polling flow.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{Error, Result, error_from_response, normalize_base_url};

/// Default interval between change-feed polls.
pub const DEFAULT_SUBSCRIBE_INTERVAL: Duration = Duration::from_secs(5);

const SENSOR_TABLE: &str = "sensor_data";
const COMMAND_TABLE: &str = "hardware_commands";
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// One row of `sensor_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorDataRow {
    /// Row id.
    pub id: String,
    /// Sensor type, e.g. `temperature`.
    #[serde(rename = "type")]
    pub sensor_type: String,
    /// Current value.
    pub value: f64,
    /// Lower bound of the optimal range.
    #[serde(default)]
    pub optimal_min: Option<f64>,
    /// Upper bound of the optimal range.
    #[serde(default)]
    pub optimal_max: Option<f64>,
    /// Display unit.
    #[serde(default)]
    pub unit: Option<String>,
    /// ISO 8601 time of the last update.
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Lifecycle of a hardware command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    /// Waiting for the hardware.
    Pending,
    /// Executed.
    Completed,
    /// Rejected or failed on the hardware.
    Failed,
}

impl std::fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandStatus::Pending => write!(f, "pending"),
            CommandStatus::Completed => write!(f, "completed"),
            CommandStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One row of `hardware_commands`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareCommandRow {
    /// Row id.
    pub id: String,
    /// Command identifier, e.g. `decrease_temperature`.
    pub command: String,
    /// Adjustment amount.
    pub value: f64,
    /// Current status.
    pub status: CommandStatus,
    /// ISO 8601 insertion time.
    #[serde(default)]
    pub created_at: Option<String>,
    /// ISO 8601 completion time.
    #[serde(default)]
    pub completed_at: Option<String>,
}

#[derive(Debug, Serialize)]
struct SensorUpdate {
    value: f64,
    updated_at: String,
}

#[derive(Debug, Serialize)]
struct CommandInsert<'a> {
    command: &'a str,
    value: f64,
    status: CommandStatus,
}

/// PostgREST client for the store.
#[derive(Debug, Clone)]
pub struct StoreClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl StoreClient {
    /// Create a new store client.
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        if anon_key.trim().is_empty() {
            return Err(Error::MissingCredentials("store anon key"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
            anon_key: anon_key.trim().to_string(),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send<T: serde::de::DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.authorize(request).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(response.json().await?)
    }

    /// Set the value of the sensor row with the given type.
    pub async fn update_sensor_value(&self, sensor_type: &str, value: f64) -> Result<SensorDataRow> {
        let updated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| Error::invalid_response(e.to_string()))?;

        let request = self
            .client
            .patch(self.table_url(SENSOR_TABLE))
            .query(&[("type", format!("eq.{sensor_type}"))])
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(&SensorUpdate { value, updated_at });

        let row: SensorDataRow = self.send(request).await?;
        debug!(sensor = sensor_type, value, "Updated sensor value");
        Ok(row)
    }

    /// Queue a command for the workspace hardware.
    pub async fn send_command_to_hardware(
        &self,
        command: &str,
        value: f64,
    ) -> Result<HardwareCommandRow> {
        let request = self
            .client
            .post(self.table_url(COMMAND_TABLE))
            .header("Prefer", "return=representation")
            .header("Accept", SINGLE_OBJECT)
            .json(&CommandInsert {
                command,
                value,
                status: CommandStatus::Pending,
            });

        let row: HardwareCommandRow = self.send(request).await?;
        info!(command, value, id = %row.id, "Queued hardware command");
        Ok(row)
    }

    /// Fetch every sensor row.
    pub async fn sensor_data(&self) -> Result<Vec<SensorDataRow>> {
        let request = self
            .client
            .get(self.table_url(SENSOR_TABLE))
            .query(&[("select", "*")]);
        self.send(request).await
    }

    /// Watch `sensor_data` for updates by polling every `period`.
    ///
    /// The first poll establishes a baseline; afterwards each row whose value
    /// or `updated_at` changed is broadcast. Stops when `cancel` fires or all
    /// receivers are dropped.
    pub fn subscribe_sensor_data(
        &self,
        period: Duration,
        cancel: CancellationToken,
    ) -> (broadcast::Receiver<SensorDataRow>, JoinHandle<()>) {
        let (tx, rx) = broadcast::channel(64);
        let store = self.clone();

        let handle = tokio::spawn(async move {
            let mut seen: Option<HashMap<String, SensorDataRow>> = None;
            let mut timer = interval(period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Sensor data subscription stopped");
                        break;
                    }
                    _ = timer.tick() => {
                        let rows = match store.sensor_data().await {
                            Ok(rows) => rows,
                            Err(e) => {
                                warn!(error = %e, "Sensor data poll failed");
                                continue;
                            }
                        };

                        let changed = diff_rows(seen.as_ref(), &rows);
                        seen = Some(rows.into_iter().map(|r| (r.sensor_type.clone(), r)).collect());

                        for row in changed {
                            if tx.send(row).is_err() {
                                debug!("All sensor data subscribers dropped");
                                return;
                            }
                        }
                    }
                }
            }
        });

        (rx, handle)
    }
}

/// Rows that differ from `previous`. Nothing is reported before a baseline
/// exists.
fn diff_rows(
    previous: Option<&HashMap<String, SensorDataRow>>,
    rows: &[SensorDataRow],
) -> Vec<SensorDataRow> {
    let Some(previous) = previous else {
        return Vec::new();
    };
    rows.iter()
        .filter(|row| {
            previous.get(&row.sensor_type).is_none_or(|old| {
                old.value != row.value || old.updated_at != row.updated_at
            })
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(sensor_type: &str, value: f64, updated_at: &str) -> SensorDataRow {
        SensorDataRow {
            id: format!("id-{sensor_type}"),
            sensor_type: sensor_type.to_string(),
            value,
            optimal_min: None,
            optimal_max: None,
            unit: None,
            updated_at: Some(updated_at.to_string()),
        }
    }

    #[test]
    fn test_requires_key() {
        assert!(matches!(
            StoreClient::new("https://x.supabase.co", " "),
            Err(Error::MissingCredentials(_))
        ));
        assert!(matches!(
            StoreClient::new("x.supabase.co", "key"),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_row_deserialize() {
        let row: SensorDataRow = serde_json::from_value(json!({
            "id": "7f1c",
            "type": "temperature",
            "value": 23.5,
            "optimal_min": 21,
            "optimal_max": 25,
            "unit": "°C",
            "updated_at": null
        }))
        .unwrap();
        assert_eq!(row.sensor_type, "temperature");
        assert_eq!(row.optimal_max, Some(25.0));
        assert_eq!(row.updated_at, None);

        let cmd: HardwareCommandRow = serde_json::from_value(json!({
            "id": "c1",
            "command": "reduce_noise",
            "value": 10,
            "status": "pending",
            "created_at": "2025-01-01T00:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(cmd.status, CommandStatus::Pending);
        assert_eq!(cmd.completed_at, None);
    }

    #[test]
    fn test_command_insert_body() {
        let body = serde_json::to_value(CommandInsert {
            command: "increase_light",
            value: 20.0,
            status: CommandStatus::Pending,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"command": "increase_light", "value": 20.0, "status": "pending"})
        );
    }

    #[test]
    fn test_diff_rows() {
        let first = vec![row("light", 400.0, "t0"), row("noise", 50.0, "t0")];
        assert!(diff_rows(None, &first).is_empty());

        let seen: HashMap<_, _> = first
            .iter()
            .map(|r| (r.sensor_type.clone(), r.clone()))
            .collect();
        let next = vec![
            row("light", 400.0, "t0"),
            row("noise", 55.0, "t1"),
            row("humidity", 45.0, "t1"),
        ];
        let changed: Vec<_> = diff_rows(Some(&seen), &next)
            .into_iter()
            .map(|r| r.sensor_type)
            .collect();
        assert_eq!(changed, vec!["noise", "humidity"]);
    }
}
