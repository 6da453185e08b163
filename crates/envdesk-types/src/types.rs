//! Core types for workspace environment readings.

use core::fmt;
use core::str::FromStr;
use std::collections::VecDeque;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ParseError;

/// Default number of points kept in a metric history window.
pub const DEFAULT_HISTORY_LEN: usize = 24;

/// One of the four environmental metrics tracked by the dashboard.
///
/// Each metric maps to a fixed field of the telemetry channel:
///
/// | Metric | Channel field | Unit |
/// |--------|---------------|------|
/// | Light | `field1` | lux |
/// | Noise | `field2` | dB |
/// | Humidity | `field3` | % |
/// | Temperature | `field4` | °C |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Metric {
    /// Light intensity.
    Light,
    /// Ambient temperature.
    Temperature,
    /// Relative humidity.
    Humidity,
    /// Noise level.
    Noise,
}

impl Metric {
    /// All metrics in display order.
    pub const ALL: [Metric; 4] = [
        Metric::Light,
        Metric::Temperature,
        Metric::Humidity,
        Metric::Noise,
    ];

    /// The telemetry channel field number (1-based) carrying this metric.
    ///
    /// ```
    /// use envdesk_types::Metric;
    ///
    /// assert_eq!(Metric::Light.field_number(), 1);
    /// assert_eq!(Metric::Temperature.field_number(), 4);
    /// ```
    #[must_use]
    pub const fn field_number(self) -> u8 {
        match self {
            Metric::Light => 1,
            Metric::Noise => 2,
            Metric::Humidity => 3,
            Metric::Temperature => 4,
        }
    }

    /// The JSON key of this metric in a channel feed entry (`field1`..`field4`).
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Metric::Light => "field1",
            Metric::Noise => "field2",
            Metric::Humidity => "field3",
            Metric::Temperature => "field4",
        }
    }

    /// Default display unit.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Metric::Light => "lux",
            Metric::Temperature => "°C",
            Metric::Humidity => "%",
            Metric::Noise => "dB",
        }
    }

    /// Default optimal range for a comfortable, productive workspace.
    #[must_use]
    pub const fn default_optimal(self) -> OptimalRange {
        match self {
            Metric::Light => OptimalRange::new(300.0, 500.0),
            Metric::Temperature => OptimalRange::new(21.0, 25.0),
            Metric::Humidity => OptimalRange::new(40.0, 60.0),
            Metric::Noise => OptimalRange::new(40.0, 60.0),
        }
    }

    /// Human-readable label used in prompts and UI titles.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Metric::Light => "Light intensity",
            Metric::Temperature => "Temperature",
            Metric::Humidity => "Humidity",
            Metric::Noise => "Noise level",
        }
    }

    /// Short lowercase name (also accepted by [`FromStr`]).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Metric::Light => "light",
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Noise => "noise",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" | "lux" => Ok(Metric::Light),
            "temperature" | "temp" => Ok(Metric::Temperature),
            "humidity" => Ok(Metric::Humidity),
            "noise" | "sound" => Ok(Metric::Noise),
            _ => Err(ParseError::UnknownMetric(s.to_string())),
        }
    }
}

/// Inclusive optimal range `[min, max]` for a metric.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OptimalRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl OptimalRange {
    /// Create a new range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Whether `value` lies within the range (bounds inclusive).
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Whether `value` is above the upper bound.
    #[must_use]
    pub fn is_above(&self, value: f64) -> bool {
        value > self.max
    }

    /// Whether `value` is below the lower bound.
    #[must_use]
    pub fn is_below(&self, value: f64) -> bool {
        value < self.min
    }
}

impl fmt::Display for OptimalRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

impl FromStr for OptimalRange {
    type Err = ParseError;

    /// Parse a `min-max` string such as `"300-500"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Skip the first character so a leading minus sign is not taken as the separator.
        let sep = trimmed
            .get(1..)
            .and_then(|rest| rest.find('-'))
            .map(|i| i + 1)
            .ok_or_else(|| ParseError::InvalidRange(s.to_string()))?;

        let min = trimmed[..sep]
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidRange(s.to_string()))?;
        let max = trimmed[sep + 1..]
            .trim()
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidRange(s.to_string()))?;

        if min > max {
            return Err(ParseError::InvalidRange(s.to_string()));
        }
        Ok(Self { min, max })
    }
}

/// A single timestamped sample.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataPoint {
    /// Sample value in the metric's unit.
    pub value: f64,
    /// When the sample was taken.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
}

impl DataPoint {
    /// Create a new data point.
    #[must_use]
    pub const fn new(value: f64, timestamp: OffsetDateTime) -> Self {
        Self { value, timestamp }
    }

    /// Create a data point stamped with the current UTC time.
    #[must_use]
    pub fn now(value: f64) -> Self {
        Self::new(value, OffsetDateTime::now_utc())
    }
}

/// Bounded sliding window of recent [`DataPoint`]s, oldest first.
///
/// Pushing into a full window evicts the oldest point, so once the window
/// reaches its capacity its length never changes again.
///
/// ```
/// use envdesk_types::{DataPoint, History};
///
/// let mut history = History::new(2);
/// history.push(DataPoint::now(1.0));
/// history.push(DataPoint::now(2.0));
/// let evicted = history.push(DataPoint::now(3.0));
///
/// assert_eq!(evicted.map(|p| p.value), Some(1.0));
/// assert_eq!(history.values(), vec![2.0, 3.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct History {
    capacity: usize,
    points: VecDeque<DataPoint>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LEN)
    }
}

impl History {
    /// Create an empty window holding at most `capacity` points (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            points: VecDeque::with_capacity(capacity),
        }
    }

    /// Build a window from `points` (oldest first), keeping only the most recent `capacity`.
    #[must_use]
    pub fn from_points(capacity: usize, points: impl IntoIterator<Item = DataPoint>) -> Self {
        let mut history = Self::new(capacity);
        for point in points {
            history.push(point);
        }
        history
    }

    /// Append a point, returning the evicted oldest point if the window was full.
    pub fn push(&mut self, point: DataPoint) -> Option<DataPoint> {
        let evicted = if self.points.len() >= self.capacity {
            self.points.pop_front()
        } else {
            None
        };
        self.points.push_back(point);
        evicted
    }

    /// Replace the contents with `points`, keeping the current capacity.
    pub fn replace(&mut self, points: impl IntoIterator<Item = DataPoint>) {
        self.points.clear();
        for point in points {
            self.push(point);
        }
    }

    /// Maximum number of points.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the window holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Most recent point.
    #[must_use]
    pub fn latest(&self) -> Option<&DataPoint> {
        self.points.back()
    }

    /// Iterate oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DataPoint> + ExactSizeIterator {
        self.points.iter()
    }

    /// All values, oldest first.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// The last `n` values, oldest first.
    #[must_use]
    pub fn last_values(&self, n: usize) -> Vec<f64> {
        let skip = self.points.len().saturating_sub(n);
        self.points.iter().skip(skip).map(|p| p.value).collect()
    }
}

/// Current state of a single metric: value, unit, optimal range and history.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Which metric this reading describes.
    pub metric: Metric,
    /// Current value.
    pub value: f64,
    /// Display unit.
    pub unit: String,
    /// Optimal range.
    pub optimal: OptimalRange,
    /// Recent samples.
    pub history: History,
}

impl Reading {
    /// Create a reading with the metric's default unit and optimal range and an empty history.
    #[must_use]
    pub fn new(metric: Metric, value: f64) -> Self {
        Self {
            metric,
            value,
            unit: metric.unit().to_string(),
            optimal: metric.default_optimal(),
            history: History::default(),
        }
    }

    /// Replace the history window.
    #[must_use]
    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    /// Replace the optimal range.
    #[must_use]
    pub fn with_optimal(mut self, optimal: OptimalRange) -> Self {
        self.optimal = optimal;
        self
    }

    /// Whether the current value lies within the optimal range.
    #[must_use]
    pub fn is_optimal(&self) -> bool {
        self.optimal.contains(self.value)
    }
}

/// The four readings shown on the dashboard at one moment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnvironmentSnapshot {
    /// Light intensity.
    pub light: Reading,
    /// Temperature.
    pub temperature: Reading,
    /// Humidity.
    pub humidity: Reading,
    /// Noise level.
    pub noise: Reading,
    /// When the snapshot was last updated.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub timestamp: OffsetDateTime,
}

impl EnvironmentSnapshot {
    /// Borrow the reading for `metric`.
    #[must_use]
    pub fn get(&self, metric: Metric) -> &Reading {
        match metric {
            Metric::Light => &self.light,
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
            Metric::Noise => &self.noise,
        }
    }

    /// Mutably borrow the reading for `metric`.
    pub fn get_mut(&mut self, metric: Metric) -> &mut Reading {
        match metric {
            Metric::Light => &mut self.light,
            Metric::Temperature => &mut self.temperature,
            Metric::Humidity => &mut self.humidity,
            Metric::Noise => &mut self.noise,
        }
    }

    /// Iterate readings in [`Metric::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        Metric::ALL.into_iter().map(move |m| self.get(m))
    }
}

/// Short-term direction of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Trend {
    /// Changed by less than 5% across the window.
    Stable,
    /// Rising.
    Increasing,
    /// Falling.
    Decreasing,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Stable => write!(f, "stable"),
            Trend::Increasing => write!(f, "increasing"),
            Trend::Decreasing => write!(f, "decreasing"),
        }
    }
}
