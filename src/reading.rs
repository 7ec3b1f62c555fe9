//! Sensor reading data model and wire encoding
//!
//! A shard file is a JSON array of reading records. On the wire each record
//! carries a string `ts` (RFC3339 instant, e.g. `2025-11-20T21:40:32Z`) and
//! the numeric fields `temperature_c`, `humidity_rh` and `battery_percentage`,
//! any of which may be absent or null when the sensor faulted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One environmental sample taken by the collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Sample instant, UTC, second resolution
    #[serde(rename = "ts", with = "wire_ts")]
    pub timestamp: DateTime<Utc>,
    /// Temperature in degrees Celsius
    #[serde(default)]
    pub temperature_c: Option<f64>,
    /// Relative humidity in percent
    #[serde(default)]
    pub humidity_rh: Option<f64>,
    /// Battery charge in percent
    #[serde(default, rename = "battery_percentage")]
    pub battery_pct: Option<f64>,
}

impl Reading {
    /// Create a new reading with all sensor values absent
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            temperature_c: None,
            humidity_rh: None,
            battery_pct: None,
        }
    }

    /// Set the temperature value
    pub fn with_temperature(mut self, celsius: f64) -> Self {
        self.temperature_c = Some(celsius);
        self
    }

    /// Set the humidity value
    pub fn with_humidity(mut self, percent: f64) -> Self {
        self.humidity_rh = Some(percent);
        self
    }

    /// Set the battery level
    pub fn with_battery(mut self, percent: f64) -> Self {
        self.battery_pct = Some(percent);
        self
    }

    /// Check if every sensor value is absent
    pub fn is_blank(&self) -> bool {
        self.temperature_c.is_none() && self.humidity_rh.is_none() && self.battery_pct.is_none()
    }
}

/// Serde codec for the `ts` wire field.
///
/// Serializes to second precision with a `Z` suffix, exactly as the
/// collector writes it. Accepts any RFC3339 instant on the way in and
/// normalizes it to UTC.
pub(crate) mod wire_ts {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
