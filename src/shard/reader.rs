//! Shard reader
//!
//! Turns one shard file into validated readings. Corruption is isolated at
//! two levels: a record that fails structural validation is skipped with a
//! reason, and a shard whose top-level structure is not a JSON array fails
//! as a whole without touching the rest of the query.

use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::reading::Reading;
use crate::shard::{ShardError, ShardResult};

/// Why a record was dropped during shard parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Array element is not a JSON object
    NotAnObject,
    /// Record has no usable `ts` field
    MissingTimestamp,
    /// `ts` is present but is not an RFC3339 instant
    BadTimestamp(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject => write!(f, "record is not an object"),
            Self::MissingTimestamp => write!(f, "record has no timestamp"),
            Self::BadTimestamp(raw) => write!(f, "unparsable timestamp: {}", raw),
        }
    }
}

/// One dropped record, by position within its shard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRecord {
    /// Index of the record in the shard's array
    pub index: usize,
    /// Why it was dropped
    pub reason: SkipReason,
}

/// Validated contents of one shard
#[derive(Debug, Clone, Default)]
pub struct ShardContents {
    /// Readings that passed structural validation, in file order
    pub readings: Vec<Reading>,
    /// Records dropped during validation
    pub skipped: Vec<SkippedRecord>,
}

impl ShardContents {
    /// Check if the shard yielded no readings at all
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}

/// Read and validate one shard file
///
/// The file must hold a JSON array; anything else is a corrupt shard. Each
/// element is validated independently so one bad record never takes out its
/// neighbors. Readings keep their in-file order, which is collection order
/// and not necessarily timestamp order.
pub fn read_shard(path: &Path) -> ShardResult<ShardContents> {
    let raw = fs::read_to_string(path)?;

    let records: Vec<Value> = serde_json::from_str(&raw)
        .map_err(|err| ShardError::corrupt(path, err.to_string()))?;

    let mut contents = ShardContents::default();
    for (index, record) in records.iter().enumerate() {
        match decode_record(record) {
            Ok(reading) => contents.readings.push(reading),
            Err(reason) => contents.skipped.push(SkippedRecord { index, reason }),
        }
    }

    Ok(contents)
}

/// Validate one record of a shard's array
///
/// Only the timestamp is structurally required. Numeric fields are taken
/// as-is when they are numbers and treated as absent otherwise; bounds are
/// deliberately not checked so historical anomalies stay visible.
fn decode_record(record: &Value) -> Result<Reading, SkipReason> {
    let Some(fields) = record.as_object() else {
        return Err(SkipReason::NotAnObject);
    };

    let timestamp = match fields.get("ts") {
        None | Some(Value::Null) => return Err(SkipReason::MissingTimestamp),
        Some(Value::String(raw)) => chrono::DateTime::parse_from_rfc3339(raw)
            .map(|parsed| parsed.with_timezone(&chrono::Utc))
            .map_err(|_| SkipReason::BadTimestamp(raw.clone()))?,
        Some(other) => return Err(SkipReason::BadTimestamp(other.to_string())),
    };

    let number = |key: &str| fields.get(key).and_then(Value::as_f64);

    Ok(Reading {
        timestamp,
        temperature_c: number("temperature_c"),
        humidity_rh: number("humidity_rh"),
        battery_pct: number("battery_percentage"),
    })
}
