//! Range queries over the shard store
//!
//! The engine turns a reference instant plus a window length into one
//! chronologically sorted series: it asks the catalog for the candidate
//! shards, parses each of them exactly once, filters to the window and
//! stable-sorts the survivors. It holds no state between queries and
//! re-reads the store every time.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::metrics::MetricsCollector;
use crate::reading::Reading;
use crate::shard::{read_shard, ShardCatalog};

/// Chart window presets recognized by the frontend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowPreset {
    /// Last 6 hours
    SixHours,
    /// Last 12 hours
    TwelveHours,
    /// Last 24 hours
    Day,
    /// Last 3 days
    ThreeDays,
    /// Last 7 days
    Week,
    /// Last month, counted as 30 days
    Month,
}

impl WindowPreset {
    /// Get the window length for this preset
    pub fn duration(&self) -> Duration {
        match self {
            Self::SixHours => Duration::hours(6),
            Self::TwelveHours => Duration::hours(12),
            Self::Day => Duration::hours(24),
            Self::ThreeDays => Duration::days(3),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
        }
    }

    /// Get the preset's wire label
    pub fn label(&self) -> &'static str {
        match self {
            Self::SixHours => "6h",
            Self::TwelveHours => "12h",
            Self::Day => "24h",
            Self::ThreeDays => "3d",
            Self::Week => "7d",
            Self::Month => "1m",
        }
    }

    /// Get all presets, shortest window first
    pub fn all() -> [Self; 6] {
        [
            Self::SixHours,
            Self::TwelveHours,
            Self::Day,
            Self::ThreeDays,
            Self::Week,
            Self::Month,
        ]
    }
}

impl fmt::Display for WindowPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for WindowPreset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "6h" => Ok(Self::SixHours),
            "12h" => Ok(Self::TwelveHours),
            "24h" => Ok(Self::Day),
            "3d" => Ok(Self::ThreeDays),
            "7d" => Ok(Self::Week),
            "1m" => Ok(Self::Month),
            other => Err(Error::invalid_window(format!(
                "unknown range preset: {}",
                other
            ))),
        }
    }
}

/// Time window for a range query
///
/// Spans `[reference_time - duration, reference_time]`, both ends
/// inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    reference_time: DateTime<Utc>,
    duration: Duration,
}

impl QueryWindow {
    /// Create a window ending at `reference_time` and spanning `duration`
    pub fn new(reference_time: DateTime<Utc>, duration: Duration) -> Result<Self> {
        if duration <= Duration::zero() {
            return Err(Error::invalid_window(format!(
                "duration must be positive, got {}s",
                duration.num_seconds()
            )));
        }
        Ok(Self {
            reference_time,
            duration,
        })
    }

    /// Create a window from a preset ending at `reference_time`
    pub fn with_preset(reference_time: DateTime<Utc>, preset: WindowPreset) -> Self {
        Self {
            reference_time,
            duration: preset.duration(),
        }
    }

    /// Create a window from a preset ending now
    pub fn ending_now(preset: WindowPreset) -> Self {
        Self::with_preset(Utc::now(), preset)
    }

    /// Get the inclusive window start
    pub fn start(&self) -> DateTime<Utc> {
        self.reference_time - self.duration
    }

    /// Get the inclusive window end
    pub fn end(&self) -> DateTime<Utc> {
        self.reference_time
    }

    /// Check if an instant falls inside the window
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start() <= timestamp && timestamp <= self.end()
    }
}

/// Aggregate diagnostics for one query
///
/// Soft failures never abort a query; they are counted here so the
/// presenter can flag partial data if it wants to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueryDiagnostics {
    /// Shards parsed successfully
    pub shards_scanned: usize,
    /// Shards dropped as unreadable or corrupt
    pub shards_skipped: usize,
    /// Records dropped during shard parsing
    pub records_skipped: usize,
}

impl QueryDiagnostics {
    /// Check if the query saw no soft failures at all
    pub fn is_clean(&self) -> bool {
        self.shards_skipped == 0 && self.records_skipped == 0
    }
}

/// Result of a range query
#[derive(Debug, Clone)]
pub struct QuerySeries {
    /// Readings inside the window, sorted ascending by timestamp
    pub readings: Vec<Reading>,
    /// What was skipped along the way
    pub diagnostics: QueryDiagnostics,
}

impl QuerySeries {
    /// Check if the window held no readings
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Get the number of readings in the series
    pub fn len(&self) -> usize {
        self.readings.len()
    }
}

/// Executes range queries against a shard catalog
pub struct QueryEngine {
    catalog: ShardCatalog,
    metrics: Arc<MetricsCollector>,
}

impl QueryEngine {
    /// Create an engine over the given catalog
    pub fn new(catalog: ShardCatalog) -> Self {
        Self::with_metrics(catalog, Arc::new(MetricsCollector::new()))
    }

    /// Create an engine sharing an existing metrics collector
    pub fn with_metrics(catalog: ShardCatalog, metrics: Arc<MetricsCollector>) -> Self {
        Self { catalog, metrics }
    }

    /// Get the engine's metrics collector
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Run one range query
    ///
    /// Absence of data is an empty series, not an error; only an invalid
    /// window or an unlistable data directory fail the request. Identical
    /// queries against an unchanged directory return identical series and
    /// diagnostics.
    pub fn query(&self, window: &QueryWindow) -> Result<QuerySeries> {
        let started = Instant::now();
        let (start, end) = (window.start(), window.end());

        let candidates = self.catalog.shards_overlapping(start, end)?;
        tracing::debug!(
            start = %start,
            end = %end,
            candidates = candidates.len(),
            "running range query"
        );

        let mut readings = Vec::new();
        let mut diagnostics = QueryDiagnostics::default();

        for shard in &candidates {
            match read_shard(&shard.path) {
                Ok(contents) => {
                    diagnostics.shards_scanned += 1;
                    diagnostics.records_skipped += contents.skipped.len();
                    for skip in &contents.skipped {
                        tracing::debug!(
                            shard = %shard.file_name,
                            index = skip.index,
                            reason = %skip.reason,
                            "dropped record"
                        );
                    }
                    readings.extend(
                        contents
                            .readings
                            .into_iter()
                            .filter(|reading| window.contains(reading.timestamp)),
                    );
                }
                Err(err) => {
                    // Tolerates the shard-visible-before-flushed race on the
                    // newest shard; the caller may retry shortly.
                    diagnostics.shards_skipped += 1;
                    tracing::warn!(
                        shard = %shard.file_name,
                        error = %err,
                        "skipping unreadable shard"
                    );
                }
            }
        }

        // Stable sort: equal timestamps keep shard order, then in-file
        // position, so repeated queries are deterministic.
        readings.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        self.metrics.record_query(started.elapsed(), readings.len());
        self.metrics.add_shards_scanned(diagnostics.shards_scanned);
        self.metrics.add_shards_skipped(diagnostics.shards_skipped);
        self.metrics.add_records_skipped(diagnostics.records_skipped);

        Ok(QuerySeries {
            readings,
            diagnostics,
        })
    }
}
