//! Query metrics
//!
//! Lightweight counters shared by all queries against one engine. Atomics
//! only; collection never blocks a query.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

/// Metrics collector for the query engine
#[derive(Debug, Default)]
pub struct MetricsCollector {
    /// Number of queries executed
    query_count: AtomicUsize,
    /// Total readings returned across all queries
    readings_returned: AtomicUsize,
    /// Total shards parsed across all queries
    shards_scanned: AtomicUsize,
    /// Total shards dropped as unreadable
    shards_skipped: AtomicUsize,
    /// Total records dropped during shard parsing
    records_skipped: AtomicUsize,
    /// Total query duration in nanoseconds
    query_duration_ns: AtomicU64,
    /// Duration of the most recent query
    last_query_duration: Mutex<Option<Duration>>,
}

/// Point-in-time copy of the collected metrics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricsSnapshot {
    pub query_count: usize,
    pub readings_returned: usize,
    pub shards_scanned: usize,
    pub shards_skipped: usize,
    pub records_skipped: usize,
    pub total_query_duration: Duration,
    pub last_query_duration: Option<Duration>,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one finished query
    pub fn record_query(&self, duration: Duration, readings_returned: usize) {
        self.query_count.fetch_add(1, Ordering::Relaxed);
        self.readings_returned
            .fetch_add(readings_returned, Ordering::Relaxed);
        self.query_duration_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        *self.last_query_duration.lock() = Some(duration);
    }

    /// Add parsed shards
    pub fn add_shards_scanned(&self, count: usize) {
        self.shards_scanned.fetch_add(count, Ordering::Relaxed);
    }

    /// Add shards dropped as unreadable
    pub fn add_shards_skipped(&self, count: usize) {
        self.shards_skipped.fetch_add(count, Ordering::Relaxed);
    }

    /// Add records dropped during parsing
    pub fn add_records_skipped(&self, count: usize) {
        self.records_skipped.fetch_add(count, Ordering::Relaxed);
    }

    /// Take a point-in-time snapshot of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            query_count: self.query_count.load(Ordering::Relaxed),
            readings_returned: self.readings_returned.load(Ordering::Relaxed),
            shards_scanned: self.shards_scanned.load(Ordering::Relaxed),
            shards_skipped: self.shards_skipped.load(Ordering::Relaxed),
            records_skipped: self.records_skipped.load(Ordering::Relaxed),
            total_query_duration: Duration::from_nanos(
                self.query_duration_ns.load(Ordering::Relaxed),
            ),
            last_query_duration: *self.last_query_duration.lock(),
        }
    }
}

impl MetricsSnapshot {
    /// Calculate the average query duration
    pub fn avg_query_duration(&self) -> Duration {
        if self.query_count == 0 {
            return Duration::ZERO;
        }
        self.total_query_duration / self.query_count as u32
    }
}
