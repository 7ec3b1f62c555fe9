//! # hygrolog
//!
//! Time-sharded storage and range query engine for environmental sensor
//! readings (temperature, relative humidity, battery level).
//!
//! An external collector appends readings to immutable JSON shard files
//! named `sensor_YYYYMMDD_HHMMSS.json`, one per collection cycle. Given a
//! reference instant and a window length, this crate locates the shards
//! that may overlap the window, parses each of them once while isolating
//! corruption to the shard or record it occurs in, and merges the
//! survivors into one chronologically sorted series for charting.
//!
//! ```no_run
//! use hygrolog::{QueryEngine, QueryWindow, ShardCatalog, WindowPreset};
//!
//! # fn main() -> hygrolog::Result<()> {
//! let engine = QueryEngine::new(ShardCatalog::new("data"));
//! let series = engine.query(&QueryWindow::ending_now(WindowPreset::Day))?;
//! println!("{} readings, {:?}", series.len(), series.diagnostics);
//! # Ok(())
//! # }
//! ```
//!
//! Missing data is an empty series, not an error: sensor collection is
//! inherently lossy and the dashboard's value is showing what is there.

pub mod config;
pub mod error;
pub mod metrics;
pub mod query;
pub mod reading;
pub mod routes;
pub mod shard;

pub use config::Config;
pub use error::{Error, Result};
pub use metrics::{MetricsCollector, MetricsSnapshot};
pub use query::{QueryDiagnostics, QueryEngine, QuerySeries, QueryWindow, WindowPreset};
pub use reading::Reading;
pub use shard::{ShardCatalog, ShardRef, ShardWriter};
