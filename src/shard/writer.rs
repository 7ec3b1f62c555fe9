//! Shard writer
//!
//! Append side of the store, used by the collector. Readings are appended
//! to the current cycle's shard; after the cycle length has elapsed a fresh
//! shard file is started and the old one is never touched again. Writes go
//! through a temp file in the same directory followed by a rename, so a
//! concurrent reader sees either the previous or the new shard contents,
//! never a partial file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use tempfile::NamedTempFile;

use crate::error::Result;
use crate::reading::Reading;
use crate::shard::shard_file_name;

/// Appends readings to the current shard and rotates cycles
#[derive(Debug)]
pub struct ShardWriter {
    dir: PathBuf,
    cycle_started_at: DateTime<Utc>,
    path: PathBuf,
    cycle_len: Duration,
}

impl ShardWriter {
    /// Create a writer starting a new collection cycle at `now`
    pub fn new<P: AsRef<Path>>(dir: P, now: DateTime<Utc>) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(shard_file_name(&now));
        Self {
            dir,
            cycle_started_at: now,
            path,
            cycle_len: Duration::hours(24),
        }
    }

    /// Set the cycle length after which a new shard is started
    pub fn with_cycle_len(mut self, cycle_len: Duration) -> Self {
        self.cycle_len = cycle_len;
        self
    }

    /// Get the path of the shard currently being written
    pub fn current_path(&self) -> &Path {
        &self.path
    }

    /// Get the instant the current cycle started
    pub fn cycle_started_at(&self) -> DateTime<Utc> {
        self.cycle_started_at
    }

    /// Get the age of the current cycle at `now`
    pub fn cycle_age(&self, now: DateTime<Utc>) -> Duration {
        now - self.cycle_started_at
    }

    /// Append one reading to the current shard
    ///
    /// The whole array is rewritten atomically. If the existing file cannot
    /// be decoded the cycle restarts with just this reading, matching how
    /// the collector has always recovered from a damaged current shard.
    pub fn append(&self, reading: &Reading) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let mut payload: Vec<Reading> = if self.path.exists() {
            let raw = fs::read_to_string(&self.path)?;
            match serde_json::from_str(&raw) {
                Ok(existing) => existing,
                Err(err) => {
                    tracing::warn!(
                        shard = %self.path.display(),
                        error = %err,
                        "current shard unreadable, starting fresh"
                    );
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        payload.push(reading.clone());
        self.persist(&payload)
    }

    /// Start a new cycle if the current one has run its course
    ///
    /// Returns true when a rotation happened; the writer then points at a
    /// new, not-yet-existing shard file and the previous one is immutable
    /// from here on.
    pub fn rotate_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.cycle_age(now) < self.cycle_len {
            return false;
        }
        self.cycle_started_at = now;
        self.path = self.dir.join(shard_file_name(&now));
        tracing::info!(shard = %self.path.display(), "starting new collection cycle");
        true
    }

    fn persist(&self, payload: &[Reading]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        serde_json::to_writer_pretty(&mut tmp, payload)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|err| err.error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shard::read_shard;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample(minute: u32) -> Reading {
        Reading::new(Utc.with_ymd_and_hms(2025, 11, 20, 12, minute, 0).unwrap())
            .with_temperature(21.0)
            .with_humidity(45.0)
            .with_battery(90.0)
    }

    #[test]
    fn test_append_grows_the_current_shard() {
        let dir = tempdir().unwrap();
        let started = Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap();
        let writer = ShardWriter::new(dir.path(), started);

        writer.append(&sample(1)).unwrap();
        writer.append(&sample(2)).unwrap();
        writer.append(&sample(3)).unwrap();

        assert_eq!(
            writer.current_path().file_name().unwrap().to_str().unwrap(),
            "sensor_20251120_120000.json"
        );

        let contents = read_shard(writer.current_path()).unwrap();
        assert_eq!(contents.readings.len(), 3);
        assert!(contents.skipped.is_empty());
        assert_eq!(contents.readings[2], sample(3));
    }

    #[test]
    fn test_written_shard_uses_wire_field_names() {
        let dir = tempdir().unwrap();
        let started = Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap();
        let writer = ShardWriter::new(dir.path(), started);
        writer.append(&sample(1)).unwrap();

        let raw = fs::read_to_string(writer.current_path()).unwrap();
        assert!(raw.contains("\"ts\": \"2025-11-20T12:01:00Z\""));
        assert!(raw.contains("\"battery_percentage\""));
        assert!(!raw.contains("battery_pct"));
    }

    #[test]
    fn test_rotation_starts_a_new_shard() {
        let dir = tempdir().unwrap();
        let started = Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap();
        let mut writer = ShardWriter::new(dir.path(), started).with_cycle_len(Duration::hours(24));

        writer.append(&sample(1)).unwrap();
        assert!(!writer.rotate_if_due(started + Duration::hours(23)));

        let later = started + Duration::hours(24);
        assert!(writer.rotate_if_due(later));
        assert_eq!(writer.cycle_started_at(), later);
        assert_eq!(
            writer.current_path().file_name().unwrap().to_str().unwrap(),
            "sensor_20251121_120000.json"
        );

        // The previous shard stays behind untouched
        writer.append(&sample(5)).unwrap();
        let catalog = crate::shard::ShardCatalog::new(dir.path());
        assert_eq!(catalog.list_shards().unwrap().len(), 2);
    }

    #[test]
    fn test_append_recovers_from_damaged_current_shard() {
        let dir = tempdir().unwrap();
        let started = Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap();
        let writer = ShardWriter::new(dir.path(), started);

        fs::write(writer.current_path(), "not json at all").unwrap();
        writer.append(&sample(1)).unwrap();

        let contents = read_shard(writer.current_path()).unwrap();
        assert_eq!(contents.readings.len(), 1);
    }

    #[test]
    fn test_no_stray_temp_files_left_behind() {
        let dir = tempdir().unwrap();
        let started = Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap();
        let writer = ShardWriter::new(dir.path(), started);
        writer.append(&sample(1)).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, ["sensor_20251120_120000.json"]);
    }
}
