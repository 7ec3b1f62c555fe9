//! Shard catalog
//!
//! Maps the data directory's listing onto an ordered set of shard
//! references with decoded cycle start instants. The directory is the only
//! index there is: a shard's coverage end is not stored anywhere, so window
//! selection has to be conservative around shard boundaries.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::shard::parse_shard_file_name;

/// Reference to one shard file, decoded from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardRef {
    /// Instant the shard's collection cycle started
    pub created_at: DateTime<Utc>,
    /// File name within the data directory
    pub file_name: String,
    /// Full path to the shard file
    pub path: PathBuf,
}

/// Enumerates the shards available in a data directory
///
/// The directory is an explicit constructor argument; the catalog holds no
/// other state and takes a fresh listing on every call.
#[derive(Debug, Clone)]
pub struct ShardCatalog {
    dir: PathBuf,
}

impl ShardCatalog {
    /// Create a catalog over the given data directory
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Get the data directory this catalog reads from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List every shard in the data directory
    ///
    /// Files that do not match the shard naming pattern are skipped; other
    /// processes are free to keep unrelated files next to the shards. An
    /// unlistable directory is fatal to the request.
    ///
    /// The result is sorted ascending by cycle start, ties broken by file
    /// name, so repeated listings of an unchanged directory are identical.
    pub fn list_shards(&self) -> Result<Vec<ShardRef>> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|source| Error::storage_unavailable(&self.dir, source))?;

        let mut shards = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| Error::storage_unavailable(&self.dir, source))?;
            if !entry.file_type().map(|kind| kind.is_file()).unwrap_or(false) {
                continue;
            }

            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                tracing::debug!(entry = ?file_name, "skipping non-UTF8 file name");
                continue;
            };

            match parse_shard_file_name(name) {
                Ok(created_at) => shards.push(ShardRef {
                    created_at,
                    file_name: name.to_string(),
                    path: entry.path(),
                }),
                Err(err) => {
                    tracing::debug!(file = name, error = %err, "skipping non-shard file");
                }
            }
        }

        shards.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.file_name.cmp(&b.file_name))
        });

        Ok(shards)
    }

    /// List the shards that may hold readings inside `[start, end]`
    ///
    /// A shard nominally covers from its own cycle start up to its
    /// successor's, so it is a candidate when its cycle starts at or before
    /// `end` and its successor starts after `start` (the last shard is
    /// open-ended). The shard immediately preceding the earliest candidate
    /// is included as well, to catch readings that straddle a boundary.
    pub fn shards_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ShardRef>> {
        let shards = self.list_shards()?;
        Ok(select_overlapping(shards, start, end))
    }
}

fn select_overlapping(
    shards: Vec<ShardRef>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<ShardRef> {
    let mut keep = vec![false; shards.len()];

    for (idx, shard) in shards.iter().enumerate() {
        if shard.created_at > end {
            continue;
        }
        let covers_past_start = match shards.get(idx + 1) {
            Some(next) => next.created_at > start,
            None => true,
        };
        if covers_past_start {
            keep[idx] = true;
        }
    }

    if let Some(first) = keep.iter().position(|&kept| kept) {
        if first > 0 {
            keep[first - 1] = true;
        }
    }

    shards
        .into_iter()
        .zip(keep)
        .filter_map(|(shard, kept)| kept.then_some(shard))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::fs::File;
    use tempfile::tempdir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    fn day_start(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, day, 0, 0, 0).unwrap()
    }

    fn refs_for(days: &[u32]) -> Vec<ShardRef> {
        days.iter()
            .map(|&day| {
                let created_at = day_start(day);
                let file_name = crate::shard::shard_file_name(&created_at);
                let path = PathBuf::from("/data").join(&file_name);
                ShardRef {
                    created_at,
                    file_name,
                    path,
                }
            })
            .collect()
    }

    fn selected_days(days: &[u32], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<u32> {
        select_overlapping(refs_for(days), start, end)
            .into_iter()
            .map(|shard| shard.created_at.format("%d").to_string().parse().unwrap())
            .collect()
    }

    #[test_log::test]
    fn test_list_skips_foreign_files() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "sensor_20251120_000000.json");
        touch(dir.path(), "sensor_20251121_000000.json");
        touch(dir.path(), "notes.txt");
        touch(dir.path(), "sensor_20251121_000000.json.bak");
        std::fs::create_dir(dir.path().join("plots")).unwrap();

        let catalog = ShardCatalog::new(dir.path());
        let shards = catalog.list_shards().unwrap();

        assert_eq!(shards.len(), 2);
        assert_eq!(shards[0].file_name, "sensor_20251120_000000.json");
        assert_eq!(shards[1].file_name, "sensor_20251121_000000.json");
    }

    #[test]
    fn test_list_is_sorted_by_cycle_start() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "sensor_20251121_120000.json");
        touch(dir.path(), "sensor_20251119_000000.json");
        touch(dir.path(), "sensor_20251121_000000.json");

        let catalog = ShardCatalog::new(dir.path());
        let shards = catalog.list_shards().unwrap();
        let names: Vec<_> = shards.iter().map(|s| s.file_name.as_str()).collect();

        assert_eq!(
            names,
            [
                "sensor_20251119_000000.json",
                "sensor_20251121_000000.json",
                "sensor_20251121_120000.json",
            ]
        );
    }

    #[test]
    fn test_missing_directory_is_storage_unavailable() {
        let catalog = ShardCatalog::new("/definitely/not/here");
        let err = catalog.list_shards().unwrap_err();
        assert!(err.is_storage_unavailable());
    }

    #[test]
    fn test_empty_directory_lists_nothing() {
        let dir = tempdir().unwrap();
        let catalog = ShardCatalog::new(dir.path());
        assert!(catalog.list_shards().unwrap().is_empty());
        assert!(catalog
            .shards_overlapping(day_start(1), day_start(30))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_selection_spanning_several_shards() {
        // Window from mid day 20 to mid day 22 touches shards 20..22, plus
        // the predecessor of the earliest candidate.
        let start = Utc.with_ymd_and_hms(2025, 11, 20, 12, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 11, 22, 12, 0, 0).unwrap();
        assert_eq!(selected_days(&[18, 19, 20, 21, 22, 23], start, end), [19, 20, 21, 22]);
    }

    #[test]
    fn test_selection_window_inside_last_shard() {
        // Entirely inside the open-ended last shard; its predecessor rides
        // along for boundary-straddling readings.
        let start = Utc.with_ymd_and_hms(2025, 11, 22, 6, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 11, 22, 12, 0, 0).unwrap();
        assert_eq!(selected_days(&[20, 21, 22], start, end), [21, 22]);
    }

    #[test]
    fn test_selection_window_before_all_shards() {
        let start = Utc.with_ymd_and_hms(2025, 10, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 10, 2, 0, 0, 0).unwrap();
        assert_eq!(selected_days(&[20, 21, 22], start, end), [] as [u32; 0]);
    }

    #[test]
    fn test_selection_window_after_all_shards() {
        // Everything is in the past relative to the window start, but the
        // last shard is open-ended and still selected, and its predecessor
        // rides along.
        let start = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 12, 2, 0, 0, 0).unwrap();
        assert_eq!(selected_days(&[20, 21, 22], start, end), [21, 22]);
    }

    #[test]
    fn test_selection_single_shard() {
        let start = day_start(21);
        let end = day_start(22);
        assert_eq!(selected_days(&[20], start, end), [20]);
    }
}
