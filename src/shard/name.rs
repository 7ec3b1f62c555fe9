//! Shard file naming
//!
//! Shard files are named `sensor_YYYYMMDD_HHMMSS.json`, encoding the instant
//! the collection cycle started. The decode is strict and fixed-width; any
//! file not matching the pattern is simply not a shard.

use chrono::{DateTime, TimeZone, Utc};

use crate::shard::{ShardError, ShardResult, SHARD_PREFIX, SHARD_SUFFIX};

/// Create a shard file name from a cycle start instant
pub fn shard_file_name(created_at: &DateTime<Utc>) -> String {
    format!(
        "{}{}{}",
        SHARD_PREFIX,
        created_at.format("%Y%m%d_%H%M%S"),
        SHARD_SUFFIX
    )
}

/// Parse a shard file name back into its cycle start instant
pub fn parse_shard_file_name(name: &str) -> ShardResult<DateTime<Utc>> {
    let stem = name
        .strip_prefix(SHARD_PREFIX)
        .and_then(|rest| rest.strip_suffix(SHARD_SUFFIX))
        .ok_or_else(|| ShardError::invalid_name(name))?;

    // Expect exactly "YYYYMMDD_HHMMSS"
    let bytes = stem.as_bytes();
    if bytes.len() != 15 || bytes[8] != b'_' {
        return Err(ShardError::invalid_name(name));
    }
    if !bytes[..8].iter().chain(&bytes[9..]).all(u8::is_ascii_digit) {
        return Err(ShardError::invalid_name(name));
    }

    let field = |range: std::ops::Range<usize>| -> u32 {
        // Digits only at this point, so the parse cannot fail
        stem[range].parse().unwrap_or(0)
    };

    let year = field(0..4) as i32;
    let month = field(4..6);
    let day = field(6..8);
    let hour = field(9..11);
    let minute = field(11..13);
    let second = field(13..15);

    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .ok_or_else(|| {
            ShardError::timestamp(format!("shard name {} encodes an invalid instant", name))
        })
}
