use std::collections::HashSet;

use crate::sensor::{ReadingRow, Registry};

#[derive(Debug, Default)]
pub struct Snapshot {
    pub latest: Vec<ReadingRow>,

    pub seen: usize,

    /// Registered sensors absent from a snapshot that hit the row limit.
    pub possibly_truncated: Vec<String>,
}

/// Reduces rows ordered by timestamp descending to the newest row per sensor.
///
/// This relies on the order of `rows`; nothing here compares timestamps.
pub fn latest_per_sensor(rows: Vec<ReadingRow>, registry: &Registry, limit: usize) -> Snapshot {
    let hit_limit = rows.len() >= limit;
    let mut seen = HashSet::new();
    let mut latest = Vec::new();

    for row in rows {
        if seen.contains(&row.sensor) {
            continue;
        }
        seen.insert(row.sensor.clone());
        latest.push(row);
    }

    let possibly_truncated = if hit_limit {
        registry
            .iter()
            .filter(|s| !seen.contains(&s.id))
            .map(|s| s.id.clone())
            .collect()
    } else {
        Vec::new()
    };

    Snapshot {
        latest,
        seen: seen.len(),
        possibly_truncated,
    }
}
