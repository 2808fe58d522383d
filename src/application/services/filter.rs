//! Field reduction for fetched MVP records.

use serde_json::{Map, Value};

use crate::domain::{Mvp, SpawnPoint};

/// What the extraction pipeline should keep of each record.
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Apply field reduction at all.
    pub use_filter: bool,
    /// Stat keys to retain; `None` retains every stat.
    pub desired_stats: Option<Vec<String>>,
    /// Drop records whose (post-filter) spawn list is empty.
    pub ignore_empty_maps: bool,
}

/// Pure record filter. Safe to apply any number of times.
#[derive(Debug, Clone, Default)]
pub struct MvpFilter {
    desired_stats: Option<Vec<String>>,
}

impl MvpFilter {
    pub fn new(desired_stats: Option<Vec<String>>) -> Self {
        Self { desired_stats }
    }

    /// Keep only spawn points with a periodic respawn.
    pub fn filter_spawns(&self, spawns: Vec<SpawnPoint>) -> Vec<SpawnPoint> {
        spawns
            .into_iter()
            .filter(|spawn| spawn.respawn_time != 0)
            .collect()
    }

    /// Project stats onto the desired keys, preserving source key order.
    pub fn filter_stats(&self, stats: Map<String, Value>) -> Map<String, Value> {
        match &self.desired_stats {
            None => stats,
            Some(desired) => stats
                .into_iter()
                .filter(|(key, _)| desired.iter().any(|want| want == key))
                .collect(),
        }
    }

    /// Reduce one record. Identity fields pass through unchanged.
    pub fn filter_mvp(&self, mvp: Mvp) -> Mvp {
        Mvp {
            id: mvp.id,
            name: mvp.name,
            dbname: mvp.dbname,
            maps: self.filter_spawns(mvp.maps),
            stats: self.filter_stats(mvp.stats),
        }
    }
}
