use crate::power::error::PowerDataError;
use crate::power::loader::PowerLoader;
use crate::types::location::LatLon;
use crate::types::raw_series::RawSeries;
use chrono::NaiveDate;
use std::collections::{hash_map::Entry, HashMap};
use std::sync::Arc;
use tokio::sync::Mutex;

type SnapshotKey = ((i64, i64), NaiveDate, NaiveDate);

/// Keeps every fetched store in memory as a shared immutable snapshot.
pub struct SnapshotFetcher {
    loader: PowerLoader,
    snapshot_cache: Mutex<HashMap<SnapshotKey, Arc<RawSeries>>>,
}

impl SnapshotFetcher {
    pub fn new(loader: PowerLoader) -> Self {
        Self {
            loader,
            snapshot_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn loader(&self) -> &PowerLoader {
        &self.loader
    }

    pub async fn get_snapshot(
        &self,
        coordinate: LatLon,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Arc<RawSeries>, PowerDataError> {
        let key = (coordinate.cache_key(), start, end);

        {
            let cache = self.snapshot_cache.lock().await;
            if let Some(snapshot) = cache.get(&key) {
                return Ok(Arc::clone(snapshot));
            }
        }

        // loaded without holding the lock; two callers may race on the same key
        let loaded = Arc::new(self.loader.fetch(coordinate, start, end).await?);

        let mut cache = self.snapshot_cache.lock().await;
        match cache.entry(key) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                entry.insert(Arc::clone(&loaded));
                Ok(loaded)
            }
        }
    }

    /// Number of snapshots currently held.
    pub async fn cached_count(&self) -> usize {
        self.snapshot_cache.lock().await.len()
    }

    pub async fn clear(&self) {
        self.snapshot_cache.lock().await.clear();
    }
}
