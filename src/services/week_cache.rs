use std::num::NonZeroUsize;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::capacity::Region;
use crate::models::settings::SnapshotCacheSettings;
use crate::models::week::{WeekId, WeekSnapshot};

/// Short-lived memo of whole week snapshots. Events and capacity are only ever
/// stored and returned together.
pub struct WeekCache {
    entries: Mutex<LruCache<(WeekId, Region), CachedSnapshot>>,
    ttl: Duration,
}

struct CachedSnapshot {
    snapshot: WeekSnapshot,
    stored_at: DateTime<Utc>,
}

impl WeekCache {
    pub fn new(settings: &SnapshotCacheSettings) -> AppResult<Self> {
        let capacity = NonZeroUsize::new(settings.capacity)
            .ok_or_else(|| AppError::config("snapshot cache capacity must be at least 1"))?;
        Ok(Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: Duration::seconds(settings.ttl_seconds.max(0)),
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.ttl > Duration::zero()
    }

    pub fn get(&self, week: &WeekId, region: Region) -> Option<WeekSnapshot> {
        self.get_at(week, region, Utc::now())
    }

    pub fn put(&self, snapshot: WeekSnapshot) {
        self.put_at(snapshot, Utc::now());
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn get_at(&self, week: &WeekId, region: Region, now: DateTime<Utc>) -> Option<WeekSnapshot> {
        if !self.is_enabled() {
            return None;
        }
        let mut entries = self.entries.lock().ok()?;
        let key = (week.clone(), region);
        let expired = match entries.get(&key) {
            Some(cached) if now - cached.stored_at < self.ttl => {
                debug!(target: "app::cache", %week, %region, "snapshot cache hit");
                return Some(cached.snapshot.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(&key);
            debug!(target: "app::cache", %week, %region, "evicted expired snapshot");
        }
        None
    }

    fn put_at(&self, snapshot: WeekSnapshot, now: DateTime<Utc>) {
        if !self.is_enabled() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            let key = (snapshot.week.id.clone(), snapshot.region);
            entries.put(
                key,
                CachedSnapshot {
                    snapshot,
                    stored_at: now,
                },
            );
        }
    }
}
