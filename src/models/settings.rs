use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::models::capacity::Region;

const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;
const DEFAULT_CACHE_CAPACITY: usize = 8;
const DEFAULT_CACHE_TTL_SECONDS: i64 = 30;
pub const DEFAULT_LOG_DIRECTIVES: &str = "info,app::recommendation=debug";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Zone used to decide what "today" is.
    pub timezone: Tz,
    pub default_region: Region,
    pub snapshot_cache: SnapshotCacheSettings,
    pub logging: LoggingSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE,
            default_region: Region::All,
            snapshot_cache: SnapshotCacheSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotCacheSettings {
    pub capacity: usize,
    /// Zero disables caching.
    pub ttl_seconds: i64,
}

impl Default for SnapshotCacheSettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            ttl_seconds: DEFAULT_CACHE_TTL_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    pub directives: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directives: DEFAULT_LOG_DIRECTIVES.to_string(),
            log_dir: None,
        }
    }
}
