use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chrono_tz::Tz;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::capacity::Region;
use crate::models::settings::EngineSettings;

const ENV_TIMEZONE: &str = "SLOTSTACK_TIMEZONE";

#[derive(Debug, Default, Clone)]
pub struct SettingsUpdateInput {
    pub timezone: Option<String>,
    pub default_region: Option<String>,
    pub cache_capacity: Option<usize>,
    pub cache_ttl_seconds: Option<i64>,
    pub log_directives: Option<String>,
    pub log_dir: Option<Option<String>>,
}

pub struct SettingsService {
    path: Option<PathBuf>,
    current: RwLock<EngineSettings>,
}

impl SettingsService {
    pub fn new(settings: EngineSettings) -> AppResult<Self> {
        validate(&settings)?;
        Ok(Self {
            path: None,
            current: RwLock::new(settings),
        })
    }

    /// Loads YAML settings from `path`; a missing file yields the defaults.
    pub fn from_path(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut settings = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            parse_settings(&raw)?
        } else {
            warn!(
                target: "app::settings",
                path = %path.display(),
                "settings file not found, using defaults"
            );
            EngineSettings::default()
        };
        apply_env_overrides(&mut settings)?;
        validate(&settings)?;
        info!(target: "app::settings", path = %path.display(), timezone = %settings.timezone, "settings loaded");
        Ok(Self {
            path: Some(path),
            current: RwLock::new(settings),
        })
    }

    pub fn from_yaml(raw: &str) -> AppResult<Self> {
        Self::new(parse_settings(raw)?)
    }

    pub fn get(&self) -> AppResult<EngineSettings> {
        self.current
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| AppError::other("settings lock poisoned"))
    }

    pub fn update(&self, input: SettingsUpdateInput) -> AppResult<EngineSettings> {
        let mut next = self.get()?;

        if let Some(timezone) = input.timezone.as_deref() {
            next.timezone = parse_timezone(timezone)?;
        }
        if let Some(region) = input.default_region.as_deref() {
            next.default_region = Region::try_from(region).map_err(AppError::validation)?;
        }
        if let Some(capacity) = input.cache_capacity {
            next.snapshot_cache.capacity = capacity;
        }
        if let Some(ttl) = input.cache_ttl_seconds {
            next.snapshot_cache.ttl_seconds = ttl;
        }
        if let Some(directives) = input.log_directives {
            next.logging.directives = directives.trim().to_string();
        }
        if let Some(log_dir) = input.log_dir {
            next.logging.log_dir = log_dir.filter(|dir| !dir.trim().is_empty());
        }

        validate(&next)?;

        if let Some(path) = &self.path {
            std::fs::write(path, serde_yaml::to_string(&next)?)?;
        }

        let mut guard = self
            .current
            .write()
            .map_err(|_| AppError::other("settings lock poisoned"))?;
        *guard = next.clone();
        Ok(next)
    }
}

pub fn parse_settings(raw: &str) -> AppResult<EngineSettings> {
    if raw.trim().is_empty() {
        return Ok(EngineSettings::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

fn parse_timezone(value: &str) -> AppResult<Tz> {
    value
        .trim()
        .parse::<Tz>()
        .map_err(|err| AppError::validation(format!("unknown timezone `{value}`: {err}")))
}

fn apply_env_overrides(settings: &mut EngineSettings) -> AppResult<()> {
    if let Ok(raw) = std::env::var(ENV_TIMEZONE) {
        settings.timezone = parse_timezone(&raw)?;
    }
    Ok(())
}

fn validate(settings: &EngineSettings) -> AppResult<()> {
    if settings.snapshot_cache.capacity == 0 {
        return Err(AppError::config("snapshotCache.capacity must be at least 1"));
    }
    if settings.snapshot_cache.ttl_seconds < 0 {
        return Err(AppError::config("snapshotCache.ttlSeconds must not be negative"));
    }
    if settings.logging.directives.is_empty() {
        return Err(AppError::config("logging.directives must not be empty"));
    }
    Ok(())
}
