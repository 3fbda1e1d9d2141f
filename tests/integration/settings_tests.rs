use slotstack_lib::models::capacity::Region;
use slotstack_lib::models::settings::EngineSettings;
use slotstack_lib::services::settings_service::{SettingsService, SettingsUpdateInput};
use slotstack_lib::services::week_cache::WeekCache;
use slotstack_lib::AppResult;
use tempfile::tempdir;

#[test]
fn loads_yaml_file_and_keeps_unset_defaults() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("engine.yaml");
    std::fs::write(
        &path,
        "timezone: America/Chicago\ndefaultRegion: south\nsnapshotCache:\n  ttlSeconds: 0\n",
    )?;

    let service = SettingsService::from_path(&path)?;
    let settings = service.get()?;
    assert_eq!(settings.timezone, chrono_tz::America::Chicago);
    assert_eq!(settings.default_region, Region::South);
    assert_eq!(settings.snapshot_cache.ttl_seconds, 0);
    assert_eq!(settings.snapshot_cache.capacity, 8);
    assert!(!WeekCache::new(&settings.snapshot_cache)?.is_enabled());
    Ok(())
}

#[test]
fn missing_file_falls_back_to_defaults() -> AppResult<()> {
    let dir = tempdir()?;
    let service = SettingsService::from_path(dir.path().join("absent.yaml"))?;
    assert_eq!(service.get()?, EngineSettings::default());
    Ok(())
}

#[test]
fn update_persists_and_reloads() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("engine.yaml");
    let service = SettingsService::from_path(&path)?;

    let updated = service.update(SettingsUpdateInput {
        default_region: Some("Central".into()),
        cache_capacity: Some(2),
        log_dir: Some(Some("  ".into())),
        ..Default::default()
    })?;
    assert_eq!(updated.default_region, Region::Central);
    assert_eq!(updated.logging.log_dir, None);
    assert!(path.exists());

    let reloaded = SettingsService::from_path(&path)?.get()?;
    assert_eq!(reloaded, updated);
    Ok(())
}

#[test]
fn rejected_update_leaves_file_and_state_untouched() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("engine.yaml");
    let service = SettingsService::from_path(&path)?;

    let err = service
        .update(SettingsUpdateInput {
            timezone: Some("Mars/Olympus".into()),
            ..Default::default()
        })
        .expect_err("unknown timezone");
    assert!(err.is_validation());

    assert!(service
        .update(SettingsUpdateInput {
            cache_capacity: Some(0),
            ..Default::default()
        })
        .is_err());

    assert!(!path.exists());
    assert_eq!(service.get()?, EngineSettings::default());
    Ok(())
}
