use cgate_kernel::config::{ConfigError, load_config};
use cgate_kernel::domain::config::PlatformConfig;
use std::fs;
use tempfile::tempdir;

#[test]
fn loads_platform_config_from_toml() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let path = dir.path().join("gating.toml");
    fs::write(
        &path,
        r#"
[flags]
content_type_gating = true

[duration]
min_weeks = 3
max_weeks = 10
"#,
    )?;

    let cfg: PlatformConfig = load_config(Some(&path))?;
    assert!(cfg.flags.feature_flags().gating_enabled());
    assert_eq!(cfg.duration.min_weeks, 3);
    assert_eq!(cfg.logging.level, "info");
    Ok(())
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_config::<PlatformConfig>(Some(dir.path().join("absent.toml"))).unwrap_err();
    assert!(matches!(err, ConfigError::Config { .. }));
    assert_eq!(err.kind(), "config");
}
