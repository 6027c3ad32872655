use cgate_domain::config::{DurationConfig, LoggingConfig, PlatformConfig};
use cgate_domain::features::FeatureFlags;
use serde_json::json;

#[test]
fn config_defaults_are_sane() {
    let duration = DurationConfig::default();
    assert_eq!(duration.min_weeks, 4);
    assert_eq!(duration.max_weeks, 12);

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.console);
    assert!(logging.path.is_none());

    let cfg = PlatformConfig::default();
    assert_eq!(cfg.flags.feature_flags(), FeatureFlags::empty());
}

#[test]
fn platform_config_deserializes() {
    let raw = json!({
        "flags": { "content_type_gating": true },
        "duration": { "min_weeks": 2, "max_weeks": 8 },
        "logging": { "level": "debug", "json": true, "path": "/tmp/logs" }
    });

    let cfg: PlatformConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.flags.feature_flags(), FeatureFlags::CONTENT_TYPE_GATING);
    assert_eq!(cfg.duration.max_weeks, 8);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.logging.path, Some(std::path::PathBuf::from("/tmp/logs")));
}

#[test]
fn config_can_be_patched_through_deref_mut() {
    let mut cfg = PlatformConfig::default();
    let shared = cfg.clone();
    cfg.flags.content_type_gating_studio_ui = true;

    assert!(cfg.flags.feature_flags().partition_enabled());
    assert!(!cfg.flags.feature_flags().gating_enabled());
    assert!(!shared.flags.content_type_gating_studio_ui, "clone must not observe the patch");
}

#[test]
fn feature_flags_parse_from_names() {
    assert_eq!(FeatureFlags::from("content_type_gating"), FeatureFlags::CONTENT_TYPE_GATING);
    assert_eq!(FeatureFlags::from("*"), FeatureFlags::ALL);
    assert_eq!(FeatureFlags::from("waffle"), FeatureFlags::empty());
    assert!(!FeatureFlags::empty().partition_enabled());
}
