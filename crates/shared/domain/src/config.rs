use crate::features::FeatureFlags;
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level gating configuration shared across slices.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfigInner {
    pub flags: FlagsConfig,
    pub duration: DurationConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    #[serde(flatten, default)]
    inner: Arc<PlatformConfigInner>,
}

impl Deref for PlatformConfig {
    type Target = PlatformConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for PlatformConfig {
    fn deref_mut(&mut self) -> &mut PlatformConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Feature switches as they appear in config files.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FlagsConfig {
    pub content_type_gating: bool,
    pub content_type_gating_studio_ui: bool,
}

impl FlagsConfig {
    #[must_use]
    pub fn feature_flags(&self) -> FeatureFlags {
        let mut flags = FeatureFlags::empty();
        flags.set(FeatureFlags::CONTENT_TYPE_GATING, self.content_type_gating);
        flags.set(FeatureFlags::CONTENT_TYPE_GATING_STUDIO_UI, self.content_type_gating_studio_ui);
        flags
    }
}

/// Bounds on how long an audit learner keeps access to a course.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct DurationConfig {
    pub min_weeks: u32,
    pub max_weeks: u32,
}

/// Logging sink configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub console: bool,
    pub json: bool,
    pub path: Option<PathBuf>,
    pub env_filter: Option<String>,
}

// --- Default ---

impl Default for DurationConfig {
    fn default() -> Self {
        Self { min_weeks: 4, max_weeks: 12 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), console: true, json: false, path: None, env_filter: None }
    }
}
