use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Environment prefix for configuration overrides.
pub const ENV_PREFIX: &str = "CGATE";

/// Custom error type for config loading.
#[cgate_derive::cgate_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads configuration from a file layered with environment overrides.
///
/// 1. **Base File**: settings from a file (e.g., `gating.toml`); defaults to `"gating"`.
/// 2. **Environment Overrides**: variables prefixed with `CGATE__`. Nested structures use
///    double underscores (e.g., `CGATE__FLAGS__CONTENT_TYPE_GATING=true` maps to
///    `flags.content_type_gating`).
///
/// # Errors
/// Returns [`ConfigError::Config`] if the file is missing or its content does not match `T`.
///
/// # Example
/// ```rust
/// use cgate_kernel::config::load_config;
/// use cgate_kernel::domain::config::PlatformConfig;
///
/// let cfg: PlatformConfig = load_config(Some("config/local")).unwrap_or_default();
/// assert_eq!(cfg.duration.min_weeks, 4);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("gating"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(true))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), "Loading gating config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
