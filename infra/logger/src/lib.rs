//! # Logger
//!
//! Installs the process-wide `tracing` subscriber from the `[logging]` section of the
//! platform config.
//!
//! A [`LoggingConfig`] is first resolved into a [`LogPlan`]: the level, optional
//! `RUST_LOG`-style directives, and the sinks to write to. Console output is compact and
//! colored. File output rotates daily under the configured directory and may be JSON.
//!
//! ## Example
//!
//! ```rust
//! # use cgate_domain::config::LoggingConfig;
//! # use cgate_logger::Logger;
//! let config = LoggingConfig {
//!     level: "debug".to_owned(),
//!     env_filter: Some("cgate_content_gating=trace".to_owned()),
//!     ..LoggingConfig::default()
//! };
//! let _logger = Logger::from_config("gating", &config).unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;

use cgate_domain::config::LoggingConfig;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Rotated files kept per log directory.
const MAX_LOG_FILES: usize = 14;
const LOG_FILE_SUFFIX: &str = "log";

/// Rolling file output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSink {
    pub dir: PathBuf,
    pub json: bool,
}

/// A validated logging setup, ready to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPlan {
    /// Prefix of rotated file names, e.g. `gating.2024-06-01.log`.
    pub name: String,
    pub level: LevelFilter,
    pub directives: Option<String>,
    pub console: bool,
    pub file: Option<FileSink>,
}

impl LogPlan {
    /// Resolves `config` into a plan without touching global state.
    ///
    /// # Errors
    /// Returns [`LoggerError::InvalidConfiguration`] for an empty name, an unknown level,
    /// malformed directives, JSON output without a file path, or no sink at all.
    pub fn resolve(name: &str, config: &LoggingConfig) -> Result<Self, LoggerError> {
        if name.trim().is_empty() {
            return Err(invalid("Logger name cannot be empty"));
        }

        let level = config
            .level
            .parse::<LevelFilter>()
            .map_err(|e| invalid(format!("Invalid log level '{}': {e}", config.level)))?;

        let file = match (&config.path, config.json) {
            (Some(dir), json) => Some(FileSink { dir: dir.clone(), json }),
            (None, true) => return Err(invalid("JSON output requires a log file path")),
            (None, false) => None,
        };

        if !config.console && file.is_none() {
            return Err(invalid("No log output enabled; set console or path"));
        }

        let plan = Self {
            name: name.to_owned(),
            level,
            directives: config.env_filter.clone(),
            console: config.console,
            file,
        };
        plan.env_filter()?;
        Ok(plan)
    }

    /// Configured directives take precedence; otherwise `RUST_LOG` is honored.
    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.directives {
            Some(directives) => builder
                .parse(directives)
                .map_err(|e| invalid(format!("Invalid env filter '{directives}': {e}"))),
            None => Ok(builder.from_env_lossy()),
        }
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    /// * [`LoggerError::Io`] if the log directory cannot be created.
    /// * [`LoggerError::Appender`] if the rolling appender cannot be built.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn install(self) -> Result<Logger, LoggerError> {
        let filter = self.env_filter()?;
        let mut layers = Vec::new();

        if self.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = match &self.file {
            Some(sink) => {
                fs::create_dir_all(&sink.dir)
                    .context(format!("Creating log directory {}", sink.dir.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(Rotation::DAILY)
                    .filename_prefix(&self.name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(MAX_LOG_FILES)
                    .build(&sink.dir)?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if sink.json { file_layer.json().boxed() } else { file_layer.boxed() });
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;
        tracing::debug!(logger = %self.name, level = %self.level, "Logging initialized");

        Ok(Logger { guard })
    }
}

/// Keeps the file writer alive; pending lines are flushed when it is dropped.
#[must_use = "Dropping this handle stops file logging."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Resolves `config` and installs the global subscriber.
    ///
    /// # Errors
    /// Any error of [`LogPlan::resolve`] or [`LogPlan::install`].
    pub fn from_config(name: &str, config: &LoggingConfig) -> Result<Self, LoggerError> {
        LogPlan::resolve(name, config)?.install()
    }

    /// The file writer guard, present only when file output is enabled.
    #[must_use]
    pub const fn guard(&self) -> Option<&WorkerGuard> {
        self.guard.as_ref()
    }
}

fn invalid(message: impl Into<std::borrow::Cow<'static, str>>) -> LoggerError {
    LoggerError::InvalidConfiguration { message: message.into(), context: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn console_only_plan() {
        let plan = LogPlan::resolve("gating", &LoggingConfig::default()).unwrap();
        assert_eq!(plan.level, LevelFilter::INFO);
        assert!(plan.console);
        assert!(plan.file.is_none());
        assert!(plan.directives.is_none());
    }

    #[test]
    fn file_plan_carries_json_switch() {
        let config = LoggingConfig {
            level: "warn".to_owned(),
            console: false,
            json: true,
            path: Some("/var/log/gating".into()),
            env_filter: Some("cgate_kernel=debug".to_owned()),
        };
        let plan = LogPlan::resolve("gating", &config).unwrap();

        assert_eq!(plan.level, LevelFilter::WARN);
        assert!(!plan.console);
        let sink = plan.file.unwrap();
        assert_eq!(sink.dir, Path::new("/var/log/gating"));
        assert!(sink.json);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let cases = [
            ("gating", LoggingConfig { level: "loud".to_owned(), ..LoggingConfig::default() }, "Invalid log level"),
            ("gating", LoggingConfig { json: true, ..LoggingConfig::default() }, "requires a log file path"),
            ("gating", LoggingConfig { console: false, ..LoggingConfig::default() }, "No log output"),
            (
                "gating",
                LoggingConfig { env_filter: Some("cgate_kernel=verbose".to_owned()), ..LoggingConfig::default() },
                "Invalid env filter",
            ),
            ("  ", LoggingConfig::default(), "name cannot be empty"),
        ];

        for (name, config, expected) in cases {
            let err = LogPlan::resolve(name, &config).unwrap_err();
            assert_eq!(err.kind(), "invalid_configuration");
            assert!(err.to_string().contains(expected), "{err}");
        }
    }
}
