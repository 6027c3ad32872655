//! Stacked duration limit configuration.
//!
//! Records are written per [`StackedScope`]. Resolving a course walks its scopes from the most
//! specific to the global one and takes, field by field, the first value that is set.

use crate::error::DurationLimitError;
use cgate_domain::course::CourseKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Where a configuration record applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "key", rename_all = "snake_case")]
pub enum StackedScope {
    Global,
    Site(String),
    Org(String),
    Course(CourseKey),
}

impl fmt::Display for StackedScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Site(site) => write!(f, "site:{site}"),
            Self::Org(org) => write!(f, "org:{org}"),
            Self::Course(key) => write!(f, "course:{key}"),
        }
    }
}

/// One administrator-written record. Unset fields inherit from the enclosing scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationLimitConfig {
    pub enabled: Option<bool>,
    /// Enrollments created on or after this date (UTC) are affected.
    pub enabled_as_of: Option<NaiveDate>,
}

impl DurationLimitConfig {
    #[must_use]
    pub const fn enabled_as_of(date: NaiveDate) -> Self {
        Self { enabled: Some(true), enabled_as_of: Some(date) }
    }

    #[must_use]
    pub const fn disabled() -> Self {
        Self { enabled: Some(false), enabled_as_of: None }
    }

    /// # Errors
    /// Returns [`DurationLimitError::InvalidConfig`] if the record is enabled without a date.
    pub fn validate(&self) -> Result<(), DurationLimitError> {
        if matches!(self.enabled, Some(true)) && self.enabled_as_of.is_none() {
            return Err(DurationLimitError::InvalidConfig {
                message: "enabled_as_of must be set when enabled is true".into(),
                context: None,
            });
        }
        Ok(())
    }
}

/// The configuration in force for one course after stacking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectiveDurationLimit {
    pub enabled: Option<bool>,
    pub enabled_as_of: Option<NaiveDate>,
}

impl EffectiveDurationLimit {
    /// Stacks `layers`, ordered from the most specific scope outwards.
    pub fn stack<'a>(layers: impl IntoIterator<Item = &'a DurationLimitConfig>) -> Self {
        layers.into_iter().fold(Self::default(), |acc, layer| Self {
            enabled: acc.enabled.or(layer.enabled),
            enabled_as_of: acc.enabled_as_of.or(layer.enabled_as_of),
        })
    }

    /// Whether limits apply to enrollments created on `target`.
    ///
    /// An enabled configuration without a start date slipped past validation; it is treated
    /// as not yet enabled.
    #[must_use]
    pub fn enabled_as_of_date(&self, target: NaiveDate) -> bool {
        match (self.enabled, self.enabled_as_of) {
            (Some(true), Some(as_of)) => as_of <= target,
            (Some(true), None) => {
                warn!("Duration limits enabled without an enabled_as_of date, treating as disabled");
                false
            },
            _ => false,
        }
    }
}
