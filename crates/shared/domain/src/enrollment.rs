use crate::constants::{UNSELECTABLE_MODES, VERIFIED_MODES};
use crate::course::CourseKey;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable (or free) track offered by a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseMode {
    pub slug: String,
    pub min_price: Decimal,
    pub sku: Option<String>,
    /// Past this instant the mode can no longer be chosen.
    pub expiration: Option<DateTime<Utc>>,
}

impl CourseMode {
    pub fn new(slug: impl Into<String>, min_price: Decimal) -> Self {
        Self { slug: slug.into(), min_price, sku: None, expiration: None }
    }

    #[must_use]
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    #[must_use]
    pub const fn with_expiration(mut self, expiration: DateTime<Utc>) -> Self {
        self.expiration = Some(expiration);
        self
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        VERIFIED_MODES.contains(&self.slug.as_str())
    }

    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !UNSELECTABLE_MODES.contains(&self.slug.as_str())
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiration.is_some_and(|exp| exp <= now)
    }

    /// Price rendered with two fractional digits (e.g. `100.00`).
    #[must_use]
    pub fn display_price(&self) -> String {
        format!("{:.2}", self.min_price)
    }
}

/// A learner's enrollment in a course, as read from the enrollment store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub user_id: u64,
    pub course_key: CourseKey,
    pub mode: String,
    pub is_active: bool,
    pub created: DateTime<Utc>,
    /// Personalized schedule start, when one was assigned.
    pub schedule_start: Option<DateTime<Utc>>,
}

impl Enrollment {
    pub fn new(
        user_id: u64,
        course_key: CourseKey,
        mode: impl Into<String>,
        created: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            course_key,
            mode: mode.into(),
            is_active: true,
            created,
            schedule_start: None,
        }
    }

    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    #[must_use]
    pub const fn with_schedule_start(mut self, start: DateTime<Utc>) -> Self {
        self.schedule_start = Some(start);
        self
    }
}
