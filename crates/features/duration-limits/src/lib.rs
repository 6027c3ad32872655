//! Course duration limits feature slice.
//!
//! Audit learners lose access to a course some weeks after its content became available to
//! them. Whether that limit applies is decided per enrollment from a stacked configuration
//! (course, org, site, global) and the date the enrollment was created.

mod config;
mod error;
mod expiration;
mod policy;
mod store;

pub use crate::config::{DurationLimitConfig, EffectiveDurationLimit, StackedScope};
pub use crate::error::{DurationLimitError, DurationLimitErrorExt};
pub use crate::expiration::{
    AuditExpired, CourseAccess, EXPIRATION_DATE_FORMAT, check_course_expired, expiration_notice,
    user_course_expiration_date,
};
pub use crate::policy::{DurationLimitPolicy, EnrollmentTarget};
pub use crate::store::{DurationLimitResolver, InMemoryDurationLimits};

use cgate_kernel::context::GatingContext;
use cgate_kernel::domain::config::DurationConfig;
use cgate_kernel::domain::course::{Course, User};
use cgate_kernel::domain::registry::InitializedSlice;
use cgate_kernel::state::GatingState;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Duration limits feature state
#[cgate_derive::cgate_slice]
pub struct DurationLimits {
    pub policy: DurationLimitPolicy,
    pub bounds: DurationConfig,
}

impl DurationLimits {
    /// Fetches the slice from an initialized gating state.
    ///
    /// # Errors
    /// Returns [`DurationLimitError::State`] if the slice was not registered.
    pub fn from_state(state: &GatingState) -> Result<&Self, DurationLimitError> {
        state.try_get_slice::<Self>().context("Duration limits slice")
    }

    #[must_use]
    pub fn expiration_date(
        &self,
        ctx: &GatingContext,
        user: &User,
        course: &Course,
    ) -> Option<DateTime<Utc>> {
        user_course_expiration_date(ctx, &self.bounds, user, course)
    }

    #[must_use]
    pub fn check_course_expired(
        &self,
        ctx: &GatingContext,
        user: &User,
        course: &Course,
        now: DateTime<Utc>,
    ) -> CourseAccess {
        check_course_expired(&self.policy, ctx, &self.bounds, user, course, now)
    }

    #[must_use]
    pub fn expiration_notice(&self, ctx: &GatingContext, user: &User, course: &Course) -> Option<String> {
        expiration_notice(&self.policy, ctx, &self.bounds, user, course)
    }
}

/// Initialize the duration limits feature.
///
/// # Errors
/// Returns [`DurationLimitError::InvalidConfig`] if the week bounds are empty or inverted.
pub fn init(
    resolver: Arc<dyn DurationLimitResolver>,
    bounds: DurationConfig,
) -> Result<InitializedSlice, DurationLimitError> {
    if bounds.min_weeks == 0 || bounds.min_weeks > bounds.max_weeks {
        return Err(DurationLimitError::InvalidConfig {
            message: format!(
                "duration bounds must satisfy 0 < min_weeks <= max_weeks, got {}..={}",
                bounds.min_weeks, bounds.max_weeks
            )
            .into(),
            context: None,
        });
    }

    let slice = DurationLimits::new(DurationLimitsInner {
        policy: DurationLimitPolicy::new(resolver),
        bounds,
    });
    tracing::info!(
        min_weeks = bounds.min_weeks,
        max_weeks = bounds.max_weeks,
        "Duration limits slice initialized"
    );

    Ok(InitializedSlice::new(slice))
}
