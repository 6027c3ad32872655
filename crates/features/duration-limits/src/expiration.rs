//! Audit access expiry.
//!
//! Audit learners keep access to a course for the expected run length reported by the catalog,
//! bounded by the configured minimum and maximum number of weeks, counted from the moment the
//! content became available to them.

use crate::policy::{DurationLimitPolicy, EnrollmentTarget};
use cgate_domain::config::DurationConfig;
use cgate_domain::constants::AUDIT;
use cgate_domain::course::{Course, User};
use cgate_kernel::context::GatingContext;
use chrono::{DateTime, TimeDelta, Utc};

/// Date format of learner-facing expiry messages, e.g. `Mar 05, 2024`.
pub const EXPIRATION_DATE_FORMAT: &str = "%b %d, %Y";

/// Outcome of an expiry check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CourseAccess {
    Granted,
    AuditExpired(AuditExpired),
}

impl CourseAccess {
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// Access denied because the audit period is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditExpired {
    pub expiration_date: DateTime<Utc>,
    pub developer_message: String,
    pub user_message: String,
    pub additional_context_user_message: String,
}

impl AuditExpired {
    pub const ERROR_CODE: &'static str = "audit_expired";

    fn new(user: &User, course: &Course, expiration_date: DateTime<Utc>) -> Self {
        let date = expiration_date.format(EXPIRATION_DATE_FORMAT).to_string();
        let additional_context_user_message = if course.display_name.is_empty() {
            format!("Access to the course you were looking for expired on {date}")
        } else {
            format!("Access to {} expired on {date}", course.display_name)
        };

        Self {
            expiration_date,
            developer_message: format!(
                "User {} had access to {} until {expiration_date}",
                user.username, course.key
            ),
            user_message: format!("Access expired on {date}"),
            additional_context_user_message,
        }
    }

    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        Self::ERROR_CODE
    }
}

/// When the audit access of `user` to `course` ends; `None` if it never does.
///
/// Only audit enrollments expire.
#[must_use]
pub fn user_course_expiration_date(
    ctx: &GatingContext,
    bounds: &DurationConfig,
    user: &User,
    course: &Course,
) -> Option<DateTime<Utc>> {
    let enrollment = ctx.enrollments.enrollment(user, &course.key)?;
    if enrollment.mode != AUDIT {
        return None;
    }

    let available_from =
        enrollment.schedule_start.unwrap_or_else(|| enrollment.created.max(course.start));

    let expected_weeks = ctx
        .catalog
        .weeks_to_complete(&course.key)
        .filter(|weeks| *weeks > 0)
        .unwrap_or(bounds.min_weeks);
    let weeks = bounds.max_weeks.min(expected_weeks).max(bounds.min_weeks);

    available_from.checked_add_signed(TimeDelta::weeks(i64::from(weeks)))
}

/// Checks whether the audit access of `user` to `course` has run out at `now`.
#[must_use]
pub fn check_course_expired(
    policy: &DurationLimitPolicy,
    ctx: &GatingContext,
    bounds: &DurationConfig,
    user: &User,
    course: &Course,
    now: DateTime<Utc>,
) -> CourseAccess {
    if !policy.enabled_for_target(ctx, EnrollmentTarget::UserCourse(user, &course.key)) {
        return CourseAccess::Granted;
    }

    match user_course_expiration_date(ctx, bounds, user, course) {
        Some(expiration) if now > expiration => {
            tracing::debug!(
                user = %user.username,
                course = %course.key,
                %expiration,
                "Audit access expired"
            );
            CourseAccess::AuditExpired(AuditExpired::new(user, course, expiration))
        },
        _ => CourseAccess::Granted,
    }
}

/// Banner text announcing when audit access ends, if limits apply and access expires.
#[must_use]
pub fn expiration_notice(
    policy: &DurationLimitPolicy,
    ctx: &GatingContext,
    bounds: &DurationConfig,
    user: &User,
    course: &Course,
) -> Option<String> {
    if !policy.enabled_for_target(ctx, EnrollmentTarget::UserCourse(user, &course.key)) {
        return None;
    }
    let expiration = user_course_expiration_date(ctx, bounds, user, course)?;
    Some(format!(
        "Your access to this course expires on {}. Upgrade now for unlimited access.",
        expiration.format("%b %-d")
    ))
}
