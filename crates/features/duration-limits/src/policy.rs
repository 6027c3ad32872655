//! Whether course duration limits apply to an enrollment.

use crate::error::DurationLimitError;
use crate::store::DurationLimitResolver;
use cgate_domain::course::{CourseKey, User};
use cgate_domain::enrollment::Enrollment;
use cgate_kernel::context::GatingContext;
use chrono::{DateTime, NaiveDate, Utc};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::debug;

/// What a duration limit check is about.
#[derive(Debug, Clone, Copy)]
pub enum EnrollmentTarget<'a> {
    /// A known enrollment.
    Enrollment(&'a Enrollment),
    /// A learner and course, whether or not the learner is enrolled.
    UserCourse(&'a User, &'a CourseKey),
}

impl<'a> EnrollmentTarget<'a> {
    /// Builds a target from the loose argument form.
    ///
    /// # Errors
    /// Returns [`DurationLimitError::InvalidArgument`] unless exactly one of `enrollment` or
    /// both `user` and `course_key` is given.
    pub fn from_parts(
        enrollment: Option<&'a Enrollment>,
        user: Option<&'a User>,
        course_key: Option<&'a CourseKey>,
    ) -> Result<Self, DurationLimitError> {
        let message = match (enrollment, user, course_key) {
            (Some(enrollment), None, None) => return Ok(Self::Enrollment(enrollment)),
            (None, Some(user), Some(course_key)) => return Ok(Self::UserCourse(user, course_key)),
            (Some(_), _, _) => "Specify enrollment or user/course_key, but not both",
            (None, None, None) => "At least one of enrollment or user and course_key must be specified",
            (None, _, _) => "Both user and course_key must be specified if no enrollment is provided",
        };
        Err(DurationLimitError::InvalidArgument { message: Cow::Borrowed(message), context: None })
    }
}

/// Decides whether duration limits are in force, consulting the stacked configuration.
#[derive(Debug, Clone)]
pub struct DurationLimitPolicy {
    resolver: Arc<dyn DurationLimitResolver>,
    now: fn() -> DateTime<Utc>,
}

impl DurationLimitPolicy {
    pub fn new(resolver: Arc<dyn DurationLimitResolver>) -> Self {
        Self { resolver, now: Utc::now }
    }

    /// Uses `now` instead of the system clock for "today".
    #[must_use]
    pub fn with_clock(mut self, now: fn() -> DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &Arc<dyn DurationLimitResolver> {
        &self.resolver
    }

    fn today(&self) -> NaiveDate {
        (self.now)().date_naive()
    }

    /// Loose-argument form of [`Self::enabled_for_target`].
    ///
    /// # Errors
    /// Returns [`DurationLimitError::InvalidArgument`] for any combination other than an
    /// enrollment alone or a user together with a course key. Arguments are checked even when
    /// the gating flag would short-circuit the answer.
    pub fn enabled_for_enrollment(
        &self,
        ctx: &GatingContext,
        enrollment: Option<&Enrollment>,
        user: Option<&User>,
        course_key: Option<&CourseKey>,
    ) -> Result<bool, DurationLimitError> {
        let target = EnrollmentTarget::from_parts(enrollment, user, course_key)?;
        Ok(self.enabled_for_target(ctx, target))
    }

    /// Whether limits apply to the enrollment behind `target`.
    ///
    /// Without an enrollment the answer is given as if the learner enrolled today.
    #[must_use]
    pub fn enabled_for_target(&self, ctx: &GatingContext, target: EnrollmentTarget<'_>) -> bool {
        if ctx.flags.gating_enabled() {
            return true;
        }

        let enrollment = match target {
            EnrollmentTarget::Enrollment(enrollment) => Cow::Borrowed(enrollment),
            EnrollmentTarget::UserCourse(user, course_key) => {
                match ctx.enrollments.enrollment(user, course_key) {
                    Some(enrollment) => Cow::Owned(enrollment),
                    None => return self.enabled_for_course(ctx, course_key, Some(self.today())),
                }
            },
        };

        let enabled = self
            .resolver
            .current(&enrollment.course_key)
            .enabled_as_of_date(enrollment.created.date_naive());
        debug!(
            user = enrollment.user_id,
            course = %enrollment.course_key,
            enabled,
            "Duration limits resolved for enrollment"
        );
        enabled
    }

    /// Whether limits apply to `course_key` for enrollments created on `target_date`
    /// (today when `None`).
    #[must_use]
    pub fn enabled_for_course(
        &self,
        ctx: &GatingContext,
        course_key: &CourseKey,
        target_date: Option<NaiveDate>,
    ) -> bool {
        if ctx.flags.gating_enabled() {
            return true;
        }
        let target_date = target_date.unwrap_or_else(|| self.today());
        self.resolver.current(course_key).enabled_as_of_date(target_date)
    }
}
