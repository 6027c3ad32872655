use cgate_duration_limits::{
    DurationLimitConfig, DurationLimitError, DurationLimitPolicy, EnrollmentTarget,
    InMemoryDurationLimits, StackedScope,
};
use cgate_kernel::context::GatingContext;
use cgate_kernel::domain::course::{CourseKey, User};
use cgate_kernel::domain::enrollment::Enrollment;
use cgate_kernel::domain::features::FeatureFlags;
use cgate_kernel::memory::{InMemoryCourseModes, InMemoryEnrollments};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use std::sync::Arc;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn fixed_now() -> DateTime<Utc> {
    at(2024, 6, 1)
}

fn course() -> CourseKey {
    "course-v1:edX+DemoX+2024".parse().unwrap()
}

struct Setup {
    limits: Arc<InMemoryDurationLimits>,
    enrollments: Arc<InMemoryEnrollments>,
    policy: DurationLimitPolicy,
}

fn setup() -> Setup {
    let limits = Arc::new(InMemoryDurationLimits::default());
    let enrollments = Arc::new(InMemoryEnrollments::default());
    let policy = DurationLimitPolicy::new(limits.clone()).with_clock(fixed_now);
    Setup { limits, enrollments, policy }
}

impl Setup {
    fn context(&self, flags: FeatureFlags) -> GatingContext {
        GatingContext::builder()
            .flags(flags)
            .enrollments(self.enrollments.clone())
            .modes(Arc::new(InMemoryCourseModes::default()))
            .build()
            .unwrap()
    }
}

#[test]
fn both_or_neither_arguments_are_rejected() {
    let s = setup();
    let ctx = s.context(FeatureFlags::empty());
    let user = User::new(1, "learner");
    let enrollment = Enrollment::new(1, course(), "audit", at(2024, 1, 1));

    let cases = [
        s.policy.enabled_for_enrollment(&ctx, Some(&enrollment), Some(&user), None),
        s.policy.enabled_for_enrollment(&ctx, Some(&enrollment), None, Some(&course())),
        s.policy.enabled_for_enrollment(&ctx, None, None, None),
        s.policy.enabled_for_enrollment(&ctx, None, Some(&user), None),
        s.policy.enabled_for_enrollment(&ctx, None, None, Some(&course())),
    ];
    for result in cases {
        assert!(matches!(result, Err(DurationLimitError::InvalidArgument { .. })));
    }

    // Still rejected when the flag would have answered `true`.
    let flagged = s.context(FeatureFlags::CONTENT_TYPE_GATING);
    let err = s.policy.enabled_for_enrollment(&flagged, None, None, None).unwrap_err();
    assert_eq!(err.kind(), "invalid_argument");
}

#[test]
fn flag_short_circuits_configuration() {
    let s = setup();
    s.limits
        .write(StackedScope::Course(course()), DurationLimitConfig::enabled_as_of(date(2021, 1, 1)))
        .unwrap();
    let enrollment = Enrollment::new(1, course(), "audit", at(2020, 1, 1));

    let ctx = s.context(FeatureFlags::CONTENT_TYPE_GATING);
    assert!(s.policy.enabled_for_enrollment(&ctx, Some(&enrollment), None, None).unwrap());
    assert!(s.policy.enabled_for_course(&ctx, &course(), Some(date(1999, 1, 1))));

    let ctx = s.context(FeatureFlags::empty());
    assert!(!s.policy.enabled_for_enrollment(&ctx, Some(&enrollment), None, None).unwrap());
}

#[test]
fn enrollment_creation_date_is_compared_with_enabled_as_of() {
    let s = setup();
    let ctx = s.context(FeatureFlags::empty());
    s.limits
        .write(StackedScope::Global, DurationLimitConfig::enabled_as_of(date(2024, 3, 1)))
        .unwrap();

    let before = Enrollment::new(1, course(), "audit", at(2024, 2, 29));
    let on_the_day = Enrollment::new(2, course(), "audit", at(2024, 3, 1));
    assert!(!s.policy.enabled_for_target(&ctx, EnrollmentTarget::Enrollment(&before)));
    assert!(s.policy.enabled_for_target(&ctx, EnrollmentTarget::Enrollment(&on_the_day)));
}

#[test]
fn user_and_course_look_up_the_enrollment() {
    let s = setup();
    let ctx = s.context(FeatureFlags::empty());
    let user = User::new(1, "learner");
    s.limits
        .write(StackedScope::Org("edX".to_owned()), DurationLimitConfig::enabled_as_of(date(2024, 3, 1)))
        .unwrap();
    s.enrollments.upsert(Enrollment::new(1, course(), "audit", at(2024, 1, 1)));

    assert!(!s.policy.enabled_for_enrollment(&ctx, None, Some(&user), Some(&course())).unwrap());
}

#[test]
fn unenrolled_learners_are_evaluated_as_of_today() {
    let s = setup();
    let ctx = s.context(FeatureFlags::empty());
    let user = User::new(1, "learner");

    s.limits
        .write(StackedScope::Course(course()), DurationLimitConfig::enabled_as_of(date(2024, 5, 1)))
        .unwrap();
    assert!(s.policy.enabled_for_enrollment(&ctx, None, Some(&user), Some(&course())).unwrap());

    s.limits
        .write(StackedScope::Course(course()), DurationLimitConfig::enabled_as_of(date(2024, 7, 1)))
        .unwrap();
    assert!(!s.policy.enabled_for_enrollment(&ctx, None, Some(&user), Some(&course())).unwrap());
}

#[test]
fn enabled_for_course_defaults_to_today() {
    let s = setup();
    let ctx = s.context(FeatureFlags::empty());
    assert!(!s.policy.enabled_for_course(&ctx, &course(), None));

    s.limits
        .write(StackedScope::Global, DurationLimitConfig::enabled_as_of(date(2024, 6, 1)))
        .unwrap();
    assert!(s.policy.enabled_for_course(&ctx, &course(), None));
    assert!(!s.policy.enabled_for_course(&ctx, &course(), Some(date(2024, 5, 31))));
}

proptest! {
    #[test]
    fn enabled_for_course_is_idempotent(
        enabled in proptest::option::of(any::<bool>()),
        offset in 0u64..3650,
        target_offset in 0u64..3650,
    ) {
        let s = setup();
        let ctx = s.context(FeatureFlags::empty());
        let base = date(2015, 1, 1);
        let as_of = base + chrono::Days::new(offset);
        let config = DurationLimitConfig {
            enabled,
            enabled_as_of: enabled.filter(|e| *e).map(|_| as_of),
        };
        s.limits.write(StackedScope::Course(course()), config).unwrap();

        let target = base + chrono::Days::new(target_offset);
        let first = s.policy.enabled_for_course(&ctx, &course(), Some(target));
        let second = s.policy.enabled_for_course(&ctx, &course(), Some(target));
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, enabled == Some(true) && as_of <= target);
    }
}
