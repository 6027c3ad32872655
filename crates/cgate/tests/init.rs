use cgate::domain::config::PlatformConfig;
use cgate::domain::course::{Course, User};
use cgate::domain::enrollment::{CourseMode, Enrollment};
use cgate::features::content_gating::{ContentGating, LIMITED_ACCESS};
use cgate::features::duration_limits::{
    CourseAccess, DurationLimitConfig, DurationLimits, InMemoryDurationLimits, StackedScope,
};
use cgate::kernel::context::GatingContext;
use cgate::kernel::domain::partition::SchemeId;
use cgate::kernel::memory::{InMemoryCourseModes, InMemoryEnrollments};
use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;

fn course() -> Course {
    Course {
        key: "course-v1:edX+DemoX+2024".parse().unwrap(),
        display_name: "Demonstration Course".to_owned(),
        start: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        user_partitions: Vec::new(),
    }
}

#[test]
fn enabled_features_are_listed() {
    assert!(cgate::features::is_enabled("content_gating"));
    assert!(cgate::features::is_enabled("duration_limits"));
    assert!(!cgate::features::is_enabled("licensing"));
    assert!(cgate::scheme_registry().contains(SchemeId::ContentTypeGate));
}

#[test]
fn init_wires_slices_with_configured_flags() {
    let course = course();
    let learner = User::new(5, "learner");

    let enrollments = Arc::new(InMemoryEnrollments::default());
    enrollments.upsert(Enrollment::new(
        learner.id,
        course.key.clone(),
        "audit",
        Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
    ));
    let modes = Arc::new(InMemoryCourseModes::default());
    modes.insert(&course.key, CourseMode::new("audit", Decimal::ZERO));
    modes.insert(&course.key, CourseMode::new("verified", Decimal::from(49)));

    let limits = Arc::new(InMemoryDurationLimits::default());
    limits
        .write(StackedScope::Global, DurationLimitConfig::enabled_as_of(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()))
        .unwrap();

    let ctx = GatingContext::builder().enrollments(enrollments).modes(modes).build().unwrap();
    assert!(!ctx.flags.gating_enabled());

    let mut config = PlatformConfig::default();
    config.flags.content_type_gating = true;

    let state = cgate::init(config, ctx, limits).unwrap();
    assert!(state.context.flags.gating_enabled());

    let mut names = state.slice_names().collect::<Vec<_>>();
    names.sort_unstable();
    assert_eq!(names, ["content_gating", "duration_limits"]);

    let gating = ContentGating::from_state(&state).unwrap();
    let partition = gating.partition_for(&state.context, &course).unwrap();
    let group = state.registry.group_for_user(&state.context, &course.key, &learner, &partition);
    assert_eq!(group.as_ref(), Some(&*LIMITED_ACCESS));

    let limits = DurationLimits::from_state(&state).unwrap();
    let access = limits.check_course_expired(
        &state.context,
        &learner,
        &course,
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
    );
    assert!(matches!(access, CourseAccess::AuditExpired(_)));
}
