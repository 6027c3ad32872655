mod common;

use cgate_content_gating::{
    ACCESS_DENIED_MESSAGE, ACCESS_DENIED_TEMPLATE, ContentGating, ContentGatingError,
};
use cgate_kernel::domain::course::{UsageKey, User};
use cgate_kernel::domain::enrollment::CourseMode;
use cgate_kernel::domain::features::FeatureFlags;
use cgate_kernel::domain::partition::{Group, SchemeId, UserPartition};
use cgate_kernel::ports::{PortError, TemplateRenderer};
use cgate_kernel::scheme::{RequestInfo, SchemeRegistry};
use common::Fixture;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

fn learner() -> User {
    User::new(42, "learner")
}

fn registry() -> SchemeRegistry {
    cgate_content_gating::register(SchemeRegistry::builder()).build()
}

fn problem(fixture: &Fixture) -> UsageKey {
    UsageKey::new(fixture.course.clone(), "problem", "graded_1")
}

/// Echoes the template name and context, or fails when asked to.
#[derive(Debug)]
struct EchoRenderer {
    fail: bool,
}

impl TemplateRenderer for EchoRenderer {
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, PortError> {
        if self.fail {
            return Err(PortError::Render { message: "template missing".into(), context: None });
        }
        Ok(format!("{template}|{context}"))
    }
}

#[test]
fn message_only_for_active_audit_enrollment() {
    let fixture = Fixture::new().with_audit_and_verified();
    let ctx = fixture.context(FeatureFlags::CONTENT_TYPE_GATING);
    let partition = fixture.partition();
    let block = problem(&fixture);

    assert!(registry().access_denied_message(&ctx, &partition, &block, &learner()).is_none());

    fixture.enroll(&learner(), "audit", false);
    assert!(registry().access_denied_message(&ctx, &partition, &block, &learner()).is_none());

    fixture.enroll(&learner(), "audit", true);
    let message = registry().access_denied_message(&ctx, &partition, &block, &learner());
    assert_eq!(message.as_deref(), Some(ACCESS_DENIED_MESSAGE));
}

#[test]
fn fragment_without_checkout_when_commerce_is_disabled() {
    let fixture = Fixture::new().with_audit_and_verified();
    fixture.enroll(&learner(), "audit", true);
    let ctx = fixture.context(FeatureFlags::CONTENT_TYPE_GATING);

    let fragment = registry()
        .access_denied_fragment(
            &ctx,
            &RequestInfo::default(),
            &fixture.partition(),
            &problem(&fixture),
            &learner(),
        )
        .unwrap();

    assert_eq!(fragment.template, ACCESS_DENIED_TEMPLATE);
    assert!(!fragment.context.mobile_app);
    assert_eq!(fragment.context.ecommerce_checkout_link, None);
    assert_eq!(fragment.context.min_price, "100.00");
}

#[test]
fn fragment_links_checkout_when_commerce_is_enabled() {
    let fixture = Fixture::new().with_audit_and_verified();
    fixture.enroll(&learner(), "audit", true);
    fixture.commerce.enable_for(&learner());
    let ctx = fixture.context(FeatureFlags::CONTENT_TYPE_GATING);

    let fragment = registry()
        .access_denied_fragment(
            &ctx,
            &RequestInfo { mobile_app: true },
            &fixture.partition(),
            &problem(&fixture),
            &learner(),
        )
        .unwrap();

    assert!(fragment.context.mobile_app);
    assert_eq!(
        fragment.context.ecommerce_checkout_link.as_deref(),
        Some("https://ecommerce.example.com/basket/add/?sku=8CF08E5")
    );
}

#[test]
fn no_fragment_without_selectable_verified_mode() {
    let fixture = Fixture::new();
    fixture.add_mode(CourseMode::new("audit", Decimal::ZERO));
    fixture.add_mode(CourseMode::new("professional", Decimal::from(200)));
    fixture.enroll(&learner(), "audit", true);
    let ctx = fixture.context(FeatureFlags::CONTENT_TYPE_GATING);

    let fragment = registry().access_denied_fragment(
        &ctx,
        &RequestInfo::default(),
        &fixture.partition(),
        &problem(&fixture),
        &learner(),
    );
    assert!(fragment.is_none());
}

#[test]
fn other_schemes_keep_default_messaging() {
    let fixture = Fixture::new().with_audit_and_verified();
    fixture.enroll(&learner(), "audit", true);
    let ctx = fixture.context(FeatureFlags::CONTENT_TYPE_GATING);
    let cohort = UserPartition {
        id: 101,
        name: "Cohorts".to_owned(),
        description: String::new(),
        groups: vec![Group::new(0, "alpha")],
        scheme: SchemeId::Cohort,
        parameters: BTreeMap::new(),
        active: true,
    };

    assert!(registry().access_denied_message(&ctx, &cohort, &problem(&fixture), &learner()).is_none());
}

#[test]
fn slice_renders_fragment_through_renderer() {
    let fixture = Fixture::new().with_audit_and_verified();
    fixture.enroll(&learner(), "audit", true);
    let ctx = fixture.context(FeatureFlags::CONTENT_TYPE_GATING);

    let initialized = cgate_content_gating::init(registry()).unwrap();
    assert_eq!(initialized.name(), "content_gating");
    let slice = initialized.state.as_any().downcast_ref::<ContentGating>().unwrap();

    let html = slice
        .render_access_denied(
            &ctx,
            &EchoRenderer { fail: false },
            &RequestInfo::default(),
            &fixture.partition(),
            &problem(&fixture),
            &learner(),
        )
        .unwrap()
        .unwrap();
    assert!(html.starts_with(ACCESS_DENIED_TEMPLATE));
    assert!(html.contains("\"min_price\":\"100.00\""));

    let err = slice
        .render_access_denied(
            &ctx,
            &EchoRenderer { fail: true },
            &RequestInfo::default(),
            &fixture.partition(),
            &problem(&fixture),
            &learner(),
        )
        .unwrap_err();
    assert!(matches!(err, ContentGatingError::Render { .. }));
}

#[test]
fn init_requires_registered_scheme() {
    let err = cgate_content_gating::init(SchemeRegistry::default()).unwrap_err();
    assert_eq!(err.kind(), "internal");
}
