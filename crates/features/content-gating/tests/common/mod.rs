#![allow(dead_code)]

use cgate_content_gating::ContentTypeGatingScheme;
use cgate_kernel::context::GatingContext;
use cgate_kernel::domain::course::{CourseKey, User};
use cgate_kernel::domain::enrollment::{CourseMode, Enrollment};
use cgate_kernel::domain::features::FeatureFlags;
use cgate_kernel::domain::partition::UserPartition;
use cgate_kernel::memory::{
    InMemoryCourseModes, InMemoryEnrollments, StaticCommerce, StaticMasquerade,
};
use cgate_kernel::scheme::PartitionScheme;
use chrono::{TimeZone, Utc};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt::{Debug, Write};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

pub const CHECKOUT_BASE: &str = "https://ecommerce.example.com/basket/add/";

/// In-memory collaborators for one demo course.
pub struct Fixture {
    pub course: CourseKey,
    pub enrollments: Arc<InMemoryEnrollments>,
    pub modes: Arc<InMemoryCourseModes>,
    pub masquerade: Arc<StaticMasquerade>,
    pub commerce: Arc<StaticCommerce>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            course: "course-v1:edX+DemoX+Demo_Course".parse().unwrap(),
            enrollments: Arc::new(InMemoryEnrollments::default()),
            modes: Arc::new(InMemoryCourseModes::default()),
            masquerade: Arc::new(StaticMasquerade::default()),
            commerce: Arc::new(StaticCommerce::new(Some(CHECKOUT_BASE.to_owned()))),
        }
    }

    /// Audit plus a $100 verified track with a SKU.
    pub fn with_audit_and_verified(self) -> Self {
        self.add_mode(CourseMode::new("audit", Decimal::ZERO));
        self.add_mode(CourseMode::new("verified", Decimal::from(100)).with_sku("8CF08E5"));
        self
    }

    pub fn add_mode(&self, mode: CourseMode) {
        self.modes.insert(&self.course, mode);
    }

    pub fn enroll(&self, user: &User, mode: &str, active: bool) {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let enrollment = Enrollment::new(user.id, self.course.clone(), mode, created);
        self.enrollments.upsert(if active { enrollment } else { enrollment.inactive() });
    }

    pub fn context(&self, flags: FeatureFlags) -> GatingContext {
        GatingContext::builder()
            .flags(flags)
            .enrollments(self.enrollments.clone())
            .modes(self.modes.clone())
            .masquerade(self.masquerade.clone())
            .commerce(self.commerce.clone())
            .build()
            .unwrap()
    }

    pub fn partition(&self) -> UserPartition {
        ContentTypeGatingScheme.create_user_partition(
            51,
            "Feature-based Enrollments",
            "",
            Vec::new(),
            BTreeMap::from([("course_id".to_owned(), self.course.to_string())]),
            true,
        )
    }
}

/// A captured log event: level plus its rendered fields.
#[derive(Debug, Clone)]
pub struct Captured {
    pub level: Level,
    pub fields: String,
}

#[derive(Debug, Clone, Default)]
pub struct CaptureLayer {
    events: Arc<Mutex<Vec<Captured>>>,
}

impl CaptureLayer {
    pub fn at(&self, level: Level) -> Vec<Captured> {
        self.events.lock().iter().filter(|e| e.level == level).cloned().collect()
    }
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldWriter::default();
        event.record(&mut visitor);
        self.events.lock().push(Captured { level: *event.metadata().level(), fields: visitor.0 });
    }
}

#[derive(Default)]
struct FieldWriter(String);

impl Visit for FieldWriter {
    fn record_debug(&mut self, field: &Field, value: &dyn Debug) {
        let _ = write!(self.0, "{}={:?} ", field.name(), value);
    }
}

/// Runs `f` with a subscriber that records every event.
pub fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, CaptureLayer) {
    let layer = CaptureLayer::default();
    let subscriber = tracing_subscriber::registry().with(layer.clone());
    let out = tracing::subscriber::with_default(subscriber, f);
    (out, layer)
}
