//! In-memory adapters for the collaborator ports.
//!
//! Backed by `FxHashMap` behind `parking_lot::RwLock`, so a single instance can be shared
//! by reference across threads and mutated while serving reads.

use crate::ports::{
    CommerceService, CourseCatalog, CourseModeStore, EnrollmentStore, Masquerade,
    MasqueradeService, ModeFilter,
};
use cgate_domain::course::{CourseKey, User};
use cgate_domain::enrollment::{CourseMode, Enrollment};
use chrono::{DateTime, Utc};
use fxhash::{FxHashMap, FxHashSet};
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryEnrollments {
    enrollments: RwLock<FxHashMap<(u64, CourseKey), Enrollment>>,
}

impl InMemoryEnrollments {
    /// Stores `enrollment`, replacing any previous one for the same user and course.
    pub fn upsert(&self, enrollment: Enrollment) {
        let key = (enrollment.user_id, enrollment.course_key.clone());
        self.enrollments.write().insert(key, enrollment);
    }

    pub fn remove(&self, user: &User, course_key: &CourseKey) -> Option<Enrollment> {
        self.enrollments.write().remove(&(user.id, course_key.clone()))
    }
}

impl EnrollmentStore for InMemoryEnrollments {
    fn enrollment(&self, user: &User, course_key: &CourseKey) -> Option<Enrollment> {
        self.enrollments.read().get(&(user.id, course_key.clone())).cloned()
    }
}

/// Course modes keyed by course, evaluated against an injectable clock.
#[derive(Debug)]
pub struct InMemoryCourseModes {
    modes: RwLock<FxHashMap<CourseKey, Vec<CourseMode>>>,
    now: fn() -> DateTime<Utc>,
}

impl Default for InMemoryCourseModes {
    fn default() -> Self {
        Self { modes: RwLock::default(), now: Utc::now }
    }
}

impl InMemoryCourseModes {
    /// Uses `now` instead of the system clock to decide mode expiry.
    #[must_use]
    pub fn with_clock(now: fn() -> DateTime<Utc>) -> Self {
        Self { modes: RwLock::default(), now }
    }

    /// Adds or replaces the mode with the same slug.
    pub fn insert(&self, course_key: &CourseKey, mode: CourseMode) {
        let mut guard = self.modes.write();
        let modes = guard.entry(course_key.clone()).or_default();
        modes.retain(|m| m.slug != mode.slug);
        modes.push(mode);
    }
}

impl CourseModeStore for InMemoryCourseModes {
    fn modes_for_course(&self, course_key: &CourseKey, filter: ModeFilter) -> Vec<CourseMode> {
        let now = (self.now)();
        self.modes
            .read()
            .get(course_key)
            .map(|modes| {
                modes
                    .iter()
                    .filter(|m| filter.include_expired || !m.is_expired(now))
                    .filter(|m| !filter.only_selectable || m.is_selectable())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct StaticMasquerade {
    sessions: RwLock<FxHashMap<(u64, CourseKey), Masquerade>>,
}

impl StaticMasquerade {
    pub fn set(&self, staff: &User, course_key: &CourseKey, masquerade: Masquerade) {
        self.sessions.write().insert((staff.id, course_key.clone()), masquerade);
    }

    pub fn clear(&self, staff: &User, course_key: &CourseKey) {
        self.sessions.write().remove(&(staff.id, course_key.clone()));
    }
}

impl MasqueradeService for StaticMasquerade {
    fn course_masquerade(&self, user: &User, course_key: &CourseKey) -> Option<Masquerade> {
        self.sessions.read().get(&(user.id, course_key.clone())).cloned()
    }
}

/// Commerce service enabled for an explicit set of users.
#[derive(Debug, Default)]
pub struct StaticCommerce {
    enabled_users: RwLock<FxHashSet<u64>>,
    checkout_base: Option<String>,
}

impl StaticCommerce {
    /// Checkout URLs are built as `{base}?sku={sku}`; without a base none is returned.
    #[must_use]
    pub fn new(checkout_base: Option<String>) -> Self {
        Self { enabled_users: RwLock::default(), checkout_base }
    }

    pub fn enable_for(&self, user: &User) {
        self.enabled_users.write().insert(user.id);
    }
}

impl CommerceService for StaticCommerce {
    fn is_enabled(&self, user: &User) -> bool {
        self.enabled_users.read().contains(&user.id)
    }

    fn checkout_page_url(&self, sku: &str) -> Option<String> {
        self.checkout_base.as_ref().map(|base| format!("{base}?sku={sku}"))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    weeks: RwLock<FxHashMap<CourseKey, u32>>,
}

impl InMemoryCatalog {
    pub fn set_weeks_to_complete(&self, course_key: &CourseKey, weeks: u32) {
        self.weeks.write().insert(course_key.clone(), weeks);
    }
}

impl CourseCatalog for InMemoryCatalog {
    fn weeks_to_complete(&self, course_key: &CourseKey) -> Option<u32> {
        self.weeks.read().get(course_key).copied()
    }
}
