//! Collaborator ports.
//!
//! Every store and service the gating slices read from is reached through one of these
//! traits. Implementations live outside the core (database, commerce, courseware); the
//! [`crate::memory`] module provides in-memory adapters for tests and embedding.

use cgate_domain::course::{CourseKey, User};
use cgate_domain::enrollment::{CourseMode, Enrollment};
use cgate_domain::partition::{Group, UserPartition};
use std::borrow::Cow;
use std::fmt::Debug;

/// Errors surfaced by external renderers.
#[cgate_derive::cgate_error]
pub enum PortError {
    #[error("Template rendering failed{}: {message}", format_context(.context))]
    Render { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Which course modes a lookup should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModeFilter {
    pub include_expired: bool,
    pub only_selectable: bool,
}

impl ModeFilter {
    /// Every mode ever offered, used for group assignment.
    pub const ALL: Self = Self { include_expired: true, only_selectable: false };
    /// Modes a learner could pick right now.
    pub const SELECTABLE: Self = Self { include_expired: false, only_selectable: true };
}

impl Default for ModeFilter {
    fn default() -> Self {
        Self::SELECTABLE
    }
}

/// Read access to learner enrollments.
pub trait EnrollmentStore: Debug + Send + Sync {
    /// The enrollment of `user` in `course_key`, active or not.
    fn enrollment(&self, user: &User, course_key: &CourseKey) -> Option<Enrollment>;

    /// `(mode slug, is_active)` for the user's enrollment; `(None, false)` when not enrolled.
    fn enrollment_mode_for_user(&self, user: &User, course_key: &CourseKey) -> (Option<String>, bool) {
        self.enrollment(user, course_key).map_or((None, false), |e| (Some(e.mode), e.is_active))
    }
}

/// Read access to the modes configured for a course.
pub trait CourseModeStore: Debug + Send + Sync {
    fn modes_for_course(&self, course_key: &CourseKey, filter: ModeFilter) -> Vec<CourseMode>;

    fn has_verified_mode(&self, modes: &[CourseMode]) -> bool {
        modes.iter().any(CourseMode::is_verified)
    }

    /// Finds `slug` among `modes`, or among all of the course's modes when `modes` is `None`.
    fn mode_for_course(
        &self,
        course_key: &CourseKey,
        slug: &str,
        modes: Option<&[CourseMode]>,
    ) -> Option<CourseMode> {
        match modes {
            Some(modes) => modes.iter().find(|m| m.slug == slug).cloned(),
            None => self
                .modes_for_course(course_key, ModeFilter::ALL)
                .into_iter()
                .find(|m| m.slug == slug),
        }
    }
}

/// Who a staff member previews a course as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasqueradeRole {
    Staff,
    Student,
}

/// A staff member's active preview settings for one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Masquerade {
    pub role: MasqueradeRole,
    /// Set when previewing as a specific learner.
    pub user_name: Option<String>,
    /// `(partition id, group id)` when previewing as a generic group member.
    pub group: Option<(u32, u32)>,
}

impl Masquerade {
    pub const fn as_staff() -> Self {
        Self { role: MasqueradeRole::Staff, user_name: None, group: None }
    }

    pub const fn as_group(partition_id: u32, group_id: u32) -> Self {
        Self { role: MasqueradeRole::Student, user_name: None, group: Some((partition_id, group_id)) }
    }

    pub fn as_student(user_name: impl Into<String>) -> Self {
        Self { role: MasqueradeRole::Student, user_name: Some(user_name.into()), group: None }
    }
}

/// Lookup of staff masquerade state.
pub trait MasqueradeService: Debug + Send + Sync {
    fn course_masquerade(&self, user: &User, course_key: &CourseKey) -> Option<Masquerade>;

    fn is_masquerading_as_specific_student(&self, user: &User, course_key: &CourseKey) -> bool {
        self.course_masquerade(user, course_key).is_some_and(|m| m.user_name.is_some())
    }

    /// The group the staff member previews as, if it belongs to `partition`.
    ///
    /// Previewing in the staff role places the user in no group.
    fn masquerading_user_group(
        &self,
        course_key: &CourseKey,
        user: &User,
        partition: &UserPartition,
    ) -> Option<Group> {
        let masquerade = self.course_masquerade(user, course_key)?;
        if masquerade.role == MasqueradeRole::Staff {
            return None;
        }
        let (partition_id, group_id) = masquerade.group?;
        if partition_id != partition.id {
            return None;
        }
        partition.get_group(group_id).ok().cloned()
    }
}

/// Commerce checkout integration.
pub trait CommerceService: Debug + Send + Sync {
    fn is_enabled(&self, user: &User) -> bool;

    fn checkout_page_url(&self, sku: &str) -> Option<String>;
}

/// Course-run metadata from the catalog service.
pub trait CourseCatalog: Debug + Send + Sync {
    fn weeks_to_complete(&self, course_key: &CourseKey) -> Option<u32>;
}

/// Template engine used to turn assembled fragment contexts into markup.
pub trait TemplateRenderer: Debug + Send + Sync {
    /// # Errors
    /// Returns [`PortError::Render`] when the template is unknown or fails to render.
    fn render(&self, template: &str, context: &serde_json::Value) -> Result<String, PortError>;
}

/// Masquerade service for deployments without staff preview.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMasquerade;

impl MasqueradeService for NoMasquerade {
    fn course_masquerade(&self, _user: &User, _course_key: &CourseKey) -> Option<Masquerade> {
        None
    }
}

/// Commerce service that never offers a checkout.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledCommerce;

impl CommerceService for DisabledCommerce {
    fn is_enabled(&self, _user: &User) -> bool {
        false
    }

    fn checkout_page_url(&self, _sku: &str) -> Option<String> {
        None
    }
}

/// Catalog with no run details.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyCatalog;

impl CourseCatalog for EmptyCatalog {
    fn weeks_to_complete(&self, _course_key: &CourseKey) -> Option<u32> {
        None
    }
}
