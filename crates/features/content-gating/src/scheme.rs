//! The `content_type_gate` partition scheme.
//!
//! Learners are split into two groups: active audit learners (and anyone without an active
//! enrollment) land in [`LIMITED_ACCESS`], everyone else in [`FULL_ACCESS`]. Courses without a
//! verified-family track are never gated.

use cgate_domain::constants::{AUDIT, FULL_ACCESS_GROUP_ID, LIMITED_ACCESS_GROUP_ID, VERIFIED};
use cgate_domain::course::{CourseKey, UsageKey, User};
use cgate_domain::partition::{Group, SchemeId, UserPartition};
use cgate_kernel::context::GatingContext;
use cgate_kernel::ports::ModeFilter;
use cgate_kernel::scheme::{AccessDeniedFragment, FragmentContext, PartitionScheme, RequestInfo};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::{debug, error};

pub static LIMITED_ACCESS: LazyLock<Group> =
    LazyLock::new(|| Group::new(LIMITED_ACCESS_GROUP_ID, "Limited-access Users"));

pub static FULL_ACCESS: LazyLock<Group> =
    LazyLock::new(|| Group::new(FULL_ACCESS_GROUP_ID, "Full-access Users"));

pub const ACCESS_DENIED_MESSAGE: &str =
    "Graded assessments are available to Verified Track learners. Upgrade to Unlock.";

pub const ACCESS_DENIED_TEMPLATE: &str = "content_type_gating/access_denied_message.html";

#[derive(Debug, Default, Clone, Copy)]
pub struct ContentTypeGatingScheme;

impl ContentTypeGatingScheme {
    /// Both groups of a gating partition, limited first.
    #[must_use]
    pub fn groups() -> Vec<Group> {
        vec![LIMITED_ACCESS.clone(), FULL_ACCESS.clone()]
    }

    fn is_audit_enrollment(ctx: &GatingContext, user: &User, course_key: &CourseKey) -> bool {
        let (mode_slug, is_active) = ctx.enrollments.enrollment_mode_for_user(user, course_key);
        is_active && mode_slug.as_deref() == Some(AUDIT)
    }

    /// `Some` only when commerce is on for `user` and the mode carries a SKU.
    fn checkout_link(ctx: &GatingContext, user: &User, sku: Option<&str>) -> Option<String> {
        let sku = sku.filter(|s| !s.is_empty())?;
        if !ctx.commerce.is_enabled(user) {
            return None;
        }
        Some(ctx.commerce.checkout_page_url(sku).unwrap_or_default())
    }
}

impl PartitionScheme for ContentTypeGatingScheme {
    fn id(&self) -> SchemeId {
        SchemeId::ContentTypeGate
    }

    fn group_for_user(
        &self,
        ctx: &GatingContext,
        course_key: &CourseKey,
        user: &User,
        partition: &UserPartition,
    ) -> Option<Group> {
        // Staff previewing as a generic group member see exactly that group; previewing as a
        // specific learner falls through to that learner's own state.
        if ctx.masquerade.course_masquerade(user, course_key).is_some()
            && !ctx.masquerade.is_masquerading_as_specific_student(user, course_key)
        {
            return ctx.masquerade.masquerading_user_group(course_key, user, partition);
        }

        if !ctx.flags.gating_enabled() {
            return Some(FULL_ACCESS.clone());
        }

        let modes = ctx.modes.modes_for_course(course_key, ModeFilter::ALL);
        if !ctx.modes.has_verified_mode(&modes) {
            debug!(course = %course_key, "No verified mode, granting full access");
            return Some(FULL_ACCESS.clone());
        }

        let (mode_slug, is_active) = ctx.enrollments.enrollment_mode_for_user(user, course_key);
        let Some(mode_slug) = mode_slug.filter(|_| is_active) else {
            return Some(LIMITED_ACCESS.clone());
        };

        if ctx.modes.mode_for_course(course_key, &mode_slug, Some(&modes)).is_none() {
            error!(
                user = %user.username,
                mode = %mode_slug,
                course = %course_key,
                "User is in an unknown course mode, granting full access to content"
            );
            return Some(FULL_ACCESS.clone());
        }

        if mode_slug == AUDIT {
            Some(LIMITED_ACCESS.clone())
        } else {
            Some(FULL_ACCESS.clone())
        }
    }

    /// Always the two fixed groups and always active: gating is switched per course through
    /// policy, never through course content.
    fn create_user_partition(
        &self,
        id: u32,
        name: &str,
        description: &str,
        _groups: Vec<Group>,
        parameters: BTreeMap<String, String>,
        _active: bool,
    ) -> UserPartition {
        UserPartition {
            id,
            name: name.to_owned(),
            description: description.to_owned(),
            groups: Self::groups(),
            scheme: self.id(),
            parameters,
            active: true,
        }
    }

    fn access_denied_message(
        &self,
        ctx: &GatingContext,
        _partition: &UserPartition,
        block: &UsageKey,
        user: &User,
    ) -> Option<Cow<'static, str>> {
        Self::is_audit_enrollment(ctx, user, &block.course_key)
            .then_some(Cow::Borrowed(ACCESS_DENIED_MESSAGE))
    }

    fn access_denied_fragment(
        &self,
        ctx: &GatingContext,
        request: &RequestInfo,
        _partition: &UserPartition,
        block: &UsageKey,
        user: &User,
    ) -> Option<AccessDeniedFragment> {
        let course_key = &block.course_key;
        let verified_mode = ctx
            .modes
            .modes_for_course(course_key, ModeFilter::SELECTABLE)
            .into_iter()
            .find(|m| m.slug == VERIFIED)?;
        if !Self::is_audit_enrollment(ctx, user, course_key) {
            return None;
        }

        Some(AccessDeniedFragment {
            template: Cow::Borrowed(ACCESS_DENIED_TEMPLATE),
            context: FragmentContext {
                mobile_app: request.mobile_app,
                ecommerce_checkout_link: Self::checkout_link(ctx, user, verified_mode.sku.as_deref()),
                min_price: verified_mode.display_price(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_are_forced_active_with_fixed_groups() {
        let partition = ContentTypeGatingScheme.create_user_partition(
            51,
            "gate",
            "desc",
            vec![Group::new(7, "custom")],
            BTreeMap::new(),
            false,
        );
        assert!(partition.active);
        assert_eq!(partition.scheme, SchemeId::ContentTypeGate);
        assert_eq!(partition.groups, [LIMITED_ACCESS.clone(), FULL_ACCESS.clone()]);
    }

    #[test]
    fn fixed_groups_use_reserved_ids() {
        assert_eq!(LIMITED_ACCESS.id, 1);
        assert_eq!(FULL_ACCESS.id, 2);
        assert_eq!(FULL_ACCESS.name, "Full-access Users");
    }
}
