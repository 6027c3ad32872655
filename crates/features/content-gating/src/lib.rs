//! Content type gating feature slice.
//!
//! Splits the learners of every course into limited and full access groups and supplies the
//! messaging shown to limited learners in place of graded content.
//!
//! ```rust
//! use cgate_content_gating::{ContentTypeGatingScheme, FULL_ACCESS};
//! use cgate_kernel::context::GatingContext;
//! use cgate_kernel::domain::course::User;
//! use cgate_kernel::domain::partition::{SchemeId, UserPartition};
//! use cgate_kernel::memory::{InMemoryCourseModes, InMemoryEnrollments};
//! use cgate_kernel::scheme::PartitionScheme;
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! let ctx = GatingContext::builder()
//!     .enrollments(Arc::new(InMemoryEnrollments::default()))
//!     .modes(Arc::new(InMemoryCourseModes::default()))
//!     .build()
//!     .unwrap();
//! let scheme = ContentTypeGatingScheme;
//! let partition = scheme.create_user_partition(51, "gate", "", vec![], BTreeMap::new(), true);
//! let course = "course-v1:edX+DemoX+2024".parse().unwrap();
//!
//! // Gating is off, so everyone gets full access.
//! let group = scheme.group_for_user(&ctx, &course, &User::new(1, "learner"), &partition);
//! assert_eq!(group.as_ref(), Some(&*FULL_ACCESS));
//! ```

mod error;
mod guard;
mod scheme;

pub use crate::error::{ContentGatingError, ContentGatingErrorExt};
pub use crate::guard::{PARTITION_DESCRIPTION, PARTITION_NAME, create_content_gating_partition};
pub use crate::scheme::{
    ACCESS_DENIED_MESSAGE, ACCESS_DENIED_TEMPLATE, ContentTypeGatingScheme, FULL_ACCESS,
    LIMITED_ACCESS,
};

use cgate_kernel::context::GatingContext;
use cgate_kernel::domain::course::{Course, UsageKey, User};
use cgate_kernel::domain::partition::{SchemeId, UserPartition};
use cgate_kernel::domain::registry::InitializedSlice;
use cgate_kernel::ports::TemplateRenderer;
use cgate_kernel::scheme::{RequestInfo, SchemeRegistry, SchemeRegistryBuilder};
use cgate_kernel::state::GatingState;
use std::sync::Arc;

/// Content gating feature state
#[cgate_derive::cgate_slice]
pub struct ContentGating {
    pub registry: SchemeRegistry,
}

impl ContentGating {
    /// Fetches the slice from an initialized gating state.
    ///
    /// # Errors
    /// Returns [`ContentGatingError::State`] if the slice was not registered.
    pub fn from_state(state: &GatingState) -> Result<&Self, ContentGatingError> {
        state.try_get_slice::<Self>().context("Content gating slice")
    }

    /// See [`create_content_gating_partition`].
    #[must_use]
    pub fn partition_for(&self, ctx: &GatingContext, course: &Course) -> Option<UserPartition> {
        create_content_gating_partition(ctx, &self.registry, course)
    }

    /// Renders the access-denied fragment for `block`, if the partition's scheme supplies one.
    ///
    /// # Errors
    /// Returns [`ContentGatingError::Render`] if the renderer fails.
    pub fn render_access_denied(
        &self,
        ctx: &GatingContext,
        renderer: &dyn TemplateRenderer,
        request: &RequestInfo,
        partition: &UserPartition,
        block: &UsageKey,
        user: &User,
    ) -> Result<Option<String>, ContentGatingError> {
        let Some(fragment) =
            self.registry.access_denied_fragment(ctx, request, partition, block, user)
        else {
            return Ok(None);
        };
        let html = fragment.render(renderer).context("Rendering access denied fragment")?;
        Ok(Some(html))
    }
}

/// Adds the `content_type_gate` scheme to a registry under construction.
#[must_use]
pub fn register(builder: SchemeRegistryBuilder) -> SchemeRegistryBuilder {
    builder.register(Arc::new(ContentTypeGatingScheme))
}

/// Initialize the content gating feature over an already built scheme registry.
///
/// # Errors
/// Returns [`ContentGatingError::Internal`] if `registry` lacks the `content_type_gate` scheme.
pub fn init(registry: SchemeRegistry) -> Result<InitializedSlice, ContentGatingError> {
    if !registry.contains(SchemeId::ContentTypeGate) {
        return Err("content_type_gate scheme is not registered".into());
    }

    let slice = ContentGating::new(ContentGatingInner { registry });
    tracing::info!("Content gating slice initialized");

    Ok(InitializedSlice::new(slice))
}
