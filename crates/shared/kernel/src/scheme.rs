//! Partition schemes and the registry that dispatches to them.
//!
//! A scheme assigns learners to the groups of the partitions it owns, and may override the
//! messaging shown when a learner is denied access to content managed by such a partition.
//! Schemes are registered explicitly under their [`SchemeId`]; there is no plugin discovery.

use crate::context::GatingContext;
use crate::ports::{PortError, TemplateRenderer};
use cgate_domain::DomainError;
use cgate_domain::course::{CourseKey, UsageKey, User};
use cgate_domain::partition::{Group, SchemeId, UserPartition};
use fxhash::FxHashMap;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::{debug, warn};

#[cgate_derive::cgate_error]
pub enum SchemeError {
    /// No scheme registered under the requested id.
    #[error("Unregistered partition scheme{}: {message}", format_context(.context))]
    Unregistered { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The scheme manages its partitions itself; they cannot be loaded from content.
    #[error("Read-only partition scheme{}: {message}", format_context(.context))]
    ReadOnly { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid partition{}: {source}", format_context(.context))]
    Domain { source: DomainError, context: Option<Cow<'static, str>> },

    #[error("Partition payload error{}: {source}", format_context(.context))]
    Payload { source: serde_json::Error, context: Option<Cow<'static, str>> },
}

/// Per-request facts that are not part of the gating context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestInfo {
    /// The request comes from a native mobile client.
    pub mobile_app: bool,
}

/// Template context of an access-denied fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentContext {
    pub mobile_app: bool,
    pub ecommerce_checkout_link: Option<String>,
    pub min_price: String,
}

/// Markup to show instead of gated content, not yet rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDeniedFragment {
    pub template: Cow<'static, str>,
    pub context: FragmentContext,
}

impl AccessDeniedFragment {
    /// Renders the fragment through an external template engine.
    ///
    /// # Errors
    /// Returns [`PortError`] from the renderer, or [`PortError::Render`] if the context
    /// cannot be converted to JSON.
    pub fn render(&self, renderer: &dyn TemplateRenderer) -> Result<String, PortError> {
        let context = serde_json::to_value(&self.context).map_err(|e| PortError::Render {
            message: e.to_string().into(),
            context: Some("Serializing fragment context".into()),
        })?;
        renderer.render(&self.template, &context)
    }
}

/// A strategy assigning learners to the groups of a partition.
pub trait PartitionScheme: Debug + Send + Sync {
    fn id(&self) -> SchemeId;

    /// Read-only schemes refuse partitions deserialized from course content.
    fn read_only(&self) -> bool {
        false
    }

    /// The group `user` belongs to in `partition`, or `None` if they are in no group.
    fn group_for_user(
        &self,
        ctx: &GatingContext,
        course_key: &CourseKey,
        user: &User,
        partition: &UserPartition,
    ) -> Option<Group>;

    /// Builds a partition bound to this scheme.
    fn create_user_partition(
        &self,
        id: u32,
        name: &str,
        description: &str,
        groups: Vec<Group>,
        parameters: BTreeMap<String, String>,
        active: bool,
    ) -> UserPartition {
        UserPartition {
            id,
            name: name.to_owned(),
            description: description.to_owned(),
            groups,
            scheme: self.id(),
            parameters,
            active,
        }
    }

    /// Message explaining why `user` cannot see `block`; `None` keeps the default UI.
    fn access_denied_message(
        &self,
        _ctx: &GatingContext,
        _partition: &UserPartition,
        _block: &UsageKey,
        _user: &User,
    ) -> Option<Cow<'static, str>> {
        None
    }

    /// Fragment to render in place of `block`; `None` keeps the default UI.
    fn access_denied_fragment(
        &self,
        _ctx: &GatingContext,
        _request: &RequestInfo,
        _partition: &UserPartition,
        _block: &UsageKey,
        _user: &User,
    ) -> Option<AccessDeniedFragment> {
        None
    }
}

/// Explicit map from scheme ids to their implementations.
#[derive(Debug, Clone, Default)]
pub struct SchemeRegistry {
    schemes: Arc<FxHashMap<SchemeId, Arc<dyn PartitionScheme>>>,
}

impl SchemeRegistry {
    #[must_use]
    pub fn builder() -> SchemeRegistryBuilder {
        SchemeRegistryBuilder::default()
    }

    #[must_use]
    pub fn get(&self, id: SchemeId) -> Option<&Arc<dyn PartitionScheme>> {
        self.schemes.get(&id)
    }

    /// Looks a scheme up by its persisted name.
    ///
    /// # Errors
    /// Returns [`SchemeError::Domain`] for names outside the scheme set and
    /// [`SchemeError::Unregistered`] for known but unregistered schemes.
    pub fn get_by_name(&self, name: &str) -> Result<&Arc<dyn PartitionScheme>, SchemeError> {
        let id: SchemeId = name.parse()?;
        self.try_get(id)
    }

    /// # Errors
    /// Returns [`SchemeError::Unregistered`] if nothing is registered under `id`.
    pub fn try_get(&self, id: SchemeId) -> Result<&Arc<dyn PartitionScheme>, SchemeError> {
        self.get(id).ok_or_else(|| SchemeError::Unregistered {
            message: format!("Unrecognized scheme '{id}'").into(),
            context: None,
        })
    }

    #[must_use]
    pub fn contains(&self, id: SchemeId) -> bool {
        self.schemes.contains_key(&id)
    }

    /// Decodes a stored partition and rebuilds it through its scheme.
    ///
    /// Schemes may normalize the decoded partition (e.g. force it active).
    ///
    /// # Errors
    /// * [`SchemeError::Payload`] if the payload is malformed or has an unsupported version.
    /// * [`SchemeError::Unregistered`] if its scheme is not registered.
    /// * [`SchemeError::ReadOnly`] if its scheme refuses content-defined partitions.
    pub fn partition_from_json(&self, value: serde_json::Value) -> Result<UserPartition, SchemeError> {
        let decoded: UserPartition =
            serde_json::from_value(value).context("Decoding user partition")?;
        let scheme = self.try_get(decoded.scheme)?;

        if scheme.read_only() {
            return Err(SchemeError::ReadOnly {
                message: format!(
                    "UserPartition {} uses scheme {} which is read only",
                    decoded.id, decoded.scheme
                )
                .into(),
                context: None,
            });
        }

        Ok(scheme.create_user_partition(
            decoded.id,
            &decoded.name,
            &decoded.description,
            decoded.groups,
            decoded.parameters,
            decoded.active,
        ))
    }

    /// Dispatches group assignment to the partition's scheme.
    ///
    /// A partition whose scheme is not registered places nobody in a group.
    #[must_use]
    pub fn group_for_user(
        &self,
        ctx: &GatingContext,
        course_key: &CourseKey,
        user: &User,
        partition: &UserPartition,
    ) -> Option<Group> {
        let Some(scheme) = self.get(partition.scheme) else {
            warn!(scheme = %partition.scheme, partition = partition.id, "Partition scheme not registered");
            return None;
        };
        scheme.group_for_user(ctx, course_key, user, partition)
    }

    #[must_use]
    pub fn access_denied_message(
        &self,
        ctx: &GatingContext,
        partition: &UserPartition,
        block: &UsageKey,
        user: &User,
    ) -> Option<Cow<'static, str>> {
        self.get(partition.scheme)?.access_denied_message(ctx, partition, block, user)
    }

    #[must_use]
    pub fn access_denied_fragment(
        &self,
        ctx: &GatingContext,
        request: &RequestInfo,
        partition: &UserPartition,
        block: &UsageKey,
        user: &User,
    ) -> Option<AccessDeniedFragment> {
        self.get(partition.scheme)?.access_denied_fragment(ctx, request, partition, block, user)
    }
}

#[derive(Debug, Default)]
pub struct SchemeRegistryBuilder {
    schemes: FxHashMap<SchemeId, Arc<dyn PartitionScheme>>,
}

impl SchemeRegistryBuilder {
    /// Registers `scheme` under its own id, replacing any previous registration.
    #[must_use]
    pub fn register(mut self, scheme: Arc<dyn PartitionScheme>) -> Self {
        let id = scheme.id();
        if self.schemes.insert(id, scheme).is_some() {
            warn!(scheme = %id, "Partition scheme registered twice, keeping the latest");
        } else {
            debug!(scheme = %id, "Partition scheme registered");
        }
        self
    }

    #[must_use]
    pub fn build(self) -> SchemeRegistry {
        SchemeRegistry { schemes: Arc::new(self.schemes) }
    }
}
