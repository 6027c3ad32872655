use crate::ports::{
    CommerceService, CourseCatalog, CourseModeStore, DisabledCommerce, EmptyCatalog,
    EnrollmentStore, MasqueradeService, NoMasquerade,
};
use cgate_domain::features::FeatureFlags;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[cgate_derive::cgate_error]
pub enum ContextError {
    #[error("Context validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Everything a gating decision may consult: feature flags and collaborator ports.
#[derive(Debug)]
pub struct GatingContextInner {
    pub flags: FeatureFlags,
    pub enrollments: Arc<dyn EnrollmentStore>,
    pub modes: Arc<dyn CourseModeStore>,
    pub masquerade: Arc<dyn MasqueradeService>,
    pub commerce: Arc<dyn CommerceService>,
    pub catalog: Arc<dyn CourseCatalog>,
}

/// Cheaply cloneable evaluation context.
///
/// Decisions are pure functions of this context and their explicit arguments.
#[derive(Debug, Clone)]
pub struct GatingContext {
    inner: Arc<GatingContextInner>,
}

impl GatingContext {
    #[must_use]
    pub fn builder() -> GatingContextBuilder {
        GatingContextBuilder::default()
    }

    /// Same collaborators, different flags.
    #[must_use]
    pub fn with_flags(&self, flags: FeatureFlags) -> Self {
        Self {
            inner: Arc::new(GatingContextInner {
                flags,
                enrollments: Arc::clone(&self.inner.enrollments),
                modes: Arc::clone(&self.inner.modes),
                masquerade: Arc::clone(&self.inner.masquerade),
                commerce: Arc::clone(&self.inner.commerce),
                catalog: Arc::clone(&self.inner.catalog),
            }),
        }
    }
}

impl Deref for GatingContext {
    type Target = GatingContextInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Default)]
pub struct GatingContextBuilder {
    flags: FeatureFlags,
    enrollments: Option<Arc<dyn EnrollmentStore>>,
    modes: Option<Arc<dyn CourseModeStore>>,
    masquerade: Option<Arc<dyn MasqueradeService>>,
    commerce: Option<Arc<dyn CommerceService>>,
    catalog: Option<Arc<dyn CourseCatalog>>,
}

impl GatingContextBuilder {
    #[must_use]
    pub const fn flags(mut self, flags: FeatureFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn enrollments(mut self, store: Arc<dyn EnrollmentStore>) -> Self {
        self.enrollments = Some(store);
        self
    }

    #[must_use]
    pub fn modes(mut self, store: Arc<dyn CourseModeStore>) -> Self {
        self.modes = Some(store);
        self
    }

    #[must_use]
    pub fn masquerade(mut self, service: Arc<dyn MasqueradeService>) -> Self {
        self.masquerade = Some(service);
        self
    }

    #[must_use]
    pub fn commerce(mut self, service: Arc<dyn CommerceService>) -> Self {
        self.commerce = Some(service);
        self
    }

    #[must_use]
    pub fn catalog(mut self, catalog: Arc<dyn CourseCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Builds the context. Masquerade, commerce and catalog fall back to inert services.
    ///
    /// # Errors
    /// Returns [`ContextError::Validation`] if the enrollment or course-mode store is missing.
    pub fn build(self) -> Result<GatingContext, ContextError> {
        let enrollments = self.enrollments.ok_or_else(|| ContextError::Validation {
            message: "EnrollmentStore not provided".into(),
            context: None,
        })?;
        let modes = self.modes.ok_or_else(|| ContextError::Validation {
            message: "CourseModeStore not provided".into(),
            context: None,
        })?;

        Ok(GatingContext {
            inner: Arc::new(GatingContextInner {
                flags: self.flags,
                enrollments,
                modes,
                masquerade: self.masquerade.unwrap_or_else(|| Arc::new(NoMasquerade)),
                commerce: self.commerce.unwrap_or_else(|| Arc::new(DisabledCommerce)),
                catalog: self.catalog.unwrap_or_else(|| Arc::new(EmptyCatalog)),
            }),
        })
    }
}
