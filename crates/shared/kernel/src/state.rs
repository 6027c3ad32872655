use crate::context::GatingContext;
use crate::scheme::SchemeRegistry;
use cgate_domain::config::PlatformConfig;
use cgate_domain::registry::{FeatureSlice, InitializedSlice};
use fxhash::FxHashMap;
use std::any::TypeId;
use std::borrow::Cow;
use std::ops::Deref;
use std::sync::Arc;

#[cgate_derive::cgate_error]
pub enum GatingStateError {
    #[error("State validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("State missing feature slice{}: {message}", format_context(.context))]
    MissingSlice { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

#[derive(Debug)]
pub struct GatingStateInner {
    pub config: PlatformConfig,
    pub context: GatingContext,
    pub registry: SchemeRegistry,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

/// Process-wide handle to the initialized gating slices.
#[derive(Debug, Clone)]
pub struct GatingState {
    inner: Arc<GatingStateInner>,
}

impl GatingState {
    #[must_use]
    pub fn builder() -> GatingStateBuilder {
        GatingStateBuilder::default()
    }

    #[must_use]
    pub fn get_slice<T: FeatureSlice>(&self) -> Option<&T> {
        self.inner
            .slices
            .get(&TypeId::of::<T>())
            .and_then(|initialized| initialized.state.as_any().downcast_ref::<T>())
    }

    /// Returns a reference to the slice if it is registered.
    ///
    /// # Errors
    /// Returns an error if the slice is not registered.
    pub fn try_get_slice<T: FeatureSlice>(&self) -> Result<&T, GatingStateError> {
        self.get_slice::<T>().ok_or_else(|| GatingStateError::MissingSlice {
            message: std::any::type_name::<T>().into(),
            context: None,
        })
    }

    /// Names of the registered slices, for diagnostics.
    pub fn slice_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.inner.slices.values().map(InitializedSlice::name)
    }
}

impl Deref for GatingState {
    type Target = GatingStateInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Default)]
pub struct GatingStateBuilder {
    config: Option<PlatformConfig>,
    context: Option<GatingContext>,
    registry: Option<SchemeRegistry>,
    slices: FxHashMap<TypeId, InitializedSlice>,
}

impl GatingStateBuilder {
    #[must_use]
    pub fn config(mut self, config: PlatformConfig) -> Self {
        self.config = Some(config);
        self
    }

    #[must_use]
    pub fn context(mut self, context: GatingContext) -> Self {
        self.context = Some(context);
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: SchemeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn register_slice(mut self, slice: InitializedSlice) -> Self {
        self.slices.insert(slice.id, slice);
        self
    }

    /// Registers multiple slices at once.
    #[must_use]
    pub fn register_slices<I>(mut self, slices: I) -> Self
    where
        I: IntoIterator<Item = InitializedSlice>,
    {
        for slice in slices {
            self.slices.insert(slice.id, slice);
        }
        self
    }

    /// # Errors
    /// Returns [`GatingStateError::Validation`] if no context was provided.
    pub fn build(self) -> Result<GatingState, GatingStateError> {
        let context = self.context.ok_or_else(|| GatingStateError::Validation {
            message: "GatingContext not provided".into(),
            context: None,
        })?;
        let config = self.config.unwrap_or_default();
        let registry = self.registry.unwrap_or_default();

        Ok(GatingState {
            inner: Arc::new(GatingStateInner { config, context, registry, slices: self.slices }),
        })
    }
}
