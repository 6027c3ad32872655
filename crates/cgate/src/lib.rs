//! Facade crate for course gating features and shared modules.
//! Re-exports domain/kernel primitives and aggregates feature initialization.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Add `cgate` with the desired feature slices (`content-gating`/`duration-limits`).
//! - Build a [`kernel::context::GatingContext`] over your stores and call [`init`].
//!
//! ```rust
//! use cgate::kernel::context::GatingContext;
//! use cgate::kernel::domain::config::PlatformConfig;
//! use cgate::kernel::memory::{InMemoryCourseModes, InMemoryEnrollments};
//! use std::sync::Arc;
//!
//! let ctx = GatingContext::builder()
//!     .enrollments(Arc::new(InMemoryEnrollments::default()))
//!     .modes(Arc::new(InMemoryCourseModes::default()))
//!     .build()
//!     .unwrap();
//! let limits = Arc::new(cgate::features::duration_limits::InMemoryDurationLimits::default());
//!
//! let state = cgate::init(PlatformConfig::default(), ctx, limits).unwrap();
//! assert_eq!(state.slice_names().count(), 2);
//! ```

use cgate_kernel::context::GatingContext;
use cgate_kernel::scheme::SchemeRegistry;
use cgate_kernel::state::{GatingState, GatingStateError};
use std::borrow::Cow;

pub use cgate_domain as domain;
pub use cgate_kernel as kernel;
#[cfg(feature = "logging")]
pub use cgate_logger as logger;

use cgate_domain::config::PlatformConfig;

/// Feature registry for runtime introspection.
pub mod features {
    #[cfg(feature = "content-gating")]
    pub use cgate_content_gating as content_gating;
    #[cfg(feature = "duration-limits")]
    pub use cgate_duration_limits as duration_limits;

    /// Build-time enabled features (by Cargo feature).
    pub const ENABLED: &[&str] = &[
        #[cfg(feature = "content-gating")]
        "content_gating",
        #[cfg(feature = "duration-limits")]
        "duration_limits",
        #[cfg(feature = "logging")]
        "logging",
    ];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Errors raised while wiring the gating state.
#[cgate_derive::cgate_error]
pub enum InitError {
    #[cfg(feature = "content-gating")]
    #[error("Content gating init failed{}: {source}", format_context(.context))]
    ContentGating {
        source: cgate_content_gating::ContentGatingError,
        context: Option<Cow<'static, str>>,
    },
    #[cfg(feature = "duration-limits")]
    #[error("Duration limits init failed{}: {source}", format_context(.context))]
    DurationLimits {
        source: cgate_duration_limits::DurationLimitError,
        context: Option<Cow<'static, str>>,
    },
    #[error("Gating state error{}: {source}", format_context(.context))]
    State { source: GatingStateError, context: Option<Cow<'static, str>> },
}

/// Registers the partition schemes of every enabled slice.
#[must_use]
pub fn scheme_registry() -> SchemeRegistry {
    let builder = SchemeRegistry::builder();
    #[cfg(feature = "content-gating")]
    let builder = features::content_gating::register(builder);
    builder.build()
}

/// Initialize all enabled features and assemble the gating state.
///
/// The context's flags are replaced with the ones from `config`.
///
/// # Errors
/// Returns an error if any feature initialization fails.
pub fn init(
    config: PlatformConfig,
    ctx: GatingContext,
    #[cfg(feature = "duration-limits")] duration_resolver: std::sync::Arc<
        dyn features::duration_limits::DurationLimitResolver,
    >,
) -> Result<GatingState, InitError> {
    let ctx = ctx.with_flags(config.flags.feature_flags());
    let registry = scheme_registry();

    let mut slices = Vec::new();

    // Content type gating
    #[cfg(feature = "content-gating")]
    slices.push(features::content_gating::init(registry.clone())?);

    // Course duration limits
    #[cfg(feature = "duration-limits")]
    slices.push(features::duration_limits::init(duration_resolver, config.duration)?);

    let state = GatingState::builder()
        .config(config)
        .context(ctx)
        .registry(registry)
        .register_slices(slices)
        .build()?;

    tracing::info!(
        slices = ?state.slice_names().collect::<Vec<_>>(),
        flags = ?state.context.flags,
        "Gating state initialized"
    );

    Ok(state)
}
