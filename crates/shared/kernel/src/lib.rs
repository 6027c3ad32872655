//! Kernel utilities shared across gating slices.
//! Keep this crate lightweight: it defines the collaborator ports, the scheme registry and the
//! per-request evaluation context, and re-exports the domain crate.
//!
//! ## Wiring a context
//! ```rust
//! use cgate_kernel::context::GatingContext;
//! use cgate_kernel::domain::features::FeatureFlags;
//! use cgate_kernel::memory::{InMemoryCourseModes, InMemoryEnrollments};
//! use std::sync::Arc;
//!
//! let ctx = GatingContext::builder()
//!     .flags(FeatureFlags::CONTENT_TYPE_GATING)
//!     .enrollments(Arc::new(InMemoryEnrollments::default()))
//!     .modes(Arc::new(InMemoryCourseModes::default()))
//!     .build()
//!     .unwrap();
//! assert!(ctx.flags.gating_enabled());
//! ```
//!
//! ## Config loading (non-wasm)
//! ```rust,ignore
//! use cgate_kernel::config::load_config;
//! use cgate_kernel::domain::config::PlatformConfig;
//! let cfg: PlatformConfig = load_config(Some("gating")).unwrap();
//! ```
#[cfg(not(target_arch = "wasm32"))]
pub mod config;
pub mod context;
pub mod memory;
pub mod ports;
pub mod scheme;
pub mod state;

pub use cgate_domain as domain;
