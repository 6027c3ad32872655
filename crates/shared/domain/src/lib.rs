//! # Domain Models
//!
//! Pure types shared by every gating feature: courses, enrollments, course modes,
//! user partitions and their groups, feature flags and platform configuration.
//! Keep it lean: no I/O and no collaborator lookups, just data and simple helpers.

pub mod config;
pub mod constants;
pub mod course;
pub mod enrollment;
mod error;
pub mod features;
pub mod partition;
pub mod registry;

pub use crate::error::{DomainError, DomainErrorExt};
