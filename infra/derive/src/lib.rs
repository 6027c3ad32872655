#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by every `CourseGate` crate.
//!
//! * [`macro@cgate_error`] turns an enum into a context-aware error type.
//! * [`macro@cgate_slice`] turns a struct into a shareable feature slice handle.
//!
//! The examples below are `ignore`d to avoid compiling in this crate; the
//! consuming crates' tests exercise them.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

/// Attribute macro for defining crate-level error enums.
///
/// Derives `Debug` and `thiserror::Error`, then generates:
///
/// * a `<Name>Ext` trait with `.context(..)` for `Result<T, Name>` and for results of
///   every wrapped `source` type, so `?` and context attach in one step;
/// * `From<Source>` for each variant with a `source` field;
/// * `From<&'static str>` and `From<String>` when an `Internal { message, .. }` variant exists;
/// * `kind(&self) -> &'static str`, the `snake_case` variant name for log fields.
///
/// Each variant must use named fields and carry `context: Option<Cow<'static, str>>`.
/// `#[cfg]` attributes on variants are carried over to the generated items.
///
/// # Example
///
/// ```rust,ignore
/// use cgate_derive::cgate_error;
/// use std::borrow::Cow;
///
/// #[cgate_error]
/// pub enum PolicyError {
///     #[error("Invalid argument{}: {message}", format_context(.context))]
///     InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Internal fault{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// let err = PolicyError::from("unexpected");
/// assert_eq!(err.kind(), "internal");
/// ```
#[proc_macro_attribute]
pub fn cgate_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Attribute macro to define a feature slice handle.
///
/// This macro transforms a struct into the slice pattern:
/// 1. Generates a thread-safe `Arc` wrapper around `<Name>Inner`.
/// 2. Implements `Deref` for transparent access to the inner state.
/// 3. Implements `FeatureSlice` so the slice can be registered in a `GatingState`.
///
/// # Example
/// ```rust,ignore
/// #[cgate_derive::cgate_slice]
/// pub struct ContentGating {
///     pub registry: SchemeRegistry,
/// }
///
/// let slice = ContentGating::new(ContentGatingInner { registry });
/// assert_eq!(slice.slice_name(), "content_gating");
/// ```
#[proc_macro_attribute]
pub fn cgate_slice(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(input).into()
}
