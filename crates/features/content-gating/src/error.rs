use cgate_kernel::ports::PortError;
use cgate_kernel::state::GatingStateError;
use std::borrow::Cow;

/// A specialized [`ContentGatingError`] enum of this crate.
#[cgate_derive::cgate_error]
pub enum ContentGatingError {
    /// The access-denied fragment could not be rendered.
    #[error("Access denied fragment error{}: {source}", format_context(.context))]
    Render { source: PortError, context: Option<Cow<'static, str>> },
    /// The slice is missing from the gating state.
    #[error("Content gating state error{}: {source}", format_context(.context))]
    State { source: GatingStateError, context: Option<Cow<'static, str>> },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal content gating error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
