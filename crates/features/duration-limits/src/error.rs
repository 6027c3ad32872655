use cgate_kernel::state::GatingStateError;
use std::borrow::Cow;

/// A specialized [`DurationLimitError`] enum of this crate.
#[cgate_derive::cgate_error]
pub enum DurationLimitError {
    /// Caller passed an unsupported combination of arguments.
    #[error("Invalid argument{}: {message}", format_context(.context))]
    InvalidArgument { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    /// Configuration record rejected on write.
    #[error("Invalid duration limit config{}: {message}", format_context(.context))]
    InvalidConfig { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
    #[error("Duration limits state error{}: {source}", format_context(.context))]
    State { source: GatingStateError, context: Option<Cow<'static, str>> },
    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal duration limits error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
