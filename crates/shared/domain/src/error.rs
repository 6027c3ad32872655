use std::borrow::Cow;

/// Errors raised while building or decoding domain values.
#[cgate_derive::cgate_error]
pub enum DomainError {
    /// Course key string does not match any known format.
    #[error("Invalid course key{}: {message}", format_context(.context))]
    InvalidCourseKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Scheme name outside the fixed scheme set.
    #[error("Unrecognized partition scheme{}: {message}", format_context(.context))]
    UnrecognizedScheme { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Group lookup by id failed.
    #[error("No such partition group{}: {message}", format_context(.context))]
    NoSuchGroup { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Serialized partition or group payload is malformed.
    #[error("Invalid partition payload{}: {message}", format_context(.context))]
    InvalidPayload { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
