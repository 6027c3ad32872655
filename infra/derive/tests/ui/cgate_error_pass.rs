use cgate_derive::cgate_error;
use std::borrow::Cow;

#[cgate_error]
pub enum GatingError {
    #[error("Scheme lookup error{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Internal gating error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn main() {}
