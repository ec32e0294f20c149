use std::borrow::Cow;

/// Failures inside a single probe. They never escape [`crate::VersionDetector::detect`].
#[hb_derive::hb_error]
pub enum DetectionError {
    #[error("Detection I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Installation record error{}: {source}", format_context(.context))]
    Records { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Version pattern error{}: {source}", format_context(.context))]
    Pattern { source: regex::Error, context: Option<Cow<'static, str>> },

    #[error("Implausible version{}: {message}", format_context(.context))]
    Implausible { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
