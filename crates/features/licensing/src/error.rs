use std::borrow::Cow;

/// Error types specific to the licensing feature.
#[hb_derive::hb_error]
pub enum LicenseError {
    #[error("License has expired{}: {message}", format_context(.context))]
    Expired { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("License is not valid yet{}: {message}", format_context(.context))]
    NotYetValid { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("License signature is invalid or tampered{}: {source}", format_context(.context))]
    InvalidSignature { source: ed25519_dalek::SignatureError, context: Option<Cow<'static, str>> },

    #[error("Invalid license key{}: {message}", format_context(.context))]
    InvalidKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("License file error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// Serde serialization error with optional context.
    #[error("Serde serialization error{}: {source}", format_context(.context))]
    SerdeSerialize { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Postcard serialization error with optional context.
    #[error("Postcard serialization error{}: {source}", format_context(.context))]
    PostcardSerialize { source: postcard::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal licensing error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
