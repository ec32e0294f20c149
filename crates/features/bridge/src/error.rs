use hb_adapters::{AdapterError, HostError};
use hb_catalog::CatalogError;
use hb_kernel::security::GuardError;
use hb_transactions::TransactionError;
use std::borrow::Cow;

/// Every failure a bridge caller can see. `kind()` is the wire error code.
#[hb_derive::hb_error]
pub enum BridgeError {
    /// No supported host could be identified.
    #[error("Detection failed{}: {message}", format_context(.context))]
    Detection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A version or feature requirement of the operation is unmet.
    #[error("Compatibility error{}: {message}", format_context(.context))]
    Compatibility { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Malformed, oversized or malicious input. Rejected before any side effect.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// An enabled feature lacks a prerequisite. `message` names it.
    #[error("Dependency error{}: {message}", format_context(.context))]
    Dependency { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The mutating action or its commit failed and was rolled back. `message` is the original
    /// cause.
    #[error("Transaction failed{}: {message}", format_context(.context))]
    Transaction { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The caller stopped waiting. The operation may still complete on the host.
    #[error("Timed out{}: {message}", format_context(.context))]
    Timeout { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Intentionally unavailable on this host; callers should fall back.
    #[error("Not supported{}: {message}", format_context(.context))]
    NotSupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not connected{}: {message}", format_context(.context))]
    NotConnected { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Method not found{}: {message}", format_context(.context))]
    MethodNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Conversion error{}: {message}", format_context(.context))]
    Conversion { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The host operation failed or panicked.
    #[error("Operation failed{}: {message}", format_context(.context))]
    Operation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Cancelled{}: {message}", format_context(.context))]
    Cancelled { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal bridge error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl BridgeError {
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Validation { message: message.into(), context: None }
    }

    pub fn operation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::Operation { message: message.into(), context: None }
    }
}

impl From<GuardError> for BridgeError {
    fn from(e: GuardError) -> Self {
        match e {
            GuardError::Oversized { .. } | GuardError::Malformed { .. } | GuardError::Injection { .. } => {
                Self::Validation { message: e.to_string().into(), context: None }
            },
            GuardError::Pattern { .. } => Self::Internal { message: e.to_string().into(), context: None },
        }
    }
}

impl From<CatalogError> for BridgeError {
    fn from(e: CatalogError) -> Self {
        let message = e.to_string().into();
        match e {
            CatalogError::MissingDependency { .. }
            | CatalogError::UnknownDependency { .. }
            | CatalogError::DependencyCycle { .. } => Self::Dependency { message, context: None },
            CatalogError::Incompatible { .. } | CatalogError::UnknownFeature { .. } => {
                Self::Compatibility { message, context: None }
            },
            CatalogError::InvalidDefinition { .. } | CatalogError::Serialize { .. } => {
                Self::Internal { message, context: None }
            },
        }
    }
}

impl From<TransactionError> for BridgeError {
    fn from(e: TransactionError) -> Self {
        match e {
            TransactionError::Failed { message, context } => Self::Transaction { message, context },
            TransactionError::InvalidOperation { .. } | TransactionError::Backend { .. } => {
                Self::Transaction { message: e.to_string().into(), context: None }
            },
            TransactionError::Internal { .. } => {
                Self::Internal { message: e.to_string().into(), context: None }
            },
        }
    }
}

impl From<AdapterError> for BridgeError {
    fn from(e: AdapterError) -> Self {
        let message = e.to_string().into();
        match e {
            AdapterError::Conversion { .. } => Self::Conversion { message, context: None },
            AdapterError::NotSupported { .. } => Self::NotSupported { message, context: None },
            AdapterError::Precondition { .. } => Self::Compatibility { message, context: None },
            AdapterError::Host { source: HostError::InvalidArgument { .. }, .. } => {
                Self::Validation { message, context: None }
            },
            AdapterError::Host { .. } => Self::Operation { message, context: None },
            AdapterError::Transaction { source, .. } => source.into(),
            AdapterError::Catalog { source, .. } => source.into(),
            AdapterError::Internal { .. } => Self::Internal { message, context: None },
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal { message: e.to_string().into(), context: Some("serializing result".into()) }
    }
}
