use crate::host::HostError;
use hb_catalog::CatalogError;
use hb_transactions::TransactionError;
use std::borrow::Cow;

#[hb_derive::hb_error]
pub enum AdapterError {
    /// A value has no representation on the other side of the adapter.
    #[error("Conversion error{}: {message}", format_context(.context))]
    Conversion { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The active version intentionally does not offer this capability.
    #[error("Not supported{}: {message}", format_context(.context))]
    NotSupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Initialization preconditions were not met; nothing was published.
    #[error("Adapter precondition failed{}: {message}", format_context(.context))]
    Precondition { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The host raised a fault while serving a request.
    #[error("Host error{}: {source}", format_context(.context))]
    Host { source: HostError, context: Option<Cow<'static, str>> },

    #[error("Transaction error{}: {source}", format_context(.context))]
    Transaction { source: TransactionError, context: Option<Cow<'static, str>> },

    #[error("Feature catalog error{}: {source}", format_context(.context))]
    Catalog { source: CatalogError, context: Option<Cow<'static, str>> },

    #[error("Internal adapter error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
