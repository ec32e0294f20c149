use std::borrow::Cow;

#[hb_derive::hb_error]
pub enum TransactionError {
    /// The request violates transaction rules; no state was changed.
    #[error("Invalid transaction operation{}: {message}", format_context(.context))]
    InvalidOperation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The action or the commit failed and the transaction was rolled back. `message` is the
    /// original cause.
    #[error("Transaction failed{}: {message}", format_context(.context))]
    Failed { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The host refused to start or roll back a transaction.
    #[error("Transaction backend error{}: {message}", format_context(.context))]
    Backend { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal transaction error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
