//! # Call Bridge
//!
//! Validated, timed, transactional dispatch of named operations onto the active host adapter.
//!
//! A call carries a method name, a JSON parameter string and an optional timeout. The
//! [`CallBridge`] rejects oversized, malformed or malicious payloads before any side effect,
//! gates the method on host capabilities and features, runs mutating methods inside a
//! transaction, and always answers with a [`CallResponse`] envelope.

mod bridge;
mod builtin;
mod envelope;
mod error;
mod method;

pub use crate::bridge::CallBridge;
pub use crate::builtin::builtin_methods;
pub use crate::envelope::{CallResponse, ErrorBody};
pub use crate::error::{BridgeError, BridgeErrorExt};
pub use crate::method::{Access, Handler, MethodContext, MethodSpec, MethodTable, reply};
