//! # Transactions
//!
//! Atomic mutation against a host application.
//!
//! [`TransactionCoordinator`] owns the stack of open transactions for one backend, enforces
//! the nesting rule of the active host version, and funnels exclusive work through a single
//! mutation slot. Read-only work bypasses the slot.

mod coordinator;
mod error;

pub use crate::coordinator::{DEFAULT_HISTORY_LIMIT, Transaction, TransactionCoordinator};
pub use crate::error::{TransactionError, TransactionErrorExt};
use serde::Serialize;
use strum_macros::{Display, IntoStaticStr};

/// Host side of a transaction. `depth` is zero for an outermost transaction; deeper levels map
/// to whatever the host offers for nesting.
pub trait TransactionBackend: Send + Sync {
    fn start(&self, name: &str, depth: usize) -> Result<(), TransactionError>;
    fn commit(&self, name: &str, depth: usize) -> Result<(), TransactionError>;
    fn rollback(&self, name: &str, depth: usize) -> Result<(), TransactionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, IntoStaticStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransactionStatus {
    Started,
    Committed,
    #[serde(rename = "rolledback")]
    #[strum(serialize = "rolledback")]
    RolledBack,
}

/// A finished transaction as kept in the coordinator history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub id: u64,
    pub name: String,
    pub depth: usize,
    pub status: TransactionStatus,
}

/// Backend that accepts every request. Useful when the host has no transaction concept.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopBackend;

impl TransactionBackend for NoopBackend {
    fn start(&self, _name: &str, _depth: usize) -> Result<(), TransactionError> {
        Ok(())
    }

    fn commit(&self, _name: &str, _depth: usize) -> Result<(), TransactionError> {
        Ok(())
    }

    fn rollback(&self, _name: &str, _depth: usize) -> Result<(), TransactionError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_renders_wire_names() {
        assert_eq!(TransactionStatus::RolledBack.to_string(), "rolledback");
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Committed).ok().as_deref(),
            Some("\"committed\"")
        );
    }
}
