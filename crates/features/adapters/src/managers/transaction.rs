use crate::host::{HostApplication, HostError};
use hb_transactions::{TransactionBackend, TransactionCoordinator, TransactionError};
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Maps coordinator depth onto host transactions: depth zero is the main transaction, deeper
/// levels are sub-transactions.
pub struct HostTransactionBackend {
    host: Arc<dyn HostApplication>,
}

impl fmt::Debug for HostTransactionBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostTransactionBackend").field("product", &self.host.product()).finish()
    }
}

impl HostTransactionBackend {
    #[must_use]
    pub fn new(host: Arc<dyn HostApplication>) -> Self {
        Self { host }
    }
}

fn backend_error(name: &str, e: &HostError) -> TransactionError {
    TransactionError::Backend { message: e.to_string().into(), context: Some(name.to_owned().into()) }
}

impl TransactionBackend for HostTransactionBackend {
    fn start(&self, name: &str, depth: usize) -> Result<(), TransactionError> {
        match depth {
            0 => self.host.start_transaction(name),
            _ => self.host.start_sub_transaction(),
        }
        .map_err(|e| backend_error(name, &e))
    }

    fn commit(&self, name: &str, depth: usize) -> Result<(), TransactionError> {
        match depth {
            0 => self.host.commit_transaction(),
            _ => self.host.commit_sub_transaction(),
        }
        .map_err(|e| backend_error(name, &e))
    }

    fn rollback(&self, name: &str, depth: usize) -> Result<(), TransactionError> {
        match depth {
            0 => self.host.rollback_transaction(),
            _ => self.host.rollback_sub_transaction(),
        }
        .map_err(|e| backend_error(name, &e))
    }
}

/// The adapter's transaction capability: a coordinator over the host's transactions. This is
/// the only part of an adapter with live state.
#[derive(Debug, Clone)]
pub struct TransactionManager {
    coordinator: TransactionCoordinator,
}

impl TransactionManager {
    pub(crate) fn new(host: Arc<dyn HostApplication>, allow_nesting: bool) -> Self {
        let backend = Arc::new(HostTransactionBackend::new(host));
        Self { coordinator: TransactionCoordinator::new(backend, allow_nesting) }
    }

    #[must_use]
    pub const fn coordinator(&self) -> &TransactionCoordinator {
        &self.coordinator
    }
}

impl Deref for TransactionManager {
    type Target = TransactionCoordinator;

    fn deref(&self) -> &Self::Target {
        &self.coordinator
    }
}
