use crate::error::TransactionError;
use crate::{TransactionBackend, TransactionRecord, TransactionStatus};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt::{self, Display};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

pub const DEFAULT_HISTORY_LIMIT: usize = 64;

#[derive(Debug, Clone)]
struct OpenEntry {
    id: u64,
    name: String,
}

struct Inner {
    backend: Arc<dyn TransactionBackend>,
    allow_nesting: bool,
    open: Mutex<Vec<OpenEntry>>,
    /// The single mutation slot. Held for the whole of an exclusive unit of work.
    slot: Arc<tokio::sync::Mutex<()>>,
    history: Mutex<VecDeque<TransactionRecord>>,
    history_limit: usize,
    next_id: AtomicU64,
}

impl fmt::Debug for Inner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionCoordinator")
            .field("allow_nesting", &self.allow_nesting)
            .field("open", &self.open.lock().len())
            .finish_non_exhaustive()
    }
}

/// Begins, commits and rolls back transactions against one backend.
///
/// Open transactions form a stack and commits must happen innermost first. Rolling back (or
/// dropping) a transaction that still has inner transactions open rolls those back first. When
/// nesting is not allowed, beginning a second transaction fails with
/// [`TransactionError::InvalidOperation`] and leaves everything as it was.
///
/// Cloning is cheap and clones share state.
#[derive(Debug, Clone)]
pub struct TransactionCoordinator {
    inner: Arc<Inner>,
}

impl TransactionCoordinator {
    #[must_use]
    pub fn new(backend: Arc<dyn TransactionBackend>, allow_nesting: bool) -> Self {
        Self::with_history_limit(backend, allow_nesting, DEFAULT_HISTORY_LIMIT)
    }

    #[must_use]
    pub fn with_history_limit(
        backend: Arc<dyn TransactionBackend>,
        allow_nesting: bool,
        history_limit: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                allow_nesting,
                open: Mutex::new(Vec::new()),
                slot: Arc::new(tokio::sync::Mutex::new(())),
                history: Mutex::new(VecDeque::with_capacity(history_limit)),
                history_limit,
                next_id: AtomicU64::new(1),
            }),
        }
    }

    #[must_use]
    pub fn allows_nesting(&self) -> bool {
        self.inner.allow_nesting
    }

    /// Number of currently open transactions.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.inner.open.lock().len()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.open_count() > 0
    }

    /// Finished transactions, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<TransactionRecord> {
        self.inner.history.lock().iter().cloned().collect()
    }

    pub fn begin_transaction(&self, name: &str) -> Result<Transaction, TransactionError> {
        let mut open = self.inner.open.lock();

        if !self.inner.allow_nesting
            && let Some(active) = open.last()
        {
            return Err(TransactionError::InvalidOperation {
                message: format!(
                    "cannot begin '{name}' while '{}' is open; nested transactions are not supported",
                    active.name
                )
                .into(),
                context: None,
            });
        }

        let depth = open.len();
        self.inner.backend.start(name, depth)?;

        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        open.push(OpenEntry { id, name: name.to_owned() });
        debug!(id, name, depth, "Transaction started");

        Ok(Transaction {
            id,
            name: name.to_owned(),
            depth,
            status: TransactionStatus::Started,
            inner: Arc::clone(&self.inner),
        })
    }

    pub fn commit(&self, transaction: &mut Transaction) -> Result<(), TransactionError> {
        transaction.commit()
    }

    pub fn rollback(&self, transaction: &mut Transaction) -> Result<(), TransactionError> {
        transaction.rollback()
    }

    /// Runs `action` inside a new transaction.
    ///
    /// Commits when `action` succeeds. When it fails or panics, rolls back and returns
    /// [`TransactionError::Failed`] carrying the original message. No transaction is left open
    /// either way.
    pub fn execute_in_transaction<T, E, F>(&self, name: &str, action: F) -> Result<T, TransactionError>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display,
    {
        let mut transaction = self.begin_transaction(name)?;

        let cause = match catch_unwind(AssertUnwindSafe(action)) {
            Ok(Ok(value)) => {
                transaction.commit()?;
                return Ok(value);
            },
            Ok(Err(e)) => e.to_string(),
            Err(payload) => format!("operation panicked: {}", panic_message(payload.as_ref())),
        };

        if let Err(e) = transaction.rollback() {
            warn!(name, error = %e, "Rollback after failure also failed");
        }
        Err(TransactionError::Failed { message: cause.into(), context: Some(name.to_owned().into()) })
    }

    /// Waits for the mutation slot, then runs [`Self::execute_in_transaction`] on the blocking
    /// pool.
    ///
    /// The slot is released only when the action has finished, even if the awaiting caller has
    /// gone away in the meantime.
    pub async fn execute_exclusive<T, E, F>(&self, name: &str, action: F) -> Result<T, TransactionError>
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: Display + 'static,
    {
        let permit = Arc::clone(&self.inner.slot).lock_owned().await;
        let this = self.clone();
        let owned_name = name.to_owned();

        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            this.execute_in_transaction(&owned_name, action)
        })
        .await
        .map_err(|e| TransactionError::Internal {
            message: e.to_string().into(),
            context: Some(name.to_owned().into()),
        })?
    }

    /// Runs a read-only `action` on the blocking pool without taking the mutation slot.
    pub async fn execute_shared<T, F>(&self, action: F) -> Result<T, TransactionError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(action).await.map_err(|e| TransactionError::Internal {
            message: e.to_string().into(),
            context: Some("read".into()),
        })
    }
}

impl Inner {
    fn finish(&self, transaction: &mut Transaction, commit: bool) -> Result<(), TransactionError> {
        if transaction.status != TransactionStatus::Started {
            return Err(TransactionError::InvalidOperation {
                message: format!("'{}' is already {}", transaction.name, transaction.status).into(),
                context: None,
            });
        }

        let mut open = self.open.lock();
        let Some(position) = open.iter().position(|entry| entry.id == transaction.id) else {
            // Already rolled back together with an enclosing transaction.
            transaction.status = TransactionStatus::RolledBack;
            if commit {
                return Err(TransactionError::InvalidOperation {
                    message: format!("'{}' was rolled back with its enclosing transaction", transaction.name)
                        .into(),
                    context: None,
                });
            }
            return Ok(());
        };

        if position + 1 < open.len() {
            if commit {
                let top = open.last().map(|entry| entry.name.clone()).unwrap_or_default();
                return Err(TransactionError::InvalidOperation {
                    message: format!(
                        "'{}' cannot finish while inner transaction '{top}' is open",
                        transaction.name
                    )
                    .into(),
                    context: None,
                });
            }
            while open.len() > position + 1 {
                let depth = open.len() - 1;
                let Some(entry) = open.pop() else { break };
                if let Err(e) = self.backend.rollback(&entry.name, depth) {
                    warn!(id = entry.id, name = %entry.name, error = %e, "Rollback of inner transaction failed");
                }
                debug!(id = entry.id, name = %entry.name, "Inner transaction rolled back with its parent");
                self.push_record(TransactionRecord {
                    id: entry.id,
                    name: entry.name,
                    depth,
                    status: TransactionStatus::RolledBack,
                });
            }
        }

        let outcome = if commit {
            self.backend.commit(&transaction.name, transaction.depth).map_err(|e| {
                let cause = e.to_string();
                if let Err(rollback) = self.backend.rollback(&transaction.name, transaction.depth) {
                    warn!(name = %transaction.name, error = %rollback, "Rollback after failed commit failed");
                }
                TransactionError::Failed {
                    message: cause.into(),
                    context: Some(format!("commit of '{}'", transaction.name).into()),
                }
            })
        } else {
            self.backend.rollback(&transaction.name, transaction.depth)
        };

        open.pop();
        drop(open);

        transaction.status = if commit && outcome.is_ok() {
            TransactionStatus::Committed
        } else {
            TransactionStatus::RolledBack
        };
        debug!(id = transaction.id, name = %transaction.name, status = %transaction.status, "Transaction finished");
        self.record(transaction);

        outcome
    }

    fn record(&self, transaction: &Transaction) {
        self.push_record(TransactionRecord {
            id: transaction.id,
            name: transaction.name.clone(),
            depth: transaction.depth,
            status: transaction.status,
        });
    }

    fn push_record(&self, record: TransactionRecord) {
        if self.history_limit == 0 {
            return;
        }
        let mut history = self.history.lock();
        while history.len() >= self.history_limit {
            history.pop_front();
        }
        history.push_back(record);
    }
}

/// A live transaction. Dropping it while still started rolls it back.
#[derive(Debug)]
pub struct Transaction {
    id: u64,
    name: String,
    depth: usize,
    status: TransactionStatus,
    inner: Arc<Inner>,
}

impl Transaction {
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero for an outermost transaction.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub const fn status(&self) -> TransactionStatus {
        self.status
    }

    /// On failure the transaction is rolled back and the error carries the commit failure.
    pub fn commit(&mut self) -> Result<(), TransactionError> {
        let inner = Arc::clone(&self.inner);
        inner.finish(self, true)
    }

    pub fn rollback(&mut self) -> Result<(), TransactionError> {
        let inner = Arc::clone(&self.inner);
        inner.finish(self, false)
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.status == TransactionStatus::Started {
            warn!(id = self.id, name = %self.name, "Transaction dropped while open, rolling back");
            if let Err(e) = self.rollback() {
                warn!(id = self.id, error = %e, "Automatic rollback failed");
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
