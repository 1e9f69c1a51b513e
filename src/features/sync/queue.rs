//! Sync queue storage and management.
//!
//! The queue is a single JSON snapshot in the key-value store, rewritten
//! whole on every mutation. All read-modify-write cycles go through one
//! in-process mutex, so an enqueue that lands while a drain is talking to
//! the backend is merged rather than overwritten. A second mutex admits one
//! drain pass at a time, so overlapping drains never replay the same
//! operation twice.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::executor::{self, ExecutionResult, Outcome, SyncResult};
use super::operation::{OperationStatus, QueuedOperation, SyncOperation};
use crate::error::AccessAidError;
use crate::reminders::RemoteStore;
use crate::storage::{Database, KeyValueStore};

/// Key the queue snapshot is stored under.
pub const QUEUE_KEY: &str = "sync_queue";

/// Default number of failed attempts before an operation is marked stuck.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Durable, ordered queue of reminder mutations.
pub struct SyncQueue<S: KeyValueStore = Database> {
    store: S,
    lock: Mutex<()>,
    draining: Mutex<()>,
    max_attempts: u32,
}

impl SyncQueue<Database> {
    /// Create a sync queue on the default database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn new(max_attempts: u32) -> Result<Self, AccessAidError> {
        Ok(Self::with_store(Database::open()?, max_attempts))
    }
}

impl<S: KeyValueStore> SyncQueue<S> {
    /// Create a sync queue on an existing store.
    #[must_use]
    pub fn with_store(store: S, max_attempts: u32) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
            draining: Mutex::new(()),
            max_attempts: max_attempts.max(1),
        }
    }

    /// The backing store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Attempts after which an operation is marked stuck.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Append an operation to the queue.
    ///
    /// Persistence failures are logged and swallowed so the UI action that
    /// queued the write is never blocked. Returns the minted queue id when
    /// the snapshot was written.
    pub fn enqueue(&self, operation: SyncOperation) -> Option<String> {
        let queued = QueuedOperation::new(operation);
        let id = queued.id.clone();
        let kind = queued.operation.kind();

        let written = self.guard().and_then(|_guard| {
            let mut operations = self.load()?;
            operations.push(queued);
            self.save(&operations)
        });

        match written {
            Ok(()) => {
                tracing::debug!(%id, %kind, "queued operation");
                Some(id)
            },
            Err(e) => {
                tracing::warn!(%kind, error = %e, "failed to persist queued operation");
                None
            },
        }
    }

    /// Number of operations not yet successfully drained, stuck included.
    ///
    /// Read failures are logged and reported as an empty queue.
    pub fn queue_length(&self) -> usize {
        match self.load() {
            Ok(operations) => operations.len(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read sync queue");
                0
            },
        }
    }

    /// Replay pending operations in insertion order.
    ///
    /// Returns the number of operations the remote store confirmed.
    pub fn drain(&self, remote: &dyn RemoteStore) -> usize {
        self.drain_report(remote).succeeded
    }

    /// Replay pending operations and report every outcome.
    ///
    /// Successful operations are removed; failed ones stay in their
    /// original relative order with their attempt count bumped. Stuck
    /// operations are reported as skipped and left alone.
    ///
    /// A drain that starts while another is running waits for it, then
    /// replays only what is still pending.
    pub fn drain_report(&self, remote: &dyn RemoteStore) -> SyncResult {
        let mut result = SyncResult::empty();

        // Held for the whole pass, including the remote calls
        let Ok(_pass) = self.draining.lock() else {
            tracing::warn!("sync drain lock poisoned");
            return result;
        };

        let snapshot = match self.guard().and_then(|_guard| self.load()) {
            Ok(operations) => operations,
            Err(e) => {
                tracing::warn!(error = %e, "failed to load sync queue for drain");
                return result;
            },
        };

        if snapshot.is_empty() {
            return result;
        }

        let mut succeeded: HashSet<String> = HashSet::new();
        let mut failures: HashMap<String, String> = HashMap::new();

        for queued in &snapshot {
            let kind = queued.operation.kind();

            if !queued.is_pending() {
                result.add(ExecutionResult {
                    id: queued.id.clone(),
                    kind,
                    outcome: Outcome::Skipped,
                    error: None,
                });
                continue;
            }

            match executor::apply(&queued.operation, remote) {
                Ok(()) => {
                    tracing::debug!(id = %queued.id, %kind, "replayed operation");
                    succeeded.insert(queued.id.clone());
                    result.add(ExecutionResult {
                        id: queued.id.clone(),
                        kind,
                        outcome: Outcome::Succeeded,
                        error: None,
                    });
                },
                Err(e) => {
                    let message = e.to_string();
                    tracing::info!(id = %queued.id, %kind, error = %message, "operation kept for retry");
                    failures.insert(queued.id.clone(), message.clone());
                    result.add(ExecutionResult {
                        id: queued.id.clone(),
                        kind,
                        outcome: Outcome::Failed,
                        error: Some(message),
                    });
                },
            }
        }

        let merged = self.guard().and_then(|_guard| {
            let mut current = self.load()?;
            current.retain(|op| !succeeded.contains(&op.id));

            for op in &mut current {
                if let Some(error) = failures.get(&op.id) {
                    if op.record_failure(error, self.max_attempts) {
                        tracing::warn!(
                            id = %op.id,
                            kind = %op.operation.kind(),
                            attempts = op.attempts,
                            "operation marked stuck"
                        );
                        result.newly_stuck += 1;
                    }
                }
            }

            self.save(&current)
        });

        if let Err(e) = merged {
            // Confirmed operations stay queued and will be replayed again.
            tracing::warn!(error = %e, "failed to persist sync queue after drain");
        }

        result
    }

    /// All queued operations in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    pub fn list(&self) -> Result<Vec<QueuedOperation>, AccessAidError> {
        self.load()
    }

    /// Queued operations with the given status, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    pub fn by_status(
        &self,
        status: OperationStatus,
    ) -> Result<Vec<QueuedOperation>, AccessAidError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|op| op.status == status)
            .collect())
    }

    /// Operations the next drain will attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    pub fn pending(&self) -> Result<Vec<QueuedOperation>, AccessAidError> {
        self.by_status(OperationStatus::Pending)
    }

    /// Operations that hit the attempt limit.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    pub fn stuck(&self) -> Result<Vec<QueuedOperation>, AccessAidError> {
        self.by_status(OperationStatus::Stuck)
    }

    /// Get a specific operation by queue id.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    pub fn get(&self, id: &str) -> Result<Option<QueuedOperation>, AccessAidError> {
        Ok(self.load()?.into_iter().find(|op| op.id == id))
    }

    /// Put one stuck operation back in line.
    ///
    /// Returns false when no stuck operation has that id; pending
    /// operations are left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read or written.
    pub fn retry(&self, id: &str) -> Result<bool, AccessAidError> {
        let _guard = self.guard()?;
        let mut operations = self.load()?;

        let Some(op) = operations
            .iter_mut()
            .find(|op| op.id == id && !op.is_pending())
        else {
            return Ok(false);
        };
        op.reset();

        self.save(&operations)?;
        Ok(true)
    }

    /// Put every stuck operation back in line. Returns how many were reset.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read or written.
    pub fn retry_all(&self) -> Result<usize, AccessAidError> {
        let _guard = self.guard()?;
        let mut operations = self.load()?;

        let mut count = 0;
        for op in operations.iter_mut().filter(|op| !op.is_pending()) {
            op.reset();
            count += 1;
        }

        if count > 0 {
            self.save(&operations)?;
        }
        Ok(count)
    }

    /// Discard one operation. Returns false when no operation has that id.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read or written.
    pub fn remove(&self, id: &str) -> Result<bool, AccessAidError> {
        let _guard = self.guard()?;
        let mut operations = self.load()?;

        let before = operations.len();
        operations.retain(|op| op.id != id);
        if operations.len() == before {
            return Ok(false);
        }

        self.save(&operations)?;
        Ok(true)
    }

    /// Discard every stuck operation. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read or written.
    pub fn remove_stuck(&self) -> Result<usize, AccessAidError> {
        let _guard = self.guard()?;
        let mut operations = self.load()?;

        let before = operations.len();
        operations.retain(QueuedOperation::is_pending);
        let removed = before - operations.len();

        if removed > 0 {
            self.save(&operations)?;
        }
        Ok(removed)
    }

    /// Clear all operations.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn clear(&self) -> Result<(), AccessAidError> {
        let _guard = self.guard()?;
        self.store.remove(QUEUE_KEY)
    }

    /// Get queue statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    pub fn stats(&self) -> Result<QueueStats, AccessAidError> {
        let operations = self.load()?;

        let pending = operations.iter().filter(|op| op.is_pending()).count();
        let oldest_pending = operations
            .iter()
            .filter(|op| op.is_pending())
            .map(|op| op.created_at)
            .min();

        Ok(QueueStats {
            pending,
            stuck: operations.len() - pending,
            oldest_pending,
        })
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, AccessAidError> {
        self.lock
            .lock()
            .map_err(|_| AccessAidError::Database("Sync queue lock poisoned".to_string()))
    }

    fn load(&self) -> Result<Vec<QueuedOperation>, AccessAidError> {
        match self.store.get(QUEUE_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                AccessAidError::Database(format!("Corrupt sync queue snapshot: {e}"))
            }),
        }
    }

    fn save(&self, operations: &[QueuedOperation]) -> Result<(), AccessAidError> {
        let raw = serde_json::to_string(operations)?;
        self.store.set(QUEUE_KEY, &raw)
    }
}

/// Queue statistics.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStats {
    /// Number of operations the next drain will attempt
    pub pending: usize,
    /// Number of operations past the attempt limit
    pub stuck: usize,
    /// Oldest pending operation timestamp
    pub oldest_pending: Option<DateTime<Utc>>,
}
