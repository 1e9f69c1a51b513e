//! Sync queue for offline reminder writes.
//!
//! Reminder mutations that could not be confirmed against the backend are
//! queued here and replayed when connectivity returns.
//!
//! Features:
//! - Durable FIFO log of create / update / delete / complete operations
//! - Drain passes that keep failures in their original order
//! - Attempt limit after which an operation is parked as stuck
//! - Serialized read-modify-write of the persisted snapshot

pub mod executor;
pub mod operation;
pub mod queue;

pub use executor::{apply, format_sync_result, ExecutionResult, Outcome, SyncResult};
pub use operation::{new_operation_id, OperationKind, OperationStatus, QueuedOperation, SyncOperation};
pub use queue::{QueueStats, SyncQueue, DEFAULT_MAX_ATTEMPTS, QUEUE_KEY};
