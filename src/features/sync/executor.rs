//! Sync executor for replaying queued operations.
//!
//! Maps each operation onto the remote store call it stands for and
//! collects per-operation outcomes for a drain pass.

use colored::Colorize;
use serde::Serialize;

use super::operation::{OperationKind, SyncOperation};
use crate::reminders::{RemoteError, RemoteStore};

/// Apply one operation to the remote store.
///
/// # Errors
///
/// Returns the remote failure unchanged; the caller decides whether the
/// operation stays queued.
pub fn apply(operation: &SyncOperation, remote: &dyn RemoteStore) -> Result<(), RemoteError> {
    match operation {
        SyncOperation::Create { user_id, data } => remote.insert(user_id, data),
        SyncOperation::Update { id, data } => remote.update(id, data),
        SyncOperation::Delete { id } => remote.delete(id),
        SyncOperation::Complete { id, completed } => remote.set_completion(id, *completed),
    }
}

/// Outcome of one operation in a drain pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Confirmed by the remote store and removed from the queue.
    Succeeded,
    /// Failed; kept for the next drain.
    Failed,
    /// Already stuck; not attempted.
    Skipped,
}

/// Result of executing a single operation.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    /// Queue id
    pub id: String,
    /// Operation kind
    pub kind: OperationKind,
    /// What happened
    pub outcome: Outcome,
    /// Error message if failed
    pub error: Option<String>,
}

/// Result of a drain pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncResult {
    /// Number of successful operations
    pub succeeded: usize,
    /// Number of failed operations
    pub failed: usize,
    /// Number of stuck operations left untouched
    pub skipped: usize,
    /// Failures in this pass that hit the attempt limit
    pub newly_stuck: usize,
    /// Individual results, in queue order
    pub results: Vec<ExecutionResult>,
}

impl SyncResult {
    /// Create an empty result.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            succeeded: 0,
            failed: 0,
            skipped: 0,
            newly_stuck: 0,
            results: Vec::new(),
        }
    }

    /// Add a result.
    pub fn add(&mut self, result: ExecutionResult) {
        match result.outcome {
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Skipped => self.skipped += 1,
        }
        self.results.push(result);
    }

    /// Check if all attempted operations succeeded.
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Get total operations seen.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.succeeded + self.failed + self.skipped
    }
}

/// Format sync result for display.
#[must_use]
pub fn format_sync_result(result: &SyncResult) -> String {
    let mut lines = Vec::new();

    lines.push(format!("Sync completed: {} operations", result.total()));
    lines.push("─".repeat(40));

    if result.succeeded > 0 {
        lines.push(format!(
            "  {} {}",
            "✓".green(),
            format!("{} succeeded", result.succeeded).green()
        ));
    }

    if result.failed > 0 {
        lines.push(format!(
            "  {} {}",
            "✗".red(),
            format!("{} failed, kept for retry", result.failed).red()
        ));
    }

    if result.skipped > 0 || result.newly_stuck > 0 {
        lines.push(format!(
            "  {} {}",
            "○".yellow(),
            format!(
                "{} stuck ({} new) - see 'accessaid sync list --status stuck'",
                result.skipped + result.newly_stuck,
                result.newly_stuck
            )
            .yellow()
        ));
    }

    // Show first few errors
    let errors: Vec<_> = result
        .results
        .iter()
        .filter(|r| r.error.is_some())
        .take(3)
        .collect();

    if !errors.is_empty() {
        lines.push(String::new());
        lines.push("Errors:".to_string());
        for err in errors {
            lines.push(format!(
                "  - {}: {}",
                err.kind,
                err.error.as_deref().unwrap_or("Unknown error")
            ));
        }
    }

    lines.join("\n")
}
