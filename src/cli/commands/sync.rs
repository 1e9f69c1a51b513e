//! Sync queue command implementation.
//!
//! Handles sync queue management commands.

use chrono::Utc;
use colored::Colorize;

use crate::cli::args::{OutputFormat, QueueOperation, SyncCommands};
use crate::config::Config;
use crate::error::AccessAidError;
use crate::features::sync::{format_sync_result, OperationStatus, SyncOperation, SyncQueue};
use crate::output::{format_age, to_json, truncate};
use crate::reminders::{HttpReminderStore, ReminderFields, ReminderPatch, RemoteStore};
use crate::storage::KeyValueStore;

/// Execute sync subcommands.
///
/// # Errors
///
/// Returns an error if the queue database cannot be opened, the requested
/// operation does not exist, or output formatting fails.
pub fn sync(
    config: &Config,
    cmd: SyncCommands,
    format: OutputFormat,
) -> Result<String, AccessAidError> {
    let queue = SyncQueue::new(config.sync.max_attempts)?;

    match cmd {
        SyncCommands::Status => show_status(&queue, format),
        SyncCommands::List { status, limit } => {
            list_operations(&queue, status.as_deref(), limit, format)
        },
        SyncCommands::Add { operation } => {
            let operation = build_operation(config, operation)?;
            add_operation(&queue, operation, format)
        },
        SyncCommands::Run { url } => {
            let mut remote_config = config.remote.clone();
            if let Some(url) = url {
                remote_config.base_url = url;
            }
            let remote = HttpReminderStore::new(&remote_config)?;
            run_sync(&queue, &remote, format)
        },
        SyncCommands::Retry { all, id } => retry_operations(&queue, all, id.as_deref(), format),
        SyncCommands::Clear { all, force, id } => {
            clear_operations(&queue, all, force, id.as_deref(), format)
        },
    }
}

/// Show queue status.
fn show_status<S: KeyValueStore>(
    queue: &SyncQueue<S>,
    format: OutputFormat,
) -> Result<String, AccessAidError> {
    let stats = queue.stats()?;

    match format {
        OutputFormat::Json => {
            let data = serde_json::json!({
                "pending": stats.pending,
                "stuck": stats.stuck,
                "total": stats.pending + stats.stuck,
                "max_attempts": queue.max_attempts(),
                "oldest_pending": stats.oldest_pending.map(|t| t.to_rfc3339()),
            });
            to_json(&data)
        },
        OutputFormat::Pretty => {
            let mut lines = Vec::new();

            lines.push("Sync Queue Status".bold().to_string());
            lines.push("─".repeat(40));

            lines.push(format!(
                "  Pending:    {} {}",
                stats.pending,
                if stats.pending > 0 {
                    "operations waiting".dimmed()
                } else {
                    "".dimmed()
                }
            ));

            lines.push(format!(
                "  Stuck:      {} {}",
                stats.stuck,
                if stats.stuck > 0 {
                    "operations need attention".red()
                } else {
                    "".normal()
                }
            ));

            if let Some(oldest) = stats.oldest_pending {
                lines.push(format!(
                    "  Oldest:     {}",
                    format_age(oldest, Utc::now()).dimmed()
                ));
            }

            if stats.pending > 0 {
                lines.push(String::new());
                lines.push(
                    "Run 'accessaid sync run' to send pending operations"
                        .dimmed()
                        .to_string(),
                );
            }
            if stats.stuck > 0 {
                lines.push(
                    "Run 'accessaid sync retry --all' to put stuck operations back in line"
                        .dimmed()
                        .to_string(),
                );
            }

            Ok(lines.join("\n"))
        },
    }
}

/// Drain the queue against `remote`.
fn run_sync<S: KeyValueStore>(
    queue: &SyncQueue<S>,
    remote: &dyn RemoteStore,
    format: OutputFormat,
) -> Result<String, AccessAidError> {
    let result = queue.drain_report(remote);

    match format {
        OutputFormat::Json => {
            let data = serde_json::json!({
                "succeeded": result.succeeded,
                "failed": result.failed,
                "skipped": result.skipped,
                "newly_stuck": result.newly_stuck,
                "total": result.total(),
                "remaining": queue.queue_length(),
            });
            to_json(&data)
        },
        OutputFormat::Pretty => {
            if result.total() == 0 {
                Ok("No pending operations to sync.".to_string())
            } else {
                Ok(format_sync_result(&result))
            }
        },
    }
}

/// List queued operations.
fn list_operations<S: KeyValueStore>(
    queue: &SyncQueue<S>,
    status_filter: Option<&str>,
    limit: usize,
    format: OutputFormat,
) -> Result<String, AccessAidError> {
    let status = status_filter.map(OperationStatus::from_name);
    let operations = match status {
        Some(status) => queue.by_status(status)?,
        None => queue.list()?,
    };

    match format {
        OutputFormat::Json => {
            let shown: Vec<_> = operations.iter().take(limit).collect();
            to_json(&shown)
        },
        OutputFormat::Pretty => {
            if operations.is_empty() {
                return Ok(status.map_or_else(
                    || "Sync queue is empty.".to_string(),
                    |s| format!("No {s} operations in queue."),
                ));
            }

            let title = status.map_or_else(|| "QUEUED".to_string(), |s| s.to_string().to_uppercase());

            let mut lines = Vec::new();
            lines.push(format!("{title} Operations ({})", operations.len()));
            lines.push("─".repeat(72));
            lines.push(format!(
                "{:<24} {:<18} {:<17} {:<8} {}",
                "ID", "Type", "Created", "Tries", "Status"
            ));
            lines.push("─".repeat(72));

            for op in operations.iter().take(limit) {
                let created = op.created_at.format("%Y-%m-%d %H:%M").to_string();
                let status_str = match op.status {
                    OperationStatus::Pending => "⏳".to_string(),
                    OperationStatus::Stuck => "✗ stuck".red().to_string(),
                };

                lines.push(format!(
                    "{:<24} {:<18} {:<17} {:<8} {}",
                    op.id,
                    op.operation.kind().display_name(),
                    created,
                    op.attempts,
                    status_str
                ));

                if let Some(target) = op.operation.target_id() {
                    lines.push(format!("{:<24} {}", "", format!("reminder {target}").dimmed()));
                }
                if let Some(error) = &op.last_error {
                    lines.push(format!("{:<24} {}", "", truncate(error, 48).red()));
                }
            }

            if operations.len() > limit {
                lines.push(
                    format!("... and {} more", operations.len() - limit)
                        .dimmed()
                        .to_string(),
                );
            }

            Ok(lines.join("\n"))
        },
    }
}

/// Turn parsed arguments into a queueable operation.
fn build_operation(config: &Config, operation: QueueOperation) -> Result<SyncOperation, AccessAidError> {
    match operation {
        QueueOperation::Create {
            title,
            at,
            description,
            frequency,
            priority,
            user,
        } => {
            let user_id = user.or_else(|| config.general.user_id.clone()).ok_or_else(|| {
                AccessAidError::Config(
                    "User id required: pass --user or set general.user_id".to_string(),
                )
            })?;
            let mut fields = ReminderFields::new(title, at);
            fields.description = description;
            fields.frequency = frequency;
            fields.priority = priority;
            Ok(SyncOperation::create(user_id, fields))
        },
        QueueOperation::Update {
            id,
            title,
            description,
            at,
            frequency,
            priority,
        } => {
            let patch = ReminderPatch {
                title,
                description,
                reminder_datetime: at,
                frequency,
                priority,
            };
            if patch.is_empty() {
                return Err(AccessAidError::Config(
                    "Nothing to update: pass at least one field".to_string(),
                ));
            }
            Ok(SyncOperation::update(id, patch))
        },
        QueueOperation::Delete { id } => Ok(SyncOperation::delete(id)),
        QueueOperation::Complete { id, undo } => Ok(SyncOperation::complete(id, !undo)),
    }
}

/// Add an operation to the queue.
fn add_operation<S: KeyValueStore>(
    queue: &SyncQueue<S>,
    operation: SyncOperation,
    format: OutputFormat,
) -> Result<String, AccessAidError> {
    let kind = operation.kind();
    let id = queue.enqueue(operation).ok_or_else(|| {
        AccessAidError::Database("Operation could not be queued; run with --verbose for details".to_string())
    })?;

    match format {
        OutputFormat::Json => {
            let queued = queue
                .get(&id)?
                .ok_or_else(|| AccessAidError::NotFound(format!("Operation {id}")))?;
            to_json(&queued)
        },
        OutputFormat::Pretty => Ok(format!(
            "Queued {} operation (ID: {}) - {} waiting",
            kind.display_name(),
            id,
            queue.queue_length()
        )),
    }
}

/// Retry stuck operations.
fn retry_operations<S: KeyValueStore>(
    queue: &SyncQueue<S>,
    all: bool,
    id: Option<&str>,
    format: OutputFormat,
) -> Result<String, AccessAidError> {
    if let Some(op_id) = id {
        if !queue.retry(op_id)? {
            return Err(AccessAidError::NotFound(format!("Stuck operation {op_id}")));
        }

        match format {
            OutputFormat::Json => {
                let data = serde_json::json!({"reset": 1, "id": op_id});
                to_json(&data)
            },
            OutputFormat::Pretty => Ok(format!("Reset operation {op_id} for retry")),
        }
    } else if all {
        let count = queue.retry_all()?;

        match format {
            OutputFormat::Json => {
                let data = serde_json::json!({"reset": count});
                to_json(&data)
            },
            OutputFormat::Pretty => Ok(format!("Reset {count} stuck operations for retry")),
        }
    } else {
        Err(AccessAidError::Config(
            "Specify --all or provide an operation ID".to_string(),
        ))
    }
}

/// Clear operations from queue.
fn clear_operations<S: KeyValueStore>(
    queue: &SyncQueue<S>,
    all: bool,
    force: bool,
    id: Option<&str>,
    format: OutputFormat,
) -> Result<String, AccessAidError> {
    if let Some(op_id) = id {
        if !queue.remove(op_id)? {
            return Err(AccessAidError::NotFound(format!("Operation {op_id}")));
        }

        match format {
            OutputFormat::Json => to_json(&serde_json::json!({"cleared": 1, "id": op_id})),
            OutputFormat::Pretty => Ok(format!("Removed operation {op_id}")),
        }
    } else if all {
        if !force {
            return Err(AccessAidError::Config(
                "Use --force to clear all operations, including pending ones".to_string(),
            ));
        }
        let count = queue.queue_length();
        queue.clear()?;

        match format {
            OutputFormat::Json => to_json(&serde_json::json!({"cleared": count})),
            OutputFormat::Pretty => Ok(format!("Cleared all {count} operations from queue")),
        }
    } else {
        let count = queue.remove_stuck()?;

        match format {
            OutputFormat::Json => to_json(&serde_json::json!({"cleared": count})),
            OutputFormat::Pretty => Ok(format!("Cleared {count} stuck operations")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminders::{Frequency, MockRemoteStore, RemoteError};
    use crate::storage::MemoryStore;

    fn queue() -> SyncQueue<MemoryStore> {
        SyncQueue::with_store(MemoryStore::new(), 2)
    }

    fn failing_remote() -> MockRemoteStore {
        let mut remote = MockRemoteStore::new();
        remote
            .expect_delete()
            .returning(|_| Err(RemoteError::Transport("offline".to_string())));
        remote
    }

    #[test]
    fn test_status_empty_queue() {
        let out = show_status(&queue(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["pending"], 0);
        assert_eq!(value["stuck"], 0);
        assert!(value["oldest_pending"].is_null());
    }

    #[test]
    fn test_add_then_list() {
        let queue = queue();
        let out = add_operation(&queue, SyncOperation::delete("r1"), OutputFormat::Pretty).unwrap();
        assert!(out.contains("Queued Delete Reminder operation"));

        let listed = list_operations(&queue, None, 20, OutputFormat::Pretty).unwrap();
        assert!(listed.contains("Delete Reminder"));
        assert!(listed.contains("reminder r1"));
    }

    #[test]
    fn test_add_json_returns_record() {
        let queue = queue();
        let out = add_operation(&queue, SyncOperation::complete("r9", true), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["type"], "complete");
        assert_eq!(value["reminderId"], "r9");
        assert_eq!(value["attempts"], 0);
    }

    #[test]
    fn test_run_failure_keeps_operation_and_marks_stuck() {
        let queue = queue();
        queue.enqueue(SyncOperation::delete("r1"));
        let remote = failing_remote();

        let out = run_sync(&queue, &remote, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["failed"], 1);
        assert_eq!(value["remaining"], 1);

        run_sync(&queue, &remote, OutputFormat::Json).unwrap();
        let stuck = list_operations(&queue, Some("stuck"), 20, OutputFormat::Pretty).unwrap();
        assert!(stuck.contains("STUCK Operations (1)"));
    }

    #[test]
    fn test_run_empty_queue() {
        let remote = MockRemoteStore::new();
        let out = run_sync(&queue(), &remote, OutputFormat::Pretty).unwrap();
        assert_eq!(out, "No pending operations to sync.");
    }

    #[test]
    fn test_retry_unknown_id() {
        let err = retry_operations(&queue(), false, Some("nope"), OutputFormat::Pretty).unwrap_err();
        assert!(matches!(err, AccessAidError::NotFound(_)));
    }

    #[test]
    fn test_retry_pending_id_is_not_found() {
        let queue = queue();
        let id = queue.enqueue(SyncOperation::delete("r1")).unwrap();

        let err = retry_operations(&queue, false, Some(&id), OutputFormat::Pretty).unwrap_err();
        assert!(err.to_string().contains("Stuck operation"));
    }

    #[test]
    fn test_retry_requires_target() {
        let err = retry_operations(&queue(), false, None, OutputFormat::Pretty).unwrap_err();
        assert!(matches!(err, AccessAidError::Config(_)));
    }

    #[test]
    fn test_clear_all_requires_force() {
        let queue = queue();
        queue.enqueue(SyncOperation::delete("r1"));

        assert!(clear_operations(&queue, true, false, None, OutputFormat::Pretty).is_err());
        assert_eq!(queue.queue_length(), 1);

        let out = clear_operations(&queue, true, true, None, OutputFormat::Pretty).unwrap();
        assert!(out.contains("Cleared all 1 operations"));
        assert_eq!(queue.queue_length(), 0);
    }

    #[test]
    fn test_clear_default_removes_only_stuck() {
        let queue = queue();
        queue.enqueue(SyncOperation::delete("r1"));
        let remote = failing_remote();
        queue.drain(&remote);
        queue.drain(&remote);
        queue.enqueue(SyncOperation::delete("r2"));

        let out = clear_operations(&queue, false, false, None, OutputFormat::Pretty).unwrap();
        assert_eq!(out, "Cleared 1 stuck operations");
        assert_eq!(queue.queue_length(), 1);
    }

    #[test]
    fn test_build_create_needs_user() {
        let op = QueueOperation::Create {
            title: "Walk".to_string(),
            at: Utc::now(),
            description: None,
            frequency: Frequency::Daily,
            priority: crate::reminders::Priority::Low,
            user: None,
        };
        let err = build_operation(&Config::default(), op).unwrap_err();
        assert!(matches!(err, AccessAidError::Config(_)));
    }

    #[test]
    fn test_build_create_uses_configured_user() {
        let mut config = Config::default();
        config.general.user_id = Some("u7".to_string());
        let op = QueueOperation::Create {
            title: "Walk".to_string(),
            at: Utc::now(),
            description: Some("around the block".to_string()),
            frequency: Frequency::Daily,
            priority: crate::reminders::Priority::Low,
            user: None,
        };

        match build_operation(&config, op).unwrap() {
            SyncOperation::Create { user_id, data } => {
                assert_eq!(user_id, "u7");
                assert_eq!(data.frequency, Frequency::Daily);
                assert_eq!(data.description.as_deref(), Some("around the block"));
            },
            other => panic!("unexpected operation {other:?}"),
        }
    }

    #[test]
    fn test_build_empty_update_rejected() {
        let op = QueueOperation::Update {
            id: "r1".to_string(),
            title: None,
            description: None,
            at: None,
            frequency: None,
            priority: None,
        };
        assert!(build_operation(&Config::default(), op).is_err());
    }

    #[test]
    fn test_build_complete_undo() {
        let op = QueueOperation::Complete {
            id: "r1".to_string(),
            undo: true,
        };
        assert_eq!(
            build_operation(&Config::default(), op).unwrap(),
            SyncOperation::complete("r1", false)
        );
    }
}
