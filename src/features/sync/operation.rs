//! Operation types for the sync queue.
//!
//! Defines the reminder mutations that can be queued and the bookkeeping
//! envelope each one is persisted in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::reminders::{ReminderFields, ReminderPatch};

/// A pending mutation of the remote reminder store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncOperation {
    /// Insert a new reminder for an owner.
    Create {
        #[serde(rename = "userId", alias = "user_id")]
        user_id: String,
        data: ReminderFields,
    },
    /// Apply a partial update to a reminder.
    Update {
        #[serde(rename = "reminderId", alias = "reminder_id")]
        id: String,
        data: ReminderPatch,
    },
    /// Delete a reminder.
    Delete {
        #[serde(rename = "reminderId", alias = "reminder_id")]
        id: String,
    },
    /// Set the completion flag of a reminder.
    Complete {
        #[serde(rename = "reminderId", alias = "reminder_id")]
        id: String,
        completed: bool,
    },
}

/// Discriminant of a [`SyncOperation`], for display and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
    Complete,
}

impl OperationKind {
    /// Get the display name for this operation kind.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Create => "Create Reminder",
            Self::Update => "Update Reminder",
            Self::Delete => "Delete Reminder",
            Self::Complete => "Complete Reminder",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

impl SyncOperation {
    /// Create operation.
    #[must_use]
    pub fn create(user_id: impl Into<String>, data: ReminderFields) -> Self {
        Self::Create {
            user_id: user_id.into(),
            data,
        }
    }

    /// Update operation.
    #[must_use]
    pub fn update(id: impl Into<String>, data: ReminderPatch) -> Self {
        Self::Update {
            id: id.into(),
            data,
        }
    }

    /// Delete operation.
    #[must_use]
    pub fn delete(id: impl Into<String>) -> Self {
        Self::Delete { id: id.into() }
    }

    /// Completion operation.
    #[must_use]
    pub fn complete(id: impl Into<String>, completed: bool) -> Self {
        Self::Complete {
            id: id.into(),
            completed,
        }
    }

    /// Kind of this operation.
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        match self {
            Self::Create { .. } => OperationKind::Create,
            Self::Update { .. } => OperationKind::Update,
            Self::Delete { .. } => OperationKind::Delete,
            Self::Complete { .. } => OperationKind::Complete,
        }
    }

    /// Remote reminder id this operation targets, if it has one yet.
    #[must_use]
    pub fn target_id(&self) -> Option<&str> {
        match self {
            Self::Create { .. } => None,
            Self::Update { id, .. } | Self::Delete { id } | Self::Complete { id, .. } => Some(id),
        }
    }
}

/// Status of a queued operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationStatus {
    /// Will be attempted on the next drain.
    #[default]
    Pending,
    /// Reached the attempt limit; kept but no longer attempted.
    Stuck,
}

impl OperationStatus {
    /// Parse a status name, defaulting to pending.
    #[must_use]
    pub fn from_name(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "stuck" | "failed" => Self::Stuck,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Stuck => "stuck",
        };
        write!(f, "{s}")
    }
}

/// A queued operation with metadata.
///
/// Serialized flat: the operation's `type` tag and fields sit beside the
/// bookkeeping fields. Records missing bookkeeping fields load as fresh
/// pending operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedOperation {
    /// Local queue id (`<unix-millis>-<suffix>`), never sent remotely.
    pub id: String,
    /// The mutation itself.
    #[serde(flatten)]
    pub operation: SyncOperation,
    /// When the operation was queued
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// Number of failed attempts
    #[serde(default)]
    pub attempts: u32,
    /// Last attempt timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt: Option<DateTime<Utc>>,
    /// Last error message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Current status
    #[serde(default)]
    pub status: OperationStatus,
}

impl QueuedOperation {
    /// Wrap an operation with a freshly minted id.
    #[must_use]
    pub fn new(operation: SyncOperation) -> Self {
        Self {
            id: new_operation_id(),
            operation,
            created_at: Utc::now(),
            attempts: 0,
            last_attempt: None,
            last_error: None,
            status: OperationStatus::Pending,
        }
    }

    /// Record a failed attempt; marks the operation stuck at `max_attempts`.
    ///
    /// Returns true when this failure made the operation stuck.
    pub fn record_failure(&mut self, error: &str, max_attempts: u32) -> bool {
        self.attempts = self.attempts.saturating_add(1);
        self.last_attempt = Some(Utc::now());
        self.last_error = Some(error.to_string());

        if self.status == OperationStatus::Pending && self.attempts >= max_attempts {
            self.status = OperationStatus::Stuck;
            return true;
        }
        false
    }

    /// Put a stuck operation back in line with a clean attempt count.
    pub fn reset(&mut self) {
        self.status = OperationStatus::Pending;
        self.attempts = 0;
        self.last_error = None;
    }

    /// Whether the next drain should attempt this operation.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == OperationStatus::Pending
    }
}

/// Mint a queue id from the current time and a random suffix.
#[must_use]
pub fn new_operation_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..9])
}
