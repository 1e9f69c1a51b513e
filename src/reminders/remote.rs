//! Remote reminder store seam and its HTTP implementation.
//!
//! The backend exposes a small REST surface whose write endpoints take
//! their arguments as query parameters:
//!
//! - `POST   /api/users/{user_id}/reminders`
//! - `PUT    /api/reminders/{id}`
//! - `DELETE /api/reminders/{id}`
//!
//! The update endpoint only writes `title`, `description`, `is_active` and
//! `is_completed`. Anything else in the query is answered with 200 and
//! silently dropped, so patches touching other fields are refused locally.

use std::time::Duration;

use thiserror::Error;

use super::types::{ReminderFields, ReminderPatch};
use crate::config::RemoteConfig;

/// Failure of a single remote call.
///
/// The sync queue treats every variant the same way: the operation stays
/// queued. The variants exist for logs and `last_error`.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request never produced a response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The store refused the write for another reason.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Writes the sync queue replays.
#[cfg_attr(test, mockall::automock)]
pub trait RemoteStore {
    /// Create a reminder owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store did not confirm the write.
    fn insert(&self, user_id: &str, fields: &ReminderFields) -> Result<(), RemoteError>;

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns an error if the store did not confirm the write.
    fn update(&self, id: &str, patch: &ReminderPatch) -> Result<(), RemoteError>;

    /// Delete a reminder.
    ///
    /// # Errors
    ///
    /// Returns an error if the store did not confirm the write.
    fn delete(&self, id: &str) -> Result<(), RemoteError>;

    /// Mark a reminder completed (and inactive) or reopen it.
    ///
    /// # Errors
    ///
    /// Returns an error if the store did not confirm the write.
    fn set_completion(&self, id: &str, completed: bool) -> Result<(), RemoteError>;
}

/// Blocking HTTP client for the backend's reminder endpoints.
pub struct HttpReminderStore {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpReminderStore {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<(), RemoteError> {
        let response = request
            .send()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

/// Query parameters for a create call.
#[must_use]
pub fn insert_params(fields: &ReminderFields) -> Vec<(&'static str, String)> {
    let mut params = vec![("title", fields.title.clone())];
    if let Some(description) = &fields.description {
        params.push(("description", description.clone()));
    }
    params.push(("reminder_datetime", fields.reminder_datetime.to_rfc3339()));
    params.push(("frequency", fields.frequency.to_string()));
    params.push(("priority", fields.priority.to_string()));
    params
}

/// Query parameters for an update call.
///
/// Only the fields the update endpoint writes are sent; absent fields are
/// omitted.
#[must_use]
pub fn patch_params(patch: &ReminderPatch) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(title) = &patch.title {
        params.push(("title", title.clone()));
    }
    if let Some(description) = &patch.description {
        params.push(("description", description.clone()));
    }
    params
}

/// Fields set on the patch that the update endpoint would drop.
#[must_use]
pub fn unsupported_patch_fields(patch: &ReminderPatch) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if patch.reminder_datetime.is_some() {
        fields.push("reminder_datetime");
    }
    if patch.frequency.is_some() {
        fields.push("frequency");
    }
    if patch.priority.is_some() {
        fields.push("priority");
    }
    fields
}

/// Query parameters for a completion call.
#[must_use]
pub fn completion_params(completed: bool) -> Vec<(&'static str, String)> {
    vec![
        ("is_completed", completed.to_string()),
        ("is_active", (!completed).to_string()),
    ]
}

impl RemoteStore for HttpReminderStore {
    fn insert(&self, user_id: &str, fields: &ReminderFields) -> Result<(), RemoteError> {
        let url = format!("{}/api/users/{user_id}/reminders", self.base_url);
        tracing::debug!(%url, title = %fields.title, "creating reminder");
        self.send(self.client.post(url).query(&insert_params(fields)))
    }

    fn update(&self, id: &str, patch: &ReminderPatch) -> Result<(), RemoteError> {
        if patch.is_empty() {
            return Err(RemoteError::Rejected(format!(
                "empty update for reminder {id}"
            )));
        }
        let unsupported = unsupported_patch_fields(patch);
        if !unsupported.is_empty() {
            return Err(RemoteError::Rejected(format!(
                "backend cannot update {} on reminder {id}",
                unsupported.join(", ")
            )));
        }
        let url = format!("{}/api/reminders/{id}", self.base_url);
        tracing::debug!(%url, "updating reminder");
        self.send(self.client.put(url).query(&patch_params(patch)))
    }

    fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let url = format!("{}/api/reminders/{id}", self.base_url);
        tracing::debug!(%url, "deleting reminder");
        self.send(self.client.delete(url))
    }

    fn set_completion(&self, id: &str, completed: bool) -> Result<(), RemoteError> {
        let url = format!("{}/api/reminders/{id}", self.base_url);
        tracing::debug!(%url, completed, "setting completion");
        self.send(self.client.put(url).query(&completion_params(completed)))
    }
}
