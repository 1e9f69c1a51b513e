//! Reminder data and the remote store it is written to.

mod recurrence;
mod remote;
mod types;

pub use recurrence::{upcoming_occurrences, DEFAULT_OCCURRENCES, MAX_OCCURRENCES};
pub use remote::{
    completion_params, insert_params, patch_params, unsupported_patch_fields, HttpReminderStore,
    RemoteError, RemoteStore,
};
#[cfg(test)]
pub use remote::MockRemoteStore;
pub use types::{Frequency, Priority, ReminderFields, ReminderPatch};
