//! Error types for accessaid.

use thiserror::Error;

/// Errors surfaced by the library and the command-line front end.
///
/// The sync queue and the voice manager never return these to their
/// callers for remote or platform failures; those are logged and absorbed.
/// This type covers local setup problems (config, database, arguments).
#[derive(Debug, Error)]
pub enum AccessAidError {
    /// Local database failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration or argument problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested item does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Remote reminder store failure.
    #[error(transparent)]
    Remote(#[from] crate::reminders::RemoteError),

    /// Speech or haptics platform failure.
    #[error(transparent)]
    Platform(#[from] crate::features::voice::PlatformError),

    /// JSON (de)serialization failure.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AccessAidError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::NotFound(_) => 3,
            Self::Database(_)
            | Self::Remote(_)
            | Self::Platform(_)
            | Self::Parse(_)
            | Self::Io(_) => 1,
        }
    }
}
