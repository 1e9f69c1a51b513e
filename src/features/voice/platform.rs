//! Platform speech and haptics seams.
//!
//! The manager only talks to these traits; the host wires in whatever the
//! device provides, or nothing at all.

use serde::Serialize;
use thiserror::Error;

/// Failure reported by a platform facility.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The facility does not exist on this device.
    #[error("{0} not available")]
    Unavailable(String),

    /// The user refused access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The facility failed while running.
    #[error("platform call failed: {0}")]
    Failed(String),
}

/// Options for a recognition session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecognitionOptions {
    /// BCP 47 language tag.
    pub language: String,
    /// Ask for partial transcripts while the user is still speaking.
    pub interim_results: bool,
    /// Keep the session open across utterances.
    pub continuous: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            language: "en-US".to_string(),
            interim_results: true,
            continuous: true,
        }
    }
}

/// Notification from an active recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionEvent {
    /// The session started capturing.
    Start,
    /// A transcript, partial or final.
    Result { transcript: String, is_final: bool },
    /// The session failed.
    Error(String),
    /// The session ended.
    End,
}

/// Parameters passed to the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeechParams {
    pub rate: f32,
    pub pitch: f32,
}

/// Haptic pulse strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactStyle {
    Light,
    Medium,
    Heavy,
}

/// Speech-to-text facility.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechRecognizer: Send + Sync {
    /// Ask for microphone access. `Ok(false)` means the user declined.
    ///
    /// # Errors
    ///
    /// Returns an error if the permission prompt itself failed.
    fn request_permission(&self) -> Result<bool, PlatformError>;

    /// Begin a recognition session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session could not start.
    fn start(&self, options: &RecognitionOptions) -> Result<(), PlatformError>;

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session could not be stopped.
    fn stop(&self) -> Result<(), PlatformError>;
}

/// Text-to-speech facility.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechSynthesizer: Send + Sync {
    /// Start speaking `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if speech could not start.
    fn speak(&self, text: &str, params: SpeechParams) -> Result<(), PlatformError>;

    /// Cut off any speech in progress.
    ///
    /// # Errors
    ///
    /// Returns an error if in-flight speech could not be stopped.
    fn stop(&self) -> Result<(), PlatformError>;

    /// Whether speech is currently playing.
    fn is_speaking(&self) -> bool;
}

/// Haptic feedback. Fire-and-forget.
#[cfg_attr(test, mockall::automock)]
pub trait Haptics: Send + Sync {
    fn impact(&self, style: ImpactStyle);
}
