//! Voice command dispatch.
//!
//! Recognized speech is matched against registered keyword commands. A
//! cooldown after speaking, dispatching or changing screens keeps the
//! assistant from acting on its own voice or on stale transcripts.

pub mod builtin;
pub mod command;
pub mod cooldown;
pub mod manager;
pub mod platform;
pub mod synthesizer;

pub use builtin::{register_builtin, ActionLog};
pub use command::{CommandAction, CommandCategory, CommandInfo, MatchPolicy, VoiceCommand};
pub use cooldown::{Cooldown, DEFAULT_COOLDOWN};
pub use manager::{ListeningState, ManagerConfig, VoiceCommandManager};
pub use platform::{
    Haptics, ImpactStyle, PlatformError, RecognitionEvent, RecognitionOptions, SpeechParams,
    SpeechRecognizer, SpeechSynthesizer,
};
pub use synthesizer::{CaptionSynthesizer, ProcessSynthesizer};
