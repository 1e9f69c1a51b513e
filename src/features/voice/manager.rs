//! Voice command manager.
//!
//! Owns the command registry, the listening state and the cooldown gate, and
//! drives the platform recognizer, synthesizer and haptics. Nothing here
//! propagates platform failures to the caller: they are logged and, where
//! the user needs to know, spoken.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::command::{find_match, normalize, CommandCategory, CommandInfo, MatchPolicy, VoiceCommand};
use super::cooldown::{Cooldown, DEFAULT_COOLDOWN};
use super::platform::{
    Haptics, ImpactStyle, RecognitionEvent, RecognitionOptions, SpeechParams, SpeechRecognizer,
    SpeechSynthesizer,
};
use crate::config::VoiceConfig;

/// Spoken when no command matches.
pub const NOT_RECOGNIZED_PHRASE: &str = "Command not recognized. Say help to hear what you can say.";
/// Spoken when no recognizer is attached.
pub const MIC_UNAVAILABLE_PHRASE: &str = "Microphone not available.";
/// Spoken when microphone access is refused.
pub const PERMISSION_DENIED_PHRASE: &str = "Microphone permission denied.";
/// Spoken when recognition fails to start or errors mid-session.
pub const RECOGNITION_ERROR_PHRASE: &str = "Voice recognition error. Please try again.";

/// Pitch handed to the synthesizer.
pub const DEFAULT_PITCH: f32 = 1.0;

/// Whether a recognition session is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListeningState {
    #[default]
    Idle,
    Listening,
}

/// Tunables for [`VoiceCommandManager`].
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    pub cooldown: Duration,
    pub recognition: RecognitionOptions,
    pub default_rate: f32,
    pub min_rate: f32,
    pub max_rate: f32,
    pub match_policy: MatchPolicy,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            recognition: RecognitionOptions::default(),
            default_rate: 1.0,
            min_rate: 0.5,
            max_rate: 2.0,
            match_policy: MatchPolicy::default(),
        }
    }
}

impl From<&VoiceConfig> for ManagerConfig {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            cooldown: config.cooldown(),
            recognition: RecognitionOptions {
                language: config.language.clone(),
                interim_results: config.interim_results,
                continuous: config.continuous,
            },
            default_rate: config.default_rate,
            min_rate: config.min_rate,
            max_rate: config.max_rate,
            match_policy: config.match_policy,
        }
    }
}

/// Maps recognized speech to registered commands.
///
/// One instance is created by the host and shared (usually behind an `Arc`)
/// with every screen that registers commands.
pub struct VoiceCommandManager {
    config: ManagerConfig,
    commands: Mutex<Vec<VoiceCommand>>,
    cooldown: Mutex<Cooldown>,
    state: Mutex<ListeningState>,
    recognizer: Option<Arc<dyn SpeechRecognizer>>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    haptics: Option<Arc<dyn Haptics>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl VoiceCommandManager {
    /// Create a manager with no platform facilities attached.
    #[must_use]
    pub fn new(config: ManagerConfig) -> Self {
        let cooldown = Cooldown::new(config.cooldown);
        Self {
            config,
            commands: Mutex::new(Vec::new()),
            cooldown: Mutex::new(cooldown),
            state: Mutex::new(ListeningState::Idle),
            recognizer: None,
            synthesizer: None,
            haptics: None,
        }
    }

    /// Attach a speech recognizer.
    #[must_use]
    pub fn with_recognizer(mut self, recognizer: Arc<dyn SpeechRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Attach a speech synthesizer.
    #[must_use]
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Attach haptic feedback.
    #[must_use]
    pub fn with_haptics(mut self, haptics: Arc<dyn Haptics>) -> Self {
        self.haptics = Some(haptics);
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Current listening state.
    #[must_use]
    pub fn state(&self) -> ListeningState {
        *lock(&self.state)
    }

    /// Whether command processing is currently suppressed.
    #[must_use]
    pub fn is_in_cooldown(&self) -> bool {
        lock(&self.cooldown).is_active()
    }

    /// Register a command. Duplicate keywords are allowed; matching decides.
    pub fn add_command(&self, command: VoiceCommand) {
        debug!(keywords = ?command.keywords(), "registering voice command");
        lock(&self.commands).push(command);
    }

    /// Remove every command sharing at least one keyword with `keywords`.
    ///
    /// Returns how many commands were removed.
    pub fn remove_command<K: AsRef<str>>(&self, keywords: &[K]) -> usize {
        let mut commands = lock(&self.commands);
        let before = commands.len();
        commands.retain(|cmd| !cmd.shares_keyword(keywords));
        before - commands.len()
    }

    /// Every registered command, in registration order.
    #[must_use]
    pub fn commands(&self) -> Vec<CommandInfo> {
        lock(&self.commands).iter().map(VoiceCommand::info).collect()
    }

    /// Registered commands in one category.
    #[must_use]
    pub fn commands_for(&self, category: CommandCategory) -> Vec<CommandInfo> {
        lock(&self.commands)
            .iter()
            .filter(|cmd| cmd.category() == category)
            .map(VoiceCommand::info)
            .collect()
    }

    /// Dispatch a transcript to the matching command.
    ///
    /// Returns `true` if a command ran. Input during the cooldown window is
    /// dropped silently, as is blank input. Unmatched input speaks the
    /// not-recognized phrase.
    pub fn process_voice_input(&self, text: &str) -> bool {
        if self.is_in_cooldown() {
            debug!(text, "voice input dropped during cooldown");
            return false;
        }

        let normalized = normalize(text);
        if normalized.is_empty() {
            return false;
        }

        // Clone the action out so the registry lock is not held while it runs
        let matched = {
            let commands = lock(&self.commands);
            find_match(&commands, &normalized, self.config.match_policy)
                .map(|cmd| (cmd.action(), cmd.description().to_string()))
        };

        match matched {
            Some((action, description)) => {
                info!(command = %description, "voice command matched");
                action();
                lock(&self.cooldown).trigger();
                if let Some(haptics) = &self.haptics {
                    haptics.impact(ImpactStyle::Medium);
                }
                true
            },
            None => {
                debug!(text = %normalized, "no voice command matched");
                self.speak(NOT_RECOGNIZED_PHRASE, None);
                false
            },
        }
    }

    /// Ask for microphone access and start a recognition session.
    ///
    /// Returns `true` if the session started.
    pub fn start_listening(&self) -> bool {
        let Some(recognizer) = self.recognizer.as_ref() else {
            warn!("no speech recognizer attached");
            self.speak(MIC_UNAVAILABLE_PHRASE, None);
            return false;
        };

        match recognizer.request_permission() {
            Ok(true) => {},
            Ok(false) => {
                warn!("microphone permission declined");
                self.speak(PERMISSION_DENIED_PHRASE, None);
                return false;
            },
            Err(e) => {
                warn!(error = %e, "microphone permission request failed");
                self.speak(RECOGNITION_ERROR_PHRASE, None);
                return false;
            },
        }

        match recognizer.start(&self.config.recognition) {
            Ok(()) => {
                *lock(&self.state) = ListeningState::Listening;
                info!(language = %self.config.recognition.language, "listening started");
                true
            },
            Err(e) => {
                warn!(error = %e, "speech recognition failed to start");
                self.speak(RECOGNITION_ERROR_PHRASE, None);
                false
            },
        }
    }

    /// Stop the recognition session, if any.
    pub fn stop_listening(&self) {
        if let Some(recognizer) = &self.recognizer {
            if let Err(e) = recognizer.stop() {
                warn!(error = %e, "speech recognition failed to stop");
            }
        }
        *lock(&self.state) = ListeningState::Idle;
    }

    /// Feed a recognizer notification through the manager.
    ///
    /// Only final transcripts are dispatched. Returns `true` if a command ran.
    pub fn handle_recognition_event(&self, event: RecognitionEvent) -> bool {
        match event {
            RecognitionEvent::Start => {
                *lock(&self.state) = ListeningState::Listening;
                false
            },
            RecognitionEvent::Result {
                transcript,
                is_final,
            } => is_final && self.process_voice_input(&transcript),
            RecognitionEvent::Error(message) => {
                warn!(error = %message, "speech recognition error");
                *lock(&self.state) = ListeningState::Idle;
                self.speak(RECOGNITION_ERROR_PHRASE, None);
                false
            },
            RecognitionEvent::End => {
                *lock(&self.state) = ListeningState::Idle;
                false
            },
        }
    }

    /// Speak `text`, cutting off anything already playing.
    ///
    /// The rate is clamped into the configured range. Speaking starts the
    /// cooldown so the assistant does not act on its own voice.
    pub fn speak(&self, text: &str, rate: Option<f32>) {
        lock(&self.cooldown).trigger();

        let Some(synthesizer) = &self.synthesizer else {
            debug!(text, "no synthesizer attached; speech dropped");
            return;
        };

        if synthesizer.is_speaking() {
            if let Err(e) = synthesizer.stop() {
                warn!(error = %e, "failed to stop in-flight speech");
            }
        }

        let params = SpeechParams {
            rate: self.clamp_rate(rate),
            pitch: DEFAULT_PITCH,
        };
        if let Err(e) = synthesizer.speak(text, params) {
            warn!(error = %e, "speech synthesis failed");
        }
    }

    /// Clamp a requested rate into the configured range.
    ///
    /// Missing or non-finite rates use the default rate.
    #[must_use]
    pub fn clamp_rate(&self, rate: Option<f32>) -> f32 {
        let requested = rate
            .filter(|r| r.is_finite())
            .unwrap_or(self.config.default_rate);
        requested.max(self.config.min_rate).min(self.config.max_rate)
    }

    /// Start the cooldown after the host changed screens.
    pub fn note_screen_transition(&self) {
        lock(&self.cooldown).trigger();
    }
}

impl Default for VoiceCommandManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl std::fmt::Debug for VoiceCommandManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceCommandManager")
            .field("config", &self.config)
            .field("commands", &lock(&self.commands).len())
            .field("state", &self.state())
            .field("recognizer", &self.recognizer.is_some())
            .field("synthesizer", &self.synthesizer.is_some())
            .field("haptics", &self.haptics.is_some())
            .finish()
    }
}
