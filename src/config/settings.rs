//! Configuration settings for accessaid.
//!
//! Settings are loaded from `~/.accessaid/config.yaml`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::AccessAidError;
use crate::features::voice::MatchPolicy;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Sync queue settings.
    pub sync: SyncConfig,
    /// Voice command and speech settings.
    pub voice: VoiceConfig,
    /// Remote reminder store settings.
    pub remote: RemoteConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    /// Owner id used when queueing creates from the command line.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Sync queue settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Failed attempts after which an operation is marked stuck.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Voice command and speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Cooldown after speech, dispatch or screen change, in milliseconds.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    /// Recognition language tag.
    #[serde(default = "default_language")]
    pub language: String,
    /// Ask the recognizer for interim results.
    #[serde(default = "default_true")]
    pub interim_results: bool,
    /// Keep the recognition session open between utterances.
    #[serde(default = "default_true")]
    pub continuous: bool,
    /// Speech rate used when none is given.
    #[serde(default = "default_rate")]
    pub default_rate: f32,
    /// Lowest rate passed to the synthesizer.
    #[serde(default = "default_min_rate")]
    pub min_rate: f32,
    /// Highest rate passed to the synthesizer.
    #[serde(default = "default_max_rate")]
    pub max_rate: f32,
    /// How overlapping keyword matches are resolved.
    #[serde(default)]
    pub match_policy: MatchPolicy,
}

/// Remote reminder store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Backend base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_output_format() -> OutputFormat {
    OutputFormat::Pretty
}

const fn default_max_attempts() -> u32 {
    5
}

const fn default_cooldown_ms() -> u64 {
    1200
}

fn default_language() -> String {
    "en-US".to_string()
}

const fn default_true() -> bool {
    true
}

const fn default_rate() -> f32 {
    1.0
}

const fn default_min_rate() -> f32 {
    0.5
}

const fn default_max_rate() -> f32 {
    2.0
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: default_output_format(),
            user_id: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: default_cooldown_ms(),
            language: default_language(),
            interim_results: default_true(),
            continuous: default_true(),
            default_rate: default_rate(),
            min_rate: default_min_rate(),
            max_rate: default_max_rate(),
            match_policy: MatchPolicy::default(),
        }
    }
}

impl VoiceConfig {
    /// Cooldown window as a duration.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, AccessAidError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or
    /// holds inconsistent values.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, AccessAidError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            AccessAidError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            AccessAidError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), AccessAidError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| AccessAidError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            AccessAidError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Reject settings that cannot work together.
    ///
    /// # Errors
    ///
    /// Returns `AccessAidError::Config` describing the first problem found.
    pub fn validate(&self) -> Result<(), AccessAidError> {
        if self.sync.max_attempts == 0 {
            return Err(AccessAidError::Config(
                "sync.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(self.voice.min_rate > 0.0 && self.voice.min_rate <= self.voice.max_rate) {
            return Err(AccessAidError::Config(format!(
                "voice.min_rate ({}) must be positive and not above voice.max_rate ({})",
                self.voice.min_rate, self.voice.max_rate
            )));
        }
        Ok(())
    }
}
