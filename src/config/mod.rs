//! Configuration management for accessaid.
//!
//! This module handles loading configuration from `~/.accessaid/`.

mod paths;
mod settings;

pub use paths::{Paths, HOME_OVERRIDE_VAR};
pub use settings::{Config, GeneralConfig, RemoteConfig, SyncConfig, VoiceConfig};
