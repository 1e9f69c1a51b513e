//! accessaid - offline reminder sync and voice command dispatch
//!
//! This crate provides the durable sync queue that buffers reminder writes
//! while the backend is unreachable, and the voice command manager that maps
//! recognized speech to registered actions.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod features;
pub mod logging;
pub mod output;
pub mod reminders;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::AccessAidError;
pub use features::sync::{SyncOperation, SyncQueue};
pub use features::voice::{VoiceCommand, VoiceCommandManager};
