//! Feature implementations for accessaid.
//!
//! - Sync queue: offline buffering and replay of reminder writes
//! - Voice: keyword command dispatch with spoken feedback

pub mod sync;
pub mod voice;
