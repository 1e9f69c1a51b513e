//! Storage layer for accessaid.
//!
//! This module provides SQLite-based persistence for the key-value blobs
//! the sync queue snapshots into, plus an in-memory store for tests and
//! embedding.

mod database;
mod kv;
mod migrations;

pub use database::Database;
pub use kv::{KeyValueStore, MemoryStore};
