//! Key-value persistence seam.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::AccessAidError;

/// A string-keyed store of serialized blobs.
///
/// No schema versioning happens at this level: callers own the format of
/// what they write.
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, AccessAidError>;

    /// Replace the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), AccessAidError>;

    /// Delete `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), AccessAidError>;
}

/// In-process store, used by tests and embedders without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
    fail_writes: Mutex<bool>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, to exercise persistence errors.
    pub fn set_fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    fn writes_failing(&self) -> bool {
        self.fail_writes.lock().map_or(true, |flag| *flag)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, AccessAidError> {
        let values = self
            .values
            .lock()
            .map_err(|_| AccessAidError::Database("Memory store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AccessAidError> {
        if self.writes_failing() {
            return Err(AccessAidError::Database(format!(
                "Write to {key} rejected"
            )));
        }
        let mut values = self
            .values
            .lock()
            .map_err(|_| AccessAidError::Database("Memory store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AccessAidError> {
        if self.writes_failing() {
            return Err(AccessAidError::Database(format!(
                "Remove of {key} rejected"
            )));
        }
        let mut values = self
            .values
            .lock()
            .map_err(|_| AccessAidError::Database("Memory store lock poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));

        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_memory_store_failing_writes() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();

        store.set_fail_writes(true);
        assert!(store.set("a", "2").is_err());
        assert_eq!(store.get("a").unwrap(), Some("1".to_string()));

        store.set_fail_writes(false);
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a").unwrap(), Some("2".to_string()));
    }
}
