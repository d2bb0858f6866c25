//! Persisted client storage seam.
//!
//! Values are plain strings; a missing key means "not set". Browser builds
//! back this with `localStorage`, the CLI with a JSON state file.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the selected clinic id (decimal string).
pub const SELECTED_CLINIC_KEY: &str = "selectedClinicId";

/// String key/value persistence shared across reloads.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-process store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with initial key/value pairs.
    #[must_use]
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let values = entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Self { values: Mutex::new(values) }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}
