//! JSON file standing in for browser `localStorage`.
//!
//! The file holds one flat object of string values. Every write rewrites the
//! whole file; it is a handful of keys.
//!
//! ERROR HANDLING
//! ==============
//! A missing or corrupt file reads as empty. Write failures are logged and
//! otherwise ignored, matching a browser whose storage quota is exhausted.
//!
//! The file holds a bearer token, so on unix it is kept owner-only (`0600`).

#[cfg(test)]
#[path = "state_file_test.rs"]
mod state_file_test;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use session::KeyValueStore;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, loading any values already stored there.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load(&path);
        Self { path, values: Mutex::new(values) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) {
        let rendered = match serde_json::to_string_pretty(values) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::warn!(error = %e, "state file encode failed");
                return;
            }
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %e, "state dir create failed");
                return;
            }
        }
        if let Err(e) = write_private(&self.path, rendered.as_bytes()) {
            tracing::warn!(path = %self.path.display(), error = %e, "state file write failed");
        }
    }
}

#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new().write(true).create(true).truncate(true).mode(0o600).open(path)?;
    // `mode` only applies on creation; tighten files left by older runs.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new().write(true).create(true).truncate(true).open(path)?;
    file.write_all(contents)
}

fn load(path: &Path) -> BTreeMap<String, String> {
    let Ok(raw) = fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::debug!(path = %path.display(), error = %e, "ignoring corrupt state file");
        BTreeMap::new()
    })
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_owned(), value.to_owned());
        self.persist(&values);
    }

    fn remove(&self, key: &str) {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        if values.remove(key).is_some() {
            self.persist(&values);
        }
    }
}
