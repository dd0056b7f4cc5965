//! Session store backends.
//!
//! [`MemoryStore`] lives as long as the process. [`FileSessionStore`] writes
//! every change through to a JSON file, so a session spans several CLI runs
//! until that file is removed.

use crate::domain::ports::SessionStore;
use crate::utils::error::Result;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl SessionStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.lock().remove(key);
        Ok(())
    }

    fn remove_if(&self, key: &str, expected: &str) -> Result<bool> {
        let mut items = self.items.lock();
        if items.get(key).map(String::as_str) != Some(expected) {
            return Ok(false);
        }
        items.remove(key);
        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    items: Arc<Mutex<BTreeMap<String, String>>>,
}

impl FileSessionStore {
    /// Opens the session file, starting empty if it does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let items = match std::fs::read(&path) {
            Ok(bytes) if !bytes.is_empty() => match serde_json::from_slice(&bytes) {
                Ok(items) => items,
                Err(e) => {
                    tracing::warn!(
                        "Session file {} is unreadable ({}), starting a new session",
                        path.display(),
                        e
                    );
                    BTreeMap::new()
                }
            },
            Ok(_) => BTreeMap::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Opened session file {}", path.display());
        Ok(Self {
            path,
            items: Arc::new(Mutex::new(items)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let data = serde_json::to_vec_pretty(items)?;
        std::fs::write(&self.path, data)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock();
        items.insert(key.to_string(), value.to_string());
        self.flush(&items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock();
        if items.remove(key).is_some() {
            self.flush(&items)?;
        }
        Ok(())
    }

    fn remove_if(&self, key: &str, expected: &str) -> Result<bool> {
        let mut items = self.items.lock();
        if items.get(key).map(String::as_str) != Some(expected) {
            return Ok(false);
        }
        items.remove(key);
        self.flush(&items)?;
        Ok(true)
    }
}
