//! Session store persisted as a JSON file
//!
//! The CLI runs one request per process, so the session is loaded at
//! start and written back with [`FileSessionStore::flush`] at the end.

use anyhow::{Context, Result};
use simple_crud_core::{MemorySessionStore, SessionStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

type Sections = HashMap<String, HashMap<String, serde_json::Value>>;

pub struct FileSessionStore {
    path: PathBuf,
    inner: MemorySessionStore,
}

impl FileSessionStore {
    pub fn default_path() -> Result<PathBuf> {
        crate::settings::data_dir().map(|dir| dir.join("session.json"))
    }

    /// Open the session file, starting empty if it does not exist or is unreadable JSON
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let sections = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session from {:?}", path))?;
            match serde_json::from_str::<Sections>(&content) {
                Ok(sections) => sections,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "discarding corrupt session file");
                    Sections::new()
                }
            }
        } else {
            Sections::new()
        };

        Ok(Self {
            path,
            inner: MemorySessionStore::from_snapshot(sections),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the session back to disk
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(&self.inner.snapshot())?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session to {:?}", self.path))?;
        tracing::debug!(path = %self.path.display(), "session saved");
        Ok(())
    }

    /// Drop all stored state
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to delete session at {:?}", self.path))?;
        }
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, section: &str, key: &str) -> Option<serde_json::Value> {
        self.inner.get(section, key)
    }

    fn set(&self, section: &str, key: &str, value: serde_json::Value) {
        self.inner.set(section, key, value)
    }

    fn remove(&self, section: &str, key: &str) -> Option<serde_json::Value> {
        self.inner.remove(section, key)
    }
}
