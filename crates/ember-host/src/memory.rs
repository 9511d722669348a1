//! In-memory collaborators for headless tools and tests.

use std::collections::HashMap;

use crate::{Clipboard, HostError, KeyValueStore};

/// A clipboard backed by a string. An unavailable clipboard fails every
/// call, like a browser denying clipboard permission.
#[derive(Debug, Clone)]
pub struct MemoryClipboard {
    text: String,
    available: bool,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            available: true,
        }
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            available: true,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            text: String::new(),
            available: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for MemoryClipboard {
    fn read_text(&mut self) -> Result<String, HostError> {
        if !self.available {
            return Err(HostError::Clipboard("read permission denied".to_string()));
        }
        Ok(self.text.clone())
    }

    fn write_text(&mut self, text: &str) -> Result<(), HostError> {
        if !self.available {
            return Err(HostError::Clipboard("write permission denied".to_string()));
        }
        self.text = text.to_string();
        Ok(())
    }
}

/// A key-value store backed by a map. Writes can be made to fail to model a
/// full or read-only store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, HostError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), HostError> {
        if self.read_only {
            return Err(HostError::Storage(format!("store is read-only, cannot write '{key}'")));
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
