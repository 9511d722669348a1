//! Named texture presets persisted in the host key-value store.
//!
//! The library is stored as a JSON array of `{name, texture}` objects under
//! a single key. Storage problems never reach the caller: an unreadable
//! library loads empty and a failed save is logged.

use serde::{Deserialize, Serialize};

use crate::KeyValueStore;

/// A saved texture choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TexturePreset {
    pub name: String,
    /// Texture id resolved through the particle host.
    pub texture: String,
}

impl TexturePreset {
    pub fn new(name: impl Into<String>, texture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            texture: texture.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureLibrary {
    presets: Vec<TexturePreset>,
}

impl TextureLibrary {
    pub fn load(store: &impl KeyValueStore, key: &str) -> Self {
        let text = match store.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => return Self::default(),
            Err(e) => {
                tracing::warn!("texture presets unavailable: {e}");
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(presets) => Self { presets },
            Err(e) => {
                tracing::warn!("discarding malformed texture presets under '{key}': {e}");
                Self::default()
            }
        }
    }

    /// Persist the library. Returns whether the write succeeded.
    pub fn save(&self, store: &mut impl KeyValueStore, key: &str) -> bool {
        let text = match serde_json::to_string(&self.presets) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("failed to encode texture presets: {e}");
                return false;
            }
        };
        match store.set(key, &text) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to save texture presets: {e}");
                false
            }
        }
    }

    pub fn presets(&self) -> &[TexturePreset] {
        &self.presets
    }

    pub fn get(&self, name: &str) -> Option<&TexturePreset> {
        self.presets.iter().find(|p| p.name == name)
    }

    /// Add a preset, replacing any preset with the same name.
    pub fn upsert(&mut self, preset: TexturePreset) {
        match self.presets.iter_mut().find(|p| p.name == preset.name) {
            Some(existing) => *existing = preset,
            None => self.presets.push(preset),
        }
    }

    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.presets.len();
        self.presets.retain(|p| p.name != name);
        self.presets.len() != before
    }
}
