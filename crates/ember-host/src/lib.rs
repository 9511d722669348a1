//! Ember Host: host-boundary contracts and the effect editing workspace.
//!
//! The editor core never touches the clipboard, persistent storage, or the
//! live particle preview directly. Hosts implement [`Clipboard`],
//! [`KeyValueStore`], and [`ParticleHost`]; [`workspace::EffectWorkspace`]
//! wires a document to curve and gradient sessions through them.

pub mod config;
pub mod memory;
pub mod presets;
pub mod workspace;

pub use config::EditorConfig;
pub use presets::{TextureLibrary, TexturePreset};
pub use workspace::{EffectWorkspace, LoadOutcome, WorkspaceError};

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Errors ───────────────────────────────────────────────────────

/// Failures reported by host collaborators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    #[error("clipboard unavailable: {0}")]
    Clipboard(String),

    #[error("storage failure: {0}")]
    Storage(String),
}

// ── Collaborators ────────────────────────────────────────────────

/// Plain-text system clipboard.
pub trait Clipboard {
    fn read_text(&mut self) -> Result<String, HostError>;

    fn write_text(&mut self, text: &str) -> Result<(), HostError>;
}

/// Small string key-value store, e.g. browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, HostError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), HostError>;
}

/// A texture the host can resolve by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureAsset {
    pub url: String,
    /// Sprite sheet grid as `[columns, rows]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiles: Option<[u32; 2]>,
}

/// The application side of the editor: live preview, asset lookup, and the
/// scene around the effect.
pub trait ParticleHost {
    /// Rebuild the live particle system from the current document.
    fn recreate_particle_system(&mut self, document: &Value);

    fn texture(&self, id: &str) -> Option<TextureAsset>;

    /// Show the ground plane with the given texture, or hide it.
    fn set_terrain(&mut self, texture_id: Option<&str>);
}
