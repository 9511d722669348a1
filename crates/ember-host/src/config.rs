//! Editor configuration.

use ember_core::CurveEditorConfig;
use ember_core::gradient::bridge::DEFAULT_SAMPLE_COUNT;

/// Default anchor limit of the curve editor.
const DEFAULT_MAX_ANCHORS: usize = 3;
/// Default pointer hit radius in canvas pixels.
const DEFAULT_HIT_RADIUS: f32 = 8.0;
/// Default key of the texture preset library.
const DEFAULT_PRESET_KEY: &str = "ember.texturePresets";

/// Runtime configuration for an editing workspace.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Samples per channel when rebuilding a gradient from curves.
    pub gradient_samples: usize,
    /// Anchor count above which curve insertion is refused.
    pub max_anchors: usize,
    /// Pointer hit radius in canvas pixels.
    pub hit_radius: f32,
    /// Key-value store key holding the texture preset library.
    pub preset_key: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl EditorConfig {
    /// Build from `EMBER_*` variables supplied by `lookup`. Missing or
    /// unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parsed = |key: &str| lookup(key).and_then(|s| s.trim().parse().ok());
        Self {
            gradient_samples: parsed("EMBER_GRADIENT_SAMPLES").unwrap_or(DEFAULT_SAMPLE_COUNT),
            max_anchors: parsed("EMBER_MAX_ANCHORS").unwrap_or(DEFAULT_MAX_ANCHORS),
            hit_radius: lookup("EMBER_HIT_RADIUS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_HIT_RADIUS),
            preset_key: lookup("EMBER_PRESET_KEY")
                .unwrap_or_else(|| DEFAULT_PRESET_KEY.to_string()),
        }
    }

    /// Per-session settings for a curve editor.
    pub fn curve_editor(&self) -> CurveEditorConfig {
        CurveEditorConfig {
            hit_radius: self.hit_radius,
            max_anchors: self.max_anchors,
            ..CurveEditorConfig::default()
        }
    }
}
