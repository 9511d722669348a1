//! The effect editing workspace.
//!
//! [`EffectWorkspace`] owns the current document and is the only writer to
//! it. Curve and gradient sessions are opened from the document, edited
//! independently, and committed back; every committed change rebuilds the
//! host's live particle system.

use ember_core::curve::lifetime::LifetimeCurve;
use ember_core::document::DocumentError;
use ember_core::schema::field::{CurveField, RangeValue};
use ember_core::schema::{COLOR_OVER_LIFETIME, Detection, TEXTURE_SHEET_ANIMATION};
use ember_core::{
    Curve, CurveEditorSession, EffectDocument, GradientEditorSession, GradientError,
    GradientModel, bezier_curves_to_gradient, default_document, gradient_to_bezier_curves,
};
use serde_json::{Value, json};

use crate::config::EditorConfig;
use crate::presets::TexturePreset;
use crate::{Clipboard, ParticleHost, TextureAsset};

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Gradient(#[from] GradientError),

    #[error("unknown texture '{0}'")]
    UnknownTexture(String),
}

/// What a load or paste did to the incoming document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    pub detection: Detection,
    pub rewritten: Vec<String>,
}

impl LoadOutcome {
    pub fn migrated(&self) -> bool {
        !self.detection.is_current
    }
}

pub struct EffectWorkspace<H: ParticleHost> {
    host: H,
    config: EditorConfig,
    document: EffectDocument,
    defaults: EffectDocument,
}

impl<H: ParticleHost> EffectWorkspace<H> {
    /// Start from the default document.
    pub fn new(host: H, config: EditorConfig) -> Self {
        Self {
            host,
            config,
            document: default_document(),
            defaults: default_document(),
        }
    }

    pub fn document(&self) -> &EffectDocument {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Replace the document with `text`, migrating legacy documents.
    ///
    /// On failure the current document is kept.
    pub fn load_text(&mut self, text: &str) -> Result<LoadOutcome, WorkspaceError> {
        let loaded = EffectDocument::load(text).inspect_err(|e| {
            tracing::error!("failed to load effect document: {e}");
        })?;
        let outcome = LoadOutcome {
            detection: loaded.detection,
            rewritten: loaded.rewritten,
        };
        self.install(loaded.document)
            .inspect_err(|e| tracing::error!("failed to load effect document: {e}"))?;
        Ok(outcome)
    }

    /// Reset to the default document.
    pub fn reset(&mut self) -> Result<(), WorkspaceError> {
        self.install(self.defaults.clone())
    }

    // ── Scalar fields ────────────────────────────────────────────

    pub fn set_range(&mut self, key: &str, value: RangeValue) {
        self.document.set_range(key, value.collapsed());
        self.recreate();
    }

    // ── Curves ───────────────────────────────────────────────────

    /// Open an editor over the curve module `key`, e.g. `sizeOverLifetime`.
    /// A missing module opens on a linear curve.
    pub fn open_curve_session(&self, key: &str) -> Result<CurveEditorSession, WorkspaceError> {
        let curve = self
            .document
            .curve_field(key)?
            .map(|field| field.lifetime_curve.bezier_points)
            .unwrap_or_default();
        Ok(CurveEditorSession::new(curve, self.config.curve_editor()))
    }

    /// Write an edited curve back to module `key`. The module's activation,
    /// scale, and unknown keys are kept; a missing module is created active.
    pub fn commit_curve(&mut self, key: &str, curve: &Curve) -> Result<(), WorkspaceError> {
        let field = match self.document.curve_field(key)? {
            Some(mut field) => {
                field.lifetime_curve.bezier_points = curve.clone();
                field
            }
            None => CurveField::new(true, LifetimeCurve::new(curve.clone())),
        };
        self.document.set_curve_field(key, &field)?;
        tracing::debug!("committed curve to {key}");
        self.recreate();
        Ok(())
    }

    pub fn set_curve_active(&mut self, key: &str, active: bool) -> Result<(), WorkspaceError> {
        let Some(mut field) = self.document.curve_field(key)? else {
            return Ok(());
        };
        field.is_active = active;
        self.document.set_curve_field(key, &field)?;
        self.recreate();
        Ok(())
    }

    // ── Gradient ─────────────────────────────────────────────────

    /// The gradient behind the color and opacity curves: the stops saved in
    /// `_editorData` when valid, else a reconstruction from the curves of an
    /// active color module, else white to transparent.
    pub fn gradient(&self) -> Result<GradientModel, WorkspaceError> {
        if let Some(stops) = self.document.editor_data()?.gradient_stops {
            match GradientModel::new(stops) {
                Ok(gradient) => return Ok(gradient),
                Err(e) => tracing::warn!("ignoring saved gradient stops: {e}"),
            }
        }
        let color_active = self
            .document
            .get(COLOR_OVER_LIFETIME)
            .and_then(|color| color.get("isActive"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let curves = if color_active {
            self.document.channel_curves()?
        } else {
            None
        };
        if let Some(curves) = curves {
            let stops = bezier_curves_to_gradient(&curves, self.config.gradient_samples);
            return Ok(GradientModel::new(stops)?);
        }
        Ok(GradientModel::white_to_transparent())
    }

    pub fn open_gradient_session(&self) -> Result<GradientEditorSession, WorkspaceError> {
        Ok(GradientEditorSession::new(self.gradient()?))
    }

    /// Write a gradient into the color/opacity curves and save its stops.
    pub fn commit_gradient(&mut self, gradient: &GradientModel) -> Result<(), WorkspaceError> {
        let curves = gradient_to_bezier_curves(gradient.stops())?;
        let mut data = self.document.editor_data()?;
        data.gradient_stops = Some(gradient.stops().to_vec());
        self.document.set_channel_curves(&curves)?;
        self.document.set_editor_data(&data)?;
        tracing::debug!("committed gradient with {} stops", gradient.len());
        self.recreate();
        Ok(())
    }

    // ── Textures and terrain ─────────────────────────────────────

    /// Use texture `id` for the particles. Its sprite grid, if any, is
    /// copied into the texture sheet animation.
    pub fn select_texture(&mut self, id: &str) -> Result<TextureAsset, WorkspaceError> {
        let asset = self
            .host
            .texture(id)
            .ok_or_else(|| WorkspaceError::UnknownTexture(id.to_string()))?;

        let mut data = self.document.editor_data()?;
        data.texture_id = Some(id.to_string());
        self.document.set_editor_data(&data)?;

        if let Some([columns, rows]) = asset.tiles {
            let mut animation = self
                .document
                .get(TEXTURE_SHEET_ANIMATION)
                .and_then(Value::as_object)
                .cloned()
                .unwrap_or_default();
            animation.insert("tiles".to_string(), json!({"x": columns, "y": rows}));
            self.document.set(TEXTURE_SHEET_ANIMATION, Value::Object(animation));
        }

        self.recreate();
        Ok(asset)
    }

    pub fn apply_texture_preset(
        &mut self,
        preset: &TexturePreset,
    ) -> Result<TextureAsset, WorkspaceError> {
        self.select_texture(&preset.texture)
    }

    /// The current texture saved under `name`, if a texture is selected.
    pub fn texture_preset(&self, name: &str) -> Result<Option<TexturePreset>, WorkspaceError> {
        Ok(self
            .document
            .editor_data()?
            .texture_id
            .map(|texture| TexturePreset::new(name, texture)))
    }

    /// Show or hide the ground plane. The choice is saved with the document
    /// but does not affect the particle system.
    pub fn set_terrain(&mut self, texture_id: Option<&str>) -> Result<(), WorkspaceError> {
        let mut data = self.document.editor_data()?;
        data.terrain = texture_id.map(str::to_string);
        self.document.set_editor_data(&data)?;
        self.host.set_terrain(texture_id);
        Ok(())
    }

    // ── Clipboard ────────────────────────────────────────────────

    /// Copy the document as a diff against the defaults plus `_editorData`.
    /// Returns whether the clipboard accepted it.
    pub fn copy_to_clipboard(&self, clipboard: &mut impl Clipboard) -> bool {
        let text = match self.copy_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("failed to encode document for copy: {e}");
                return false;
            }
        };
        match clipboard.write_text(&text) {
            Ok(()) => {
                tracing::info!("copied effect document ({} bytes)", text.len());
                true
            }
            Err(e) => {
                tracing::warn!("copy failed: {e}");
                false
            }
        }
    }

    /// Replace the document with the clipboard contents merged over the
    /// defaults.
    ///
    /// An unreadable clipboard is logged and yields `Ok(None)`. Text that is
    /// not a document is an error and leaves the current document in place.
    pub fn paste_from_clipboard(
        &mut self,
        clipboard: &mut impl Clipboard,
    ) -> Result<Option<LoadOutcome>, WorkspaceError> {
        let text = match clipboard.read_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("paste failed: {e}");
                return Ok(None);
            }
        };
        let loaded = EffectDocument::load(&text).inspect_err(|e| {
            tracing::error!("clipboard does not hold an effect document: {e}");
        })?;

        let merged = loaded.document.merged_over(&self.defaults);
        self.install(merged).inspect_err(|e| {
            tracing::error!("clipboard does not hold an effect document: {e}");
        })?;
        tracing::info!(
            "pasted effect document ({} top-level keys)",
            self.document.as_map().len()
        );
        Ok(Some(LoadOutcome {
            detection: loaded.detection,
            rewritten: loaded.rewritten,
        }))
    }

    fn copy_text(&self) -> Result<String, DocumentError> {
        let mut document = self.document.clone();
        document.stamp_editor_version()?;
        Ok(serde_json::to_string_pretty(
            &document.diff_for_copy(&self.defaults),
        )?)
    }

    // ── Host notifications ───────────────────────────────────────

    /// Swap in `document` once its editor data decodes, then redisplay.
    fn install(&mut self, document: EffectDocument) -> Result<(), WorkspaceError> {
        let terrain = document.editor_data()?.terrain;
        self.document = document;
        self.host.set_terrain(terrain.as_deref());
        self.recreate();
        Ok(())
    }

    fn recreate(&mut self) {
        tracing::debug!("recreating particle system");
        self.host.recreate_particle_system(&self.document.to_value());
    }
}
