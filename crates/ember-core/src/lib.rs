//! Ember Core: domain layer for particle effect editing.
//!
//! Lifetime curves and their interactive editor, color/opacity gradients
//! and their per-channel curve form, and the effect document with schema
//! detection and legacy migration. No framework or I/O dependencies.

pub mod curve;
pub mod document;
pub mod gradient;
pub mod schema;

// Re-exports for convenience.
pub use curve::editor::{CurveEditorConfig, CurveEditorSession, CurveObserver, DragState};
pub use curve::evaluate::{CurveEvaluator, bake_curve, evaluate};
pub use curve::lifetime::LifetimeCurve;
pub use curve::model::{Curve, CurveError, CurvePoint};
pub use curve::presets::CurvePreset;
pub use document::{DocumentError, EditorData, EffectDocument, LoadedDocument, default_document};
pub use gradient::bridge::{ChannelCurves, bezier_curves_to_gradient, gradient_to_bezier_curves};
pub use gradient::editor::{GradientEditorSession, GradientObserver};
pub use gradient::model::{Channel, GradientError, GradientModel, GradientStop, StopColor};
pub use schema::{Detection, detect_schema, is_current_schema, migrate};
