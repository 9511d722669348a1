//! Interactive curve editing session.
//!
//! A session owns one curve and turns pointer gestures into model edits:
//!
//! ```text
//!   Idle ──press on point──→ Dragging ──move──→ Dragging ──release──→ Idle
//! ```
//!
//! Pressing a tangent handle also captures its sibling handle as the mirror
//! target. While dragging, the mirror target is rotated to stay opposite the
//! moved handle (keeping the curve C1 at that anchor) but keeps its own
//! distance from the anchor. Both writes happen inside a single
//! [`CurveEditorSession::pointer_move`] call.
//!
//! The model is the only state. [`CurveEditorSession::scene`] projects it for
//! drawing; observers are told after every committed edit.

use std::f32::consts::PI;

use glam::Vec2;

use super::evaluate::CurveEvaluator;
use super::model::{Curve, CurveError, PointRole};
use super::presets::CurvePreset;
use super::render::{CurveScene, Viewport, render_curve};

/// Handles closer than this to their anchor have no usable direction.
const MIN_HANDLE_LENGTH: f32 = 1e-6;

/// Receives the curve after every committed edit.
pub trait CurveObserver {
    fn curve_changed(&mut self, curve: &Curve);
}

/// Per-session editor settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveEditorConfig {
    pub viewport: Viewport,
    /// Grid cells per axis.
    pub grid_divisions: u32,
    /// Pointer hit radius in canvas pixels.
    pub hit_radius: f32,
    /// Anchor count above which insertion is refused.
    pub max_anchors: usize,
}

impl Default for CurveEditorConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            grid_divisions: 4,
            hit_radius: 8.0,
            max_anchors: 3,
        }
    }
}

/// Pointer interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Point index under the pointer.
        selection: usize,
        /// Sibling handle rotated along with `selection`.
        mirror: Option<usize>,
    },
}

/// An editing session over a single curve.
pub struct CurveEditorSession {
    curve: Curve,
    drag: DragState,
    config: CurveEditorConfig,
    revision: u64,
    observer: Option<Box<dyn CurveObserver>>,
}

impl CurveEditorSession {
    /// Open a session. Implicit handles are made explicit so every tangent
    /// can be grabbed.
    pub fn new(curve: Curve, config: CurveEditorConfig) -> Self {
        Self {
            curve: curve.with_explicit_handles(),
            drag: DragState::Idle,
            config,
            revision: 0,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: Box<dyn CurveObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn into_curve(self) -> Curve {
        self.curve
    }

    pub fn config(&self) -> &CurveEditorConfig {
        &self.config
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn selection(&self) -> Option<usize> {
        match self.drag {
            DragState::Dragging { selection, .. } => Some(selection),
            DragState::Idle => None,
        }
    }

    pub fn mirror_target(&self) -> Option<usize> {
        match self.drag {
            DragState::Dragging { mirror, .. } => mirror,
            DragState::Idle => None,
        }
    }

    /// Number of committed edits since the session opened.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Display list for the current model state.
    pub fn scene(&self) -> CurveScene {
        render_curve(
            &self.curve,
            &self.config.viewport,
            self.config.grid_divisions,
            self.selection(),
        )
    }

    /// Nearest point within the hit radius of a canvas position.
    pub fn hit_test(&self, canvas: Vec2) -> Option<usize> {
        let viewport = &self.config.viewport;
        self.curve
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| (i, viewport.to_canvas(p.position()).distance(canvas)))
            .filter(|(_, d)| *d <= self.config.hit_radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(i, _)| i)
    }

    // ── Pointer gestures ─────────────────────────────────────────

    /// Start dragging the point under `canvas`, if any.
    pub fn pointer_press(&mut self, canvas: Vec2) -> bool {
        let Some(index) = self.hit_test(canvas) else {
            return false;
        };
        self.begin_drag(index)
    }

    /// Start dragging the point at `index`.
    pub fn begin_drag(&mut self, index: usize) -> bool {
        let mirror = match self.curve.role(index) {
            Some(PointRole::Handle { .. }) => self.curve.sibling_handle(index),
            Some(PointRole::Anchor { .. }) => None,
            None => return false,
        };
        tracing::debug!("curve drag start: point {index}, mirror {mirror:?}");
        self.drag = DragState::Dragging {
            selection: index,
            mirror,
        };
        true
    }

    /// Move the dragged point to follow the pointer. Returns whether the
    /// curve changed.
    pub fn pointer_move(&mut self, canvas: Vec2) -> bool {
        let DragState::Dragging { selection, mirror } = self.drag else {
            return false;
        };
        let target = self.config.viewport.to_normalized(canvas);
        if !self.drag_point(selection, mirror, target) {
            return false;
        }
        self.commit();
        true
    }

    /// Finish the drag. Every intermediate position was already committed.
    pub fn pointer_release(&mut self) {
        if let DragState::Dragging { selection, .. } = self.drag {
            tracing::debug!("curve drag end: point {selection}");
        }
        self.drag = DragState::Idle;
    }

    // ── Programmatic edits ───────────────────────────────────────

    /// Move the point at `index` to a normalized position, applying the same
    /// clamps and mirroring as a pointer drag.
    pub fn move_point(&mut self, index: usize, target: Vec2) -> Result<(), CurveError> {
        let mirror = match self.curve.role(index) {
            Some(PointRole::Handle { .. }) => self.curve.sibling_handle(index),
            Some(PointRole::Anchor { .. }) => None,
            None => {
                return Err(CurveError::IndexOutOfRange {
                    index,
                    len: self.curve.len(),
                });
            }
        };
        if self.drag_point(index, mirror, target) {
            self.commit();
        }
        Ok(())
    }

    /// Add an anchor on the curve at domain position `x`.
    pub fn insert_anchor(&mut self, x: f32) -> Result<usize, CurveError> {
        let limit = self.config.max_anchors;
        if self.curve.anchor_count() >= limit {
            tracing::debug!("anchor insert at {x} refused: limit {limit}");
            return Err(CurveError::AnchorLimit { limit });
        }
        let y = CurveEvaluator { curve: &self.curve }.evaluate(x);
        let index = self.curve.insert_anchor(x, y)?;
        self.drag = DragState::Idle;
        self.commit();
        Ok(index)
    }

    /// Remove an interior anchor and its handles.
    pub fn remove_anchor(&mut self, index: usize) -> Result<(), CurveError> {
        self.curve.remove_anchor(index)?;
        self.drag = DragState::Idle;
        self.commit();
        Ok(())
    }

    /// Replace the curve with a preset shape.
    pub fn apply_preset(&mut self, preset: CurvePreset) {
        tracing::debug!("applying curve preset {}", preset.label());
        self.replace_curve(preset.curve());
    }

    /// Replace the whole curve, e.g. when the document is reloaded.
    pub fn replace_curve(&mut self, curve: Curve) {
        self.curve = curve.with_explicit_handles();
        self.drag = DragState::Idle;
        self.commit();
    }

    fn commit(&mut self) {
        self.revision = self.revision.wrapping_add(1);
        if let Some(observer) = self.observer.as_mut() {
            observer.curve_changed(&self.curve);
        }
    }

    /// Apply a drag step. Returns false if `index` is not a point.
    fn drag_point(&mut self, index: usize, mirror: Option<usize>, target: Vec2) -> bool {
        match self.curve.role(index) {
            Some(PointRole::Anchor { ordinal }) => {
                self.drag_anchor(index, ordinal, target);
                true
            }
            Some(PointRole::Handle { anchor, .. }) => {
                self.drag_handle(index, anchor, mirror, target);
                true
            }
            None => false,
        }
    }

    fn drag_anchor(&mut self, index: usize, ordinal: usize, target: Vec2) {
        let slots = self.curve.anchor_slots();
        let last_ordinal = slots.len() - 1;
        let points = self.curve.points();

        let x = if ordinal == 0 {
            0.0
        } else if ordinal == last_ordinal {
            1.0
        } else {
            // Interior anchors stay between their neighbours.
            let lo = points[slots[ordinal - 1].index].x.max(0.0);
            let hi = points[slots[ordinal + 1].index].x.min(1.0);
            target.x.clamp(lo, hi.max(lo))
        };
        let y = target.y.clamp(0.0, 1.0);

        let old = points[index].position();
        let delta = Vec2::new(x, y) - old;
        let slot = slots[ordinal];

        // Handles live in the anchor's frame and travel with it.
        for handle in [slot.left, slot.right].into_iter().flatten() {
            if let Some(point) = self.curve.point_mut(handle) {
                let moved = point.position() + delta;
                point.set_position(moved);
            }
        }
        if let Some(point) = self.curve.point_mut(index) {
            point.set_position(Vec2::new(x, y));
            if ordinal == 0 {
                point.percentage = Some(0.0);
            } else if ordinal == last_ordinal {
                point.percentage = Some(1.0);
            }
        }
    }

    fn drag_handle(&mut self, index: usize, anchor: usize, mirror: Option<usize>, target: Vec2) {
        let anchor_pos = self.curve.points()[anchor].position();
        let local = target - anchor_pos;
        let moved = (anchor_pos + local).clamp(Vec2::ZERO, Vec2::ONE);

        if let Some(point) = self.curve.point_mut(index) {
            point.set_position(moved);
        }

        let Some(mirror) = mirror else {
            return;
        };
        let direction = moved - anchor_pos;
        if direction.length() < MIN_HANDLE_LENGTH {
            return;
        }
        let Some(partner) = self.curve.point_mut(mirror) else {
            return;
        };
        let distance = partner.position().distance(anchor_pos);
        let angle = direction.y.atan2(direction.x) + PI;
        partner.set_position(anchor_pos + Vec2::from_angle(angle) * distance);
    }
}
