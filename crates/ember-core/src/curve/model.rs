//! Piecewise cubic Bézier curves over the lifetime domain [0..1].
//!
//! A curve is stored as the flat point list particle documents use. Anchors
//! carry a `percentage`; tangent handles do not:
//!
//! ```text
//! [anchor0, right0, left1, anchor1, right1, left2, anchor2, ...]
//! ```
//!
//! The first anchor has no left handle and the last anchor has no right
//! handle. Each segment between consecutive anchors is a cubic Bézier with
//! control points `(anchor, right handle, next left handle, next anchor)`.
//!
//! Handles may be absent from a segment (bare two-point curves are common in
//! older documents). A missing handle sits one third of the way along the
//! chord, which makes a handle-less segment exactly linear.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Tolerance for the pinned endpoint check.
const PIN_TOLERANCE: f32 = 1e-6;

/// Maximum number of handles between two consecutive anchors.
const MAX_HANDLE_RUN: usize = 2;

// ── Errors ───────────────────────────────────────────────────────

/// Structural errors raised when building or editing a [`Curve`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("curve has {count} anchors; at least 2 are required")]
    TooFewAnchors { count: usize },

    #[error("curve must start with an anchor at x = 0")]
    UnpinnedStart,

    #[error("curve must end with an anchor at x = 1")]
    UnpinnedEnd,

    #[error("{count} handles between the anchors at points {from} and {to}; at most 2 are allowed")]
    HandleRun { from: usize, to: usize, count: usize },

    #[error("anchor at point {index} lies left of the previous anchor")]
    NonMonotonic { index: usize },

    #[error("point index {index} is out of range for a curve of {len} points")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("point {index} is not an interior anchor")]
    NotInteriorAnchor { index: usize },

    #[error("x = {x} does not fall strictly inside a segment")]
    NoSegmentAt { x: f32 },

    #[error("the editor supports at most {limit} anchors")]
    AnchorLimit { limit: usize },
}

// ── Points ───────────────────────────────────────────────────────

/// A single curve control point in normalized space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f32,
    pub y: f32,
    /// Present on anchors only. Tracks the anchor's domain position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f32>,
}

impl CurvePoint {
    /// An anchor at `(x, y)` whose percentage follows `x`.
    pub const fn anchor(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            percentage: Some(x),
        }
    }

    /// A tangent handle at `(x, y)`.
    pub const fn handle(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            percentage: None,
        }
    }

    pub fn is_anchor(&self) -> bool {
        self.percentage.is_some()
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Move the point. Anchors keep `percentage` in step with `x`.
    pub fn set_position(&mut self, position: Vec2) {
        self.x = position.x;
        self.y = position.y;
        if self.percentage.is_some() {
            self.percentage = Some(position.x);
        }
    }
}

/// Which side of its anchor a tangent handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TangentSide {
    Left,
    Right,
}

/// The role a point plays in the curve layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointRole {
    /// An anchor. `ordinal` is its position among anchors (0 = first).
    Anchor { ordinal: usize },
    /// A tangent handle owned by the anchor at point index `anchor`.
    Handle { anchor: usize, side: TangentSide },
}

/// Point indices of one anchor and its handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSlot {
    pub index: usize,
    pub left: Option<usize>,
    pub right: Option<usize>,
}

/// The four control points of one cubic segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

impl Segment {
    /// Horizontal extent of the segment's anchors.
    pub fn x_range(&self) -> (f32, f32) {
        (self.p0.x, self.p3.x)
    }
}

// ── Curve ────────────────────────────────────────────────────────

/// A validated piecewise cubic Bézier curve.
///
/// Serializes as the bare point array used under `bezierPoints`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CurvePoint>", into = "Vec<CurvePoint>")]
pub struct Curve {
    points: Vec<CurvePoint>,
}

impl Curve {
    /// Build a curve from a raw point list, checking every layout invariant.
    pub fn from_points(points: Vec<CurvePoint>) -> Result<Self, CurveError> {
        validate(&points)?;
        Ok(Self { points })
    }

    /// The two-anchor identity ramp `(0, 0) → (1, 1)`.
    pub fn linear() -> Self {
        Self {
            points: vec![CurvePoint::anchor(0.0, 0.0), CurvePoint::anchor(1.0, 1.0)],
        }
    }

    /// A flat curve holding `value` over the whole lifetime.
    pub fn constant(value: f32) -> Self {
        Self {
            points: vec![
                CurvePoint::anchor(0.0, value),
                CurvePoint::anchor(1.0, value),
            ],
        }
    }

    /// Build a curve through `keys` (`[x, y]` pairs sorted by x) with flat
    /// handles one third of the way toward each neighbouring key.
    pub fn from_keys(keys: &[[f32; 2]]) -> Result<Self, CurveError> {
        let mut points = Vec::with_capacity(keys.len() * 3);
        for (i, key) in keys.iter().enumerate() {
            let [x, y] = *key;
            if i > 0 {
                let prev_x = keys[i - 1][0];
                points.push(CurvePoint::handle(x - (x - prev_x) / 3.0, y));
            }
            points.push(CurvePoint::anchor(x, y));
            if let Some(next) = keys.get(i + 1) {
                points.push(CurvePoint::handle(x + (next[0] - x) / 3.0, y));
            }
        }
        pin_endpoints(&mut points);
        Self::from_points(points)
    }

    pub fn points(&self) -> &[CurvePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> Option<&CurvePoint> {
        self.points.get(index)
    }

    pub(crate) fn point_mut(&mut self, index: usize) -> Option<&mut CurvePoint> {
        self.points.get_mut(index)
    }

    /// Point indices of every anchor, in order.
    pub fn anchor_indices(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_anchor())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn anchor_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_anchor()).count()
    }

    pub fn first_anchor(&self) -> CurvePoint {
        self.points[0]
    }

    pub fn last_anchor(&self) -> CurvePoint {
        self.points[self.points.len() - 1]
    }

    /// Anchors with their handle indices.
    ///
    /// Between two anchors, a run of two handles is `(right, left)`. A run
    /// of one handle is taken as the right handle of the earlier anchor.
    pub fn anchor_slots(&self) -> Vec<AnchorSlot> {
        let anchors = self.anchor_indices();
        let mut slots: Vec<AnchorSlot> = anchors
            .iter()
            .map(|&index| AnchorSlot {
                index,
                left: None,
                right: None,
            })
            .collect();

        for i in 0..anchors.len().saturating_sub(1) {
            let (from, to) = (anchors[i], anchors[i + 1]);
            match to - from - 1 {
                0 => {}
                1 => slots[i].right = Some(from + 1),
                _ => {
                    slots[i].right = Some(from + 1);
                    slots[i + 1].left = Some(to - 1);
                }
            }
        }
        slots
    }

    /// Role of the point at `index`.
    pub fn role(&self, index: usize) -> Option<PointRole> {
        let slots = self.anchor_slots();
        for (ordinal, slot) in slots.iter().enumerate() {
            if slot.index == index {
                return Some(PointRole::Anchor { ordinal });
            }
            if slot.left == Some(index) {
                return Some(PointRole::Handle {
                    anchor: slot.index,
                    side: TangentSide::Left,
                });
            }
            if slot.right == Some(index) {
                return Some(PointRole::Handle {
                    anchor: slot.index,
                    side: TangentSide::Right,
                });
            }
        }
        None
    }

    /// The handle on the other side of the same anchor, if both exist.
    pub fn sibling_handle(&self, index: usize) -> Option<usize> {
        self.anchor_slots()
            .into_iter()
            .find_map(|slot| match (slot.left, slot.right) {
                (Some(left), Some(right)) if left == index => Some(right),
                (Some(left), Some(right)) if right == index => Some(left),
                _ => None,
            })
    }

    pub fn segment_count(&self) -> usize {
        self.anchor_count().saturating_sub(1)
    }

    /// Control points of every segment, in order.
    pub fn segments(&self) -> Vec<Segment> {
        let slots = self.anchor_slots();
        slots
            .windows(2)
            .map(|pair| {
                let p0 = self.points[pair[0].index].position();
                let p3 = self.points[pair[1].index].position();
                let chord = p3 - p0;
                let p1 = pair[0]
                    .right
                    .map(|i| self.points[i].position())
                    .unwrap_or(p0 + chord / 3.0);
                let p2 = pair[1]
                    .left
                    .map(|i| self.points[i].position())
                    .unwrap_or(p0 + chord * (2.0 / 3.0));
                Segment { p0, p1, p2, p3 }
            })
            .collect()
    }

    pub fn segment(&self, index: usize) -> Option<Segment> {
        self.segments().get(index).copied()
    }

    /// Give every segment two explicit handles.
    ///
    /// Missing handles are written at the positions evaluation already
    /// assumes for them, so the curve's shape does not change.
    pub fn with_explicit_handles(&self) -> Self {
        let slots = self.anchor_slots();
        let segments = self.segments();
        let mut points = Vec::with_capacity(slots.len() * 3);
        for (i, slot) in slots.iter().enumerate() {
            points.push(self.points[slot.index]);
            if let Some(segment) = segments.get(i) {
                points.push(CurvePoint::handle(segment.p1.x, segment.p1.y));
                points.push(CurvePoint::handle(segment.p2.x, segment.p2.y));
            }
        }
        Self { points }
    }

    /// Insert an anchor at `(x, y)` inside the segment that spans `x`.
    ///
    /// The new anchor gets flat handles one third of the way toward each
    /// neighbouring anchor. Returns the new anchor's point index.
    pub fn insert_anchor(&mut self, x: f32, y: f32) -> Result<usize, CurveError> {
        let explicit = self.with_explicit_handles();
        let slots = explicit.anchor_slots();
        let Some(pair) = slots.windows(2).find(|pair| {
            let (a, b) = (explicit.points[pair[0].index].x, explicit.points[pair[1].index].x);
            x > a && x < b
        }) else {
            return Err(CurveError::NoSegmentAt { x });
        };

        let prev_x = explicit.points[pair[0].index].x;
        let next_x = explicit.points[pair[1].index].x;
        // Explicit layout: [.., anchor, right, left, next, ..]. Insert between right and left.
        let at = pair[0].index + 2;
        let inserted = [
            CurvePoint::handle(x - (x - prev_x) / 3.0, y),
            CurvePoint::anchor(x, y),
            CurvePoint::handle(x + (next_x - x) / 3.0, y),
        ];
        let mut points = explicit.points;
        points.splice(at..at, inserted);
        validate(&points)?;
        self.points = points;
        Ok(at + 1)
    }

    /// Remove an interior anchor together with its handles.
    pub fn remove_anchor(&mut self, index: usize) -> Result<(), CurveError> {
        let slots = self.anchor_slots();
        let Some(ordinal) = slots.iter().position(|slot| slot.index == index) else {
            return Err(CurveError::NotInteriorAnchor { index });
        };
        if ordinal == 0 || ordinal == slots.len() - 1 {
            return Err(CurveError::NotInteriorAnchor { index });
        }

        let slot = slots[ordinal];
        let first = slot.left.unwrap_or(slot.index);
        let last = slot.right.unwrap_or(slot.index);
        let mut points = self.points.clone();
        points.drain(first..=last);
        validate(&points)?;
        self.points = points;
        Ok(())
    }
}

impl Default for Curve {
    fn default() -> Self {
        Self::linear()
    }
}

impl TryFrom<Vec<CurvePoint>> for Curve {
    type Error = CurveError;

    fn try_from(points: Vec<CurvePoint>) -> Result<Self, Self::Error> {
        Self::from_points(points)
    }
}

impl From<Curve> for Vec<CurvePoint> {
    fn from(curve: Curve) -> Self {
        curve.points
    }
}

/// Force the first/last anchor onto x = 0 and x = 1.
fn pin_endpoints(points: &mut [CurvePoint]) {
    if let Some(first) = points.first_mut() {
        first.x = 0.0;
        first.percentage = Some(0.0);
    }
    if let Some(last) = points.last_mut() {
        last.x = 1.0;
        last.percentage = Some(1.0);
    }
}

/// Check the layout invariants of a raw point list.
fn validate(points: &[CurvePoint]) -> Result<(), CurveError> {
    let anchors: Vec<usize> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_anchor())
        .map(|(i, _)| i)
        .collect();

    if anchors.len() < 2 {
        return Err(CurveError::TooFewAnchors {
            count: anchors.len(),
        });
    }

    let first = &points[0];
    if !first.is_anchor()
        || first.x.abs() > PIN_TOLERANCE
        || first.percentage.is_some_and(|p| p.abs() > PIN_TOLERANCE)
    {
        return Err(CurveError::UnpinnedStart);
    }
    let last = &points[points.len() - 1];
    if !last.is_anchor()
        || (last.x - 1.0).abs() > PIN_TOLERANCE
        || last.percentage.is_some_and(|p| (p - 1.0).abs() > PIN_TOLERANCE)
    {
        return Err(CurveError::UnpinnedEnd);
    }

    for pair in anchors.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let count = to - from - 1;
        if count > MAX_HANDLE_RUN {
            return Err(CurveError::HandleRun { from, to, count });
        }
        if points[to].x < points[from].x {
            return Err(CurveError::NonMonotonic { index: to });
        }
    }
    Ok(())
}
