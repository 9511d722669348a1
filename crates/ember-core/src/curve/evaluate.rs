//! Cubic Bézier curve evaluation and sampling.
//!
//! # Algorithm
//! For a domain position `x`, find the segment whose anchors span it, map
//! `x` linearly onto the segment parameter `t`, and evaluate the cubic
//! Bézier over the four control ordinates:
//! ```text
//! y(t) = (1−t)³·P0 + 3(1−t)²t·P1 + 3(1−t)t²·P2 + t³·P3
//! ```
//! `t` is not arc-length corrected against the handles' x-coordinates, so
//! curves with strongly skewed handles sample slightly non-uniformly in x.
//!
//! # Complexity
//! - Evaluate: O(N) segment scan + O(1) interpolation
//! - Bake: O(N × size)

use super::model::Curve;

/// Segments narrower than this evaluate at their start anchor.
const MIN_SEGMENT_WIDTH: f32 = 1e-10;

/// Evaluates a [`Curve`] at arbitrary domain positions.
///
/// Borrows the curve so live-preview sampling does not clone point lists.
pub struct CurveEvaluator<'a> {
    pub curve: &'a Curve,
}

impl CurveEvaluator<'_> {
    /// Evaluate the curve at domain position `x`.
    ///
    /// Positions before the first anchor or past the last anchor return
    /// that anchor's `y`. The result is clamped to [0..1]; consumers apply
    /// any curve-level scale afterwards.
    pub fn evaluate(&self, x: f32) -> f32 {
        let first = self.curve.first_anchor();
        if x <= first.x {
            return first.y.clamp(0.0, 1.0);
        }
        let last = self.curve.last_anchor();
        if x >= last.x {
            return last.y.clamp(0.0, 1.0);
        }

        for segment in self.curve.segments() {
            let (x0, x1) = segment.x_range();
            if x > x1 {
                continue;
            }
            let width = x1 - x0;
            let t = if width.abs() < MIN_SEGMENT_WIDTH {
                0.0
            } else {
                ((x - x0) / width).clamp(0.0, 1.0)
            };
            let y = cubic_bezier(segment.p0.y, segment.p1.y, segment.p2.y, segment.p3.y, t);
            return y.clamp(0.0, 1.0);
        }

        last.y.clamp(0.0, 1.0)
    }
}

/// Evaluate `curve` at `x`. Shorthand for [`CurveEvaluator::evaluate`].
pub fn evaluate(curve: &Curve, x: f32) -> f32 {
    CurveEvaluator { curve }.evaluate(x)
}

/// Cubic Bézier interpolation over four scalar control values.
pub fn cubic_bezier(p0: f32, p1: f32, p2: f32, p3: f32, t: f32) -> f32 {
    let u = 1.0 - t;
    u * u * u * p0 + 3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t * p3
}

/// Sample `curve` at `size` evenly spaced positions across [0..1],
/// including both endpoints.
pub fn bake_curve(curve: &Curve, size: usize) -> Vec<f32> {
    let evaluator = CurveEvaluator { curve };
    (0..size)
        .map(|i| {
            let x = i as f32 / (size - 1).max(1) as f32;
            evaluator.evaluate(x)
        })
        .collect()
}
