//! Named preset curves for the curve editor's "apply preset" menu.
//!
//! Every preset is a three-anchor curve in normalized space, matching the
//! anchor count the editor exposes.

use super::model::{Curve, CurvePoint};

const SIXTH: f32 = 1.0 / 6.0;
const THIRD: f32 = 1.0 / 3.0;
const TWO_THIRDS: f32 = 2.0 / 3.0;
const FIVE_SIXTHS: f32 = 5.0 / 6.0;

/// Built-in lifetime curve shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurvePreset {
    Linear,
    LinearDown,
    Constant,
    EaseIn,
    EaseOut,
    EaseInOut,
    FadeInOut,
    StepUp,
    StepDown,
    Pulse,
}

impl CurvePreset {
    /// Human-readable label for preset menus.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Linear => "Linear",
            Self::LinearDown => "Linear (down)",
            Self::Constant => "Constant",
            Self::EaseIn => "Ease in",
            Self::EaseOut => "Ease out",
            Self::EaseInOut => "Ease in-out",
            Self::FadeInOut => "Fade in-out",
            Self::StepUp => "Step up",
            Self::StepDown => "Step down",
            Self::Pulse => "Pulse",
        }
    }

    pub fn all() -> &'static [Self] {
        const ALL: [CurvePreset; 10] = [
            CurvePreset::Linear,
            CurvePreset::LinearDown,
            CurvePreset::Constant,
            CurvePreset::EaseIn,
            CurvePreset::EaseOut,
            CurvePreset::EaseInOut,
            CurvePreset::FadeInOut,
            CurvePreset::StepUp,
            CurvePreset::StepDown,
            CurvePreset::Pulse,
        ];
        &ALL
    }

    /// Look a preset up by its label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.label() == label)
    }

    /// The preset's control points as a curve.
    pub fn curve(&self) -> Curve {
        let points = match self {
            Self::Linear => three_anchors(
                [0.0, 0.5, 1.0],
                [
                    (SIXTH, SIXTH),
                    (THIRD, THIRD),
                    (TWO_THIRDS, TWO_THIRDS),
                    (FIVE_SIXTHS, FIVE_SIXTHS),
                ],
            ),
            Self::LinearDown => three_anchors(
                [1.0, 0.5, 0.0],
                [
                    (SIXTH, FIVE_SIXTHS),
                    (THIRD, TWO_THIRDS),
                    (TWO_THIRDS, THIRD),
                    (FIVE_SIXTHS, SIXTH),
                ],
            ),
            Self::Constant => three_anchors(
                [1.0, 1.0, 1.0],
                [(SIXTH, 1.0), (THIRD, 1.0), (TWO_THIRDS, 1.0), (FIVE_SIXTHS, 1.0)],
            ),
            Self::EaseIn => three_anchors(
                [0.0, 0.25, 1.0],
                [(0.25, 0.0), (0.35, 0.1), (0.65, 0.4), (0.85, 0.7)],
            ),
            Self::EaseOut => three_anchors(
                [0.0, 0.75, 1.0],
                [(0.15, 0.3), (0.35, 0.6), (0.65, 0.9), (0.75, 1.0)],
            ),
            Self::EaseInOut => three_anchors(
                [0.0, 0.5, 1.0],
                [(0.25, 0.0), (0.4, 0.35), (0.6, 0.65), (0.75, 1.0)],
            ),
            Self::FadeInOut => three_anchors(
                [0.0, 1.0, 0.0],
                [(0.15, 0.8), (0.3, 1.0), (0.7, 1.0), (0.85, 0.8)],
            ),
            Self::StepUp => three_anchors(
                [0.0, 1.0, 1.0],
                [(SIXTH, 0.0), (THIRD, 0.0), (TWO_THIRDS, 1.0), (FIVE_SIXTHS, 1.0)],
            ),
            Self::StepDown => three_anchors(
                [1.0, 0.0, 0.0],
                [(SIXTH, 1.0), (THIRD, 1.0), (TWO_THIRDS, 0.0), (FIVE_SIXTHS, 0.0)],
            ),
            Self::Pulse => three_anchors(
                [0.0, 1.0, 0.0],
                [(SIXTH, 0.0), (THIRD, 1.0), (TWO_THIRDS, 1.0), (FIVE_SIXTHS, 0.0)],
            ),
        };
        Curve::from_points(points).unwrap_or_default()
    }
}

/// Anchors at x = 0, 0.5, 1 with the given ordinates, plus four handles
/// `(right0, left1, right1, left2)`.
fn three_anchors(ys: [f32; 3], handles: [(f32, f32); 4]) -> Vec<CurvePoint> {
    vec![
        CurvePoint::anchor(0.0, ys[0]),
        CurvePoint::handle(handles[0].0, handles[0].1),
        CurvePoint::handle(handles[1].0, handles[1].1),
        CurvePoint::anchor(0.5, ys[1]),
        CurvePoint::handle(handles[2].0, handles[2].1),
        CurvePoint::handle(handles[3].0, handles[3].1),
        CurvePoint::anchor(1.0, ys[2]),
    ]
}
