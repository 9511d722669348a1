//! Canvas projection of a curve for the editor view.
//!
//! The scene is a plain display list in canvas pixels (y down). It is
//! rebuilt from the model after every edit and never read back.

use glam::Vec2;

use super::model::{Curve, PointRole};

/// Canvas geometry of the curve plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Canvas width in pixels.
    pub width: f32,
    /// Canvas height in pixels.
    pub height: f32,
    /// Inset between the canvas edge and the [0..1] domain rectangle.
    pub padding: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 240.0,
            height: 160.0,
            padding: 10.0,
        }
    }
}

impl Viewport {
    fn inner_size(&self) -> Vec2 {
        Vec2::new(
            (self.width - 2.0 * self.padding).max(1.0),
            (self.height - 2.0 * self.padding).max(1.0),
        )
    }

    /// Map a normalized curve position to canvas pixels.
    pub fn to_canvas(&self, normalized: Vec2) -> Vec2 {
        let size = self.inner_size();
        // Curve y is bottom-up; canvas y is top-down.
        Vec2::new(
            self.padding + normalized.x * size.x,
            self.padding + (1.0 - normalized.y) * size.y,
        )
    }

    /// Map canvas pixels back to normalized curve space. Not clamped.
    pub fn to_normalized(&self, canvas: Vec2) -> Vec2 {
        let size = self.inner_size();
        Vec2::new(
            (canvas.x - self.padding) / size.x,
            1.0 - (canvas.y - self.padding) / size.y,
        )
    }
}

/// A straight line in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub from: Vec2,
    pub to: Vec2,
}

/// One cubic segment stroke in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierStroke {
    pub p0: Vec2,
    pub p1: Vec2,
    pub p2: Vec2,
    pub p3: Vec2,
}

impl BezierStroke {
    /// Point on the stroke at parameter `t`.
    pub fn point_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        self.p0 * (u * u * u)
            + self.p1 * (3.0 * u * u * t)
            + self.p2 * (3.0 * u * t * t)
            + self.p3 * (t * t * t)
    }

    /// Flatten the stroke into `samples + 1` points for backends without
    /// native cubic paths.
    pub fn flatten(&self, samples: usize) -> Vec<Vec2> {
        let samples = samples.max(1);
        (0..=samples)
            .map(|i| self.point_at(i as f32 / samples as f32))
            .collect()
    }
}

/// Kind of draggable marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Anchor,
    Handle,
}

/// A draggable point marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMarker {
    /// Index into the curve's point list.
    pub index: usize,
    pub position: Vec2,
    pub kind: MarkerKind,
    pub selected: bool,
}

/// Everything the curve plot draws, back to front.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveScene {
    pub grid: Vec<LineSegment>,
    pub guides: Vec<LineSegment>,
    pub strokes: Vec<BezierStroke>,
    pub markers: Vec<PointMarker>,
}

/// Project `curve` into a display list.
///
/// `grid_divisions` splits the domain rectangle into a uniform grid (4 draws
/// lines at every 25%). `selection` highlights one point marker.
pub fn render_curve(
    curve: &Curve,
    viewport: &Viewport,
    grid_divisions: u32,
    selection: Option<usize>,
) -> CurveScene {
    let mut scene = CurveScene::default();

    let divisions = grid_divisions.max(1);
    for step in 0..=divisions {
        let f = step as f32 / divisions as f32;
        scene.grid.push(LineSegment {
            from: viewport.to_canvas(Vec2::new(f, 0.0)),
            to: viewport.to_canvas(Vec2::new(f, 1.0)),
        });
        scene.grid.push(LineSegment {
            from: viewport.to_canvas(Vec2::new(0.0, f)),
            to: viewport.to_canvas(Vec2::new(1.0, f)),
        });
    }

    for slot in curve.anchor_slots() {
        let anchor = viewport.to_canvas(curve.points()[slot.index].position());
        for handle in [slot.left, slot.right].into_iter().flatten() {
            scene.guides.push(LineSegment {
                from: anchor,
                to: viewport.to_canvas(curve.points()[handle].position()),
            });
        }
    }

    for segment in curve.segments() {
        scene.strokes.push(BezierStroke {
            p0: viewport.to_canvas(segment.p0),
            p1: viewport.to_canvas(segment.p1),
            p2: viewport.to_canvas(segment.p2),
            p3: viewport.to_canvas(segment.p3),
        });
    }

    for (index, point) in curve.points().iter().enumerate() {
        let kind = match curve.role(index) {
            Some(PointRole::Anchor { .. }) => MarkerKind::Anchor,
            _ => MarkerKind::Handle,
        };
        scene.markers.push(PointMarker {
            index,
            position: viewport.to_canvas(point.position()),
            kind,
            selected: selection == Some(index),
        });
    }

    scene
}
