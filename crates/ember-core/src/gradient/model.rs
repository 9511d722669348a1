//! Artist-facing color/opacity gradients.
//!
//! Stops carry an RGBA color in the 0..255 range at a normalized lifetime
//! position. A gradient always has at least two stops, sorted by position,
//! with the first pinned at 0 and the last at 1.

use serde::{Deserialize, Serialize};

/// Maximum channel value.
pub const CHANNEL_MAX: f32 = 255.0;

// ── Errors ───────────────────────────────────────────────────────

/// Errors raised by gradient construction, editing, and conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradientError {
    #[error("gradient needs at least 2 stops, got {count}")]
    TooFewStops { count: usize },

    #[error("stop index {index} is out of range for {len} stops")]
    StopIndexOutOfRange { index: usize, len: usize },

    #[error("stop {index} is pinned to the gradient's end")]
    PinnedStop { index: usize },

    #[error("gradient channel produced an invalid curve: {0}")]
    Curve(#[from] crate::curve::model::CurveError),
}

// ── Colors ───────────────────────────────────────────────────────

/// Color channel selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    R,
    G,
    B,
    A,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::R, Channel::G, Channel::B, Channel::A];

    pub const fn label(self) -> &'static str {
        match self {
            Self::R => "r",
            Self::G => "g",
            Self::B => "b",
            Self::A => "a",
        }
    }
}

/// RGBA color with channels in 0..255.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl StopColor {
    pub const WHITE: Self = Self::new(255.0, 255.0, 255.0, 255.0);
    pub const TRANSPARENT_WHITE: Self = Self::new(255.0, 255.0, 255.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn channel(&self, channel: Channel) -> f32 {
        match channel {
            Channel::R => self.r,
            Channel::G => self.g,
            Channel::B => self.b,
            Channel::A => self.a,
        }
    }

    pub fn set_channel(&mut self, channel: Channel, value: f32) {
        let slot = match channel {
            Channel::R => &mut self.r,
            Channel::G => &mut self.g,
            Channel::B => &mut self.b,
            Channel::A => &mut self.a,
        };
        *slot = value;
    }

    /// Every channel clamped to 0..255.
    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, CHANNEL_MAX),
            self.g.clamp(0.0, CHANNEL_MAX),
            self.b.clamp(0.0, CHANNEL_MAX),
            self.a.clamp(0.0, CHANNEL_MAX),
        )
    }

    /// Linear interpolation between two colors.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

/// A single color stop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Normalized lifetime position (0..1).
    pub position: f32,
    pub color: StopColor,
}

impl GradientStop {
    pub const fn new(position: f32, color: StopColor) -> Self {
        Self { position, color }
    }
}

// ── Gradient ─────────────────────────────────────────────────────

/// An ordered list of at least two color stops spanning [0..1].
///
/// Serializes as the bare stop array stored under
/// `_editorData.gradientStops`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GradientStop>", into = "Vec<GradientStop>")]
pub struct GradientModel {
    stops: Vec<GradientStop>,
}

impl GradientModel {
    /// Build a gradient. Stops are sorted, colors clamped, and the outer
    /// stops pinned to 0 and 1.
    pub fn new(mut stops: Vec<GradientStop>) -> Result<Self, GradientError> {
        if stops.len() < 2 {
            return Err(GradientError::TooFewStops { count: stops.len() });
        }
        sort_stops(&mut stops);
        for stop in &mut stops {
            stop.position = stop.position.clamp(0.0, 1.0);
            stop.color = stop.color.clamped();
        }
        let last = stops.len() - 1;
        stops[0].position = 0.0;
        stops[last].position = 1.0;
        Ok(Self { stops })
    }

    /// Opaque white fading to transparent white.
    pub fn white_to_transparent() -> Self {
        Self {
            stops: vec![
                GradientStop::new(0.0, StopColor::WHITE),
                GradientStop::new(1.0, StopColor::TRANSPARENT_WHITE),
            ],
        }
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub(crate) fn stops_mut(&mut self) -> &mut Vec<GradientStop> {
        &mut self.stops
    }

    /// Color at `position`, linearly interpolated between the bracketing
    /// stops.
    pub fn sample(&self, position: f32) -> StopColor {
        let t = position.clamp(0.0, 1.0);
        let first = &self.stops[0];
        if t <= first.position {
            return first.color;
        }
        let last = &self.stops[self.stops.len() - 1];
        if t >= last.position {
            return last.color;
        }

        for pair in self.stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if t >= a.position && t <= b.position {
                let span = b.position - a.position;
                if span.abs() < 1e-6 {
                    return a.color;
                }
                return a.color.lerp(b.color, (t - a.position) / span);
            }
        }

        last.color
    }

    /// Evenly spaced colors across [0..1] for the gradient preview strip.
    pub fn preview(&self, width: usize) -> Vec<StopColor> {
        (0..width)
            .map(|i| self.sample(i as f32 / (width - 1).max(1) as f32))
            .collect()
    }
}

impl Default for GradientModel {
    fn default() -> Self {
        Self::white_to_transparent()
    }
}

impl TryFrom<Vec<GradientStop>> for GradientModel {
    type Error = GradientError;

    fn try_from(stops: Vec<GradientStop>) -> Result<Self, Self::Error> {
        Self::new(stops)
    }
}

impl From<GradientModel> for Vec<GradientStop> {
    fn from(gradient: GradientModel) -> Self {
        gradient.stops
    }
}

/// Stable sort by position.
pub(crate) fn sort_stops(stops: &mut [GradientStop]) {
    stops.sort_by(|a, b| a.position.total_cmp(&b.position));
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn test_requires_two_stops() {
        let result = GradientModel::new(vec![GradientStop::new(0.0, StopColor::WHITE)]);
        assert_eq!(result, Err(GradientError::TooFewStops { count: 1 }));
    }

    #[test]
    fn test_sorts_and_pins_ends() {
        let gradient = GradientModel::new(vec![
            GradientStop::new(0.9, StopColor::new(0.0, 0.0, 255.0, 255.0)),
            GradientStop::new(0.4, StopColor::new(0.0, 255.0, 0.0, 255.0)),
            GradientStop::new(0.1, StopColor::new(255.0, 0.0, 0.0, 255.0)),
        ])
        .expect("valid");
        let positions: Vec<f32> = gradient.stops().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0.0, 0.4, 1.0]);
        assert_eq!(gradient.stops()[0].color.r, 255.0);
    }

    #[test]
    fn test_clamps_channels() {
        let gradient = GradientModel::new(vec![
            GradientStop::new(0.0, StopColor::new(300.0, -5.0, 10.0, 255.0)),
            GradientStop::new(1.0, StopColor::WHITE),
        ])
        .expect("valid");
        assert_eq!(gradient.stops()[0].color, StopColor::new(255.0, 0.0, 10.0, 255.0));
    }

    #[test]
    fn test_sample_interpolates_linearly() {
        let gradient = GradientModel::white_to_transparent();
        let mid = gradient.sample(0.5);
        assert!((mid.a - 127.5).abs() < EPSILON);
        assert!((mid.r - 255.0).abs() < EPSILON);
        assert_eq!(gradient.sample(-1.0), StopColor::WHITE);
        assert_eq!(gradient.sample(2.0), StopColor::TRANSPARENT_WHITE);
    }

    #[test]
    fn test_preview_spans_both_ends() {
        let strip = GradientModel::white_to_transparent().preview(3);
        assert_eq!(strip.len(), 3);
        assert_eq!(strip[0].a, 255.0);
        assert_eq!(strip[2].a, 0.0);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = serde_json::json!([
            {"position": 0.0, "color": {"r": 255, "g": 0, "b": 0, "a": 255}}
        ]);
        assert!(serde_json::from_value::<GradientModel>(json).is_err());
    }
}
