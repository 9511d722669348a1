//! The current-schema lifetime curve envelope.
//!
//! Documents wrap curve points as
//! `{ "type": "BEZIER", "bezierPoints": [...], "scale"?: number }`.

use serde::{Deserialize, Serialize};

use super::evaluate::CurveEvaluator;
use super::model::Curve;

/// Curve interpolation family. Only Bézier curves exist today.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CurveType {
    #[default]
    Bezier,
}

/// A lifetime curve as stored in a current-schema document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifetimeCurve {
    #[serde(rename = "type", default)]
    pub curve_type: CurveType,
    pub bezier_points: Curve,
    /// Multiplier applied to the unit-range curve value by consumers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,
}

impl LifetimeCurve {
    pub fn new(curve: Curve) -> Self {
        Self {
            curve_type: CurveType::Bezier,
            bezier_points: curve,
            scale: None,
        }
    }

    /// A unit-scaled curve, as produced from gradient channels.
    pub fn unit(curve: Curve) -> Self {
        Self {
            scale: Some(1.0),
            ..Self::new(curve)
        }
    }

    /// Curve value at `age` (0..1) with the scale applied.
    pub fn value_at(&self, age: f32) -> f32 {
        let unit = CurveEvaluator {
            curve: &self.bezier_points,
        }
        .evaluate(age);
        unit * self.scale.unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_current_schema_shape() {
        let value = serde_json::to_value(LifetimeCurve::new(Curve::linear())).expect("serialize");
        assert_eq!(
            value,
            json!({
                "type": "BEZIER",
                "bezierPoints": [
                    {"x": 0.0, "y": 0.0, "percentage": 0.0},
                    {"x": 1.0, "y": 1.0, "percentage": 1.0}
                ]
            })
        );
    }

    #[test]
    fn test_scale_multiplies_value() {
        let curve = LifetimeCurve {
            scale: Some(4.0),
            ..LifetimeCurve::new(Curve::linear())
        };
        assert!((curve.value_at(0.5) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_missing_type_defaults_to_bezier() {
        let curve: LifetimeCurve = serde_json::from_value(json!({
            "bezierPoints": [
                {"x": 0, "y": 1, "percentage": 0},
                {"x": 1, "y": 0, "percentage": 1}
            ]
        }))
        .expect("deserialize");
        assert_eq!(curve.curve_type, CurveType::Bezier);
        assert_eq!(curve.scale, None);
    }
}
