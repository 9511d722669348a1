//! Per-field shapes of configuration documents.
//!
//! [`FieldShape`] classifies a raw JSON value once so detection and
//! migration share one vocabulary instead of sniffing keys at every use site.
//! [`RangeValue`], [`CurveField`], and [`RotationRange`] are the typed
//! current-schema forms.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::curve::lifetime::LifetimeCurve;

/// Structural classification of one document field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldShape<'a> {
    /// A plain number.
    Constant(f64),
    /// `{min, max}` with both bounds numeric.
    Range { min: f64, max: f64, extra_keys: bool },
    /// `{min}` or `{max}` alone.
    PartialRange { min: Option<f64>, max: Option<f64> },
    /// Legacy curve: `bezierPoints` directly on the field.
    LegacyCurve {
        is_active: Option<bool>,
        points: &'a Value,
    },
    /// Current curve: `lifetimeCurve` wrapper present.
    WrappedCurve {
        is_active: Option<bool>,
        curve: &'a Value,
    },
    /// `{isActive, min?, max?}` without any curve keys.
    ActiveRange {
        is_active: Option<bool>,
        min: Option<f64>,
        max: Option<f64>,
    },
    /// Anything else: strings, arrays, unrelated objects, null.
    Other,
}

impl<'a> FieldShape<'a> {
    pub fn classify(value: &'a Value) -> Self {
        let object = match value {
            Value::Number(n) => return n.as_f64().map_or(Self::Other, Self::Constant),
            Value::Object(object) => object,
            _ => return Self::Other,
        };

        let is_active = object.get("isActive").and_then(Value::as_bool);
        if let Some(curve) = object.get("lifetimeCurve") {
            return Self::WrappedCurve { is_active, curve };
        }
        if let Some(points) = object.get("bezierPoints") {
            return Self::LegacyCurve { is_active, points };
        }

        let min = object.get("min").and_then(Value::as_f64);
        let max = object.get("max").and_then(Value::as_f64);
        if object.contains_key("isActive") {
            return Self::ActiveRange {
                is_active,
                min,
                max,
            };
        }
        match (min, max) {
            (Some(min), Some(max)) => Self::Range {
                min,
                max,
                extra_keys: object.len() > 2,
            },
            (None, None) => Self::Other,
            (min, max) => Self::PartialRange { min, max },
        }
    }

    /// A complete `{min, max}` object with no other keys.
    pub fn is_clean_range(&self) -> bool {
        matches!(
            self,
            Self::Range {
                extra_keys: false,
                ..
            }
        )
    }

    /// Whether this shape only appears in legacy documents.
    pub fn is_legacy_only(&self) -> bool {
        matches!(self, Self::LegacyCurve { .. } | Self::PartialRange { .. })
    }
}

// ── Typed current-schema values ──────────────────────────────────

/// A scalar setting: one value, or a uniform random pick between two.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeValue {
    Constant(f64),
    RandomBetweenTwoConstants { min: f64, max: f64 },
}

impl RangeValue {
    /// Parse a current-schema value. Partial ranges are not accepted here;
    /// migrate the document first.
    pub fn from_json(value: &Value) -> Option<Self> {
        match FieldShape::classify(value) {
            FieldShape::Constant(v) => Some(Self::Constant(v)),
            FieldShape::Range { min, max, .. } => {
                Some(Self::RandomBetweenTwoConstants { min, max })
            }
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match *self {
            Self::Constant(v) => json!(v),
            Self::RandomBetweenTwoConstants { min, max } => json!({ "min": min, "max": max }),
        }
    }

    /// Equal bounds become a Constant.
    pub fn collapsed(self) -> Self {
        match self {
            Self::RandomBetweenTwoConstants { min, max } if min == max => Self::Constant(min),
            other => other,
        }
    }

    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            Self::Constant(v) => (v, v),
            Self::RandomBetweenTwoConstants { min, max } => (min, max),
        }
    }
}

/// A current-schema lifetime curve module such as `sizeOverLifetime`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveField {
    #[serde(default)]
    pub is_active: bool,
    pub lifetime_curve: LifetimeCurve,
    /// Keys this editor does not model, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CurveField {
    pub fn new(is_active: bool, lifetime_curve: LifetimeCurve) -> Self {
        Self {
            is_active,
            lifetime_curve,
            extra: Map::new(),
        }
    }
}

/// The `rotationOverLifetime` module.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RotationRange {
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: f64,
}
