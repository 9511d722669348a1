//! Schema version detection.
//!
//! Documents rarely say which schema they use, so detection is a priority
//! list of heuristics. Each rule either decides (`Some(is_current)`) or
//! abstains (`None`); the first rule that decides wins. When signals
//! conflict or are missing the verdict leans legacy, because migrating a
//! partially current document is harmless while skipping a needed migration
//! is not.
//!
//! Rule order:
//! 1. `explicit_version`: `editorVersion` with major ≥ 2 → current.
//! 2. `direct_bezier_points`: a lifetime module with top-level
//!    `bezierPoints` → legacy.
//! 3. `flat_rotation_range`: `rotationOverLifetime` with `min` and `max`
//!    but no `lifetimeCurve` → legacy.
//! 4. `mixed_signatures`: legacy-only partial shapes alongside current
//!    shapes → legacy.
//! 5. `current_shapes`: a `lifetimeCurve` on size/opacity, a `{min, max}`
//!    start frame, or a `{min, max}` linear velocity axis → current.
//! 6. `clean_ranges`: range fields that are all clean `{min, max}` objects →
//!    current; any range object with legacy keys → legacy.
//! 7. `default_fingerprint`: the current default lifetime with a zeroed
//!    linear velocity → current; otherwise legacy.

use serde_json::{Map, Value};

use super::field::FieldShape;
use super::{
    AXES, CANONICAL_RANGE_FIELDS, CURVE_FIELDS, DEFAULT_LIFETIME, EDITOR_DATA, LIFETIME_SUFFIX,
    LINEAR, ORBITAL, RANGE_FIELDS, ROTATION_OVER_LIFETIME, START_FRAME, START_LIFETIME,
    TEXTURE_SHEET_ANIMATION, VELOCITY_OVER_LIFETIME,
};

type Document = Map<String, Value>;

/// A named detection heuristic.
#[derive(Debug, Clone, Copy)]
pub struct DetectionRule {
    pub name: &'static str,
    pub check: fn(&Document) -> Option<bool>,
}

/// Detection rules in priority order.
pub const RULES: [DetectionRule; 7] = [
    DetectionRule {
        name: "explicit_version",
        check: explicit_version,
    },
    DetectionRule {
        name: "direct_bezier_points",
        check: direct_bezier_points,
    },
    DetectionRule {
        name: "flat_rotation_range",
        check: flat_rotation_range,
    },
    DetectionRule {
        name: "mixed_signatures",
        check: mixed_signatures,
    },
    DetectionRule {
        name: "current_shapes",
        check: current_shapes,
    },
    DetectionRule {
        name: "clean_ranges",
        check: clean_ranges,
    },
    DetectionRule {
        name: "default_fingerprint",
        check: default_fingerprint,
    },
];

/// Outcome of schema detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub is_current: bool,
    /// The rule that decided, or `None` when every rule abstained.
    pub decided_by: Option<&'static str>,
}

/// Classify a document. Non-object documents are legacy.
pub fn detect_schema(document: &Value) -> Detection {
    let Some(document) = document.as_object() else {
        return Detection {
            is_current: false,
            decided_by: None,
        };
    };

    for rule in &RULES {
        if let Some(is_current) = (rule.check)(document) {
            tracing::debug!(
                "schema detection: rule '{}' decided {}",
                rule.name,
                if is_current { "current" } else { "legacy" }
            );
            return Detection {
                is_current,
                decided_by: Some(rule.name),
            };
        }
    }

    tracing::debug!("schema detection: no rule decided, assuming legacy");
    Detection {
        is_current: false,
        decided_by: None,
    }
}

/// Whether `document` already uses the current schema.
pub fn is_current_schema(document: &Value) -> bool {
    detect_schema(document).is_current
}

// ── Helpers ──────────────────────────────────────────────────────

fn nested<'a>(document: &'a Document, path: &[&str]) -> Option<&'a Value> {
    let (first, rest) = path.split_first()?;
    let mut value = document.get(*first)?;
    for key in rest {
        value = value.as_object()?.get(*key)?;
    }
    Some(value)
}

fn lifetime_modules(document: &Document) -> impl Iterator<Item = (&String, &Map<String, Value>)> {
    document
        .iter()
        .filter(|(key, _)| key.ends_with(LIFETIME_SUFFIX))
        .filter_map(|(key, value)| value.as_object().map(|object| (key, object)))
}

fn velocity_axes<'a>(document: &'a Document, group: &str) -> Vec<FieldShape<'a>> {
    AXES.iter()
        .filter_map(|axis| nested(document, &[VELOCITY_OVER_LIFETIME, group, *axis]))
        .map(FieldShape::classify)
        .collect()
}

/// Leading integer of a version string or number.
fn major_version(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_f64().map(|v| v.max(0.0) as u64),
        Value::String(s) => s.trim_start_matches('v').split('.').next()?.trim().parse().ok(),
        _ => None,
    }
}

// ── Rules ────────────────────────────────────────────────────────

fn explicit_version(document: &Document) -> Option<bool> {
    let tag = nested(document, &[EDITOR_DATA, "editorVersion"])
        .or_else(|| document.get("editorVersion"))?;
    match major_version(tag) {
        Some(major) if major >= 2 => Some(true),
        _ => None,
    }
}

fn direct_bezier_points(document: &Document) -> Option<bool> {
    lifetime_modules(document)
        .any(|(_, module)| module.contains_key("bezierPoints"))
        .then_some(false)
}

fn flat_rotation_range(document: &Document) -> Option<bool> {
    let rotation = document.get(ROTATION_OVER_LIFETIME)?.as_object()?;
    let flat = rotation.contains_key("min")
        && rotation.contains_key("max")
        && !rotation.contains_key("lifetimeCurve");
    flat.then_some(false)
}

fn mixed_signatures(document: &Document) -> Option<bool> {
    let mut legacy = Vec::new();
    let mut current = Vec::new();

    for field in RANGE_FIELDS.iter().chain(std::iter::once(&START_LIFETIME)) {
        if let Some(value) = document.get(*field) {
            match FieldShape::classify(value) {
                FieldShape::PartialRange { .. } => legacy.push(*field),
                FieldShape::Range { .. } => current.push(*field),
                _ => {}
            }
        }
    }

    for field in CURVE_FIELDS {
        match document.get(field).map(FieldShape::classify) {
            Some(FieldShape::WrappedCurve { .. }) => current.push(field),
            Some(FieldShape::ActiveRange { .. }) => legacy.push(field),
            _ => {}
        }
    }

    match nested(document, &[TEXTURE_SHEET_ANIMATION, START_FRAME]).map(FieldShape::classify) {
        Some(FieldShape::PartialRange { .. }) => legacy.push(START_FRAME),
        Some(FieldShape::Range { .. }) => current.push(START_FRAME),
        _ => {}
    }

    if velocity_axes(document, ORBITAL)
        .iter()
        .any(|shape| matches!(shape, FieldShape::PartialRange { .. }))
    {
        legacy.push(ORBITAL);
    }
    if velocity_axes(document, LINEAR)
        .iter()
        .any(|shape| matches!(shape, FieldShape::Range { .. }))
    {
        current.push(LINEAR);
    }

    if legacy.is_empty() || current.is_empty() {
        return None;
    }
    tracing::debug!("mixed schema signatures: legacy {legacy:?}, current {current:?}");
    Some(false)
}

fn current_shapes(document: &Document) -> Option<bool> {
    let wrapped_curve = CURVE_FIELDS.iter().any(|field| {
        matches!(
            document.get(*field).map(FieldShape::classify),
            Some(FieldShape::WrappedCurve { .. })
        )
    });
    let ranged_start_frame = matches!(
        nested(document, &[TEXTURE_SHEET_ANIMATION, START_FRAME]).map(FieldShape::classify),
        Some(FieldShape::Range { .. })
    );
    let ranged_linear_velocity = velocity_axes(document, LINEAR)
        .iter()
        .any(|shape| matches!(shape, FieldShape::Range { .. }));

    (wrapped_curve || ranged_start_frame || ranged_linear_velocity).then_some(true)
}

fn clean_ranges(document: &Document) -> Option<bool> {
    let objects: Vec<FieldShape> = CANONICAL_RANGE_FIELDS
        .iter()
        .filter_map(|field| document.get(*field))
        .filter(|value| value.is_object())
        .map(FieldShape::classify)
        .collect();

    if objects.is_empty() {
        return None;
    }
    Some(objects.iter().all(FieldShape::is_clean_range))
}

fn default_fingerprint(document: &Document) -> Option<bool> {
    let default_lifetime = match document.get(START_LIFETIME).map(FieldShape::classify) {
        Some(FieldShape::Constant(v)) => v == DEFAULT_LIFETIME,
        Some(FieldShape::Range { min, max, .. }) => {
            min == DEFAULT_LIFETIME && max == DEFAULT_LIFETIME
        }
        _ => false,
    };

    let has_linear = nested(document, &[VELOCITY_OVER_LIFETIME, LINEAR]).is_some();
    let zero_linear = has_linear
        && velocity_axes(document, LINEAR).iter().all(|shape| match *shape {
            FieldShape::Constant(v) => v == 0.0,
            FieldShape::Range { min, max, .. } => min == 0.0 && max == 0.0,
            _ => false,
        });

    Some(default_lifetime && zero_linear)
}
