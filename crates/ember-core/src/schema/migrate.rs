//! Legacy → current document migration.
//!
//! A field-at-a-time rewrite. Recognized fields are reshaped into their
//! current form; every other key is copied through verbatim. Malformed
//! optional values are defaulted, never reported, so migration cannot fail.
//! Fields already in current form are left untouched, which makes the
//! rewrite idempotent over everything it recognizes.

use serde_json::{Map, Value, json};

use super::field::FieldShape;
use super::{
    AXES, CURVE_FIELDS, DEFAULT_LIFETIME, LEGACY_DEFAULT_LIFETIME, LINEAR, ORBITAL,
    RANGE_FIELDS, ROTATION_OVER_LIFETIME, START_FRAME, START_LIFETIME, TEXTURE_SHEET_ANIMATION,
    VELOCITY_OVER_LIFETIME,
};
use crate::curve::lifetime::LifetimeCurve;

/// A migrated document and the paths of the fields that were rewritten.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub document: Value,
    pub rewritten: Vec<String>,
}

impl Migration {
    pub fn changed(&self) -> bool {
        !self.rewritten.is_empty()
    }
}

/// Rewrite `document` into the current schema.
pub fn migrate(document: &Value) -> Value {
    migrate_with_report(document).document
}

/// Like [`migrate`], also listing which fields were rewritten.
pub fn migrate_with_report(document: &Value) -> Migration {
    let Some(source) = document.as_object() else {
        return Migration {
            document: document.clone(),
            rewritten: Vec::new(),
        };
    };

    let mut out = source.clone();
    let mut rewritten = Vec::new();
    let mut record = |path: String, out: &mut Map<String, Value>, key: &str, value: Value| {
        tracing::debug!("migrated field {path}");
        out.insert(key.to_string(), value);
        rewritten.push(path);
    };

    for field in RANGE_FIELDS {
        if let Some(value) = source.get(field).and_then(migrate_range) {
            record(field.to_string(), &mut out, field, value);
        }
    }

    if let Some(value) = source.get(START_LIFETIME).and_then(migrate_lifetime) {
        record(START_LIFETIME.to_string(), &mut out, START_LIFETIME, value);
    }

    for field in CURVE_FIELDS {
        if let Some(value) = source.get(field).and_then(migrate_curve_field) {
            record(field.to_string(), &mut out, field, value);
        }
    }

    if let Some(value) = source.get(ROTATION_OVER_LIFETIME).and_then(migrate_rotation) {
        record(
            ROTATION_OVER_LIFETIME.to_string(),
            &mut out,
            ROTATION_OVER_LIFETIME,
            value,
        );
    }

    let start_frame = source
        .get(TEXTURE_SHEET_ANIMATION)
        .and_then(Value::as_object)
        .and_then(|animation| Some((animation, migrate_start_frame(animation.get(START_FRAME)?)?)));
    if let Some((animation, frame)) = start_frame {
        let mut animation = animation.clone();
        animation.insert(START_FRAME.to_string(), frame);
        record(
            format!("{TEXTURE_SHEET_ANIMATION}.{START_FRAME}"),
            &mut out,
            TEXTURE_SHEET_ANIMATION,
            Value::Object(animation),
        );
    }

    if let Some(velocity) = source.get(VELOCITY_OVER_LIFETIME).and_then(Value::as_object) {
        let mut velocity = velocity.clone();
        let mut paths = Vec::new();
        for group in [ORBITAL, LINEAR] {
            let Some(axes) = velocity.get_mut(group).and_then(Value::as_object_mut) else {
                continue;
            };
            for axis in AXES {
                if let Some(filled) = axes.get(axis).and_then(fill_axis_range) {
                    axes.insert(axis.to_string(), filled);
                    paths.push(format!("{VELOCITY_OVER_LIFETIME}.{group}.{axis}"));
                }
            }
        }
        if !paths.is_empty() {
            out.insert(VELOCITY_OVER_LIFETIME.to_string(), Value::Object(velocity));
            for path in paths {
                tracing::debug!("migrated field {path}");
                rewritten.push(path);
            }
        }
    }

    if !rewritten.is_empty() {
        tracing::info!("migrated legacy document: {} field(s) rewritten", rewritten.len());
    }

    Migration {
        document: Value::Object(out),
        rewritten,
    }
}

// ── Field rewrites ───────────────────────────────────────────────
//
// Each returns `Some(new_value)` only when the field changes.

/// `{min, max}` with equal bounds, or a lone bound, becomes a Constant.
fn migrate_range(value: &Value) -> Option<Value> {
    let object = value.as_object()?;
    match FieldShape::classify(value) {
        FieldShape::Range {
            min,
            max,
            extra_keys: false,
        } if min == max => object.get("min").cloned(),
        FieldShape::PartialRange { .. } => object.get("min").or_else(|| object.get("max")).cloned(),
        _ => None,
    }
}

/// Lifetime keeps other equal-bound pairs as ranges; only the legacy default
/// is remapped.
fn migrate_lifetime(value: &Value) -> Option<Value> {
    let is_legacy_default = |v: f64| v == LEGACY_DEFAULT_LIFETIME;
    match FieldShape::classify(value) {
        FieldShape::Constant(v) if is_legacy_default(v) => Some(default_lifetime_like(value)),
        FieldShape::Range {
            min,
            max,
            extra_keys: false,
        } if is_legacy_default(min) && is_legacy_default(max) => {
            Some(default_lifetime_like(value.get("min")?))
        }
        FieldShape::PartialRange { min, max } => {
            let v = min.or(max)?;
            if is_legacy_default(v) {
                let bound = value.get("min").or_else(|| value.get("max"))?;
                Some(default_lifetime_like(bound))
            } else {
                migrate_range(value)
            }
        }
        _ => None,
    }
}

/// The current default lifetime, written as an integer when the legacy
/// value was one.
fn default_lifetime_like(original: &Value) -> Value {
    if original.is_i64() || original.is_u64() {
        json!(DEFAULT_LIFETIME as i64)
    } else {
        json!(DEFAULT_LIFETIME)
    }
}

/// Wrap a bare curve module as `{isActive, lifetimeCurve}`.
fn migrate_curve_field(value: &Value) -> Option<Value> {
    let object = value.as_object()?;
    if object.contains_key("lifetimeCurve") {
        return None;
    }

    let is_active = object
        .get("isActive")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let points = match object.get("bezierPoints") {
        Some(points) => points.clone(),
        None => default_points(),
    };

    let mut out = object.clone();
    out.remove("bezierPoints");
    out.insert("isActive".to_string(), Value::Bool(is_active));
    out.insert(
        "lifetimeCurve".to_string(),
        json!({ "type": "BEZIER", "bezierPoints": points }),
    );
    Some(Value::Object(out))
}

fn default_points() -> Value {
    serde_json::to_value(LifetimeCurve::default().bezier_points).unwrap_or_else(|_| json!([]))
}

/// Active rotation without both bounds becomes `{isActive: true, min, max}`.
fn migrate_rotation(value: &Value) -> Option<Value> {
    let object = value.as_object()?;
    if object.get("isActive").and_then(Value::as_bool) != Some(true) {
        return None;
    }
    let min = object.get("min").filter(|v| v.is_number());
    let max = object.get("max").filter(|v| v.is_number());
    let complete = min.is_some() && max.is_some() && !object.contains_key("bezierPoints");
    if complete {
        return None;
    }
    Some(json!({
        "isActive": true,
        "min": min.cloned().unwrap_or(json!(0)),
        "max": max.cloned().unwrap_or(json!(0)),
    }))
}

/// `{min}` → `{min, max: min}`; `{max}` → `{min: 0, max}`.
fn migrate_start_frame(value: &Value) -> Option<Value> {
    let object = value.as_object()?;
    match FieldShape::classify(value) {
        FieldShape::PartialRange { min: Some(_), .. } => {
            let min = object.get("min")?.clone();
            let mut out = object.clone();
            out.insert("max".to_string(), min);
            Some(Value::Object(out))
        }
        FieldShape::PartialRange { max: Some(_), .. } => {
            let mut out = object.clone();
            out.insert("min".to_string(), json!(0));
            Some(Value::Object(out))
        }
        _ => None,
    }
}

/// Velocity axis with one bound: the missing bound is 0.
fn fill_axis_range(value: &Value) -> Option<Value> {
    let object = value.as_object()?;
    let FieldShape::PartialRange { min, max } = FieldShape::classify(value) else {
        return None;
    };
    let mut out = object.clone();
    if min.is_none() {
        out.insert("min".to_string(), json!(0));
    }
    if max.is_none() {
        out.insert("max".to_string(), json!(0));
    }
    Some(Value::Object(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_default_remap() {
        assert_eq!(
            migrate(&json!({"startLifetime": 2.0}))["startLifetime"],
            json!(5.0)
        );
        assert_eq!(
            migrate(&json!({"startLifetime": {"min": 2.0, "max": 2.0}}))["startLifetime"],
            json!(5.0)
        );
        assert_eq!(
            migrate(&json!({"startLifetime": {"min": 0.8, "max": 0.8}}))["startLifetime"],
            json!({"min": 0.8, "max": 0.8})
        );
        assert_eq!(
            migrate(&json!({"startLifetime": 3}))["startLifetime"],
            json!(3)
        );
        assert_eq!(
            migrate(&json!({"startLifetime": {"min": 2, "max": 2}}))["startLifetime"],
            json!(5)
        );
        assert_eq!(
            migrate(&json!({"startLifetime": {"max": 2.0}}))["startLifetime"],
            json!(5.0)
        );
    }

    #[test]
    fn test_lifetime_range_with_extra_keys_is_kept() {
        let lifetime = json!({"min": 2, "max": 2, "curveMode": "RANDOM"});
        let report = migrate_with_report(&json!({"startLifetime": lifetime.clone()}));
        assert_eq!(report.document["startLifetime"], lifetime);
        assert!(!report.changed());
    }

    #[test]
    fn test_range_collapse() {
        assert_eq!(
            migrate(&json!({"startSpeed": {"min": 0.5}}))["startSpeed"],
            json!(0.5)
        );
        assert_eq!(
            migrate(&json!({"startSpeed": {"max": 3.0}}))["startSpeed"],
            json!(3.0)
        );
        assert_eq!(
            migrate(&json!({"startSize": {"min": 4, "max": 4}}))["startSize"],
            json!(4)
        );
        assert_eq!(
            migrate(&json!({"startSize": {"min": 1, "max": 4}}))["startSize"],
            json!({"min": 1, "max": 4})
        );
        assert_eq!(migrate(&json!({"startDelay": 0.25}))["startDelay"], json!(0.25));
    }

    #[test]
    fn test_curve_field_wrapping() {
        let doc = json!({
            "opacityOverLifetime": {
                "isActive": true,
                "bezierPoints": [
                    {"x": 0, "y": 1, "percentage": 0},
                    {"x": 1, "y": 0, "percentage": 1}
                ]
            }
        });
        let migrated = migrate(&doc);
        let field = &migrated["opacityOverLifetime"];
        assert_eq!(field["isActive"], json!(true));
        assert_eq!(field["lifetimeCurve"]["type"], json!("BEZIER"));
        assert_eq!(
            field["lifetimeCurve"]["bezierPoints"],
            doc["opacityOverLifetime"]["bezierPoints"]
        );
        assert!(field.get("bezierPoints").is_none());
    }

    #[test]
    fn test_curve_field_without_points_gets_linear_default() {
        let migrated = migrate(&json!({"sizeOverLifetime": {"isActive": true}}));
        let points = &migrated["sizeOverLifetime"]["lifetimeCurve"]["bezierPoints"];
        let points = points.as_array().expect("array");
        assert_eq!(points.first().map(|p| &p["y"]), Some(&json!(0.0)));
        assert_eq!(points.last().map(|p| &p["x"]), Some(&json!(1.0)));
        assert_eq!(migrated["sizeOverLifetime"]["isActive"], json!(true));
    }

    #[test]
    fn test_missing_is_active_defaults_to_false() {
        let migrated = migrate(&json!({"sizeOverLifetime": {"bezierPoints": []}}));
        assert_eq!(migrated["sizeOverLifetime"]["isActive"], json!(false));
    }

    #[test]
    fn test_rotation_gets_both_bounds() {
        let migrated = migrate(&json!({"rotationOverLifetime": {"isActive": true, "max": 45}}));
        assert_eq!(
            migrated["rotationOverLifetime"],
            json!({"isActive": true, "min": 0, "max": 45})
        );

        let inactive = json!({"rotationOverLifetime": {"isActive": false, "max": 45}});
        assert_eq!(migrate(&inactive), inactive);
    }

    #[test]
    fn test_start_frame_fill() {
        let only_min = json!({"textureSheetAnimation": {"tiles": 4, "startFrame": {"min": 2}}});
        assert_eq!(
            migrate(&only_min)["textureSheetAnimation"],
            json!({"tiles": 4, "startFrame": {"min": 2, "max": 2}})
        );
        let only_max = json!({"textureSheetAnimation": {"startFrame": {"max": 3}}});
        assert_eq!(
            migrate(&only_max)["textureSheetAnimation"]["startFrame"],
            json!({"min": 0, "max": 3})
        );
        let number = json!({"textureSheetAnimation": {"startFrame": 1}});
        assert_eq!(migrate(&number), number);
    }

    #[test]
    fn test_velocity_axes_fill() {
        let doc = json!({
            "velocityOverLifetime": {
                "isActive": true,
                "orbital": {"x": {"max": 2}, "y": {"min": 1, "max": 3}, "z": 0},
                "linear": {"x": 0, "y": {"min": -1}, "z": 0}
            }
        });
        let report = migrate_with_report(&doc);
        let velocity = &report.document["velocityOverLifetime"];
        assert_eq!(velocity["orbital"]["x"], json!({"min": 0, "max": 2}));
        assert_eq!(velocity["orbital"]["y"], json!({"min": 1, "max": 3}));
        assert_eq!(velocity["linear"]["y"], json!({"min": -1, "max": 0}));
        assert_eq!(velocity["isActive"], json!(true));
        assert_eq!(
            report.rewritten,
            vec![
                "velocityOverLifetime.orbital.x".to_string(),
                "velocityOverLifetime.linear.y".to_string()
            ]
        );
    }

    #[test]
    fn test_unknown_fields_pass_through() {
        let doc = json!({"name": "sparks", "duration": 3, "looping": true, "custom": {"min": 1}});
        let report = migrate_with_report(&doc);
        assert_eq!(report.document, doc);
        assert!(!report.changed());
    }

    #[test]
    fn test_idempotent_on_current_documents() {
        let legacy = json!({
            "startLifetime": {"min": 2, "max": 2},
            "startSpeed": {"min": 0.5},
            "startSize": {"min": 1, "max": 2},
            "sizeOverLifetime": {"bezierPoints": []},
            "rotationOverLifetime": {"isActive": true, "min": 10},
            "textureSheetAnimation": {"startFrame": {"max": 3}},
            "velocityOverLifetime": {"orbital": {"x": {"max": 2}}}
        });
        let once = migrate(&legacy);
        let twice = migrate_with_report(&once);
        assert_eq!(twice.document, once);
        assert!(!twice.changed());
    }

    #[test]
    fn test_non_object_documents_are_returned_as_is() {
        assert_eq!(migrate(&json!(null)), json!(null));
        assert_eq!(migrate(&json!([1])), json!([1]));
    }
}
