use ember_core::schema::migrate::migrate_with_report;
use ember_core::{EffectDocument, is_current_schema, migrate};
use serde_json::{Value, json};

const LEGACY_SIZE_DOCUMENT: &str = r#"{"startLifetime":{"min":2,"max":2},"sizeOverLifetime":{"bezierPoints":[{"x":0,"y":0,"percentage":0},{"x":1,"y":1,"percentage":1}]}}"#;

fn parse(text: &str) -> Value {
    serde_json::from_str(text).expect("test document should be valid JSON")
}

#[test]
fn test_legacy_size_document_end_to_end() {
    let legacy = parse(LEGACY_SIZE_DOCUMENT);
    assert!(!is_current_schema(&legacy));

    let expected = json!({
        "startLifetime": 5,
        "sizeOverLifetime": {
            "isActive": false,
            "lifetimeCurve": {
                "type": "BEZIER",
                "bezierPoints": [
                    {"x": 0, "y": 0, "percentage": 0},
                    {"x": 1, "y": 1, "percentage": 1}
                ]
            }
        }
    });
    assert_eq!(migrate(&legacy), expected);
}

#[test]
fn test_load_pipeline_matches_manual_migration() {
    let loaded = EffectDocument::load(LEGACY_SIZE_DOCUMENT).expect("valid document");
    assert!(loaded.migrated());
    assert!(!loaded.detection.is_current);
    assert_eq!(
        loaded.rewritten,
        vec!["startLifetime".to_string(), "sizeOverLifetime".to_string()]
    );
    assert_eq!(loaded.document.into_value(), migrate(&parse(LEGACY_SIZE_DOCUMENT)));
}

#[test]
fn test_migrated_document_decodes_into_typed_fields() {
    let loaded = EffectDocument::load(LEGACY_SIZE_DOCUMENT).expect("valid document");
    let size = loaded
        .document
        .curve_field("sizeOverLifetime")
        .expect("wrapped curve decodes")
        .expect("size curve present");
    assert!(!size.is_active);
    assert_eq!(size.lifetime_curve.bezier_points.anchor_count(), 2);
    assert!((size.lifetime_curve.value_at(0.25) - 0.25).abs() < 1e-5);
}

#[test]
fn test_full_legacy_document() {
    let legacy = json!({
        "name": "campfire",
        "startLifetime": 2.0,
        "startSpeed": {"min": 0.5},
        "startSize": {"max": 3.0},
        "startRotation": {"min": 10, "max": 10},
        "startOpacity": {"min": 0.2, "max": 0.9},
        "opacityOverLifetime": {
            "isActive": true,
            "bezierPoints": [
                {"x": 0, "y": 1, "percentage": 0},
                {"x": 0.33, "y": 1},
                {"x": 0.66, "y": 0},
                {"x": 1, "y": 0, "percentage": 1}
            ]
        },
        "rotationOverLifetime": {"isActive": true, "min": -30},
        "textureSheetAnimation": {"isActive": true, "startFrame": {"min": 2}},
        "velocityOverLifetime": {
            "isActive": true,
            "orbital": {"x": {"max": 1.5}, "y": 0, "z": {"min": 0, "max": 2}}
        }
    });
    assert!(!is_current_schema(&legacy));

    let report = migrate_with_report(&legacy);
    let doc = &report.document;
    assert_eq!(doc["name"], json!("campfire"));
    assert_eq!(doc["startLifetime"], json!(5.0));
    assert_eq!(doc["startSpeed"], json!(0.5));
    assert_eq!(doc["startSize"], json!(3.0));
    assert_eq!(doc["startRotation"], json!(10));
    assert_eq!(doc["startOpacity"], json!({"min": 0.2, "max": 0.9}));
    assert_eq!(doc["opacityOverLifetime"]["isActive"], json!(true));
    assert_eq!(
        doc["opacityOverLifetime"]["lifetimeCurve"]["bezierPoints"],
        legacy["opacityOverLifetime"]["bezierPoints"]
    );
    assert_eq!(
        doc["rotationOverLifetime"],
        json!({"isActive": true, "min": -30, "max": 0})
    );
    assert_eq!(
        doc["textureSheetAnimation"]["startFrame"],
        json!({"min": 2, "max": 2})
    );
    assert_eq!(
        doc["velocityOverLifetime"]["orbital"]["x"],
        json!({"min": 0, "max": 1.5})
    );
    assert_eq!(
        doc["velocityOverLifetime"]["orbital"]["z"],
        json!({"min": 0, "max": 2})
    );
    assert!(report.changed());

    // A second pass finds nothing left to rewrite.
    let again = migrate_with_report(doc);
    assert_eq!(&again.document, doc);
    assert!(again.rewritten.is_empty());
}

#[test]
fn test_mixed_document_is_treated_as_legacy() {
    let mixed = json!({
        "sizeOverLifetime": {
            "isActive": true,
            "lifetimeCurve": {
                "type": "BEZIER",
                "bezierPoints": [
                    {"x": 0, "y": 0, "percentage": 0},
                    {"x": 1, "y": 1, "percentage": 1}
                ]
            }
        },
        "opacityOverLifetime": {
            "bezierPoints": [
                {"x": 0, "y": 1, "percentage": 0},
                {"x": 1, "y": 0, "percentage": 1}
            ]
        }
    });
    assert!(!is_current_schema(&mixed));

    let migrated = migrate(&mixed);
    assert_eq!(migrated["sizeOverLifetime"], mixed["sizeOverLifetime"]);
    assert_eq!(migrated["opacityOverLifetime"]["isActive"], json!(false));
    assert!(is_current_schema(&migrated));
}

#[test]
fn test_saved_document_round_trips_without_migration() {
    let loaded = EffectDocument::load(LEGACY_SIZE_DOCUMENT).expect("valid document");
    let mut document = loaded.document;
    document.stamp_editor_version().expect("editor data encodes");
    let text = document.to_json_string().expect("serializes");

    let reloaded = EffectDocument::load(&text).expect("valid document");
    assert!(!reloaded.migrated());
    assert_eq!(reloaded.detection.decided_by, Some("explicit_version"));
    assert_eq!(reloaded.document, document);
}
