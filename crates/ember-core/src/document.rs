//! Effect configuration documents.
//!
//! An [`EffectDocument`] is a JSON object describing one particle effect.
//! Only the curve-bearing fields, range fields, and the `_editorData` block
//! are typed; everything else is carried through untouched so documents from
//! newer editors survive a load/save cycle.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::curve::lifetime::LifetimeCurve;
use crate::gradient::bridge::ChannelCurves;
use crate::gradient::model::{Channel, GradientStop};
use crate::schema::detect::{Detection, detect_schema};
use crate::schema::field::{CurveField, RangeValue};
use crate::schema::migrate::migrate_with_report;
use crate::schema::{COLOR_OVER_LIFETIME, EDITOR_DATA, EDITOR_VERSION, OPACITY_OVER_LIFETIME};

// ── Errors ───────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("document root must be a JSON object")]
    NotAnObject,

    #[error("field '{key}' has an unexpected shape: {source}")]
    Field {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

// ── Editor data ──────────────────────────────────────────────────

/// Editor-only state stored under `_editorData`.
///
/// Particle runtimes ignore this block. It keeps what cannot be recovered
/// from the runtime fields alone, chiefly the gradient stops behind the
/// color and opacity curves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_stops: Option<Vec<GradientStop>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terrain: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Document ─────────────────────────────────────────────────────

/// Result of [`EffectDocument::load`].
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub document: EffectDocument,
    pub detection: Detection,
    /// Paths rewritten by migration. Empty when the document was current.
    pub rewritten: Vec<String>,
}

impl LoadedDocument {
    pub fn migrated(&self) -> bool {
        !self.detection.is_current
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectDocument {
    root: Map<String, Value>,
}

impl Default for EffectDocument {
    fn default() -> Self {
        default_document()
    }
}

impl EffectDocument {
    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            _ => Err(DocumentError::NotAnObject),
        }
    }

    /// Parse without detection or migration.
    pub fn parse(text: &str) -> Result<Self, DocumentError> {
        Self::from_value(serde_json::from_str(text)?)
    }

    /// Parse, detect the schema, and migrate legacy documents.
    pub fn load(text: &str) -> Result<LoadedDocument, DocumentError> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            return Err(DocumentError::NotAnObject);
        }

        let detection = detect_schema(&value);
        if detection.is_current {
            return Ok(LoadedDocument {
                document: Self::from_value(value)?,
                detection,
                rewritten: Vec::new(),
            });
        }

        let migration = migrate_with_report(&value);
        tracing::info!(
            "loaded legacy document ({} field(s) migrated)",
            migration.rewritten.len()
        );
        Ok(LoadedDocument {
            document: Self::from_value(migration.document)?,
            detection,
            rewritten: migration.rewritten,
        })
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    pub fn to_json_string(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(&self.root)?)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.root.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.root.remove(key)
    }

    // ── Typed accessors ──

    /// A scalar setting in current form. `None` when absent or not a
    /// Constant/range.
    pub fn range(&self, key: &str) -> Option<RangeValue> {
        self.root.get(key).and_then(RangeValue::from_json)
    }

    pub fn set_range(&mut self, key: &str, value: RangeValue) {
        self.set(key, value.to_json());
    }

    /// A wrapped lifetime curve module such as `sizeOverLifetime`.
    pub fn curve_field(&self, key: &str) -> Result<Option<CurveField>, DocumentError> {
        decode(self.root.get(key), key)
    }

    pub fn set_curve_field(&mut self, key: &str, field: &CurveField) -> Result<(), DocumentError> {
        let value = encode(field, key)?;
        self.set(key, value);
        Ok(())
    }

    /// One channel of the color/opacity pair: R, G, B live under
    /// `colorOverLifetime`, A is the `opacityOverLifetime` curve.
    pub fn channel_curve(&self, channel: Channel) -> Result<Option<LifetimeCurve>, DocumentError> {
        match channel {
            Channel::A => Ok(self
                .curve_field(OPACITY_OVER_LIFETIME)?
                .map(|field| field.lifetime_curve)),
            _ => {
                let value = self
                    .root
                    .get(COLOR_OVER_LIFETIME)
                    .and_then(|color| color.get(channel_key(channel)));
                decode(value, COLOR_OVER_LIFETIME)
            }
        }
    }

    /// All four channel curves, or `None` if any is missing.
    pub fn channel_curves(&self) -> Result<Option<ChannelCurves>, DocumentError> {
        let (Some(r), Some(g), Some(b), Some(a)) = (
            self.channel_curve(Channel::R)?,
            self.channel_curve(Channel::G)?,
            self.channel_curve(Channel::B)?,
            self.channel_curve(Channel::A)?,
        ) else {
            return Ok(None);
        };
        Ok(Some(ChannelCurves { r, g, b, a }))
    }

    /// Write the color curves and the opacity curve, activating both
    /// modules. Other keys on those modules are kept.
    pub fn set_channel_curves(&mut self, curves: &ChannelCurves) -> Result<(), DocumentError> {
        let mut color = self
            .root
            .get(COLOR_OVER_LIFETIME)
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        color.insert("isActive".to_string(), Value::Bool(true));
        for channel in [Channel::R, Channel::G, Channel::B] {
            color.insert(
                channel_key(channel).to_string(),
                encode(curves.get(channel), COLOR_OVER_LIFETIME)?,
            );
        }
        self.set(COLOR_OVER_LIFETIME, Value::Object(color));

        let opacity = match self.curve_field(OPACITY_OVER_LIFETIME)? {
            Some(mut field) => {
                field.is_active = true;
                field.lifetime_curve = curves.a.clone();
                field
            }
            None => CurveField::new(true, curves.a.clone()),
        };
        self.set_curve_field(OPACITY_OVER_LIFETIME, &opacity)
    }

    /// The `_editorData` block, empty when absent.
    pub fn editor_data(&self) -> Result<EditorData, DocumentError> {
        Ok(decode(self.root.get(EDITOR_DATA), EDITOR_DATA)?.unwrap_or_default())
    }

    pub fn set_editor_data(&mut self, data: &EditorData) -> Result<(), DocumentError> {
        let value = encode(data, EDITOR_DATA)?;
        self.set(EDITOR_DATA, value);
        Ok(())
    }

    /// Record the current editor version in `_editorData`.
    pub fn stamp_editor_version(&mut self) -> Result<(), DocumentError> {
        let mut data = self.editor_data()?;
        data.editor_version = Some(EDITOR_VERSION.to_string());
        self.set_editor_data(&data)
    }

    // ── Copy / paste ──

    /// The keys whose value differs from `defaults`, plus the whole
    /// `_editorData` block.
    pub fn diff_for_copy(&self, defaults: &EffectDocument) -> Value {
        let mut diff: Map<String, Value> = self
            .root
            .iter()
            .filter(|(key, value)| key.as_str() != EDITOR_DATA && defaults.get(key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        if let Some(data) = self.root.get(EDITOR_DATA) {
            diff.insert(EDITOR_DATA.to_string(), data.clone());
        }
        Value::Object(diff)
    }

    /// Shallow merge of this document's keys over `defaults`.
    pub fn merged_over(self, defaults: &EffectDocument) -> Self {
        let mut root = defaults.root.clone();
        root.extend(self.root);
        Self { root }
    }
}

fn decode<T: DeserializeOwned>(
    value: Option<&Value>,
    key: &str,
) -> Result<Option<T>, DocumentError> {
    value
        .map(|value| {
            serde_json::from_value(value.clone()).map_err(|source| DocumentError::Field {
                key: key.to_string(),
                source,
            })
        })
        .transpose()
}

fn encode<T: Serialize>(value: &T, key: &str) -> Result<Value, DocumentError> {
    serde_json::to_value(value).map_err(|source| DocumentError::Field {
        key: key.to_string(),
        source,
    })
}

fn channel_key(channel: Channel) -> &'static str {
    match channel {
        Channel::R => "r",
        Channel::G => "g",
        Channel::B => "b",
        Channel::A => "a",
    }
}

// ── Defaults ─────────────────────────────────────────────────────

/// The canonical current-schema document a fresh effect starts from.
pub fn default_document() -> EffectDocument {
    let linear = json!({
        "type": "BEZIER",
        "bezierPoints": [
            {"x": 0.0, "y": 0.0, "percentage": 0.0},
            {"x": 1.0, "y": 1.0, "percentage": 1.0}
        ]
    });
    let white = json!({
        "type": "BEZIER",
        "bezierPoints": [
            {"x": 0.0, "y": 1.0, "percentage": 0.0},
            {"x": 1.0, "y": 1.0, "percentage": 1.0}
        ]
    });
    let zero_axes = json!({"x": 0.0, "y": 0.0, "z": 0.0});

    let root = match json!({
        "duration": 5.0,
        "looping": true,
        "maxParticles": 100,
        "simulationSpace": "LOCAL",
        "gravity": 0.0,
        "startDelay": 0.0,
        "startLifetime": {"min": 5.0, "max": 5.0},
        "startSpeed": 1.0,
        "startSize": 1.0,
        "startRotation": 0.0,
        "startOpacity": 1.0,
        "emission": {"rateOverTime": 10.0, "rateOverDistance": 0.0},
        "sizeOverLifetime": {"isActive": false, "lifetimeCurve": linear},
        "opacityOverLifetime": {"isActive": false, "lifetimeCurve": linear},
        "colorOverLifetime": {"isActive": false, "r": white, "g": white, "b": white},
        "rotationOverLifetime": {"isActive": false, "min": 0.0, "max": 0.0},
        "velocityOverLifetime": {
            "isActive": false,
            "linear": zero_axes,
            "orbital": zero_axes
        },
        "textureSheetAnimation": {
            "isActive": false,
            "tiles": {"x": 1, "y": 1},
            "timeMode": "LIFETIME",
            "fps": 30.0,
            "startFrame": {"min": 0, "max": 0}
        },
        "renderer": {"blending": "NORMAL", "discardBackgroundColor": false},
        "_editorData": {"editorVersion": EDITOR_VERSION}
    }) {
        Value::Object(root) => root,
        _ => Map::new(),
    };
    EffectDocument { root }
}
