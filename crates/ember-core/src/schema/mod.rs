//! Configuration document schema: field shapes, version detection, and
//! legacy migration.
//!
//! Legacy documents store lifetime curves as `{isActive?, bezierPoints}` and
//! allow partial `{min}`/`{max}` ranges. Current documents wrap curves as
//! `{isActive, lifetimeCurve: {type, bezierPoints}}` and use complete
//! `{min, max}` ranges.

pub mod detect;
pub mod field;
pub mod migrate;

pub use detect::{Detection, detect_schema, is_current_schema};
pub use field::{CurveField, FieldShape, RangeValue, RotationRange};
pub use migrate::{Migration, migrate, migrate_with_report};

/// Scalar emitter settings that hold a Constant or a range.
pub const RANGE_FIELDS: [&str; 5] = [
    "startDelay",
    "startSpeed",
    "startSize",
    "startRotation",
    "startOpacity",
];

/// Particle lifetime. Ranged like [`RANGE_FIELDS`] but with its own default.
pub const START_LIFETIME: &str = "startLifetime";

/// Every range-valued emitter setting, lifetime included.
pub const CANONICAL_RANGE_FIELDS: [&str; 6] = [
    "startLifetime",
    "startSpeed",
    "startSize",
    "startRotation",
    "startOpacity",
    "startDelay",
];

pub const SIZE_OVER_LIFETIME: &str = "sizeOverLifetime";
pub const OPACITY_OVER_LIFETIME: &str = "opacityOverLifetime";
pub const COLOR_OVER_LIFETIME: &str = "colorOverLifetime";
pub const ROTATION_OVER_LIFETIME: &str = "rotationOverLifetime";
pub const VELOCITY_OVER_LIFETIME: &str = "velocityOverLifetime";
pub const TEXTURE_SHEET_ANIMATION: &str = "textureSheetAnimation";
pub const START_FRAME: &str = "startFrame";
pub const EDITOR_DATA: &str = "_editorData";

/// Fields carrying a `lifetimeCurve` wrapper in the current schema.
pub const CURVE_FIELDS: [&str; 2] = [SIZE_OVER_LIFETIME, OPACITY_OVER_LIFETIME];

/// Velocity groups under `velocityOverLifetime`.
pub const LINEAR: &str = "linear";
pub const ORBITAL: &str = "orbital";
pub const AXES: [&str; 3] = ["x", "y", "z"];

/// Suffix shared by every lifetime-varying module.
pub const LIFETIME_SUFFIX: &str = "OverLifetime";

/// Lifetime default written by legacy editors.
pub const LEGACY_DEFAULT_LIFETIME: f64 = 2.0;
/// Lifetime default of the current schema.
pub const DEFAULT_LIFETIME: f64 = 5.0;

/// Editor version stamped into `_editorData.editorVersion` on save.
pub const EDITOR_VERSION: &str = "2.0.0";
