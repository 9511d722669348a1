//! Lifetime curves: model, evaluation, presets, and interactive editing.

pub mod editor;
pub mod evaluate;
pub mod lifetime;
pub mod model;
pub mod presets;
pub mod render;
