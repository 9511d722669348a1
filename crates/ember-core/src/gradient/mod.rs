//! Color/opacity gradients and their per-channel curve form.

pub mod bridge;
pub mod editor;
pub mod model;
