//! CLI command implementations.

pub mod analyze;
pub mod common;
pub mod devices;
pub mod glide;
pub mod notes;
pub mod play;
pub mod presets;
pub mod render;
