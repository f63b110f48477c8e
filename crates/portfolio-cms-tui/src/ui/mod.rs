//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, login screen and overlays
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling
//! - `tabs`: per-view content rendering

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
