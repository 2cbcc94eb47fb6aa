//! Rasterizer constants
//!
//! Logical screen resolution. The window shows it scaled by the configured
//! resolution factor.

/// Logical screen width
pub const WIDTH: usize = 320;

/// Logical screen height
pub const HEIGHT: usize = 240;
