//! Software rasterizer primitives
//!
//! # Module Organization
//!
//! - `types` - Color, Texture
//! - `math` - Vec2
//! - `render` - Framebuffer and 2D drawing helpers
//! - `constants` - Screen resolution constants

pub mod constants;
pub mod math;
pub mod render;
pub mod types;

// =============================================================================
// Convenience re-exports for commonly used items
// =============================================================================

pub use types::{Color, Texture, TextureError};
pub use math::Vec2;
pub use render::Framebuffer;
pub use constants::{WIDTH, HEIGHT};
