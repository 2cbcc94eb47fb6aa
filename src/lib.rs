//! tilecaster: a 2.5D ray-marched tile renderer
//!
//! A fixed-capacity entity simulation over a tile board, shadow-cast tile
//! lighting, and a per-column software renderer that draws into a plain
//! RGBA frame buffer. The demo binary presents that buffer in a window.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod error;
pub mod game;
pub mod rasterizer;
pub mod world;

pub use config::{Config, ConfigError};
pub use error::AllocError;
pub use game::{Renderer, Simulation};
pub use rasterizer::{Color, Framebuffer, Texture};
pub use world::{Board, BoardError, BoardSettings};
