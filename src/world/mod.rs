//! World module - tile map data
//!
//! - `tile` - packed 16-bit tile records and their flags
//! - `board` - tile grid, brightness grid, spawn objects, per-map settings
//! - `demo` - ASCII board builder used in place of a map loader

mod board;
mod demo;
mod tile;

pub use board::*;
pub use demo::*;
pub use tile::*;
