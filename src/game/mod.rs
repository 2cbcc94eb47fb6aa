//! Game Module
//!
//! A fixed-capacity entity store with masked systems, plus everything that
//! turns it into frames.
//!
//! Key concepts:
//! - Entity: an index into the store's parallel component arrays
//! - Shape: bitmask of the components an entity carries; a system touches
//!   an entity only when every bit it needs is present
//! - Systems: plain functions over the store, run in a fixed order by
//!   `Simulation::step`
//!
//! Rendering reads the store and never mutates it, apart from the
//! renderer's own camera bob state.

pub mod entity;
pub mod components;
pub mod store;
pub mod input;
pub mod physics;
pub mod collision;
pub mod control;
pub mod fire;
pub mod lighting;
pub mod particles;
pub mod renderer;
pub mod overhead;
pub mod runtime;

// Re-export main types
pub use entity::{Entity, Shape};
pub use store::{EntityStore, MAX_ENTITIES};
pub use input::{Commands, InputChannels, RawInput};
pub use lighting::{light_board, light_board_with, Light};
pub use particles::{ParticlePool, MAX_PARTICLES};
pub use renderer::Renderer;
pub use overhead::Tracer;
pub use runtime::{FrameTimings, Simulation};
