//! Game Components
//!
//! Plain data stored in the entity store's parallel arrays. A slot is only
//! meaningful while the entity's shape carries the matching bit; behavior
//! lives in the systems.

use serde::{Deserialize, Serialize};

use super::collision::Directions;
use super::input::Commands;
use crate::rasterizer::{Color, Vec2};
use crate::world::TILE_SIZE;

// =============================================================================
// Tuning
// =============================================================================

const TILE: f32 = TILE_SIZE as f32;

/// Displacement per unit of velocity
pub const PHYS_SCALE: f32 = 1.0;
pub const ACCELERATION: f32 = TILE / 64.0;
pub const MAX_FORCE: f32 = TILE / 64.0;
pub const WALK_SPEED: f32 = TILE / 8.0;
pub const RUN_SPEED: f32 = WALK_SPEED * 1.75;
pub const FRICTION: f32 = ACCELERATION / 2.0;
pub const ANGULAR_ACCELERATION: f32 = 0.5 * std::f32::consts::PI / 180.0;
pub const MAX_ANGULAR_VELOCITY: f32 = 4.0 * std::f32::consts::PI / 180.0;

// =============================================================================
// Physics
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub max_vel_squared: f32,
    /// Fixed deceleration applied against the direction of travel
    pub friction: f32,
}

impl Default for Velocity {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, max_vel_squared: WALK_SPEED * WALK_SPEED, friction: FRICTION }
    }
}

impl Velocity {
    pub fn vec(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Facing: unit vector derived from `angle` (radians, screen Y down)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

impl Default for Rotation {
    fn default() -> Self {
        Self::from_angle(std::f32::consts::FRAC_PI_2)
    }
}

impl Rotation {
    pub fn from_angle(angle: f32) -> Self {
        let dir = Vec2::from_angle(angle);
        Self { x: dir.x, y: dir.y, angle }
    }

    /// Recompute the facing vector from `angle`
    pub fn sync(&mut self) {
        *self = Self::from_angle(self.angle);
    }

    pub fn dir(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Acceleration target, in world axes or (x = strafe, y = forward/back)
/// axes for rotational control
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Force {
    pub x: f32,
    pub y: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub max_squared: f32,
}

impl Default for Force {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, max_x: MAX_FORCE, max_y: MAX_FORCE, max_squared: MAX_FORCE * MAX_FORCE }
    }
}

impl Force {
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Torque {
    pub ang_vel: f32,
    pub max_ang_vel: f32,
}

impl Default for Torque {
    fn default() -> Self {
        Self { ang_vel: 0.0, max_ang_vel: MAX_ANGULAR_VELOCITY }
    }
}

// =============================================================================
// Collision
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollidableKind {
    /// Tile-sized square resolved against the tile grid
    #[default]
    Tile,
    Point,
    Rect,
    Circle,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Collidable {
    pub kind: CollidableKind,
    /// Axes blocked during the last collision pass
    pub collision: Directions,
    pub w: f32,
    pub h: f32,
}

impl Collidable {
    pub fn tile(size: f32) -> Self {
        Self { kind: CollidableKind::Tile, collision: Directions::NONE, w: size, h: size }
    }
}

// =============================================================================
// Control
// =============================================================================

/// Control-type bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ControlType(pub u8);

impl ControlType {
    pub const AI: ControlType = ControlType(1 << 0);
    pub const KEYBOARD: ControlType = ControlType(1 << 1);
    pub const MOUSELOOK: ControlType = ControlType(1 << 2);
    /// Forces act along world axes
    pub const DIRECTIONAL: ControlType = ControlType(1 << 3);
    /// Forces act along the facing and strafe axes
    pub const ROTATIONAL: ControlType = ControlType(1 << 4);

    pub const fn has(self, other: ControlType) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn with(self, other: ControlType) -> ControlType {
        ControlType(self.0 | other.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Control {
    pub kind: ControlType,
    pub input_channel: usize,
    /// Commands consumed by the current tick
    pub commands: Commands,
    /// Ticks until the entity may fire again
    pub fire_cooldown: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Idle,
    Patrol,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Ai {
    pub state: AiState,
    /// Commands the control system copies for AI-driven entities
    pub commands: Commands,
}

// =============================================================================
// Rendering
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum VisibleKind {
    /// Outline of the collision box plus a facing line
    #[default]
    Hitbox,
    Dot,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Visible {
    pub kind: VisibleKind,
    pub color: Color,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rotation_faces_up() {
        let rot = Rotation::default();
        assert!(rot.x.abs() < 1e-6);
        assert!((rot.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_velocity_defaults_cap_at_walk_speed() {
        let vel = Velocity::default();
        assert!((vel.max_vel_squared.sqrt() - WALK_SPEED).abs() < 1e-6);
        assert_eq!(vel.friction, 0.125);
    }
}
