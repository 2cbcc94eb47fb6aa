//! Tile-grid collision
//!
//! Axis-separated: the intended displacement is tested per axis against the
//! obstacle flag, diagonal ambiguity is resolved with single-axis retests,
//! and every blocked axis has its displacement clamped so the box ends flush
//! with the blocking tile. Only the transform is edited; position
//! integration runs afterwards.

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

use super::components::CollidableKind;
use super::entity::Shape;
use super::store::EntityStore;
use crate::rasterizer::Vec2;
use crate::world::{Board, TileFlags};

/// Inset of the trailing sample points so a box exactly flush with a tile
/// edge does not read the neighbouring tile.
const EDGE_INSET: f32 = 1.0 / 1024.0;

/// Blocked-axis bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Directions(pub u8);

impl Directions {
    pub const NONE: Directions = Directions(0);
    pub const NORTH: Directions = Directions(1 << 0);
    pub const SOUTH: Directions = Directions(1 << 1);
    pub const WEST: Directions = Directions(1 << 2);
    pub const EAST: Directions = Directions(1 << 3);
    pub const HORIZONTAL: Directions = Directions(Self::WEST.0 | Self::EAST.0);
    pub const VERTICAL: Directions = Directions(Self::NORTH.0 | Self::SOUTH.0);

    #[inline]
    pub const fn has(self, other: Directions) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Directions {
    type Output = Directions;
    fn bitor(self, rhs: Directions) -> Directions {
        Directions(self.0 | rhs.0)
    }
}

impl BitOrAssign for Directions {
    fn bitor_assign(&mut self, rhs: Directions) {
        self.0 |= rhs.0;
    }
}

/// Test the leading vertical edge of a box with top-left corner (x, y).
fn test_x(board: &Board, x: f32, y: f32, dir: Directions) -> Directions {
    let size = board.tile_size();
    let edge = if dir == Directions::WEST { x } else { x + size - EDGE_INSET };

    let blocked = board.has_flag_at_pos(edge, y, TileFlags::OBSTACLE)
        || board.has_flag_at_pos(edge, y + size - EDGE_INSET, TileFlags::OBSTACLE);

    if blocked { dir } else { Directions::NONE }
}

/// Test the leading horizontal edge of a box with top-left corner (x, y).
fn test_y(board: &Board, x: f32, y: f32, dir: Directions) -> Directions {
    let size = board.tile_size();
    let edge = if dir == Directions::NORTH { y } else { y + size - EDGE_INSET };

    let blocked = board.has_flag_at_pos(x, edge, TileFlags::OBSTACLE)
        || board.has_flag_at_pos(x + size - EDGE_INSET, edge, TileFlags::OBSTACLE);

    if blocked { dir } else { Directions::NONE }
}

/// Which axes of `transform` are blocked for a tile-sized box centered on
/// `position`.
///
/// When both axes report a hit the horizontal move is retested alone. If it
/// still hits, the vertical move is retested alone: both axes are blocked
/// when that hits too, otherwise only the horizontal one. If the horizontal
/// retest is clear, only the vertical axis is blocked.
///
/// This is asymmetric: the horizontal retest always runs first, and a
/// corner hit whose vertical retest is clear reports the horizontal axis
/// rather than the vertical one. Inherited collision behavior, kept as is.
pub fn collide_tile(board: &Board, position: Vec2, transform: Vec2) -> Directions {
    let half = board.half_tile();
    let x = position.x + transform.x - half;
    let y = position.y + transform.y - half;

    let mut dir_x = Directions::NONE;
    let mut dir_y = Directions::NONE;
    let mut collision = Directions::NONE;

    if transform.x != 0.0 {
        dir_x = if transform.x < 0.0 { Directions::WEST } else { Directions::EAST };
        collision |= test_x(board, x, y, dir_x);
    }

    if transform.y != 0.0 {
        dir_y = if transform.y < 0.0 { Directions::NORTH } else { Directions::SOUTH };
        collision |= test_y(board, x, y, dir_y);
    }

    if collision.has(Directions::HORIZONTAL) && collision.has(Directions::VERTICAL) {
        let unmoved_y = position.y - half;
        if !test_x(board, x, unmoved_y, dir_x).is_empty() {
            let unmoved_x = position.x - half;
            collision = if !test_y(board, unmoved_x, y, dir_y).is_empty() {
                dir_x | dir_y
            } else {
                dir_x
            };
        } else {
            collision = dir_y;
        }
    }

    collision
}

/// Clamp the blocked axes of `transform` so the box lands flush against the
/// tile it ran into.
pub fn resolve_tile(board: &Board, position: Vec2, transform: Vec2, collision: Directions) -> Vec2 {
    let size = board.tile_size();
    let half = board.half_tile();
    let mut resolved = transform;

    let left = position.x - half;
    let top = position.y - half;
    let moved_left = left + transform.x;
    let moved_top = top + transform.y;

    if collision.has(Directions::WEST) {
        let face = ((moved_left / size).floor() + 1.0) * size;
        resolved.x = face - left;
    } else if collision.has(Directions::EAST) {
        let face = ((moved_left + size - EDGE_INSET) / size).floor() * size;
        resolved.x = face - (left + size);
    }

    if collision.has(Directions::NORTH) {
        let face = ((moved_top / size).floor() + 1.0) * size;
        resolved.y = face - top;
    } else if collision.has(Directions::SOUTH) {
        let face = ((moved_top + size - EDGE_INSET) / size).floor() * size;
        resolved.y = face - (top + size);
    }

    resolved
}

/// Collision pass over every positioned entity with a collidable and a
/// non-zero transform. Records the blocked axes and zeroes velocity along them.
pub fn apply_collision(store: &mut EntityStore, board: &Board) {
    let mask = Shape::COLLIDABLE | Shape::TRANSFORM | Shape::POSITION;

    for i in 0..store.count {
        let shape = store.shapes[i];
        if !shape.has_all(mask) || store.transforms[i].is_zero() {
            continue;
        }

        store.collidables[i].collision = Directions::NONE;

        if store.collidables[i].kind == CollidableKind::Tile {
            let position = store.positions[i];
            let transform = store.transforms[i];
            let collision = collide_tile(board, position, transform);
            store.transforms[i] = resolve_tile(board, position, transform, collision);
            store.collidables[i].collision = collision;
        }

        if shape.has(Shape::VELOCITY) {
            let collision = store.collidables[i].collision;
            if collision.has(Directions::HORIZONTAL) {
                store.velocities[i].x = 0.0;
            }
            if collision.has(Directions::VERTICAL) {
                store.velocities[i].y = 0.0;
            }
        }
    }
}
