//! Entities and component masks
//!
//! An entity is nothing but an index into the store's parallel component
//! arrays. Which arrays are meaningful for it is recorded in its shape: the
//! bitwise OR of the component flags it carries.

use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Index into the entity store's component arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u32);

impl Entity {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Component-presence bitmask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Shape(pub u16);

impl Shape {
    pub const EMPTY: Shape = Shape(0);
    pub const POSITION: Shape = Shape(1 << 1);
    pub const TRANSFORM: Shape = Shape(1 << 2);
    pub const VELOCITY: Shape = Shape(1 << 3);
    pub const ROTATION: Shape = Shape(1 << 4);
    pub const FORCE: Shape = Shape(1 << 5);
    pub const TORQUE: Shape = Shape(1 << 6);
    pub const COLLIDABLE: Shape = Shape(1 << 7);
    pub const CONTROL: Shape = Shape(1 << 8);
    pub const AI: Shape = Shape(1 << 9);
    pub const VISIBLE: Shape = Shape(1 << 10);

    /// True when every bit of `required` is present
    #[inline]
    pub const fn has_all(self, required: Shape) -> bool {
        self.0 & required.0 == required.0
    }

    #[inline]
    pub const fn has(self, component: Shape) -> bool {
        self.0 & component.0 != 0
    }

    pub const fn union(self, other: Shape) -> Shape {
        Shape(self.0 | other.0)
    }
}

impl BitOr for Shape {
    type Output = Shape;
    fn bitor(self, rhs: Shape) -> Shape {
        self.union(rhs)
    }
}

impl BitOrAssign for Shape {
    fn bitor_assign(&mut self, rhs: Shape) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Shape {
    type Output = Shape;
    fn bitand(self, rhs: Shape) -> Shape {
        Shape(self.0 & rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_all_requires_every_bit() {
        let shape = Shape::POSITION | Shape::TRANSFORM;
        assert!(shape.has_all(Shape::POSITION | Shape::TRANSFORM));
        assert!(!shape.has_all(Shape::POSITION | Shape::VELOCITY));
        assert!(shape.has(Shape::POSITION));
        assert!(shape.has_all(Shape::EMPTY));
    }

    #[test]
    fn test_component_bits_are_distinct() {
        let all = [
            Shape::POSITION, Shape::TRANSFORM, Shape::VELOCITY, Shape::ROTATION,
            Shape::FORCE, Shape::TORQUE, Shape::COLLIDABLE, Shape::CONTROL,
            Shape::AI, Shape::VISIBLE,
        ];
        let combined = all.iter().fold(Shape::EMPTY, |acc, &s| acc | s);
        assert_eq!(combined.0.count_ones() as usize, all.len());
        assert_eq!(combined.0 & 1, 0);
    }
}
