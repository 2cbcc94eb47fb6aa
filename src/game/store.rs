//! Fixed-capacity entity store
//!
//! Struct-of-arrays storage: one array per component type, all indexed by
//! entity. Every system walks `0..count` and acts only where the entity's
//! shape carries all the bits it needs.
//!
//! Capacity is fixed at construction. Spawning past it is refused (and
//! logged) instead of growing the arrays.

use super::components::*;
use super::entity::{Entity, Shape};
use crate::error::{alloc_slots, AllocError};
use crate::rasterizer::{Color, Vec2};

pub const MAX_ENTITIES: usize = 10;

pub struct EntityStore {
    pub count: usize,
    pub shapes: Vec<Shape>,
    pub positions: Vec<Vec2>,
    pub transforms: Vec<Vec2>,
    pub velocities: Vec<Velocity>,
    pub rotations: Vec<Rotation>,
    pub forces: Vec<Force>,
    pub torques: Vec<Torque>,
    pub collidables: Vec<Collidable>,
    pub controls: Vec<Control>,
    pub ais: Vec<Ai>,
    pub visibles: Vec<Visible>,
}

impl EntityStore {
    /// Reserve every component array up front
    pub fn new() -> Result<Self, AllocError> {
        Self::with_capacity(MAX_ENTITIES)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Ok(Self {
            count: 0,
            shapes: alloc_slots("entity shapes", capacity)?,
            positions: alloc_slots("position array", capacity)?,
            transforms: alloc_slots("transform array", capacity)?,
            velocities: alloc_slots("velocity array", capacity)?,
            rotations: alloc_slots("rotation array", capacity)?,
            forces: alloc_slots("force array", capacity)?,
            torques: alloc_slots("torque array", capacity)?,
            collidables: alloc_slots("collidable array", capacity)?,
            controls: alloc_slots("control array", capacity)?,
            ais: alloc_slots("ai array", capacity)?,
            visibles: alloc_slots("visible array", capacity)?,
        })
    }

    pub fn capacity(&self) -> usize {
        self.shapes.len()
    }

    /// Claim the next slot with default component values.
    ///
    /// Returns `None` once the store is full; nothing is overwritten.
    pub fn spawn(&mut self, shape: Shape) -> Option<Entity> {
        if self.count >= self.capacity() {
            log::warn!("Entity store full ({} slots), spawn ignored", self.capacity());
            return None;
        }

        let i = self.count;
        self.shapes[i] = shape;
        self.positions[i] = Vec2::ZERO;
        self.transforms[i] = Vec2::ZERO;
        self.velocities[i] = Velocity::default();
        self.rotations[i] = Rotation::default();
        self.forces[i] = Force::default();
        self.torques[i] = Torque::default();
        self.collidables[i] = Collidable::default();
        self.controls[i] = Control::default();
        self.ais[i] = Ai::default();
        self.visibles[i] = Visible::default();
        self.count += 1;

        Some(Entity(i as u32))
    }

    #[inline]
    pub fn shape(&self, entity: Entity) -> Shape {
        self.shapes.get(entity.index()).copied().unwrap_or_default()
    }

    /// Live entity carrying every bit of `mask`
    #[inline]
    pub fn matches(&self, i: usize, mask: Shape) -> bool {
        i < self.count && self.shapes[i].has_all(mask)
    }

    /// Live entities carrying every bit of `mask`
    pub fn with(&self, mask: Shape) -> impl Iterator<Item = Entity> + '_ {
        (0..self.count)
            .filter(move |&i| self.shapes[i].has_all(mask))
            .map(|i| Entity(i as u32))
    }

    /// Keyboard-driven entity with every physics component; becomes the
    /// camera. `x`/`y` are tile coordinates, `angle` is in degrees.
    pub fn spawn_player(&mut self, x: i32, y: i32, angle: f32, color: Color, tile_size: f32) -> Option<Entity> {
        let shape = Shape::POSITION
            | Shape::TRANSFORM
            | Shape::VELOCITY
            | Shape::FORCE
            | Shape::ROTATION
            | Shape::TORQUE
            | Shape::COLLIDABLE
            | Shape::CONTROL
            | Shape::VISIBLE;

        let entity = self.spawn(shape)?;
        let i = entity.index();
        self.positions[i] = tile_center(x, y, tile_size);
        self.rotations[i] = Rotation::from_angle(angle.to_radians());
        self.collidables[i] = Collidable::tile(tile_size);
        self.controls[i].kind = ControlType::ROTATIONAL.with(ControlType::KEYBOARD);
        self.controls[i].input_channel = 0;
        self.visibles[i] = Visible { kind: VisibleKind::Hitbox, color };

        log::info!("Spawned player {:?} at tile ({}, {})", entity, x, y);
        Some(entity)
    }

    /// AI-driven entity that moves along world axes
    pub fn spawn_patroller(&mut self, x: i32, y: i32, color: Color, tile_size: f32) -> Option<Entity> {
        let shape = Shape::POSITION
            | Shape::TRANSFORM
            | Shape::VELOCITY
            | Shape::FORCE
            | Shape::COLLIDABLE
            | Shape::CONTROL
            | Shape::AI
            | Shape::VISIBLE;

        let entity = self.spawn(shape)?;
        let i = entity.index();
        self.positions[i] = tile_center(x, y, tile_size);
        self.collidables[i] = Collidable::tile(tile_size);
        self.controls[i].kind = ControlType::AI.with(ControlType::DIRECTIONAL);
        self.visibles[i] = Visible { kind: VisibleKind::Hitbox, color };

        log::info!("Spawned patroller {:?} at tile ({}, {})", entity, x, y);
        Some(entity)
    }
}

fn tile_center(x: i32, y: i32, tile_size: f32) -> Vec2 {
    let half = (tile_size / 2.0).floor();
    Vec2::new(half + tile_size * x as f32, half + tile_size * y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_refuses_past_capacity() {
        let mut store = EntityStore::new().unwrap();
        for i in 0..MAX_ENTITIES {
            assert_eq!(store.spawn(Shape::POSITION), Some(Entity(i as u32)));
        }
        assert_eq!(store.spawn(Shape::POSITION), None);
        assert_eq!(store.count, MAX_ENTITIES);
    }

    #[test]
    fn test_with_filters_by_full_mask() {
        let mut store = EntityStore::new().unwrap();
        store.spawn(Shape::POSITION);
        let both = store.spawn(Shape::POSITION | Shape::TRANSFORM).unwrap();
        store.spawn(Shape::TRANSFORM);

        let found: Vec<Entity> = store.with(Shape::POSITION | Shape::TRANSFORM).collect();
        assert_eq!(found, vec![both]);
    }

    #[test]
    fn test_player_uses_tile_center_and_degrees() {
        let mut store = EntityStore::new().unwrap();
        let e = store.spawn_player(2, 5, 0.0, Color::GREEN, 16.0).unwrap();
        let i = e.index();

        assert_eq!(store.positions[i], Vec2::new(40.0, 88.0));
        assert!((store.rotations[i].x - 1.0).abs() < 1e-6);
        assert!(store.rotations[i].y.abs() < 1e-6);
        assert!(store.shape(e).has_all(Shape::CONTROL | Shape::TORQUE));
    }

    #[test]
    fn test_spawn_resets_slot() {
        let mut store = EntityStore::new().unwrap();
        store.positions[0] = Vec2::new(9.0, 9.0);
        let e = store.spawn(Shape::POSITION).unwrap();
        assert_eq!(store.positions[e.index()], Vec2::ZERO);
    }
}
