//! Physics integration
//!
//! Each tick runs, in order: rotation/torque, velocity, transform,
//! collision (see `collision`), position. Collision edits the transform
//! before `apply_position` consumes it.

use super::components::{ControlType, PHYS_SCALE};
use super::entity::{Entity, Shape};
use super::store::EntityStore;
use crate::rasterizer::Vec2;

/// Pointer-driven facing for one entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookTarget {
    pub entity: Entity,
    /// Pointer in logical screen coordinates
    pub pointer: Vec2,
    /// Screen offset of world space in the overhead view
    pub view_offset: Vec2,
}

/// Update facing from mouselook or torque, then refresh the unit vector.
pub fn apply_rotation(store: &mut EntityStore, look: Option<LookTarget>) {
    for i in 0..store.count {
        let shape = store.shapes[i];
        if !shape.has(Shape::ROTATION) {
            continue;
        }

        let mouselook = look.filter(|l| {
            l.entity.index() == i
                && shape.has_all(Shape::CONTROL | Shape::POSITION)
                && store.controls[i].kind.has(ControlType::MOUSELOOK)
        });

        if let Some(look) = mouselook {
            let pos = store.positions[i];
            let dx = look.pointer.x - look.view_offset.x - pos.x;
            let dy = look.pointer.y - look.view_offset.y - pos.y;
            store.rotations[i].angle = (-dy).atan2(dx);
        } else if shape.has(Shape::TORQUE) {
            store.rotations[i].angle += store.torques[i].ang_vel;
        }

        store.rotations[i].sync();
    }
}

/// Add force to velocity, then apply friction and the overspeed brake.
pub fn apply_velocity(store: &mut EntityStore) {
    for i in 0..store.count {
        let shape = store.shapes[i];
        if !shape.has(Shape::VELOCITY) {
            continue;
        }

        if shape.has(Shape::FORCE) {
            let force = store.forces[i];
            let vel = &mut store.velocities[i];
            let rotational = shape.has_all(Shape::CONTROL | Shape::ROTATION)
                && store.controls[i].kind.has(ControlType::ROTATIONAL);

            if rotational {
                // force.x strafes, force.y moves along the facing (negative = forward)
                let rot = store.rotations[i];
                vel.x += rot.x * -force.y + rot.y * -force.x;
                vel.y += rot.y * -force.y + rot.x * force.x;
            } else {
                vel.x += force.x;
                vel.y += force.y;
            }
        }

        let vel = &mut store.velocities[i];
        if vel.x == 0.0 && vel.y == 0.0 {
            continue;
        }

        let angle = vel.vec().angle();
        let mut friction = Vec2::polar(vel.friction, angle);
        let excess_squared = vel.x * vel.x + vel.y * vel.y - vel.max_vel_squared;
        if excess_squared > 0.0 {
            friction += Vec2::polar(excess_squared.sqrt(), angle);
        }

        vel.x -= friction.x;
        vel.y -= friction.y;

        // No sign flip past zero
        if vel.x.abs() < friction.x.abs() {
            vel.x = 0.0;
        }
        if vel.y.abs() < friction.y.abs() {
            vel.y = 0.0;
        }
    }
}

/// This tick's displacement from velocity
pub fn apply_transform(store: &mut EntityStore) {
    let mask = Shape::TRANSFORM | Shape::VELOCITY;
    for i in 0..store.count {
        if store.shapes[i].has_all(mask) {
            store.transforms[i] = store.velocities[i].vec() * PHYS_SCALE;
        }
    }
}

pub fn apply_position(store: &mut EntityStore) {
    let mask = Shape::POSITION | Shape::TRANSFORM;
    for i in 0..store.count {
        if store.shapes[i].has_all(mask) {
            let t = store.transforms[i];
            store.positions[i] += t;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::{Force, Torque, RUN_SPEED, WALK_SPEED};

    fn mover(store: &mut EntityStore) -> usize {
        store
            .spawn(Shape::POSITION | Shape::TRANSFORM | Shape::VELOCITY | Shape::FORCE)
            .unwrap()
            .index()
    }

    #[test]
    fn test_velocity_never_exceeds_cap() {
        let mut store = EntityStore::new().unwrap();
        let i = mover(&mut store);
        store.forces[i] = Force { x: 0.25, y: -0.25, ..Force::default() };
        store.velocities[i].x = 10.0;

        let cap = store.velocities[i].max_vel_squared.sqrt();
        for _ in 0..200 {
            apply_velocity(&mut store);
            let len = store.velocities[i].vec().length();
            assert!(len <= cap + store.velocities[i].friction + 1e-4, "speed {} above cap {}", len, cap);
        }
    }

    #[test]
    fn test_constant_force_settles_below_walk_speed() {
        let mut store = EntityStore::new().unwrap();
        let i = mover(&mut store);
        store.forces[i].x = 0.25;

        for _ in 0..100 {
            apply_velocity(&mut store);
        }
        let vx = store.velocities[i].x;
        assert!(vx > 0.0 && vx <= WALK_SPEED);
        assert!(vx < RUN_SPEED);
    }

    #[test]
    fn test_friction_stops_without_overshoot() {
        let mut store = EntityStore::new().unwrap();
        let i = mover(&mut store);
        store.velocities[i].x = 0.3;
        store.velocities[i].y = -0.05;

        for _ in 0..10 {
            apply_velocity(&mut store);
            assert!(store.velocities[i].x >= 0.0);
            assert!(store.velocities[i].y <= 0.0);
        }
        assert_eq!(store.velocities[i].vec(), Vec2::ZERO);
    }

    #[test]
    fn test_rotational_force_follows_facing() {
        let mut store = EntityStore::new().unwrap();
        let e = store
            .spawn_player(1, 1, 0.0, crate::rasterizer::Color::GREEN, 16.0)
            .unwrap();
        let i = e.index();
        // Facing east; "up" is forward
        store.forces[i].y = -0.25;

        apply_velocity(&mut store);
        assert!(store.velocities[i].x > 0.0);
        assert!(store.velocities[i].y.abs() < 1e-6);
    }

    #[test]
    fn test_force_ignored_without_force_bit() {
        let mut store = EntityStore::new().unwrap();
        let i = store.spawn(Shape::VELOCITY).unwrap().index();
        store.forces[i].x = 0.25;
        apply_velocity(&mut store);
        assert_eq!(store.velocities[i].x, 0.0);
    }

    #[test]
    fn test_torque_turns_and_resyncs_facing() {
        let mut store = EntityStore::new().unwrap();
        let i = store.spawn(Shape::ROTATION | Shape::TORQUE).unwrap().index();
        store.torques[i] = Torque { ang_vel: std::f32::consts::FRAC_PI_2, ..Torque::default() };

        apply_rotation(&mut store, None);
        // Default facing is up (90 degrees); a quarter turn faces west
        assert!((store.rotations[i].x + 1.0).abs() < 1e-5);
        assert!(store.rotations[i].y.abs() < 1e-5);
    }

    #[test]
    fn test_mouselook_points_at_pointer() {
        let mut store = EntityStore::new().unwrap();
        let e = store
            .spawn_player(0, 0, 90.0, crate::rasterizer::Color::GREEN, 16.0)
            .unwrap();
        let i = e.index();
        store.controls[i].kind = store.controls[i].kind.with(ControlType::MOUSELOOK);

        // Entity at (8, 8); with a zero view offset the pointer sits to its right
        let look = LookTarget { entity: e, pointer: Vec2::new(100.0, 8.0), view_offset: Vec2::ZERO };
        apply_rotation(&mut store, Some(look));
        assert!(store.rotations[i].angle.abs() < 1e-6);
        assert!((store.rotations[i].x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_mouselook_needs_control_flag() {
        let mut store = EntityStore::new().unwrap();
        let e = store
            .spawn_player(0, 0, 90.0, crate::rasterizer::Color::GREEN, 16.0)
            .unwrap();
        let look = LookTarget { entity: e, pointer: Vec2::new(100.0, 8.0), view_offset: Vec2::ZERO };
        apply_rotation(&mut store, Some(look));
        assert!((store.rotations[e.index()].angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_position_consumes_transform() {
        let mut store = EntityStore::new().unwrap();
        let i = mover(&mut store);
        store.velocities[i].x = 1.5;
        apply_transform(&mut store);
        apply_position(&mut store);
        assert_eq!(store.positions[i], Vec2::new(1.5, 0.0));
    }
}
