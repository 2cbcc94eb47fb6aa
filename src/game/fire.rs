//! Hitscan firing
//!
//! A controlled entity with FIRE pending and no cooldown left casts a ray
//! along its facing (plus some random inaccuracy). An explosion spawns just
//! before the first obstacle and the shot is recorded as a tracer.

use super::entity::Shape;
use super::input::Commands;
use super::overhead::Tracer;
use super::particles::ParticlePool;
use super::store::EntityStore;
use crate::rasterizer::Vec2;
use crate::world::{Board, TileFlags};

/// Ticks between shots
pub const FIRE_COOLDOWN: u8 = 3;
pub const EXPLOSION_MAGNITUDE: i32 = 30;
/// Largest random deviation added to the shot direction
pub const INACCURACY: f32 = 0.1;

/// Step from `origin` by `direction` until an obstacle tile, at most
/// `max_dist` away. Returns the first sample inside the obstacle, or the
/// last sample when nothing was hit.
pub fn shoot_ray(board: &Board, origin: Vec2, direction: Vec2, max_dist: f32) -> Vec2 {
    let step = direction.length();
    if step <= f32::EPSILON {
        return origin;
    }

    let steps = (max_dist / step).ceil() as u32;
    let mut ray = origin;
    for _ in 0..=steps {
        if board.has_flag_at_pos(ray.x, ray.y, TileFlags::OBSTACLE) {
            return ray;
        }
        ray += direction;
    }
    ray
}

/// Run the fire system for every controlled, positioned, rotated entity
pub fn apply_fire(store: &mut EntityStore, board: &Board, particles: &mut ParticlePool, tracers: &mut Vec<Tracer>) {
    let mask = Shape::CONTROL | Shape::POSITION | Shape::ROTATION;
    for i in 0..store.count {
        if !store.shapes[i].has_all(mask) {
            continue;
        }

        let control = &mut store.controls[i];
        if control.fire_cooldown > 0 {
            control.fire_cooldown -= 1;
            continue;
        }
        if !control.commands.has(Commands::FIRE) {
            continue;
        }

        let origin = store.positions[i];
        let direction = store.rotations[i].dir() + particles.random_vec2(0.0, INACCURACY);
        let mut hit = shoot_ray(board, origin, direction, board.settings.draw_distance);
        hit -= direction;

        particles.spawn_explosion(hit, Vec2::ZERO, EXPLOSION_MAGNITUDE);
        tracers.push(Tracer { from: origin, to: hit });
        control.fire_cooldown = FIRE_COOLDOWN;
    }
}
