//! Particle System
//!
//! Short-lived colored points that live outside the entity store, in a
//! fixed-capacity pool. When the pool is full a new particle overwrites
//! slot 0. Dead particles are removed by swapping the last live particle
//! into their slot, so indices are not stable from one tick to the next.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{alloc_pool, AllocError};
use crate::rasterizer::{Color, Vec2};
use crate::world::{Board, TileFlags};

/// Maximum number of live particles
pub const MAX_PARTICLES: usize = 1000;

pub const FIRE_COLOR_START: Color = Color::YELLOW;
pub const FIRE_COLOR_END: Color = Color::RED;

/// A single particle in the pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// World position
    pub origin: Vec2,
    /// Displacement per tick
    pub velocity: Vec2,
    /// Added to velocity every tick
    pub vel_change: Vec2,
    /// Color at spawn
    pub color_start: Color,
    /// Color at death
    pub color_end: Color,
    /// Interpolated color for the current tick
    pub color: Color,
    /// Total lifetime in ticks
    pub life_time: i32,
    pub life_left: i32,
}

impl Particle {
    fn blend_color(&self) -> Color {
        if self.life_time <= 0 {
            return self.color_end;
        }
        let left = self.life_left.clamp(0, self.life_time);
        let spent = self.life_time - left;
        let mix = |a: u8, b: u8| ((left * a as i32 + spent * b as i32) / self.life_time) as u8;
        Color::new(
            mix(self.color_start.r, self.color_end.r),
            mix(self.color_start.g, self.color_end.g),
            mix(self.color_start.b, self.color_end.b),
        )
    }
}

/// The particle pool
pub struct ParticlePool {
    particles: Vec<Particle>,
    capacity: usize,
    rng: StdRng,
}

impl ParticlePool {
    /// Reserve the full pool. `seed` drives spread and lifetime randomness.
    pub fn new(seed: u64) -> Result<Self, AllocError> {
        Self::with_capacity(MAX_PARTICLES, seed)
    }

    pub fn with_capacity(capacity: usize, seed: u64) -> Result<Self, AllocError> {
        Ok(Self {
            particles: alloc_pool("particle pool", capacity)?,
            capacity,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Add a particle and return its slot. A full pool overwrites slot 0.
    pub fn spawn(
        &mut self,
        origin: Vec2,
        velocity: Vec2,
        vel_change: Vec2,
        color_start: Color,
        color_end: Color,
        life_time: i32,
    ) -> usize {
        let particle = Particle {
            origin,
            velocity,
            vel_change,
            color_start,
            color_end,
            color: color_start,
            life_time,
            life_left: life_time,
        };

        if self.particles.len() >= self.capacity {
            if let Some(slot) = self.particles.first_mut() {
                *slot = particle;
            }
            0
        } else {
            self.particles.push(particle);
            self.particles.len() - 1
        }
    }

    /// Remove by swapping the last particle into `index`
    pub fn kill(&mut self, index: usize) {
        if index < self.particles.len() {
            self.particles.swap_remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Age, cull and integrate every particle.
    ///
    /// A particle dies when its life runs out or when it sits on an obstacle
    /// tile. The particle swapped into a dead slot is processed in the same
    /// pass.
    pub fn update(&mut self, board: &Board) {
        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];

            if p.life_left <= 0 || board.has_flag_at_pos(p.origin.x, p.origin.y, TileFlags::OBSTACLE) {
                self.kill(i);
                continue;
            }

            p.life_left -= 1;
            p.velocity += p.vel_change;
            p.origin += p.velocity;
            p.color = p.blend_color();
            i += 1;
        }
    }

    /// Random float in [min, max); tolerates min > max
    fn random_float(&mut self, min: f32, max: f32) -> f32 {
        min + self.rng.gen::<f32>() * (max - min)
    }

    /// Vector of random length in [min, max) and random direction
    pub fn random_vec2(&mut self, min: f32, max: f32) -> Vec2 {
        let length = self.random_float(min, max);
        let angle = self.random_float(0.0, std::f32::consts::TAU);
        Vec2::polar(length, angle)
    }

    /// One flame particle drifting along `move_vector * scale` with up to
    /// `randomness` of jitter
    pub fn spawn_flame(&mut self, origin: Vec2, move_vector: Vec2, scale: f32, randomness: f32, life: i32) -> usize {
        let velocity = move_vector * scale + self.random_vec2(0.0, randomness);
        self.spawn(origin, velocity, Vec2::ZERO, FIRE_COLOR_START, FIRE_COLOR_END, life)
    }

    /// `magnitude` particles with random spread (up to magnitude / 100) and
    /// random lifetimes below `magnitude` ticks
    pub fn spawn_explosion(&mut self, origin: Vec2, move_vector: Vec2, magnitude: i32) {
        if magnitude <= 0 {
            return;
        }
        let spread = magnitude as f32 / 100.0;
        for _ in 0..magnitude {
            let velocity = move_vector + self.random_vec2(spread, 0.0);
            let life = self.rng.gen_range(0..magnitude);
            self.spawn(origin, velocity, Vec2::ZERO, FIRE_COLOR_START, FIRE_COLOR_END, life);
        }
    }
}
