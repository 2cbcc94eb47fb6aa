//! Simulation Runtime
//!
//! Owns everything one running board needs: the board itself, the entity
//! store, the particle pool, input channels and the tick counter. `step()`
//! advances one tick; rendering is a separate call so the frame loop can
//! present at its own pace.

use super::components::ControlType;
use super::control::{apply_ai, apply_control, AI_INTERVAL};
use super::collision::apply_collision;
use super::entity::{Entity, Shape};
use super::fire::apply_fire;
use super::input::{InputChannels, RawInput};
use super::overhead::{render_overhead, view_offset, OverheadScene, Tracer};
use super::particles::ParticlePool;
use super::physics::{apply_position, apply_rotation, apply_transform, apply_velocity, LookTarget};
use super::renderer::Renderer;
use super::store::EntityStore;
use super::lighting::light_board;
use crate::error::AllocError;
use crate::rasterizer::{Color, Framebuffer, Texture};
use crate::world::{Board, ObjectKind};

const PLAYER_COLOR: Color = Color::GREEN;
const PATROLLER_COLOR: Color = Color::RED;

/// Frame timing data for the demo overlay
#[derive(Debug, Clone, Default)]
pub struct FrameTimings {
    /// Simulation step time (ms)
    pub logic_ms: f32,
    /// Both software views (ms)
    pub render_ms: f32,
    /// Frame buffer to GPU texture upload (ms)
    pub upload_ms: f32,
    pub total_ms: f32,
}

impl FrameTimings {
    /// Start timing a phase (returns time in seconds from macroquad)
    pub fn start() -> f64 {
        macroquad::prelude::get_time()
    }

    /// Get elapsed time in ms since start
    pub fn elapsed_ms(start: f64) -> f32 {
        ((macroquad::prelude::get_time() - start) * 1000.0) as f32
    }
}

pub struct Simulation {
    pub board: Board,
    pub store: EntityStore,
    pub particles: ParticlePool,
    pub input: InputChannels,
    /// Shots fired during the last step
    pub tracers: Vec<Tracer>,
    /// Entity the views follow; the player when one was spawned
    pub camera: Option<Entity>,
    pub tick: u32,
    pub quit: bool,
    /// Logical size of the overhead view, used to place the mouselook pointer
    pub screen_width: usize,
    pub screen_height: usize,
}

impl Simulation {
    /// Light the board and spawn its objects.
    ///
    /// Fails only when a fixed-capacity array cannot be reserved.
    pub fn new(mut board: Board, screen_width: usize, screen_height: usize, seed: u64) -> Result<Self, AllocError> {
        let mut store = EntityStore::new()?;
        let particles = ParticlePool::new(seed)?;
        light_board(&mut board)?;

        let tile_size = board.tile_size();
        let mut camera = None;
        for object in &board.objects {
            match object.kind {
                ObjectKind::Player { angle } => {
                    if let Some(player) = store.spawn_player(object.x, object.y, angle, PLAYER_COLOR, tile_size) {
                        if camera.is_none() {
                            camera = Some(player);
                        }
                    }
                }
                ObjectKind::Patroller => {
                    store.spawn_patroller(object.x, object.y, PATROLLER_COLOR, tile_size);
                }
                ObjectKind::Light { .. } => {}
            }
        }

        if camera.is_none() {
            log::warn!("Board has no player object, views will stay black");
        }
        log::info!(
            "Simulation ready: {}x{} board, {} entities",
            board.width,
            board.height,
            store.count
        );

        Ok(Self {
            board,
            store,
            particles,
            input: InputChannels::default(),
            tracers: Vec::new(),
            camera,
            tick: 0,
            quit: false,
            screen_width,
            screen_height,
        })
    }

    /// Rerun the lighting pass after the board's tiles or lights changed
    pub fn relight(&mut self) -> Result<(), AllocError> {
        light_board(&mut self.board)
    }

    /// Feed this tick's raw input to the camera entity's channel
    pub fn handle_input(&mut self, raw: &RawInput) {
        if raw.quit {
            self.quit = true;
        }

        let (channel, kind) = match self.camera {
            Some(camera) if self.store.matches(camera.index(), Shape::CONTROL) => {
                let control = self.store.controls[camera.index()];
                (control.input_channel, control.kind)
            }
            _ => (0, ControlType::KEYBOARD.with(ControlType::ROTATIONAL)),
        };
        self.input.apply(channel, raw, kind);
    }

    /// Advance one tick
    pub fn step(&mut self) {
        self.tracers.clear();

        if self.tick % AI_INTERVAL == 0 {
            apply_ai(&mut self.store, &self.board);
        }
        apply_control(&mut self.store, &self.input);

        let look = self.camera.map(|entity| LookTarget {
            entity,
            pointer: self.input.pointer,
            view_offset: view_offset(&self.store, entity, self.screen_width, self.screen_height),
        });
        apply_rotation(&mut self.store, look);
        apply_velocity(&mut self.store);
        apply_transform(&mut self.store);
        apply_collision(&mut self.store, &self.board);
        apply_position(&mut self.store);

        apply_fire(&mut self.store, &self.board, &mut self.particles, &mut self.tracers);
        self.particles.update(&self.board);

        self.tick = self.tick.wrapping_add(1);
    }

    /// First-person view from the camera entity
    pub fn render_view(&self, renderer: &mut Renderer, fb: &mut Framebuffer) {
        match self.camera {
            Some(camera) => renderer.render(fb, &self.board, &self.store, &self.particles, camera, self.tick),
            None => fb.clear(Color::BLACK),
        }
    }

    /// Top-down view centered on the camera entity
    pub fn render_overhead(&self, atlas: Option<&Texture>, fb: &mut Framebuffer) {
        let Some(camera) = self.camera else {
            fb.clear(Color::BLACK);
            return;
        };
        let scene = OverheadScene {
            particles: &self.particles,
            tracers: &self.tracers,
            pointer: self.input.pointer,
            tick: self.tick,
        };
        render_overhead(fb, &self.board, atlas, &self.store, camera, &scene);
    }
}
