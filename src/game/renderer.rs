//! Ray-marched Renderer
//!
//! Projects the board through a single camera entity, one ray per screen
//! column. A frame is drawn back to front:
//! 1. Clear to the fog color (or black) and reset the depth buffer
//! 2. Background panorama strips, scrolled by the camera angle
//! 3. Floor and ceiling rows, each marched until it crosses the tile plane
//! 4. Wall columns, marched until they reach an occluding tile
//! 5. Particles, depth tested against the walls
//!
//! Ray distances are measured along the facing vector, so the wall depth
//! buffer and particle depths are directly comparable.

use super::entity::{Entity, Shape};
use super::particles::ParticlePool;
use super::store::EntityStore;
use crate::rasterizer::{Color, Framebuffer, Texture, Vec2};
use crate::world::{Board, Tile, TileFlags};

/// Horizontal and vertical field of view factor
pub const FOV: f32 = 1.0;
/// March resolution: samples per world unit
pub const RAY_STEPS_PER_UNIT: f32 = 10.0;

const BOB_SPEED: f32 = 12.0;
const BOB_HEIGHT: f32 = 1.3;
const BOB_EASE: f32 = 0.075;
/// Enough easing steps to go from rest to full bob
const BOB_CATCH_UP: u32 = 14;

const UNDERWATER_WAVE_HEIGHT: f32 = 2.0;
const UNDERWATER_WAVE_WIDTH: i32 = 4;
const UNDERWATER_WAVE_SPEED: f32 = 1.5;
const LIQUID_WAVE_SPEED: f32 = 5.0;

/// Closest depth a particle may be drawn at
const NEAR_PLANE: f32 = 0.5;
const MAX_PARTICLE_SIZE: i32 = 4;

/// Result of a fixed-step ray march
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// First sample inside the stopping tile, or the last sample on a miss
    pub pos: Vec2,
    /// Sample before `pos`
    pub prev: Vec2,
    /// Distance along the ray in units of `dir`
    pub dist: f32,
    /// The stopping tile, `None` when the ray ran out of distance
    pub tile: Option<Tile>,
}

/// March from `origin` along `dir` until a tile carrying any of `stop`.
///
/// A miss ends at exactly `max_dist`: the distance is derived from the step
/// count, never accumulated.
pub fn cast_ray(board: &Board, origin: Vec2, dir: Vec2, max_dist: f32, stop: TileFlags) -> RayHit {
    let steps = (max_dist * RAY_STEPS_PER_UNIT).round().max(0.0) as u32;
    let mut prev = origin;

    for n in 1..=steps {
        let dist = n as f32 / RAY_STEPS_PER_UNIT;
        let pos = origin + dir * dist;
        let tile = board.tile_at_pos(pos.x, pos.y);
        if tile.has(stop) {
            return RayHit { pos, prev, dist, tile: Some(tile) };
        }
        prev = pos;
    }

    RayHit { pos: prev, prev, dist: steps as f32 / RAY_STEPS_PER_UNIT, tile: None }
}

/// Vertical head bob for one camera
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraBob {
    /// Bob strength, eased between 0 and 1
    pub z_factor: f32,
    /// Tick of the last `advance`
    last_tick: Option<u32>,
}

impl CameraBob {
    /// Ease once per simulation tick elapsed since the previous call, so the
    /// bob speed follows the step rate rather than the render rate
    pub fn advance(&mut self, tick: u32, moving: bool) {
        let steps = match self.last_tick {
            Some(last) => tick.wrapping_sub(last).min(BOB_CATCH_UP),
            None => 1,
        };
        self.last_tick = Some(tick);
        for _ in 0..steps {
            self.update(moving);
        }
    }

    /// Ease in while the camera is pushed, ease out otherwise
    pub fn update(&mut self, moving: bool) {
        if moving && self.z_factor < 1.0 {
            self.z_factor += BOB_EASE;
        } else if self.z_factor > 0.0 {
            self.z_factor -= BOB_EASE;
            if self.z_factor < BOB_EASE {
                self.z_factor = 0.0;
            }
        }
    }

    /// Height offset added to the eye for this tick
    pub fn height(&self, tick: u32) -> f32 {
        if self.z_factor == 0.0 {
            return 0.0;
        }
        let phase = ((tick as f32 * BOB_SPEED) as i64 % 360) as f32;
        self.z_factor * phase.to_radians().sin() * BOB_HEIGHT
    }
}

/// Screen x of background strip `strip` for a camera facing `angle_deg`,
/// `None` when the strip is entirely off-screen
pub fn background_strip_x(angle_deg: i32, strip: i32, screen_width: usize) -> Option<i32> {
    let w = screen_width as i32;
    let strip_angle = (angle_deg.rem_euclid(360) + strip * 90) % 360;
    let scroll = strip_angle as f32 / 360.0 - 0.25;
    let x = (scroll * (w * 4) as f32) as i32;
    (x.abs() < w).then_some(x)
}

#[inline]
fn fog_alpha(dist: f32, fog_distance: f32) -> u8 {
    (255.0 * dist / fog_distance).clamp(0.0, 255.0) as u8
}

/// Camera state for one frame
struct View {
    pos: Vec2,
    dir: Vec2,
    plane: Vec2,
    angle: f32,
    /// Projected height of a tile at distance 1
    h_ratio: f32,
    half_h: usize,
    width: usize,
    height: usize,
    /// Eye height offset from the camera bob
    bob: f32,
}

impl View {
    /// Ray direction of screen column `i`, spanning -1..1 across the screen
    fn column_dir(&self, i: usize) -> Vec2 {
        let x = -1.0 + 2.0 * i as f32 / self.width as f32;
        self.dir + self.plane * x
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Surface {
    Floor,
    Ceiling,
}

/// Ray-marched view of a board
pub struct Renderer {
    /// Tile graphics, one square per graphic index stacked vertically
    atlas: Option<Texture>,
    /// Four-strip panorama
    background: Option<Texture>,
    bob: CameraBob,
    fov: f32,
}

impl Renderer {
    pub fn new(atlas: Option<Texture>, background: Option<Texture>) -> Self {
        if atlas.is_none() {
            log::warn!("No texture atlas, surfaces fall back to flat colors");
        }
        Self { atlas, background, bob: CameraBob::default(), fov: FOV }
    }

    pub fn bob(&self) -> CameraBob {
        self.bob
    }

    pub fn atlas(&self) -> Option<&Texture> {
        self.atlas.as_ref()
    }

    /// Draw one frame from `camera`'s point of view.
    ///
    /// A camera without Position and Rotation leaves a black frame.
    pub fn render(
        &mut self,
        fb: &mut Framebuffer,
        board: &Board,
        store: &EntityStore,
        particles: &ParticlePool,
        camera: Entity,
        tick: u32,
    ) {
        let i = camera.index();
        let shape = store.shape(camera);
        if i >= store.count || !shape.has_all(Shape::POSITION | Shape::ROTATION) {
            fb.clear(Color::BLACK);
            return;
        }

        let moving = shape.has(Shape::FORCE) && !store.forces[i].is_zero();
        self.bob.advance(tick, moving);

        let rot = store.rotations[i];
        let dir = rot.dir();
        let view = View {
            pos: store.positions[i],
            dir,
            plane: dir.perpendicular() * self.fov,
            angle: rot.angle,
            h_ratio: fb.width as f32 * board.half_tile() / self.fov,
            half_h: fb.height / 2,
            width: fb.width,
            height: fb.height,
            bob: self.bob.height(tick),
        };

        let settings = &board.settings;
        if settings.wall_fog {
            fb.clear(settings.fog_color);
        } else if settings.back_clip_plane {
            fb.clear(Color::BLACK);
        } else {
            fb.zbuffer.fill(f32::MAX);
        }

        self.draw_background(fb, board, &view);
        self.draw_flat(fb, board, &view, Surface::Floor);
        self.draw_flat(fb, board, &view, Surface::Ceiling);
        self.draw_walls(fb, board, &view, tick);
        Self::draw_particles(fb, board, particles, &view);
    }

    fn draw_background(&self, fb: &mut Framebuffer, board: &Board, view: &View) {
        let settings = &board.settings;
        let Some(bg) = self.background.as_ref() else { return };
        if !settings.background_top && !settings.background_bottom {
            return;
        }

        let (src_y, src_h, dst_y, dst_h) = match (settings.background_top, settings.background_bottom) {
            (true, true) => (0, bg.height, 0, view.height),
            (true, false) => (0, bg.height / 2, 0, view.half_h),
            _ => (bg.height / 2, bg.height / 2, view.half_h, view.half_h),
        };
        let strip_w = bg.width / 4;
        let angle_deg = view.angle.to_degrees() as i32;

        for strip in 0..4 {
            let Some(dst_x) = background_strip_x(angle_deg, strip, view.width) else { continue };
            fb.blit_scaled(
                bg,
                strip as usize * strip_w, src_y, strip_w, src_h,
                dst_x, dst_y as i32, view.width as i32, dst_h as i32,
            );
        }
    }

    /// Floor or ceiling rows. Row `y` rises (or falls) `y / half_h` of a
    /// tile per projected tile of distance, so it crosses the plane at the
    /// depth whose wall edge sits on that row.
    fn draw_flat(&self, fb: &mut Framebuffer, board: &Board, view: &View, surface: Surface) {
        let settings = &board.settings;
        let tile_size = board.tile_size();
        let tex = board.texture_size();
        let z0 = board.half_tile() + view.bob;
        let steps = (settings.draw_distance * RAY_STEPS_PER_UNIT).round().max(0.0) as u32;

        let (textured, fog, fill) = match surface {
            Surface::Floor => (settings.floor_texture, settings.floor_fog, !settings.background_bottom),
            Surface::Ceiling => (settings.ceiling_texture, settings.ceiling_fog, !settings.background_top),
        };
        let color = match surface {
            Surface::Floor => settings.floor_color,
            Surface::Ceiling => settings.ceiling_color,
        };
        let atlas = self.atlas.as_ref().filter(|_| textured);

        for y in 1..=view.half_h {
            let row = match surface {
                Surface::Floor => view.half_h + y - 1,
                Surface::Ceiling => view.half_h - y,
            };
            let z_inc = 2.0 * board.half_tile() * y as f32 / view.h_ratio;

            let crossing = (1..=steps).map(|n| n as f32 / RAY_STEPS_PER_UNIT).find(|&dist| match surface {
                Surface::Floor => z0 - z_inc * dist < 0.0,
                Surface::Ceiling => z0 + z_inc * dist > tile_size,
            });
            let Some(dist) = crossing else { continue };
            let center = view.pos + view.dir * dist;

            if fill {
                fb.fill_row(row, color);
            }

            if let Some(atlas) = atlas {
                for i in 0..view.width {
                    let x = -1.0 + 2.0 * i as f32 / view.width as f32;
                    let world = center + view.plane * (dist * x);
                    let tile = board.tile_at_pos(world.x, world.y);
                    if tile.has(TileFlags::OCCLUSION) {
                        continue;
                    }

                    let u = (world.x * tex as f32 / tile_size).floor() as i32;
                    let v = (world.y * tex as f32 / tile_size).floor() as i32;
                    fb.set_pixel(i, row, atlas.atlas_texel(tile.graphic(), tex, u, v));

                    if settings.light_enable {
                        let level = board.brightness_at_pos(world.x, world.y);
                        fb.set_pixel_alpha(i, row, Color::BLACK, 255 - level);
                    }
                }
            }

            if fog {
                fb.blend_row(row, settings.fog_color, fog_alpha(dist, settings.fog_distance));
            }
        }
    }

    fn draw_walls(&self, fb: &mut Framebuffer, board: &Board, view: &View, tick: u32) {
        let settings = &board.settings;
        let tile_size = board.tile_size();
        let tex = board.texture_size() as i32;
        let wave_h = tex / 16;
        let wave_w = 360 / tex.max(1);
        let atlas = self.atlas.as_ref().filter(|_| settings.wall_texture);

        for i in 0..view.width {
            let hit = cast_ray(board, view.pos, view.column_dir(i), settings.draw_distance, TileFlags::OCCLUSION);
            let Some(tile) = hit.tile else { continue };

            let scale = view.h_ratio / hit.dist;
            let height = (scale as i32) & !1;
            if height <= 0 {
                continue;
            }

            let mut offset = view.bob * scale / tile_size;
            if settings.underwater {
                let phase = (i as f32 + tick as f32 * UNDERWATER_WAVE_SPEED + view.angle) as i32;
                let deg = (phase * UNDERWATER_WAVE_WIDTH).rem_euclid(360) as f32;
                offset += deg.to_radians().sin() * UNDERWATER_WAVE_HEIGHT;
            }
            let top = view.half_h as i32 - height / 2 + offset as i32;

            let src_x = ((((hit.pos.x + hit.pos.y) / tile_size) * tex as f32) as i32).rem_euclid(tex);
            let (src_y, src_h) = if tile.has(TileFlags::LIQUID) {
                let deg = ((tick as f32 * LIQUID_WAVE_SPEED) as i32 + src_x * wave_w).rem_euclid(360) as f32;
                let wave = deg.to_radians().sin() * wave_h as f32 + wave_h as f32;
                (wave as i32, tex - wave_h * 2)
            } else {
                (0, tex)
            };

            // Shade with the open tile the ray left, not the wall itself
            let level = settings
                .light_enable
                .then(|| board.brightness_at_pos(hit.prev.x, hit.prev.y));
            let fog = settings.wall_fog.then(|| fog_alpha(hit.dist, settings.fog_distance));

            let y0 = top.max(0);
            let y1 = (top + height).min(view.height as i32);
            for y in y0..y1 {
                let mut color = match atlas {
                    Some(atlas) => {
                        let v = src_y + (y - top) * src_h / height;
                        atlas.atlas_texel(tile.graphic(), tex as usize, src_x, v)
                    }
                    None => settings.wall_color,
                };
                if let Some(level) = level {
                    color = color.modulate(level);
                }
                if let Some(alpha) = fog {
                    color = color.blend(settings.fog_color, alpha);
                }
                fb.set_pixel(i, y as usize, color);
                fb.set_depth(i, y as usize, hit.dist);
            }
        }
    }

    /// Particles sit at eye height; project each through the camera basis
    /// and keep the pixels nearer than the wall behind them
    fn draw_particles(fb: &mut Framebuffer, board: &Board, particles: &ParticlePool, view: &View) {
        let det = view.dir.x * view.plane.y - view.plane.x * view.dir.y;
        if det.abs() < f32::EPSILON {
            return;
        }
        let tile_size = board.tile_size();

        for p in particles.iter() {
            let rel = p.origin - view.pos;
            let depth = (view.plane.y * rel.x - view.plane.x * rel.y) / det;
            if depth <= NEAR_PLANE || depth >= board.settings.draw_distance {
                continue;
            }
            let lateral = (view.dir.x * rel.y - view.dir.y * rel.x) / det;

            let scale = view.h_ratio / depth;
            let sx = ((lateral / depth + 1.0) * view.width as f32 / 2.0) as i32;
            let sy = view.half_h as i32 + (view.bob * scale / tile_size) as i32;
            let size = ((scale / tile_size) as i32).clamp(1, MAX_PARTICLE_SIZE);

            for dy in 0..size {
                for dx in 0..size {
                    let px = sx + dx - size / 2;
                    let py = sy + dy - size / 2;
                    if px >= 0 && py >= 0 {
                        fb.set_pixel_with_depth(px as usize, py as usize, depth, p.color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::components::Rotation;
    use crate::world::{board_from_ascii, BoardSettings, Legend, DRAW_DISTANCE};

    fn room(settings: BoardSettings) -> Board {
        board_from_ascii("
#####
#...#
#...#
#...#
#####
", &Legend::default(), settings)
        .unwrap()
    }

    /// Camera at the center of tile (2, 2), facing up
    fn camera(store: &mut EntityStore) -> Entity {
        let e = store.spawn(Shape::POSITION | Shape::ROTATION).unwrap();
        store.positions[e.index()] = Vec2::new(40.0, 40.0);
        e
    }

    /// 64x64 graphic whose texel (u, v) is (u * 4, v * 4, blue)
    fn gradient(blue: u8) -> Texture {
        let mut tex = Texture::new(64, 64);
        for v in 0..64 {
            for u in 0..64 {
                tex.pixels[v * 64 + u] = Color::new(u as u8 * 4, v as u8 * 4, blue);
            }
        }
        tex
    }

    /// Floor, wall and liquid graphics, told apart by their blue channel
    fn gradient_atlas() -> Texture {
        Texture::stack(&[gradient(0), gradient(64), gradient(128)]).unwrap()
    }

    fn flat_settings() -> BoardSettings {
        BoardSettings {
            wall_fog: false,
            floor_fog: false,
            ceiling_fog: false,
            light_enable: false,
            ..BoardSettings::default()
        }
    }

    #[test]
    fn test_ray_down_long_corridor_stops_at_draw_distance() {
        let mut map = String::from("###\n");
        for _ in 0..23 {
            map.push_str("#.#\n");
        }
        map.push_str("###\n");
        let board = board_from_ascii(&map, &Legend::default(), BoardSettings::default()).unwrap();
        assert_eq!(board.height, 25);

        let down = Rotation::from_angle(-std::f32::consts::FRAC_PI_2).dir();
        let hit = cast_ray(&board, Vec2::new(24.0, 24.0), down, DRAW_DISTANCE, TileFlags::OCCLUSION);
        assert_eq!(hit.tile, None);
        assert_eq!(hit.dist, 320.0);
    }

    #[test]
    fn test_ray_stops_on_first_occluding_sample() {
        let board = board_from_ascii("#.#\n#.#\n#.#\n#.#\n###\n", &Legend::default(), BoardSettings::default()).unwrap();
        let hit = cast_ray(&board, Vec2::new(24.0, 24.0), Vec2::new(0.0, 1.0), DRAW_DISTANCE, TileFlags::OCCLUSION);

        assert_eq!(hit.dist, 40.0);
        assert!(hit.tile.is_some_and(|t| t.has(TileFlags::OCCLUSION)));
        assert!(hit.prev.y < 64.0);
    }

    #[test]
    fn test_camera_bob_eases_in_and_out() {
        let mut bob = CameraBob::default();
        for _ in 0..5 {
            bob.update(true);
        }
        assert!((bob.z_factor - 0.375).abs() < 1e-5);
        assert_eq!(bob.height(0), 0.0);
        assert!(bob.height(7) > 0.0);

        for _ in 0..10 {
            bob.update(false);
        }
        assert_eq!(bob.z_factor, 0.0);
        assert_eq!(bob.height(7), 0.0);
    }

    #[test]
    fn test_background_strips_scroll_with_angle() {
        let visible: Vec<Option<i32>> = (0..4).map(|s| background_strip_x(90, s, 320)).collect();
        assert_eq!(visible, vec![Some(0), None, None, None]);

        // 45 degrees: two strips share the screen
        assert_eq!(background_strip_x(45, 0, 320), Some(-160));
        assert_eq!(background_strip_x(45, 1, 320), Some(160));
        // Negative angles wrap
        assert_eq!(background_strip_x(-270, 0, 320), Some(0));
    }

    #[test]
    fn test_wall_column_height_and_depth() {
        let board = room(flat_settings());
        let mut store = EntityStore::new().unwrap();
        let cam = camera(&mut store);
        let particles = ParticlePool::new(0).unwrap();
        let mut fb = Framebuffer::new(320, 240);
        let mut renderer = Renderer::new(None, None);

        renderer.render(&mut fb, &board, &store, &particles, cam, 0);

        // Wall face at y = 16 is 24 units ahead; first sample inside is 24.1
        let dist = fb.depth_at(160, 120);
        assert!((dist - 24.1).abs() < 1e-3);
        assert_eq!(fb.get_pixel(160, 120), Color::GRAY);
        // 2560 / 24.1 = 106 rows tall, centered on the horizon
        assert_eq!(fb.depth_at(160, 67), dist);
        assert_eq!(fb.depth_at(160, 66), f32::MAX);
        assert_eq!(fb.get_pixel(160, 0), Color::DARK_BLUE);
        assert_eq!(fb.get_pixel(160, 239), Color::DARK_GRAY);
    }

    #[test]
    fn test_particles_are_depth_tested_against_walls() {
        let board = room(flat_settings());
        let mut store = EntityStore::new().unwrap();
        let cam = camera(&mut store);
        let mut particles = ParticlePool::new(0).unwrap();
        let mut fb = Framebuffer::new(320, 240);
        let mut renderer = Renderer::new(None, None);

        // Behind the north wall
        particles.spawn(Vec2::new(40.0, -20.0), Vec2::ZERO, Vec2::ZERO, Color::YELLOW, Color::YELLOW, 10);
        renderer.render(&mut fb, &board, &store, &particles, cam, 0);
        assert_eq!(fb.get_pixel(160, 120), Color::GRAY);

        // In front of it
        particles.spawn(Vec2::new(40.0, 30.0), Vec2::ZERO, Vec2::ZERO, Color::PURPLE, Color::PURPLE, 10);
        renderer.render(&mut fb, &board, &store, &particles, cam, 0);
        assert_eq!(fb.get_pixel(160, 120), Color::PURPLE);
        assert!((fb.depth_at(160, 120) - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_fog_and_light_darken_walls() {
        let mut board = room(BoardSettings::default());
        crate::game::lighting::light_board(&mut board).unwrap();
        let mut store = EntityStore::new().unwrap();
        let cam = camera(&mut store);
        let particles = ParticlePool::new(0).unwrap();
        let mut fb = Framebuffer::new(320, 240);
        let mut renderer = Renderer::new(None, None);

        renderer.render(&mut fb, &board, &store, &particles, cam, 0);
        let lit = fb.get_pixel(160, 120);
        assert!(lit.r < Color::GRAY.r);
        assert_ne!(lit, Color::BLACK);
    }

    #[test]
    fn test_camera_without_rotation_renders_black() {
        let board = room(flat_settings());
        let mut store = EntityStore::new().unwrap();
        let cam = store.spawn(Shape::POSITION).unwrap();
        let particles = ParticlePool::new(0).unwrap();
        let mut fb = Framebuffer::new(32, 24);
        fb.clear(Color::WHITE);

        Renderer::new(None, None).render(&mut fb, &board, &store, &particles, cam, 0);
        assert_eq!(fb.get_pixel(5, 5), Color::BLACK);
    }

    #[test]
    fn test_bob_advances_once_per_tick() {
        let board = room(flat_settings());
        let mut store = EntityStore::new().unwrap();
        let cam = store.spawn(Shape::POSITION | Shape::ROTATION | Shape::FORCE).unwrap();
        store.positions[cam.index()] = Vec2::new(40.0, 40.0);
        store.forces[cam.index()].x = 0.25;
        let particles = ParticlePool::new(0).unwrap();
        let mut fb = Framebuffer::new(32, 24);
        let mut renderer = Renderer::new(None, None);

        renderer.render(&mut fb, &board, &store, &particles, cam, 5);
        renderer.render(&mut fb, &board, &store, &particles, cam, 5);
        assert!((renderer.bob().z_factor - 0.075).abs() < 1e-5);

        renderer.render(&mut fb, &board, &store, &particles, cam, 8);
        assert!((renderer.bob().z_factor - 0.3).abs() < 1e-5);
    }

    #[test]
    fn test_floor_row_samples_atlas_texel() {
        let board = room(flat_settings());
        let mut store = EntityStore::new().unwrap();
        let cam = camera(&mut store);
        store.positions[cam.index()] = Vec2::new(41.1, 40.0);
        let particles = ParticlePool::new(0).unwrap();
        let mut fb = Framebuffer::new(320, 240);
        let mut renderer = Renderer::new(Some(gradient_atlas()), None);

        renderer.render(&mut fb, &board, &store, &particles, cam, 0);

        // Row 215 crosses the floor 13.4 ahead, at world (41.1, 26.6):
        // texel (164 mod 64, 106 mod 64) of graphic 0
        assert_eq!(fb.get_pixel(160, 215), Color::new(144, 168, 0));
    }

    #[test]
    fn test_lit_floor_is_darkened_by_brightness() {
        let mut board = room(BoardSettings { light_enable: true, ..flat_settings() });
        board.brightness.fill(64);
        let mut store = EntityStore::new().unwrap();
        let cam = camera(&mut store);
        store.positions[cam.index()] = Vec2::new(41.1, 40.0);
        let particles = ParticlePool::new(0).unwrap();
        let mut fb = Framebuffer::new(320, 240);
        let mut renderer = Renderer::new(Some(gradient_atlas()), None);

        renderer.render(&mut fb, &board, &store, &particles, cam, 0);

        // Black at alpha 255 - 64 over texel (144, 168, 0)
        assert_eq!(fb.get_pixel(160, 215), Color::new(36, 42, 0));
    }

    #[test]
    fn test_liquid_wall_waterline_moves_with_tick() {
        let liquid = board_from_ascii("
#~~~#
#...#
#...#
#...#
#####
", &Legend::default(), flat_settings())
        .unwrap();
        let solid = room(flat_settings());
        let mut store = EntityStore::new().unwrap();
        let cam = camera(&mut store);
        store.positions[cam.index()] = Vec2::new(41.0, 40.0);
        let particles = ParticlePool::new(0).unwrap();
        let mut fb = Framebuffer::new(320, 240);
        let mut renderer = Renderer::new(Some(gradient_atlas()), None);

        // Hit at (41, 15.9): texture column 227 mod 64 = 35, top row 67
        renderer.render(&mut fb, &solid, &store, &particles, cam, 0);
        assert_eq!(fb.get_pixel(160, 67), Color::new(140, 0, 64));

        // Tick 0: wave phase 175 degrees, the top row starts 4 texels down
        renderer.render(&mut fb, &liquid, &store, &particles, cam, 0);
        let calm = fb.get_pixel(160, 67);
        assert_eq!(calm, Color::new(140, 16, 128));

        // Tick 18: phase 265 degrees, the wave is at its lowest
        renderer.render(&mut fb, &liquid, &store, &particles, cam, 18);
        let trough = fb.get_pixel(160, 67);
        assert_eq!(trough, Color::new(140, 0, 128));
        assert_ne!(calm, trough);
    }

    #[test]
    fn test_underwater_shifts_wall_columns() {
        let board = room(BoardSettings { underwater: true, ..flat_settings() });
        let mut store = EntityStore::new().unwrap();
        let cam = camera(&mut store);
        let particles = ParticlePool::new(0).unwrap();
        let mut fb = Framebuffer::new(320, 240);
        let mut renderer = Renderer::new(None, None);

        renderer.render(&mut fb, &board, &store, &particles, cam, 0);

        // Column 160 at tick 0: phase 161, 644 mod 360 = 284 degrees,
        // an offset of -1.94 that truncates to one row up
        let dist = fb.depth_at(160, 120);
        assert!((dist - 24.1).abs() < 1e-3);
        assert_eq!(fb.depth_at(160, 66), dist);
        assert_eq!(fb.depth_at(160, 171), dist);
        assert_eq!(fb.depth_at(160, 172), f32::MAX);
    }

    #[test]
    fn test_background_strip_fills_top_half() {
        let colors = [Color::RED, Color::GREEN, Color::BLUE, Color::YELLOW];
        let mut background = Texture::new(32, 16);
        for y in 0..16 {
            for x in 0..32 {
                background.pixels[y * 32 + x] = colors[x / 8];
            }
        }
        let board = room(BoardSettings { background_top: true, ..flat_settings() });
        let mut store = EntityStore::new().unwrap();
        let cam = camera(&mut store);
        let particles = ParticlePool::new(0).unwrap();
        let mut fb = Framebuffer::new(320, 240);
        let mut renderer = Renderer::new(None, Some(background));

        renderer.render(&mut fb, &board, &store, &particles, cam, 0);

        // Facing 90 degrees puts strip 0 across the screen
        assert_eq!(fb.get_pixel(160, 10), Color::RED);
        assert_eq!(fb.get_pixel(20, 60), Color::RED);
        // The floor keeps its fill
        assert_eq!(fb.get_pixel(160, 239), Color::DARK_GRAY);
    }
}
