//! Overhead View
//!
//! Top-down debug rendering of the simulation, centered on the camera
//! entity: tiles, entity hitboxes, shot tracers, particles and a crosshair.

use super::components::{CollidableKind, ControlType, VisibleKind};
use super::entity::{Entity, Shape};
use super::particles::{ParticlePool, FIRE_COLOR_START};
use super::store::EntityStore;
use crate::rasterizer::{Color, Framebuffer, Texture, Vec2};
use crate::world::{Board, TileFlags};

const CROSSHAIR_LENGTH: i32 = 6;
const CROSSHAIR_DISTANCE: f32 = 50.0;
/// Facing line length for entities without a tile hitbox
const DEFAULT_FACING_LENGTH: f32 = 10.0;

/// A shot from `from` to where it hit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tracer {
    pub from: Vec2,
    pub to: Vec2,
}

/// Everything the overhead view draws besides the board and entities
pub struct OverheadScene<'a> {
    pub particles: &'a ParticlePool,
    pub tracers: &'a [Tracer],
    /// Pointer in logical screen coordinates
    pub pointer: Vec2,
    pub tick: u32,
}

/// Screen offset that puts `camera` in the middle of the buffer
pub fn view_offset(store: &EntityStore, camera: Entity, width: usize, height: usize) -> Vec2 {
    let center = Vec2::new((width / 2) as f32, (height / 2) as f32);
    if store.matches(camera.index(), Shape::POSITION) {
        let pos = store.positions[camera.index()];
        Vec2::new((center.x - pos.x).floor(), (center.y - pos.y).floor())
    } else {
        center
    }
}

/// Crosshair arm gap, pulsing over 32 ticks
pub fn crosshair_gap(tick: u32) -> i32 {
    8 - (tick % 32) as i32 / 4
}

#[inline]
fn to_screen(p: Vec2, offset: Vec2) -> (i32, i32) {
    ((p.x + offset.x).floor() as i32, (p.y + offset.y).floor() as i32)
}

pub fn render_overhead(
    fb: &mut Framebuffer,
    board: &Board,
    atlas: Option<&Texture>,
    store: &EntityStore,
    camera: Entity,
    scene: &OverheadScene,
) {
    fb.clear(Color::BLACK);
    let offset = view_offset(store, camera, fb.width, fb.height);

    draw_board(fb, board, atlas, offset);
    draw_visible(fb, board, store, offset);

    for tracer in scene.tracers {
        let (x0, y0) = to_screen(tracer.from, offset);
        let (x1, y1) = to_screen(tracer.to, offset);
        fb.draw_line(x0, y0, x1, y1, FIRE_COLOR_START);
    }

    for p in scene.particles.iter() {
        let (x, y) = to_screen(p.origin, offset);
        if x >= 0 && y >= 0 {
            fb.set_pixel(x as usize, y as usize, p.color);
        }
    }

    draw_crosshair(fb, store, camera, offset, scene.pointer, scene.tick);
}

fn draw_board(fb: &mut Framebuffer, board: &Board, atlas: Option<&Texture>, offset: Vec2) {
    let ts = board.tile_size();
    let tile = board.settings.tile_size as i32;
    let tex = board.texture_size();

    let min_x = ((-offset.x / ts).floor() as i32).max(0);
    let min_y = ((-offset.y / ts).floor() as i32).max(0);
    let max_x = (((-offset.x + fb.width as f32) / ts) as i32 + 1).min(board.width as i32);
    let max_y = (((-offset.y + fb.height as f32) / ts) as i32 + 1).min(board.height as i32);

    for y in min_y..max_y {
        let dst_y = y * tile + offset.y as i32;
        for x in min_x..max_x {
            let dst_x = x * tile + offset.x as i32;
            let t = board.tile(x, y);

            match atlas {
                Some(atlas) => {
                    fb.blit_scaled(atlas, 0, t.graphic() as usize * tex, tex, tex, dst_x, dst_y, tile, tile);
                }
                None => {
                    let color = if t.has(TileFlags::OBSTACLE) {
                        board.settings.wall_color
                    } else {
                        board.settings.floor_color
                    };
                    fb.draw_filled_rect_alpha(dst_x, dst_y, dst_x + tile - 1, dst_y + tile - 1, color, 255);
                }
            }

            if board.settings.light_enable {
                let shade = 255 - board.brightness(x, y);
                fb.draw_filled_rect_alpha(dst_x, dst_y, dst_x + tile - 1, dst_y + tile - 1, Color::BLACK, shade);
            }
        }
    }
}

fn draw_visible(fb: &mut Framebuffer, board: &Board, store: &EntityStore, offset: Vec2) {
    let half = board.half_tile();
    let ts = board.tile_size();

    for entity in store.with(Shape::POSITION | Shape::VISIBLE) {
        let i = entity.index();
        let shape = store.shapes[i];
        let pos = store.positions[i];
        let visible = store.visibles[i];

        match visible.kind {
            VisibleKind::Hitbox => {
                if !shape.has(Shape::COLLIDABLE) {
                    continue;
                }
                let mut length = DEFAULT_FACING_LENGTH;
                if store.collidables[i].kind == CollidableKind::Tile {
                    length = ts;
                    let (x0, y0) = to_screen(pos - Vec2::new(half, half), offset);
                    let size = ts as i32 - 1;
                    fb.draw_rect(x0, y0, x0 + size, y0 + size, visible.color);
                }
                if shape.has(Shape::ROTATION) {
                    let (x0, y0) = to_screen(pos, offset);
                    let (x1, y1) = to_screen(pos + store.rotations[i].dir() * length, offset);
                    fb.draw_line(x0, y0, x1, y1, visible.color);
                }
            }
            VisibleKind::Dot => {
                let (x, y) = to_screen(pos, offset);
                if x >= 0 && y >= 0 {
                    fb.set_pixel(x as usize, y as usize, visible.color);
                }
            }
        }
    }
}

fn draw_crosshair(fb: &mut Framebuffer, store: &EntityStore, camera: Entity, offset: Vec2, pointer: Vec2, tick: u32) {
    let i = camera.index();
    if !store.matches(i, Shape::POSITION | Shape::ROTATION) {
        return;
    }

    let mouselook = store.shapes[i].has(Shape::CONTROL) && store.controls[i].kind.has(ControlType::MOUSELOOK);
    let (cx, cy) = if mouselook {
        (pointer.x.floor() as i32, pointer.y.floor() as i32)
    } else {
        to_screen(store.positions[i] + store.rotations[i].dir() * CROSSHAIR_DISTANCE, offset)
    };

    let gap = crosshair_gap(tick);
    let reach = CROSSHAIR_LENGTH + gap;
    fb.draw_line(cx - gap, cy, cx - reach, cy, Color::WHITE);
    fb.draw_line(cx + gap, cy, cx + reach, cy, Color::WHITE);
    fb.draw_line(cx, cy - gap, cx, cy - reach, Color::WHITE);
    fb.draw_line(cx, cy + gap, cx, cy + reach, Color::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{board_from_ascii, BoardSettings, Legend};

    fn room() -> Board {
        let settings = BoardSettings { light_enable: false, ..BoardSettings::default() };
        board_from_ascii("
#####
#...#
#...#
#...#
#####
", &Legend::default(), settings)
        .unwrap()
    }

    fn draw(store: &EntityStore, cam: Entity, particles: &ParticlePool, tracers: &[Tracer], pointer: Vec2) -> Framebuffer {
        let board = room();
        let mut fb = Framebuffer::new(320, 240);
        let scene = OverheadScene { particles, tracers, pointer, tick: 0 };
        render_overhead(&mut fb, &board, None, store, cam, &scene);
        fb
    }

    #[test]
    fn test_view_offset_centers_camera() {
        let mut store = EntityStore::new().unwrap();
        let cam = store.spawn_player(2, 2, 90.0, Color::GREEN, 16.0).unwrap();
        assert_eq!(view_offset(&store, cam, 320, 240), Vec2::new(120.0, 80.0));
    }

    #[test]
    fn test_crosshair_gap_pulses() {
        assert_eq!(crosshair_gap(0), 8);
        assert_eq!(crosshair_gap(31), 1);
        assert_eq!(crosshair_gap(32), 8);
    }

    #[test]
    fn test_tiles_and_hitbox() {
        let mut store = EntityStore::new().unwrap();
        let cam = store.spawn_player(2, 2, 90.0, Color::GREEN, 16.0).unwrap();
        let particles = ParticlePool::new(0).unwrap();
        let fb = draw(&store, cam, &particles, &[], Vec2::ZERO);

        // Tile (0, 0) is a wall, tile (1, 1) is floor
        assert_eq!(fb.get_pixel(121, 81), Color::GRAY);
        assert_eq!(fb.get_pixel(140, 100), Color::DARK_GRAY);
        // Left edge of the player's hitbox
        assert_eq!(fb.get_pixel(152, 115), Color::GREEN);
        // Outside the board
        assert_eq!(fb.get_pixel(10, 10), Color::BLACK);
    }

    #[test]
    fn test_tracers_particles_and_mouselook_crosshair() {
        let mut store = EntityStore::new().unwrap();
        let cam = store.spawn_player(2, 2, 90.0, Color::GREEN, 16.0).unwrap();
        let i = cam.index();
        store.controls[i].kind = store.controls[i].kind.with(ControlType::MOUSELOOK);

        let mut particles = ParticlePool::new(0).unwrap();
        particles.spawn(Vec2::new(24.0, 24.0), Vec2::ZERO, Vec2::ZERO, Color::PURPLE, Color::PURPLE, 5);
        let tracers = [Tracer { from: Vec2::new(40.0, 40.0), to: Vec2::new(40.0, 20.0) }];
        let fb = draw(&store, cam, &particles, &tracers, Vec2::new(50.0, 50.0));

        assert_eq!(fb.get_pixel(160, 105), FIRE_COLOR_START);
        assert_eq!(fb.get_pixel(144, 104), Color::PURPLE);
        assert_eq!(fb.get_pixel(42, 50), Color::WHITE);
        assert_eq!(fb.get_pixel(36, 50), Color::WHITE);
        assert_eq!(fb.get_pixel(50, 50), Color::BLACK);
    }

    #[test]
    fn test_lighting_darkens_tiles() {
        let mut board = room();
        board.settings.light_enable = true;
        crate::game::lighting::light_board(&mut board).unwrap();

        let mut store = EntityStore::new().unwrap();
        let cam = store.spawn_player(2, 2, 90.0, Color::GREEN, 16.0).unwrap();
        let particles = ParticlePool::new(0).unwrap();
        let mut fb = Framebuffer::new(320, 240);
        let scene = OverheadScene { particles: &particles, tracers: &[], pointer: Vec2::ZERO, tick: 0 };
        render_overhead(&mut fb, &board, None, &store, cam, &scene);

        let shaded = fb.get_pixel(140, 100);
        assert!(shaded.r < Color::DARK_GRAY.r);
    }
}
