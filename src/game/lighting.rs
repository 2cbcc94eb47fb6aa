//! Tile Lighting
//!
//! Shadow-cast point lights baked into the board's brightness grid. Each
//! light casts integer line rays from its tile to every tile on the
//! perimeter of its bounding square:
//! 1. Brightness resets to `min_light` and the LIT flag is cleared
//! 2. Each ray adds `brightness * (range - dist) / range` to every tile it
//!    reaches, clamped to `max_light`
//! 3. Occluding tiles are lit but stop the ray, as does a pair of occluders
//!    touching diagonally across the step
//!
//! A tile is brightened at most once per light. Contributions only add, so
//! the result does not depend on the order of the lights.

use crate::error::{alloc_slots, AllocError};
use crate::world::{Board, ObjectKind, TileFlags};

/// A point light in tile coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub x: i32,
    pub y: i32,
    pub brightness: i32,
    /// Reach in tiles
    pub range: f32,
}

/// Lights declared in the board's object list
pub fn board_lights(board: &Board) -> Vec<Light> {
    board
        .objects
        .iter()
        .filter_map(|o| match o.kind {
            ObjectKind::Light { brightness, range } => Some(Light { x: o.x, y: o.y, brightness, range }),
            _ => None,
        })
        .collect()
}

/// Relight the board from its own light objects
pub fn light_board(board: &mut Board) -> Result<(), AllocError> {
    let lights = board_lights(board);
    light_board_with(board, &lights)
}

/// Full lighting pass with an explicit light list
pub fn light_board_with(board: &mut Board, lights: &[Light]) -> Result<(), AllocError> {
    let min_light = board.settings.min_light;
    board.brightness.fill(min_light);
    for tile in board.tiles.iter_mut() {
        tile.remove(TileFlags::LIT);
    }

    if !board.settings.light_enable {
        log::debug!("Lighting disabled, board left at minimum light {}", min_light);
        return Ok(());
    }

    let mut visited: Vec<bool> = alloc_slots("light scratch grid", board.width * board.height)?;
    for light in lights {
        if light.range <= 0.0 {
            continue;
        }
        visited.fill(false);
        light_spot(board, light, &mut visited);
    }

    let lit = board.tiles.iter().filter(|t| t.has(TileFlags::LIT)).count();
    log::debug!("Lit board with {} lights, {} of {} tiles reached", lights.len(), lit, board.tiles.len());
    Ok(())
}

/// Cast every ray of one light. `visited` is this light's scratch grid.
fn light_spot(board: &mut Board, light: &Light, visited: &mut [bool]) {
    let max_x = board.width as i32 - 1;
    let max_y = board.height as i32 - 1;
    let reach = |c: i32, r: f32| (c as f32 + r) as i32;

    let x0 = reach(light.x, -light.range).clamp(0, max_x);
    let y0 = reach(light.y, -light.range).clamp(0, max_y);
    let x1 = reach(light.x, light.range).clamp(0, max_x);
    let y1 = reach(light.y, light.range).clamp(0, max_y);

    for (tx, ty) in perimeter(x0, y0, x1, y1) {
        light_ray(board, light, tx, ty, visited);
    }
}

/// Tiles on the border of the square, each once, walking the top row
/// rightwards, the right column down, the bottom row leftwards and the left
/// column up. A square collapsed to a line or point yields its tiles.
pub fn perimeter(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(i32, i32)> {
    if x0 > x1 || y0 > y1 {
        return Vec::new();
    }
    if x0 == x1 || y0 == y1 {
        return (y0..=y1).flat_map(|y| (x0..=x1).map(move |x| (x, y))).collect();
    }

    let mut tiles = Vec::with_capacity(2 * ((x1 - x0) + (y1 - y0)) as usize);
    tiles.extend((x0..x1).map(|x| (x, y0)));
    tiles.extend((y0..y1).map(|y| (x1, y)));
    tiles.extend((x0 + 1..=x1).rev().map(|x| (x, y1)));
    tiles.extend((y0 + 1..=y1).rev().map(|y| (x0, y)));
    tiles
}

/// Integer line walk from the light to `(bx, by)`
fn light_ray(board: &mut Board, light: &Light, bx: i32, by: i32, visited: &mut [bool]) {
    let (ax, ay) = (light.x, light.y);
    let dx = bx - ax;
    let dy = by - ay;
    let dx_abs = dx.abs();
    let dy_abs = dy.abs();
    let x_sign = dx.signum();
    let y_sign = dy.signum();

    let mut err_x = dy_abs / 2;
    let mut err_y = dx_abs / 2;
    let (mut px, mut py) = (ax, ay);

    let x_major = dx_abs > dy_abs;
    let steps = if x_major { dx_abs } else { dy_abs };

    for _ in 0..=steps {
        let dist = (((ax - px) * (ax - px) + (ay - py) * (ay - py)) as f32).sqrt();
        if dist > light.range {
            break;
        }
        if light_tile(board, px, py, light, dist, visited) {
            break;
        }
        // Two occluders meeting at a corner seal it
        if board.tile(px + x_sign, py).has(TileFlags::OCCLUSION)
            && board.tile(px, py + y_sign).has(TileFlags::OCCLUSION)
        {
            break;
        }

        if x_major {
            err_y += dy_abs;
            if err_y >= dx_abs {
                err_y -= dx_abs;
                py += y_sign;
            }
            px += x_sign;
        } else {
            err_x += dx_abs;
            if err_x >= dy_abs {
                err_x -= dy_abs;
                px += x_sign;
            }
            py += y_sign;
        }
    }
}

/// Brighten one tile unless this light already reached it. Returns true
/// when the tile occludes.
fn light_tile(board: &mut Board, x: i32, y: i32, light: &Light, dist: f32, visited: &mut [bool]) -> bool {
    if !board.in_bounds(x, y) {
        return true;
    }
    let i = y as usize * board.width + x as usize;

    if !visited[i] {
        visited[i] = true;
        let gain = (light.range - dist) / light.range * light.brightness as f32;
        let value = (board.brightness[i] as f32 + gain) as i32;
        board.brightness[i] = value.clamp(0, board.max_light() as i32) as u8;
        board.tiles[i].insert(TileFlags::LIT);
    }

    board.tiles[i].has(TileFlags::OCCLUSION)
}
