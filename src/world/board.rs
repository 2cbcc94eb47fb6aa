//! Board: the tile grid, its brightness grid, spawn objects and per-map
//! rendering settings
//!
//! A board is built once (by a loader or the ASCII builder) and then only the
//! lighting pass mutates it: brightness values and the transient LIT flag.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tile::{Tile, TileFlags};
use crate::error::{alloc_slots, AllocError};
use crate::rasterizer::Color;

/// Default tile edge in world units
pub const TILE_SIZE: u32 = 16;
/// Default texture edge in texels
pub const TEXTURE_SIZE: u32 = 64;
pub const MIN_LIGHT: u8 = 64;
pub const MAX_LIGHT: u16 = 255;
/// Default ray march limit (20 tiles)
pub const DRAW_DISTANCE: f32 = (TILE_SIZE * 20) as f32;

/// Error type for board construction
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("board size {width}x{height} must be non-zero")]
    ZeroSize { width: usize, height: usize },
    #[error("{grid} grid has {actual} cells, expected {expected}")]
    GridMismatch { grid: &'static str, expected: usize, actual: usize },
    #[error("tile size must be non-zero")]
    ZeroTileSize,
    #[error("texture size must be non-zero")]
    ZeroTextureSize,
    #[error("map row {row} has width {actual}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, actual: usize },
    #[error("unknown map symbol {symbol:?} at ({x}, {y})")]
    UnknownSymbol { symbol: char, x: usize, y: usize },
    #[error(transparent)]
    Alloc(#[from] AllocError),
}

/// Per-map rendering and lighting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    pub wall_texture: bool,
    pub floor_texture: bool,
    pub ceiling_texture: bool,
    pub wall_fog: bool,
    pub floor_fog: bool,
    pub ceiling_fog: bool,
    pub light_enable: bool,
    pub min_light: u8,
    /// Clamped to 255 when the board is built
    pub max_light: u16,
    pub fog_distance: f32,
    pub draw_distance: f32,
    pub back_clip_plane: bool,
    pub background_top: bool,
    pub background_bottom: bool,
    pub tile_size: u32,
    pub texture_size: u32,
    pub wall_color: Color,
    pub floor_color: Color,
    pub ceiling_color: Color,
    pub fog_color: Color,
    pub underwater: bool,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            wall_texture: true,
            floor_texture: true,
            ceiling_texture: true,
            wall_fog: true,
            floor_fog: true,
            ceiling_fog: true,
            light_enable: true,
            min_light: MIN_LIGHT,
            max_light: MAX_LIGHT,
            fog_distance: DRAW_DISTANCE,
            draw_distance: DRAW_DISTANCE,
            back_clip_plane: true,
            background_top: false,
            background_bottom: false,
            tile_size: TILE_SIZE,
            texture_size: TEXTURE_SIZE,
            wall_color: Color::GRAY,
            floor_color: Color::DARK_GRAY,
            ceiling_color: Color::DARK_BLUE,
            fog_color: Color::BLACK,
            underwater: false,
        }
    }
}

/// What a spawn object turns into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Keyboard-controlled camera entity, facing `angle` degrees
    Player { angle: f32 },
    /// Point light fed to the lighting pass
    Light { brightness: i32, range: f32 },
    /// AI-controlled entity that patrols once it stands in the dark
    Patroller,
}

/// Spawn record, positioned in tile coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Object {
    pub x: i32,
    pub y: i32,
    pub kind: ObjectKind,
}

#[derive(Debug, Clone)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    pub tiles: Vec<Tile>,
    /// Same layout as `tiles`, 0-255 per tile
    pub brightness: Vec<u8>,
    pub objects: Vec<Object>,
    pub settings: BoardSettings,
}

impl Board {
    /// Build a board, allocating a zeroed brightness grid
    pub fn new(
        width: usize,
        height: usize,
        tiles: Vec<Tile>,
        objects: Vec<Object>,
        settings: BoardSettings,
    ) -> Result<Self, BoardError> {
        let brightness = alloc_slots("brightness grid", width * height)?;
        Self::from_parts(width, height, tiles, brightness, objects, settings)
    }

    /// Accept an already allocated tile grid and brightness grid
    pub fn from_parts(
        width: usize,
        height: usize,
        tiles: Vec<Tile>,
        brightness: Vec<u8>,
        objects: Vec<Object>,
        mut settings: BoardSettings,
    ) -> Result<Self, BoardError> {
        if width == 0 || height == 0 {
            return Err(BoardError::ZeroSize { width, height });
        }
        let expected = width * height;
        if tiles.len() != expected {
            return Err(BoardError::GridMismatch { grid: "tile", expected, actual: tiles.len() });
        }
        if brightness.len() != expected {
            return Err(BoardError::GridMismatch {
                grid: "brightness",
                expected,
                actual: brightness.len(),
            });
        }
        if settings.tile_size == 0 {
            return Err(BoardError::ZeroTileSize);
        }
        if settings.texture_size == 0 {
            return Err(BoardError::ZeroTextureSize);
        }
        settings.max_light = settings.max_light.min(255);

        log::info!(
            "Board {}x{} accepted ({} objects, tile {} / texture {})",
            width, height, objects.len(), settings.tile_size, settings.texture_size
        );

        Ok(Self { width, height, tiles, brightness, objects, settings })
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y).then(|| y as usize * self.width + x as usize)
    }

    /// Tile at map coordinates; outside the map reads as a solid boundary
    #[inline]
    pub fn tile(&self, x: i32, y: i32) -> Tile {
        self.index(x, y).map_or(Tile::BOUNDARY, |i| self.tiles[i])
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        self.index(x, y).map(move |i| &mut self.tiles[i])
    }

    /// Map coordinates containing a world position (floor division)
    #[inline]
    pub fn tile_coords(&self, wx: f32, wy: f32) -> (i32, i32) {
        let ts = self.tile_size();
        ((wx / ts).floor() as i32, (wy / ts).floor() as i32)
    }

    /// Tile containing a world position
    #[inline]
    pub fn tile_at_pos(&self, wx: f32, wy: f32) -> Tile {
        let (x, y) = self.tile_coords(wx, wy);
        self.tile(x, y)
    }

    #[inline]
    pub fn has_flag_at_pos(&self, wx: f32, wy: f32, flags: TileFlags) -> bool {
        self.tile_at_pos(wx, wy).has(flags)
    }

    /// Brightness at map coordinates, 0 outside the map
    #[inline]
    pub fn brightness(&self, x: i32, y: i32) -> u8 {
        self.index(x, y).map_or(0, |i| self.brightness[i])
    }

    #[inline]
    pub fn brightness_at_pos(&self, wx: f32, wy: f32) -> u8 {
        let (x, y) = self.tile_coords(wx, wy);
        self.brightness(x, y)
    }

    #[inline]
    pub fn tile_size(&self) -> f32 {
        self.settings.tile_size as f32
    }

    #[inline]
    pub fn half_tile(&self) -> f32 {
        (self.settings.tile_size / 2) as f32
    }

    #[inline]
    pub fn texture_size(&self) -> usize {
        self.settings.texture_size as usize
    }

    /// Effective max light after clamping
    #[inline]
    pub fn max_light(&self) -> u8 {
        self.settings.max_light.min(255) as u8
    }

    /// World-space center of a tile
    pub fn tile_center(&self, x: i32, y: i32) -> (f32, f32) {
        let ts = self.tile_size();
        let half = self.half_tile();
        (x as f32 * ts + half, y as f32 * ts + half)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_board(w: usize, h: usize) -> Board {
        Board::new(w, h, vec![Tile::default(); w * h], Vec::new(), BoardSettings::default()).unwrap()
    }

    #[test]
    fn test_out_of_bounds_is_boundary() {
        let board = open_board(3, 3);
        assert_eq!(board.tile(-1, 0), Tile::BOUNDARY);
        assert_eq!(board.tile(3, 1), Tile::BOUNDARY);
        assert_eq!(board.tile(1, 1), Tile::default());
    }

    #[test]
    fn test_tile_at_pos_floors_negative_coordinates() {
        let board = open_board(3, 3);
        assert_eq!(board.tile_coords(-0.5, 17.0), (-1, 1));
        assert!(board.has_flag_at_pos(-0.5, 8.0, TileFlags::OBSTACLE));
        assert!(!board.has_flag_at_pos(0.5, 8.0, TileFlags::OBSTACLE));
    }

    #[test]
    fn test_rejects_mismatched_grids() {
        let err = Board::new(2, 2, vec![Tile::default(); 3], Vec::new(), BoardSettings::default());
        assert!(matches!(err, Err(BoardError::GridMismatch { grid: "tile", expected: 4, actual: 3 })));

        let err = Board::from_parts(2, 2, vec![Tile::default(); 4], vec![0; 5], Vec::new(), BoardSettings::default());
        assert!(matches!(err, Err(BoardError::GridMismatch { grid: "brightness", .. })));

        let err = Board::new(0, 2, Vec::new(), Vec::new(), BoardSettings::default());
        assert!(matches!(err, Err(BoardError::ZeroSize { .. })));
    }

    #[test]
    fn test_max_light_is_clamped() {
        let settings = BoardSettings { max_light: 400, ..BoardSettings::default() };
        let board = Board::new(1, 1, vec![Tile::default()], Vec::new(), settings).unwrap();
        assert_eq!(board.settings.max_light, 255);
        assert_eq!(board.max_light(), 255);
    }

    #[test]
    fn test_settings_parse_from_ron() {
        let settings: BoardSettings =
            ron::from_str("(draw_distance: 160.0, fog_color: (r: 10, g: 20, b: 30))").unwrap();
        assert_eq!(settings.draw_distance, 160.0);
        assert_eq!(settings.fog_color, Color::new(10, 20, 30));
        assert_eq!(settings.tile_size, TILE_SIZE);
    }
}
