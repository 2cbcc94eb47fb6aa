//! ASCII board builder
//!
//! Stands in for a map loader: each character of a text grid is looked up in
//! a legend of tile symbols, and a few reserved characters drop spawn objects
//! on an open floor tile.
//!
//! ```text
//! #####
//! #@.*#
//! #####
//! ```

use super::board::{Board, BoardError, BoardSettings, Object, ObjectKind};
use super::tile::{Tile, TileFlags};

/// Player spawn, facing up
pub const PLAYER_SYMBOL: char = '@';
pub const LIGHT_SYMBOL: char = '*';
pub const PATROLLER_SYMBOL: char = 'p';

const DEFAULT_LIGHT_BRIGHTNESS: i32 = 200;
const DEFAULT_LIGHT_RANGE: f32 = 6.0;
const DEFAULT_PLAYER_ANGLE: f32 = 90.0;

/// Character to tile mapping
#[derive(Debug, Clone)]
pub struct Legend {
    symbols: Vec<(char, Tile)>,
    /// Tile placed under spawn objects
    pub floor: Tile,
}

impl Default for Legend {
    fn default() -> Self {
        let wall = TileFlags::OBSTACLE | TileFlags::OCCLUSION;
        Self {
            symbols: vec![
                ('.', Tile::new(0, TileFlags::NONE)),
                ('#', Tile::new(1, wall)),
                ('~', Tile::new(2, wall | TileFlags::LIQUID)),
                ('+', Tile::new(3, wall)),
                // Low barrier: blocks movement, not light
                ('=', Tile::new(3, TileFlags::OBSTACLE)),
            ],
            floor: Tile::new(0, TileFlags::NONE),
        }
    }
}

impl Legend {
    pub fn with(mut self, symbol: char, tile: Tile) -> Self {
        self.symbols.retain(|(c, _)| *c != symbol);
        self.symbols.push((symbol, tile));
        self
    }

    pub fn lookup(&self, symbol: char) -> Option<Tile> {
        self.symbols.iter().find(|(c, _)| *c == symbol).map(|&(_, t)| t)
    }
}

/// Build a board from rows of text. Blank leading/trailing lines are skipped.
pub fn board_from_ascii(map: &str, legend: &Legend, settings: BoardSettings) -> Result<Board, BoardError> {
    let rows: Vec<&str> = map
        .lines()
        .map(str::trim_end)
        .skip_while(|l| l.is_empty())
        .collect();
    let rows: Vec<&str> = match rows.iter().rposition(|l| !l.is_empty()) {
        Some(last) => rows[..=last].to_vec(),
        None => Vec::new(),
    };

    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.chars().count());
    if width == 0 || height == 0 {
        return Err(BoardError::ZeroSize { width, height });
    }

    let mut tiles = Vec::with_capacity(width * height);
    let mut objects = Vec::new();

    for (y, row) in rows.iter().enumerate() {
        let actual = row.chars().count();
        if actual != width {
            return Err(BoardError::RaggedRow { row: y, expected: width, actual });
        }

        for (x, symbol) in row.chars().enumerate() {
            let kind = match symbol {
                PLAYER_SYMBOL => Some(ObjectKind::Player { angle: DEFAULT_PLAYER_ANGLE }),
                LIGHT_SYMBOL => Some(ObjectKind::Light {
                    brightness: DEFAULT_LIGHT_BRIGHTNESS,
                    range: DEFAULT_LIGHT_RANGE,
                }),
                PATROLLER_SYMBOL => Some(ObjectKind::Patroller),
                _ => None,
            };

            let tile = match kind {
                Some(kind) => {
                    objects.push(Object { x: x as i32, y: y as i32, kind });
                    legend.floor
                }
                None => legend
                    .lookup(symbol)
                    .ok_or(BoardError::UnknownSymbol { symbol, x, y })?,
            };
            tiles.push(tile);
        }
    }

    Board::new(width, height, tiles, objects, settings)
}

/// Board shown by the demo binary
pub const DEMO_MAP: &str = "
################################
#..............#...............#
#..@...........#.......*.......#
#..............+...............#
#.......*......#.......p.......#
#..............#...............#
###+####..######=====###########
#......#..#....................#
#..*...#..#.......~~~~~........#
#......#..#.......~~~~~........#
#.........#.......~~~~~...*....#
#......#..#....................#
#......#..#.....p..............#
###..###..######################
#..............................#
#.....*.........+.........*....#
#..............................#
################################
";

pub fn demo_board() -> Result<Board, BoardError> {
    board_from_ascii(DEMO_MAP, &Legend::default(), BoardSettings::default())
}
