//! Packed tile records
//!
//! A tile is 16 bits: the low 8 are flags, the high 8 index into the
//! texture atlas.

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Number of low bits reserved for flags
pub const TILE_FLAG_BITS: u16 = 8;

/// Per-tile property bitset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TileFlags(pub u8);

impl TileFlags {
    pub const NONE: TileFlags = TileFlags(0);
    /// Blocks entity movement
    pub const OBSTACLE: TileFlags = TileFlags(1 << 0);
    pub const PARTIAL_OBSTACLE: TileFlags = TileFlags(1 << 1);
    /// Blocks light and wall rays
    pub const OCCLUSION: TileFlags = TileFlags(1 << 2);
    pub const PARTIAL_OCCLUSION: TileFlags = TileFlags(1 << 3);
    /// Animated waterline on walls
    pub const LIQUID: TileFlags = TileFlags(1 << 4);
    pub const TOGGLE: TileFlags = TileFlags(1 << 5);
    pub const RESERVED: TileFlags = TileFlags(1 << 6);
    /// Reached by a light during the current lighting pass
    pub const LIT: TileFlags = TileFlags(1 << 7);

    pub const fn contains(self, other: TileFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: TileFlags) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for TileFlags {
    type Output = TileFlags;
    fn bitor(self, rhs: TileFlags) -> TileFlags {
        TileFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for TileFlags {
    fn bitor_assign(&mut self, rhs: TileFlags) {
        self.0 |= rhs.0;
    }
}

/// A single map cell: graphic index plus flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Tile(pub u16);

impl Tile {
    /// Returned for every read outside the map
    pub const BOUNDARY: Tile = Tile::new(0, TileFlags(TileFlags::OBSTACLE.0 | TileFlags::OCCLUSION.0));

    pub const fn new(graphic: u8, flags: TileFlags) -> Self {
        Tile(((graphic as u16) << TILE_FLAG_BITS) | flags.0 as u16)
    }

    pub const fn graphic(self) -> u16 {
        self.0 >> TILE_FLAG_BITS
    }

    pub const fn flags(self) -> TileFlags {
        TileFlags((self.0 & 0xFF) as u8)
    }

    pub const fn has(self, flags: TileFlags) -> bool {
        self.flags().intersects(flags)
    }

    pub fn insert(&mut self, flags: TileFlags) {
        self.0 |= flags.0 as u16;
    }

    pub fn remove(&mut self, flags: TileFlags) {
        self.0 &= !(flags.0 as u16);
    }
}
