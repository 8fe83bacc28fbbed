//! Map tiles, positions and the 32×32 dungeon map.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::codec;
use crate::{FormatError, ItemCode};

/// Map width in tiles.
pub const MAP_WIDTH: usize = 32;
/// Map height in tiles.
pub const MAP_HEIGHT: usize = 32;
/// Number of tiles in a fully decoded map.
pub const MAP_TILES: usize = MAP_WIDTH * MAP_HEIGHT;

/// Row-major index of the tile at `(x, y)`.
pub fn map_idx(x: usize, y: usize) -> usize {
    y * MAP_WIDTH + x
}

/// Contents of a single map cell.
///
/// Byte values match the kernel's storage encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileCode {
    /// Floor with a sword on it
    Sword = 0x01,
    /// Floor with a potion on it
    Potion = 0x02,
    /// Empty floor
    Empty = 0x03,
    /// Impassable wall
    Wall = 0x04,
}

impl TileCode {
    /// The item lying on this tile, if any.
    pub fn item(&self) -> Option<ItemCode> {
        match self {
            Self::Sword => Some(ItemCode::SWORD),
            Self::Potion => Some(ItemCode::POTION),
            Self::Empty | Self::Wall => None,
        }
    }

    /// Players can walk on any floor tile.
    pub fn is_walkable(&self) -> bool {
        !matches!(self, Self::Wall)
    }
}

impl TryFrom<u8> for TileCode {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(Self::Sword),
            0x02 => Ok(Self::Potion),
            0x03 => Ok(Self::Empty),
            0x04 => Ok(Self::Wall),
            other => Err(FormatError::UnknownTile(other)),
        }
    }
}

/// A position on the map, both axes in `[0, 31]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    x: u8,
    y: u8,
}

impl Position {
    /// Create a position, rejecting coordinates off the map.
    pub fn new(x: u64, y: u64) -> Result<Self, FormatError> {
        let x = Self::axis("x", x)?;
        let y = Self::axis("y", y)?;
        Ok(Self { x, y })
    }

    fn axis(field: &'static str, value: u64) -> Result<u8, FormatError> {
        if value >= MAP_WIDTH as u64 {
            return Err(FormatError::OutOfRange { field, value });
        }
        Ok(value as u8)
    }

    /// Horizontal coordinate.
    pub fn x(&self) -> u8 {
        self.x
    }

    /// Vertical coordinate.
    pub fn y(&self) -> u8 {
        self.y
    }

    /// Row-major tile index of this position.
    pub fn index(&self) -> usize {
        map_idx(self.x as usize, self.y as usize)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The full dungeon map: exactly [`MAP_TILES`] tiles in row-major order.
///
/// There is no way to build a partially decoded map.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TileCode>", into = "Vec<TileCode>")]
pub struct GameMap {
    tiles: Vec<TileCode>,
}

impl GameMap {
    /// Build a map from already decoded tiles.
    pub fn from_tiles(tiles: Vec<TileCode>) -> Result<Self, FormatError> {
        if tiles.len() != MAP_TILES {
            return Err(FormatError::MapLength(tiles.len()));
        }
        Ok(Self { tiles })
    }

    /// Decode the hex text stored at `/state/map`.
    pub fn from_hex(hex: &str) -> Result<Self, FormatError> {
        let pairs = codec::split_byte_pairs(hex)?;
        if pairs.len() != MAP_TILES {
            return Err(FormatError::MapLength(pairs.len()));
        }
        let tiles = pairs
            .into_iter()
            .map(|pair| codec::decode_byte(pair).and_then(TileCode::try_from))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_tiles(tiles)
    }

    /// Encode back to the stored hex text.
    pub fn to_hex(&self) -> String {
        let bytes: Vec<u8> = self.tiles.iter().map(|tile| *tile as u8).collect();
        codec::encode_bytes(&bytes)
    }

    /// The tile at `(x, y)`, or `None` off the map.
    pub fn tile(&self, x: usize, y: usize) -> Option<TileCode> {
        if x >= MAP_WIDTH || y >= MAP_HEIGHT {
            return None;
        }
        self.tiles.get(map_idx(x, y)).copied()
    }

    /// The tile under a position.
    pub fn tile_at(&self, position: Position) -> TileCode {
        self.tiles[position.index()]
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> &[TileCode] {
        &self.tiles
    }
}

impl TryFrom<Vec<TileCode>> for GameMap {
    type Error = FormatError;

    fn try_from(tiles: Vec<TileCode>) -> Result<Self, Self::Error> {
        Self::from_tiles(tiles)
    }
}

impl From<GameMap> for Vec<TileCode> {
    fn from(map: GameMap) -> Self {
        map.tiles
    }
}

impl fmt::Debug for GameMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let walls = self.tiles.iter().filter(|t| **t == TileCode::Wall).count();
        let items = self.tiles.iter().filter(|t| t.item().is_some()).count();
        f.debug_struct("GameMap")
            .field("tiles", &self.tiles.len())
            .field("walls", &walls)
            .field("items", &items)
            .finish()
    }
}
