use serde::Serialize;
use thiserror::Error;

use super::geometry::Position;
use super::input::InputSnapshot;
use crate::sprite_keys::{validate_sprite_key, SpriteKeyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntityId(pub u64);

#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next: u64,
}

impl EntityIdAllocator {
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }
}

/// Opaque handle the rendering layer uses to draw an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderableDesc {
    pub sprite_key: &'static str,
    pub debug_name: &'static str,
}

impl RenderableDesc {
    pub const fn sprite(sprite_key: &'static str, debug_name: &'static str) -> Self {
        Self {
            sprite_key,
            debug_name,
        }
    }

    pub fn validate(&self) -> Result<(), SpriteKeyError> {
        validate_sprite_key(self.sprite_key)
    }
}

/// The two per-tile properties the simulation cares about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileFlags {
    /// Blocks unit movement.
    pub solid: bool,
    /// Blocks building placement.
    pub occupied: bool,
}

impl TileFlags {
    pub const CLEAR: TileFlags = TileFlags {
        solid: false,
        occupied: false,
    };
    pub const SOLID: TileFlags = TileFlags {
        solid: true,
        occupied: true,
    };
}

/// Tilemap origin convention:
/// - tile (0,0) covers map pixels `[0, tile_width) x [0, tile_height)`.
/// - anything outside the grid reads as solid and occupied.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    tile_width: u32,
    tile_height: u32,
    tiles: Vec<TileFlags>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile count mismatch: expected {expected}, got {actual}")]
    TileCountMismatch { expected: usize, actual: usize },
    #[error("tile size must be non-zero, got {tile_width}x{tile_height}")]
    ZeroTileSize { tile_width: u32, tile_height: u32 },
    #[error("map of {width}x{height} tiles exceeds the tile count limit")]
    TooLarge { width: u32, height: u32 },
}

/// Upper bound on `width * height` for any map.
const MAX_TILE_COUNT: usize = 1 << 24;

fn tile_count(width: u32, height: u32) -> Result<usize, TilemapError> {
    (width as usize)
        .checked_mul(height as usize)
        .filter(|count| *count <= MAX_TILE_COUNT)
        .ok_or(TilemapError::TooLarge { width, height })
}

impl Tilemap {
    pub fn new(
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
        tiles: Vec<TileFlags>,
    ) -> Result<Self, TilemapError> {
        if tile_width == 0 || tile_height == 0 {
            return Err(TilemapError::ZeroTileSize {
                tile_width,
                tile_height,
            });
        }
        let expected = tile_count(width, height)?;
        let actual = tiles.len();
        if expected != actual {
            return Err(TilemapError::TileCountMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            tile_width,
            tile_height,
            tiles,
        })
    }

    /// A map with no solid or occupied tiles.
    pub fn open(
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, TilemapError> {
        let tiles = vec![TileFlags::CLEAR; tile_count(width, height)?];
        Self::new(width, height, tile_width, tile_height, tiles)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }

    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }

    pub fn pixel_width(&self) -> f64 {
        f64::from(self.width) * f64::from(self.tile_width)
    }

    pub fn pixel_height(&self) -> f64 {
        f64::from(self.height) * f64::from(self.tile_height)
    }

    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn tile_at(&self, x: u32, y: u32) -> Option<TileFlags> {
        self.index_of(x, y)
            .and_then(|index| self.tiles.get(index).copied())
    }

    pub fn set_tile(&mut self, x: u32, y: u32, flags: TileFlags) -> bool {
        let Some(index) = self.index_of(x, y) else {
            return false;
        };
        self.tiles[index] = flags;
        true
    }

    /// Grid coordinates of the tile containing `position`, if it is on the map.
    pub fn tile_coords(&self, position: Position) -> Option<(u32, u32)> {
        let tx = (position.x / f64::from(self.tile_width)).floor();
        let ty = (position.y / f64::from(self.tile_height)).floor();
        if tx < 0.0 || ty < 0.0 || tx >= f64::from(self.width) || ty >= f64::from(self.height) {
            return None;
        }
        Some((tx as u32, ty as u32))
    }

    pub fn flags_at(&self, position: Position) -> TileFlags {
        self.tile_coords(position)
            .and_then(|(x, y)| self.tile_at(x, y))
            .unwrap_or(TileFlags::SOLID)
    }

    pub fn is_solid(&self, position: Position) -> bool {
        self.flags_at(position).solid
    }

    pub fn is_occupied(&self, position: Position) -> bool {
        self.flags_at(position).occupied
    }
}

/// A simulation driven one fixed tick at a time by the loop runner.
pub trait Scene {
    fn update(&mut self, input: &InputSnapshot);
    fn tick_count(&self) -> u64;
    fn debug_title(&self) -> Option<String> {
        None
    }
}
