//! Tile map layout parsing and the builder that turns tile ids into entities.

use serde::Deserialize;
use tallgrass_core::{
    CharacterId, Position, Rect, Size, BOUNDARY_TILE_ID, MAP_COLUMNS, TILE_LENGTH,
    VENDOR_TILE_ID, VILLAGER_TILE_ID,
};
use thiserror::Error;

use crate::entities::{Boundary, Character, CharacterRole, Zone};

const DEFAULT_OFFSET: Position = Position::new(-735.0, -650.0);

/// Errors raised while loading or validating a map layout.
#[derive(Debug, Error)]
pub enum MapError {
    /// The TOML document could not be decoded into a layout.
    #[error("failed to parse map layout")]
    Parse(#[from] toml::de::Error),
    /// The layout declares zero columns.
    #[error("map layout must declare at least one column")]
    ZeroColumns,
    /// Tiles must have a strictly positive extent.
    #[error("tile size {width}x{height} must be positive")]
    InvalidTileSize {
        /// Declared tile width.
        width: f32,
        /// Declared tile height.
        height: f32,
    },
    /// A layer does not fill whole rows.
    #[error("{layer} layer holds {len} tiles, which is not a multiple of {columns} columns")]
    RaggedLayer {
        /// Name of the offending layer.
        layer: &'static str,
        /// Number of tile ids in the layer.
        len: usize,
        /// Declared row width.
        columns: u32,
    },
}

/// Flat tile-id layers describing a map, stored row-major.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapLayout {
    /// Number of tiles per row.
    pub columns: u32,
    /// Width of a tile in canvas pixels.
    pub tile_width: f32,
    /// Height of a tile in canvas pixels.
    pub tile_height: f32,
    /// Canvas position of the map's top-left corner at load.
    pub offset: Position,
    /// Collision layer; `1025` marks an impassable tile.
    pub collisions: Vec<u32>,
    /// Battle zone layer; `1025` marks tall grass.
    pub battle_zones: Vec<u32>,
    /// Character layer; `1026` is the villager, `1031` the vendor.
    pub characters: Vec<u32>,
}

impl Default for MapLayout {
    fn default() -> Self {
        Self {
            columns: MAP_COLUMNS,
            tile_width: TILE_LENGTH,
            tile_height: TILE_LENGTH,
            offset: DEFAULT_OFFSET,
            collisions: Vec::new(),
            battle_zones: Vec::new(),
            characters: Vec::new(),
        }
    }
}

impl MapLayout {
    /// Decodes and validates a layout from a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, MapError> {
        let layout: Self = toml::from_str(source)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Ensures every layer fills whole rows of the declared width.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.columns == 0 {
            return Err(MapError::ZeroColumns);
        }
        if !(self.tile_width > 0.0 && self.tile_height > 0.0) {
            return Err(MapError::InvalidTileSize {
                width: self.tile_width,
                height: self.tile_height,
            });
        }
        for (layer, tiles) in self.layers() {
            if tiles.len() % self.columns as usize != 0 {
                return Err(MapError::RaggedLayer {
                    layer,
                    len: tiles.len(),
                    columns: self.columns,
                });
            }
        }
        Ok(())
    }

    /// Number of rows spanned by the tallest layer.
    #[must_use]
    pub fn rows(&self) -> u32 {
        if self.columns == 0 {
            return 0;
        }
        let longest = self
            .layers()
            .map(|(_, tiles)| tiles.len())
            .max()
            .unwrap_or(0);
        (longest / self.columns as usize) as u32
    }

    /// Size of a single tile.
    #[must_use]
    pub fn tile_size(&self) -> Size {
        Size::new(self.tile_width, self.tile_height)
    }

    /// Size of the whole map in canvas pixels.
    #[must_use]
    pub fn extent(&self) -> Size {
        Size::new(
            self.columns as f32 * self.tile_width,
            self.rows() as f32 * self.tile_height,
        )
    }

    /// Canvas position of the tile at the provided column and row.
    #[must_use]
    pub fn tile_position(&self, column: u32, row: u32) -> Position {
        Position::new(
            column as f32 * self.tile_width + self.offset.x,
            row as f32 * self.tile_height + self.offset.y,
        )
    }

    fn layers(&self) -> impl Iterator<Item = (&'static str, &[u32])> {
        [
            ("collisions", self.collisions.as_slice()),
            ("battle_zones", self.battle_zones.as_slice()),
            ("characters", self.characters.as_slice()),
        ]
        .into_iter()
    }

    fn cells<'a>(&'a self, tiles: &'a [u32]) -> impl Iterator<Item = (Position, u32)> + 'a {
        let columns = self.columns.max(1);
        tiles.iter().enumerate().map(move |(index, id)| {
            let index = index as u32;
            (self.tile_position(index % columns, index / columns), *id)
        })
    }
}

/// Entities produced from the tile layers; membership is fixed after load.
#[derive(Debug, Default)]
pub(crate) struct TileSet {
    pub(crate) boundaries: Vec<Boundary>,
    pub(crate) zones: Vec<Zone>,
    pub(crate) characters: Vec<Character>,
}

/// Converts the layout's tile ids into boundary, zone and character lists.
///
/// Any nonzero id in the character layer also blocks movement.
pub(crate) fn build(layout: &MapLayout) -> TileSet {
    let tile = layout.tile_size();
    let mut tiles = TileSet::default();

    for (position, id) in layout.cells(&layout.collisions) {
        if id == BOUNDARY_TILE_ID {
            tiles.boundaries.push(Boundary::new(Rect::new(position, tile)));
        }
    }

    for (position, id) in layout.cells(&layout.battle_zones) {
        if id == BOUNDARY_TILE_ID {
            tiles.zones.push(Zone::new(Rect::new(position, tile)));
        }
    }

    for (position, id) in layout.cells(&layout.characters) {
        let role = match id {
            VILLAGER_TILE_ID => Some(CharacterRole::Villager),
            VENDOR_TILE_ID => Some(CharacterRole::Vendor),
            _ => None,
        };
        if let Some(role) = role {
            let character_id = CharacterId::new(tiles.characters.len() as u32);
            tiles
                .characters
                .push(Character::new(character_id, role, Rect::new(position, tile)));
        }
        if id != 0 {
            tiles.boundaries.push(Boundary::new(Rect::new(position, tile)));
        }
    }

    tiles
}
