//! Map selection: a TOML file passed on the command line or the built-in town.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use tallgrass_core::{BOUNDARY_TILE_ID, MAP_COLUMNS, VENDOR_TILE_ID, VILLAGER_TILE_ID};
use tallgrass_world::MapLayout;
use tracing::info;

const DEMO_ROWS: u32 = 56;

/// Loads the layout at `path`, or the built-in town when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<MapLayout> {
    let Some(path) = path else {
        return Ok(demo_layout());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read map at {}", path.display()))?;
    let layout = MapLayout::from_toml_str(&contents)
        .with_context(|| format!("failed to load map at {}", path.display()))?;
    info!(path = %path.display(), columns = layout.columns, rows = layout.rows(), "map loaded");
    Ok(layout)
}

/// Small walled town with two houses, a pond, two patches of tall grass,
/// the villager and the vendor.
pub(crate) fn demo_layout() -> MapLayout {
    let mut grid = Grid::new(MAP_COLUMNS, DEMO_ROWS);

    grid.outline(BOUNDARY_TILE_ID);
    grid.fill_collisions(18, 8, 24, 13);
    grid.fill_collisions(30, 8, 37, 13);
    grid.fill_collisions(40, 24, 46, 28);
    grid.fill_zones(8, 22, 17, 30);
    grid.fill_zones(50, 10, 60, 16);
    grid.place_character(29, 19, VILLAGER_TILE_ID);
    grid.place_character(34, 15, VENDOR_TILE_ID);

    MapLayout {
        columns: MAP_COLUMNS,
        collisions: grid.collisions,
        battle_zones: grid.zones,
        characters: grid.characters,
        ..MapLayout::default()
    }
}

struct Grid {
    columns: u32,
    rows: u32,
    collisions: Vec<u32>,
    zones: Vec<u32>,
    characters: Vec<u32>,
}

impl Grid {
    fn new(columns: u32, rows: u32) -> Self {
        let len = (columns * rows) as usize;
        Self {
            columns,
            rows,
            collisions: vec![0; len],
            zones: vec![0; len],
            characters: vec![0; len],
        }
    }

    fn index(&self, column: u32, row: u32) -> usize {
        (row * self.columns + column) as usize
    }

    fn outline(&mut self, id: u32) {
        for column in 0..self.columns {
            let top = self.index(column, 0);
            let bottom = self.index(column, self.rows - 1);
            self.collisions[top] = id;
            self.collisions[bottom] = id;
        }
        for row in 0..self.rows {
            let left = self.index(0, row);
            let right = self.index(self.columns - 1, row);
            self.collisions[left] = id;
            self.collisions[right] = id;
        }
    }

    /// Inclusive tile rectangle.
    fn fill_collisions(&mut self, left: u32, top: u32, right: u32, bottom: u32) {
        for row in top..=bottom {
            for column in left..=right {
                let index = self.index(column, row);
                self.collisions[index] = BOUNDARY_TILE_ID;
            }
        }
    }

    fn fill_zones(&mut self, left: u32, top: u32, right: u32, bottom: u32) {
        for row in top..=bottom {
            for column in left..=right {
                let index = self.index(column, row);
                self.zones[index] = BOUNDARY_TILE_ID;
            }
        }
    }

    fn place_character(&mut self, column: u32, row: u32, id: u32) {
        let index = self.index(column, row);
        self.characters[index] = id;
    }
}
