/// Ground queries: the world-facing side of the patrol probe.
///
/// The patrol code never looks at tiles directly. It asks a `GroundQuery`
/// whether a world-space point has ground, so any host (tilemap layers,
/// a test diagram, nothing at all) can stand behind it.
///
/// ## Point query
/// ┌──────────────────────────────┬──────────┐
/// │ Condition                     │ Ground?  │
/// ├──────────────────────────────┼──────────┤
/// │ x or y negative               │ NO       │
/// │ cell outside the grid         │ NO       │
/// │ cell tile is solid            │ YES      │
/// │ otherwise                     │ NO       │
/// └──────────────────────────────┴──────────┘

use super::tile::Tile;

pub trait GroundQuery {
    fn has_ground_at(&self, x: f32, y: f32) -> bool;
}

/// Level without a ground layer.
pub struct NoGround;

impl GroundQuery for NoGround {
    fn has_ground_at(&self, _x: f32, _y: f32) -> bool {
        false
    }
}

/// Tile grid in world space. `tiles[row][col]`, each cell `tile_size` px square.
#[derive(Clone, Debug)]
pub struct TileGround {
    pub tiles: Vec<Vec<Tile>>,
    pub width: usize,
    pub height: usize,
    pub tile_size: f32,
}

impl TileGround {
    pub fn new(tiles: Vec<Vec<Tile>>, tile_size: f32) -> Self {
        let height = tiles.len();
        let width = tiles.first().map_or(0, |r| r.len());
        TileGround { tiles, width, height, tile_size }
    }

    pub fn tile_at(&self, col: usize, row: usize) -> Tile {
        if col >= self.width || row >= self.height {
            return Tile::Empty;
        }
        self.tiles[row].get(col).copied().unwrap_or_default()
    }

    /// Cell containing a world-space point, if inside the grid.
    pub fn cell_of(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        if !(x.is_finite() && y.is_finite()) || x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.tile_size).floor() as usize;
        let row = (y / self.tile_size).floor() as usize;
        if col >= self.width || row >= self.height {
            return None;
        }
        Some((col, row))
    }

    pub fn is_solid_at(&self, x: f32, y: f32) -> bool {
        self.cell_of(x, y)
            .map_or(false, |(c, r)| self.tile_at(c, r).is_solid())
    }

    pub fn width_px(&self) -> f32 {
        self.width as f32 * self.tile_size
    }

    pub fn height_px(&self) -> f32 {
        self.height as f32 * self.tile_size
    }

    pub fn has_any_solid(&self) -> bool {
        self.tiles.iter().flatten().any(|t| t.is_solid())
    }
}

impl GroundQuery for TileGround {
    fn has_ground_at(&self, x: f32, y: f32) -> bool {
        self.is_solid_at(x, y)
    }
}

/// Build a ground grid from a string diagram (`#`/`=` solid, anything else empty).
pub fn ground_from_rows(rows: &[&str], tile_size: f32) -> TileGround {
    let tiles = rows
        .iter()
        .map(|row| row.chars().map(Tile::from_char).collect())
        .collect();
    TileGround::new(tiles, tile_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_query_maps_to_cells() {
        let g = ground_from_rows(&[
            "    ",
            "## =",
        ], 16.0);
        assert!(g.has_ground_at(0.0, 16.0));
        assert!(g.has_ground_at(31.9, 31.9));
        assert!(!g.has_ground_at(40.0, 20.0)); // gap
        assert!(g.has_ground_at(50.0, 20.0));  // platform counts
        assert!(!g.has_ground_at(10.0, 5.0));  // air row
    }

    #[test]
    fn outside_grid_is_no_ground() {
        let g = ground_from_rows(&["##"], 16.0);
        assert!(!g.has_ground_at(-1.0, 4.0));
        assert!(!g.has_ground_at(4.0, -0.5));
        assert!(!g.has_ground_at(32.0, 4.0));
        assert!(!g.has_ground_at(4.0, 16.0));
        assert!(!g.has_ground_at(f32::NAN, 4.0));
    }

    #[test]
    fn ragged_rows_read_as_empty() {
        let g = ground_from_rows(&["####", "#"], 10.0);
        assert_eq!(g.tile_at(3, 1), Tile::Empty);
        assert_eq!(g.tile_at(0, 1), Tile::Ground);
    }

    #[test]
    fn no_ground_is_always_empty() {
        assert!(!NoGround.has_ground_at(0.0, 0.0));
    }
}
