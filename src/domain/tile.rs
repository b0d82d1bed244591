/// Tile types and their properties.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Tile {
    #[default]
    Empty,
    Ground,   // Ground layer, collides
    Platform, // Platforms layer, collides
}

impl Tile {
    /// Can a body stand on / be blocked by this tile?
    pub fn is_solid(self) -> bool {
        matches!(self, Tile::Ground | Tile::Platform)
    }

    pub fn from_char(ch: char) -> Tile {
        match ch {
            '#' => Tile::Ground,
            '=' => Tile::Platform,
            _ => Tile::Empty,
        }
    }
}
