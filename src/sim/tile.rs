//! Tile symbols and their text encoding
//!
//! Level text uses one character per cell:
//! - `X` wall, space empty, `s` spawn, `G` goal, `O` hole
//! - `#` breakable wall, `?` broken breakable wall (secret passage)

use serde::{Deserialize, Serialize};

/// One cell of one layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum Tile {
    Wall,
    #[default]
    Empty,
    /// Ball start; plays as `Empty`
    Spawn,
    Goal,
    Hole,
    BreakableWall,
    /// A shattered breakable wall; entering it starts the ascend sequence
    BrokenBreakableWall,
}

impl Tile {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'X' => Some(Tile::Wall),
            ' ' => Some(Tile::Empty),
            's' => Some(Tile::Spawn),
            'G' => Some(Tile::Goal),
            'O' => Some(Tile::Hole),
            '#' => Some(Tile::BreakableWall),
            '?' => Some(Tile::BrokenBreakableWall),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Tile::Wall => 'X',
            Tile::Empty => ' ',
            Tile::Spawn => 's',
            Tile::Goal => 'G',
            Tile::Hole => 'O',
            Tile::BreakableWall => '#',
            Tile::BrokenBreakableWall => '?',
        }
    }

    /// True if the ball can never enter this tile
    #[inline]
    pub fn is_solid(&self) -> bool {
        matches!(self, Tile::Wall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_table() {
        for c in ['X', ' ', 's', 'G', 'O', '#', '?'] {
            let tile = Tile::from_char(c).unwrap();
            assert_eq!(tile.as_char(), c);
        }
        assert_eq!(Tile::from_char('z'), None);
    }

    #[test]
    fn test_only_wall_is_solid() {
        assert!(Tile::Wall.is_solid());
        assert!(!Tile::BreakableWall.is_solid());
        assert!(!Tile::Spawn.is_solid());
    }
}
