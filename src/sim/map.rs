//! Multi-layer tile maps
//!
//! A map is a stack of equally sized layers. Only the layer the ball is on
//! takes part in collisions; holes link a cell to the same cell on another
//! layer. Maps are validated once at construction, so the simulation can
//! assume a spawn exists and every hole has somewhere to lead.

use serde::{Deserialize, Serialize};

use super::tile::Tile;
use crate::cell_index;
use crate::error::MapError;

/// Where the ball starts on a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub x: usize,
    pub y: usize,
    pub layer: usize,
}

/// A validated maze layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTileMap")]
pub struct TileMap {
    width: usize,
    height: usize,
    /// Row-major cells, one vec per layer
    layers: Vec<Vec<Tile>>,
    spawn: SpawnPoint,
    /// Base color (0xRRGGBB) handed to the renderer
    pub theme: u32,
    /// Status line shown while the map is active
    pub status: String,
    /// Background music for the map, `None` for silence
    pub music_track: Option<u8>,
}

impl TileMap {
    /// Build a map from decoded layers, rejecting anything unplayable
    pub fn new(width: usize, height: usize, layers: Vec<Vec<Tile>>) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::EmptyGrid);
        }
        if layers.is_empty() {
            return Err(MapError::NoLayers);
        }
        for (layer, cells) in layers.iter().enumerate() {
            if cells.len() != width * height {
                return Err(MapError::LayerSize {
                    layer,
                    expected: width * height,
                    found: cells.len(),
                });
            }
        }

        let mut map = Self {
            width,
            height,
            layers,
            spawn: SpawnPoint { x: 0, y: 0, layer: 0 },
            theme: default_theme(),
            status: String::new(),
            music_track: None,
        };
        map.spawn = map.find_spawn().ok_or(MapError::MissingSpawn)?;
        map.check_holes()?;
        Ok(map)
    }

    /// Parse a map from text layers
    ///
    /// Each layer is a list of rows. A row holds one symbol per cell, each
    /// optionally followed by a single whitespace spacer (`"X   X"` is wall,
    /// empty, wall), matching the hand-drawn level layout.
    pub fn parse<L, R>(width: usize, height: usize, layers: &[L]) -> Result<Self, MapError>
    where
        L: AsRef<[R]>,
        R: AsRef<str>,
    {
        let decoded = layers
            .iter()
            .enumerate()
            .map(|(layer, rows)| decode_layer(layer, width, height, rows.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(width, height, decoded)
    }

    /// Builder-style metadata
    pub fn with_theme(mut self, theme: u32) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub fn with_music(mut self, track: Option<u8>) -> Self {
        self.music_track = track;
        self
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Cells of one layer in row-major order (empty slice for a bad index)
    pub fn layer(&self, layer: usize) -> &[Tile] {
        self.layers.get(layer).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Spawn point found at construction
    #[inline]
    pub fn spawn(&self) -> SpawnPoint {
        self.spawn
    }

    /// First `Spawn` tile, scanning layers in order and cells row-major
    pub fn find_spawn(&self) -> Option<SpawnPoint> {
        self.layers.iter().enumerate().find_map(|(layer, cells)| {
            cells
                .iter()
                .position(|t| *t == Tile::Spawn)
                .map(|i| SpawnPoint {
                    x: i % self.width,
                    y: i / self.width,
                    layer,
                })
        })
    }

    /// First layer other than `exclude` with a hole at (x, y)
    pub fn find_layer_with_hole(&self, x: i32, y: i32, exclude: usize) -> Option<usize> {
        let index = cell_index(x, y, self.width, self.height)?;
        self.layers
            .iter()
            .enumerate()
            .filter(|(layer, _)| *layer != exclude)
            .find(|(_, cells)| cells[index] == Tile::Hole)
            .map(|(layer, _)| layer)
    }

    /// Tile at a cell; anything off the grid reads as `Wall`
    pub fn tile(&self, layer: usize, x: i32, y: i32) -> Tile {
        match (self.layers.get(layer), cell_index(x, y, self.width, self.height)) {
            (Some(cells), Some(index)) => cells[index],
            _ => Tile::Wall,
        }
    }

    /// Shatter a breakable wall. Returns false if the cell held anything else.
    pub fn break_wall(&mut self, layer: usize, x: i32, y: i32) -> bool {
        let Some(index) = cell_index(x, y, self.width, self.height) else {
            return false;
        };
        match self.layers.get_mut(layer).map(|cells| &mut cells[index]) {
            Some(tile) if *tile == Tile::BreakableWall => {
                *tile = Tile::BrokenBreakableWall;
                true
            }
            _ => false,
        }
    }

    fn check_holes(&self) -> Result<(), MapError> {
        for (layer, cells) in self.layers.iter().enumerate() {
            for (i, _) in cells.iter().enumerate().filter(|(_, t)| **t == Tile::Hole) {
                let (x, y) = (i % self.width, i / self.width);
                if self
                    .find_layer_with_hole(x as i32, y as i32, layer)
                    .is_none()
                {
                    return Err(MapError::UnpairedHole { layer, x, y });
                }
            }
        }
        Ok(())
    }
}

/// Serialized form of a map, checked by `TileMap::new` on the way in
#[derive(Deserialize)]
struct RawTileMap {
    width: usize,
    height: usize,
    layers: Vec<Vec<Tile>>,
    #[serde(default = "default_theme")]
    theme: u32,
    #[serde(default)]
    status: String,
    #[serde(default)]
    music_track: Option<u8>,
}

/// Theme for maps that do not set one
pub(crate) fn default_theme() -> u32 {
    0x6B5700
}

impl TryFrom<RawTileMap> for TileMap {
    type Error = MapError;

    fn try_from(raw: RawTileMap) -> Result<Self, MapError> {
        Ok(Self::new(raw.width, raw.height, raw.layers)?
            .with_theme(raw.theme)
            .with_status(raw.status)
            .with_music(raw.music_track))
    }
}

/// Decode one text layer into row-major tiles
fn decode_layer<R: AsRef<str>>(
    layer: usize,
    width: usize,
    height: usize,
    rows: &[R],
) -> Result<Vec<Tile>, MapError> {
    if rows.len() != height {
        return Err(MapError::RowCount {
            layer,
            expected: height,
            found: rows.len(),
        });
    }

    let mut cells = Vec::with_capacity(width * height);
    for (row, text) in rows.iter().enumerate() {
        let symbols = row_symbols(text.as_ref());
        if symbols.len() != width {
            return Err(MapError::RowWidth {
                layer,
                row,
                expected: width,
                found: symbols.len(),
            });
        }
        for symbol in symbols {
            let tile = Tile::from_char(symbol).ok_or(MapError::UnknownSymbol {
                layer,
                index: cells.len(),
                symbol,
            })?;
            cells.push(tile);
        }
    }
    Ok(cells)
}

/// Split a row into cell symbols
///
/// Each symbol may be followed by one whitespace spacer. A symbol written
/// where a spacer belongs becomes an extra cell, so the row width check
/// catches it instead of the symbol being dropped.
fn row_symbols(text: &str) -> Vec<char> {
    let mut symbols = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(symbol) = chars.next() {
        symbols.push(symbol);
        chars.next_if(|c| c.is_whitespace());
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_layer() -> TileMap {
        TileMap::parse(
            4,
            3,
            &[
                ["X X X X", "X s O X", "X X X X"],
                ["X X X X", "X   O X", "X X X X"],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_parse_and_spawn() {
        let map = two_layer();
        assert_eq!(map.width(), 4);
        assert_eq!(map.height(), 3);
        assert_eq!(map.layer_count(), 2);
        assert_eq!(map.spawn(), SpawnPoint { x: 1, y: 1, layer: 0 });
        assert_eq!(map.tile(0, 2, 1), Tile::Hole);
    }

    #[test]
    fn test_spawn_prefers_earliest_layer_then_row_major() {
        let map = TileMap::parse(
            3,
            2,
            &[["X X X", "X X X"], ["X X s", "s X X"], ["s X X", "X X X"]],
        )
        .unwrap();
        assert_eq!(map.find_spawn(), Some(SpawnPoint { x: 2, y: 0, layer: 1 }));
    }

    #[test]
    fn test_missing_spawn_rejected() {
        let err = TileMap::parse(2, 1, &[["X G"]]).unwrap_err();
        assert_eq!(err, MapError::MissingSpawn);
    }

    #[test]
    fn test_unpaired_hole_rejected() {
        let err = TileMap::parse(3, 1, &[["s O X"], ["X   X"]]).unwrap_err();
        assert_eq!(err, MapError::UnpairedHole { layer: 0, x: 1, y: 0 });
    }

    #[test]
    fn test_bad_rows_rejected() {
        let err = TileMap::parse(3, 2, &[["s X X"]]).unwrap_err();
        assert!(matches!(err, MapError::RowCount { expected: 2, found: 1, .. }));

        let err = TileMap::parse(3, 1, &[["s X"]]).unwrap_err();
        assert!(matches!(err, MapError::RowWidth { expected: 3, found: 2, .. }));

        let err = TileMap::parse(2, 1, &[["s Z"]]).unwrap_err();
        assert!(matches!(err, MapError::UnknownSymbol { symbol: 'Z', index: 1, .. }));
    }

    #[test]
    fn test_symbol_in_spacer_column_is_an_extra_cell() {
        let err = TileMap::parse(2, 1, &[["sXG"]]).unwrap_err();
        assert!(matches!(err, MapError::RowWidth { expected: 2, found: 3, .. }));
    }

    #[test]
    fn test_spacers_are_optional_after_each_symbol() {
        let map = TileMap::parse(3, 1, &[["sX G "]]).unwrap();
        assert_eq!(map.layer(0), &[Tile::Spawn, Tile::Wall, Tile::Goal]);

        // A lone space before a symbol is an empty cell, not a spacer
        let map = TileMap::parse(3, 1, &[[" s X"]]).unwrap();
        assert_eq!(map.layer(0), &[Tile::Empty, Tile::Spawn, Tile::Wall]);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{ "width": 3, "height": 3, "layers": [["Empty"]] }"#;
        assert!(serde_json::from_str::<TileMap>(json).is_err());

        let json = r#"{ "width": 2, "height": 1, "layers": [["Wall", "Goal"]] }"#;
        assert!(serde_json::from_str::<TileMap>(json).is_err());

        let map = two_layer().with_status("kept");
        let back: TileMap = serde_json::from_str(&serde_json::to_string(&map).unwrap()).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_find_layer_with_hole_skips_excluded() {
        let map = two_layer();
        assert_eq!(map.find_layer_with_hole(2, 1, 0), Some(1));
        assert_eq!(map.find_layer_with_hole(2, 1, 1), Some(0));
        assert_eq!(map.find_layer_with_hole(1, 1, 0), None);
        assert_eq!(map.find_layer_with_hole(-1, 1, 0), None);
    }

    #[test]
    fn test_out_of_bounds_reads_as_wall() {
        let map = two_layer();
        assert_eq!(map.tile(0, -1, 0), Tile::Wall);
        assert_eq!(map.tile(0, 4, 1), Tile::Wall);
        assert_eq!(map.tile(0, 1, 3), Tile::Wall);
        assert_eq!(map.tile(9, 1, 1), Tile::Wall);
    }

    #[test]
    fn test_break_wall_only_breaks_breakables() {
        let mut map = TileMap::parse(3, 1, &[["s # X"]]).unwrap();
        assert!(!map.break_wall(0, 2, 0));
        assert!(map.break_wall(0, 1, 0));
        assert_eq!(map.tile(0, 1, 0), Tile::BrokenBreakableWall);
        assert!(!map.break_wall(0, 1, 0));
    }
}
