//! Error types for map construction, campaigns, and settings
//!
//! All of these surface at load time. The per-tick simulation never fails.

use thiserror::Error;

/// A map description that cannot be played
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    #[error("map has zero width or height")]
    EmptyGrid,
    #[error("map has no layers")]
    NoLayers,
    #[error("layer {layer} has {found} rows, expected {expected}")]
    RowCount {
        layer: usize,
        expected: usize,
        found: usize,
    },
    #[error("layer {layer} row {row} has {found} cells, expected {expected}")]
    RowWidth {
        layer: usize,
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("layer {layer} has {found} cells, expected {expected}")]
    LayerSize {
        layer: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile symbol {symbol:?} at layer {layer}, cell {index}")]
    UnknownSymbol {
        layer: usize,
        index: usize,
        symbol: char,
    },
    #[error("map has no spawn tile")]
    MissingSpawn,
    #[error("hole at ({x}, {y}) on layer {layer} has no counterpart on another layer")]
    UnpairedHole { layer: usize, x: usize, y: usize },
}

/// A level graph that references maps it cannot provide
#[derive(Debug, Error)]
pub enum CampaignError {
    #[error("unknown map {0:?}")]
    UnknownMap(String),
    #[error("map {0:?} is defined twice")]
    DuplicateMap(String),
    #[error("map {id:?}: {source}")]
    Map {
        id: String,
        #[source]
        source: MapError,
    },
    #[error("invalid level pack: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings that could not be read or written
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tuning {field} {problem}")]
    InvalidTuning {
        field: &'static str,
        problem: &'static str,
    },
}
