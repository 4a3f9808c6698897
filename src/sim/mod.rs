//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Map state is copied on every load; the campaign is never mutated
//! - No rendering, audio or platform dependencies

pub mod control;
pub mod levels;
pub mod map;
pub mod physics;
pub mod state;
pub mod tick;
pub mod tile;

pub use control::{ControlState, Direction, keys};
pub use levels::{Campaign, LevelPack, MapDef, MapId, MapText};
pub use map::{SpawnPoint, TileMap};
pub use physics::{StepResult, TileEntry, step_ball};
pub use state::{Ball, Countdown, GameEvent, GameState, Phase, Snapshot};
pub use tick::{cell_clicked, key_down, key_up, tick};
pub use tile::Tile;
