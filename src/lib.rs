//! Tilt Maze - a layered ball-rolling maze
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tiles, collisions, level state machine)
//! - `session`: Owned game session driven by host callbacks
//! - `platform`: Host engine abstraction (grid, audio, status line)
//! - `render`: Read-only frame building from simulation snapshots
//! - `audio`: Sound effect and music catalogs
//! - `settings`: Data-driven tuning and preferences

pub mod audio;
pub mod error;
pub mod platform;
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;

pub use error::{CampaignError, MapError, SettingsError};
pub use session::GameSession;
pub use settings::{ControlScheme, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Host timer rate all tick counts assume (ticks per second)
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Velocity added per tick for each held direction
    pub const TILT_ACCEL: f32 = 0.0075;
    /// Per-axis velocity limit (cells per tick)
    pub const MAX_AXIS_SPEED: f32 = 1.0;

    /// Minimum impact speed that shatters a breakable wall
    pub const BREAK_MIN_SPEED: f32 = 0.25;
    /// Velocity multiplier applied on the impact axis when a wall shatters
    pub const BREAK_REBOUND: f32 = -0.5;

    /// Hole animation runs +max -> 0 -> -max
    pub const HOLE_ANIMATION_MAX: i32 = 15;
    /// Goal celebration before the next map loads
    pub const WIN_TICKS: u32 = 60;
    /// Longer celebration for the campaign finale
    pub const FINAL_WIN_TICKS: u32 = 90;
    /// Ascend animation runs +max -> 0 (step 1) -> -max (step 2)
    pub const ASCEND_MAX: i32 = 60 * 4;

    /// Ball blinks for this many ticks after a map loads
    pub const FLASH_TICKS: u32 = 45;
    /// Dissolve-in duration after a map loads
    pub const LEVEL_TRANSITION_TICKS: u32 = 15;
}

/// Grid cell containing a continuous position
#[inline]
pub fn cell_of(pos: Vec2) -> (i32, i32) {
    (pos.x.floor() as i32, pos.y.floor() as i32)
}

/// Row-major index of a cell, or `None` when outside a `width` x `height` grid
#[inline]
pub fn cell_index(x: i32, y: i32, width: usize, height: usize) -> Option<usize> {
    if x < 0 || y < 0 {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= width || y >= height {
        return None;
    }
    Some(y * width + x)
}

/// Format a tick count as `"{m}m {s:.2}s"` at the host's tick rate
pub fn format_run_time(ticks: u64) -> String {
    let seconds = ticks as f64 / consts::TICKS_PER_SECOND as f64;
    let minutes = (seconds / 60.0).floor();
    format!("{}m {:.2}s", minutes as u64, seconds % 60.0)
}
