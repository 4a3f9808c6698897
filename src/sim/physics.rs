//! Ball integration and tile collision
//!
//! Movement is resolved one axis at a time against the ball's layer: X first
//! using the current Y, then Y using the possibly-updated X. A blocked axis
//! loses its velocity while the other keeps going, so the ball slides along
//! walls instead of sticking on a diagonal approach.

use glam::Vec2;

use super::map::TileMap;
use super::state::Ball;
use super::tile::Tile;
use crate::settings::Tuning;

/// Special tile the ball rolled onto this step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileEntry {
    Hole,
    Goal,
    /// A shattered breakable wall
    Secret,
}

/// Result of one integration step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepResult {
    /// Set only when the ball moved into a new cell holding a special tile
    pub entered: Option<TileEntry>,
    /// Breakable walls shattered this step, as (x, y)
    pub broken: Vec<(i32, i32)>,
}

/// Outcome of moving along a single axis
#[derive(Debug, Clone, Copy, PartialEq)]
enum AxisMove {
    Moved,
    Blocked,
    Shattered { x: i32, y: i32 },
}

/// Clamp one velocity component to `[-max, max]`, keeping its sign
#[inline]
pub fn clamp_axis(v: f32, max: f32) -> f32 {
    if v.abs() > max { v.signum() * max } else { v }
}

/// Add tilt to the ball's velocity, then clamp each axis
pub fn apply_tilt(ball: &mut Ball, tilt: Vec2, max_axis_speed: f32) {
    ball.vel += tilt;
    ball.vel.x = clamp_axis(ball.vel.x, max_axis_speed);
    ball.vel.y = clamp_axis(ball.vel.y, max_axis_speed);
}

/// Advance the ball one tick: tilt, per-axis collision, then tile entry
pub fn step_ball(ball: &mut Ball, map: &mut TileMap, tilt: Vec2, tuning: &Tuning) -> StepResult {
    apply_tilt(ball, tilt, tuning.max_axis_speed);

    let mut result = StepResult::default();
    let prev_cell = ball.cell();

    // X against the current row
    let new_x = ball.pos.x + ball.vel.x;
    let target = (new_x.floor() as i32, ball.pos.y.floor() as i32);
    match resolve_axis(map, ball.layer, target, ball.vel.x, tuning) {
        AxisMove::Moved => ball.pos.x = new_x,
        AxisMove::Blocked => ball.vel.x = 0.0,
        AxisMove::Shattered { x, y } => {
            ball.vel.x *= tuning.break_rebound;
            result.broken.push((x, y));
        }
    }

    // Y against the (possibly updated) column
    let new_y = ball.pos.y + ball.vel.y;
    let target = (ball.pos.x.floor() as i32, new_y.floor() as i32);
    match resolve_axis(map, ball.layer, target, ball.vel.y, tuning) {
        AxisMove::Moved => ball.pos.y = new_y,
        AxisMove::Blocked => ball.vel.y = 0.0,
        AxisMove::Shattered { x, y } => {
            ball.vel.y *= tuning.break_rebound;
            result.broken.push((x, y));
        }
    }

    let cell = ball.cell();
    if cell != prev_cell {
        result.entered = match map.tile(ball.layer, cell.0, cell.1) {
            Tile::Hole => {
                ball.stop();
                Some(TileEntry::Hole)
            }
            Tile::Goal => {
                ball.stop();
                Some(TileEntry::Goal)
            }
            Tile::BrokenBreakableWall => Some(TileEntry::Secret),
            _ => None,
        };
    }

    result
}

/// Decide what happens when one axis tries to move into `target`
fn resolve_axis(
    map: &mut TileMap,
    layer: usize,
    target: (i32, i32),
    speed: f32,
    tuning: &Tuning,
) -> AxisMove {
    let (x, y) = target;
    match map.tile(layer, x, y) {
        tile if tile.is_solid() => AxisMove::Blocked,
        Tile::BreakableWall if speed.abs() < tuning.break_min_speed => AxisMove::Blocked,
        Tile::BreakableWall => {
            map.break_wall(layer, x, y);
            log::debug!("Breakable wall shattered at ({}, {}) on layer {}", x, y, layer);
            AxisMove::Shattered { x, y }
        }
        _ => AxisMove::Moved,
    }
}
