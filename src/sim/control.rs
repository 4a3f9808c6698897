//! Directional tilt intent
//!
//! Four independent "held" flags are the whole input model. Clicks on the
//! border toggle them, key presses set and clear them, and every tick the
//! flags are summed into a tilt vector (opposites cancel).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Host key codes for the arrow keys
pub mod keys {
    pub const ARROW_LEFT: u32 = 1005;
    pub const ARROW_UP: u32 = 1006;
    pub const ARROW_RIGHT: u32 = 1007;
    pub const ARROW_DOWN: u32 = 1008;
    pub const W: u32 = b'w' as u32;
    pub const A: u32 = b'a' as u32;
    pub const S: u32 = b's' as u32;
    pub const D: u32 = b'd' as u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step in grid space (y grows downward)
    pub fn unit(&self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Direction bound to a host key code
    pub fn from_key(code: u32) -> Option<Self> {
        match code {
            keys::ARROW_UP | keys::W => Some(Direction::Up),
            keys::ARROW_DOWN | keys::S => Some(Direction::Down),
            keys::ARROW_LEFT | keys::A => Some(Direction::Left),
            keys::ARROW_RIGHT | keys::D => Some(Direction::Right),
            _ => None,
        }
    }

    /// Border button under a grid cell, for a grid that includes the border
    ///
    /// Corners and interior cells are not buttons.
    pub fn from_edge_cell(x: i32, y: i32, grid_width: usize, grid_height: usize) -> Option<Self> {
        let (w, h) = (grid_width as i32, grid_height as i32);
        let inner_x = x >= 1 && x < w - 1;
        let inner_y = y >= 1 && y < h - 1;
        if inner_x && y == 0 {
            Some(Direction::Up)
        } else if inner_x && y == h - 1 {
            Some(Direction::Down)
        } else if inner_y && x == 0 {
            Some(Direction::Left)
        } else if inner_y && x == w - 1 {
            Some(Direction::Right)
        } else {
            None
        }
    }
}

/// Held directions plus the tilt derived from them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Acceleration applied to the ball this tick
    pub tilt: Vec2,
}

impl ControlState {
    pub fn held(&self, dir: Direction) -> bool {
        match dir {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    fn flag_mut(&mut self, dir: Direction) -> &mut bool {
        match dir {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }

    pub fn set(&mut self, dir: Direction, held: bool) {
        *self.flag_mut(dir) = held;
    }

    pub fn toggle(&mut self, dir: Direction) {
        let flag = self.flag_mut(dir);
        *flag = !*flag;
    }

    /// Let go of everything (map loads)
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    /// Recompute tilt from the held flags
    pub fn update_tilt(&mut self, accel: f32) -> Vec2 {
        self.tilt = [Direction::Up, Direction::Down, Direction::Left, Direction::Right]
            .into_iter()
            .filter(|d| self.held(*d))
            .map(|d| d.unit() * accel)
            .sum();
        self.tilt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(Direction::from_key(keys::ARROW_UP), Some(Direction::Up));
        assert_eq!(Direction::from_key(keys::S), Some(Direction::Down));
        assert_eq!(Direction::from_key(97), Some(Direction::Left));
        assert_eq!(Direction::from_key(1007), Some(Direction::Right));
        assert_eq!(Direction::from_key(32), None);
    }

    #[test]
    fn test_edge_cells() {
        // 5x4 grid: 3x2 map plus a one-cell border
        assert_eq!(Direction::from_edge_cell(2, 0, 5, 4), Some(Direction::Up));
        assert_eq!(Direction::from_edge_cell(1, 3, 5, 4), Some(Direction::Down));
        assert_eq!(Direction::from_edge_cell(0, 2, 5, 4), Some(Direction::Left));
        assert_eq!(Direction::from_edge_cell(4, 1, 5, 4), Some(Direction::Right));
        // corners
        assert_eq!(Direction::from_edge_cell(0, 0, 5, 4), None);
        assert_eq!(Direction::from_edge_cell(4, 3, 5, 4), None);
        // interior and outside
        assert_eq!(Direction::from_edge_cell(2, 2, 5, 4), None);
        assert_eq!(Direction::from_edge_cell(7, 0, 5, 4), None);
    }

    #[test]
    fn test_toggle_and_set() {
        let mut control = ControlState::default();
        control.toggle(Direction::Left);
        assert!(control.left);
        control.toggle(Direction::Left);
        assert!(!control.left);
        control.set(Direction::Up, true);
        control.set(Direction::Right, true);
        assert!(control.up && control.right);
        control.release_all();
        assert_eq!(control, ControlState::default());
    }

    #[test]
    fn test_tilt_sums_and_cancels() {
        let mut control = ControlState::default();
        control.set(Direction::Down, true);
        control.set(Direction::Right, true);
        let tilt = control.update_tilt(0.0075);
        assert!((tilt.x - 0.0075).abs() < 1e-7);
        assert!((tilt.y - 0.0075).abs() < 1e-7);

        control.set(Direction::Left, true);
        let tilt = control.update_tilt(0.0075);
        assert_eq!(tilt.x, 0.0);

        control.release_all();
        assert_eq!(control.update_tilt(0.0075), Vec2::ZERO);
    }
}
