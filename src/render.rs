//! Frame building
//!
//! Turns a simulation `Snapshot` into per-cell draw styles for a bead-grid
//! host. This is a pure function of the snapshot plus a seeded RNG used for
//! the level dissolve; it never reads anything back from the host.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::TICKS_PER_SECOND;
use crate::sim::{Phase, Snapshot, Tile};

pub const COLOR_BLACK: u32 = 0x000000;
pub const COLOR_WHITE: u32 = 0xFFFFFF;
pub const COLOR_GREEN: u32 = 0x00FF00;
pub const BALL_COLOR: u32 = 0x0080FF;
/// Wall color while a goal is being celebrated
pub const WIN_WALL_COLOR: u32 = 0x015100;
pub const CORNER_COLOR: u32 = 0x606060;
pub const INDICATOR_HELD: u32 = 0xDBDB7A;
pub const INDICATOR_IDLE: u32 = 0xC0C0C0;
pub const INDICATOR_WIN: u32 = 0xA0FFA0;

/// Fraction of cells still drawn on each dissolve tick
const DISSOLVE_KEEP: f32 = 0.25;
/// Tilt dot product that fully darkens a cell
const SHADE_RANGE: f32 = 0.05;
const SHADE_BASE: f32 = 0.1;

/// Look of a single grid cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellStyle {
    pub color: u32,
    pub bg_color: u32,
    /// Corner radius in percent (50 = circle)
    pub radius: u8,
    /// Bead size in percent of the cell
    pub scale: u8,
}

impl CellStyle {
    /// Full-size square bead
    pub const fn solid(color: u32) -> Self {
        Self {
            color,
            bg_color: COLOR_WHITE,
            radius: 0,
            scale: 100,
        }
    }

    pub const fn with_shape(mut self, radius: u8, scale: u8) -> Self {
        self.radius = radius;
        self.scale = scale;
        self
    }
}

/// Everything to draw for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: usize,
    pub height: usize,
    /// Row-major grid cells; `None` keeps whatever the host showed last
    pub cells: Vec<Option<CellStyle>>,
    pub status: String,
    pub status_color: u32,
}

impl Frame {
    pub fn cell(&self, x: usize, y: usize) -> Option<&CellStyle> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells[y * self.width + x].as_ref()
    }

    fn set(&mut self, x: usize, y: usize, style: CellStyle) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = Some(style);
        }
    }
}

/// Stateful frame builder (owns the dissolve RNG)
#[derive(Debug, Clone)]
pub struct FrameBuilder {
    rng: Pcg32,
    reduced_motion: bool,
}

impl FrameBuilder {
    pub fn new(seed: u64, reduced_motion: bool) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            reduced_motion,
        }
    }

    pub fn build(&mut self, snap: &Snapshot) -> Frame {
        let pad = snap.padding;
        let (grid_w, grid_h) = (snap.width + pad * 2, snap.height + pad * 2);
        let mut frame = Frame {
            width: grid_w,
            height: grid_h,
            cells: vec![None; grid_w * grid_h],
            status: snap.status.clone(),
            status_color: blend(COLOR_WHITE, snap.theme, 0.25),
        };

        let ball = crate::cell_of(snap.ball_pos);
        let millis = ticks_to_millis(snap.time_ticks);
        let win = snap.phase.is_win();
        let dissolving = snap.transition_ticks > 0 && !self.reduced_motion;

        for (i, tile) in snap.tiles.iter().enumerate() {
            let (mx, my) = (i % snap.width, i / snap.width);
            let (gx, gy) = (mx + pad, my + pad);

            if let Phase::HoleTransition { timer } = snap.phase {
                if hole_masked(timer, snap.hole_animation_max, ball, (mx as i32, my as i32)) {
                    frame.set(gx, gy, CellStyle::solid(COLOR_BLACK));
                    continue;
                }
            }

            if dissolving && self.rng.random::<f32>() > DISSOLVE_KEEP {
                continue;
            }

            frame.set(gx, gy, tile_style(*tile, snap.theme, win, millis));
        }

        let flash_visible = self.reduced_motion || snap.flash_ticks % 8 < 4;
        if let Some((bx, by)) = snap.ball_cell().filter(|_| flash_visible) {
            let color = if snap.ascended {
                rainbow(millis / 10_000.0)
            } else {
                BALL_COLOR
            };
            frame.set(bx + pad, by + pad, CellStyle::solid(color).with_shape(50, 90));
        }

        if pad > 0 {
            draw_indicators(&mut frame, snap.held, win);
        }

        shade_by_tilt(&mut frame, snap);

        if let Phase::Ascend { timer } = snap.phase {
            draw_ascend_mask(&mut frame, timer, snap.ascend_max, ball, pad, millis);
        }

        frame
    }
}

fn tile_style(tile: Tile, theme: u32, win: bool, millis: f64) -> CellStyle {
    let wall = if win { WIN_WALL_COLOR } else { theme };
    match tile {
        Tile::Wall => CellStyle::solid(wall),
        Tile::BreakableWall => CellStyle::solid(blend(wall, COLOR_BLACK, 0.1)),
        Tile::BrokenBreakableWall => {
            let pulse = |period: f64| ((millis / period * std::f64::consts::PI).sin() + 1.0) / 2.0 * 20.0;
            let scale = (pulse(1000.0) + 80.0) as u8;
            let radius = (pulse(1200.0) + 30.0) as u8;
            CellStyle::solid(rainbow(millis / 1500.0)).with_shape(radius, scale)
        }
        Tile::Goal => CellStyle::solid(COLOR_GREEN),
        Tile::Hole => CellStyle::solid(COLOR_BLACK).with_shape(50, 100),
        Tile::Empty | Tile::Spawn => CellStyle::solid(COLOR_WHITE),
    }
}

/// Square-ish mask closing in on the ball, then opening again
fn hole_masked(timer: i32, max: i32, ball: (i32, i32), cell: (i32, i32)) -> bool {
    if max <= 0 {
        return false;
    }
    let thru = timer.unsigned_abs() as f64 / max as f64;
    let distance = (std::f64::consts::PI * thru * 0.5).tan();
    let dx = (ball.0 - cell.0).abs() as f64;
    let dy = (ball.1 - cell.1).abs() as f64;
    dx + dy * 0.1 > distance || dy + dx * 0.1 > distance
}

fn draw_indicators(frame: &mut Frame, held: [bool; 4], win: bool) {
    let [up, down, left, right] = held;
    let (w, h) = (frame.width, frame.height);
    let idle = if win { INDICATOR_WIN } else { INDICATOR_IDLE };
    let pick = |on: bool| CellStyle::solid(if on { INDICATOR_HELD } else { idle });

    for (x, y) in [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)] {
        frame.set(x, y, CellStyle::solid(CORNER_COLOR));
    }
    for x in 1..w - 1 {
        frame.set(x, 0, pick(up));
        frame.set(x, h - 1, pick(down));
    }
    for y in 1..h - 1 {
        frame.set(0, y, pick(left));
        frame.set(w - 1, y, pick(right));
    }
}

/// Darken map cells on the side the board is tilted towards
fn shade_by_tilt(frame: &mut Frame, snap: &Snapshot) {
    let half_w = snap.width as f32 / 2.0;
    let half_h = snap.height as f32 / 2.0;
    for my in 0..snap.height {
        for mx in 0..snap.width {
            let cx = (mx as f32 - half_w + 0.5) / half_w;
            let cy = (my as f32 - half_h + 0.5) / half_h;
            let dot = snap.tilt.x * cx + snap.tilt.y * cy;
            let shade = (dot / SHADE_RANGE + SHADE_BASE).clamp(0.0, 1.0);

            let idx = (my + snap.padding) * frame.width + mx + snap.padding;
            if let Some(style) = frame.cells[idx].as_mut() {
                style.color = blend(style.color, COLOR_BLACK, shade);
                style.bg_color = blend(COLOR_WHITE, COLOR_BLACK, shade);
            }
        }
    }
}

/// Rainbow ripples growing out from the ball, covering the border too
fn draw_ascend_mask(frame: &mut Frame, timer: i32, max: i32, ball: (i32, i32), pad: usize, millis: f64) {
    if max <= 0 {
        return;
    }
    let thru = timer.unsigned_abs() as f64 / max as f64;
    let distance = (std::f64::consts::PI * (1.0 - thru) * 0.5).tan() * 4.0;
    for y in 0..frame.height {
        for x in 0..frame.width {
            let dx = (ball.0 - (x as i32 - pad as i32)) as f64;
            let dy = (ball.1 - (y as i32 - pad as i32)) as f64;
            let dst = dx * dx + dy * dy;
            if dst < distance * distance {
                let t = millis - dst * timer as f64 / 10.0;
                frame.set(x, y, CellStyle::solid(rainbow(t / 1500.0)));
            }
        }
    }
}

fn ticks_to_millis(ticks: u64) -> f64 {
    ticks as f64 * 1000.0 / TICKS_PER_SECOND as f64
}

/// Linear blend between two 0xRRGGBB colors
pub fn blend(from: u32, to: u32, factor: f32) -> u32 {
    let channel = |shift: u32| {
        let a = ((from >> shift) & 0xFF) as f32;
        let b = ((to >> shift) & 0xFF) as f32;
        ((a + (b - a) * factor).clamp(0.0, 255.0) as u32) << shift
    };
    channel(16) | channel(8) | channel(0)
}

/// Fully saturated color for a hue that wraps every 1.0
pub fn rainbow(hue: f64) -> u32 {
    hsv_to_rgb(hue.rem_euclid(1.0), 1.0, 1.0)
}

pub fn hsv_to_rgb(h: f64, s: f64, v: f64) -> u32 {
    let i = (h * 6.0).floor();
    let f = h * 6.0 - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);
    let (r, g, b) = match (i as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let to_byte = |c: f64| (c * 255.0).round().clamp(0.0, 255.0) as u32;
    (to_byte(r) << 16) | (to_byte(g) << 8) | to_byte(b)
}
