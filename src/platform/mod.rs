//! Platform abstraction layer
//!
//! The game runs inside a bead-grid host engine that owns the window, the
//! timer and the audio mixer. Everything the game asks of it goes through
//! the `Host` trait:
//! - Grid size and per-cell drawing
//! - Status line
//! - Sound loading, playback and volume fades
//! - The fixed-rate tick timer

#[cfg(target_arch = "wasm32")]
pub mod web;

use serde::{Deserialize, Serialize};

use crate::render::{CellStyle, Frame};

/// Playback options for a sound
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoundOptions {
    /// 0.0 - 1.0
    pub volume: f32,
    pub looped: bool,
}

impl SoundOptions {
    pub fn once(volume: f32) -> Self {
        Self {
            volume,
            looped: false,
        }
    }

    pub fn looped(volume: f32) -> Self {
        Self { volume, looped: true }
    }
}

/// Services the host engine provides to the game
pub trait Host {
    /// Resize the bead grid
    fn set_grid_size(&mut self, width: usize, height: usize);

    fn draw_cell(&mut self, x: usize, y: usize, style: CellStyle);

    fn set_status(&mut self, text: &str, color: u32);

    /// Register a sound by name; playback may start before loading finishes
    fn load_sound(&mut self, name: &str);

    fn play_sound(&mut self, name: &str, options: SoundOptions);

    /// Ramp a playing sound's volume to `target` over `duration_ms`
    fn fade_sound(&mut self, name: &str, target: f32, duration_ms: u32);

    /// Start calling the tick callback every `interval` host ticks (60 Hz)
    fn start_timer(&mut self, interval: u32);

    /// Push a whole frame. Cells the frame leaves empty are not touched.
    fn draw_frame(&mut self, frame: &Frame) {
        for (i, cell) in frame.cells.iter().enumerate() {
            if let Some(style) = cell {
                self.draw_cell(i % frame.width, i / frame.width, *style);
            }
        }
        self.set_status(&frame.status, frame.status_color);
    }
}

/// One recorded host request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    GridSize { width: usize, height: usize },
    Cell { x: usize, y: usize, style: CellStyle },
    Status { text: String, color: u32 },
    LoadSound { name: String },
    PlaySound { name: String, options: SoundOptions },
    FadeSound { name: String, target: f32, duration_ms: u32 },
    StartTimer { interval: u32 },
}

/// Headless host that records every call
///
/// Used by the native runner and in tests, and as the command buffer that the
/// wasm binding hands to JavaScript.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
    grid: (usize, usize),
    status: String,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Hand over everything recorded so far
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn grid_size(&self) -> (usize, usize) {
        self.grid
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Names of sounds started since the last `take_calls`
    pub fn sounds_played(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::PlaySound { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn fades(&self) -> Vec<(&str, f32, u32)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                HostCall::FadeSound {
                    name,
                    target,
                    duration_ms,
                } => Some((name.as_str(), *target, *duration_ms)),
                _ => None,
            })
            .collect()
    }
}

impl Host for RecordingHost {
    fn set_grid_size(&mut self, width: usize, height: usize) {
        log::debug!("Grid resized to {}x{}", width, height);
        self.grid = (width, height);
        self.calls.push(HostCall::GridSize { width, height });
    }

    fn draw_cell(&mut self, x: usize, y: usize, style: CellStyle) {
        self.calls.push(HostCall::Cell { x, y, style });
    }

    fn set_status(&mut self, text: &str, color: u32) {
        if text != self.status {
            log::debug!("Status: {}", text);
            self.status = text.to_string();
        }
        self.calls.push(HostCall::Status {
            text: text.to_string(),
            color,
        });
    }

    fn load_sound(&mut self, name: &str) {
        self.calls.push(HostCall::LoadSound { name: name.to_string() });
    }

    fn play_sound(&mut self, name: &str, options: SoundOptions) {
        log::debug!("Play {} at {:.2}{}", name, options.volume, if options.looped { " (loop)" } else { "" });
        self.calls.push(HostCall::PlaySound {
            name: name.to_string(),
            options,
        });
    }

    fn fade_sound(&mut self, name: &str, target: f32, duration_ms: u32) {
        log::debug!("Fade {} to {:.2} over {}ms", name, target, duration_ms);
        self.calls.push(HostCall::FadeSound {
            name: name.to_string(),
            target,
            duration_ms,
        });
    }

    fn start_timer(&mut self, interval: u32) {
        self.calls.push(HostCall::StartTimer { interval });
    }
}
