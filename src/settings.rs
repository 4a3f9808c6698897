//! Game settings and tuning
//!
//! Stored as JSON. Every field has a default, so partial files are fine.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;

/// How the player tilts the maze
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlScheme {
    /// Clickable one-cell border around the maze toggles each direction
    #[default]
    EdgeClick,
    /// Arrow keys / WASD held down
    KeyHold,
}

impl ControlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlScheme::EdgeClick => "EdgeClick",
            ControlScheme::KeyHold => "KeyHold",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "edgeclick" | "edge" | "click" => Some(ControlScheme::EdgeClick),
            "keyhold" | "keys" | "keyboard" => Some(ControlScheme::KeyHold),
            _ => None,
        }
    }

    /// Border cells added around the map on each side
    pub fn padding(&self) -> usize {
        match self {
            ControlScheme::EdgeClick => 1,
            ControlScheme::KeyHold => 0,
        }
    }
}

/// Simulation balance, all in ticks and cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub tilt_accel: f32,
    pub max_axis_speed: f32,
    pub break_min_speed: f32,
    pub break_rebound: f32,
    pub hole_animation_max: i32,
    pub win_ticks: u32,
    pub final_win_ticks: u32,
    pub ascend_max: i32,
    pub flash_ticks: u32,
    pub level_transition_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tilt_accel: TILT_ACCEL,
            max_axis_speed: MAX_AXIS_SPEED,
            break_min_speed: BREAK_MIN_SPEED,
            break_rebound: BREAK_REBOUND,
            hole_animation_max: HOLE_ANIMATION_MAX,
            win_ticks: WIN_TICKS,
            final_win_ticks: FINAL_WIN_TICKS,
            ascend_max: ASCEND_MAX,
            flash_ticks: FLASH_TICKS,
            level_transition_ticks: LEVEL_TRANSITION_TICKS,
        }
    }
}

impl Tuning {
    /// Reject values the timers and collision cannot work with
    ///
    /// Both phase timers must pass through 0 on their way down, and a ball
    /// faster than one cell per tick could tunnel through walls.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |field: &'static str, problem: &'static str| -> Result<(), SettingsError> {
            Err(SettingsError::InvalidTuning { field, problem })
        };
        if self.hole_animation_max < 1 {
            return invalid("hole_animation_max", "must be at least 1");
        }
        if self.ascend_max < 1 {
            return invalid("ascend_max", "must be at least 1");
        }
        if !(self.max_axis_speed > 0.0 && self.max_axis_speed <= 1.0) {
            return invalid("max_axis_speed", "must be in (0, 1]");
        }
        if !self.tilt_accel.is_finite() || self.tilt_accel < 0.0 {
            return invalid("tilt_accel", "must be a finite non-negative number");
        }
        if !self.break_min_speed.is_finite() || !self.break_rebound.is_finite() {
            return invalid("break_min_speed/break_rebound", "must be finite");
        }
        Ok(())
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub control_scheme: ControlScheme,

    // === Audio ===
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume multiplier (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Accessibility ===
    /// Skip the ball blink and level dissolve
    pub reduced_motion: bool,

    /// Seed for the cosmetic level dissolve
    pub dissolve_seed: u64,

    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            control_scheme: ControlScheme::EdgeClick,
            music_volume: 0.5,
            sfx_volume: 1.0,
            reduced_motion: false,
            dissolve_seed: 0x5EED,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.tuning.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Write settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Music volume clamped to the valid range
    pub fn effective_music_volume(&self) -> f32 {
        self.music_volume.clamp(0.0, 1.0)
    }
}
