//! Game state and core simulation types
//!
//! `GameState` is the single owner of the ball, the controls, the phase
//! timers and the active map. The host never touches it directly; it goes
//! through the tick and input functions and reads `Snapshot`s back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::control::ControlState;
use super::levels::{Campaign, MapId};
use super::map::{SpawnPoint, TileMap};
use super::tile::Tile;
use crate::error::CampaignError;
use crate::settings::{ControlScheme, Tuning};
use crate::{cell_of, format_run_time};

/// A timer that is either stopped or counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Countdown {
    Inactive,
    Counting(u32),
}

/// Mutually exclusive high-level states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Ball rolls under player control
    Normal,
    /// Shrink into a hole, switch layer at 0, grow back out; runs +max -> -max
    HoleTransition { timer: i32 },
    /// Goal reached. `Inactive` once there is no level left to load.
    Win { timer: Countdown },
    /// Secret passage sequence; the bonus map loads at 0, runs +max -> -max
    Ascend { timer: i32 },
}

impl Phase {
    pub fn is_normal(&self) -> bool {
        matches!(self, Phase::Normal)
    }

    pub fn is_win(&self) -> bool {
        matches!(self, Phase::Win { .. })
    }
}

/// The rolling ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    /// Continuous position in cells; the occupied cell is the floor
    pub pos: Vec2,
    pub vel: Vec2,
    /// Index into the active map's layers
    pub layer: usize,
}

impl Ball {
    /// Ball at rest on a spawn cell
    pub fn at_spawn(spawn: SpawnPoint) -> Self {
        Self {
            pos: Vec2::new(spawn.x as f32, spawn.y as f32),
            vel: Vec2::ZERO,
            layer: spawn.layer,
        }
    }

    #[inline]
    pub fn cell(&self) -> (i32, i32) {
        cell_of(self.pos)
    }

    pub fn stop(&mut self) {
        self.vel = Vec2::ZERO;
    }
}

/// Things that happened during a tick or input callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A map became active
    LevelLoaded { map: MapId, music_track: Option<u8> },
    HoleEntered { x: i32, y: i32, layer: usize },
    LayerChanged { from: usize, to: usize },
    /// A breakable wall shattered
    WallBroken { x: i32, y: i32, layer: usize },
    /// Ball rolled into a shattered wall
    SecretEntered,
    GoalReached { map: MapId, finale: bool },
    /// The finale goal was reached
    Ascended,
    /// Goal reached on a map with no successor
    CampaignComplete,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub campaign: Campaign,
    pub tuning: Tuning,
    pub scheme: ControlScheme,
    /// Id of the active map
    pub map_id: MapId,
    /// Played copy of the active map (may have broken walls)
    pub map: TileMap,
    pub ball: Ball,
    pub control: ControlState,
    pub phase: Phase,
    /// Ball blink countdown after a load
    pub flash_ticks: u32,
    /// Dissolve-in countdown after a load
    pub transition_ticks: u32,
    /// Finale reached at least once
    pub ascended: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Number of map loads so far
    pub loads: u64,
    /// Status line text
    pub status: String,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl GameState {
    /// Create a new game on the campaign's start map
    pub fn new(campaign: Campaign, tuning: Tuning, scheme: ControlScheme) -> Result<Self, CampaignError> {
        let map_id = campaign.start().clone();
        let map = campaign
            .instantiate(&map_id)
            .ok_or_else(|| CampaignError::UnknownMap(map_id.0.clone()))?;
        let ball = Ball::at_spawn(map.spawn());

        let mut state = Self {
            campaign,
            tuning,
            scheme,
            map_id: map_id.clone(),
            map,
            ball,
            control: ControlState::default(),
            phase: Phase::Normal,
            flash_ticks: 0,
            transition_ticks: 0,
            ascended: false,
            time_ticks: 0,
            loads: 0,
            status: String::new(),
            events: Vec::new(),
        };
        state.load_map(&map_id);
        Ok(state)
    }

    /// Make `id` the active map. Returns false if the campaign has no such map.
    ///
    /// Resets the ball to spawn, releases all controls and clears a pending
    /// hole transition. Win/ascend phases are left to the caller.
    pub fn load_map(&mut self, id: &MapId) -> bool {
        let Some(map) = self.campaign.instantiate(id) else {
            log::warn!("Cannot load unknown map {}", id);
            return false;
        };
        self.map = map;
        self.map_id = id.clone();
        self.ball = Ball::at_spawn(self.map.spawn());
        self.control.release_all();
        if matches!(self.phase, Phase::HoleTransition { .. }) {
            self.phase = Phase::Normal;
        }
        self.flash_ticks = self.tuning.flash_ticks;
        self.transition_ticks = self.tuning.level_transition_ticks;
        self.loads += 1;

        self.status = if self.campaign.successor(id).is_none() {
            format_run_time(self.time_ticks)
        } else {
            self.map.status.clone()
        };

        log::info!(
            "Loaded map {} ({}x{}, {} layer(s))",
            id,
            self.map.width(),
            self.map.height(),
            self.map.layer_count()
        );
        self.emit(GameEvent::LevelLoaded {
            map: id.clone(),
            music_track: self.map.music_track,
        });
        true
    }

    /// Cells of the grid the host should display (map plus control border)
    pub fn grid_size(&self) -> (usize, usize) {
        let pad = self.scheme.padding() * 2;
        (self.map.width() + pad, self.map.height() + pad)
    }

    /// True if the active map belongs to the bonus chain (bonus up to finale)
    pub fn on_bonus_chain(&self) -> bool {
        self.campaign.bonus_chain_position(&self.map_id).is_some()
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Read-only view for renderers
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            map_id: self.map_id.clone(),
            width: self.map.width(),
            height: self.map.height(),
            padding: self.scheme.padding(),
            layer: self.ball.layer,
            tiles: self.map.layer(self.ball.layer).to_vec(),
            theme: self.map.theme,
            ball_pos: self.ball.pos,
            ball_vel: self.ball.vel,
            phase: self.phase,
            hole_animation_max: self.tuning.hole_animation_max,
            ascend_max: self.tuning.ascend_max,
            held: [
                self.control.up,
                self.control.down,
                self.control.left,
                self.control.right,
            ],
            tilt: self.control.tilt,
            flash_ticks: self.flash_ticks,
            transition_ticks: self.transition_ticks,
            ascended: self.ascended,
            time_ticks: self.time_ticks,
            loads: self.loads,
            status: self.status.clone(),
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub map_id: MapId,
    pub width: usize,
    pub height: usize,
    /// Border cells on each side of the map
    pub padding: usize,
    /// Layer the ball is on
    pub layer: usize,
    /// Row-major tiles of that layer
    pub tiles: Vec<Tile>,
    pub theme: u32,
    pub ball_pos: Vec2,
    pub ball_vel: Vec2,
    pub phase: Phase,
    pub hole_animation_max: i32,
    pub ascend_max: i32,
    /// Held flags: up, down, left, right
    pub held: [bool; 4],
    pub tilt: Vec2,
    pub flash_ticks: u32,
    pub transition_ticks: u32,
    pub ascended: bool,
    pub time_ticks: u64,
    pub loads: u64,
    pub status: String,
}

impl Snapshot {
    /// Ball cell if it lies on the map
    pub fn ball_cell(&self) -> Option<(usize, usize)> {
        let (x, y) = cell_of(self.ball_pos);
        crate::cell_index(x, y, self.width, self.height).map(|_| (x as usize, y as usize))
    }
}
