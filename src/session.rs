//! Game session driven by host callbacks
//!
//! The host engine calls `on_init` once and then `on_tick` at its fixed
//! timer rate, forwarding clicks and key presses in between. Each callback
//! mutates the simulation, turns the resulting events into audio and pushes
//! a freshly built frame.

use crate::audio::AudioDirector;
use crate::error::CampaignError;
use crate::platform::Host;
use crate::render::FrameBuilder;
use crate::settings::Settings;
use crate::sim::{self, Campaign, GameState, Snapshot};

/// Host timer interval in 60 Hz host ticks
const TIMER_INTERVAL: u32 = 1;

pub struct GameSession<H: Host> {
    state: GameState,
    host: H,
    frames: FrameBuilder,
    audio: AudioDirector,
    /// Grid size last sent to the host
    grid: Option<(usize, usize)>,
}

impl<H: Host> GameSession<H> {
    pub fn new(campaign: Campaign, settings: &Settings, host: H) -> Result<Self, CampaignError> {
        let state = GameState::new(campaign, settings.tuning.clone(), settings.control_scheme)?;
        log::info!(
            "Session created: {} maps, {} controls",
            state.campaign.len(),
            settings.control_scheme.as_str()
        );
        Ok(Self {
            state,
            host,
            frames: FrameBuilder::new(settings.dissolve_seed, settings.reduced_motion),
            audio: AudioDirector::new(settings.effective_music_volume(), settings.sfx_volume),
            grid: None,
        })
    }

    /// Load assets, start music and the timer, draw the first frame
    pub fn on_init(&mut self) {
        self.audio.load_all(&mut self.host);
        self.audio.start_music(&mut self.host, self.state.map.music_track);
        self.host.start_timer(TIMER_INTERVAL);
        self.flush();
    }

    pub fn on_tick(&mut self) {
        sim::tick(&mut self.state);
        self.audio.tick(&mut self.host);
        self.flush();
    }

    /// Click on grid cell (x, y)
    pub fn on_cell_clicked(&mut self, x: i32, y: i32) {
        sim::cell_clicked(&mut self.state, x, y);
        self.flush();
    }

    pub fn on_key_down(&mut self, code: u32) {
        sim::key_down(&mut self.state, code);
    }

    pub fn on_key_up(&mut self, code: u32) {
        sim::key_up(&mut self.state, code);
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Route pending events to audio, then redraw
    fn flush(&mut self) {
        for event in self.state.drain_events() {
            log::trace!("Event: {:?}", event);
            self.audio.handle(&mut self.host, &self.state.campaign, &event);
        }

        let grid = self.state.grid_size();
        if self.grid != Some(grid) {
            self.host.set_grid_size(grid.0, grid.1);
            self.grid = Some(grid);
        }

        let frame = self.frames.build(&self.state.snapshot());
        self.host.draw_frame(&frame);
    }
}
