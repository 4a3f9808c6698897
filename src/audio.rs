//! Sound effects and music
//!
//! All audio is sample based and played by the host. The game only decides
//! which cue to fire for each simulation event and how the four looping
//! music tracks are crossfaded between maps.

use crate::platform::{Host, SoundOptions};
use crate::sim::{Campaign, GameEvent};

/// Fade length when the host default is used
pub const DEFAULT_FADE_MS: u32 = 1000;
/// The end track fades back out slowly once it has faded in
pub const END_TRACK_FADE_OUT_MS: u32 = 15_000;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball dropped into a hole
    Hole,
    /// Goal reached on a regular map
    StageComplete,
    /// Any map load
    LoadLevel,
    /// Breakable wall shattered
    Secret,
    /// Ball rolled into the secret passage
    Ascend,
    /// Finale goal reached
    Ascended,
    /// First bonus goal
    Here,
    /// Second bonus goal
    Here2,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 8] = [
        SoundEffect::Hole,
        SoundEffect::StageComplete,
        SoundEffect::LoadLevel,
        SoundEffect::Secret,
        SoundEffect::Ascend,
        SoundEffect::Ascended,
        SoundEffect::Here,
        SoundEffect::Here2,
    ];

    /// Asset name on the host
    pub fn name(&self) -> &'static str {
        match self {
            SoundEffect::Hole => "hole",
            SoundEffect::StageComplete => "stageComplete",
            SoundEffect::LoadLevel => "loadLevel",
            SoundEffect::Secret => "secret",
            SoundEffect::Ascend => "ASCEND",
            SoundEffect::Ascended => "ASCENDED",
            SoundEffect::Here => "HERE",
            SoundEffect::Here2 => "HERE2",
        }
    }

    /// Mix level before the effects volume is applied
    pub fn base_volume(&self) -> f32 {
        match self {
            SoundEffect::Hole => 0.25,
            SoundEffect::StageComplete => 0.2,
            SoundEffect::LoadLevel => 0.3,
            SoundEffect::Secret | SoundEffect::Ascended | SoundEffect::Here | SoundEffect::Here2 => 0.5,
            SoundEffect::Ascend => 1.0,
        }
    }
}

/// Looping music tracks, indexed by a map's `music_track`
pub const MUSIC_TRACKS: [&str; 4] = ["laballrinth_a", "laballrinth_b", "laballrinth_c", "laballrinth_d"];

/// Track that fades itself out after fading in
const END_TRACK: u8 = 3;

/// Name of a music track index, if it exists
pub fn music_track_name(track: u8) -> Option<&'static str> {
    MUSIC_TRACKS.get(track as usize).copied()
}

/// A fade to start after some ticks
#[derive(Debug, Clone, Copy, PartialEq)]
struct ScheduledFade {
    ticks_left: u32,
    track: u8,
    target: f32,
    duration_ms: u32,
}

/// Turns game events into host audio calls
#[derive(Debug, Clone)]
pub struct AudioDirector {
    music_volume: f32,
    sfx_volume: f32,
    /// Track of the active map
    current_track: Option<u8>,
    /// Loops are playing
    started: bool,
    scheduled: Vec<ScheduledFade>,
}

impl AudioDirector {
    pub fn new(music_volume: f32, sfx_volume: f32) -> Self {
        Self {
            music_volume: music_volume.clamp(0.0, 1.0),
            sfx_volume: sfx_volume.clamp(0.0, 1.0),
            current_track: None,
            started: false,
            scheduled: Vec::new(),
        }
    }

    pub fn current_track(&self) -> Option<u8> {
        self.current_track
    }

    /// Register every effect and music track with the host
    pub fn load_all(&self, host: &mut impl Host) {
        for effect in SoundEffect::ALL {
            host.load_sound(effect.name());
        }
        for track in MUSIC_TRACKS {
            host.load_sound(track);
        }
    }

    /// Start all music loops together, with only `track` audible
    pub fn start_music(&mut self, host: &mut impl Host, track: Option<u8>) {
        for (i, name) in MUSIC_TRACKS.iter().enumerate() {
            let volume = if track == Some(i as u8) { self.music_volume } else { 0.0 };
            host.play_sound(name, SoundOptions::looped(volume));
        }
        self.current_track = track;
        self.started = true;
        log::info!("Music started on track {:?}", track);
    }

    pub fn play(&self, host: &mut impl Host, effect: SoundEffect) {
        let volume = (effect.base_volume() * self.sfx_volume).clamp(0.0, 1.0);
        if volume <= 0.0 {
            return;
        }
        host.play_sound(effect.name(), SoundOptions::once(volume));
    }

    /// React to one simulation event
    pub fn handle(&mut self, host: &mut impl Host, campaign: &Campaign, event: &GameEvent) {
        match event {
            GameEvent::LevelLoaded { music_track, .. } => {
                self.play(host, SoundEffect::LoadLevel);
                if self.started {
                    self.crossfade(host, *music_track);
                } else {
                    self.current_track = *music_track;
                }
            }
            GameEvent::HoleEntered { .. } => self.play(host, SoundEffect::Hole),
            GameEvent::WallBroken { .. } => {
                self.play(host, SoundEffect::Secret);
                if let Some(track) = self.current_track {
                    self.fade(host, track, 0.0, DEFAULT_FADE_MS);
                }
            }
            GameEvent::SecretEntered => self.play(host, SoundEffect::Ascend),
            GameEvent::GoalReached { map, finale: false } => {
                let cue = match campaign.bonus_chain_position(map) {
                    Some(0) => SoundEffect::Here,
                    Some(1) => SoundEffect::Here2,
                    _ => SoundEffect::StageComplete,
                };
                self.play(host, cue);
            }
            GameEvent::Ascended => self.play(host, SoundEffect::Ascended),
            GameEvent::GoalReached { finale: true, .. }
            | GameEvent::LayerChanged { .. }
            | GameEvent::CampaignComplete => {}
        }
    }

    /// Advance scheduled fades by one tick
    pub fn tick(&mut self, host: &mut impl Host) {
        let mut due = Vec::new();
        self.scheduled.retain_mut(|fade| {
            if fade.ticks_left == 0 {
                due.push(*fade);
                false
            } else {
                fade.ticks_left -= 1;
                true
            }
        });
        for fade in due {
            self.fade(host, fade.track, fade.target, fade.duration_ms);
        }
    }

    fn crossfade(&mut self, host: &mut impl Host, next: Option<u8>) {
        if next == self.current_track {
            return;
        }
        if let Some(prev) = self.current_track {
            self.fade(host, prev, 0.0, DEFAULT_FADE_MS);
        }
        // Any pending end-track fade belongs to the map we just left
        self.scheduled.clear();
        if let Some(track) = next {
            self.fade(host, track, self.music_volume, DEFAULT_FADE_MS);
            if track == END_TRACK {
                self.scheduled.push(ScheduledFade {
                    ticks_left: ms_to_ticks(DEFAULT_FADE_MS),
                    track,
                    target: 0.0,
                    duration_ms: END_TRACK_FADE_OUT_MS,
                });
            }
        }
        self.current_track = next;
    }

    fn fade(&self, host: &mut impl Host, track: u8, target: f32, duration_ms: u32) {
        match music_track_name(track) {
            Some(name) => host.fade_sound(name, target, duration_ms),
            None => log::warn!("No music track {}", track),
        }
    }
}

fn ms_to_ticks(ms: u32) -> u32 {
    ms * crate::consts::TICKS_PER_SECOND / 1000
}
