//! Fixed-rate simulation tick and input handlers
//!
//! One call to `tick` is one host timer callback. Exactly one phase runs per
//! tick; hole, win and ascend phases freeze the ball until their timer runs out.

use glam::Vec2;

use super::control::Direction;
use super::physics::{TileEntry, step_ball};
use super::state::{Countdown, GameEvent, GameState, Phase};
use crate::settings::ControlScheme;

/// Status line for an ordinary goal
pub const LEVEL_COMPLETE_STATUS: &str = "Level complete!";
/// Status line for the finale goal
pub const FINALE_STATUS: &str = "egg";

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState) {
    state.time_ticks += 1;

    match state.phase {
        Phase::HoleTransition { timer } => tick_hole(state, timer),
        Phase::Win { timer } => tick_win(state, timer),
        Phase::Ascend { timer } => tick_ascend(state, timer),
        Phase::Normal => tick_normal(state),
    }
}

/// Layer switches exactly when the timer reads 0
fn tick_hole(state: &mut GameState, timer: i32) {
    let max = state.tuning.hole_animation_max;
    if timer == 0 {
        let (x, y) = state.ball.cell();
        let from = state.ball.layer;
        match state.map.find_layer_with_hole(x, y, from) {
            Some(to) => {
                state.ball.layer = to;
                log::debug!("Ball fell from layer {} to layer {} at ({}, {})", from, to, x, y);
                state.emit(GameEvent::LayerChanged { from, to });
            }
            None => log::warn!("Hole at ({}, {}) on layer {} leads nowhere", x, y, from),
        }
        state.phase = Phase::HoleTransition { timer: -1 };
    } else if timer <= -max {
        state.phase = Phase::Normal;
    } else {
        state.phase = Phase::HoleTransition { timer: timer - 1 };
    }
}

fn tick_win(state: &mut GameState, timer: Countdown) {
    match timer {
        Countdown::Inactive => {}
        Countdown::Counting(0) => match state.campaign.successor(&state.map_id).cloned() {
            Some(next) => {
                state.phase = Phase::Normal;
                state.load_map(&next);
            }
            None => {
                log::info!("Campaign complete in {} ticks", state.time_ticks);
                state.phase = Phase::Win {
                    timer: Countdown::Inactive,
                };
                state.emit(GameEvent::CampaignComplete);
            }
        },
        Countdown::Counting(n) => {
            state.phase = Phase::Win {
                timer: Countdown::Counting(n - 1),
            };
        }
    }
}

/// Counts down by 1 to zero, loads the bonus map, then by 2 to -max
fn tick_ascend(state: &mut GameState, timer: i32) {
    if timer == 0 {
        match state.campaign.bonus().cloned() {
            Some(bonus) => {
                log::info!("Ascending to {}", bonus);
                state.load_map(&bonus);
            }
            None => log::warn!("Secret passage entered but the campaign has no bonus map"),
        }
    }

    let max = state.tuning.ascend_max;
    state.phase = if timer <= -max {
        Phase::Normal
    } else if timer < 0 {
        Phase::Ascend { timer: timer - 2 }
    } else {
        Phase::Ascend { timer: timer - 1 }
    };
}

fn tick_normal(state: &mut GameState) {
    state.flash_ticks = state.flash_ticks.saturating_sub(1);
    state.transition_ticks = state.transition_ticks.saturating_sub(1);

    let tilt = state.control.update_tilt(state.tuning.tilt_accel);
    let layer = state.ball.layer;
    let result = step_ball(&mut state.ball, &mut state.map, tilt, &state.tuning);

    for (x, y) in result.broken {
        state.emit(GameEvent::WallBroken { x, y, layer });
    }

    match result.entered {
        Some(TileEntry::Hole) => {
            let (x, y) = state.ball.cell();
            freeze(state);
            state.phase = Phase::HoleTransition {
                timer: state.tuning.hole_animation_max,
            };
            state.emit(GameEvent::HoleEntered { x, y, layer });
        }
        Some(TileEntry::Goal) => {
            freeze(state);
            let finale = state.campaign.finale() == Some(&state.map_id);
            let ticks = if finale {
                state.ascended = true;
                state.status = FINALE_STATUS.to_string();
                state.tuning.final_win_ticks
            } else {
                if !state.on_bonus_chain() {
                    state.status = LEVEL_COMPLETE_STATUS.to_string();
                }
                state.tuning.win_ticks
            };
            state.phase = Phase::Win {
                timer: Countdown::Counting(ticks),
            };
            log::info!("Goal reached on {}", state.map_id);
            state.emit(GameEvent::GoalReached {
                map: state.map_id.clone(),
                finale,
            });
            if finale {
                state.emit(GameEvent::Ascended);
            }
        }
        Some(TileEntry::Secret) => {
            freeze(state);
            state.phase = Phase::Ascend {
                timer: state.tuning.ascend_max,
            };
            log::info!("Secret passage entered on {}", state.map_id);
            state.emit(GameEvent::SecretEntered);
        }
        None => {}
    }
}

/// Stop the ball and drop any pending tilt
fn freeze(state: &mut GameState) {
    state.ball.stop();
    state.control.tilt = Vec2::ZERO;
}

/// Click on a host grid cell (coordinates include the control border)
pub fn cell_clicked(state: &mut GameState, x: i32, y: i32) {
    if state.scheme != ControlScheme::EdgeClick {
        return;
    }
    let (w, h) = state.grid_size();
    if let Some(dir) = Direction::from_edge_cell(x, y, w, h) {
        state.control.toggle(dir);
    }
}

pub fn key_down(state: &mut GameState, code: u32) {
    set_key(state, code, true);
}

pub fn key_up(state: &mut GameState, code: u32) {
    set_key(state, code, false);
}

fn set_key(state: &mut GameState, code: u32, held: bool) {
    if state.scheme != ControlScheme::KeyHold {
        return;
    }
    if let Some(dir) = Direction::from_key(code) {
        state.control.set(dir, held);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::control::{ControlState, keys};
    use crate::sim::levels::{Campaign, MapDef, MapId};
    use crate::sim::map::TileMap;
    use crate::sim::tile::Tile;
    use crate::settings::Tuning;
    use proptest::prelude::*;

    fn single(rows: &[&str], width: usize) -> Campaign {
        let map = TileMap::parse(width, rows.len(), &[rows]).unwrap();
        Campaign::new(MapId::from("only"), [(MapId::from("only"), MapDef { map, next: None })]).unwrap()
    }

    fn keyhold(campaign: Campaign) -> GameState {
        let mut state = GameState::new(campaign, Tuning::default(), ControlScheme::KeyHold).unwrap();
        state.drain_events();
        state
    }

    fn run_until(state: &mut GameState, limit: usize, done: impl Fn(&GameState) -> bool) {
        for _ in 0..limit {
            if done(state) {
                return;
            }
            tick(state);
        }
        panic!("condition not reached in {} ticks", limit);
    }

    #[test]
    fn test_roll_down_into_goal() {
        let mut state = keyhold(single(&["X X X", "X s X", "X G X"], 3));
        key_down(&mut state, keys::ARROW_DOWN);
        run_until(&mut state, 200, |s| s.phase.is_win());

        assert!(state.ball.pos.y >= 2.0 && state.ball.pos.y < 3.0);
        assert_eq!(state.ball.pos.x, 1.0);
        assert_eq!(state.ball.vel, Vec2::ZERO);
        assert_eq!(state.control.tilt, Vec2::ZERO);
        assert_eq!(state.status, LEVEL_COMPLETE_STATUS);
        assert_eq!(
            state.phase,
            Phase::Win {
                timer: Countdown::Counting(60)
            }
        );
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::GoalReached {
            map: MapId::from("only"),
            finale: false
        }));
    }

    #[test]
    fn test_terminal_map_stays_in_win() {
        let mut state = keyhold(single(&["X X X", "X s X", "X G X"], 3));
        key_down(&mut state, keys::S);
        run_until(&mut state, 200, |s| s.phase.is_win());
        for _ in 0..500 {
            tick(&mut state);
        }
        assert_eq!(
            state.phase,
            Phase::Win {
                timer: Countdown::Inactive
            }
        );
        assert_eq!(state.map_id.as_str(), "only");
        let complete = state
            .drain_events()
            .into_iter()
            .filter(|e| *e == GameEvent::CampaignComplete)
            .count();
        assert_eq!(complete, 1);
    }

    #[test]
    fn test_win_loads_successor_after_countdown() {
        let a = TileMap::parse(3, 3, &[["X X X", "X s X", "X G X"]]).unwrap();
        let b = TileMap::parse(4, 3, &[["X X X X", "X G s X", "X X X X"]]).unwrap();
        let campaign = Campaign::new(
            MapId::from("a"),
            [
                (MapId::from("a"), MapDef { map: a, next: Some(MapId::from("b")) }),
                (MapId::from("b"), MapDef { map: b, next: None }),
            ],
        )
        .unwrap();
        let mut state = keyhold(campaign);
        key_down(&mut state, keys::ARROW_DOWN);
        run_until(&mut state, 200, |s| s.phase.is_win());

        // 60 counting ticks, then the load on the tick that reads 0
        for _ in 0..60 {
            tick(&mut state);
            assert_eq!(state.map_id.as_str(), "a");
        }
        tick(&mut state);
        assert_eq!(state.map_id.as_str(), "b");
        assert_eq!(state.phase, Phase::Normal);
        assert_eq!(state.ball.pos, Vec2::new(2.0, 1.0));
        assert!(!state.control.down);
    }

    fn hole_state() -> GameState {
        let map = TileMap::parse(
            4,
            3,
            &[
                ["X X X X", "X s O X", "X X X X"],
                ["X X X X", "X   O X", "X X X X"],
            ],
        )
        .unwrap();
        keyhold(Campaign::new(MapId::from("h"), [(MapId::from("h"), MapDef { map, next: None })]).unwrap())
    }

    #[test]
    fn test_hole_switches_layer_exactly_at_zero() {
        let mut state = hole_state();
        key_down(&mut state, keys::D);
        run_until(&mut state, 200, |s| matches!(s.phase, Phase::HoleTransition { .. }));
        assert_eq!(state.phase, Phase::HoleTransition { timer: 15 });
        assert_eq!(state.ball.vel, Vec2::ZERO);
        let pos = state.ball.pos;

        let mut changes = Vec::new();
        while let Phase::HoleTransition { timer } = state.phase {
            let before = state.ball.layer;
            tick(&mut state);
            if state.ball.layer != before {
                changes.push(timer);
            }
        }
        assert_eq!(changes, vec![0]);
        assert_eq!(state.ball.layer, 1);
        assert_eq!(state.ball.pos, pos);
        assert_eq!(state.phase, Phase::Normal);
        assert!(state
            .drain_events()
            .contains(&GameEvent::LayerChanged { from: 0, to: 1 }));
    }

    #[test]
    fn test_hole_transition_length() {
        let mut state = hole_state();
        state.phase = Phase::HoleTransition { timer: 15 };
        let mut ticks = 0;
        while !state.phase.is_normal() {
            tick(&mut state);
            ticks += 1;
        }
        // 15 -> -15 is 31 readings, the last one clears the phase
        assert_eq!(ticks, 31);
    }

    #[test]
    fn test_phase_freezes_physics() {
        let mut state = hole_state();
        state.ball.vel = Vec2::new(0.2, 0.0);
        state.phase = Phase::Win {
            timer: Countdown::Counting(10),
        };
        let pos = state.ball.pos;
        tick(&mut state);
        assert_eq!(state.ball.pos, pos);
    }

    fn secret_campaign() -> Campaign {
        // Enough run-up to hit the breakable wall above the shatter speed
        let main = TileMap::parse(
            9,
            3,
            &[["X X X X X X X X X", "X s           # X", "X X X X X X X X X"]],
        )
        .unwrap();
        let bonus = TileMap::parse(3, 3, &[["X X X", "X s X", "X G X"]]).unwrap();
        Campaign::new(
            MapId::from("main"),
            [
                (MapId::from("main"), MapDef { map: main, next: None }),
                (MapId::from("bonus"), MapDef { map: bonus, next: None }),
            ],
        )
        .unwrap()
        .with_bonus(MapId::from("bonus"))
        .unwrap()
        .with_finale(MapId::from("bonus"))
        .unwrap()
    }

    #[test]
    fn test_breaking_wall_then_ascending() {
        let mut state = keyhold(secret_campaign());
        key_down(&mut state, keys::ARROW_RIGHT);
        run_until(&mut state, 400, |s| s.map.tile(0, 7, 1) == Tile::BrokenBreakableWall);
        assert!(state.ball.vel.x < 0.0);
        assert!(state
            .drain_events()
            .contains(&GameEvent::WallBroken { x: 7, y: 1, layer: 0 }));

        run_until(&mut state, 400, |s| matches!(s.phase, Phase::Ascend { .. }));
        assert_eq!(state.phase, Phase::Ascend { timer: 240 });
        assert_eq!(state.ball.vel, Vec2::ZERO);
        assert!(state.drain_events().contains(&GameEvent::SecretEntered));

        // 240 ticks down to zero, the bonus map loads on the zero tick
        for _ in 0..240 {
            tick(&mut state);
        }
        assert_eq!(state.map_id.as_str(), "main");
        assert_eq!(state.phase, Phase::Ascend { timer: 0 });
        tick(&mut state);
        assert_eq!(state.map_id.as_str(), "bonus");
        assert_eq!(state.phase, Phase::Ascend { timer: -1 });

        // then twice as fast through the negative half
        tick(&mut state);
        assert_eq!(state.phase, Phase::Ascend { timer: -3 });
        run_until(&mut state, 200, |s| s.phase.is_normal());
        assert_eq!(state.map_id.as_str(), "bonus");
    }

    #[test]
    fn test_finale_goal_sets_ascended() {
        let mut state = keyhold(secret_campaign());
        state.load_map(&MapId::from("bonus"));
        state.drain_events();
        key_down(&mut state, keys::ARROW_DOWN);
        run_until(&mut state, 200, |s| s.phase.is_win());

        assert!(state.ascended);
        assert_eq!(state.status, FINALE_STATUS);
        assert_eq!(
            state.phase,
            Phase::Win {
                timer: Countdown::Counting(90)
            }
        );
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Ascended));
    }

    #[test]
    fn test_slow_roll_does_not_break_wall() {
        // One cell of run-up is not enough speed to shatter
        let map = TileMap::parse(4, 3, &[["X X X X", "X s # X", "X X X X"]]).unwrap();
        let mut state = keyhold(
            Campaign::new(MapId::from("m"), [(MapId::from("m"), MapDef { map, next: None })]).unwrap(),
        );
        key_down(&mut state, keys::ARROW_RIGHT);
        for _ in 0..300 {
            tick(&mut state);
        }
        assert_eq!(state.map.tile(0, 2, 1), Tile::BreakableWall);
        assert!(state.ball.pos.x < 2.0);
    }

    #[test]
    fn test_edge_click_toggles_only_in_edge_scheme() {
        let campaign = single(&["X X X", "X s X", "X G X"], 3);
        let mut state = GameState::new(campaign.clone(), Tuning::default(), ControlScheme::EdgeClick).unwrap();
        // 3x3 map + border = 5x5 grid; bottom edge is y = 4
        cell_clicked(&mut state, 2, 4);
        assert!(state.control.down);
        cell_clicked(&mut state, 2, 4);
        assert!(!state.control.down);
        cell_clicked(&mut state, 2, 2);
        cell_clicked(&mut state, 0, 0);
        assert_eq!(state.control, ControlState::default());
        key_down(&mut state, keys::ARROW_UP);
        assert!(!state.control.up);

        let mut state = keyhold(campaign);
        cell_clicked(&mut state, 2, 0);
        assert!(!state.control.up);
        key_down(&mut state, keys::ARROW_UP);
        key_down(&mut state, keys::ARROW_RIGHT);
        assert!(state.control.up && state.control.right);
        key_up(&mut state, keys::ARROW_UP);
        assert!(!state.control.up && state.control.right);
    }

    #[test]
    fn test_flash_and_transition_count_down_in_normal_play() {
        let mut state = keyhold(single(&["X X X", "X s X", "X G X"], 3));
        assert_eq!(state.flash_ticks, 45);
        assert_eq!(state.transition_ticks, 15);
        for _ in 0..20 {
            tick(&mut state);
        }
        assert_eq!(state.flash_ticks, 25);
        assert_eq!(state.transition_ticks, 0);
    }

    #[test]
    fn test_builtin_tutorial_playthrough() {
        let campaign = Campaign::builtin().unwrap();
        let mut state = keyhold(campaign);
        // Right along the top corridor, down the right side, then up the diagonal
        key_down(&mut state, keys::ARROW_RIGHT);
        run_until(&mut state, 600, |s| s.ball.cell().0 == 11);
        key_up(&mut state, keys::ARROW_RIGHT);
        key_down(&mut state, keys::ARROW_DOWN);
        run_until(&mut state, 600, |s| s.ball.cell().1 == 11 && s.ball.vel.y == 0.0);
        key_up(&mut state, keys::ARROW_DOWN);
        key_down(&mut state, keys::ARROW_UP);
        key_down(&mut state, keys::ARROW_LEFT);
        run_until(&mut state, 2000, |s| s.phase.is_win());
        assert_eq!(state.map_id.as_str(), "tutorial");
        run_until(&mut state, 100, |s| s.phase.is_normal());
        assert_eq!(state.map_id.as_str(), "attractor");
    }

    proptest! {
        #[test]
        fn prop_load_always_resets_to_spawn(
            x in 1.0f32..2.9, y in 1.0f32..1.9, vx in -1.0f32..1.0, vy in -1.0f32..1.0,
            up: bool, down: bool,
        ) {
            let mut state = hole_state();
            state.ball.pos = Vec2::new(x, y);
            state.ball.vel = Vec2::new(vx, vy);
            state.ball.layer = 1;
            state.control.up = up;
            state.control.down = down;
            state.load_map(&MapId::from("h"));
            prop_assert_eq!(state.ball.pos, Vec2::new(1.0, 1.0));
            prop_assert_eq!(state.ball.vel, Vec2::ZERO);
            prop_assert_eq!(state.ball.layer, 0);
            prop_assert!(!state.control.up && !state.control.down);
        }
    }
}
