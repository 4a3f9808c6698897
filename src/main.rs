//! Tilt Maze entry point
//!
//! On the web the page drives `WasmGame` from the library. Natively this runs
//! a headless session against a recording host and prints the final snapshot,
//! which is handy for checking level packs.
//!
//! Usage: `tilt-maze [level-pack.json]`
//! - `TILT_MAZE_SETTINGS`: path to a settings JSON file
//! - `TILT_MAZE_TICKS`: ticks to simulate (default 600)

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use tilt_maze::platform::RecordingHost;
    use tilt_maze::sim::Campaign;
    use tilt_maze::{GameSession, Settings};

    env_logger::init();
    log::info!("Tilt Maze (headless) starting...");

    let settings = match std::env::var("TILT_MAZE_SETTINGS") {
        Ok(path) => Settings::load(path)?,
        Err(_) => Settings::default(),
    };
    let campaign = match std::env::args().nth(1) {
        Some(path) => Campaign::from_json(&std::fs::read_to_string(path)?)?,
        None => Campaign::builtin()?,
    };
    let ticks: u64 = std::env::var("TILT_MAZE_TICKS")
        .ok()
        .and_then(|t| t.parse().ok())
        .unwrap_or(600);

    let mut session = GameSession::new(campaign, &settings, RecordingHost::new())?;
    session.on_init();
    for _ in 0..ticks {
        session.on_tick();
        session.host_mut().take_calls();
    }

    let snapshot = session.snapshot();
    log::info!(
        "Stopped after {} ticks on {} ({:?})",
        snapshot.time_ticks,
        snapshot.map_id,
        snapshot.phase
    );
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `platform::web::start`, this is just to satisfy the compiler
}
