//! Dome Sim entry point
//!
//! Runs a headless session on the demos' 30 Hz frame clock and writes the
//! recorded markers to `markers.csv` on shutdown.
//!
//! Usage: `dome-sim [PRESET | CONFIG.json] [FRAMES]`

use std::process::ExitCode;

use dome_sim::consts::FRAME_RATE;
use dome_sim::export::{self, MARKERS_FILE, MarkerSnapshot};
use dome_sim::sim::{SimEvent, Simulation, tick};
use dome_sim::{SimConfig, SimError};

/// 30 seconds of frames
const DEFAULT_FRAMES: u32 = 900;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), SimError> {
    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(arg) => SimConfig::resolve(&arg)?,
        None => SimConfig::default(),
    };
    let frames = match args.next() {
        Some(n) => n
            .parse::<u32>()
            .map_err(|e| SimError::InvalidConfig(format!("frame count '{}': {}", n, e)))?,
        None => DEFAULT_FRAMES,
    };

    log::info!("Dome Sim starting ({} frames at {} Hz)", frames, FRAME_RATE);
    let mut sim = Simulation::new(config)?;
    let dt = 1.0 / FRAME_RATE;
    let frames_per_second = FRAME_RATE as u32;

    for frame in 1..=frames {
        for event in tick(&mut sim, dt)? {
            match event {
                SimEvent::Impact { id, position, radius } => log::info!(
                    "Impact #{} at ({:.1}, {:.1}) r={:.2}",
                    id,
                    position.x,
                    position.z,
                    radius
                ),
                other => log::trace!("{:?}", other),
            }
        }

        if frame % frames_per_second == 0 {
            let markers = sim.engine.markers();
            log::debug!(
                "t={:.0}s in flight={} outer={} inner={} impacts={}",
                sim.elapsed,
                sim.engine.projectiles().len(),
                markers.outer_entries.len(),
                markers.inner_entries.len(),
                markers.impacts.len()
            );
        }
    }

    let snapshot = MarkerSnapshot::from_log(&sim.shutdown());
    export::save_csv(&snapshot, MARKERS_FILE)?;
    Ok(())
}
