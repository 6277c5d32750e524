use std::process::ExitCode;

use rts_engine::{run_headless, InputSnapshot, LoopSummary, StartupError, TilemapError};
use thiserror::Error;
use tracing::{error, info};

use super::bootstrap::{AppWiring, ConfigError};
use super::script::{InputScript, ScriptError, ScriptPlayer};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("failed to build fallback tile map: {0}")]
    Tilemap(#[from] TilemapError),
    #[error("failed to encode world snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = execute(app) {
        error!(error = %err, "run_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn execute(app: AppWiring) -> Result<(), RunError> {
    let AppWiring { config, mut world } = app;

    let summary: LoopSummary = match &config.script_path {
        Some(path) => {
            let script = InputScript::load(path)?;
            info!(
                script = %path.display(),
                frames = script.frames.len(),
                scripted_ticks = script.total_ticks(),
                "script_loaded"
            );
            let mut player = ScriptPlayer::new(script);
            run_headless(&config.loop_config, &mut world, &mut player)
        }
        None => {
            let mut idle = |_tick: u64, delta_millis: u32| InputSnapshot::idle(delta_millis);
            run_headless(&config.loop_config, &mut world, &mut idle)
        }
    };

    let digest = world.state_digest()?;
    info!(
        ticks = summary.ticks,
        simulated_millis = summary.simulated_millis,
        wall_ms = summary.wall_time.as_millis() as u64,
        metal = world.metal(),
        unobtainium = world.unobtainium(),
        units = world.units().len(),
        buildings = world.buildings().len(),
        resources = world.resources().len(),
        digest = %digest,
        "run_summary"
    );

    if config.json_output {
        println!("{}", serde_json::to_string_pretty(&world.snapshot())?);
    }
    Ok(())
}
