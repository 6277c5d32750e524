mod bootstrap;
mod loop_runner;
mod script;

pub use bootstrap::{
    build_app, build_world, AppWiring, ConfigError, GameConfig, DEFAULT_VIEWPORT, MAP_FILE,
    OBJECTS_FILE,
};
pub use loop_runner::{run, RunError};
pub use script::{InputScript, PanDirection, ScriptClick, ScriptError, ScriptFrame, ScriptPlayer};
