use std::path::{Path, PathBuf};

use rts_engine::{load_tmx, resolve_app_paths, LoopConfig, Tilemap, TilemapError, Viewport};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::loop_runner::RunError;
use crate::gameplay::{load_init_file_or_empty, SpawnRecord, World};

pub const OBJECTS_FILE: &str = "objects.csv";
pub const MAP_FILE: &str = "main.tmx";
pub const DEFAULT_VIEWPORT: Viewport = Viewport {
    width: 1024,
    height: 768,
};
const FALLBACK_TILE_PX: u32 = 32;
const FALLBACK_MAX_TILES_PER_SIDE: u32 = 1024;

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub objects_path: PathBuf,
    pub map_path: PathBuf,
    pub viewport: Viewport,
    pub script_path: Option<PathBuf>,
    pub json_output: bool,
    pub loop_config: LoopConfig,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing value for {flag}")]
    MissingValue { flag: String },
    #[error("invalid {flag} value '{value}' (expected {expected})")]
    InvalidValue {
        flag: String,
        value: String,
        expected: &'static str,
    },
    #[error("unknown argument '{argument}'")]
    UnknownArgument { argument: String },
}

impl GameConfig {
    pub fn with_assets_dir(assets_dir: &Path) -> Self {
        Self {
            objects_path: assets_dir.join(OBJECTS_FILE),
            map_path: assets_dir.join(MAP_FILE),
            viewport: DEFAULT_VIEWPORT,
            script_path: None,
            json_output: false,
            loop_config: LoopConfig::default(),
        }
    }

    /// Applies `--objects`, `--map`, `--ticks`, `--tick-ms`, `--script` and `--json`.
    pub fn apply_args(mut self, args: &[String]) -> Result<Self, ConfigError> {
        let mut index = 0usize;
        while index < args.len() {
            let flag = args[index].as_str();
            match flag {
                "--json" => {
                    self.json_output = true;
                    index += 1;
                    continue;
                }
                "--objects" | "--map" | "--ticks" | "--tick-ms" | "--script" => {}
                _ => {
                    return Err(ConfigError::UnknownArgument {
                        argument: flag.to_string(),
                    });
                }
            }

            let value = args
                .get(index + 1)
                .ok_or_else(|| ConfigError::MissingValue {
                    flag: flag.to_string(),
                })?;
            match flag {
                "--objects" => self.objects_path = PathBuf::from(value),
                "--map" => self.map_path = PathBuf::from(value),
                "--script" => self.script_path = Some(PathBuf::from(value)),
                "--ticks" => self.loop_config.max_ticks = parse_number(flag, value, "u64")?,
                _ => self.loop_config.tick_millis = parse_number(flag, value, "u32")?,
            }
            index += 2;
        }
        Ok(self)
    }
}

fn parse_number<T: std::str::FromStr>(
    flag: &str,
    value: &str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.parse::<T>().map_err(|_| ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
        expected,
    })
}

pub struct AppWiring {
    pub config: GameConfig,
    pub world: World,
}

pub fn build_app(args: &[String]) -> Result<AppWiring, RunError> {
    init_tracing();
    info!("=== RTS Startup ===");

    let paths = resolve_app_paths()?;
    let config = GameConfig::with_assets_dir(&paths.assets_dir).apply_args(args)?;
    info!(
        root = %paths.root.display(),
        objects = %config.objects_path.display(),
        map = %config.map_path.display(),
        "config_resolved"
    );
    let world = build_world(&config)?;

    Ok(AppWiring { config, world })
}

/// Loads the initialization list and tile map. Neither file is required: a missing list
/// gives an empty world and a missing map gives an open one.
pub fn build_world(config: &GameConfig) -> Result<World, TilemapError> {
    let records = load_init_file_or_empty(&config.objects_path);
    let (tilemap, records) = match load_tmx(&config.map_path) {
        Ok(tilemap) => (tilemap, records),
        Err(err) => {
            warn!(error = %err, "map_unavailable");
            let tilemap = fallback_tilemap(&records, config.viewport)?;
            let records = records_on_map(records, &tilemap);
            (tilemap, records)
        }
    };
    info!(
        width = tilemap.width(),
        height = tilemap.height(),
        tile_width = tilemap.tile_width(),
        tile_height = tilemap.tile_height(),
        "map_loaded"
    );

    let mut world = World::new(tilemap, config.viewport);
    world.populate(&records);
    Ok(world)
}

/// All-clear map large enough for the viewport and every spawn point, up to
/// `FALLBACK_MAX_TILES_PER_SIDE` tiles in each direction.
fn fallback_tilemap(
    records: &[SpawnRecord],
    viewport: Viewport,
) -> Result<Tilemap, TilemapError> {
    let (max_x, max_y) = records.iter().fold(
        (f64::from(viewport.width), f64::from(viewport.height)),
        |(x, y), record| (x.max(record.position.x), y.max(record.position.y)),
    );
    let tiles = |extent: f64| {
        ((extent / f64::from(FALLBACK_TILE_PX)).ceil() as u32)
            .saturating_add(1)
            .min(FALLBACK_MAX_TILES_PER_SIDE)
    };
    Tilemap::open(tiles(max_x), tiles(max_y), FALLBACK_TILE_PX, FALLBACK_TILE_PX)
}

fn records_on_map(records: Vec<SpawnRecord>, tilemap: &Tilemap) -> Vec<SpawnRecord> {
    records
        .into_iter()
        .filter(|record| {
            let on_map = tilemap.tile_coords(record.position).is_some();
            if !on_map {
                warn!(
                    kind = ?record.kind,
                    x = record.position.x,
                    y = record.position.y,
                    "spawn_outside_map"
                );
            }
            on_map
        })
        .collect()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
