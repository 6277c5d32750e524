mod camera;
mod geometry;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;
mod timer;

pub use camera::{Camera, CAMERA_MANUAL_SPEED_PX_PER_MS};
pub use geometry::{Position, DISTANCE_TOLERANCE};
pub use input::{Click, InputAction, InputSnapshot, MenuKey, MouseButton};
pub use loop_runner::{run_headless, InputSource, LoopConfig, LoopSummary};
pub use metrics::TickMetrics;
pub use rendering::{map_to_screen, screen_to_map, Viewport};
pub use scene::{
    EntityId, EntityIdAllocator, RenderableDesc, Scene, TileFlags, Tilemap, TilemapError,
};
pub use timer::Timer;
