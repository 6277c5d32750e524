mod building;
mod engineer;
mod kinds;
mod loader;
mod resource;
mod snapshot;
mod unit;
mod world;

pub use building::Building;
pub use engineer::{CarriedLoad, EngineerState, MiningPhase};
pub use kinds::{
    BuildingKind, EntityKind, MenuItem, ResourceKind, UnitKind, BUILDING_SELECTION_RADIUS,
    ENGINEER_CAPACITY_STEP, INITIAL_ENGINEER_CAPACITY, MINING_MILLIS, PYLON_ACTIVATION_RADIUS,
    RESOURCE_RADIUS, UNIT_SELECTION_RADIUS,
};
pub use loader::{
    load_init_file_or_empty, parse_init_line, parse_init_list, read_init_file, InitLineError,
    InitLoadError, SpawnRecord,
};
pub use resource::Resource;
pub use snapshot::{BuildingSnapshot, ResourceSnapshot, UnitSnapshot, WorldSnapshot};
pub use unit::Unit;
pub use world::{Economy, World};

#[cfg(test)]
mod tests;
