use rts_engine::{sha256_hex, EntityId, MenuKey, Position, Timer};
use serde::Serialize;

use super::engineer::{CarriedLoad, MiningPhase};
use super::kinds::{BuildingKind, MenuItem, ResourceKind, UnitKind};
use super::world::World;

/// Read-only view of the world for the rendering layer and for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub metal: i64,
    pub unobtainium: i64,
    pub engineer_capacity: u32,
    pub selected: Option<EntityId>,
    pub camera: Position,
    pub camera_following: Option<EntityId>,
    pub menu: Vec<MenuItem>,
    pub units: Vec<UnitSnapshot>,
    pub buildings: Vec<BuildingSnapshot>,
    pub resources: Vec<ResourceSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UnitSnapshot {
    pub id: EntityId,
    pub kind: UnitKind,
    pub position: Position,
    pub target: Position,
    pub selected: bool,
    pub producing: Option<BuildingKind>,
    pub menu_choice: Option<u8>,
    /// Fraction of the running build or mining timer, if any.
    pub progress: Option<f32>,
    pub mining_phase: Option<MiningPhase>,
    pub carried: Option<CarriedLoad>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BuildingSnapshot {
    pub id: EntityId,
    pub kind: BuildingKind,
    pub position: Position,
    pub selected: bool,
    pub training: Option<UnitKind>,
    pub menu_choice: Option<u8>,
    pub progress: Option<f32>,
    pub activated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceSnapshot {
    pub id: EntityId,
    pub kind: ResourceKind,
    pub position: Position,
    pub amount: u32,
}

impl World {
    pub fn snapshot(&self) -> WorldSnapshot {
        let units = self
            .units()
            .iter()
            .map(|unit| UnitSnapshot {
                id: unit.id(),
                kind: unit.kind(),
                position: unit.position(),
                target: unit.target(),
                selected: unit.is_selected(),
                producing: unit.pending_building(),
                menu_choice: unit.menu_choice().map(MenuKey::number),
                progress: unit
                    .build_timer()
                    .or_else(|| unit.engineer().map(|engineer| engineer.mining_timer()))
                    .filter(|timer| timer.is_running())
                    .map(Timer::progress),
                mining_phase: unit.engineer().map(|engineer| engineer.phase()),
                carried: unit.engineer().and_then(|engineer| engineer.carried()),
            })
            .collect();
        let buildings = self
            .buildings()
            .iter()
            .map(|building| BuildingSnapshot {
                id: building.id(),
                kind: building.kind(),
                position: building.position(),
                selected: building.is_selected(),
                training: building.pending_unit(),
                menu_choice: building.menu_choice().map(MenuKey::number),
                progress: building
                    .is_training()
                    .then(|| building.train_timer().progress()),
                activated: building.is_activated(),
            })
            .collect();
        let resources = self
            .resources()
            .iter()
            .map(|resource| ResourceSnapshot {
                id: resource.id(),
                kind: resource.kind(),
                position: resource.position(),
                amount: resource.amount(),
            })
            .collect();

        WorldSnapshot {
            tick: self.tick_count(),
            metal: self.metal(),
            unobtainium: self.unobtainium(),
            engineer_capacity: self.engineer_capacity(),
            selected: self.selected(),
            camera: self.camera().offset(),
            camera_following: self.camera().following(),
            menu: self.menu_items(),
            units,
            buildings,
            resources,
        }
    }

    /// Lower-hex SHA-256 of the snapshot's JSON form. Identical input sequences give
    /// identical digests.
    pub fn state_digest(&self) -> Result<String, serde_json::Error> {
        let encoded = serde_json::to_vec(&self.snapshot())?;
        Ok(sha256_hex(&encoded))
    }
}
