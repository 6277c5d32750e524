use rts_engine::{
    Camera, EntityId, EntityIdAllocator, InputSnapshot, Position, Scene, Tilemap, Viewport,
};
use tracing::{debug, info};

use super::building::Building;
use super::kinds::{
    BuildingKind, EntityKind, ResourceKind, UnitKind, BUILDING_SELECTION_RADIUS,
    ENGINEER_CAPACITY_STEP, INITIAL_ENGINEER_CAPACITY, RESOURCE_RADIUS, UNIT_SELECTION_RADIUS,
};
use super::loader::SpawnRecord;
use super::resource::Resource;
use super::unit::Unit;
use super::MenuItem;

/// The two global currencies.
///
/// Balances are signed: `consume_metal` does not guard against overdraft, callers check
/// `can_afford` first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Economy {
    metal: i64,
    unobtainium: i64,
}

impl Economy {
    pub fn metal(&self) -> i64 {
        self.metal
    }

    pub fn unobtainium(&self) -> i64 {
        self.unobtainium
    }

    pub fn can_afford(&self, metal_cost: i64) -> bool {
        self.metal >= metal_cost
    }

    pub fn consume_metal(&mut self, amount: i64) {
        self.metal -= amount;
    }

    pub fn add_metal(&mut self, amount: i64) {
        self.metal += amount;
    }

    pub fn add_unobtainium(&mut self, amount: i64) {
        self.unobtainium += amount;
    }

    pub fn deposit(&mut self, kind: ResourceKind, amount: u32) {
        match kind {
            ResourceKind::Metal => self.add_metal(i64::from(amount)),
            ResourceKind::Unobtainium => self.add_unobtainium(i64::from(amount)),
        }
    }
}

/// The single world-wide selection.
///
/// When an entity claims the slot during its own update the previous occupant is parked
/// in `displaced`; the world deselects it as soon as that entity's update returns.
#[derive(Debug, Default)]
pub(crate) struct SelectionSlot {
    current: Option<EntityId>,
    displaced: Option<EntityId>,
}

impl SelectionSlot {
    pub(crate) fn claim(&mut self, id: EntityId) {
        if let Some(previous) = self.current.replace(id) {
            if previous != id {
                self.displaced = Some(previous);
            }
        }
    }

    fn take_displaced(&mut self) -> Option<EntityId> {
        self.displaced.take()
    }
}

/// Everything entities may touch during their update besides the entity collections.
#[derive(Debug)]
pub(crate) struct WorldState {
    pub(crate) tilemap: Tilemap,
    pub(crate) camera: Camera,
    pub(crate) economy: Economy,
    pub(crate) engineer_capacity: u32,
    pub(crate) selection: SelectionSlot,
    pub(crate) ids: EntityIdAllocator,
    tick: u64,
}

impl WorldState {
    pub(crate) fn raise_engineer_capacity(&mut self) {
        self.engineer_capacity = self.engineer_capacity.saturating_add(ENGINEER_CAPACITY_STEP);
        info!(capacity = self.engineer_capacity, "capacity_raised");
    }
}

pub(crate) struct UnitContext<'a> {
    pub(crate) input: &'a InputSnapshot,
    pub(crate) state: &'a mut WorldState,
    pub(crate) buildings: &'a mut Vec<Building>,
    pub(crate) resources: &'a mut [Resource],
}

pub(crate) struct BuildingContext<'a> {
    pub(crate) input: &'a InputSnapshot,
    pub(crate) state: &'a mut WorldState,
    pub(crate) units: &'a mut Vec<Unit>,
}

/// Owns every entity, the economy, the selection slot and the camera, and runs the
/// fixed per-tick update order:
///
/// 1. resources (depleted ones are dropped)
/// 2. buildings
/// 3. units (self-destructed trucks are dropped)
/// 4. camera
/// 5. selection reconciliation
#[derive(Debug)]
pub struct World {
    units: Vec<Unit>,
    buildings: Vec<Building>,
    resources: Vec<Resource>,
    state: WorldState,
}

impl World {
    pub fn new(tilemap: Tilemap, viewport: Viewport) -> Self {
        let camera = Camera::new(viewport, tilemap.pixel_width(), tilemap.pixel_height());
        Self {
            units: Vec::new(),
            buildings: Vec::new(),
            resources: Vec::new(),
            state: WorldState {
                tilemap,
                camera,
                economy: Economy::default(),
                engineer_capacity: INITIAL_ENGINEER_CAPACITY,
                selection: SelectionSlot::default(),
                ids: EntityIdAllocator::default(),
                tick: 0,
            },
        }
    }

    /// Registers every record in order.
    pub fn populate<'r>(&mut self, records: impl IntoIterator<Item = &'r SpawnRecord>) {
        for record in records {
            self.spawn(record.kind, record.position);
        }
        info!(
            units = self.units.len(),
            buildings = self.buildings.len(),
            resources = self.resources.len(),
            "world_loaded"
        );
    }

    pub fn spawn(&mut self, kind: EntityKind, position: Position) -> EntityId {
        match kind {
            EntityKind::Unit(kind) => self.spawn_unit(kind, position),
            EntityKind::Building(kind) => self.spawn_building(kind, position),
            EntityKind::Resource(kind) => self.spawn_resource(kind, position),
        }
    }

    pub fn spawn_unit(&mut self, kind: UnitKind, position: Position) -> EntityId {
        let id = self.state.ids.allocate();
        self.units.push(Unit::new(id, kind, position));
        id
    }

    pub fn spawn_building(&mut self, kind: BuildingKind, position: Position) -> EntityId {
        let id = self.state.ids.allocate();
        self.buildings.push(Building::new(id, kind, position));
        id
    }

    pub fn spawn_resource(&mut self, kind: ResourceKind, position: Position) -> EntityId {
        self.spawn_resource_with_amount(kind, position, kind.initial_amount())
    }

    pub fn spawn_resource_with_amount(
        &mut self,
        kind: ResourceKind,
        position: Position,
        amount: u32,
    ) -> EntityId {
        let id = self.state.ids.allocate();
        self.resources.push(Resource::with_amount(id, kind, position, amount));
        id
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn unit(&self, id: EntityId) -> Option<&Unit> {
        self.units.iter().find(|unit| unit.id() == id)
    }

    pub fn unit_mut(&mut self, id: EntityId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|unit| unit.id() == id)
    }

    pub fn building(&self, id: EntityId) -> Option<&Building> {
        self.buildings.iter().find(|building| building.id() == id)
    }

    pub fn resource(&self, id: EntityId) -> Option<&Resource> {
        self.resources.iter().find(|resource| resource.id() == id)
    }

    /// Position of any live entity, whatever its kind.
    pub fn position_of(&self, id: EntityId) -> Option<Position> {
        self.unit(id)
            .map(Unit::position)
            .or_else(|| self.building(id).map(Building::position))
            .or_else(|| self.resource(id).map(Resource::position))
    }

    pub fn unit_at(&self, position: Position) -> Option<&Unit> {
        unit_at(&self.units, position)
    }

    pub fn building_at(&self, position: Position) -> Option<&Building> {
        building_at(&self.buildings, position)
    }

    pub fn resource_at(&self, position: Position) -> Option<&Resource> {
        resource_at(&self.resources, position)
    }

    pub fn economy(&self) -> Economy {
        self.state.economy
    }

    pub fn metal(&self) -> i64 {
        self.state.economy.metal()
    }

    pub fn unobtainium(&self) -> i64 {
        self.state.economy.unobtainium()
    }

    pub fn consume_metal(&mut self, amount: i64) {
        self.state.economy.consume_metal(amount);
    }

    pub fn add_metal(&mut self, amount: i64) {
        self.state.economy.add_metal(amount);
    }

    pub fn add_unobtainium(&mut self, amount: i64) {
        self.state.economy.add_unobtainium(amount);
    }

    pub fn engineer_capacity(&self) -> u32 {
        self.state.engineer_capacity
    }

    /// External upgrade event: every engineer extracts one more unit per cycle.
    pub fn raise_engineer_capacity(&mut self) {
        self.state.raise_engineer_capacity();
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.state.tilemap
    }

    pub fn camera(&self) -> &Camera {
        &self.state.camera
    }

    pub fn tick_count(&self) -> u64 {
        self.state.tick
    }

    pub fn selected(&self) -> Option<EntityId> {
        self.state.selection.current
    }

    /// Selects a unit or building, deselecting the previous occupant of the slot.
    /// Returns `false` when `id` names neither.
    pub fn select(&mut self, id: EntityId) -> bool {
        if let Some(unit) = self.units.iter_mut().find(|unit| unit.id() == id) {
            unit.select(&mut self.state);
        } else if let Some(building) = self.buildings.iter_mut().find(|b| b.id() == id) {
            building.select(&mut self.state);
        } else {
            return false;
        }
        release_displaced(&mut self.state.selection, &mut self.units, &mut self.buildings);
        true
    }

    /// Deselects the current occupant, if any, and releases the camera.
    pub fn clear_selection(&mut self) {
        if let Some(id) = self.state.selection.current.take() {
            deselect(id, &mut self.units, &mut self.buildings);
        }
        self.state.camera.stop_following();
    }

    /// Numbered menu of whatever is selected; empty when nothing is.
    pub fn menu_items(&self) -> Vec<MenuItem> {
        let Some(id) = self.selected() else {
            return Vec::new();
        };
        self.unit(id)
            .map(Unit::menu_items)
            .or_else(|| self.building(id).map(Building::menu_items))
            .unwrap_or_default()
    }

    pub fn update(&mut self, input: &InputSnapshot) {
        self.state.tick += 1;
        self.update_resources();
        self.update_buildings(input);
        self.update_units(input);
        self.update_camera(input);
        self.reconcile_selection();
    }

    fn update_resources(&mut self) {
        for resource in &mut self.resources {
            resource.update();
        }
        self.resources.retain(|resource| {
            if resource.is_depleted() {
                debug!(resource = resource.id().0, "resource_removed");
                return false;
            }
            true
        });
    }

    fn update_buildings(&mut self, input: &InputSnapshot) {
        let mut buildings = std::mem::take(&mut self.buildings);
        for index in 0..buildings.len() {
            let mut ctx = BuildingContext {
                input,
                state: &mut self.state,
                units: &mut self.units,
            };
            buildings[index].update(&mut ctx);
            release_displaced(&mut self.state.selection, &mut self.units, &mut buildings);
        }
        self.buildings = buildings;
    }

    fn update_units(&mut self, input: &InputSnapshot) {
        let mut units = std::mem::take(&mut self.units);
        for index in 0..units.len() {
            let mut ctx = UnitContext {
                input,
                state: &mut self.state,
                buildings: &mut self.buildings,
                resources: &mut self.resources,
            };
            units[index].update(&mut ctx);
            release_displaced(&mut self.state.selection, &mut units, &mut self.buildings);
        }
        units.retain(|unit| {
            if unit.is_destroyed() {
                debug!(unit = unit.id().0, kind = ?unit.kind(), "unit_removed");
                return false;
            }
            true
        });
        self.units = units;
    }

    fn update_camera(&mut self, input: &InputSnapshot) {
        let followed = self
            .state
            .camera
            .following()
            .and_then(|id| self.position_of(id));
        self.state.camera.update(input, followed);
    }

    fn reconcile_selection(&mut self) {
        let Some(id) = self.state.selection.current else {
            return;
        };
        let still_selected = self
            .unit(id)
            .map(Unit::is_selected)
            .or_else(|| self.building(id).map(Building::is_selected))
            .unwrap_or(false);
        if !still_selected {
            self.state.selection.current = None;
            debug!(entity = id.0, "selection_cleared");
        }
    }
}

impl Scene for World {
    fn update(&mut self, input: &InputSnapshot) {
        World::update(self, input);
    }

    fn tick_count(&self) -> u64 {
        self.state.tick
    }

    fn debug_title(&self) -> Option<String> {
        Some(format!(
            "rts units={} buildings={} resources={}",
            self.units.len(),
            self.buildings.len(),
            self.resources.len()
        ))
    }
}

fn release_displaced(
    selection: &mut SelectionSlot,
    units: &mut [Unit],
    buildings: &mut [Building],
) {
    if let Some(id) = selection.take_displaced() {
        deselect(id, units, buildings);
    }
}

fn deselect(id: EntityId, units: &mut [Unit], buildings: &mut [Building]) {
    if let Some(unit) = units.iter_mut().find(|unit| unit.id() == id) {
        unit.deselect();
    } else if let Some(building) = buildings.iter_mut().find(|building| building.id() == id) {
        building.deselect();
    }
}

/// First unit in insertion order within selection radius of `position`, not the nearest.
pub(crate) fn unit_at(units: &[Unit], position: Position) -> Option<&Unit> {
    units
        .iter()
        .find(|unit| unit.position().within(position, UNIT_SELECTION_RADIUS))
}

pub(crate) fn building_at(buildings: &[Building], position: Position) -> Option<&Building> {
    buildings
        .iter()
        .find(|building| building.position().within(position, BUILDING_SELECTION_RADIUS))
}

pub(crate) fn resource_at(resources: &[Resource], position: Position) -> Option<&Resource> {
    resources
        .iter()
        .find(|resource| resource.position().within(position, RESOURCE_RADIUS))
}

/// Closest depot to `position`; on equal distance the earlier building wins.
pub(crate) fn nearest_depot(buildings: &[Building], position: Position) -> Option<&Building> {
    let mut best: Option<(&Building, f64)> = None;
    for building in buildings.iter().filter(|building| building.kind().is_depot()) {
        let distance = building.position().distance(position);
        match best {
            Some((_, best_distance)) if best_distance <= distance => {}
            _ => best = Some((building, distance)),
        }
    }
    best.map(|(building, _)| building)
}
