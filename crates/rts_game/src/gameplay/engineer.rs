use rts_engine::{EntityId, Timer};
use serde::Serialize;
use tracing::debug;

use super::building::Building;
use super::kinds::{ResourceKind, MINING_MILLIS};
use super::resource::Resource;
use super::unit::Unit;
use super::world::{building_at, nearest_depot, resource_at, UnitContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MiningPhase {
    Seeking,
    MovingToResource,
    Mining,
    Returning,
}

/// Mined material on its way to a depot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CarriedLoad {
    pub kind: ResourceKind,
    pub amount: u32,
}

/// Mining loop state carried by engineer-kind units.
///
/// Transitions run once per tick after the unit has moved:
/// `Seeking -> MovingToResource -> Mining -> Returning -> Seeking`. The target resource is
/// remembered across a delivery so the engineer walks back to the same deposit.
#[derive(Debug, Clone)]
pub struct EngineerState {
    phase: MiningPhase,
    mining_timer: Timer,
    target_resource: Option<EntityId>,
    carried: Option<CarriedLoad>,
}

impl Default for EngineerState {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineerState {
    pub fn new() -> Self {
        Self {
            phase: MiningPhase::Seeking,
            mining_timer: Timer::new(MINING_MILLIS),
            target_resource: None,
            carried: None,
        }
    }

    pub fn phase(&self) -> MiningPhase {
        self.phase
    }

    pub fn is_mining_mode(&self) -> bool {
        self.phase != MiningPhase::Seeking
    }

    pub fn mining_timer(&self) -> &Timer {
        &self.mining_timer
    }

    pub fn target_resource(&self) -> Option<EntityId> {
        self.target_resource
    }

    pub fn carried(&self) -> Option<CarriedLoad> {
        self.carried
    }

    fn stop_mining(&mut self) {
        self.mining_timer.stop();
        self.mining_timer.reset();
        self.target_resource = None;
        self.phase = MiningPhase::Seeking;
    }

    fn advance(&mut self, unit: &mut Unit, ctx: &mut UnitContext<'_>) {
        if self.is_mining_mode() && unit.is_selected() && ctx.input.right_click().is_some() {
            debug!(unit = unit.id().0, phase = ?self.phase, "mining_cancelled");
            self.stop_mining();
            return;
        }

        match self.phase {
            MiningPhase::Seeking => self.seek(unit, ctx.resources),
            MiningPhase::MovingToResource => self.approach(unit, ctx.resources),
            MiningPhase::Mining => self.mine(unit, ctx),
            MiningPhase::Returning => self.head_home(unit, ctx),
        }
        self.deposit_at_any_depot(unit, ctx);
    }

    fn seek(&mut self, unit: &mut Unit, resources: &[Resource]) {
        if unit.is_moving() {
            return;
        }
        let remembered = self
            .target_resource
            .and_then(|id| find_resource(resources, id))
            .filter(|resource| !resource.is_depleted());
        let found = remembered.or_else(|| {
            resource_at(resources, unit.position()).filter(|resource| !resource.is_depleted())
        });
        let Some(resource) = found else {
            self.target_resource = None;
            return;
        };

        self.target_resource = Some(resource.id());
        unit.set_target(resource.position());
        self.phase = MiningPhase::MovingToResource;
        debug!(unit = unit.id().0, resource = resource.id().0, "resource_targeted");
    }

    fn approach(&mut self, unit: &mut Unit, resources: &[Resource]) {
        let target = self
            .target_resource
            .and_then(|id| find_resource(resources, id));
        let Some(resource) = target.filter(|resource| !resource.is_depleted()) else {
            debug!(unit = unit.id().0, "resource_lost");
            self.stop_mining();
            return;
        };

        if unit.position() == resource.position() {
            self.mining_timer.reset();
            self.mining_timer.start();
            self.phase = MiningPhase::Mining;
        } else if !unit.is_moving() {
            debug!(unit = unit.id().0, resource = resource.id().0, "resource_unreachable");
            self.stop_mining();
        }
    }

    fn mine(&mut self, unit: &mut Unit, ctx: &mut UnitContext<'_>) {
        let capacity = ctx.state.engineer_capacity;
        let Some(resource) = self
            .target_resource
            .and_then(|id| ctx.resources.iter_mut().find(|resource| resource.id() == id))
            .filter(|resource| !resource.is_depleted())
        else {
            debug!(unit = unit.id().0, "resource_lost");
            self.stop_mining();
            return;
        };

        self.mining_timer.update(ctx.input.delta_millis());
        if !self.mining_timer.timeout() {
            return;
        }
        self.mining_timer.stop();
        self.mining_timer.reset();

        if self.carried.is_none() {
            let amount = resource.be_mined(capacity);
            if amount > 0 {
                self.carried = Some(CarriedLoad {
                    kind: resource.kind(),
                    amount,
                });
            }
            debug!(
                unit = unit.id().0,
                resource = resource.id().0,
                amount,
                remaining = resource.amount(),
                "resource_mined"
            );
        }

        self.phase = MiningPhase::Returning;
        if let Some(depot) = nearest_depot(ctx.buildings.as_slice(), unit.position()) {
            unit.set_target(depot.position());
        }
    }

    fn head_home(&mut self, unit: &mut Unit, ctx: &mut UnitContext<'_>) {
        let Some(depot) = nearest_depot(ctx.buildings.as_slice(), unit.position())
            .map(Building::position)
        else {
            return;
        };

        if unit.position() == depot {
            self.deposit(unit, ctx);
            self.phase = MiningPhase::Seeking;
        } else if !unit.is_moving() {
            unit.set_target(depot);
        }
    }

    fn deposit_at_any_depot(&mut self, unit: &Unit, ctx: &mut UnitContext<'_>) {
        if self.carried.is_none() {
            return;
        }
        let on_depot = building_at(ctx.buildings.as_slice(), unit.position())
            .is_some_and(|building| building.kind().is_depot());
        if !on_depot {
            return;
        }

        self.deposit(unit, ctx);
        if self.phase == MiningPhase::Returning {
            self.phase = MiningPhase::Seeking;
        }
    }

    fn deposit(&mut self, unit: &Unit, ctx: &mut UnitContext<'_>) {
        let Some(load) = self.carried.take() else {
            return;
        };
        ctx.state.economy.deposit(load.kind, load.amount);
        debug!(
            unit = unit.id().0,
            kind = ?load.kind,
            amount = load.amount,
            "resource_deposited"
        );
    }
}

impl Unit {
    pub(super) fn update_engineer(&mut self, ctx: &mut UnitContext<'_>) {
        let Some(mut engineer) = self.engineer.take() else {
            return;
        };
        engineer.advance(self, ctx);
        self.engineer = Some(engineer);
    }
}

fn find_resource(resources: &[Resource], id: EntityId) -> Option<&Resource> {
    resources.iter().find(|resource| resource.id() == id)
}
