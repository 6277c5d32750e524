use rts_engine::{EntityId, MenuKey, Position, RenderableDesc, Timer};
use tracing::{debug, info};

use super::kinds::{BuildingKind, UnitKind, BUILDING_SELECTION_RADIUS, PYLON_ACTIVATION_RADIUS};
use super::unit::Unit;
use super::world::{unit_at, BuildingContext, WorldState};
use super::MenuItem;

/// A stationary, selectable entity that trains units one at a time.
#[derive(Debug, Clone)]
pub struct Building {
    id: EntityId,
    kind: BuildingKind,
    position: Position,
    selected: bool,
    train_timer: Timer,
    pending_unit: Option<UnitKind>,
    menu_choice: Option<MenuKey>,
    activated: bool,
    renderable: RenderableDesc,
}

impl Building {
    pub fn new(id: EntityId, kind: BuildingKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            selected: false,
            train_timer: Timer::new(0),
            pending_unit: None,
            menu_choice: None,
            activated: false,
            renderable: kind.renderable(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> BuildingKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_training(&self) -> bool {
        self.train_timer.is_running()
    }

    pub fn train_timer(&self) -> &Timer {
        &self.train_timer
    }

    pub fn pending_unit(&self) -> Option<UnitKind> {
        self.pending_unit
    }

    pub fn menu_choice(&self) -> Option<MenuKey> {
        self.menu_choice
    }

    /// Only pylons ever activate.
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    pub fn renderable(&self) -> &RenderableDesc {
        &self.renderable
    }

    pub fn menu_items(&self) -> Vec<MenuItem> {
        MenuItem::list(self.kind.training_menu().iter().map(|kind| kind.label()))
    }

    pub(crate) fn select(&mut self, state: &mut WorldState) {
        self.selected = true;
        state.selection.claim(self.id);
        state.camera.follow(self.id);
    }

    pub(crate) fn deselect(&mut self) {
        self.selected = false;
    }

    pub(crate) fn update(&mut self, ctx: &mut BuildingContext<'_>) {
        self.handle_click(ctx);
        self.update_training(ctx);
        if self.kind == BuildingKind::Pylon {
            self.check_activation(ctx);
        }
    }

    fn handle_click(&mut self, ctx: &mut BuildingContext<'_>) {
        let Some(position) = ctx.input.left_click() else {
            return;
        };
        if self.selected {
            self.deselect();
        } else if unit_at(ctx.units.as_slice(), position).is_none()
            && position.within(self.position, BUILDING_SELECTION_RADIUS)
        {
            self.select(ctx.state);
        }
    }

    fn update_training(&mut self, ctx: &mut BuildingContext<'_>) {
        if self.train_timer.is_running() {
            self.train_timer.update(ctx.input.delta_millis());
            if self.train_timer.timeout() {
                self.finish_training(ctx);
            }
            return;
        }

        if !self.selected {
            return;
        }
        self.menu_choice = None;
        let Some(key) = ctx.input.menu_key() else {
            return;
        };
        let Some(kind) = self.kind.trainee_for(key) else {
            return;
        };
        let cost = kind.metal_cost();
        if !ctx.state.economy.can_afford(cost) {
            debug!(
                building = self.id.0,
                unit = ?kind,
                cost,
                metal = ctx.state.economy.metal(),
                "training_rejected"
            );
            return;
        }

        ctx.state.economy.consume_metal(cost);
        self.menu_choice = Some(key);
        self.pending_unit = Some(kind);
        self.train_timer = Timer::started(kind.train_millis());
        debug!(building = self.id.0, unit = ?kind, cost, "training_started");
    }

    fn finish_training(&mut self, ctx: &mut BuildingContext<'_>) {
        self.train_timer.stop();
        self.train_timer.reset();
        self.menu_choice = None;
        let Some(kind) = self.pending_unit.take() else {
            return;
        };

        let unit = Unit::new(ctx.state.ids.allocate(), kind, self.position);
        debug!(
            building = self.id.0,
            unit = unit.id().0,
            kind = ?kind,
            "training_completed"
        );
        ctx.units.push(unit);
    }

    fn check_activation(&mut self, ctx: &mut BuildingContext<'_>) {
        if self.activated {
            return;
        }
        let nearby = ctx
            .units
            .iter()
            .any(|unit| unit.position().within(self.position, PYLON_ACTIVATION_RADIUS));
        if !nearby {
            return;
        }

        self.activated = true;
        info!(building = self.id.0, "pylon_activated");
        ctx.state.raise_engineer_capacity();
    }
}
