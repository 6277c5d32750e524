use rts_engine::{
    Click, EntityId, MenuKey, MouseButton, Position, RenderableDesc, Tilemap, Timer,
    DISTANCE_TOLERANCE,
};
use tracing::{debug, info};

use super::building::Building;
use super::engineer::EngineerState;
use super::kinds::{BuildingKind, UnitKind, UNIT_SELECTION_RADIUS};
use super::world::{UnitContext, WorldState};
use super::MenuItem;

/// A movable, selectable entity.
///
/// Units of a kind with a build menu can also produce a building on their own tile; while
/// that production runs `build_timer` is `Some` and right-click orders are ignored.
#[derive(Debug, Clone)]
pub struct Unit {
    id: EntityId,
    kind: UnitKind,
    position: Position,
    target: Position,
    selected: bool,
    build_timer: Option<Timer>,
    pending_building: Option<BuildingKind>,
    menu_choice: Option<MenuKey>,
    destroyed: bool,
    renderable: RenderableDesc,
    pub(super) engineer: Option<EngineerState>,
}

impl Unit {
    pub fn new(id: EntityId, kind: UnitKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            target: position,
            selected: false,
            build_timer: None,
            pending_building: None,
            menu_choice: None,
            destroyed: false,
            renderable: kind.renderable(),
            engineer: (kind == UnitKind::Engineer).then(EngineerState::new),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn target(&self) -> Position {
        self.target
    }

    /// Issues a movement order directly, bypassing the right-click rules.
    pub fn set_target(&mut self, target: Position) {
        self.target = target;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_moving(&self) -> bool {
        self.position != self.target
    }

    pub fn is_producing(&self) -> bool {
        self.build_timer.is_some()
    }

    pub fn build_timer(&self) -> Option<&Timer> {
        self.build_timer.as_ref()
    }

    pub fn pending_building(&self) -> Option<BuildingKind> {
        self.pending_building
    }

    pub fn menu_choice(&self) -> Option<MenuKey> {
        self.menu_choice
    }

    /// Set once a self-destructing kind finishes its building; the world drops it at the
    /// end of the unit phase.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn renderable(&self) -> &RenderableDesc {
        &self.renderable
    }

    pub fn engineer(&self) -> Option<&EngineerState> {
        self.engineer.as_ref()
    }

    pub fn menu_items(&self) -> Vec<MenuItem> {
        MenuItem::list(self.kind.build_menu().iter().map(|kind| kind.label()))
    }

    pub(crate) fn select(&mut self, state: &mut WorldState) {
        self.selected = true;
        state.selection.claim(self.id);
        state.camera.follow(self.id);
    }

    pub(crate) fn deselect(&mut self) {
        self.selected = false;
    }

    pub(crate) fn update(&mut self, ctx: &mut UnitContext<'_>) {
        if self.kind.can_build() {
            self.update_production(ctx);
        }
        self.handle_click(ctx);
        self.step_movement(ctx.input.delta_millis(), &ctx.state.tilemap);
        if self.engineer.is_some() {
            self.update_engineer(ctx);
        }
    }

    fn update_production(&mut self, ctx: &mut UnitContext<'_>) {
        if let Some(timer) = self.build_timer.as_mut() {
            timer.update(ctx.input.delta_millis());
            if timer.timeout() {
                self.finish_production(ctx);
            }
            return;
        }

        self.menu_choice = None;
        if !self.selected {
            return;
        }
        let Some(key) = ctx.input.menu_key() else {
            return;
        };
        let Some(kind) = self.kind.building_for(key) else {
            return;
        };
        let Some(cost) = kind.metal_cost() else {
            return;
        };
        if ctx.state.tilemap.is_occupied(self.position) {
            debug!(unit = self.id.0, building = ?kind, "production_blocked_occupied");
            return;
        }
        if !ctx.state.economy.can_afford(cost) {
            debug!(
                unit = self.id.0,
                building = ?kind,
                cost,
                metal = ctx.state.economy.metal(),
                "production_rejected"
            );
            return;
        }

        ctx.state.economy.consume_metal(cost);
        self.menu_choice = Some(key);
        self.pending_building = Some(kind);
        self.build_timer = Some(Timer::started(kind.build_millis()));
        self.target = self.position;
        info!(unit = self.id.0, building = ?kind, cost, "production_started");
    }

    fn finish_production(&mut self, ctx: &mut UnitContext<'_>) {
        self.build_timer = None;
        self.menu_choice = None;
        let Some(kind) = self.pending_building.take() else {
            return;
        };

        let building = Building::new(ctx.state.ids.allocate(), kind, self.position);
        info!(
            unit = self.id.0,
            building = building.id().0,
            kind = ?kind,
            "production_completed"
        );
        ctx.buildings.push(building);

        if self.kind.destroyed_after_build() {
            self.selected = false;
            self.destroyed = true;
        }
    }

    fn handle_click(&mut self, ctx: &mut UnitContext<'_>) {
        match ctx.input.click() {
            Some(Click {
                button: MouseButton::Left,
                position,
            }) => {
                if self.selected {
                    self.deselect();
                } else if position.within(self.position, UNIT_SELECTION_RADIUS) {
                    self.select(ctx.state);
                }
            }
            Some(Click {
                button: MouseButton::Right,
                position,
            }) => {
                if self.selected && !self.is_producing() {
                    self.target = position;
                }
            }
            None => {}
        }
    }

    /// Straight-line step toward `target`; a solid destination tile stops the unit where it is.
    fn step_movement(&mut self, delta_millis: u32, tilemap: &Tilemap) {
        let remaining = self.position.distance(self.target);
        if remaining < DISTANCE_TOLERANCE {
            return;
        }

        let step = (self.kind.speed_px_per_ms() * f64::from(delta_millis)).min(remaining);
        let bearing = self.position.bearing_to(self.target);
        let next = self.position.offset_polar(step, bearing);
        if tilemap.is_solid(next) {
            debug!(unit = self.id.0, x = next.x, y = next.y, "movement_blocked");
            self.target = self.position;
            return;
        }
        self.position = next;
    }
}
