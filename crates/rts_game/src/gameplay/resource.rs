use rts_engine::{EntityId, Position, RenderableDesc};
use tracing::debug;

use super::kinds::ResourceKind;

/// A minable deposit. Once `amount` reaches zero it is depleted for good and the world
/// drops it at the start of the next tick.
#[derive(Debug, Clone)]
pub struct Resource {
    id: EntityId,
    kind: ResourceKind,
    position: Position,
    amount: u32,
    depleted: bool,
    renderable: RenderableDesc,
}

impl Resource {
    pub fn new(id: EntityId, kind: ResourceKind, position: Position) -> Self {
        Self::with_amount(id, kind, position, kind.initial_amount())
    }

    pub fn with_amount(id: EntityId, kind: ResourceKind, position: Position, amount: u32) -> Self {
        Self {
            id,
            kind,
            position,
            amount,
            depleted: amount == 0,
            renderable: kind.renderable(),
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn is_depleted(&self) -> bool {
        self.depleted
    }

    pub fn renderable(&self) -> &RenderableDesc {
        &self.renderable
    }

    /// Removes up to `requested` units and returns how many were actually taken.
    pub fn be_mined(&mut self, requested: u32) -> u32 {
        let taken = self.amount.min(requested);
        self.amount -= taken;
        if self.amount == 0 && !self.depleted {
            self.depleted = true;
            debug!(resource = self.id.0, kind = ?self.kind, "resource_depleted");
        }
        taken
    }

    pub(crate) fn update(&mut self) {
        if self.amount == 0 {
            self.depleted = true;
        }
    }
}
