use rts_engine::{MenuKey, RenderableDesc};
use serde::Serialize;

pub const UNIT_SELECTION_RADIUS: f64 = 32.0;
pub const BUILDING_SELECTION_RADIUS: f64 = 32.0;
pub const RESOURCE_RADIUS: f64 = 32.0;
pub const PYLON_ACTIVATION_RADIUS: f64 = 32.0;
pub const MINING_MILLIS: u32 = 5000;
pub const INITIAL_ENGINEER_CAPACITY: u32 = 2;
pub const ENGINEER_CAPACITY_STEP: u32 = 1;

const UNIT_TRAIN_MILLIS: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Scout,
    Builder,
    Engineer,
    Truck,
}

struct UnitStats {
    speed_px_per_ms: f64,
    metal_cost: i64,
    build_menu: &'static [BuildingKind],
    destroyed_after_build: bool,
    renderable: RenderableDesc,
}

static SCOUT: UnitStats = UnitStats {
    speed_px_per_ms: 0.3,
    metal_cost: 5,
    build_menu: &[],
    destroyed_after_build: false,
    renderable: RenderableDesc::sprite("units/scout", "scout"),
};

static BUILDER: UnitStats = UnitStats {
    speed_px_per_ms: 0.1,
    metal_cost: 10,
    build_menu: &[BuildingKind::Factory],
    destroyed_after_build: false,
    renderable: RenderableDesc::sprite("units/builder", "builder"),
};

static ENGINEER: UnitStats = UnitStats {
    speed_px_per_ms: 0.1,
    metal_cost: 20,
    build_menu: &[],
    destroyed_after_build: false,
    renderable: RenderableDesc::sprite("units/engineer", "engineer"),
};

static TRUCK: UnitStats = UnitStats {
    speed_px_per_ms: 0.25,
    metal_cost: 150,
    build_menu: &[BuildingKind::CommandCentre],
    destroyed_after_build: true,
    renderable: RenderableDesc::sprite("units/truck", "truck"),
};

impl UnitKind {
    pub const ALL: [UnitKind; 4] = [
        UnitKind::Scout,
        UnitKind::Builder,
        UnitKind::Engineer,
        UnitKind::Truck,
    ];

    fn stats(self) -> &'static UnitStats {
        match self {
            UnitKind::Scout => &SCOUT,
            UnitKind::Builder => &BUILDER,
            UnitKind::Engineer => &ENGINEER,
            UnitKind::Truck => &TRUCK,
        }
    }

    pub fn speed_px_per_ms(self) -> f64 {
        self.stats().speed_px_per_ms
    }

    pub fn metal_cost(self) -> i64 {
        self.stats().metal_cost
    }

    pub fn train_millis(self) -> u32 {
        UNIT_TRAIN_MILLIS
    }

    pub fn build_menu(self) -> &'static [BuildingKind] {
        self.stats().build_menu
    }

    pub fn can_build(self) -> bool {
        !self.build_menu().is_empty()
    }

    /// Building produced by pressing `key` while this unit is selected.
    pub fn building_for(self, key: MenuKey) -> Option<BuildingKind> {
        self.build_menu().get(key.slot()).copied()
    }

    pub fn destroyed_after_build(self) -> bool {
        self.stats().destroyed_after_build
    }

    pub fn renderable(self) -> RenderableDesc {
        self.stats().renderable.clone()
    }

    pub fn label(self) -> &'static str {
        match self {
            UnitKind::Scout => "Scout",
            UnitKind::Builder => "Builder",
            UnitKind::Engineer => "Engineer",
            UnitKind::Truck => "Truck",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingKind {
    CommandCentre,
    Factory,
    Pylon,
}

impl BuildingKind {
    pub const ALL: [BuildingKind; 3] = [
        BuildingKind::CommandCentre,
        BuildingKind::Factory,
        BuildingKind::Pylon,
    ];

    /// Metal paid up front when a unit starts building this kind. `None` for kinds that
    /// only exist from the initialization list.
    pub fn metal_cost(self) -> Option<i64> {
        match self {
            BuildingKind::CommandCentre => Some(0),
            BuildingKind::Factory => Some(100),
            BuildingKind::Pylon => None,
        }
    }

    pub fn build_millis(self) -> u32 {
        match self {
            BuildingKind::CommandCentre => 15_000,
            BuildingKind::Factory => 10_000,
            BuildingKind::Pylon => 0,
        }
    }

    pub fn training_menu(self) -> &'static [UnitKind] {
        match self {
            BuildingKind::CommandCentre => {
                &[UnitKind::Scout, UnitKind::Builder, UnitKind::Engineer]
            }
            BuildingKind::Factory => &[UnitKind::Truck],
            BuildingKind::Pylon => &[],
        }
    }

    pub fn trainee_for(self, key: MenuKey) -> Option<UnitKind> {
        self.training_menu().get(key.slot()).copied()
    }

    /// Engineers deposit carried loads here.
    pub fn is_depot(self) -> bool {
        self == BuildingKind::CommandCentre
    }

    pub fn renderable(self) -> RenderableDesc {
        match self {
            BuildingKind::CommandCentre => {
                RenderableDesc::sprite("buildings/command_centre", "command_centre")
            }
            BuildingKind::Factory => RenderableDesc::sprite("buildings/factory", "factory"),
            BuildingKind::Pylon => RenderableDesc::sprite("buildings/pylon", "pylon"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BuildingKind::CommandCentre => "Command Centre",
            BuildingKind::Factory => "Factory",
            BuildingKind::Pylon => "Pylon",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Metal,
    Unobtainium,
}

impl ResourceKind {
    pub fn initial_amount(self) -> u32 {
        match self {
            ResourceKind::Metal => 500,
            ResourceKind::Unobtainium => 50,
        }
    }

    pub fn renderable(self) -> RenderableDesc {
        match self {
            ResourceKind::Metal => RenderableDesc::sprite("resources/metal", "metal_mine"),
            ResourceKind::Unobtainium => {
                RenderableDesc::sprite("resources/unobtainium", "unobtainium_mine")
            }
        }
    }
}

/// One numbered line of a selected entity's menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub key: u8,
    pub label: &'static str,
}

impl MenuItem {
    pub(crate) fn list(labels: impl Iterator<Item = &'static str>) -> Vec<Self> {
        labels
            .zip(1u8..)
            .map(|(label, key)| MenuItem { key, label })
            .collect()
    }
}

/// Every kind that can appear in the initialization list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Unit(UnitKind),
    Building(BuildingKind),
    Resource(ResourceKind),
}

impl EntityKind {
    pub fn from_token(token: &str) -> Option<Self> {
        let kind = match token {
            "command_centre" => EntityKind::Building(BuildingKind::CommandCentre),
            "factory" => EntityKind::Building(BuildingKind::Factory),
            "pylon" => EntityKind::Building(BuildingKind::Pylon),
            "metal_mine" => EntityKind::Resource(ResourceKind::Metal),
            "unobtainium_mine" => EntityKind::Resource(ResourceKind::Unobtainium),
            "engineer" => EntityKind::Unit(UnitKind::Engineer),
            "scout" => EntityKind::Unit(UnitKind::Scout),
            "builder" => EntityKind::Unit(UnitKind::Builder),
            "truck" => EntityKind::Unit(UnitKind::Truck),
            _ => return None,
        };
        Some(kind)
    }
}
