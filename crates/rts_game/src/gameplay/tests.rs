use rts_engine::{
    EntityId, InputAction, InputSnapshot, MenuKey, Position, TileFlags, Tilemap, Viewport,
};

use super::world::nearest_depot;
use super::*;

const TICK_MILLIS: u32 = 100;

fn open_tilemap() -> Tilemap {
    Tilemap::open(50, 50, 32, 32).expect("open tilemap")
}

fn world_with(tilemap: Tilemap) -> World {
    World::new(
        tilemap,
        Viewport {
            width: 1024,
            height: 768,
        },
    )
}

fn open_world() -> World {
    world_with(open_tilemap())
}

fn idle() -> InputSnapshot {
    InputSnapshot::idle(TICK_MILLIS)
}

fn key(key: MenuKey) -> InputSnapshot {
    idle().with_menu_key(Some(key))
}

fn run_idle(world: &mut World, ticks: u32) {
    for _ in 0..ticks {
        world.update(&idle());
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}

fn engineer_phase(world: &World, id: EntityId) -> MiningPhase {
    world
        .unit(id)
        .and_then(Unit::engineer)
        .map(EngineerState::phase)
        .expect("engineer")
}

#[test]
fn selecting_another_entity_clears_the_previous_one() {
    let mut world = open_world();
    let first = world.spawn_unit(UnitKind::Scout, Position::new(100.0, 100.0));
    let second = world.spawn_unit(UnitKind::Scout, Position::new(400.0, 400.0));

    assert!(world.select(first));
    world.update(&idle().with_left_click(Position::new(405.0, 400.0)));

    assert!(!world.unit(first).expect("first").is_selected());
    assert!(world.unit(second).expect("second").is_selected());
    assert_eq!(world.selected(), Some(second));
    assert_eq!(world.camera().following(), Some(second));
}

#[test]
fn direct_selection_keeps_a_single_occupant() {
    let mut world = open_world();
    let unit = world.spawn_unit(UnitKind::Builder, Position::new(100.0, 100.0));
    let building = world.spawn_building(BuildingKind::Factory, Position::new(300.0, 300.0));

    assert!(world.select(unit));
    assert!(world.select(building));
    assert!(!world.unit(unit).expect("unit").is_selected());
    assert!(world.building(building).expect("building").is_selected());
    assert_eq!(world.selected(), Some(building));
    assert!(!world.select(EntityId(999)));
}

#[test]
fn clicking_a_unit_moves_the_selection_off_a_building() {
    let mut world = open_world();
    let building = world.spawn_building(BuildingKind::CommandCentre, Position::new(500.0, 500.0));
    let scout = world.spawn_unit(UnitKind::Scout, Position::new(100.0, 100.0));

    assert!(world.select(building));
    world.update(&idle().with_left_click(Position::new(100.0, 100.0)));

    assert!(!world.building(building).expect("building").is_selected());
    assert!(world.unit(scout).expect("scout").is_selected());
    assert_eq!(world.selected(), Some(scout));
}

#[test]
fn clearing_the_selection_releases_the_camera() {
    let mut world = open_world();
    let centre = world.spawn_building(BuildingKind::CommandCentre, Position::new(200.0, 200.0));
    world.select(centre);
    assert_eq!(world.camera().following(), Some(centre));

    world.clear_selection();

    assert_eq!(world.selected(), None);
    assert!(!world.building(centre).expect("centre").is_selected());
    assert_eq!(world.camera().following(), None);
    world.clear_selection();
    assert_eq!(world.selected(), None);
}

#[test]
fn any_left_click_deselects_and_the_slot_is_cleared() {
    let mut world = open_world();
    let scout = world.spawn_unit(UnitKind::Scout, Position::new(100.0, 100.0));
    world.select(scout);

    world.update(&idle().with_left_click(Position::new(900.0, 900.0)));

    assert!(!world.unit(scout).expect("scout").is_selected());
    assert_eq!(world.selected(), None);
}

#[test]
fn unit_under_the_click_wins_over_the_building() {
    let mut world = open_world();
    let centre = world.spawn_building(BuildingKind::CommandCentre, Position::new(200.0, 200.0));
    let scout = world.spawn_unit(UnitKind::Scout, Position::new(210.0, 200.0));

    world.update(&idle().with_left_click(Position::new(200.0, 200.0)));

    assert!(!world.building(centre).expect("centre").is_selected());
    assert_eq!(world.selected(), Some(scout));
}

#[test]
fn clicking_a_building_selects_it_and_shows_its_menu() {
    let mut world = open_world();
    let centre = world.spawn_building(BuildingKind::CommandCentre, Position::new(200.0, 200.0));

    world.update(&idle().with_left_click(Position::new(220.0, 210.0)));

    assert_eq!(world.selected(), Some(centre));
    let labels: Vec<&str> = world.menu_items().iter().map(|item| item.label).collect();
    assert_eq!(labels, vec!["Scout", "Builder", "Engineer"]);
    assert_eq!(world.menu_items()[2].key, 3);
}

#[test]
fn training_without_enough_metal_is_rejected() {
    let mut world = open_world();
    let centre = world.spawn_building(BuildingKind::CommandCentre, Position::new(200.0, 200.0));
    world.select(centre);

    world.update(&key(MenuKey::One));

    let centre = world.building(centre).expect("centre");
    assert_eq!(world.metal(), 0);
    assert!(!centre.is_training());
    assert_eq!(centre.pending_unit(), None);
    assert_eq!(centre.menu_choice(), None);
}

#[test]
fn training_deducts_the_exact_cost_up_front() {
    let mut world = open_world();
    let centre = world.spawn_building(BuildingKind::CommandCentre, Position::new(200.0, 200.0));
    world.add_metal(25);
    world.select(centre);

    world.update(&key(MenuKey::Three));

    let centre = world.building(centre).expect("centre");
    assert_eq!(world.metal(), 5);
    assert!(centre.is_training());
    assert_eq!(centre.pending_unit(), Some(UnitKind::Engineer));
    assert_eq!(centre.menu_choice(), Some(MenuKey::Three));
}

#[test]
fn unmapped_menu_key_is_a_no_op() {
    let mut world = open_world();
    let factory = world.spawn_building(BuildingKind::Factory, Position::new(200.0, 200.0));
    world.add_metal(500);
    world.select(factory);

    world.update(&key(MenuKey::Two));

    assert_eq!(world.metal(), 500);
    assert!(!world.building(factory).expect("factory").is_training());
}

/// Trucks come from the Factory's training menu; the Command Centre trains scouts,
/// builders and engineers.
#[test]
fn factory_trains_a_truck_after_five_seconds() {
    let mut world = open_world();
    let factory = world.spawn_building(BuildingKind::Factory, Position::new(300.0, 300.0));
    world.add_metal(150);
    world.select(factory);

    world.update(&key(MenuKey::One));
    assert_eq!(world.metal(), 0);
    assert!(world.units().is_empty());

    run_idle(&mut world, 49);
    assert!(world.units().is_empty());

    run_idle(&mut world, 1);
    assert_eq!(world.metal(), 0);
    assert_eq!(world.units().len(), 1);
    let truck = &world.units()[0];
    assert_eq!(truck.kind(), UnitKind::Truck);
    assert_eq!(truck.position(), Position::new(300.0, 300.0));

    let factory = world.building(factory).expect("factory");
    assert!(!factory.is_training());
    assert_eq!(factory.pending_unit(), None);
    assert_eq!(factory.menu_choice(), None);
    assert_eq!(factory.train_timer().elapsed_millis(), 0);
}

#[test]
fn builder_produces_a_factory_on_its_tile() {
    let mut world = open_world();
    let builder = world.spawn_unit(UnitKind::Builder, Position::new(240.0, 240.0));
    world.add_metal(100);
    world.select(builder);

    world.update(&key(MenuKey::One));
    assert_eq!(world.metal(), 0);
    let producing = world.unit(builder).expect("builder");
    assert!(producing.is_producing());
    assert_eq!(producing.pending_building(), Some(BuildingKind::Factory));

    world.update(&idle().with_right_click(Position::new(600.0, 600.0)));
    assert_eq!(
        world.unit(builder).expect("builder").target(),
        Position::new(240.0, 240.0)
    );

    run_idle(&mut world, 100);
    let builder = world.unit(builder).expect("builder");
    assert!(!builder.is_producing());
    assert_eq!(builder.pending_building(), None);
    assert_eq!(world.buildings().len(), 1);
    assert_eq!(world.buildings()[0].kind(), BuildingKind::Factory);
    assert_eq!(world.buildings()[0].position(), Position::new(240.0, 240.0));
}

#[test]
fn production_without_enough_metal_is_rejected() {
    let mut world = open_world();
    let builder = world.spawn_unit(UnitKind::Builder, Position::new(240.0, 240.0));
    world.add_metal(99);
    world.select(builder);

    world.update(&key(MenuKey::One));

    let builder = world.unit(builder).expect("builder");
    assert!(!builder.is_producing());
    assert_eq!(builder.pending_building(), None);
    assert_eq!(builder.menu_choice(), None);
    assert_eq!(world.metal(), 99);
}

#[test]
fn production_with_the_exact_cost_leaves_nothing() {
    let mut world = open_world();
    let builder = world.spawn_unit(UnitKind::Builder, Position::new(240.0, 240.0));
    world.add_metal(100);
    world.select(builder);

    world.update(&key(MenuKey::One));

    let builder = world.unit(builder).expect("builder");
    assert!(builder.is_producing());
    assert_eq!(builder.menu_choice(), Some(MenuKey::One));
    assert_eq!(world.metal(), 0);
}

#[test]
fn production_is_refused_on_an_occupied_tile() {
    let mut tilemap = open_tilemap();
    assert!(tilemap.set_tile(
        7,
        7,
        TileFlags {
            solid: false,
            occupied: true,
        },
    ));
    let mut world = world_with(tilemap);
    let builder = world.spawn_unit(UnitKind::Builder, Position::new(240.0, 240.0));
    world.add_metal(100);
    world.select(builder);

    world.update(&key(MenuKey::One));

    assert_eq!(world.metal(), 100);
    assert!(!world.unit(builder).expect("builder").is_producing());
}

#[test]
fn truck_builds_a_command_centre_and_disappears() {
    let mut world = open_world();
    let truck = world.spawn_unit(UnitKind::Truck, Position::new(400.0, 400.0));
    world.select(truck);

    world.update(&key(MenuKey::One));
    assert!(world.unit(truck).expect("truck").is_producing());

    run_idle(&mut world, 150);

    assert!(world.unit(truck).is_none());
    assert_eq!(world.selected(), None);
    assert_eq!(world.buildings().len(), 1);
    assert_eq!(world.buildings()[0].kind(), BuildingKind::CommandCentre);
}

#[test]
fn unit_moves_in_a_straight_line_and_stops_on_arrival() {
    let mut world = open_world();
    let scout = world.spawn_unit(UnitKind::Scout, Position::new(100.0, 100.0));
    world
        .unit_mut(scout)
        .expect("scout")
        .set_target(Position::new(145.0, 100.0));

    world.update(&idle());
    assert_close(world.unit(scout).expect("scout").position().x, 130.0);

    world.update(&idle());
    let scout = world.unit(scout).expect("scout");
    assert_close(scout.position().x, 145.0);
    assert!(!scout.is_moving());
}

#[test]
fn right_click_moves_the_selected_unit() {
    let mut world = open_world();
    let scout = world.spawn_unit(UnitKind::Scout, Position::new(100.0, 100.0));
    world.select(scout);

    world.update(&idle().with_right_click(Position::new(100.0, 400.0)));

    let scout = world.unit(scout).expect("scout");
    assert_eq!(scout.target(), Position::new(100.0, 400.0));
    assert_close(scout.position().y, 130.0);
}

#[test]
fn solid_tile_collapses_the_target() {
    let mut tilemap = open_tilemap();
    assert!(tilemap.set_tile(5, 3, TileFlags::SOLID));
    let mut world = world_with(tilemap);
    let start = Position::new(144.0, 112.0);
    let scout = world.spawn_unit(UnitKind::Scout, start);
    world
        .unit_mut(scout)
        .expect("scout")
        .set_target(Position::new(176.0, 112.0));

    world.update(&idle());

    let scout = world.unit(scout).expect("scout");
    assert_eq!(scout.position(), start);
    assert_eq!(scout.target(), start);
    assert!(!world.tilemap().is_solid(scout.position()));
}

#[test]
fn depleted_resources_are_purged() {
    let mut world = open_world();
    world.spawn_resource_with_amount(ResourceKind::Unobtainium, Position::new(64.0, 64.0), 0);
    let metal = world.spawn_resource(ResourceKind::Metal, Position::new(128.0, 64.0));

    world.update(&idle());

    assert_eq!(world.resources().len(), 1);
    assert_eq!(world.resources()[0].id(), metal);
}

#[test]
fn engineer_mines_and_delivers_one_load() {
    let mut world = open_world();
    world.spawn_building(BuildingKind::CommandCentre, Position::new(100.0, 100.0));
    let metal = world.spawn_resource(ResourceKind::Metal, Position::new(400.0, 100.0));
    let engineer = world.spawn_unit(UnitKind::Engineer, Position::new(400.0, 100.0));

    world.update(&idle());
    assert_eq!(engineer_phase(&world, engineer), MiningPhase::MovingToResource);
    world.update(&idle());
    assert_eq!(engineer_phase(&world, engineer), MiningPhase::Mining);

    let mut ticks = 0;
    while world.metal() == 0 && ticks < 200 {
        world.update(&idle());
        ticks += 1;
    }

    assert_eq!(world.metal(), 2);
    assert_eq!(world.resource(metal).expect("metal").amount(), 498);
    let state = world.unit(engineer).and_then(Unit::engineer).expect("engineer");
    assert_eq!(state.carried(), None);
    assert_eq!(state.target_resource(), Some(metal));
}

#[test]
fn engineer_returns_to_the_same_resource_after_delivering() {
    let mut world = open_world();
    world.spawn_building(BuildingKind::CommandCentre, Position::new(100.0, 100.0));
    let metal = world.spawn_resource(ResourceKind::Metal, Position::new(300.0, 100.0));
    world.spawn_unit(UnitKind::Engineer, Position::new(300.0, 100.0));

    let mut ticks = 0;
    while world.metal() < 4 && ticks < 400 {
        world.update(&idle());
        ticks += 1;
    }

    assert_eq!(world.metal(), 4);
    assert_eq!(world.resource(metal).expect("metal").amount(), 496);
}

#[test]
fn unobtainium_is_deposited_into_its_own_total() {
    let mut world = open_world();
    world.spawn_building(BuildingKind::CommandCentre, Position::new(100.0, 100.0));
    world.spawn_resource(ResourceKind::Unobtainium, Position::new(300.0, 100.0));
    world.spawn_unit(UnitKind::Engineer, Position::new(300.0, 100.0));

    let mut ticks = 0;
    while world.unobtainium() == 0 && ticks < 200 {
        world.update(&idle());
        ticks += 1;
    }

    assert_eq!(world.unobtainium(), 2);
    assert_eq!(world.metal(), 0);
}

#[test]
fn right_click_cancels_mining_without_extracting() {
    let mut world = open_world();
    world.spawn_building(BuildingKind::CommandCentre, Position::new(100.0, 100.0));
    let metal = world.spawn_resource(ResourceKind::Metal, Position::new(400.0, 100.0));
    let engineer = world.spawn_unit(UnitKind::Engineer, Position::new(400.0, 100.0));

    run_idle(&mut world, 12);
    assert_eq!(engineer_phase(&world, engineer), MiningPhase::Mining);
    assert!(world.select(engineer));

    world.update(&idle().with_right_click(Position::new(400.0, 600.0)));

    let unit = world.unit(engineer).expect("engineer");
    let state = unit.engineer().expect("engineer state");
    assert_eq!(state.phase(), MiningPhase::Seeking);
    assert!(!state.mining_timer().is_running());
    assert_eq!(state.mining_timer().elapsed_millis(), 0);
    assert_eq!(state.carried(), None);
    assert_eq!(state.target_resource(), None);
    assert_eq!(unit.target(), Position::new(400.0, 600.0));
    assert_eq!(world.resource(metal).expect("metal").amount(), 500);
}

#[test]
fn engineer_ignores_a_resource_that_ran_dry() {
    let mut world = open_world();
    let resource =
        world.spawn_resource_with_amount(ResourceKind::Metal, Position::new(300.0, 100.0), 1);
    let first = world.spawn_unit(UnitKind::Engineer, Position::new(300.0, 100.0));
    let second = world.spawn_unit(UnitKind::Engineer, Position::new(300.0, 100.0));

    let mut ticks = 0;
    while world.resource(resource).is_some() && ticks < 100 {
        world.update(&idle());
        ticks += 1;
    }

    assert!(world.resource(resource).is_none());
    let loads: Vec<Option<CarriedLoad>> = [first, second]
        .into_iter()
        .map(|id| world.unit(id).and_then(Unit::engineer).and_then(EngineerState::carried))
        .collect();
    assert_eq!(
        loads,
        vec![
            Some(CarriedLoad {
                kind: ResourceKind::Metal,
                amount: 1
            }),
            None
        ]
    );
    assert_eq!(engineer_phase(&world, second), MiningPhase::Seeking);
}

#[test]
fn pylon_raises_engineer_capacity_once() {
    let mut world = open_world();
    let pylon = world.spawn_building(BuildingKind::Pylon, Position::new(500.0, 500.0));
    world.spawn_unit(UnitKind::Scout, Position::new(500.0, 520.0));
    assert_eq!(world.engineer_capacity(), INITIAL_ENGINEER_CAPACITY);

    run_idle(&mut world, 3);

    assert!(world.building(pylon).expect("pylon").is_activated());
    assert_eq!(world.engineer_capacity(), 3);
}

#[test]
fn pylon_stays_dormant_without_units_nearby() {
    let mut world = open_world();
    let pylon = world.spawn_building(BuildingKind::Pylon, Position::new(500.0, 500.0));
    world.spawn_unit(UnitKind::Scout, Position::new(500.0, 540.0));

    world.update(&idle());

    assert!(!world.building(pylon).expect("pylon").is_activated());
    assert_eq!(world.engineer_capacity(), 2);
}

#[test]
fn spatial_queries_return_the_first_match_in_insertion_order() {
    let mut world = open_world();
    let first = world.spawn_unit(UnitKind::Scout, Position::new(100.0, 100.0));
    world.spawn_unit(UnitKind::Scout, Position::new(110.0, 100.0));

    let found = world.unit_at(Position::new(109.0, 100.0)).expect("unit");
    assert_eq!(found.id(), first);
    assert!(world.unit_at(Position::new(300.0, 300.0)).is_none());
    assert!(world.building_at(Position::new(100.0, 100.0)).is_none());
    assert!(world.resource_at(Position::new(100.0, 100.0)).is_none());
}

#[test]
fn nearest_depot_prefers_the_earlier_building_on_a_tie() {
    let mut world = open_world();
    world.spawn_building(BuildingKind::Factory, Position::new(150.0, 100.0));
    let west = world.spawn_building(BuildingKind::CommandCentre, Position::new(0.0, 100.0));
    world.spawn_building(BuildingKind::CommandCentre, Position::new(200.0, 100.0));

    let depot = nearest_depot(world.buildings(), Position::new(100.0, 100.0)).expect("depot");
    assert_eq!(depot.id(), west);
}

#[test]
fn camera_follows_the_selection_until_panned() {
    let mut world = open_world();
    let scout = world.spawn_unit(UnitKind::Scout, Position::new(800.0, 800.0));
    world.select(scout);

    world.update(&idle());
    assert_close(world.camera().left(), 288.0);
    assert_close(world.camera().top(), 416.0);

    world.update(&idle().with_action_down(InputAction::CameraRight, true));
    assert_eq!(world.camera().following(), None);
    assert_close(world.camera().left(), 328.0);
}

#[test]
fn identical_input_gives_identical_digests() {
    let build = || {
        let mut world = open_world();
        world.spawn_building(BuildingKind::CommandCentre, Position::new(100.0, 100.0));
        world.spawn_resource(ResourceKind::Metal, Position::new(300.0, 100.0));
        world.spawn_unit(UnitKind::Engineer, Position::new(300.0, 100.0));
        world
    };
    let mut left = build();
    let mut right = build();
    let before = left.state_digest().expect("digest");

    run_idle(&mut left, 120);
    run_idle(&mut right, 120);

    let after = left.state_digest().expect("digest");
    assert_eq!(after, right.state_digest().expect("digest"));
    assert_ne!(before, after);
    assert_eq!(after.len(), 64);
}

#[test]
fn snapshot_reports_entities_and_totals() {
    let mut world = open_world();
    let centre = world.spawn_building(BuildingKind::CommandCentre, Position::new(100.0, 100.0));
    world.spawn_unit(UnitKind::Engineer, Position::new(600.0, 600.0));
    world.add_metal(40);
    world.select(centre);

    let snapshot = world.snapshot();
    assert_eq!(snapshot.metal, 40);
    assert_eq!(snapshot.selected, Some(centre));
    assert_eq!(snapshot.menu.len(), 3);
    assert_eq!(snapshot.units[0].mining_phase, Some(MiningPhase::Seeking));
    assert!(snapshot.buildings[0].selected);

    let json = serde_json::to_value(&snapshot).expect("json");
    assert_eq!(json["units"][0]["kind"], "engineer");
    assert_eq!(json["buildings"][0]["kind"], "command_centre");
}

#[test]
fn populate_registers_records_in_order() {
    let mut world = open_world();
    let records = parse_init_list("command_centre,64,64\nmetal_mine,256,64\nengineer,256,64\n");

    world.populate(&records);

    assert_eq!(world.buildings().len(), 1);
    assert_eq!(world.resources().len(), 1);
    assert_eq!(world.units().len(), 1);
    assert_eq!(world.units()[0].kind(), UnitKind::Engineer);
}
