use std::sync::Arc;

use city_builder::{
    catalog::{BuildingType, ResourceKind, WorkerType, CYCLE_MS},
    clock::ManualClock,
    config::SimulationConfig,
    grid::PlacementPolicy,
    ledger::ResourceAmounts,
    SimError, SimulationState,
};

fn resources(wood: u64, stone: u64, wheat: u64, gold: u64) -> ResourceAmounts {
    ResourceAmounts::from([
        (ResourceKind::Wood, wood),
        (ResourceKind::Stone, stone),
        (ResourceKind::Wheat, wheat),
        (ResourceKind::Gold, gold),
    ])
}

fn session(config: SimulationConfig) -> (SimulationState, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(0));
    (SimulationState::new(&config, clock.clone()), clock)
}

fn default_session() -> (SimulationState, Arc<ManualClock>) {
    session(SimulationConfig::default())
}

#[test]
fn placing_a_farm_debits_its_cost() {
    let (mut state, _) = default_session();
    state.place_building(0, BuildingType::Farm).unwrap();

    assert_eq!(state.resources(), resources(110, 40, 220, 160));
    let cell = state.grid_cells()[0];
    assert!(cell.occupied);
    assert_eq!(cell.building, Some(BuildingType::Farm));
    assert_eq!(cell.workers, 1);
}

#[test]
fn unstaffed_profile_places_empty_buildings() {
    let (mut state, _) = session(SimulationConfig {
        placement: PlacementPolicy::Unstaffed,
        ..SimulationConfig::default()
    });
    state.place_building(0, BuildingType::Farm).unwrap();

    assert_eq!(state.resources(), resources(110, 40, 220, 160));
    assert_eq!(state.grid_cells()[0].workers, 0);
    assert_eq!(state.workers()[&WorkerType::Farmer].hired, 0);
}

#[test]
fn occupied_cell_rejects_placement_without_change() {
    let (mut state, _) = default_session();
    state.place_building(4, BuildingType::Lumberyard).unwrap();
    let before = state.snapshot();

    assert_eq!(
        state.place_building(4, BuildingType::Farm),
        Err(SimError::CellOccupied { index: 4 })
    );
    assert_eq!(state.snapshot(), before);
}

#[test]
fn unaffordable_placement_is_rejected_without_change() {
    let (mut state, _) = session(SimulationConfig {
        starting_resources: resources(40, 39, 30, 0),
        ..SimulationConfig::default()
    });
    let before = state.snapshot();

    assert_eq!(
        state.place_building(0, BuildingType::Mine),
        Err(SimError::InsufficientResources)
    );
    assert_eq!(state.snapshot(), before);
}

#[test]
fn hiring_without_gold_or_wheat_is_a_no_op() {
    for pool in [resources(0, 0, 500, 19), resources(0, 0, 19, 500)] {
        let (mut state, _) = session(SimulationConfig {
            starting_resources: pool,
            ..SimulationConfig::default()
        });
        let before = state.snapshot();
        assert_eq!(
            state.hire_worker(WorkerType::Farmer),
            Err(SimError::InsufficientResources)
        );
        assert_eq!(state.snapshot(), before);
    }
}

#[test]
fn assigning_without_spare_workers_is_a_no_op() {
    let (mut state, _) = default_session();
    state.place_building(0, BuildingType::Farm).unwrap();
    assert_eq!(state.available_workers(WorkerType::Farmer), 0);
    let before = state.snapshot();

    assert_eq!(
        state.adjust_workers(0, 1),
        Err(SimError::NoAvailableWorkers(WorkerType::Farmer))
    );
    assert_eq!(state.snapshot(), before);
}

#[test]
fn hired_workers_can_be_assigned_later() {
    let (mut state, _) = default_session();
    state.place_building(0, BuildingType::Farm).unwrap();
    state.hire_worker(WorkerType::Farmer).unwrap();
    assert_eq!(state.available_workers(WorkerType::Farmer), 1);

    assert_eq!(state.adjust_workers(0, 1), Ok(2));
    let counts = state.workers()[&WorkerType::Farmer];
    assert_eq!((counts.hired, counts.assigned, counts.available), (2, 2, 0));
    assert_eq!(state.resources(), resources(110, 40, 200, 140));
}

#[test]
fn one_cycle_with_three_farmers_yields_fifteen_wheat() {
    let (mut state, clock) = session(SimulationConfig {
        starting_resources: resources(30, 20, 40, 40),
        ..SimulationConfig::default()
    });
    state.place_building(0, BuildingType::Farm).unwrap();
    state.hire_and_assign(0).unwrap();
    state.hire_and_assign(0).unwrap();
    assert_eq!(state.grid_cells()[0].workers, 3);
    let before = state.resources();

    clock.advance(CYCLE_MS);
    let report = state.tick_if_due().expect("cycle due");

    assert_eq!(report.produced, resources(0, 0, 15, 0));
    let after = state.resources();
    for kind in ResourceKind::ALL {
        let gained = after[&kind] - before[&kind];
        let expected = if kind == ResourceKind::Wheat { 15 } else { 0 };
        assert_eq!(gained, expected, "{kind}");
    }
}

#[test]
fn reads_between_mutations_are_identical() {
    let (mut state, clock) = default_session();
    state.place_building(10, BuildingType::Quarry).unwrap();
    clock.advance(1_000);

    assert_eq!(state.resources(), state.resources());
    assert_eq!(state.snapshot(), state.snapshot());
}

#[test]
fn full_building_rejects_hire_and_assign_without_charging() {
    let (mut state, _) = default_session();
    state.place_building(0, BuildingType::Lumberyard).unwrap();
    for _ in 0..3 {
        state.hire_and_assign(0).unwrap();
    }
    let before = state.snapshot();

    assert_eq!(
        state.hire_and_assign(0),
        Err(SimError::WorkerCapReached { index: 0 })
    );
    assert_eq!(state.snapshot(), before);
    assert_eq!(state.grid_cells()[0].workers, 4);
}

#[test]
fn adding_to_a_full_building_is_an_accepted_no_op() {
    let (mut state, _) = default_session();
    state.place_building(0, BuildingType::Farm).unwrap();
    for _ in 0..3 {
        state.hire_and_assign(0).unwrap();
    }
    state.hire_worker(WorkerType::Farmer).unwrap();
    assert_eq!(state.available_workers(WorkerType::Farmer), 1);
    let before = state.snapshot();

    assert_eq!(state.adjust_workers(0, 1), Ok(4));
    assert_eq!(state.snapshot(), before);
}

#[test]
fn stalled_session_gets_one_cycle_not_a_burst() {
    let (mut state, clock) = default_session();
    state.place_building(0, BuildingType::Mine).unwrap();
    clock.advance(CYCLE_MS * 10);

    assert!(state.tick_if_due().is_some());
    assert!(state.tick_if_due().is_none());
    assert_eq!(state.resources()[&ResourceKind::Gold], 165);
    assert_eq!(state.time_until_next_cycle_ms(), CYCLE_MS);
}
