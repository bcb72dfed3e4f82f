mod support;

use bevy_ecs::prelude::World;
use ems_core::config::DispatchStrategyKind;
use ems_core::ecs::{Incident, IncidentPhase, Triage};
use ems_core::metrics::collect_incidents;
use ems_core::runner::{run_until_empty, simulation_schedule};
use ems_core::scenario::IncidentRecord;
use support::world::{cell_east, cell_west, TestWorldBuilder};

fn cancelled_record(call_received: i64, grid: ems_core::grid::GridId) -> IncidentRecord {
    IncidentRecord {
        wait_departure_scene: None,
        wait_available: Some(0),
        ..ems_core::test_helpers::test_record(call_received, grid, Triage::Urgent)
    }
}

#[test]
fn second_simultaneous_incident_waits_in_minute_steps() {
    let mut world = TestWorldBuilder::new()
        .with_strategy(DispatchStrategyKind::Random)
        .with_depot("West", cell_west())
        .with_link(cell_west(), cell_east(), 300.0)
        .with_plan(vec![vec![1]])
        .with_record(cancelled_record(0, cell_east()))
        .with_record(cancelled_record(0, cell_east()))
        .build();

    let mut schedule = simulation_schedule();
    let steps = run_until_empty(&mut world, &mut schedule, 100_000);
    assert!(steps < 1000, "contention must resolve, took {steps} steps");

    for incident in world.query::<&Incident>().iter(&world) {
        assert_eq!(incident.phase, IncidentPhase::Closed);
    }

    let incidents = collect_incidents(&mut world);
    assert_eq!(incidents.len(), 2);
    let first = &incidents[0];
    let second = &incidents[1];

    // The first call is served immediately.
    assert_eq!(first.metrics.resource_appointment, 0);
    // The second call retries every minute until the vehicle frees up.
    assert!(second.metrics.resource_appointment > 0);
    assert_eq!(second.metrics.resource_appointment % 60, 0);
    // Response order follows arrival order.
    assert!(first.response_time() <= second.response_time());
}

#[test]
fn fleet_size_is_conserved() {
    let mut world = TestWorldBuilder::new()
        .with_strategy(DispatchStrategyKind::Random)
        .with_depot("West", cell_west())
        .with_link(cell_west(), cell_east(), 300.0)
        .with_plan(vec![vec![1]])
        .with_record(cancelled_record(0, cell_east()))
        .with_record(cancelled_record(50, cell_east()))
        .with_record(cancelled_record(5000, cell_east()))
        .build();

    let before = world.query::<&ems_core::ecs::Ambulance>().iter(&world).count();
    let mut schedule = simulation_schedule();
    run_until_empty(&mut world, &mut schedule, 100_000);
    let after = world.query::<&ems_core::ecs::Ambulance>().iter(&world).count();
    assert_eq!(before, 1);
    assert_eq!(after, 1);
}
