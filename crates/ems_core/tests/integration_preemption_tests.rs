mod support;

use ems_core::config::DispatchStrategyKind;
use ems_core::ecs::{Ambulance, Incident, IncidentPhase, Triage};
use ems_core::metrics::collect_incidents;
use ems_core::runner::{run_until_empty, simulation_schedule};
use ems_core::scenario::IncidentRecord;
use support::world::{cell_east, cell_mid, cell_west, TestWorldBuilder};

fn record(call_received: i64, triage: Triage) -> IncidentRecord {
    IncidentRecord {
        wait_departure_scene: None,
        wait_available: Some(0),
        ..ems_core::test_helpers::test_record(call_received, cell_east(), triage)
    }
}

/// An acute call arriving while the only vehicle is en route to an urgent
/// scene takes the vehicle over mid-trip.
#[test]
fn acute_call_preempts_urgent_run_mid_trip() {
    let mut world = TestWorldBuilder::new()
        .with_strategy(DispatchStrategyKind::Closest)
        .prioritize_triage(true)
        .with_depot("West", cell_west())
        .with_link(cell_west(), cell_east(), 300.0)
        .with_link(cell_west(), cell_mid(), 150.0)
        .with_link(cell_mid(), cell_east(), 150.0)
        .with_plan(vec![vec![1]])
        // Urgent call at time 0; the vehicle departs west at once.
        .with_record(record(0, Triage::Urgent))
        // Acute call halfway through the 300 s drive: the interpolated
        // position is the midway cell.
        .with_record(record(150, Triage::Acute))
        .build();

    let mut schedule = simulation_schedule();
    run_until_empty(&mut world, &mut schedule, 100_000);

    let snapshots: Vec<Incident> = world
        .query::<&Incident>()
        .iter(&world)
        .cloned()
        .collect();
    let urgent = snapshots
        .iter()
        .find(|incident| incident.triage == Triage::Urgent)
        .expect("urgent incident");
    let acute = snapshots
        .iter()
        .find(|incident| incident.triage == Triage::Acute)
        .expect("acute incident");

    // The urgent incident was abandoned: closed, unlinked, and left pointing
    // at the interpolated hand-over cell.
    assert_eq!(urgent.phase, IncidentPhase::Closed);
    assert!(urgent.assigned_ambulance.is_none());
    assert_eq!(urgent.grid_id, cell_mid());
    assert_eq!(urgent.metrics.dispatching_to_scene, 0);
    // It was charged the return segment the vehicle had already driven.
    assert_eq!(urgent.metrics.dispatching_to_depot, 150);

    // The acute incident completed from the midway cell.
    assert_eq!(acute.phase, IncidentPhase::Closed);
    assert_eq!(acute.metrics.dispatching_to_scene, 150);
    assert_eq!(acute.response_time(), 150);

    let ambulance = world
        .query::<&Ambulance>()
        .iter(&world)
        .next()
        .expect("ambulance")
        .clone();
    assert_eq!(ambulance.current_grid, cell_west());
    assert!(ambulance.assigned_incident.is_none());
}

/// Without the triage-priority knob the acute call has to wait.
#[test]
fn no_preemption_without_priority_policy() {
    let mut world = TestWorldBuilder::new()
        .with_strategy(DispatchStrategyKind::Closest)
        .prioritize_triage(false)
        .with_depot("West", cell_west())
        .with_link(cell_west(), cell_east(), 300.0)
        .with_link(cell_west(), cell_mid(), 150.0)
        .with_link(cell_mid(), cell_east(), 150.0)
        .with_plan(vec![vec![1]])
        .with_record(record(0, Triage::Urgent))
        .with_record(record(150, Triage::Acute))
        .build();

    let mut schedule = simulation_schedule();
    run_until_empty(&mut world, &mut schedule, 100_000);

    let incidents = collect_incidents(&mut world);
    let urgent = incidents
        .iter()
        .find(|incident| incident.triage == Triage::Urgent)
        .expect("urgent incident");
    let acute = incidents
        .iter()
        .find(|incident| incident.triage == Triage::Acute)
        .expect("acute incident");

    // The urgent run completed untouched.
    assert_eq!(urgent.metrics.dispatching_to_scene, 300);
    // The acute call burned retry minutes waiting for the vehicle.
    assert!(acute.metrics.resource_appointment >= 60);
    assert_eq!(acute.metrics.resource_appointment % 60, 0);
}
