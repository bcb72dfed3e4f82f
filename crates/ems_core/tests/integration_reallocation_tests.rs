mod support;

use ems_core::config::DispatchStrategyKind;
use ems_core::ecs::{Ambulance, Triage};
use ems_core::runner::{run_until_empty, simulation_schedule};
use ems_core::scenario::{IncidentRecord, ShiftWindow};
use support::world::{cell_east, cell_mid, cell_west, TestWorldBuilder};

fn cancelled_record(call_received: i64) -> IncidentRecord {
    IncidentRecord {
        wait_departure_scene: None,
        wait_available: Some(0),
        ..ems_core::test_helpers::test_record(call_received, cell_mid(), Triage::Urgent)
    }
}

/// After the segment boundary the vehicle belongs to the other depot and is
/// routed there at the end of its next run.
#[test]
fn reallocated_vehicle_returns_to_its_new_depot() {
    let shift = ShiftWindow {
        start: 0,
        end: 12 * 3600,
        segments: 2,
    };
    let boundary = shift.segment_boundaries()[0];

    let mut world = TestWorldBuilder::new()
        .with_strategy(DispatchStrategyKind::Closest)
        .with_shift(shift)
        .with_depot("West", cell_west())
        .with_depot("East", cell_east())
        .with_link(cell_west(), cell_mid(), 300.0)
        .with_link(cell_east(), cell_mid(), 300.0)
        .with_link(cell_west(), cell_east(), 600.0)
        .with_plan(vec![vec![1, 0], vec![0, 1]])
        .with_record(cancelled_record(0))
        .with_record(IncidentRecord::reallocation_tick(boundary))
        .with_record(cancelled_record(boundary + 400))
        .build();

    let mut schedule = simulation_schedule();
    run_until_empty(&mut world, &mut schedule, 100_000);

    let ambulance = world
        .query::<&Ambulance>()
        .iter(&world)
        .next()
        .expect("ambulance")
        .clone();
    // Station row 1 is the east depot.
    assert_eq!(ambulance.allocated_depot, 1);
    assert_eq!(ambulance.current_grid, cell_east());
    assert!(ambulance.assigned_incident.is_none());
}

/// A tick that changes nothing leaves the roster alone.
#[test]
fn reallocation_without_deficit_is_a_no_op() {
    let shift = ShiftWindow {
        start: 0,
        end: 12 * 3600,
        segments: 2,
    };
    let boundary = shift.segment_boundaries()[0];

    let mut world = TestWorldBuilder::new()
        .with_strategy(DispatchStrategyKind::Closest)
        .with_shift(shift)
        .with_depot("West", cell_west())
        .with_depot("East", cell_east())
        .with_link(cell_west(), cell_mid(), 300.0)
        .with_link(cell_east(), cell_mid(), 300.0)
        .with_plan(vec![vec![1, 0], vec![1, 0]])
        .with_record(IncidentRecord::reallocation_tick(boundary))
        .build();

    let mut schedule = simulation_schedule();
    run_until_empty(&mut world, &mut schedule, 100);

    let ambulance = world
        .query::<&Ambulance>()
        .iter(&world)
        .next()
        .expect("ambulance")
        .clone();
    assert_eq!(ambulance.allocated_depot, 0);
    assert_eq!(ambulance.current_grid, cell_west());
}
