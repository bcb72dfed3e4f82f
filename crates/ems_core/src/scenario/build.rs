use bevy_ecs::prelude::World;

use crate::allocator::{build_roster, AllocationPlan};
use crate::clock::{EventKind, SimulationClock};
use crate::dispatch::DispatchRng;
use crate::ecs::{Incident, IncidentMetrics, IncidentPhase, MetricKind};
use crate::scenario::{IncidentRecord, SimulationOptions};
use crate::tables::SharedTables;
use crate::travel::TravelModel;

/// Populate a fresh world with everything one simulation needs: shared
/// tables, clock, policy and RNG resources, the ambulance roster for the
/// allocation's first row, and one entity per incident record.
///
/// Incidents enter the timeline once their call has been answered and a
/// resource appointed, with those two waits pre-charged; utility records
/// become reallocation ticks instead of entities.
pub fn build_simulation(
    world: &mut World,
    tables: SharedTables,
    records: &[IncidentRecord],
    plan: AllocationPlan,
    options: &SimulationOptions,
) {
    let mut clock = SimulationClock::default();

    world.insert_resource(TravelModel::with_options(
        options.seed ^ 0x7a61_7665_6c72_6e67,
        options.acute_travel_factor,
        options.travel_noise_clamp,
    ));
    world.insert_resource(DispatchRng::seed_from(options.seed));
    world.insert_resource(options.policy);
    world.insert_resource(options.shift);

    let roster = build_roster(&tables.stations, &plan, &options.shift, options.schedule_breaks);
    for ambulance in roster {
        world.spawn(ambulance);
    }
    world.insert_resource(plan);
    world.insert_resource(tables);

    let mut next_id = 0u32;
    for record in records {
        if record.utility {
            clock.schedule_at(record.call_received, EventKind::Reallocating, None);
            continue;
        }

        let mut metrics = IncidentMetrics::default();
        metrics.add(MetricKind::IncidentCreation, record.wait_call_answered);
        metrics.add(
            MetricKind::ResourceAppointment,
            record.wait_appointing_resource,
        );
        let timer =
            record.call_received + record.wait_call_answered + record.wait_appointing_resource;

        let incident = Incident {
            id: next_id,
            phase: IncidentPhase::AssigningAmbulance,
            timer,
            prev_timer: record.call_received,
            assigned_ambulance: None,
            responsible_depot: None,
            triage: record.triage,
            grid_id: record.incident_grid,
            incident_grid: record.incident_grid,
            urban: record.urban,
            call_received: record.call_received,
            wait_prepare_departure: record.wait_prepare_departure,
            wait_departure_scene: record.wait_departure_scene,
            wait_available: record.wait_available,
            metrics,
            pending_travel: 0,
        };
        next_id += 1;

        let entity = world.spawn(incident).id();
        clock.schedule_at(timer, EventKind::AssigningAmbulance, Some(entity));
    }

    world.insert_resource(clock);
}
