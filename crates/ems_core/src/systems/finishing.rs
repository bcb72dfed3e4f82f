//! Finishing: settle the return-leg metric, park the vehicle, and close the
//! incident -- unless reallocation moved the depot underneath the vehicle,
//! in which case it heads out again.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Ambulance, Incident, IncidentPhase, MetricKind};
use crate::tables::{SharedTables, Tables};

pub fn finishing_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    tables: Res<SharedTables>,
    mut incidents: Query<&mut Incident>,
    mut ambulances: Query<&mut Ambulance>,
) {
    let Some(subject) = event.0.subject else {
        return;
    };
    let tables: &Tables = &tables;
    let Ok(mut incident) = incidents.get_mut(subject) else {
        return;
    };
    if incident.phase != IncidentPhase::Finished {
        return;
    }
    let Some(ambulance_entity) = incident.assigned_ambulance else {
        return;
    };
    let Ok(mut ambulance) = ambulances.get_mut(ambulance_entity) else {
        return;
    };

    let leg = incident.pending_travel;
    incident.pending_travel = 0;
    incident.charge(leg, MetricKind::DispatchingToDepot, None);
    // The return drive still counts against the vehicle's availability total.
    ambulance.time_unavailable += leg;
    ambulance.current_grid = incident.grid_id;

    let allocated_grid = tables.stations.grid_id(ambulance.allocated_depot);
    if ambulance.current_grid != allocated_grid {
        // Reallocated while en route: head to the new depot.
        incident.phase = IncidentPhase::PreparingDispatchToDepot;
        let at = incident.timer;
        drop(incident);
        clock.schedule_at(at, EventKind::PreparingDispatchToDepot, Some(subject));
        return;
    }

    let now = incident.timer;
    ambulance.check_scheduled_break(now);
    ambulance.assigned_incident = None;
    incident.assigned_ambulance = None;
    incident.phase = IncidentPhase::Closed;
}
