//! Return leg entry: aim the vehicle at its allocated depot (which
//! reallocation may have changed) and advance the timer past the drive. The
//! metric is charged once the vehicle arrives.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock, ONE_MIN_SECS};
use crate::ecs::{Ambulance, Incident, IncidentPhase};
use crate::tables::{SharedTables, Tables};
use crate::travel::TravelModel;

pub fn preparing_dispatch_to_depot_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    tables: Res<SharedTables>,
    mut travel: ResMut<TravelModel>,
    mut incidents: Query<&mut Incident>,
    ambulances: Query<&Ambulance>,
) {
    let Some(subject) = event.0.subject else {
        return;
    };
    let tables: &Tables = &tables;
    let Ok(mut incident) = incidents.get_mut(subject) else {
        return;
    };
    if incident.phase != IncidentPhase::PreparingDispatchToDepot {
        return;
    }
    let Some(ambulance_entity) = incident.assigned_ambulance else {
        return;
    };
    let Ok(ambulance) = ambulances.get(ambulance_entity) else {
        return;
    };

    incident.grid_id = tables.stations.grid_id(ambulance.allocated_depot);
    let leg = travel
        .travel_time(
            tables,
            ambulance.current_grid,
            incident.grid_id,
            true,
            incident.triage,
            incident.timer,
        )
        .unwrap_or(ONE_MIN_SECS);
    incident.advance(leg, None, None);
    incident.pending_travel = leg;
    incident.phase = IncidentPhase::DispatchingToDepot;

    let arrival = incident.timer;
    drop(incident);
    clock.schedule_at(arrival, EventKind::DispatchingToDepot, Some(subject));
}
