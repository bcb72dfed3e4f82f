//! Hospital transport: pick the receiving hospital, drive there, and hold
//! for the handover wait.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock, ONE_MIN_SECS};
use crate::dispatch::{choose_hospital, DispatchRng};
use crate::ecs::{Ambulance, Incident, IncidentPhase, MetricKind};
use crate::scenario::DispatchPolicy;
use crate::tables::{SharedTables, Tables};
use crate::travel::TravelModel;

pub fn dispatching_to_hospital_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    policy: Res<DispatchPolicy>,
    tables: Res<SharedTables>,
    mut travel: ResMut<TravelModel>,
    mut dispatch_rng: ResMut<DispatchRng>,
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
    if incident.phase != IncidentPhase::DispatchingToHospital {
        return;
    }
    let Some(ambulance_entity) = incident.assigned_ambulance else {
        return;
    };
    let Ok(mut ambulance) = ambulances.get_mut(ambulance_entity) else {
        return;
    };

    let Some(hospital) = choose_hospital(
        policy.kind,
        &mut dispatch_rng.0,
        &travel,
        tables,
        incident.grid_id,
        incident.triage,
        incident.timer,
    ) else {
        // No hospitals in the station table: skip straight to the return leg.
        incident.phase = IncidentPhase::PreparingDispatchToDepot;
        let at = incident.timer;
        drop(incident);
        clock.schedule_at(at, EventKind::PreparingDispatchToDepot, Some(subject));
        return;
    };

    incident.grid_id = tables.stations.grid_id(hospital);
    let leg = travel
        .travel_time(
            tables,
            ambulance.current_grid,
            incident.grid_id,
            false,
            incident.triage,
            incident.timer,
        )
        .unwrap_or(ONE_MIN_SECS);
    incident.advance(
        leg,
        Some(MetricKind::DispatchingToHospital),
        Some(&mut ambulance),
    );
    ambulance.current_grid = incident.grid_id;

    let wait = incident.wait_available.unwrap_or(0);
    incident.advance(wait, Some(MetricKind::AtHospital), Some(&mut ambulance));

    incident.phase = IncidentPhase::PreparingDispatchToDepot;
    let at = incident.timer;
    drop(incident);
    clock.schedule_at(at, EventKind::PreparingDispatchToDepot, Some(subject));
}
