//! Ambulance assignment: candidate collection, strategy pick, preemption
//! bookkeeping, and the retry loop when the fleet is exhausted.

use bevy_ecs::prelude::{Entity, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock, ONE_MIN_SECS};
use crate::dispatch::{choose_ambulance, depot_may_serve, DispatchCandidate, DispatchRng};
use crate::ecs::{Ambulance, Incident, IncidentPhase, MetricKind, Triage};
use crate::grid::approximate_location;
use crate::scenario::DispatchPolicy;
use crate::tables::{SharedTables, Tables};
use crate::travel::TravelModel;

/// Facts about an available ambulance gathered during the scan.
struct ScannedCandidate {
    candidate: DispatchCandidate,
    allocated_depot: usize,
    restriction_ok: bool,
    /// Set when the vehicle is mid-trip: data needed to close out its
    /// current incident on reassignment.
    serving_leg: Option<ServingLeg>,
}

struct ServingLeg {
    incident: Entity,
    triage: Triage,
    departed_at: i64,
}

pub fn assigning_ambulance_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    policy: Res<DispatchPolicy>,
    tables: Res<SharedTables>,
    mut travel: ResMut<TravelModel>,
    mut dispatch_rng: ResMut<DispatchRng>,
    mut incidents: Query<&mut Incident>,
    mut ambulances: Query<(Entity, &mut Ambulance)>,
) {
    let Some(subject) = event.0.subject else {
        return;
    };
    let tables: &Tables = &tables;

    let (triage, now, incident_grid, incident_urban) = {
        let Ok(incident) = incidents.get(subject) else {
            return;
        };
        if incident.phase != IncidentPhase::AssigningAmbulance {
            return;
        }
        (
            incident.triage,
            incident.timer,
            incident.incident_grid,
            incident.urban,
        )
    };

    // Scan the fleet. Availability has break side effects (idle vehicles may
    // enter a due break here), so every ambulance is visited.
    let mut scanned: Vec<ScannedCandidate> = Vec::new();
    for (ambulance_entity, mut ambulance) in ambulances.iter_mut() {
        let serving = ambulance.assigned_incident.and_then(|incident_entity| {
            incidents
                .get(incident_entity)
                .ok()
                .map(|serving| (incident_entity, serving.clone()))
        });
        let assigned_state = serving
            .as_ref()
            .map(|(_, serving)| (serving.phase, serving.triage));

        if !ambulance.is_available(assigned_state, now, triage, policy.prioritize_triage) {
            continue;
        }

        let (location, serving_leg) = match &serving {
            None => (ambulance.current_grid, None),
            Some((incident_entity, serving)) => {
                let elapsed = now - serving.prev_timer;
                let total = serving.timer - serving.prev_timer;
                let approximated = approximate_location(
                    ambulance.current_grid,
                    serving.grid_id,
                    elapsed,
                    total,
                );
                if !tables.od.contains(approximated) {
                    // Nowhere meaningful to reroute from; skip this vehicle.
                    continue;
                }
                (
                    approximated,
                    Some(ServingLeg {
                        incident: *incident_entity,
                        triage: serving.triage,
                        departed_at: serving.prev_timer,
                    }),
                )
            }
        };

        let depot_urban = tables.stations.get(ambulance.allocated_depot).urban;
        scanned.push(ScannedCandidate {
            candidate: DispatchCandidate {
                ambulance: ambulance_entity,
                location,
                serving: serving.as_ref().map(|(entity, _)| *entity),
            },
            allocated_depot: ambulance.allocated_depot,
            restriction_ok: depot_may_serve(
                policy.response_restricted,
                depot_urban,
                incident_urban,
            ),
            serving_leg,
        });
    }

    let restricted: Vec<&ScannedCandidate> =
        scanned.iter().filter(|entry| entry.restriction_ok).collect();
    let pool: Vec<&ScannedCandidate> = if restricted.is_empty() {
        scanned.iter().collect()
    } else {
        restricted
    };
    let candidates: Vec<DispatchCandidate> = pool.iter().map(|entry| entry.candidate).collect();

    let chosen = choose_ambulance(
        policy.kind,
        &mut dispatch_rng.0,
        &travel,
        tables,
        &candidates,
        incident_grid,
        triage,
        now,
    );

    let Some(chosen) = chosen else {
        // Fleet exhausted: wait a minute and try again.
        let Ok(mut incident) = incidents.get_mut(subject) else {
            return;
        };
        incident.advance(ONE_MIN_SECS, Some(MetricKind::ResourceAppointment), None);
        let retry_at = incident.timer;
        drop(incident);
        clock.schedule_at(retry_at, EventKind::AssigningAmbulance, Some(subject));
        return;
    };
    let Some(entry) = pool
        .iter()
        .find(|entry| entry.candidate.ambulance == chosen.ambulance)
    else {
        return;
    };
    let allocated_depot = entry.allocated_depot;

    // Close out the incident the vehicle was serving, crediting the return
    // segment it already drove.
    if let Some(leg) = &entry.serving_leg {
        let origin = {
            let Ok((_, ambulance)) = ambulances.get(chosen.ambulance) else {
                return;
            };
            ambulance.current_grid
        };
        let segment = travel
            .travel_time(
                tables,
                origin,
                chosen.location,
                true,
                leg.triage,
                leg.departed_at,
            )
            .unwrap_or(ONE_MIN_SECS);

        if let Ok(mut serving) = incidents.get_mut(leg.incident) {
            serving
                .metrics
                .add(MetricKind::DispatchingToDepot, segment);
            serving.grid_id = chosen.location;
            serving.assigned_ambulance = None;
            serving.pending_travel = 0;
            serving.phase = IncidentPhase::Closed;
        }
        if let Ok((_, mut ambulance)) = ambulances.get_mut(chosen.ambulance) {
            ambulance.time_unavailable += segment;
            ambulance.current_grid = chosen.location;
        }
    }

    let Ok((_, mut ambulance)) = ambulances.get_mut(chosen.ambulance) else {
        return;
    };
    let Ok(mut incident) = incidents.get_mut(subject) else {
        return;
    };

    incident.assigned_ambulance = Some(chosen.ambulance);
    incident.responsible_depot = Some(allocated_depot);
    ambulance.assigned_incident = Some(subject);

    let prepare = incident.wait_prepare_departure;
    incident.advance(
        prepare,
        Some(MetricKind::ResourcePreparingDeparture),
        Some(&mut ambulance),
    );

    // Enter the scene leg: the timer moves to the arrival time now, the
    // metric is charged when the arrival is processed.
    incident.grid_id = incident.incident_grid;
    let depart_at = incident.timer;
    let leg = travel
        .travel_time(
            tables,
            ambulance.current_grid,
            incident.grid_id,
            false,
            triage,
            depart_at,
        )
        .unwrap_or(ONE_MIN_SECS);
    incident.advance(leg, None, None);
    incident.pending_travel = leg;
    incident.phase = IncidentPhase::DispatchingToScene;

    let arrival = incident.timer;
    drop(incident);
    clock.schedule_at(arrival, EventKind::DispatchingToScene, Some(subject));
}
