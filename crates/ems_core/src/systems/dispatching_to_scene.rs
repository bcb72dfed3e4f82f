//! Scene arrival: charge the travel leg, then hold for the on-scene wait.
//! Transported patients head to a hospital next; cancelled incidents send
//! the vehicle back toward its depot.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Ambulance, Incident, IncidentPhase, MetricKind};

pub fn dispatching_to_scene_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    mut incidents: Query<&mut Incident>,
    mut ambulances: Query<&mut Ambulance>,
) {
    let Some(subject) = event.0.subject else {
        return;
    };
    let Ok(mut incident) = incidents.get_mut(subject) else {
        return;
    };
    if incident.phase != IncidentPhase::DispatchingToScene {
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
    incident.charge(leg, MetricKind::DispatchingToScene, Some(&mut ambulance));
    ambulance.current_grid = incident.grid_id;

    match incident.wait_departure_scene {
        Some(wait) => {
            incident.advance(wait, Some(MetricKind::AtScene), Some(&mut ambulance));
            incident.phase = IncidentPhase::DispatchingToHospital;
            let at = incident.timer;
            drop(incident);
            clock.schedule_at(at, EventKind::DispatchingToHospital, Some(subject));
        }
        None => {
            let wait = incident.wait_available.unwrap_or(0);
            incident.advance(wait, Some(MetricKind::AtScene), Some(&mut ambulance));
            incident.phase = IncidentPhase::PreparingDispatchToDepot;
            let at = incident.timer;
            drop(incident);
            clock.schedule_at(at, EventKind::PreparingDispatchToDepot, Some(subject));
        }
    }
}
