//! Depot arrival: the drive is over; hand off to the finishing step at the
//! same timestamp.

use bevy_ecs::prelude::{Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::{Incident, IncidentPhase};

pub fn dispatching_to_depot_system(
    mut clock: ResMut<SimulationClock>,
    event: Res<CurrentEvent>,
    mut incidents: Query<&mut Incident>,
) {
    let Some(subject) = event.0.subject else {
        return;
    };
    let Ok(mut incident) = incidents.get_mut(subject) else {
        return;
    };
    if incident.phase != IncidentPhase::DispatchingToDepot {
        return;
    }

    incident.phase = IncidentPhase::Finished;
    let at = incident.timer;
    drop(incident);
    clock.schedule_at(at, EventKind::Finishing, Some(subject));
}
