//! Post-run extraction and aggregate response-time metrics.
//!
//! After a drain the world is reduced to plain [`SimulatedIncident`] and
//! [`AmbulanceRecord`] values; the aggregate queries (bucket averages and
//! threshold-violation rates) operate on those.

use bevy_ecs::prelude::World;
use serde::{Deserialize, Serialize};

use crate::clock::ONE_MIN_SECS;
use crate::ecs::{Ambulance, Incident, IncidentMetrics, Triage};
use crate::grid::GridId;
use crate::scenario::ShiftWindow;

/// Snapshot of one processed incident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedIncident {
    pub id: u32,
    pub triage: Triage,
    pub urban: bool,
    pub call_received: i64,
    pub incident_grid: GridId,
    pub responsible_depot: Option<usize>,
    pub metrics: IncidentMetrics,
}

impl SimulatedIncident {
    pub fn response_time(&self) -> i64 {
        self.metrics.response_time()
    }
}

/// Snapshot of one ambulance's shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmbulanceRecord {
    pub id: u32,
    pub allocated_depot: usize,
    pub time_unavailable: i64,
    pub time_not_working: i64,
}

/// Pull every incident out of a drained world, sorted by call time.
pub fn collect_incidents(world: &mut World) -> Vec<SimulatedIncident> {
    let mut incidents: Vec<SimulatedIncident> = world
        .query::<&Incident>()
        .iter(world)
        .map(|incident| SimulatedIncident {
            id: incident.id,
            triage: incident.triage,
            urban: incident.urban,
            call_received: incident.call_received,
            incident_grid: incident.incident_grid,
            responsible_depot: incident.responsible_depot,
            metrics: incident.metrics,
        })
        .collect();
    incidents.sort_by_key(|incident| (incident.call_received, incident.id));
    incidents
}

/// Pull the ambulance records out of a drained world, in roster order.
pub fn collect_ambulances(world: &mut World) -> Vec<AmbulanceRecord> {
    let mut records: Vec<AmbulanceRecord> = world
        .query::<&Ambulance>()
        .iter(world)
        .map(|ambulance| AmbulanceRecord {
            id: ambulance.id,
            allocated_depot: ambulance.allocated_depot,
            time_unavailable: ambulance.time_unavailable,
            time_not_working: ambulance.time_not_working,
        })
        .collect();
    records.sort_by_key(|record| record.id);
    records
}

/// Response-time goal for a (triage, urbanity) bucket, in seconds. Buckets
/// without a goal are excluded from violation rates.
pub fn violation_threshold(triage: Triage, urban: bool) -> Option<i64> {
    match (triage, urban) {
        (Triage::Acute, true) => Some(12 * ONE_MIN_SECS),
        (Triage::Acute, false) => Some(25 * ONE_MIN_SECS),
        (Triage::Urgent, true) => Some(30 * ONE_MIN_SECS),
        (Triage::Urgent, false) => Some(40 * ONE_MIN_SECS),
        (Triage::Scheduled, _) => None,
    }
}

fn in_segment(incident: &SimulatedIncident, shift: &ShiftWindow, segment: Option<usize>) -> bool {
    match segment {
        Some(segment) => shift.allocation_index(incident.call_received) == segment,
        None => true,
    }
}

/// Mean response time over one (triage, urbanity) bucket, optionally
/// restricted to one allocation segment. Zero when the bucket is empty.
pub fn average_response_time(
    incidents: &[SimulatedIncident],
    triage: Triage,
    urban: bool,
    shift: &ShiftWindow,
    segment: Option<usize>,
) -> f64 {
    let mut total = 0i64;
    let mut count = 0usize;
    for incident in incidents {
        if incident.triage != triage || incident.urban != urban {
            continue;
        }
        if !in_segment(incident, shift, segment) {
            continue;
        }
        total += incident.response_time();
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}

/// Fraction of goal-covered incidents whose response time exceeded the goal,
/// optionally restricted to one allocation segment, an urbanity class, or
/// one responsible depot.
pub fn response_time_violations(
    incidents: &[SimulatedIncident],
    shift: &ShiftWindow,
    segment: Option<usize>,
    urban: Option<bool>,
    depot: Option<usize>,
) -> f64 {
    let mut violations = 0usize;
    let mut count = 0usize;
    for incident in incidents {
        let Some(threshold) = violation_threshold(incident.triage, incident.urban) else {
            continue;
        };
        if let Some(urban) = urban {
            if incident.urban != urban {
                continue;
            }
        }
        if let Some(depot) = depot {
            if incident.responsible_depot != Some(depot) {
                continue;
            }
        }
        if !in_segment(incident, shift, segment) {
            continue;
        }
        count += 1;
        if incident.response_time() > threshold {
            violations += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        violations as f64 / count as f64
    }
}
