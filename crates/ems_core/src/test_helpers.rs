//! Builders for small deterministic scenarios, shared by unit and
//! integration tests.

use std::sync::Arc;

use crate::ecs::Triage;
use crate::grid::GridId;
use crate::scenario::IncidentRecord;
use crate::tables::stations::{Station, StationKind};
use crate::tables::{IncidentHistory, OdMatrix, SharedTables, Stations, Tables, TrafficTable};

/// A station row with zeroed demographics.
pub fn test_station(name: &str, kind: StationKind, grid: GridId, urban: bool) -> Station {
    Station {
        name: name.to_string(),
        kind,
        grid_id: grid,
        longitude: 0.0,
        latitude: 0.0,
        region: String::new(),
        urban,
        total_population_radius_2km: 0.0,
        total_population_radius_5km: 0.0,
        total_population_cluster: 0.0,
        total_incidents_radius_2km: 0.0,
        total_incidents_radius_5km: 0.0,
        total_incidents_cluster: 0.0,
    }
}

/// Tables from explicit stations and OD entries, flat traffic, no history.
pub fn test_tables(stations: Vec<Station>, od_entries: &[(GridId, GridId, f32)]) -> SharedTables {
    let mut ids: Vec<GridId> = stations.iter().map(|station| station.grid_id).collect();
    for &(from, to, _) in od_entries {
        ids.push(from);
        ids.push(to);
    }
    ids.sort();
    ids.dedup();
    SharedTables(Arc::new(Tables {
        od: OdMatrix::from_entries(&ids, od_entries),
        stations: Stations::from_rows(stations),
        traffic: TrafficTable::uniform(1.0),
        incidents: IncidentHistory::default(),
    }))
}

/// An incident record with sensible defaults: answered instantly, appointed
/// instantly, short preparation, transported.
pub fn test_record(call_received: i64, grid: GridId, triage: Triage) -> IncidentRecord {
    IncidentRecord {
        call_received,
        incident_grid: grid,
        triage,
        urban: true,
        wait_call_answered: 0,
        wait_appointing_resource: 0,
        wait_prepare_departure: 0,
        wait_departure_scene: Some(0),
        wait_available: Some(0),
        utility: false,
    }
}
