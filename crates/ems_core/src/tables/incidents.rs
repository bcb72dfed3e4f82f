//! Historical incident table, the sampling base for scenario synthesis.
//!
//! Each row carries the triage impression, the grid cell, urbanity flags, and
//! the recorded timeline of the real incident. The reader converts the
//! timeline into the service-duration deltas the simulator consumes; rows
//! with no hospital leg yield `None` for the departure-scene wait.

use std::path::Path;

use crate::grid::GridId;
use crate::ecs::Triage;
use crate::tables::TableError;
use crate::time::parse_timestamp;

/// One historical incident with derived service durations (seconds).
#[derive(Debug, Clone)]
pub struct IncidentRow {
    pub triage: Triage,
    pub call_received: i64,
    pub grid_id: GridId,
    pub urban_settlement: bool,
    pub urban_settlement_ssb: bool,
    pub wait_call_answered: i64,
    pub wait_appointing_resource: i64,
    pub wait_prepare_departure: i64,
    /// `None` when the patient was not transported.
    pub wait_departure_scene: Option<i64>,
    pub wait_available: Option<i64>,
}

#[derive(Debug, Default)]
pub struct IncidentHistory {
    rows: Vec<IncidentRow>,
}

impl IncidentHistory {
    pub fn load_from_file(path: &Path) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let column = |name: &str| -> Result<usize, TableError> {
            headers.iter().position(|header| header == name).ok_or_else(|| {
                TableError::Invalid(format!("{}: missing column {name:?}", path.display()))
            })
        };

        let triage_col = column("triage_impression_during_call")?;
        let call_received_col = column("time_call_received")?;
        let created_col = column("time_incident_created")?;
        let appointed_col = column("time_resource_appointed")?;
        let dispatch_scene_col = column("time_ambulance_dispatch_to_scene")?;
        let arrived_scene_col = column("time_ambulance_arrived_at_scene")?;
        let dispatch_hospital_col = column("time_ambulance_dispatch_to_hospital")?;
        let arrived_hospital_col = column("time_ambulance_arrived_at_hospital")?;
        let available_col = column("time_ambulance_available")?;
        let grid_col = column("grid_id")?;
        let urban_col = column("urban_settlement")?;
        let urban_ssb_col = headers.iter().position(|header| header == "urban_settlement_ssb");

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let field = |index: usize| record.get(index).unwrap_or("").trim();

            let Some(triage) = Triage::parse(field(triage_col)) else {
                // Rows with unusable triage cannot drive the simulator.
                continue;
            };
            let Some(call_received) = parse_timestamp(field(call_received_col)) else {
                continue;
            };
            let created = parse_timestamp(field(created_col));
            let appointed = parse_timestamp(field(appointed_col));
            let dispatch_scene = parse_timestamp(field(dispatch_scene_col));
            let arrived_scene = parse_timestamp(field(arrived_scene_col));
            let dispatch_hospital = parse_timestamp(field(dispatch_hospital_col));
            let arrived_hospital = parse_timestamp(field(arrived_hospital_col));
            let available = parse_timestamp(field(available_col));

            let (Some(created), Some(appointed), Some(dispatch_scene), Some(arrived_scene)) =
                (created, appointed, dispatch_scene, arrived_scene)
            else {
                continue;
            };

            let wait_departure_scene = match (dispatch_hospital, arrived_hospital) {
                (Some(dispatch), Some(_)) => Some((dispatch - arrived_scene).max(0)),
                _ => None,
            };
            let wait_available = match (available, arrived_hospital) {
                (Some(available), Some(arrived)) => Some((available - arrived).max(0)),
                (Some(available), None) => Some((available - arrived_scene).max(0)),
                _ => None,
            };

            let grid_id = GridId(field(grid_col).parse().map_err(|_| {
                TableError::Invalid(format!(
                    "{}: bad grid id {:?}",
                    path.display(),
                    field(grid_col)
                ))
            })?);

            rows.push(IncidentRow {
                triage,
                call_received,
                grid_id,
                urban_settlement: parse_flag(field(urban_col)),
                urban_settlement_ssb: urban_ssb_col
                    .map(|index| parse_flag(field(index)))
                    .unwrap_or_else(|| parse_flag(field(urban_col))),
                wait_call_answered: (created - call_received).max(0),
                wait_appointing_resource: (appointed - created).max(0),
                wait_prepare_departure: (dispatch_scene - appointed).max(0),
                wait_departure_scene,
                wait_available,
            });
        }

        Ok(IncidentHistory { rows })
    }

    pub fn from_rows(rows: Vec<IncidentRow>) -> Self {
        IncidentHistory { rows }
    }

    pub fn rows(&self) -> &[IncidentRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value, "True" | "true" | "1")
}
