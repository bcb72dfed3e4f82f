//! Artifact writers: per-incident, per-ambulance, and allocation CSVs.

use std::fs::File;
use std::path::Path;

use crate::ecs::MetricKind;
use crate::metrics::{AmbulanceRecord, SimulatedIncident};

const METRIC_COLUMNS: [MetricKind; 8] = [
    MetricKind::IncidentCreation,
    MetricKind::ResourceAppointment,
    MetricKind::ResourcePreparingDeparture,
    MetricKind::DispatchingToScene,
    MetricKind::AtScene,
    MetricKind::DispatchingToHospital,
    MetricKind::AtHospital,
    MetricKind::DispatchingToDepot,
];

/// One row per processed incident with every metric total and the derived
/// response time.
pub fn write_events_csv(
    path: &Path,
    incidents: &[SimulatedIncident],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);

    let mut header = vec![
        "id".to_string(),
        "triage_impression_during_call".to_string(),
        "urban".to_string(),
        "time_call_received".to_string(),
        "grid_id".to_string(),
        "responsible_depot".to_string(),
    ];
    header.extend(METRIC_COLUMNS.iter().map(|kind| kind.column_name().to_string()));
    header.push("response_time".to_string());
    writer.write_record(&header)?;

    for incident in incidents {
        let mut row = vec![
            incident.id.to_string(),
            incident.triage.as_str().to_string(),
            incident.urban.to_string(),
            incident.call_received.to_string(),
            incident.incident_grid.0.to_string(),
            incident
                .responsible_depot
                .map(|depot| depot.to_string())
                .unwrap_or_default(),
        ];
        row.extend(
            METRIC_COLUMNS
                .iter()
                .map(|&kind| incident.metrics.get(kind).to_string()),
        );
        row.push(incident.response_time().to_string());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// One row per ambulance with its cumulative workload.
pub fn write_ambulances_csv(
    path: &Path,
    ambulances: &[AmbulanceRecord],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    writer.write_record([
        "id",
        "allocated_depot",
        "time_unavailable",
        "time_not_working",
    ])?;
    for ambulance in ambulances {
        writer.write_record([
            ambulance.id.to_string(),
            ambulance.allocated_depot.to_string(),
            ambulance.time_unavailable.to_string(),
            ambulance.time_not_working.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// The allocation matrix, one row per time segment.
pub fn write_genotype_csv(
    path: &Path,
    rows: &[Vec<usize>],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for row in rows {
        writer.write_record(row.iter().map(|count| count.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
