//! Station table: depots, day-only standby points, and hospitals.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::grid::GridId;
use crate::tables::TableError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StationKind {
    Depot,
    /// Extra staffed point used only during the day shift
    /// ("beredskapspunkt" in the source data).
    StandbyPoint,
    Hospital,
}

impl StationKind {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "Depot" => Some(StationKind::Depot),
            "Beredskapspunkt" => Some(StationKind::StandbyPoint),
            "Hospital" => Some(StationKind::Hospital),
            _ => None,
        }
    }
}

/// One row of the stations table. Demographic counts weight the
/// proportionate genotype initializers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub kind: StationKind,
    pub grid_id: GridId,
    pub longitude: f64,
    pub latitude: f64,
    pub region: String,
    pub urban: bool,
    pub total_population_radius_2km: f64,
    pub total_population_radius_5km: f64,
    pub total_population_cluster: f64,
    pub total_incidents_radius_2km: f64,
    pub total_incidents_radius_5km: f64,
    pub total_incidents_cluster: f64,
}

/// Demographic weight column selectable by the proportionate initializers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DemographicColumn {
    PopulationRadius2km,
    PopulationRadius5km,
    PopulationCluster,
    IncidentsRadius2km,
    IncidentsRadius5km,
    IncidentsCluster,
}

impl Station {
    pub fn demographic_weight(&self, column: DemographicColumn) -> f64 {
        match column {
            DemographicColumn::PopulationRadius2km => self.total_population_radius_2km,
            DemographicColumn::PopulationRadius5km => self.total_population_radius_5km,
            DemographicColumn::PopulationCluster => self.total_population_cluster,
            DemographicColumn::IncidentsRadius2km => self.total_incidents_radius_2km,
            DemographicColumn::IncidentsRadius5km => self.total_incidents_radius_5km,
            DemographicColumn::IncidentsCluster => self.total_incidents_cluster,
        }
    }
}

#[derive(Debug, Default)]
pub struct Stations {
    rows: Vec<Station>,
}

impl Stations {
    pub fn load_from_file(path: &Path) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let column = |name: &str| -> Result<usize, TableError> {
            headers.iter().position(|header| header == name).ok_or_else(|| {
                TableError::Invalid(format!("{}: missing column {name:?}", path.display()))
            })
        };

        let name_col = column("name")?;
        let kind_col = column("type")?;
        let grid_col = column("grid_id")?;
        let longitude_col = column("longitude")?;
        let latitude_col = column("latitude")?;
        let region_col = column("region")?;
        let urban_col = column("urban_settlement")?;
        let pop2_col = column("total_population_radius_2km")?;
        let pop5_col = column("total_population_radius_5km")?;
        let popc_col = column("total_population_cluster")?;
        let inc2_col = column("total_incidents_radius_2km")?;
        let inc5_col = column("total_incidents_radius_5km")?;
        let incc_col = column("total_incidents_cluster")?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let field = |index: usize| record.get(index).unwrap_or("").trim();
            let kind = StationKind::parse(field(kind_col)).ok_or_else(|| {
                TableError::Invalid(format!(
                    "{}: unknown station type {:?}",
                    path.display(),
                    field(kind_col)
                ))
            })?;
            rows.push(Station {
                name: field(name_col).to_string(),
                kind,
                grid_id: GridId(parse_number(field(grid_col), path, "grid_id")? as i64),
                longitude: parse_number(field(longitude_col), path, "longitude")?,
                latitude: parse_number(field(latitude_col), path, "latitude")?,
                region: field(region_col).to_string(),
                urban: parse_flag(field(urban_col)),
                total_population_radius_2km: parse_number(
                    field(pop2_col),
                    path,
                    "total_population_radius_2km",
                )?,
                total_population_radius_5km: parse_number(
                    field(pop5_col),
                    path,
                    "total_population_radius_5km",
                )?,
                total_population_cluster: parse_number(
                    field(popc_col),
                    path,
                    "total_population_cluster",
                )?,
                total_incidents_radius_2km: parse_number(
                    field(inc2_col),
                    path,
                    "total_incidents_radius_2km",
                )?,
                total_incidents_radius_5km: parse_number(
                    field(inc5_col),
                    path,
                    "total_incidents_radius_5km",
                )?,
                total_incidents_cluster: parse_number(
                    field(incc_col),
                    path,
                    "total_incidents_cluster",
                )?,
            });
        }

        Ok(Stations { rows })
    }

    pub fn from_rows(rows: Vec<Station>) -> Self {
        Stations { rows }
    }

    pub fn get(&self, index: usize) -> &Station {
        &self.rows[index]
    }

    pub fn rows(&self) -> &[Station] {
        &self.rows
    }

    pub fn grid_id(&self, index: usize) -> GridId {
        self.rows[index].grid_id
    }

    /// Row indices of depots in the active set. Standby points are staffed
    /// only during the day shift. `skip_index` excludes one station
    /// (negative disables the exclusion).
    pub fn depot_indices(&self, day_shift: bool, skip_index: i64) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(index, station)| {
                let kind_matches = match station.kind {
                    StationKind::Depot => true,
                    StationKind::StandbyPoint => day_shift,
                    StationKind::Hospital => false,
                };
                kind_matches && *index as i64 != skip_index
            })
            .map(|(index, _)| index)
            .collect()
    }

    pub fn hospital_indices(&self) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, station)| station.kind == StationKind::Hospital)
            .map(|(index, _)| index)
            .collect()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value, "True" | "true" | "1")
}

fn parse_number(value: &str, path: &Path, column: &str) -> Result<f64, TableError> {
    if value.is_empty() {
        return Ok(0.0);
    }
    value.parse().map_err(|_| {
        TableError::Invalid(format!(
            "{}: bad number {value:?} in column {column}",
            path.display()
        ))
    })
}
