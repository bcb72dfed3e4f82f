//! Read-only data tables: OD matrix, stations, traffic factors, historical
//! incidents.
//!
//! Tables are loaded once at startup and shared immutably across all
//! simulations (and across evaluation threads) behind an [`Arc`]. Nothing in
//! the hot path mutates them.

pub mod incidents;
pub mod od;
pub mod stations;
pub mod traffic;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use bevy_ecs::prelude::Resource;

pub use incidents::{IncidentHistory, IncidentRow};
pub use od::OdMatrix;
pub use stations::{Station, StationKind, Stations};
pub use traffic::TrafficTable;

/// Error raised while loading a data table.
#[derive(Debug)]
pub enum TableError {
    Io(std::io::Error),
    Csv(csv::Error),
    Invalid(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Io(err) => write!(f, "table I/O error: {err}"),
            TableError::Csv(err) => write!(f, "table CSV error: {err}"),
            TableError::Invalid(message) => write!(f, "invalid table data: {message}"),
        }
    }
}

impl std::error::Error for TableError {}

impl From<std::io::Error> for TableError {
    fn from(err: std::io::Error) -> Self {
        TableError::Io(err)
    }
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        TableError::Csv(err)
    }
}

/// All loaded tables.
#[derive(Debug)]
pub struct Tables {
    pub od: OdMatrix,
    pub stations: Stations,
    pub traffic: TrafficTable,
    pub incidents: IncidentHistory,
}

impl Tables {
    /// Load every table from its conventional file under `data_dir`:
    /// `od_matrix.txt`, `stations.csv`, `traffic.csv`, `incidents.csv`.
    pub fn load_from_dir(data_dir: &Path) -> Result<Self, TableError> {
        let od = OdMatrix::load_from_file(&data_dir.join("od_matrix.txt"))?;
        let stations = Stations::load_from_file(&data_dir.join("stations.csv"))?;
        let traffic = TrafficTable::load_from_file(&data_dir.join("traffic.csv"))?;
        let incidents = IncidentHistory::load_from_file(&data_dir.join("incidents.csv"))?;
        Ok(Tables {
            od,
            stations,
            traffic,
            incidents,
        })
    }
}

/// Resource handle sharing the tables with a simulation world.
#[derive(Debug, Clone, Resource)]
pub struct SharedTables(pub Arc<Tables>);

impl SharedTables {
    pub fn new(tables: Tables) -> Self {
        SharedTables(Arc::new(tables))
    }
}

impl std::ops::Deref for SharedTables {
    type Target = Tables;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
