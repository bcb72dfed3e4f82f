//! Origin/destination travel-time matrix.
//!
//! File format: the first line is the comma-separated list of grid ids,
//! defining both row and column order; each following line is one row of
//! comma-separated travel times in seconds. A stored 0 means "no
//! measurement" and is substituted downstream.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::grid::GridId;
use crate::tables::TableError;

#[derive(Debug, Default)]
pub struct OdMatrix {
    index: HashMap<GridId, usize>,
    size: usize,
    /// Row-major travel times.
    values: Vec<f32>,
}

impl OdMatrix {
    pub fn load_from_file(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path)?;
        let mut lines = BufReader::new(file).lines();

        let header = lines
            .next()
            .ok_or_else(|| TableError::Invalid(format!("{}: empty OD matrix", path.display())))??;
        let mut index = HashMap::new();
        for (position, field) in header.split(',').enumerate() {
            let id: i64 = field.trim().parse().map_err(|_| {
                TableError::Invalid(format!("{}: bad grid id {field:?}", path.display()))
            })?;
            index.insert(GridId(id), position);
        }

        let size = index.len();
        let mut values = vec![0.0_f32; size * size];
        let mut row = 0usize;
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            if row >= size {
                return Err(TableError::Invalid(format!(
                    "{}: more rows than grid ids",
                    path.display()
                )));
            }
            for (column, field) in line.split(',').enumerate() {
                if column >= size {
                    return Err(TableError::Invalid(format!(
                        "{}: row {row} has more columns than grid ids",
                        path.display()
                    )));
                }
                values[row * size + column] = field.trim().parse().map_err(|_| {
                    TableError::Invalid(format!(
                        "{}: bad travel time {field:?} at row {row}",
                        path.display()
                    ))
                })?;
            }
            row += 1;
        }
        if row != size {
            return Err(TableError::Invalid(format!(
                "{}: expected {size} rows, found {row}",
                path.display()
            )));
        }

        Ok(OdMatrix {
            index,
            size,
            values,
        })
    }

    /// Build a matrix from explicit entries; used by tests and synthetic
    /// scenarios.
    pub fn from_entries(ids: &[GridId], entries: &[(GridId, GridId, f32)]) -> Self {
        let index: HashMap<GridId, usize> = ids
            .iter()
            .enumerate()
            .map(|(position, id)| (*id, position))
            .collect();
        let size = index.len();
        let mut values = vec![0.0_f32; size * size];
        for &(from, to, seconds) in entries {
            if let (Some(&row), Some(&column)) = (index.get(&from), index.get(&to)) {
                values[row * size + column] = seconds;
            }
        }
        OdMatrix {
            index,
            size,
            values,
        }
    }

    pub fn contains(&self, id: GridId) -> bool {
        self.index.contains_key(&id)
    }

    /// Raw stored travel time between two known cells. `None` when either id
    /// is unknown; `Some(0.0)` when the pair has no measurement.
    pub fn base_time(&self, from: GridId, to: GridId) -> Option<f32> {
        let row = *self.index.get(&from)?;
        let column = *self.index.get(&to)?;
        Some(self.values[row * self.size + column])
    }

    pub fn grid_ids(&self) -> impl Iterator<Item = GridId> + '_ {
        self.index.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}
