//! Traffic factor table: multiplicative travel-time factors by hour of day
//! and day of week.
//!
//! File format: CSV with columns `Monday..Sunday` and 24 rows (hour 0 at the
//! top). Factor 1.0 = free flow.

use std::path::Path;

use crate::tables::TableError;
use crate::time::{hour_of_day, weekday};

const DAY_COLUMNS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

#[derive(Debug, Clone)]
pub struct TrafficTable {
    /// Indexed `[hour][weekday]`, weekday 0 = Monday.
    factors: [[f64; 7]; 24],
}

impl Default for TrafficTable {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl TrafficTable {
    /// A table with the same factor everywhere (no time-of-day effect when
    /// 1.0).
    pub fn uniform(factor: f64) -> Self {
        TrafficTable {
            factors: [[factor; 7]; 24],
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, TableError> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        let mut day_positions = [0usize; 7];
        for (day, name) in DAY_COLUMNS.iter().enumerate() {
            day_positions[day] = headers
                .iter()
                .position(|header| header == *name)
                .ok_or_else(|| {
                    TableError::Invalid(format!("{}: missing column {name:?}", path.display()))
                })?;
        }

        let mut factors = [[1.0_f64; 7]; 24];
        let mut hour = 0usize;
        for record in reader.records() {
            let record = record?;
            if hour >= 24 {
                return Err(TableError::Invalid(format!(
                    "{}: more than 24 hour rows",
                    path.display()
                )));
            }
            for (day, &position) in day_positions.iter().enumerate() {
                let field = record.get(position).unwrap_or("").trim();
                factors[hour][day] = field.parse().map_err(|_| {
                    TableError::Invalid(format!(
                        "{}: bad factor {field:?} at hour {hour}",
                        path.display()
                    ))
                })?;
            }
            hour += 1;
        }
        if hour != 24 {
            return Err(TableError::Invalid(format!(
                "{}: expected 24 hour rows, found {hour}",
                path.display()
            )));
        }

        Ok(TrafficTable { factors })
    }

    /// Factor for an absolute timestamp.
    pub fn factor_at(&self, unix: i64) -> f64 {
        self.factors[hour_of_day(unix)][weekday(unix)]
    }

    pub fn factor(&self, hour: usize, day: usize) -> f64 {
        self.factors[hour][day]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::unix_from_civil;
    use std::io::Write;

    #[test]
    fn looks_up_hour_and_weekday() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "Monday,Tuesday,Wednesday,Thursday,Friday,Saturday,Sunday"
        )
        .expect("write");
        for hour in 0..24 {
            let row: Vec<String> = (0..7)
                .map(|day| format!("{:.2}", 1.0 + hour as f64 / 100.0 + day as f64 / 1000.0))
                .collect();
            writeln!(file, "{}", row.join(",")).expect("write");
        }

        let table = TrafficTable::load_from_file(file.path()).expect("load");
        // 2018-06-15 was a Friday (weekday 4).
        let ts = unix_from_civil(2018, 6, 15, 8, 15, 0);
        assert!((table.factor_at(ts) - (1.0 + 0.08 + 0.004)).abs() < 1e-9);
        assert_eq!(table.factor(0, 0), 1.0);
    }

    #[test]
    fn rejects_short_tables() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "Monday,Tuesday,Wednesday,Thursday,Friday,Saturday,Sunday"
        )
        .expect("write");
        writeln!(file, "1,1,1,1,1,1,1").expect("write");
        assert!(matches!(
            TrafficTable::load_from_file(file.path()),
            Err(TableError::Invalid(_))
        ));
    }

    #[test]
    fn uniform_table_is_flat() {
        let table = TrafficTable::uniform(1.5);
        assert_eq!(table.factor_at(0), 1.5);
        assert_eq!(table.factor_at(1_700_000_000), 1.5);
    }
}
