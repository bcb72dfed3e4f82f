//! Scenario synthesis: sample a shift's worth of incidents from the
//! historical table.
//!
//! Rows inside a day-of-year window around the scenario date are weighted
//! with a Gaussian falloff; the weighted rows drive an hourly arrival
//! histogram and serve as the resampling pool for locations, triage, and
//! service durations. Reallocation ticks are appended at segment starts.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{SimConfig, UrbanMethod};
use crate::scenario::{IncidentRecord, ShiftWindow};
use crate::tables::{IncidentRow, Tables};
use crate::time::{day_of_year, hour_of_day, unix_day_of_year};

/// Gaussian falloff width for day-distance weights, in days.
const DAY_WEIGHT_SIGMA: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct SynthesisParams {
    pub year: i64,
    pub month: u32,
    pub day: u32,
    pub day_shift: bool,
    pub window_days: u32,
    pub shift: ShiftWindow,
    pub urban_method: UrbanMethod,
    pub seed: u64,
}

impl SynthesisParams {
    pub fn from_config(config: &SimConfig) -> Self {
        SynthesisParams {
            year: config.simulate_year,
            month: config.simulate_month,
            day: config.simulate_day,
            day_shift: config.simulate_day_shift,
            window_days: config.simulation_generation_window_size,
            shift: ShiftWindow::from_config(config),
            urban_method: config.urban_method,
            seed: config.seed,
        }
    }
}

/// Gaussian weights per day distance, normalized so distance 0 weighs 1.
fn day_weights(window_days: u32) -> Vec<f64> {
    (0..=window_days as i64)
        .map(|distance| {
            (-((distance * distance) as f64) / (2.0 * DAY_WEIGHT_SIGMA * DAY_WEIGHT_SIGMA)).exp()
        })
        .collect()
}

/// Day-of-year distance ignoring years, wrapping around new year.
fn doy_distance(a: i64, b: i64) -> i64 {
    let diff = (a - b).abs();
    diff.min(366 - diff)
}

struct WeightedRow<'a> {
    row: &'a IncidentRow,
    weight: f64,
}

/// Sample one synthetic shift. Returns records sorted by call time, with
/// utility reallocation ticks at segment boundaries.
pub fn synthesize_events(tables: &Tables, params: &SynthesisParams) -> Vec<IncidentRecord> {
    let mut rng = StdRng::seed_from_u64(params.seed ^ 0x6576_656e_745f_6d63);
    let weights = day_weights(params.window_days);
    let target_doy = day_of_year(params.year, params.month, params.day);

    // Weight the historical pool by day-of-year distance from the scenario
    // date.
    let mut pool: Vec<WeightedRow<'_>> = Vec::new();
    let mut weight_by_day: std::collections::HashMap<i64, f64> = std::collections::HashMap::new();
    let mut count_by_day: std::collections::HashMap<i64, f64> = std::collections::HashMap::new();
    for row in tables.incidents.rows() {
        let day_number = row.call_received.div_euclid(86_400);
        let distance = doy_distance(unix_day_of_year(row.call_received), target_doy);
        if distance > params.window_days as i64 {
            continue;
        }
        let weight = weights[distance as usize];
        weight_by_day.insert(day_number, weight);
        if !in_shift_hours(row.call_received, params) {
            // Out-of-shift rows keep their day in the volume estimate but are
            // not resampled.
            count_by_day.entry(day_number).or_insert(0.0);
            continue;
        }
        *count_by_day.entry(day_number).or_insert(0.0) += 1.0;
        pool.push(WeightedRow { row, weight });
    }

    let mut records: Vec<IncidentRecord> = Vec::new();
    if !pool.is_empty() {
        // Expected shift volume: weighted mean of per-day in-shift counts.
        let total_weight: f64 = weight_by_day.values().sum();
        let weighted_count: f64 = count_by_day
            .iter()
            .map(|(day, count)| count * weight_by_day.get(day).copied().unwrap_or(0.0))
            .sum();
        let expected = if total_weight > 0.0 {
            (weighted_count / total_weight).round() as usize
        } else {
            0
        };

        // Hourly arrival histogram over the weighted in-shift pool.
        let mut hour_mass = [0.0_f64; 24];
        for entry in &pool {
            hour_mass[hour_of_day(entry.row.call_received)] += entry.weight;
        }
        let cumulative: Vec<f64> = hour_mass
            .iter()
            .scan(0.0, |acc, mass| {
                *acc += mass;
                Some(*acc)
            })
            .collect();
        let total_mass = *cumulative.last().unwrap_or(&0.0);

        let pool_cumulative: Vec<f64> = pool
            .iter()
            .scan(0.0, |acc, entry| {
                *acc += entry.weight;
                Some(*acc)
            })
            .collect();
        let pool_mass = *pool_cumulative.last().unwrap_or(&0.0);

        for _ in 0..expected {
            if total_mass <= 0.0 || pool_mass <= 0.0 {
                break;
            }
            // Arrival time: weighted hour, uniform minute and second.
            let draw: f64 = rng.gen_range(0.0..total_mass);
            let hour = cumulative.partition_point(|&mass| mass <= draw).min(23);
            let call_received = timestamp_in_shift(params, hour, &mut rng);

            // Attributes: weighted resample of one historical row.
            let draw: f64 = rng.gen_range(0.0..pool_mass);
            let index = pool_cumulative
                .partition_point(|&mass| mass <= draw)
                .min(pool.len() - 1);
            let source = pool[index].row;

            records.push(IncidentRecord {
                call_received,
                incident_grid: source.grid_id,
                triage: source.triage,
                urban: match params.urban_method {
                    UrbanMethod::UrbanSettlement => source.urban_settlement,
                    UrbanMethod::UrbanSettlementSsb => source.urban_settlement_ssb,
                },
                wait_call_answered: source.wait_call_answered,
                wait_appointing_resource: source.wait_appointing_resource,
                wait_prepare_departure: source.wait_prepare_departure,
                wait_departure_scene: source.wait_departure_scene,
                wait_available: source.wait_available,
                utility: false,
            });
        }
    }

    for boundary in params.shift.segment_boundaries() {
        records.push(IncidentRecord::reallocation_tick(boundary));
    }

    records.sort_by_key(|record| (record.call_received, record.utility));
    records
}

fn in_shift_hours(unix: i64, params: &SynthesisParams) -> bool {
    let shift = &params.shift;
    let hour = hour_of_day(unix) as i64;
    let start_hour = hour_of_day(shift.start) as i64;
    let end_hour = hour_of_day(shift.end) as i64;
    if params.day_shift {
        hour >= start_hour && hour < end_hour
    } else {
        hour >= start_hour || hour < end_hour
    }
}

fn timestamp_in_shift(params: &SynthesisParams, hour: usize, rng: &mut StdRng) -> i64 {
    let shift = &params.shift;
    let start_hour = hour_of_day(shift.start) as i64;
    let hour = hour as i64;
    let offset_hours = if params.day_shift || hour >= start_hour {
        hour - start_hour
    } else {
        // Night shift hours past midnight.
        24 - start_hour + hour
    };
    let offset_hours = offset_hours.clamp(0, shift.length() / 3600 - 1);
    shift.start + offset_hours * 3600 + rng.gen_range(0..3600)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::ecs::Triage;
    use crate::grid::GridId;
    use crate::tables::{IncidentHistory, OdMatrix, Stations, TrafficTable};
    use crate::time::unix_from_civil;

    fn history_rows() -> Vec<IncidentRow> {
        let mut rows = Vec::new();
        for day in 8..=12 {
            for hour in [9, 10, 14] {
                rows.push(IncidentRow {
                    triage: if hour == 9 { Triage::Acute } else { Triage::Urgent },
                    call_received: unix_from_civil(2017, 9, day, hour, 15, 0),
                    grid_id: GridId(1000 + day as i64),
                    urban_settlement: true,
                    urban_settlement_ssb: false,
                    wait_call_answered: 20,
                    wait_appointing_resource: 60,
                    wait_prepare_departure: 90,
                    wait_departure_scene: Some(600),
                    wait_available: Some(900),
                });
            }
            // One overnight incident outside the day shift.
            rows.push(IncidentRow {
                triage: Triage::Scheduled,
                call_received: unix_from_civil(2017, 9, day, 2, 0, 0),
                grid_id: GridId(2000),
                urban_settlement: false,
                urban_settlement_ssb: false,
                wait_call_answered: 10,
                wait_appointing_resource: 30,
                wait_prepare_departure: 60,
                wait_departure_scene: None,
                wait_available: Some(300),
            });
        }
        rows
    }

    fn tables() -> Tables {
        Tables {
            od: OdMatrix::default(),
            stations: Stations::default(),
            traffic: TrafficTable::uniform(1.0),
            incidents: IncidentHistory::from_rows(history_rows()),
        }
    }

    fn params() -> SynthesisParams {
        let mut config = SimConfig::default();
        config.simulate_year = 2018;
        config.simulate_month = 9;
        config.simulate_day = 10;
        config.num_time_segments = 3;
        config.seed = 11;
        SynthesisParams::from_config(&config)
    }

    #[test]
    fn generates_in_shift_incidents_and_ticks() {
        let tables = tables();
        let params = params();
        let records = synthesize_events(&tables, &params);

        let ticks: Vec<_> = records.iter().filter(|record| record.utility).collect();
        assert_eq!(ticks.len(), 2);

        let incidents: Vec<_> = records.iter().filter(|record| !record.utility).collect();
        assert!(!incidents.is_empty());
        for record in &incidents {
            assert!(record.call_received >= params.shift.start);
            assert!(record.call_received < params.shift.end);
            // Attributes resampled from the in-shift pool only.
            assert_ne!(record.triage, Triage::Scheduled);
            assert!(record.urban);
        }

        // Sorted by call time.
        let mut sorted = records.clone();
        sorted.sort_by_key(|record| (record.call_received, record.utility));
        assert_eq!(
            records.iter().map(|r| r.call_received).collect::<Vec<_>>(),
            sorted.iter().map(|r| r.call_received).collect::<Vec<_>>()
        );
    }

    #[test]
    fn same_seed_is_reproducible() {
        let tables = tables();
        let params = params();
        let first = synthesize_events(&tables, &params);
        let second = synthesize_events(&tables, &params);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.call_received, b.call_received);
            assert_eq!(a.incident_grid, b.incident_grid);
        }
    }

    #[test]
    fn empty_history_yields_only_ticks() {
        let tables = Tables {
            od: OdMatrix::default(),
            stations: Stations::default(),
            traffic: TrafficTable::uniform(1.0),
            incidents: IncidentHistory::default(),
        };
        let records = synthesize_events(&tables, &params());
        assert!(records.iter().all(|record| record.utility));
    }
}
