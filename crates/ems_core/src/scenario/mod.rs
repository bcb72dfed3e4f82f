//! Scenario assembly: turn tables + generated incident records + an
//! allocation into a ready-to-run simulation world.

mod build;

pub use build::build_simulation;

use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::config::{DispatchStrategyKind, SimConfig};
use crate::ecs::Triage;
use crate::grid::GridId;
use crate::time::unix_from_civil;

/// One generated incident, the input contract of the simulator. Records with
/// `utility` set carry only `call_received` and fire a reallocation tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentRecord {
    pub call_received: i64,
    pub incident_grid: GridId,
    pub triage: Triage,
    pub urban: bool,
    pub wait_call_answered: i64,
    pub wait_appointing_resource: i64,
    pub wait_prepare_departure: i64,
    /// `None` when the patient is not transported (cancelled on scene).
    pub wait_departure_scene: Option<i64>,
    pub wait_available: Option<i64>,
    pub utility: bool,
}

impl IncidentRecord {
    pub fn reallocation_tick(at: i64) -> Self {
        IncidentRecord {
            call_received: at,
            incident_grid: GridId(0),
            triage: Triage::Scheduled,
            urban: false,
            wait_call_answered: 0,
            wait_appointing_resource: 0,
            wait_prepare_departure: 0,
            wait_departure_scene: None,
            wait_available: None,
            utility: true,
        }
    }
}

/// The simulated shift: absolute window plus the number of allocation
/// segments it is divided into.
#[derive(Debug, Clone, Copy, Resource, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub start: i64,
    pub end: i64,
    pub segments: usize,
}

impl ShiftWindow {
    /// Day shift covers `[start_hour, end_hour)` of the scenario date; the
    /// night shift covers the complement, ending the next morning.
    pub fn for_date(
        year: i64,
        month: u32,
        day: u32,
        day_shift: bool,
        start_hour: u32,
        end_hour: u32,
        segments: usize,
    ) -> Self {
        let midnight = unix_from_civil(year, month, day, 0, 0, 0);
        let (start, end) = if day_shift {
            (
                midnight + start_hour as i64 * 3600,
                midnight + end_hour as i64 * 3600,
            )
        } else {
            (
                midnight + end_hour as i64 * 3600,
                midnight + 86_400 + start_hour as i64 * 3600,
            )
        };
        ShiftWindow {
            start,
            end,
            segments: segments.max(1),
        }
    }

    pub fn from_config(config: &SimConfig) -> Self {
        Self::for_date(
            config.simulate_year,
            config.simulate_month,
            config.simulate_day,
            config.simulate_day_shift,
            config.day_shift_start,
            config.day_shift_end,
            config.num_time_segments,
        )
    }

    pub fn length(&self) -> i64 {
        self.end - self.start
    }

    /// Allocation row active at an absolute time, clamped to the shift.
    pub fn allocation_index(&self, at: i64) -> usize {
        let segment_length = (self.length() / self.segments as i64).max(1);
        let raw = (at - self.start).div_euclid(segment_length);
        raw.clamp(0, self.segments as i64 - 1) as usize
    }

    /// Timestamps at which the allocation switches rows (segment starts,
    /// excluding the first).
    pub fn segment_boundaries(&self) -> Vec<i64> {
        let segment_length = (self.length() / self.segments as i64).max(1);
        (1..self.segments as i64)
            .map(|segment| self.start + segment * segment_length)
            .collect()
    }
}

/// Dispatch policy, fixed for the whole run.
#[derive(Debug, Clone, Copy, Resource)]
pub struct DispatchPolicy {
    pub kind: DispatchStrategyKind,
    pub prioritize_triage: bool,
    pub response_restricted: bool,
}

/// Everything needed to build one simulation besides tables, events and the
/// genotype.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub policy: DispatchPolicy,
    pub shift: ShiftWindow,
    pub schedule_breaks: bool,
    pub acute_travel_factor: f64,
    pub travel_noise_clamp: Option<(f64, f64)>,
    pub seed: u64,
}

impl SimulationOptions {
    pub fn from_config(config: &SimConfig) -> Self {
        SimulationOptions {
            policy: DispatchPolicy {
                kind: config.dispatch_strategy,
                prioritize_triage: config.dispatch_strategy_prioritize_triage,
                response_restricted: config.dispatch_strategy_response_restricted,
            },
            shift: ShiftWindow::from_config(config),
            schedule_breaks: config.schedule_breaks,
            acute_travel_factor: config.acute_travel_factor,
            travel_noise_clamp: if config.travel_noise_clamp {
                Some((0.95, 1.05))
            } else {
                None
            },
            seed: config.seed,
        }
    }

    /// Derive the options for one optimizer evaluation so parallel and
    /// sequential execution draw identical noise streams.
    pub fn with_evaluation_seed(mut self, generation: usize, index: usize) -> Self {
        self.seed = self
            .seed
            .wrapping_mul(0x9e37_79b9_7f4a_7c15)
            .wrapping_add((generation as u64) << 32)
            .wrapping_add(index as u64);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_shift_window_and_segments() {
        let shift = ShiftWindow::for_date(2018, 9, 10, true, 8, 20, 4);
        assert_eq!(shift.length(), 12 * 3600);
        assert_eq!(shift.allocation_index(shift.start), 0);
        assert_eq!(shift.allocation_index(shift.start + 3 * 3600 - 1), 0);
        assert_eq!(shift.allocation_index(shift.start + 3 * 3600), 1);
        assert_eq!(shift.allocation_index(shift.end + 100), 3);
        assert_eq!(shift.allocation_index(shift.start - 100), 0);
        assert_eq!(shift.segment_boundaries().len(), 3);
    }

    #[test]
    fn night_shift_spans_midnight() {
        let shift = ShiftWindow::for_date(2018, 9, 10, false, 8, 20, 2);
        assert_eq!(shift.length(), 12 * 3600);
        let boundaries = shift.segment_boundaries();
        assert_eq!(boundaries, vec![shift.start + 6 * 3600]);
    }
}
