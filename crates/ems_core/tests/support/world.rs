//! Builder for reproducible simulation worlds over tiny hand-made tables.

use bevy_ecs::prelude::World;
use ems_core::allocator::AllocationPlan;
use ems_core::config::DispatchStrategyKind;
use ems_core::grid::GridId;
use ems_core::scenario::{
    build_simulation, DispatchPolicy, IncidentRecord, ShiftWindow, SimulationOptions,
};
use ems_core::tables::stations::StationKind;
use ems_core::tables::SharedTables;
use ems_core::test_helpers::{test_station, test_tables};

/// Three cells 10 km apart on one east-west line, so mid-trip interpolation
/// lands on real kilometre cells.
pub fn cell_west() -> GridId {
    GridId::from_utm(100_000, 200_000)
}

pub fn cell_mid() -> GridId {
    GridId::from_utm(110_000, 200_000)
}

pub fn cell_east() -> GridId {
    GridId::from_utm(120_000, 200_000)
}

pub struct TestWorldBuilder {
    pub seed: u64,
    pub strategy: DispatchStrategyKind,
    pub prioritize_triage: bool,
    pub response_restricted: bool,
    pub schedule_breaks: bool,
    pub shift: ShiftWindow,
    pub stations: Vec<(String, StationKind, GridId, bool)>,
    pub od_entries: Vec<(GridId, GridId, f32)>,
    pub plan_rows: Vec<Vec<usize>>,
    pub records: Vec<IncidentRecord>,
    /// Pin travel noise to exactly 1.0 so timings are integral and exact.
    pub exact_travel: bool,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self {
            seed: 42,
            strategy: DispatchStrategyKind::Random,
            prioritize_triage: false,
            response_restricted: false,
            schedule_breaks: false,
            shift: ShiftWindow {
                start: 0,
                end: 12 * 3600,
                segments: 1,
            },
            stations: Vec::new(),
            od_entries: Vec::new(),
            plan_rows: Vec::new(),
            records: Vec::new(),
            exact_travel: true,
        }
    }
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_strategy(mut self, strategy: DispatchStrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn prioritize_triage(mut self, enabled: bool) -> Self {
        self.prioritize_triage = enabled;
        self
    }

    pub fn schedule_breaks(mut self, enabled: bool) -> Self {
        self.schedule_breaks = enabled;
        self
    }

    pub fn with_shift(mut self, shift: ShiftWindow) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_depot(mut self, name: &str, grid: GridId) -> Self {
        self.stations
            .push((name.to_string(), StationKind::Depot, grid, true));
        self
    }

    pub fn with_hospital(mut self, name: &str, grid: GridId) -> Self {
        self.stations
            .push((name.to_string(), StationKind::Hospital, grid, true));
        self
    }

    pub fn with_od(mut self, from: GridId, to: GridId, seconds: f32) -> Self {
        self.od_entries.push((from, to, seconds));
        self
    }

    /// Symmetric OD entry.
    pub fn with_link(self, a: GridId, b: GridId, seconds: f32) -> Self {
        self.with_od(a, b, seconds).with_od(b, a, seconds)
    }

    pub fn with_plan(mut self, rows: Vec<Vec<usize>>) -> Self {
        self.plan_rows = rows;
        self
    }

    pub fn with_record(mut self, record: IncidentRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn tables(&self) -> SharedTables {
        let stations = self
            .stations
            .iter()
            .map(|(name, kind, grid, urban)| test_station(name, *kind, *grid, *urban))
            .collect();
        test_tables(stations, &self.od_entries)
    }

    pub fn build(self) -> World {
        let tables = self.tables();
        let depot_indices: Vec<usize> = self
            .stations
            .iter()
            .enumerate()
            .filter(|(_, (_, kind, _, _))| *kind != StationKind::Hospital)
            .map(|(index, _)| index)
            .collect();
        let plan = AllocationPlan::new(self.plan_rows.clone(), depot_indices);

        let options = SimulationOptions {
            policy: DispatchPolicy {
                kind: self.strategy,
                prioritize_triage: self.prioritize_triage,
                response_restricted: self.response_restricted,
            },
            shift: self.shift,
            schedule_breaks: self.schedule_breaks,
            acute_travel_factor: 1.0,
            travel_noise_clamp: if self.exact_travel {
                Some((1.0, 1.0))
            } else {
                None
            },
            seed: self.seed,
        };

        let mut world = World::new();
        build_simulation(&mut world, tables, &self.records, plan, &options);
        world
    }
}
