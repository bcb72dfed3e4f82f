//! Ambulance allocator: materializes the roster for a shift from an
//! allocation matrix and rebalances it at segment boundaries.

use bevy_ecs::prelude::Resource;

use crate::ecs::Ambulance;
use crate::scenario::ShiftWindow;
use crate::tables::Stations;

/// The time-segmented allocation being simulated, plus the mapping from
/// matrix columns to stations-table rows.
#[derive(Debug, Clone, Resource)]
pub struct AllocationPlan {
    pub rows: Vec<Vec<usize>>,
    /// Stations-row index per matrix column.
    pub depot_indices: Vec<usize>,
}

impl AllocationPlan {
    pub fn new(rows: Vec<Vec<usize>>, depot_indices: Vec<usize>) -> Self {
        AllocationPlan {
            rows,
            depot_indices,
        }
    }

    pub fn row_for_segment(&self, segment: usize) -> &[usize] {
        &self.rows[segment.min(self.rows.len() - 1)]
    }

    fn column_of(&self, station_index: usize) -> Option<usize> {
        self.depot_indices
            .iter()
            .position(|&depot| depot == station_index)
    }
}

/// Build the roster for the first segment row. Each ambulance starts at its
/// depot's grid; with `schedule_breaks`, two staggered 30-minute breaks are
/// laid inside the shift.
pub fn build_roster(
    stations: &Stations,
    plan: &AllocationPlan,
    shift: &ShiftWindow,
    schedule_breaks: bool,
) -> Vec<Ambulance> {
    let row = plan.row_for_segment(0);
    let mut roster = Vec::with_capacity(row.iter().sum());
    let mut next_id = 0u32;
    for (column, &count) in row.iter().enumerate() {
        let station_index = plan.depot_indices[column];
        let depot_grid = stations.grid_id(station_index);
        for number in 0..count {
            let mut ambulance = Ambulance::new(next_id, station_index, depot_grid);
            next_id += 1;
            if schedule_breaks {
                ambulance.schedule_breaks(shift.start, shift.end, count, number);
            }
            roster.push(ambulance);
        }
    }
    roster
}

/// Rebalance the live roster toward the target row: every surplus vehicle's
/// depot assignment moves to a deficit depot. Vehicles are never teleported;
/// each follows at the end of its current run. `depots` is the per-ambulance
/// allocated station row, in stable roster order; the changed entries are the
/// result.
pub fn rebalance(plan: &AllocationPlan, segment: usize, depots: &mut [usize]) -> usize {
    let target = plan.row_for_segment(segment);
    let columns = plan.depot_indices.len();
    let mut counts = vec![0usize; columns];
    for &station_index in depots.iter() {
        if let Some(column) = plan.column_of(station_index) {
            counts[column] += 1;
        }
    }

    let mut moved = 0;
    for station_index in depots.iter_mut() {
        let Some(column) = plan.column_of(*station_index) else {
            continue;
        };
        if counts[column] <= target[column] {
            continue;
        }
        let Some(deficit) = (0..columns).find(|&candidate| counts[candidate] < target[candidate])
        else {
            break;
        };
        counts[column] -= 1;
        counts[deficit] += 1;
        *station_index = plan.depot_indices[deficit];
        moved += 1;
    }
    moved
}
