//! Reallocation tick: rebalance depot assignments toward the allocation row
//! of the segment that just began. Vehicles follow their new depot at the
//! end of their current run.

use bevy_ecs::prelude::{Entity, Query, Res};

use crate::allocator::{rebalance, AllocationPlan};
use crate::clock::SimulationClock;
use crate::ecs::Ambulance;
use crate::scenario::ShiftWindow;

pub fn reallocating_system(
    clock: Res<SimulationClock>,
    plan: Res<AllocationPlan>,
    shift: Res<ShiftWindow>,
    mut ambulances: Query<(Entity, &mut Ambulance)>,
) {
    let segment = shift.allocation_index(clock.now());

    // Stable roster order so rebalancing is deterministic.
    let mut roster: Vec<(u32, Entity)> = ambulances
        .iter()
        .map(|(entity, ambulance)| (ambulance.id, entity))
        .collect();
    roster.sort_unstable_by_key(|(id, _)| *id);

    let mut depots: Vec<usize> = roster
        .iter()
        .map(|(_, entity)| {
            ambulances
                .get(*entity)
                .map(|(_, ambulance)| ambulance.allocated_depot)
                .unwrap_or(0)
        })
        .collect();

    if rebalance(&plan, segment, &mut depots) == 0 {
        return;
    }

    for ((_, entity), depot) in roster.iter().zip(depots) {
        if let Ok((_, mut ambulance)) = ambulances.get_mut(*entity) {
            ambulance.allocated_depot = depot;
        }
    }
}
