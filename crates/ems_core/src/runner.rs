//! Simulation runner: advances the clock and routes wake-ups into the ECS.
//!
//! Clock progression happens here, outside systems. Each step pops the next
//! wake-up from [`SimulationClock`], inserts it as [`CurrentEvent`], then
//! runs the schedule; the matching system reacts, everything else is gated
//! off by its `run_if` condition.

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::systems::{
    assigning_ambulance_system, dispatching_to_depot_system, dispatching_to_hospital_system,
    dispatching_to_scene_system, finishing_system, preparing_dispatch_to_depot_system,
    reallocating_system,
};

fn is_assigning_ambulance(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::AssigningAmbulance)
        .unwrap_or(false)
}

fn is_dispatching_to_scene(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::DispatchingToScene)
        .unwrap_or(false)
}

fn is_dispatching_to_hospital(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::DispatchingToHospital)
        .unwrap_or(false)
}

fn is_preparing_dispatch_to_depot(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::PreparingDispatchToDepot)
        .unwrap_or(false)
}

fn is_dispatching_to_depot(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::DispatchingToDepot)
        .unwrap_or(false)
}

fn is_finishing(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::Finishing)
        .unwrap_or(false)
}

fn is_reallocating(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::Reallocating)
        .unwrap_or(false)
}

/// Runs one simulation step: pops the next wake-up, inserts it as
/// [`CurrentEvent`], then runs the schedule. Returns `true` if a wake-up was
/// processed.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(event) => event,
        None => return false,
    };
    world.insert_resource(CurrentEvent(event));
    schedule.run(world);
    true
}

/// Runs steps until the timeline is drained or `max_steps` is reached.
/// Returns the number of steps executed.
pub fn run_until_empty(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Builds the simulation schedule: every lifecycle system, each gated on its
/// wake-up kind.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((
        assigning_ambulance_system.run_if(is_assigning_ambulance),
        dispatching_to_scene_system.run_if(is_dispatching_to_scene),
        dispatching_to_hospital_system.run_if(is_dispatching_to_hospital),
        preparing_dispatch_to_depot_system.run_if(is_preparing_dispatch_to_depot),
        dispatching_to_depot_system.run_if(is_dispatching_to_depot),
        finishing_system.run_if(is_finishing),
        reallocating_system.run_if(is_reallocating),
    ));
    schedule
}
