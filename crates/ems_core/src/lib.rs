//! # Emergency Response Simulation Core
//!
//! A discrete-event simulator for emergency ambulance response, built to
//! evaluate fleet allocations across depots.
//!
//! ## Overview
//!
//! - **Event scheduling**: wall-clock timeline of wake-ups with FIFO ties
//! - **ECS framework**: incidents and ambulances as entities, tables and
//!   policies as resources
//! - **Travel model**: OD-matrix lookup with traffic, triage, and noise
//!   adjustments
//! - **Dispatch strategies**: random and closest-vehicle selection, with
//!   triage preemption and mid-trip reassignment
//! - **Metrics**: per-incident lifecycle durations, bucketed response-time
//!   averages and threshold-violation rates
//!
//! ## Key concepts
//!
//! - **Incident lifecycle**: every incident walks the same phase chain from
//!   assignment to closure; the simulation ends when the timeline drains
//! - **Deterministic**: all randomness flows from seeded RNG streams
//! - **Per-run worlds**: one `World` per simulation, cheap to rebuild, so
//!   optimizer evaluations parallelize without shared mutable state
//!
//! ## Example
//!
//! ```rust,no_run
//! use bevy_ecs::prelude::World;
//! use ems_core::allocator::AllocationPlan;
//! use ems_core::runner::{run_until_empty, simulation_schedule};
//! use ems_core::scenario::{build_simulation, SimulationOptions};
//! use ems_core::config::SimConfig;
//! use ems_core::tables::{SharedTables, Tables};
//! use std::path::Path;
//!
//! let config = SimConfig::default();
//! let tables = SharedTables::new(Tables::load_from_dir(Path::new("data")).unwrap());
//! let options = SimulationOptions::from_config(&config);
//! let records = ems_core::synth::synthesize_events(
//!     &tables,
//!     &ems_core::synth::SynthesisParams::from_config(&config),
//! );
//! let depots = tables.stations.depot_indices(true, -1);
//! let plan = AllocationPlan::new(vec![vec![1; depots.len()]], depots);
//!
//! let mut world = World::new();
//! build_simulation(&mut world, tables, &records, plan, &options);
//! let mut schedule = simulation_schedule();
//! run_until_empty(&mut world, &mut schedule, 1_000_000);
//! ```

pub mod allocator;
pub mod clock;
pub mod config;
pub mod dispatch;
pub mod ecs;
pub mod export;
pub mod grid;
pub mod metrics;
pub mod runner;
pub mod scenario;
pub mod synth;
pub mod systems;
pub mod tables;
pub mod time;
pub mod travel;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;
