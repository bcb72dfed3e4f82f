//! # Ambulance Fleet Allocation Optimizer
//!
//! Evolutionary optimization of time-segmented ambulance allocations,
//! evaluated with the `ems_core` discrete-event simulator.
//!
//! Four heuristics share one engine:
//!
//! - **GA**: weighted-sum fitness, elitist truncation survival
//! - **NSGA-II**: non-dominated fronts with crowding distance
//! - **MA**: GA plus first-improvement local search on offspring
//! - **Memetic NSGA-II**: NSGA-II plus the same local search
//!
//! Every candidate is a segments x depots allocation matrix whose rows sum
//! to the fleet size; each evaluation replays the same synthesized scenario
//! in its own world, so generations parallelize cleanly.

pub mod genotype;
pub mod individual;
pub mod objectives;
pub mod population;
pub mod runner;
pub mod trace;
