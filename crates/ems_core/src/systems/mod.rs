//! Per-wake-up systems driving the incident lifecycle.
//!
//! Each system reacts to exactly one [`crate::clock::EventKind`]; the runner
//! gates them with `run_if` conditions. A system first checks that the
//! subject incident is still in the phase the wake-up was scheduled for --
//! wake-ups left behind by a preempted incident are tombstones and fall
//! through silently.

pub mod assigning_ambulance;
pub mod dispatching_to_depot;
pub mod dispatching_to_hospital;
pub mod dispatching_to_scene;
pub mod finishing;
pub mod preparing_dispatch_to_depot;
pub mod reallocating;

pub use assigning_ambulance::assigning_ambulance_system;
pub use dispatching_to_depot::dispatching_to_depot_system;
pub use dispatching_to_hospital::dispatching_to_hospital_system;
pub use dispatching_to_scene::dispatching_to_scene_system;
pub use finishing::finishing_system;
pub use preparing_dispatch_to_depot::preparing_dispatch_to_depot_system;
pub use reallocating::reallocating_system;
