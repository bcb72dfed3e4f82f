//! Dispatch selection: which ambulance serves an incident, which hospital
//! receives the patient.
//!
//! The strategy is a tagged enum fixed once per run; the per-wake-up systems
//! `match` on it. Candidate collection (availability, break side effects,
//! mid-trip location approximation) happens in the assigning system; the
//! functions here rank the collected candidates.

use bevy_ecs::prelude::{Entity, Resource};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::DispatchStrategyKind;
use crate::ecs::Triage;
use crate::grid::GridId;
use crate::tables::Tables;
use crate::travel::{TravelModel, MISSING_PAIR_SECS};

/// RNG stream for dispatch decisions (random strategy picks).
#[derive(Debug, Resource)]
pub struct DispatchRng(pub StdRng);

impl DispatchRng {
    pub fn seed_from(seed: u64) -> Self {
        DispatchRng(StdRng::seed_from_u64(seed ^ 0xd15b_a7c4_0ffe_e75a))
    }
}

/// An ambulance eligible to take the incident.
#[derive(Debug, Clone, Copy)]
pub struct DispatchCandidate {
    pub ambulance: Entity,
    /// Where the vehicle effectively is right now (its cell, or the
    /// interpolated cell when mid-trip).
    pub location: GridId,
    /// Incident the ambulance is currently serving, to be closed out on
    /// reassignment.
    pub serving: Option<Entity>,
}

/// Pick a candidate according to the strategy. `Closest` keeps the first
/// candidate in roster order on travel-time ties.
pub fn choose_ambulance(
    kind: DispatchStrategyKind,
    rng: &mut StdRng,
    travel: &TravelModel,
    tables: &Tables,
    candidates: &[DispatchCandidate],
    incident_grid: GridId,
    triage: Triage,
    now: i64,
) -> Option<DispatchCandidate> {
    if candidates.is_empty() {
        return None;
    }
    match kind {
        DispatchStrategyKind::Random => {
            let index = rng.gen_range(0..candidates.len());
            Some(candidates[index])
        }
        DispatchStrategyKind::Closest => {
            let mut best: Option<(i64, DispatchCandidate)> = None;
            for candidate in candidates {
                let seconds = travel
                    .estimate(tables, candidate.location, incident_grid, false, triage, now)
                    .unwrap_or(MISSING_PAIR_SECS as i64);
                let better = match best {
                    Some((best_seconds, _)) => seconds < best_seconds,
                    None => true,
                };
                if better {
                    best = Some((seconds, *candidate));
                }
            }
            best.map(|(_, candidate)| candidate)
        }
    }
}

/// Pick the hospital for a transport leaving `scene`. Returns a stations-row
/// index.
pub fn choose_hospital(
    kind: DispatchStrategyKind,
    rng: &mut StdRng,
    travel: &TravelModel,
    tables: &Tables,
    scene: GridId,
    triage: Triage,
    now: i64,
) -> Option<usize> {
    let hospitals = tables.stations.hospital_indices();
    if hospitals.is_empty() {
        return None;
    }
    match kind {
        DispatchStrategyKind::Random => {
            let index = rng.gen_range(0..hospitals.len());
            Some(hospitals[index])
        }
        DispatchStrategyKind::Closest => {
            let mut best: Option<(i64, usize)> = None;
            for &hospital in &hospitals {
                let grid = tables.stations.grid_id(hospital);
                let seconds = travel
                    .estimate(tables, grid, scene, false, triage, now)
                    .unwrap_or(MISSING_PAIR_SECS as i64);
                let better = match best {
                    Some((best_seconds, _)) => seconds < best_seconds,
                    None => true,
                };
                if better {
                    best = Some((seconds, hospital));
                }
            }
            best.map(|(_, hospital)| hospital)
        }
    }
}

/// Response-restriction rule: when enabled, a depot may only serve incidents
/// of its own urbanity class.
pub fn depot_may_serve(restricted: bool, depot_urban: bool, incident_urban: bool) -> bool {
    !restricted || depot_urban == incident_urban
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{IncidentHistory, OdMatrix, Stations, TrafficTable};
    use crate::tables::stations::{Station, StationKind};

    fn station(name: &str, kind: StationKind, grid: i64, urban: bool) -> Station {
        Station {
            name: name.to_string(),
            kind,
            grid_id: GridId(grid),
            longitude: 0.0,
            latitude: 0.0,
            region: String::new(),
            urban,
            total_population_radius_2km: 0.0,
            total_population_radius_5km: 0.0,
            total_population_cluster: 0.0,
            total_incidents_radius_2km: 0.0,
            total_incidents_radius_5km: 0.0,
            total_incidents_cluster: 0.0,
        }
    }

    fn tables() -> Tables {
        let ids = [GridId(1), GridId(2), GridId(3), GridId(10)];
        let od = OdMatrix::from_entries(
            &ids,
            &[
                (GridId(1), GridId(10), 500.0),
                (GridId(2), GridId(10), 200.0),
                (GridId(3), GridId(10), 200.0),
                (GridId(2), GridId(1), 100.0),
                (GridId(3), GridId(1), 400.0),
            ],
        );
        Tables {
            od,
            stations: Stations::from_rows(vec![
                station("Depot A", StationKind::Depot, 1, true),
                station("Hospital East", StationKind::Hospital, 2, true),
                station("Hospital West", StationKind::Hospital, 3, true),
            ]),
            traffic: TrafficTable::uniform(1.0),
            incidents: IncidentHistory::default(),
        }
    }

    fn candidate(raw: u32, grid: i64) -> DispatchCandidate {
        DispatchCandidate {
            ambulance: Entity::from_raw(raw),
            location: GridId(grid),
            serving: None,
        }
    }

    #[test]
    fn closest_prefers_shorter_travel() {
        let tables = tables();
        let travel = TravelModel::new(1);
        let mut rng = StdRng::seed_from_u64(1);
        let candidates = [candidate(1, 1), candidate(2, 2)];
        let chosen = choose_ambulance(
            DispatchStrategyKind::Closest,
            &mut rng,
            &travel,
            &tables,
            &candidates,
            GridId(10),
            Triage::Urgent,
            0,
        )
        .expect("candidate");
        assert_eq!(chosen.ambulance, Entity::from_raw(2));
    }

    #[test]
    fn closest_tie_keeps_first_in_roster_order() {
        let tables = tables();
        let travel = TravelModel::new(1);
        let mut rng = StdRng::seed_from_u64(1);
        let candidates = [candidate(7, 2), candidate(8, 3)];
        let chosen = choose_ambulance(
            DispatchStrategyKind::Closest,
            &mut rng,
            &travel,
            &tables,
            &candidates,
            GridId(10),
            Triage::Urgent,
            0,
        )
        .expect("candidate");
        assert_eq!(chosen.ambulance, Entity::from_raw(7));
    }

    #[test]
    fn closest_hospital_measured_from_hospital_to_scene() {
        let tables = tables();
        let travel = TravelModel::new(1);
        let mut rng = StdRng::seed_from_u64(1);
        let chosen = choose_hospital(
            DispatchStrategyKind::Closest,
            &mut rng,
            &travel,
            &tables,
            GridId(1),
            Triage::Urgent,
            0,
        )
        .expect("hospital");
        // Hospital East (row 1) is 100 s from the scene, West is 400 s.
        assert_eq!(chosen, 1);
    }

    #[test]
    fn random_pick_is_deterministic_per_seed() {
        let tables = tables();
        let travel = TravelModel::new(1);
        let candidates = [candidate(1, 1), candidate(2, 2), candidate(3, 3)];
        let mut first = StdRng::seed_from_u64(9);
        let mut second = StdRng::seed_from_u64(9);
        for _ in 0..8 {
            let a = choose_ambulance(
                DispatchStrategyKind::Random,
                &mut first,
                &travel,
                &tables,
                &candidates,
                GridId(10),
                Triage::Acute,
                0,
            )
            .expect("candidate");
            let b = choose_ambulance(
                DispatchStrategyKind::Random,
                &mut second,
                &travel,
                &tables,
                &candidates,
                GridId(10),
                Triage::Acute,
                0,
            )
            .expect("candidate");
            assert_eq!(a.ambulance, b.ambulance);
        }
    }

    #[test]
    fn restriction_rule() {
        assert!(depot_may_serve(false, true, false));
        assert!(depot_may_serve(true, true, true));
        assert!(!depot_may_serve(true, true, false));
        assert!(depot_may_serve(true, false, false));
    }
}
