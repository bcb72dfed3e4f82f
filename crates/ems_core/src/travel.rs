//! Travel-time model: deterministic OD lookup with traffic, triage, and noise
//! adjustments.
//!
//! The model owns the RNG used for multiplicative noise; everything else is a
//! pure function of the shared tables.

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::ecs::Triage;
use crate::grid::GridId;
use crate::tables::Tables;

/// Default factor applied to acute-triage runs (blue-light driving).
pub const DEFAULT_ACUTE_TRAVEL_FACTOR: f64 = 0.7953711902650347;

/// Substitute when a known cell pair has no measured travel time.
pub const MISSING_PAIR_SECS: f64 = 60.0;

/// Relative standard deviation of the multiplicative travel noise.
const NOISE_STD_DEV: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelTimeError {
    /// Origin or destination is not in the OD matrix.
    UnknownGrid,
}

impl std::fmt::Display for TravelTimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelTimeError::UnknownGrid => write!(f, "grid id missing from OD matrix"),
        }
    }
}

impl std::error::Error for TravelTimeError {}

/// Stateful travel-time oracle. The only state is the noise RNG.
#[derive(Debug, Resource)]
pub struct TravelModel {
    rng: StdRng,
    noise: Normal<f64>,
    acute_factor: f64,
    /// Optional clamp applied to the sampled noise factor.
    noise_clamp: Option<(f64, f64)>,
}

impl TravelModel {
    pub fn new(seed: u64) -> Self {
        Self::with_options(seed, DEFAULT_ACUTE_TRAVEL_FACTOR, None)
    }

    pub fn with_options(seed: u64, acute_factor: f64, noise_clamp: Option<(f64, f64)>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            noise: Normal::new(1.0, NOISE_STD_DEV).expect("valid noise distribution"),
            acute_factor,
            noise_clamp,
        }
    }

    /// Noisy travel time in whole seconds between two cells at an absolute
    /// time. `force_traffic` applies the traffic factor regardless of triage
    /// (used for depot legs).
    pub fn travel_time(
        &mut self,
        tables: &Tables,
        from: GridId,
        to: GridId,
        force_traffic: bool,
        triage: Triage,
        at: i64,
    ) -> Result<i64, TravelTimeError> {
        let base = adjusted_base(tables, from, to, force_traffic, triage, at, self.acute_factor)?;

        let mut noise = self.noise.sample(&mut self.rng);
        if let Some((low, high)) = self.noise_clamp {
            noise = noise.clamp(low, high);
        }

        Ok((base * noise).floor() as i64)
    }

    /// Deterministic travel time (no noise, no RNG consumption), used for
    /// ranking candidates and interpolating mid-trip positions.
    pub fn estimate(
        &self,
        tables: &Tables,
        from: GridId,
        to: GridId,
        force_traffic: bool,
        triage: Triage,
        at: i64,
    ) -> Result<i64, TravelTimeError> {
        Ok(
            adjusted_base(tables, from, to, force_traffic, triage, at, self.acute_factor)?.floor()
                as i64,
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn adjusted_base(
    tables: &Tables,
    from: GridId,
    to: GridId,
    force_traffic: bool,
    triage: Triage,
    at: i64,
    acute_factor: f64,
) -> Result<f64, TravelTimeError> {
    let mut seconds = tables
        .od
        .base_time(from, to)
        .ok_or(TravelTimeError::UnknownGrid)? as f64;

    if seconds == 0.0 {
        seconds = MISSING_PAIR_SECS;
    }

    if force_traffic || triage == Triage::Scheduled {
        seconds *= tables.traffic.factor_at(at);
    } else if triage == Triage::Acute {
        seconds *= acute_factor;
    }

    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{IncidentHistory, OdMatrix, Stations, TrafficTable};

    fn tables_with(od: OdMatrix, traffic: TrafficTable) -> Tables {
        Tables {
            od,
            stations: Stations::default(),
            traffic,
            incidents: IncidentHistory::default(),
        }
    }

    fn flat_od() -> OdMatrix {
        OdMatrix::from_entries(
            &[GridId(1), GridId(2)],
            &[(GridId(1), GridId(2), 1000.0), (GridId(2), GridId(1), 1000.0)],
        )
    }

    #[test]
    fn unknown_grid_is_an_error() {
        let tables = tables_with(flat_od(), TrafficTable::uniform(1.0));
        let mut model = TravelModel::new(1);
        assert_eq!(
            model.travel_time(&tables, GridId(1), GridId(99), false, Triage::Acute, 0),
            Err(TravelTimeError::UnknownGrid)
        );
    }

    #[test]
    fn missing_pair_substitutes_sixty_seconds() {
        let od = OdMatrix::from_entries(&[GridId(1), GridId(2)], &[]);
        let tables = tables_with(od, TrafficTable::uniform(1.0));
        let model = TravelModel::new(1);
        let estimate = model
            .estimate(&tables, GridId(1), GridId(2), false, Triage::Urgent, 0)
            .expect("estimate");
        assert_eq!(estimate, 60);
    }

    #[test]
    fn acute_runs_are_faster_unless_traffic_forced() {
        let tables = tables_with(flat_od(), TrafficTable::uniform(2.0));
        let model = TravelModel::new(1);

        let acute = model
            .estimate(&tables, GridId(1), GridId(2), false, Triage::Acute, 0)
            .expect("estimate");
        assert_eq!(acute, (1000.0 * DEFAULT_ACUTE_TRAVEL_FACTOR) as i64);

        let forced = model
            .estimate(&tables, GridId(1), GridId(2), true, Triage::Acute, 0)
            .expect("estimate");
        assert_eq!(forced, 2000);

        let scheduled = model
            .estimate(&tables, GridId(1), GridId(2), false, Triage::Scheduled, 0)
            .expect("estimate");
        assert_eq!(scheduled, 2000);

        let urgent = model
            .estimate(&tables, GridId(1), GridId(2), false, Triage::Urgent, 0)
            .expect("estimate");
        assert_eq!(urgent, 1000);
    }

    #[test]
    fn noise_stays_near_base_and_clamp_tightens_it() {
        let tables = tables_with(flat_od(), TrafficTable::uniform(1.0));

        let mut unclamped = TravelModel::new(7);
        for _ in 0..200 {
            let seconds = unclamped
                .travel_time(&tables, GridId(1), GridId(2), false, Triage::Urgent, 0)
                .expect("travel time");
            assert!((400..=1600).contains(&seconds), "wild noise: {seconds}");
        }

        let mut clamped = TravelModel::with_options(
            7,
            DEFAULT_ACUTE_TRAVEL_FACTOR,
            Some((0.95, 1.05)),
        );
        for _ in 0..200 {
            let seconds = clamped
                .travel_time(&tables, GridId(1), GridId(2), false, Triage::Urgent, 0)
                .expect("travel time");
            assert!((950..=1050).contains(&seconds), "clamp violated: {seconds}");
        }
    }

    #[test]
    fn same_seed_reproduces_noise() {
        let tables = tables_with(flat_od(), TrafficTable::uniform(1.0));
        let mut first = TravelModel::new(42);
        let mut second = TravelModel::new(42);
        for _ in 0..16 {
            let a = first
                .travel_time(&tables, GridId(1), GridId(2), false, Triage::Urgent, 0)
                .expect("travel time");
            let b = second
                .travel_time(&tables, GridId(1), GridId(2), false, Triage::Urgent, 0)
                .expect("travel time");
            assert_eq!(a, b);
        }
    }
}
