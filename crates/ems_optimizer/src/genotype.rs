//! The genotype: a segments x depots matrix of vehicle counts, with its
//! initializers, mutations, crossover, and repair.
//!
//! Validity invariant: every segment row sums to the fleet size. Operators
//! may break the invariant; `repair` restores it before evaluation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use ems_core::config::{GenotypeInitKind, MutationKind};
use ems_core::tables::Stations;

/// Draw an index from a cumulative weighted lottery. Zero-total lotteries
/// fall back to the first entry.
pub fn weighted_lottery(rng: &mut StdRng, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 || weights.is_empty() {
        return 0;
    }
    let draw: f64 = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        cumulative += weight;
        if draw < cumulative {
            return index;
        }
    }
    weights.len() - 1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genotype {
    pub rows: Vec<Vec<usize>>,
}

impl Genotype {
    pub fn empty(segments: usize, depots: usize) -> Self {
        Genotype {
            rows: vec![vec![0; depots]; segments],
        }
    }

    pub fn num_segments(&self) -> usize {
        self.rows.len()
    }

    pub fn num_depots(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Initialize a parent genotype through the configured lottery of
    /// initializers. `depot_indices` maps matrix columns to station rows for
    /// the proportionate variants.
    pub fn initialize(
        rng: &mut StdRng,
        segments: usize,
        depots: usize,
        fleet: usize,
        inits: &[(GenotypeInitKind, f64)],
        stations: &Stations,
        depot_indices: &[usize],
    ) -> Self {
        let weights: Vec<f64> = inits.iter().map(|(_, weight)| *weight).collect();
        let kind = inits
            .get(weighted_lottery(rng, &weights))
            .map(|(kind, _)| *kind)
            .unwrap_or(GenotypeInitKind::Random);

        let mut genotype = Genotype::empty(segments, depots);
        match kind.demographic_column() {
            None if kind == GenotypeInitKind::Uniform => genotype.fill_uniform(rng, fleet),
            None => genotype.fill_random(rng, fleet),
            Some(column) => {
                let weights: Vec<f64> = depot_indices
                    .iter()
                    .map(|&station| stations.get(station).demographic_weight(column))
                    .collect();
                genotype.fill_proportionate(rng, fleet, &weights);
            }
        }
        genotype
    }

    /// Place every vehicle at an independently uniform depot, per segment.
    fn fill_random(&mut self, rng: &mut StdRng, fleet: usize) {
        let depots = self.num_depots();
        for row in &mut self.rows {
            for _ in 0..fleet {
                row[rng.gen_range(0..depots)] += 1;
            }
        }
    }

    /// Even spread with the remainder scattered over a random depot subset.
    fn fill_uniform(&mut self, rng: &mut StdRng, fleet: usize) {
        let depots = self.num_depots();
        let base = fleet / depots;
        let remainder = fleet % depots;
        let mut order: Vec<usize> = (0..depots).collect();
        for row in &mut self.rows {
            for slot in row.iter_mut() {
                *slot = base;
            }
            order.shuffle(rng);
            for &depot in order.iter().take(remainder) {
                row[depot] += 1;
            }
        }
    }

    /// One vehicle per depot, the rest by demographic-weighted lottery.
    fn fill_proportionate(&mut self, rng: &mut StdRng, fleet: usize, weights: &[f64]) {
        let depots = self.num_depots();
        for row in &mut self.rows {
            let mut remaining = fleet;
            for slot in row.iter_mut().take(remaining) {
                *slot += 1;
            }
            remaining = remaining.saturating_sub(depots);
            for _ in 0..remaining {
                row[weighted_lottery(rng, weights)] += 1;
            }
        }
    }

    pub fn row_sum(&self, segment: usize) -> usize {
        self.rows[segment].iter().sum()
    }

    pub fn is_valid(&self, fleet: usize) -> bool {
        (0..self.num_segments()).all(|segment| self.row_sum(segment) == fleet)
    }

    /// Restore row sums by uniformly adding to (or draining from) random
    /// depots. Panics if the result is still invalid, which would be a bug
    /// in an operator.
    pub fn repair(&mut self, rng: &mut StdRng, fleet: usize) {
        let depots = self.num_depots();
        for row in &mut self.rows {
            let mut total: usize = row.iter().sum();
            while total != fleet {
                let depot = rng.gen_range(0..depots);
                if total < fleet {
                    row[depot] += 1;
                    total += 1;
                } else if row[depot] > 0 {
                    row[depot] -= 1;
                    total -= 1;
                }
            }
        }
        assert!(self.is_valid(fleet), "repair left an invalid allocation");
    }

    /// Apply one mutation drawn from the configured lottery.
    pub fn mutate(
        &mut self,
        rng: &mut StdRng,
        probability: f64,
        mutations: &[(MutationKind, f64)],
    ) {
        let weights: Vec<f64> = mutations.iter().map(|(_, weight)| *weight).collect();
        let kind = mutations
            .get(weighted_lottery(rng, &weights))
            .map(|(kind, _)| *kind)
            .unwrap_or(MutationKind::Redistribute);
        match kind {
            MutationKind::Redistribute => self.redistribute(rng, probability),
            MutationKind::Swap => self.swap(rng, probability),
            MutationKind::Scramble => self.scramble(rng, probability),
            MutationKind::NeighborDuplication => self.neighbor_duplication(rng, probability),
        }
    }

    /// Move single vehicles from hit depots to a different random depot.
    fn redistribute(&mut self, rng: &mut StdRng, probability: f64) {
        let depots = self.num_depots();
        if depots < 2 {
            return;
        }
        for row in &mut self.rows {
            for depot in 0..depots {
                if rng.gen::<f64>() > probability {
                    continue;
                }
                if row[depot] == 0 {
                    continue;
                }
                let mut target = rng.gen_range(0..depots - 1);
                if target >= depot {
                    target += 1;
                }
                row[depot] -= 1;
                row[target] += 1;
            }
        }
    }

    /// Swap counts between hit depots and a random partner.
    fn swap(&mut self, rng: &mut StdRng, probability: f64) {
        let depots = self.num_depots();
        for row in &mut self.rows {
            for depot in 0..depots {
                if rng.gen::<f64>() > probability {
                    continue;
                }
                let target = rng.gen_range(0..depots);
                if target == depot {
                    continue;
                }
                row.swap(depot, target);
            }
        }
    }

    /// Shuffle a random contiguous span of hit segment rows.
    fn scramble(&mut self, rng: &mut StdRng, probability: f64) {
        let depots = self.num_depots();
        if depots < 2 {
            return;
        }
        for row in &mut self.rows {
            if rng.gen::<f64>() > probability {
                continue;
            }
            let start = rng.gen_range(0..depots - 1);
            let end = rng.gen_range(start + 1..depots);
            row[start..=end].shuffle(rng);
        }
    }

    /// Copy hit segment rows over both neighbors, skipping the next segment
    /// so one row cannot flood the matrix.
    fn neighbor_duplication(&mut self, rng: &mut StdRng, probability: f64) {
        let segments = self.num_segments();
        let mut segment = 0;
        while segment < segments {
            if rng.gen::<f64>() > probability {
                segment += 1;
                continue;
            }
            let row = self.rows[segment].clone();
            if segment > 0 {
                self.rows[segment - 1] = row.clone();
            }
            if segment + 1 < segments {
                self.rows[segment + 1] = row;
            }
            segment += 2;
        }
    }

    /// Segmented two-offspring crossover with explicit per-segment split
    /// points: the first offspring takes the second parent up to the split
    /// and the first after it; the second offspring takes the opposite.
    pub fn crossover_at(
        parent1: &Genotype,
        parent2: &Genotype,
        midpoints: &[usize],
    ) -> (Genotype, Genotype) {
        let mut offspring1 = parent1.clone();
        let mut offspring2 = parent2.clone();
        for (segment, &midpoint) in midpoints.iter().enumerate() {
            for depot in 0..=midpoint.min(parent1.num_depots().saturating_sub(1)) {
                offspring1.rows[segment][depot] = parent2.rows[segment][depot];
                offspring2.rows[segment][depot] = parent1.rows[segment][depot];
            }
        }
        (offspring1, offspring2)
    }

    /// Crossover with random split points in `[1, depots - 2]`.
    pub fn crossover(
        parent1: &Genotype,
        parent2: &Genotype,
        rng: &mut StdRng,
    ) -> (Genotype, Genotype) {
        let depots = parent1.num_depots();
        let midpoints: Vec<usize> = (0..parent1.num_segments())
            .map(|_| {
                if depots >= 3 {
                    rng.gen_range(1..=depots - 2)
                } else {
                    0
                }
            })
            .collect();
        Self::crossover_at(parent1, parent2, &midpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ems_core::grid::GridId;
    use ems_core::tables::stations::StationKind;
    use ems_core::test_helpers::test_station;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(1234)
    }

    fn stations(count: usize) -> Stations {
        Stations::from_rows(
            (0..count)
                .map(|index| {
                    let mut station = test_station(
                        &format!("Depot {index}"),
                        StationKind::Depot,
                        GridId(100 + index as i64),
                        true,
                    );
                    station.total_population_radius_2km = (index + 1) as f64 * 100.0;
                    station
                })
                .collect(),
        )
    }

    #[test]
    fn initializers_always_produce_valid_rows() {
        let stations = stations(5);
        let depot_indices: Vec<usize> = (0..5).collect();
        let mut rng = rng();
        for kind in [
            GenotypeInitKind::Random,
            GenotypeInitKind::Uniform,
            GenotypeInitKind::PopulationProportionate2km,
        ] {
            let genotype = Genotype::initialize(
                &mut rng,
                3,
                5,
                13,
                &[(kind, 1.0)],
                &stations,
                &depot_indices,
            );
            assert!(genotype.is_valid(13), "{kind:?} broke the row sum");
        }
    }

    #[test]
    fn proportionate_seeds_every_depot() {
        let stations = stations(4);
        let depot_indices: Vec<usize> = (0..4).collect();
        let mut rng = rng();
        let genotype = Genotype::initialize(
            &mut rng,
            2,
            4,
            10,
            &[(GenotypeInitKind::IncidentProportionate5km, 1.0)],
            &stations,
            &depot_indices,
        );
        for row in &genotype.rows {
            assert!(row.iter().all(|&count| count >= 1));
        }
    }

    #[test]
    fn redistribute_keeps_sum_and_changes_layout() {
        // Certain mutation on every depot with vehicles.
        let mut genotype = Genotype {
            rows: vec![vec![3, 2, 0]],
        };
        let mut rng = rng();
        genotype.redistribute(&mut rng, 1.0);
        assert_eq!(genotype.row_sum(0), 5);
        assert_ne!(genotype.rows[0], vec![3, 2, 0]);
    }

    #[test]
    fn swap_keeps_multiset() {
        let mut genotype = Genotype {
            rows: vec![vec![4, 1, 0, 2]],
        };
        let mut rng = rng();
        genotype.swap(&mut rng, 1.0);
        let mut counts = genotype.rows[0].clone();
        counts.sort_unstable();
        assert_eq!(counts, vec![0, 1, 2, 4]);
    }

    #[test]
    fn scramble_keeps_multiset() {
        let mut genotype = Genotype {
            rows: vec![vec![5, 0, 1, 3, 2]],
        };
        let mut rng = rng();
        genotype.scramble(&mut rng, 1.0);
        let mut counts = genotype.rows[0].clone();
        counts.sort_unstable();
        assert_eq!(counts, vec![0, 1, 2, 3, 5]);
    }

    #[test]
    fn neighbor_duplication_copies_and_skips() {
        let mut genotype = Genotype {
            rows: vec![vec![1, 0], vec![0, 1], vec![1, 0], vec![0, 1]],
        };
        let mut rng = rng();
        genotype.neighbor_duplication(&mut rng, 1.0);
        // Segment 0 copied itself onto segment 1, then the scan skipped to
        // segment 2.
        assert_eq!(genotype.rows[1], genotype.rows[0]);
    }

    #[test]
    fn crossover_splits_and_repair_restores_sums() {
        let parent1 = Genotype {
            rows: vec![vec![3, 2], vec![1, 4]],
        };
        let parent2 = Genotype {
            rows: vec![vec![1, 4], vec![3, 2]],
        };
        let (mut offspring1, mut offspring2) =
            Genotype::crossover_at(&parent1, &parent2, &[0, 0]);

        // First offspring: parent2 head, parent1 tail.
        assert_eq!(offspring1.rows, vec![vec![1, 2], vec![3, 4]]);
        assert_eq!(offspring2.rows, vec![vec![3, 4], vec![1, 2]]);

        let mut rng = rng();
        offspring1.repair(&mut rng, 5);
        offspring2.repair(&mut rng, 5);
        assert!(offspring1.is_valid(5));
        assert!(offspring2.is_valid(5));
    }

    #[test]
    fn repair_terminates_from_far_off_sums() {
        let mut genotype = Genotype {
            rows: vec![vec![40, 0, 0], vec![0, 0, 0]],
        };
        let mut rng = rng();
        genotype.repair(&mut rng, 5);
        assert!(genotype.is_valid(5));
    }

    #[test]
    fn lottery_respects_zero_weights() {
        let mut rng = rng();
        for _ in 0..64 {
            let index = weighted_lottery(&mut rng, &[0.0, 3.0, 0.0]);
            assert_eq!(index, 1);
        }
    }
}
