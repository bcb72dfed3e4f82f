//! First-improvement local search used by the memetic variants.
//!
//! One step: pick a random time segment, find the depot with the most
//! response-time violations in it, then try moving one vehicle from each
//! other staffed depot to the worst one, accepting the first move that
//! strictly improves fitness.

use rand::rngs::StdRng;
use rand::Rng;

use ems_core::metrics::response_time_violations;

use crate::individual::{EvaluationContext, Individual};

pub fn local_search(
    individual: &mut Individual,
    context: &EvaluationContext,
    rng: &mut StdRng,
    generation: usize,
    index: usize,
) {
    let segments = individual.genotype.num_segments();
    let depots = individual.genotype.num_depots();
    if segments == 0 || depots < 2 {
        return;
    }
    let segment = rng.gen_range(0..segments);
    let shift = &context.options.shift;

    // Depot column with the worst violation rate in this segment.
    let mut worst_column = 0;
    let mut worst_rate = f64::MIN;
    for (column, &station) in context.depot_indices.iter().enumerate() {
        let rate = response_time_violations(
            &individual.simulated,
            shift,
            Some(segment),
            None,
            Some(station),
        );
        if rate > worst_rate {
            worst_column = column;
            worst_rate = rate;
        }
    }

    for column in 0..depots {
        if column == worst_column {
            continue;
        }
        if individual.genotype.rows[segment][column] < 1 {
            continue;
        }

        let mut candidate = individual.clone();
        candidate.genotype.rows[segment][column] -= 1;
        candidate.genotype.rows[segment][worst_column] += 1;
        candidate.evaluate(context, generation, index);

        if candidate.fitness < individual.fitness {
            *individual = candidate;
            break;
        }
    }
}
