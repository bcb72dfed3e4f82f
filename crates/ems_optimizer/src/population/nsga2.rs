//! Non-dominated sorting and crowding distance.

use crate::individual::Individual;

/// Peel the population into Pareto fronts by domination counting. Each
/// individual's `front_number` is updated; the returned fronts hold indices
/// into `individuals`.
pub fn non_dominated_sort(individuals: &mut [Individual]) -> Vec<Vec<usize>> {
    let size = individuals.len();
    let mut domination_counts = vec![0usize; size];
    let mut dominated: Vec<Vec<usize>> = vec![Vec::new(); size];

    for i in 0..size {
        for j in (i + 1)..size {
            if individuals[i].dominates(&individuals[j]) {
                dominated[i].push(j);
                domination_counts[j] += 1;
            } else if individuals[j].dominates(&individuals[i]) {
                dominated[j].push(i);
                domination_counts[i] += 1;
            }
        }
    }

    let mut fronts: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = (0..size)
        .filter(|&index| domination_counts[index] == 0)
        .collect();

    while !current.is_empty() {
        let front_number = fronts.len();
        for &index in &current {
            individuals[index].front_number = front_number;
        }

        let mut next: Vec<usize> = Vec::new();
        for &index in &current {
            for &loser in &dominated[index] {
                domination_counts[loser] -= 1;
                if domination_counts[loser] == 0 {
                    next.push(loser);
                }
            }
        }
        fronts.push(std::mem::take(&mut current));
        current = next;
    }

    fronts
}

/// Crowding distance within one front: boundary individuals per objective
/// get infinity, interior ones accumulate normalized neighbor gaps.
/// Objectives with zero range contribute nothing.
pub fn assign_crowding_distance(individuals: &mut [Individual], front: &[usize]) {
    if front.is_empty() {
        return;
    }
    let objective_count = individuals[front[0]].inverted_objectives.len();

    for &index in front {
        individuals[index].crowding_distance = 0.0;
    }

    let mut order: Vec<usize> = front.to_vec();
    for objective in 0..objective_count {
        order.sort_by(|&a, &b| {
            individuals[a].inverted_objectives[objective]
                .partial_cmp(&individuals[b].inverted_objectives[objective])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let first = order[0];
        let last = order[order.len() - 1];
        individuals[first].crowding_distance = f64::INFINITY;
        individuals[last].crowding_distance = f64::INFINITY;

        let min = individuals[first].inverted_objectives[objective];
        let max = individuals[last].inverted_objectives[objective];
        let range = max - min;
        if range == 0.0 {
            continue;
        }

        for window in 0..order.len().saturating_sub(2) {
            let index = order[window + 1];
            let below = individuals[order[window]].inverted_objectives[objective];
            let above = individuals[order[window + 2]].inverted_objectives[objective];
            if individuals[index].crowding_distance.is_finite() {
                individuals[index].crowding_distance += (above - below) / range;
            }
        }
    }
}
