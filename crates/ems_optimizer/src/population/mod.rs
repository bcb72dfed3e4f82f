//! The evolutionary engine.
//!
//! One engine serves all four heuristics; they differ only in the survivor/
//! parent ordering ([`SortPolicy`]) and in whether offspring pass through
//! local search. Evaluations inside a generation run on the rayon pool, each
//! with RNG streams pinned to `(generation, index)`.

pub mod local_search;
pub mod nsga2;

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use ems_core::config::{GenotypeInitKind, HeuristicKind, MutationKind, SimConfig};

use crate::genotype::Genotype;
use crate::individual::{EvaluationContext, Individual};
use crate::trace::GenerationTrace;
use local_search::local_search;
use nsga2::{assign_crowding_distance, non_dominated_sort};

/// How survivors and tournament winners are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPolicy {
    /// Weighted-sum fitness, ascending (a loss).
    WeightedSum,
    /// Non-dominated fronts, crowding distance within a front.
    NonDominated,
}

/// Engine knobs; one value per heuristic flavor.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub population_size: usize,
    pub generation_budget: usize,
    pub time_budget: Duration,
    pub tournament_size: usize,
    pub crossover_probability: f64,
    pub mutation_probability: f64,
    pub mutation_weights: Vec<(MutationKind, f64)>,
    pub genotype_init_weights: Vec<(GenotypeInitKind, f64)>,
    pub sort: SortPolicy,
    pub local_search_probability: f64,
    pub show_progress: bool,
}

impl EngineConfig {
    /// The four heuristics as configurations of the one engine.
    pub fn for_heuristic(kind: HeuristicKind, config: &SimConfig) -> Self {
        let sort = match kind {
            HeuristicKind::Nsga2 | HeuristicKind::MemeticNsga2 => SortPolicy::NonDominated,
            _ => SortPolicy::WeightedSum,
        };
        let local_search_probability = match kind {
            HeuristicKind::Ma | HeuristicKind::MemeticNsga2 => config.local_search_probability,
            _ => 0.0,
        };
        EngineConfig {
            population_size: config.population_size,
            generation_budget: config.generation_size,
            time_budget: Duration::from_secs(config.max_run_time_seconds),
            tournament_size: config.parent_selection_tournament_size.max(1),
            crossover_probability: config.crossover_probability,
            mutation_probability: config.mutation_probability,
            mutation_weights: config.mutation_weights.clone(),
            genotype_init_weights: config.genotype_init_weights.clone(),
            sort,
            local_search_probability,
            show_progress: true,
        }
    }
}

pub struct Population {
    pub individuals: Vec<Individual>,
    pub fronts: Vec<Vec<usize>>,
    pub generation: usize,
    pub trace: GenerationTrace,
    config: EngineConfig,
    context: EvaluationContext,
    rng: StdRng,
}

impl Population {
    /// Initialize and evaluate the parent generation.
    pub fn new(context: EvaluationContext, config: EngineConfig, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed ^ 0x706f_7075_6c61_7469);
        let segments = context.options.shift.segments;
        let depots = context.depot_indices.len();

        let mut individuals: Vec<Individual> = (0..config.population_size)
            .map(|_| {
                Individual::new(Genotype::initialize(
                    &mut rng,
                    segments,
                    depots,
                    context.fleet,
                    &config.genotype_init_weights,
                    &context.tables.stations,
                    &context.depot_indices,
                ))
            })
            .collect();

        evaluate_all(&mut individuals, &context, 0);

        let mut population = Population {
            individuals,
            fronts: Vec::new(),
            generation: 0,
            trace: GenerationTrace::default(),
            config,
            context,
            rng,
        };
        population.refresh_ordering();
        population.store_generation_metrics();
        population
    }

    /// Run until the generation or wall-clock budget is exhausted; returns
    /// the index of the fittest individual.
    pub fn evolve(&mut self) -> usize {
        let started = Instant::now();
        let progress = if self.config.show_progress {
            let bar = ProgressBar::new(self.config.generation_budget as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .expect("valid progress template")
                    .progress_chars("#>-"),
            );
            Some(bar)
        } else {
            None
        };

        while self.generation < self.config.generation_budget
            && started.elapsed() < self.config.time_budget
        {
            self.generation += 1;

            let offspring = self.create_offspring();
            self.individuals.extend(offspring);
            self.refresh_ordering();
            self.survivor_selection();
            self.refresh_ordering();
            self.store_generation_metrics();

            if let Some(bar) = &progress {
                bar.set_message(self.progress_postfix());
                bar.inc(1);
            }
        }

        if let Some(bar) = &progress {
            bar.finish_with_message(self.progress_postfix());
        }
        self.fittest()
    }

    /// Lowest weighted-sum loss; the weighted sum is maintained in every
    /// sort mode, so this is comparable across heuristics.
    pub fn fittest(&self) -> usize {
        let mut best = 0;
        for (index, individual) in self.individuals.iter().enumerate() {
            if individual.fitness < self.individuals[best].fitness {
                best = index;
            }
        }
        best
    }

    /// Fraction of genotypes that are unique.
    pub fn diversity(&self) -> f64 {
        if self.individuals.is_empty() {
            return 0.0;
        }
        let mut genotypes: Vec<&Genotype> = self
            .individuals
            .iter()
            .map(|individual| &individual.genotype)
            .collect();
        genotypes.sort_by_key(|genotype| format!("{:?}", genotype.rows));
        genotypes.dedup();
        genotypes.len() as f64 / self.individuals.len() as f64
    }

    fn progress_postfix(&self) -> String {
        let best = &self.individuals[self.fittest()];
        format!(
            "Gen: {:4}, Div: {:.2}, Vio: (U: {:.2}, R: {:.2})",
            self.generation,
            self.diversity(),
            best.objectives.percentage_violations_urban,
            best.objectives.percentage_violations_rural,
        )
    }

    fn refresh_ordering(&mut self) {
        match self.config.sort {
            SortPolicy::WeightedSum => {
                self.fronts.clear();
            }
            SortPolicy::NonDominated => {
                self.fronts = non_dominated_sort(&mut self.individuals);
                let fronts = self.fronts.clone();
                for front in &fronts {
                    assign_crowding_distance(&mut self.individuals, front);
                }
            }
        }
    }

    /// Tournament of `tournament_size`, winner per the sort policy.
    fn select_parent(&mut self) -> usize {
        let size = self.individuals.len();
        let mut winner = self.rng.gen_range(0..size);
        for _ in 1..self.config.tournament_size {
            let contender = self.rng.gen_range(0..size);
            winner = self.tournament_winner(winner, contender);
        }
        winner
    }

    fn tournament_winner(&self, a: usize, b: usize) -> usize {
        let (first, second) = (&self.individuals[a], &self.individuals[b]);
        match self.config.sort {
            SortPolicy::WeightedSum => {
                if first.fitness <= second.fitness {
                    a
                } else {
                    b
                }
            }
            SortPolicy::NonDominated => {
                if first.front_number != second.front_number {
                    if first.front_number < second.front_number {
                        a
                    } else {
                        b
                    }
                } else if first.crowding_distance > second.crowding_distance {
                    a
                } else {
                    b
                }
            }
        }
    }

    /// Generate, mutate, repair, and evaluate one generation of offspring.
    fn create_offspring(&mut self) -> Vec<Individual> {
        let target = self.config.population_size;
        let mut genotypes: Vec<Genotype> = Vec::with_capacity(target + 1);

        // A zero crossover rate degenerates to mutated copies of selected
        // parents; the loop below would never terminate otherwise.
        if self.config.crossover_probability <= 0.0 {
            while genotypes.len() < target {
                let parent = self.select_parent();
                let mut child = self.individuals[parent].genotype.clone();
                child.mutate(
                    &mut self.rng,
                    self.config.mutation_probability,
                    &self.config.mutation_weights,
                );
                child.repair(&mut self.rng, self.context.fleet);
                genotypes.push(child);
            }
        }

        while genotypes.len() < target {
            if self.rng.gen::<f64>() >= self.config.crossover_probability {
                continue;
            }
            let parent1 = self.select_parent();
            let parent2 = self.select_parent();
            let (mut first, mut second) = Genotype::crossover(
                &self.individuals[parent1].genotype,
                &self.individuals[parent2].genotype,
                &mut self.rng,
            );
            for child in [&mut first, &mut second] {
                child.repair(&mut self.rng, self.context.fleet);
                child.mutate(
                    &mut self.rng,
                    self.config.mutation_probability,
                    &self.config.mutation_weights,
                );
                child.repair(&mut self.rng, self.context.fleet);
            }
            genotypes.push(first);
            genotypes.push(second);
        }
        genotypes.truncate(target);

        let mut offspring: Vec<Individual> = genotypes.into_iter().map(Individual::new).collect();
        evaluate_all(&mut offspring, &self.context, self.generation);

        if self.config.local_search_probability > 0.0 {
            for (index, child) in offspring.iter_mut().enumerate() {
                if self.rng.gen::<f64>() < self.config.local_search_probability {
                    local_search(child, &self.context, &mut self.rng, self.generation, index);
                }
            }
        }

        offspring
    }

    /// Shrink the combined parent+offspring pool back to the population size.
    fn survivor_selection(&mut self) {
        let target = self.config.population_size;
        match self.config.sort {
            SortPolicy::WeightedSum => {
                self.individuals.sort_by(|a, b| {
                    a.fitness
                        .partial_cmp(&b.fitness)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                self.individuals.truncate(target);
            }
            SortPolicy::NonDominated => {
                let mut keep: Vec<usize> = Vec::with_capacity(target);
                for front in &self.fronts {
                    if keep.len() + front.len() <= target {
                        keep.extend(front.iter().copied());
                    } else {
                        let mut tail = front.clone();
                        tail.sort_by(|&a, &b| {
                            self.individuals[b]
                                .crowding_distance
                                .partial_cmp(&self.individuals[a].crowding_distance)
                                .unwrap_or(std::cmp::Ordering::Equal)
                        });
                        keep.extend(tail.into_iter().take(target - keep.len()));
                        break;
                    }
                }
                keep.sort_unstable();
                let mut index = 0;
                self.individuals.retain(|_| {
                    let kept = keep.binary_search(&index).is_ok();
                    index += 1;
                    kept
                });
            }
        }
    }

    fn store_generation_metrics(&mut self) {
        let diversity = self.diversity();
        self.trace
            .store_generation(&self.individuals, diversity);
    }
}

/// Evaluate a batch in parallel; RNG streams derive from `(generation,
/// index)`, so the result is identical to sequential evaluation.
fn evaluate_all(individuals: &mut [Individual], context: &EvaluationContext, generation: usize) {
    individuals
        .par_iter_mut()
        .enumerate()
        .for_each(|(index, individual)| {
            individual.evaluate(context, generation, index);
        });
}
