//! One candidate solution: a genotype plus everything its evaluation
//! produced.

use bevy_ecs::prelude::World;

use ems_core::allocator::AllocationPlan;
use ems_core::config::ObjectiveKind;
use ems_core::metrics::{collect_ambulances, collect_incidents, AmbulanceRecord, SimulatedIncident};
use ems_core::runner::{run_until_empty, simulation_schedule};
use ems_core::scenario::{build_simulation, IncidentRecord, SimulationOptions};
use ems_core::tables::SharedTables;

use crate::genotype::Genotype;
use crate::objectives::{inverse_fitness, ObjectiveSet, ObjectiveWeights};

/// Ceiling on wake-ups per evaluation; a drain that hits it indicates a bug,
/// not a long shift.
const MAX_SIMULATION_STEPS: usize = 10_000_000;

/// Everything shared by all evaluations of one optimizer run.
#[derive(Clone)]
pub struct EvaluationContext {
    pub tables: SharedTables,
    pub records: std::sync::Arc<Vec<IncidentRecord>>,
    pub options: SimulationOptions,
    pub depot_indices: Vec<usize>,
    pub fleet: usize,
    pub weights: ObjectiveWeights,
    pub objective_kinds: Vec<ObjectiveKind>,
}

#[derive(Debug, Clone)]
pub struct Individual {
    pub genotype: Genotype,
    /// Processed incidents from the last evaluation, sorted by call time.
    pub simulated: Vec<SimulatedIncident>,
    pub ambulances: Vec<AmbulanceRecord>,
    pub objectives: ObjectiveSet,
    pub segment_objectives: Vec<ObjectiveSet>,
    /// Weighted-sum loss (lower is better).
    pub fitness: f64,
    /// Weighted-sum loss per allocation segment.
    pub segment_fitness: Vec<f64>,
    /// Inverted value per enabled objective (larger is better), the
    /// domination coordinates.
    pub inverted_objectives: Vec<f64>,
    pub front_number: usize,
    pub crowding_distance: f64,
}

impl Individual {
    pub fn new(genotype: Genotype) -> Self {
        Individual {
            genotype,
            simulated: Vec::new(),
            ambulances: Vec::new(),
            objectives: ObjectiveSet::default(),
            segment_objectives: Vec::new(),
            fitness: f64::INFINITY,
            segment_fitness: Vec::new(),
            inverted_objectives: Vec::new(),
            front_number: 0,
            crowding_distance: 0.0,
        }
    }

    /// Simulate this genotype against the shared scenario and refresh every
    /// derived metric. `generation` and `index` pin the RNG streams so
    /// parallel and sequential evaluation agree.
    pub fn evaluate(&mut self, context: &EvaluationContext, generation: usize, index: usize) {
        let options = context
            .options
            .clone()
            .with_evaluation_seed(generation, index);
        let plan = AllocationPlan::new(self.genotype.rows.clone(), context.depot_indices.clone());

        let mut world = World::new();
        build_simulation(
            &mut world,
            context.tables.clone(),
            &context.records,
            plan,
            &options,
        );
        let mut schedule = simulation_schedule();
        run_until_empty(&mut world, &mut schedule, MAX_SIMULATION_STEPS);

        self.simulated = collect_incidents(&mut world);
        self.ambulances = collect_ambulances(&mut world);

        let shift = &context.options.shift;
        self.objectives = ObjectiveSet::compute(&self.simulated, shift, None);
        self.segment_objectives = (0..shift.segments)
            .map(|segment| ObjectiveSet::compute(&self.simulated, shift, Some(segment)))
            .collect();

        self.fitness = context.weights.weighted_sum(&self.objectives);
        self.segment_fitness = self
            .segment_objectives
            .iter()
            .map(|objectives| context.weights.weighted_sum(objectives))
            .collect();
        self.inverted_objectives = context
            .objective_kinds
            .iter()
            .map(|&kind| inverse_fitness(self.objectives.get(kind)))
            .collect();
    }

    /// Pareto domination over the inverted objectives: at least as good
    /// everywhere and strictly better somewhere.
    pub fn dominates(&self, other: &Individual) -> bool {
        let mut any_better = false;
        for (own, theirs) in self
            .inverted_objectives
            .iter()
            .zip(other.inverted_objectives.iter())
        {
            if own < theirs {
                return false;
            }
            if own > theirs {
                any_better = true;
            }
        }
        any_better
    }
}
