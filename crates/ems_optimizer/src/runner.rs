//! Run assembly: configuration + tables in, artifacts out.

use std::fs;
use std::path::PathBuf;

use ems_core::config::{HeuristicKind, SimConfig};
use ems_core::export::{write_ambulances_csv, write_events_csv, write_genotype_csv};
use ems_core::scenario::SimulationOptions;
use ems_core::synth::{synthesize_events, SynthesisParams};
use ems_core::tables::SharedTables;

use crate::genotype::Genotype;
use crate::individual::{EvaluationContext, Individual};
use crate::objectives::ObjectiveWeights;
use crate::population::{EngineConfig, Population};

/// Execute the configured run end to end. The scenario is synthesized once
/// and shared by every evaluation; the fittest individual's simulation is
/// what gets persisted.
pub fn run(config: &SimConfig, tables: SharedTables) -> Result<(), Box<dyn std::error::Error>> {
    let context = build_context(config, tables)?;
    let output_dir = prepare_output_dir(config)?;

    let (best, trace) = match config.heuristic {
        HeuristicKind::None => (run_baseline(config, &context), None),
        heuristic => {
            let engine = EngineConfig::for_heuristic(heuristic, config);
            let mut population = Population::new(context.clone(), engine, config.seed);
            let fittest = population.evolve();
            (
                population.individuals[fittest].clone(),
                Some(std::mem::take(&mut population.trace)),
            )
        }
    };

    write_events_csv(&output_dir.join("events.csv"), &best.simulated)?;
    write_ambulances_csv(&output_dir.join("ambulances.csv"), &best.ambulances)?;
    write_genotype_csv(&output_dir.join("genotype.csv"), &best.genotype.rows)?;
    if let Some(trace) = trace {
        trace.write_json(&output_dir.join("heuristic.json"))?;
    }

    print_summary(&best);
    Ok(())
}

/// Shared evaluation inputs for this run.
pub fn build_context(
    config: &SimConfig,
    tables: SharedTables,
) -> Result<EvaluationContext, Box<dyn std::error::Error>> {
    let depot_indices = tables
        .stations
        .depot_indices(config.simulate_day_shift, config.skip_station_index);
    if depot_indices.is_empty() {
        return Err("station table has no depots for the selected shift".into());
    }
    let fleet = config.fleet_size();
    if fleet == 0 {
        return Err("fleet size is zero for the selected shift".into());
    }

    let records = synthesize_events(&tables, &SynthesisParams::from_config(config));

    Ok(EvaluationContext {
        tables,
        records: std::sync::Arc::new(records),
        options: SimulationOptions::from_config(config),
        depot_indices,
        fleet,
        weights: ObjectiveWeights::new(config.objective_weights.clone()),
        objective_kinds: config.objectives.clone(),
    })
}

/// `HEURISTIC: NONE`: one simulation of an even allocation.
fn run_baseline(config: &SimConfig, context: &EvaluationContext) -> Individual {
    let depots = context.depot_indices.len();
    let base = context.fleet / depots;
    let remainder = context.fleet % depots;
    let row: Vec<usize> = (0..depots)
        .map(|depot| base + usize::from(depot < remainder))
        .collect();
    let rows = vec![row; config.num_time_segments.max(1)];

    let mut individual = Individual::new(Genotype { rows });
    individual.evaluate(context, 0, 0);
    individual
}

fn prepare_output_dir(config: &SimConfig) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = PathBuf::from(&config.output_dir).join(format!(
        "{}_{}",
        config.unique_run_id,
        config.heuristic.as_str()
    ));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn print_summary(best: &Individual) {
    let objectives = &best.objectives;
    println!("Goal:");
    println!("\t A, urban: <12 min");
    println!("\t A, rural: <25 min");
    println!("\t H, urban: <30 min");
    println!("\t H, rural: <40 min");
    println!();
    for (label, value) in [
        ("A, urban", objectives.avg_response_time_urban_a),
        ("A, rural", objectives.avg_response_time_rural_a),
        ("H, urban", objectives.avg_response_time_urban_h),
        ("H, rural", objectives.avg_response_time_rural_h),
        ("V1, urban", objectives.avg_response_time_urban_v1),
        ("V1, rural", objectives.avg_response_time_rural_v1),
    ] {
        println!(
            "Avg. response time ({label}): \t{value:.1}s ({:.1}m)",
            value / 60.0
        );
    }
    println!(
        "Percentage violations: \t\t{:.1}%",
        objectives.percentage_violations * 100.0
    );

    if !best.segment_fitness.is_empty() {
        println!();
        println!("Per time segment:");
        for (segment, (fitness, objectives)) in best
            .segment_fitness
            .iter()
            .zip(&best.segment_objectives)
            .enumerate()
        {
            println!(
                "\t TS {}: fitness {:.1}, violations {:.1}%, allocation {:?}",
                segment + 1,
                fitness,
                objectives.percentage_violations * 100.0,
                best.genotype.rows[segment.min(best.genotype.rows.len() - 1)]
            );
        }
    }
}
