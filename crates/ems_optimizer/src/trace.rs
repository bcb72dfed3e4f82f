//! Per-generation trace persisted as `heuristic.json`.
//!
//! For each tracked metric the trace holds one vector per generation; most
//! metrics carry one value per individual, diversity carries a single value.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use ems_core::config::ObjectiveKind;

use crate::individual::Individual;

#[derive(Debug, Default)]
pub struct GenerationTrace {
    pub metrics: BTreeMap<String, Vec<Vec<f64>>>,
}

impl GenerationTrace {
    pub fn store_generation(&mut self, individuals: &[Individual], diversity: f64) {
        let mut push = |name: &str, values: Vec<f64>| {
            self.metrics.entry(name.to_string()).or_default().push(values);
        };

        push("diversity", vec![diversity]);
        for kind in ObjectiveKind::ALL {
            push(
                kind.trace_name(),
                individuals
                    .iter()
                    .map(|individual| individual.objectives.get(kind))
                    .collect(),
            );
        }
        push(
            "fitness",
            individuals
                .iter()
                .map(|individual| individual.fitness)
                .collect(),
        );
        push(
            "front_number",
            individuals
                .iter()
                .map(|individual| individual.front_number as f64)
                .collect(),
        );
        push(
            "crowding_distance",
            individuals
                .iter()
                .map(|individual| individual.crowding_distance)
                .collect(),
        );
    }

    pub fn generations(&self) -> usize {
        self.metrics
            .values()
            .next()
            .map(|series| series.len())
            .unwrap_or(0)
    }

    /// Write the trace as a JSON object of metric name to per-generation
    /// vectors. Non-finite crowding distances are serialized as large
    /// sentinels so the file stays valid JSON.
    pub fn write_json(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let sanitized: BTreeMap<&str, Vec<Vec<f64>>> = self
            .metrics
            .iter()
            .map(|(name, series)| {
                let series = series
                    .iter()
                    .map(|generation| {
                        generation
                            .iter()
                            .map(|&value| if value.is_finite() { value } else { f64::MAX })
                            .collect()
                    })
                    .collect();
                (name.as_str(), series)
            })
            .collect();
        serde_json::to_writer_pretty(File::create(path)?, &sanitized)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genotype::Genotype;

    fn individual(fitness: f64) -> Individual {
        let mut individual = Individual::new(Genotype::empty(1, 2));
        individual.fitness = fitness;
        individual.crowding_distance = f64::INFINITY;
        individual
    }

    #[test]
    fn stores_one_entry_per_generation() {
        let mut trace = GenerationTrace::default();
        let population = vec![individual(1.0), individual(2.0)];
        trace.store_generation(&population, 0.5);
        trace.store_generation(&population, 1.0);

        assert_eq!(trace.generations(), 2);
        assert_eq!(trace.metrics["diversity"], vec![vec![0.5], vec![1.0]]);
        assert_eq!(trace.metrics["fitness"][0], vec![1.0, 2.0]);
    }

    #[test]
    fn json_round_trip_is_finite() {
        let mut trace = GenerationTrace::default();
        trace.store_generation(&[individual(1.5)], 1.0);

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("heuristic.json");
        trace.write_json(&path).expect("write");

        let parsed: serde_json::Value =
            serde_json::from_reader(std::fs::File::open(&path).expect("open")).expect("parse");
        assert!(parsed.get("diversity").is_some());
        assert!(parsed.get("crowding_distance").is_some());
        assert_eq!(parsed["fitness"][0][0], 1.5);
    }
}
