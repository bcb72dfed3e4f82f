//! Run configuration, parsed from a `KEY: value` settings file.
//!
//! Every knob is a static scalar or vector; the struct is immutable after
//! load. A missing required key or an unparsable value is fatal at startup.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::tables::stations::DemographicColumn;

/// How the assigned ambulance and hospital are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchStrategyKind {
    Random,
    Closest,
}

/// Which optimizer drives the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeuristicKind {
    /// Single simulation of a fixed allocation.
    None,
    Ga,
    Nsga2,
    Ma,
    MemeticNsga2,
}

impl HeuristicKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HeuristicKind::None => "NONE",
            HeuristicKind::Ga => "GA",
            HeuristicKind::Nsga2 => "NSGA2",
            HeuristicKind::Ma => "MA",
            HeuristicKind::MemeticNsga2 => "MEMETIC_NSGA2",
        }
    }
}

/// Which urbanity flag of the incident data drives thresholds and buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrbanMethod {
    UrbanSettlement,
    UrbanSettlementSsb,
}

/// Genotype initialization flavors entered into the weighted lottery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenotypeInitKind {
    Random,
    Uniform,
    PopulationProportionate2km,
    PopulationProportionate5km,
    PopulationProportionateCluster,
    IncidentProportionate2km,
    IncidentProportionate5km,
    IncidentProportionateCluster,
}

impl GenotypeInitKind {
    /// The station column weighting the proportionate variants.
    pub fn demographic_column(self) -> Option<DemographicColumn> {
        match self {
            GenotypeInitKind::Random | GenotypeInitKind::Uniform => None,
            GenotypeInitKind::PopulationProportionate2km => {
                Some(DemographicColumn::PopulationRadius2km)
            }
            GenotypeInitKind::PopulationProportionate5km => {
                Some(DemographicColumn::PopulationRadius5km)
            }
            GenotypeInitKind::PopulationProportionateCluster => {
                Some(DemographicColumn::PopulationCluster)
            }
            GenotypeInitKind::IncidentProportionate2km => {
                Some(DemographicColumn::IncidentsRadius2km)
            }
            GenotypeInitKind::IncidentProportionate5km => {
                Some(DemographicColumn::IncidentsRadius5km)
            }
            GenotypeInitKind::IncidentProportionateCluster => {
                Some(DemographicColumn::IncidentsCluster)
            }
        }
    }
}

/// Mutation flavors entered into the weighted lottery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MutationKind {
    Redistribute,
    Swap,
    Scramble,
    NeighborDuplication,
}

/// Objectives the optimizer can track (all minimized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveKind {
    AvgResponseTimeUrbanA,
    AvgResponseTimeUrbanH,
    AvgResponseTimeUrbanV1,
    AvgResponseTimeRuralA,
    AvgResponseTimeRuralH,
    AvgResponseTimeRuralV1,
    PercentageViolations,
    PercentageViolationsUrban,
    PercentageViolationsRural,
}

impl ObjectiveKind {
    pub const ALL: [ObjectiveKind; 9] = [
        ObjectiveKind::AvgResponseTimeUrbanA,
        ObjectiveKind::AvgResponseTimeUrbanH,
        ObjectiveKind::AvgResponseTimeUrbanV1,
        ObjectiveKind::AvgResponseTimeRuralA,
        ObjectiveKind::AvgResponseTimeRuralH,
        ObjectiveKind::AvgResponseTimeRuralV1,
        ObjectiveKind::PercentageViolations,
        ObjectiveKind::PercentageViolationsUrban,
        ObjectiveKind::PercentageViolationsRural,
    ];

    pub fn trace_name(self) -> &'static str {
        match self {
            ObjectiveKind::AvgResponseTimeUrbanA => "avg_response_time_urban_a",
            ObjectiveKind::AvgResponseTimeUrbanH => "avg_response_time_urban_h",
            ObjectiveKind::AvgResponseTimeUrbanV1 => "avg_response_time_urban_v1",
            ObjectiveKind::AvgResponseTimeRuralA => "avg_response_time_rural_a",
            ObjectiveKind::AvgResponseTimeRuralH => "avg_response_time_rural_h",
            ObjectiveKind::AvgResponseTimeRuralV1 => "avg_response_time_rural_v1",
            ObjectiveKind::PercentageViolations => "percentage_violations",
            ObjectiveKind::PercentageViolationsUrban => "percentage_violations_urban",
            ObjectiveKind::PercentageViolationsRural => "percentage_violations_rural",
        }
    }
}

/// Configuration error: missing key, unknown key, or wrong value type.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    MissingKey(&'static str),
    InvalidValue { key: String, value: String },
    UnknownKey(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "cannot read settings file: {err}"),
            ConfigError::MissingKey(key) => write!(f, "missing required setting {key}"),
            ConfigError::InvalidValue { key, value } => {
                write!(f, "invalid value {value:?} for setting {key}")
            }
            ConfigError::UnknownKey(key) => write!(f, "unknown setting {key}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

/// The full configuration surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    // Optimizer sizing.
    pub population_size: usize,
    pub generation_size: usize,
    pub max_run_time_seconds: u64,
    pub parent_selection_tournament_size: usize,

    // Fleet sizing.
    pub total_ambulances_during_day: usize,
    pub total_ambulances_during_night: usize,

    // Reproduction rates.
    pub mutation_probability: f64,
    pub crossover_probability: f64,
    pub local_search_probability: f64,

    pub num_time_segments: usize,

    // Scenario date and shift window.
    pub simulate_year: i64,
    pub simulate_month: u32,
    pub simulate_day: u32,
    pub simulate_day_shift: bool,
    pub simulation_generation_window_size: u32,
    pub day_shift_start: u32,
    pub day_shift_end: u32,

    // Dispatch policy.
    pub dispatch_strategy: DispatchStrategyKind,
    pub dispatch_strategy_prioritize_triage: bool,
    pub dispatch_strategy_response_restricted: bool,
    pub schedule_breaks: bool,

    pub heuristic: HeuristicKind,

    // Weighted lotteries.
    pub genotype_init_weights: Vec<(GenotypeInitKind, f64)>,
    pub mutation_weights: Vec<(MutationKind, f64)>,

    // Objectives.
    pub objective_weights: Vec<(ObjectiveKind, f64)>,
    pub objectives: Vec<ObjectiveKind>,

    pub urban_method: UrbanMethod,
    /// Station row excluded from the depot set; negative disables.
    pub skip_station_index: i64,

    // Travel model knobs.
    pub acute_travel_factor: f64,
    pub travel_noise_clamp: bool,

    pub seed: u64,
    pub unique_run_id: String,
    pub output_dir: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            population_size: 30,
            generation_size: 50,
            max_run_time_seconds: 600,
            parent_selection_tournament_size: 3,
            total_ambulances_during_day: 45,
            total_ambulances_during_night: 29,
            mutation_probability: 0.05,
            crossover_probability: 0.9,
            local_search_probability: 0.1,
            num_time_segments: 4,
            simulate_year: 2018,
            simulate_month: 9,
            simulate_day: 10,
            simulate_day_shift: true,
            simulation_generation_window_size: 14,
            day_shift_start: 8,
            day_shift_end: 20,
            dispatch_strategy: DispatchStrategyKind::Closest,
            dispatch_strategy_prioritize_triage: false,
            dispatch_strategy_response_restricted: false,
            schedule_breaks: false,
            heuristic: HeuristicKind::Ga,
            genotype_init_weights: vec![
                (GenotypeInitKind::Random, 1.0),
                (GenotypeInitKind::Uniform, 1.0),
                (GenotypeInitKind::PopulationProportionate2km, 1.0),
                (GenotypeInitKind::PopulationProportionate5km, 1.0),
                (GenotypeInitKind::PopulationProportionateCluster, 1.0),
                (GenotypeInitKind::IncidentProportionate2km, 1.0),
                (GenotypeInitKind::IncidentProportionate5km, 1.0),
                (GenotypeInitKind::IncidentProportionateCluster, 1.0),
            ],
            mutation_weights: vec![
                (MutationKind::Redistribute, 1.0),
                (MutationKind::Swap, 1.0),
                (MutationKind::Scramble, 1.0),
                (MutationKind::NeighborDuplication, 1.0),
            ],
            objective_weights: ObjectiveKind::ALL.iter().map(|&kind| (kind, 1.0)).collect(),
            objectives: vec![
                ObjectiveKind::PercentageViolationsUrban,
                ObjectiveKind::PercentageViolationsRural,
            ],
            urban_method: UrbanMethod::UrbanSettlement,
            skip_station_index: -1,
            acute_travel_factor: crate::travel::DEFAULT_ACUTE_TRAVEL_FACTOR,
            travel_noise_clamp: false,
            seed: 0,
            unique_run_id: "run".to_string(),
            output_dir: "output".to_string(),
        }
    }
}

impl SimConfig {
    /// Fleet size for the active shift.
    pub fn fleet_size(&self) -> usize {
        if self.simulate_day_shift {
            self.total_ambulances_during_day
        } else {
            self.total_ambulances_during_night
        }
    }

    /// Parse a settings file of `KEY: value` lines. Blank lines and lines
    /// starting with `#` are skipped; unknown keys are rejected.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_str_contents(&content)
    }

    pub fn from_str_contents(content: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once(':') else {
                return Err(ConfigError::UnknownKey(line.to_string()));
            };
            values.insert(key.trim().to_string(), value.trim().to_string());
        }

        let mut config = SimConfig::default();

        macro_rules! take {
            ($key:literal, $parse:expr) => {
                match values.remove($key) {
                    Some(raw) => $parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                        key: $key.to_string(),
                        value: raw.clone(),
                    })?,
                    None => return Err(ConfigError::MissingKey($key)),
                }
            };
        }
        macro_rules! take_or {
            ($key:literal, $parse:expr, $default:expr) => {
                match values.remove($key) {
                    Some(raw) => $parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                        key: $key.to_string(),
                        value: raw.clone(),
                    })?,
                    None => $default,
                }
            };
        }

        let parse_usize = |raw: &str| raw.parse::<usize>().ok();
        let parse_u32 = |raw: &str| raw.parse::<u32>().ok();
        let parse_i64 = |raw: &str| raw.parse::<i64>().ok();
        let parse_u64 = |raw: &str| raw.parse::<u64>().ok();
        let parse_f64 = |raw: &str| raw.parse::<f64>().ok();
        let parse_bool = |raw: &str| match raw {
            "true" | "True" | "1" => Some(true),
            "false" | "False" | "0" => Some(false),
            _ => None,
        };
        let parse_string = |raw: &str| Some(raw.to_string());

        config.population_size = take!("POPULATION_SIZE", parse_usize);
        config.generation_size = take!("GENERATION_SIZE", parse_usize);
        config.max_run_time_seconds =
            take_or!("MAX_RUN_TIME_SECONDS", parse_u64, config.max_run_time_seconds);
        config.parent_selection_tournament_size = take_or!(
            "PARENT_SELECTION_TOURNAMENT_SIZE",
            parse_usize,
            config.parent_selection_tournament_size
        );
        config.total_ambulances_during_day = take!("TOTAL_AMBULANCES_DURING_DAY", parse_usize);
        config.total_ambulances_during_night = take!("TOTAL_AMBULANCES_DURING_NIGHT", parse_usize);
        config.mutation_probability = take!("MUTATION_PROBABILITY", parse_f64);
        config.crossover_probability = take!("CROSSOVER_PROBABILITY", parse_f64);
        config.local_search_probability = take_or!(
            "LOCAL_SEARCH_PROBABILITY",
            parse_f64,
            config.local_search_probability
        );
        config.num_time_segments = take!("NUM_TIME_SEGMENTS", parse_usize);
        config.simulate_year = take!("SIMULATE_YEAR", parse_i64);
        config.simulate_month = take!("SIMULATE_MONTH", parse_u32);
        config.simulate_day = take!("SIMULATE_DAY", parse_u32);
        config.simulate_day_shift = take!("SIMULATE_DAY_SHIFT", parse_bool);
        config.simulation_generation_window_size = take_or!(
            "SIMULATION_GENERATION_WINDOW_SIZE",
            parse_u32,
            config.simulation_generation_window_size
        );
        config.day_shift_start = take!("DAY_SHIFT_START", parse_u32);
        config.day_shift_end = take!("DAY_SHIFT_END", parse_u32);
        config.dispatch_strategy = take!("DISPATCH_STRATEGY", parse_strategy);
        config.dispatch_strategy_prioritize_triage =
            take_or!("DISPATCH_STRATEGY_PRIORITIZE_TRIAGE", parse_bool, false);
        config.dispatch_strategy_response_restricted =
            take_or!("DISPATCH_STRATEGY_RESPONSE_RESTRICTED", parse_bool, false);
        config.schedule_breaks = take_or!("SCHEDULE_BREAKS", parse_bool, false);
        config.heuristic = take!("HEURISTIC", parse_heuristic);
        config.urban_method = take_or!("URBAN_METHOD", parse_urban_method, config.urban_method);
        config.skip_station_index = take_or!("SKIP_STATION_INDEX", parse_i64, -1);
        config.acute_travel_factor = take_or!(
            "ACUTE_TRAVEL_FACTOR",
            parse_f64,
            config.acute_travel_factor
        );
        config.travel_noise_clamp = take_or!("TRAVEL_NOISE_CLAMP", parse_bool, false);
        config.seed = take!("SEED", parse_u64);
        config.unique_run_id = take!("UNIQUE_RUN_ID", parse_string);
        config.output_dir = take_or!("OUTPUT_DIR", parse_string, config.output_dir);
        config.objectives = take_or!("OBJECTIVES", parse_objectives, config.objectives);

        for (kind, key) in GENOTYPE_INIT_KEYS {
            if let Some(raw) = values.remove(key) {
                let weight = parse_f64(&raw).ok_or_else(|| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.clone(),
                })?;
                set_weight(&mut config.genotype_init_weights, kind, weight);
            }
        }
        for (kind, key) in MUTATION_KEYS {
            if let Some(raw) = values.remove(key) {
                let weight = parse_f64(&raw).ok_or_else(|| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.clone(),
                })?;
                set_weight(&mut config.mutation_weights, kind, weight);
            }
        }
        for (kind, key) in OBJECTIVE_WEIGHT_KEYS {
            if let Some(raw) = values.remove(key) {
                let weight = parse_f64(&raw).ok_or_else(|| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: raw.clone(),
                })?;
                set_weight(&mut config.objective_weights, kind, weight);
            }
        }

        if let Some(key) = values.into_keys().next() {
            return Err(ConfigError::UnknownKey(key));
        }

        Ok(config)
    }
}

fn set_weight<K: PartialEq + Copy>(weights: &mut Vec<(K, f64)>, kind: K, weight: f64) {
    if let Some(entry) = weights.iter_mut().find(|(candidate, _)| *candidate == kind) {
        entry.1 = weight;
    } else {
        weights.push((kind, weight));
    }
}

fn parse_strategy(raw: &str) -> Option<DispatchStrategyKind> {
    match raw {
        "RANDOM" => Some(DispatchStrategyKind::Random),
        "CLOSEST" => Some(DispatchStrategyKind::Closest),
        _ => None,
    }
}

fn parse_heuristic(raw: &str) -> Option<HeuristicKind> {
    match raw {
        "NONE" => Some(HeuristicKind::None),
        "GA" => Some(HeuristicKind::Ga),
        "NSGA2" => Some(HeuristicKind::Nsga2),
        "MA" => Some(HeuristicKind::Ma),
        "MEMETIC_NSGA2" => Some(HeuristicKind::MemeticNsga2),
        _ => None,
    }
}

fn parse_urban_method(raw: &str) -> Option<UrbanMethod> {
    match raw {
        "urban_settlement" => Some(UrbanMethod::UrbanSettlement),
        "urban_settlement_ssb" => Some(UrbanMethod::UrbanSettlementSsb),
        _ => None,
    }
}

fn parse_objective_kind(raw: &str) -> Option<ObjectiveKind> {
    match raw {
        "AVG_RESPONSE_TIME_URBAN_A" => Some(ObjectiveKind::AvgResponseTimeUrbanA),
        "AVG_RESPONSE_TIME_URBAN_H" => Some(ObjectiveKind::AvgResponseTimeUrbanH),
        "AVG_RESPONSE_TIME_URBAN_V1" => Some(ObjectiveKind::AvgResponseTimeUrbanV1),
        "AVG_RESPONSE_TIME_RURAL_A" => Some(ObjectiveKind::AvgResponseTimeRuralA),
        "AVG_RESPONSE_TIME_RURAL_H" => Some(ObjectiveKind::AvgResponseTimeRuralH),
        "AVG_RESPONSE_TIME_RURAL_V1" => Some(ObjectiveKind::AvgResponseTimeRuralV1),
        "PERCENTAGE_VIOLATIONS" => Some(ObjectiveKind::PercentageViolations),
        "PERCENTAGE_VIOLATIONS_URBAN" => Some(ObjectiveKind::PercentageViolationsUrban),
        "PERCENTAGE_VIOLATIONS_RURAL" => Some(ObjectiveKind::PercentageViolationsRural),
        _ => None,
    }
}

fn parse_objectives(raw: &str) -> Option<Vec<ObjectiveKind>> {
    raw.split(',')
        .map(|part| parse_objective_kind(part.trim()))
        .collect()
}

const GENOTYPE_INIT_KEYS: [(GenotypeInitKind, &str); 8] = [
    (GenotypeInitKind::Random, "GENOTYPE_INIT_TICKETS_RANDOM"),
    (GenotypeInitKind::Uniform, "GENOTYPE_INIT_TICKETS_UNIFORM"),
    (
        GenotypeInitKind::PopulationProportionate2km,
        "GENOTYPE_INIT_TICKETS_POPULATION_PROPORTIONATE_2KM",
    ),
    (
        GenotypeInitKind::PopulationProportionate5km,
        "GENOTYPE_INIT_TICKETS_POPULATION_PROPORTIONATE_5KM",
    ),
    (
        GenotypeInitKind::PopulationProportionateCluster,
        "GENOTYPE_INIT_TICKETS_POPULATION_PROPORTIONATE_CLUSTER",
    ),
    (
        GenotypeInitKind::IncidentProportionate2km,
        "GENOTYPE_INIT_TICKETS_INCIDENT_PROPORTIONATE_2KM",
    ),
    (
        GenotypeInitKind::IncidentProportionate5km,
        "GENOTYPE_INIT_TICKETS_INCIDENT_PROPORTIONATE_5KM",
    ),
    (
        GenotypeInitKind::IncidentProportionateCluster,
        "GENOTYPE_INIT_TICKETS_INCIDENT_PROPORTIONATE_CLUSTER",
    ),
];

const MUTATION_KEYS: [(MutationKind, &str); 4] = [
    (MutationKind::Redistribute, "MUTATION_TICKETS_REDISTRIBUTE"),
    (MutationKind::Swap, "MUTATION_TICKETS_SWAP"),
    (MutationKind::Scramble, "MUTATION_TICKETS_SCRAMBLE"),
    (
        MutationKind::NeighborDuplication,
        "MUTATION_TICKETS_NEIGHBOR_DUPLICATION",
    ),
];

const OBJECTIVE_WEIGHT_KEYS: [(ObjectiveKind, &str); 9] = [
    (
        ObjectiveKind::AvgResponseTimeUrbanA,
        "OBJECTIVE_WEIGHT_AVG_RESPONSE_TIME_URBAN_A",
    ),
    (
        ObjectiveKind::AvgResponseTimeUrbanH,
        "OBJECTIVE_WEIGHT_AVG_RESPONSE_TIME_URBAN_H",
    ),
    (
        ObjectiveKind::AvgResponseTimeUrbanV1,
        "OBJECTIVE_WEIGHT_AVG_RESPONSE_TIME_URBAN_V1",
    ),
    (
        ObjectiveKind::AvgResponseTimeRuralA,
        "OBJECTIVE_WEIGHT_AVG_RESPONSE_TIME_RURAL_A",
    ),
    (
        ObjectiveKind::AvgResponseTimeRuralH,
        "OBJECTIVE_WEIGHT_AVG_RESPONSE_TIME_RURAL_H",
    ),
    (
        ObjectiveKind::AvgResponseTimeRuralV1,
        "OBJECTIVE_WEIGHT_AVG_RESPONSE_TIME_RURAL_V1",
    ),
    (
        ObjectiveKind::PercentageViolations,
        "OBJECTIVE_WEIGHT_PERCENTAGE_VIOLATIONS",
    ),
    (
        ObjectiveKind::PercentageViolationsUrban,
        "OBJECTIVE_WEIGHT_PERCENTAGE_VIOLATIONS_URBAN",
    ),
    (
        ObjectiveKind::PercentageViolationsRural,
        "OBJECTIVE_WEIGHT_PERCENTAGE_VIOLATIONS_RURAL",
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "\
POPULATION_SIZE: 20
GENERATION_SIZE: 10
TOTAL_AMBULANCES_DURING_DAY: 45
TOTAL_AMBULANCES_DURING_NIGHT: 29
MUTATION_PROBABILITY: 0.05
CROSSOVER_PROBABILITY: 0.9
NUM_TIME_SEGMENTS: 4
SIMULATE_YEAR: 2018
SIMULATE_MONTH: 9
SIMULATE_DAY: 10
SIMULATE_DAY_SHIFT: true
DAY_SHIFT_START: 8
DAY_SHIFT_END: 20
DISPATCH_STRATEGY: CLOSEST
HEURISTIC: NSGA2
SEED: 42
UNIQUE_RUN_ID: test_run
";

    #[test]
    fn parses_minimal_settings() {
        let config = SimConfig::from_str_contents(MINIMAL).expect("parse");
        assert_eq!(config.population_size, 20);
        assert_eq!(config.dispatch_strategy, DispatchStrategyKind::Closest);
        assert_eq!(config.heuristic, HeuristicKind::Nsga2);
        assert_eq!(config.seed, 42);
        assert_eq!(config.fleet_size(), 45);
        assert_eq!(config.skip_station_index, -1);
    }

    #[test]
    fn night_shift_changes_fleet_size() {
        let content = MINIMAL.replace("SIMULATE_DAY_SHIFT: true", "SIMULATE_DAY_SHIFT: false");
        let config = SimConfig::from_str_contents(&content).expect("parse");
        assert_eq!(config.fleet_size(), 29);
    }

    #[test]
    fn missing_key_is_fatal() {
        let content = MINIMAL.replace("SEED: 42\n", "");
        assert!(matches!(
            SimConfig::from_str_contents(&content),
            Err(ConfigError::MissingKey("SEED"))
        ));
    }

    #[test]
    fn wrong_type_is_fatal() {
        let content = MINIMAL.replace("SEED: 42", "SEED: forty-two");
        assert!(matches!(
            SimConfig::from_str_contents(&content),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn unknown_key_is_fatal() {
        let content = format!("{MINIMAL}NOT_A_SETTING: 1\n");
        assert!(matches!(
            SimConfig::from_str_contents(&content),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn lottery_weights_override_defaults() {
        let content = format!(
            "{MINIMAL}MUTATION_TICKETS_SWAP: 0\nGENOTYPE_INIT_TICKETS_RANDOM: 5\n\
OBJECTIVE_WEIGHT_PERCENTAGE_VIOLATIONS: 2.5\n"
        );
        let config = SimConfig::from_str_contents(&content).expect("parse");
        let swap = config
            .mutation_weights
            .iter()
            .find(|(kind, _)| *kind == MutationKind::Swap)
            .expect("swap weight");
        assert_eq!(swap.1, 0.0);
        let random = config
            .genotype_init_weights
            .iter()
            .find(|(kind, _)| *kind == GenotypeInitKind::Random)
            .expect("random weight");
        assert_eq!(random.1, 5.0);
        let violations = config
            .objective_weights
            .iter()
            .find(|(kind, _)| *kind == ObjectiveKind::PercentageViolations)
            .expect("violations weight");
        assert_eq!(violations.1, 2.5);
    }

    #[test]
    fn parses_objective_vector() {
        let content = format!(
            "{MINIMAL}OBJECTIVES: AVG_RESPONSE_TIME_URBAN_A, PERCENTAGE_VIOLATIONS\n"
        );
        let config = SimConfig::from_str_contents(&content).expect("parse");
        assert_eq!(
            config.objectives,
            vec![
                ObjectiveKind::AvgResponseTimeUrbanA,
                ObjectiveKind::PercentageViolations
            ]
        );
    }
}
