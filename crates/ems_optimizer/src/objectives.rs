//! Objective scalars computed from one simulation run.

use serde::{Deserialize, Serialize};

use ems_core::config::ObjectiveKind;
use ems_core::ecs::Triage;
use ems_core::metrics::{average_response_time, response_time_violations, SimulatedIncident};
use ems_core::scenario::ShiftWindow;

/// The nine tracked objectives, all minimized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSet {
    pub avg_response_time_urban_a: f64,
    pub avg_response_time_urban_h: f64,
    pub avg_response_time_urban_v1: f64,
    pub avg_response_time_rural_a: f64,
    pub avg_response_time_rural_h: f64,
    pub avg_response_time_rural_v1: f64,
    pub percentage_violations: f64,
    pub percentage_violations_urban: f64,
    pub percentage_violations_rural: f64,
}

impl ObjectiveSet {
    /// Compute every objective over the processed incidents, optionally
    /// restricted to one allocation segment.
    pub fn compute(
        incidents: &[SimulatedIncident],
        shift: &ShiftWindow,
        segment: Option<usize>,
    ) -> Self {
        ObjectiveSet {
            avg_response_time_urban_a: average_response_time(
                incidents,
                Triage::Acute,
                true,
                shift,
                segment,
            ),
            avg_response_time_urban_h: average_response_time(
                incidents,
                Triage::Urgent,
                true,
                shift,
                segment,
            ),
            avg_response_time_urban_v1: average_response_time(
                incidents,
                Triage::Scheduled,
                true,
                shift,
                segment,
            ),
            avg_response_time_rural_a: average_response_time(
                incidents,
                Triage::Acute,
                false,
                shift,
                segment,
            ),
            avg_response_time_rural_h: average_response_time(
                incidents,
                Triage::Urgent,
                false,
                shift,
                segment,
            ),
            avg_response_time_rural_v1: average_response_time(
                incidents,
                Triage::Scheduled,
                false,
                shift,
                segment,
            ),
            percentage_violations: response_time_violations(incidents, shift, segment, None, None),
            percentage_violations_urban: response_time_violations(
                incidents,
                shift,
                segment,
                Some(true),
                None,
            ),
            percentage_violations_rural: response_time_violations(
                incidents,
                shift,
                segment,
                Some(false),
                None,
            ),
        }
    }

    pub fn get(&self, kind: ObjectiveKind) -> f64 {
        match kind {
            ObjectiveKind::AvgResponseTimeUrbanA => self.avg_response_time_urban_a,
            ObjectiveKind::AvgResponseTimeUrbanH => self.avg_response_time_urban_h,
            ObjectiveKind::AvgResponseTimeUrbanV1 => self.avg_response_time_urban_v1,
            ObjectiveKind::AvgResponseTimeRuralA => self.avg_response_time_rural_a,
            ObjectiveKind::AvgResponseTimeRuralH => self.avg_response_time_rural_h,
            ObjectiveKind::AvgResponseTimeRuralV1 => self.avg_response_time_rural_v1,
            ObjectiveKind::PercentageViolations => self.percentage_violations,
            ObjectiveKind::PercentageViolationsUrban => self.percentage_violations_urban,
            ObjectiveKind::PercentageViolationsRural => self.percentage_violations_rural,
        }
    }
}

/// Weighted-sum aggregation of the objective scalars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveWeights {
    weights: Vec<(ObjectiveKind, f64)>,
}

impl ObjectiveWeights {
    pub fn new(weights: Vec<(ObjectiveKind, f64)>) -> Self {
        ObjectiveWeights { weights }
    }

    pub fn weighted_sum(&self, objectives: &ObjectiveSet) -> f64 {
        self.weights
            .iter()
            .map(|&(kind, weight)| objectives.get(kind) * weight)
            .sum()
    }
}

/// Inversion used by the non-dominated machinery: smaller losses map to
/// larger values in (0, 1].
pub fn inverse_fitness(value: f64) -> f64 {
    1.0 / (1.0 + value)
}
