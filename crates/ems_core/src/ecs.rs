//! Entity Component System: components and state enums for incidents and
//! ambulances.
//!
//! - **Components**: [`Incident`], [`Ambulance`]
//! - **State enums**: [`IncidentPhase`], [`Triage`]
//! - **Metric store**: [`IncidentMetrics`] with one fixed key per lifecycle
//!   stage
//!
//! Components are attached to entities in the ECS world; the per-wake-up
//! systems query and mutate them. An incident's `phase` is its lifecycle
//! stage; `Closed` is terminal.

use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};

use crate::clock::ONE_HOUR_SECS;
use crate::grid::GridId;

/// Seconds of unavailability for one scheduled ambulance break.
pub const BREAK_LENGTH_SECS: i64 = 30 * 60;

/// Call acuity. `Acute` outranks `Urgent` outranks `Scheduled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Triage {
    /// "A": immediate, life-threatening.
    Acute,
    /// "H": urgent.
    Urgent,
    /// "V1": scheduled / low priority.
    Scheduled,
}

impl Triage {
    pub fn as_str(self) -> &'static str {
        match self {
            Triage::Acute => "A",
            Triage::Urgent => "H",
            Triage::Scheduled => "V1",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "A" => Some(Triage::Acute),
            "H" => Some(Triage::Urgent),
            "V1" => Some(Triage::Scheduled),
            _ => None,
        }
    }

    /// True when `self` is strictly more acute than `other`.
    pub fn outranks(self, other: Triage) -> bool {
        match self {
            Triage::Acute => other != Triage::Acute,
            Triage::Urgent => other == Triage::Scheduled,
            Triage::Scheduled => false,
        }
    }
}

/// Incident lifecycle stage. Travel stages are entered when the timer has
/// already been advanced past the leg, so a stage is observable for the whole
/// duration of its leg (which is what availability checks and mid-trip
/// preemption look at).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentPhase {
    AssigningAmbulance,
    DispatchingToScene,
    DispatchingToHospital,
    PreparingDispatchToDepot,
    DispatchingToDepot,
    Finished,
    Closed,
}

/// Fixed metric keys, one per lifecycle stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    IncidentCreation,
    ResourceAppointment,
    ResourcePreparingDeparture,
    DispatchingToScene,
    AtScene,
    DispatchingToHospital,
    AtHospital,
    DispatchingToDepot,
}

impl MetricKind {
    /// Metrics during which the assigned ambulance is tied up and cannot be
    /// reassigned without preemption.
    pub fn is_ambulance_busy(self) -> bool {
        matches!(
            self,
            MetricKind::ResourcePreparingDeparture
                | MetricKind::DispatchingToScene
                | MetricKind::AtScene
                | MetricKind::DispatchingToHospital
                | MetricKind::AtHospital
        )
    }

    /// Column name used in events.csv.
    pub fn column_name(self) -> &'static str {
        match self {
            MetricKind::IncidentCreation => "duration_incident_creation",
            MetricKind::ResourceAppointment => "duration_resource_appointment",
            MetricKind::ResourcePreparingDeparture => "duration_resource_preparing_departure",
            MetricKind::DispatchingToScene => "duration_dispatching_to_scene",
            MetricKind::AtScene => "duration_at_scene",
            MetricKind::DispatchingToHospital => "duration_dispatching_to_hospital",
            MetricKind::AtHospital => "duration_at_hospital",
            MetricKind::DispatchingToDepot => "duration_dispatching_to_depot",
        }
    }
}

/// Accumulated seconds per lifecycle stage for one incident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentMetrics {
    pub incident_creation: i64,
    pub resource_appointment: i64,
    pub resource_preparing_departure: i64,
    pub dispatching_to_scene: i64,
    pub at_scene: i64,
    pub dispatching_to_hospital: i64,
    pub at_hospital: i64,
    pub dispatching_to_depot: i64,
}

impl IncidentMetrics {
    pub fn add(&mut self, kind: MetricKind, seconds: i64) {
        match kind {
            MetricKind::IncidentCreation => self.incident_creation += seconds,
            MetricKind::ResourceAppointment => self.resource_appointment += seconds,
            MetricKind::ResourcePreparingDeparture => self.resource_preparing_departure += seconds,
            MetricKind::DispatchingToScene => self.dispatching_to_scene += seconds,
            MetricKind::AtScene => self.at_scene += seconds,
            MetricKind::DispatchingToHospital => self.dispatching_to_hospital += seconds,
            MetricKind::AtHospital => self.at_hospital += seconds,
            MetricKind::DispatchingToDepot => self.dispatching_to_depot += seconds,
        }
    }

    pub fn get(&self, kind: MetricKind) -> i64 {
        match kind {
            MetricKind::IncidentCreation => self.incident_creation,
            MetricKind::ResourceAppointment => self.resource_appointment,
            MetricKind::ResourcePreparingDeparture => self.resource_preparing_departure,
            MetricKind::DispatchingToScene => self.dispatching_to_scene,
            MetricKind::AtScene => self.at_scene,
            MetricKind::DispatchingToHospital => self.dispatching_to_hospital,
            MetricKind::AtHospital => self.at_hospital,
            MetricKind::DispatchingToDepot => self.dispatching_to_depot,
        }
    }

    /// Time from call pickup until the ambulance reached the scene.
    pub fn response_time(&self) -> i64 {
        self.incident_creation
            + self.resource_appointment
            + self.resource_preparing_departure
            + self.dispatching_to_scene
    }

    pub fn total(&self) -> i64 {
        self.incident_creation
            + self.resource_appointment
            + self.resource_preparing_departure
            + self.dispatching_to_scene
            + self.at_scene
            + self.dispatching_to_hospital
            + self.at_hospital
            + self.dispatching_to_depot
    }
}

/// One emergency incident working its way through the lifecycle.
#[derive(Debug, Clone, Component)]
pub struct Incident {
    pub id: u32,
    pub phase: IncidentPhase,
    /// Wall-clock time this incident is due to be processed next.
    pub timer: i64,
    /// Timer value before the last advance (departure time while on a travel
    /// leg).
    pub prev_timer: i64,
    pub assigned_ambulance: Option<Entity>,
    /// Stations-row index of the depot whose allocation served this incident.
    pub responsible_depot: Option<usize>,
    pub triage: Triage,
    /// Current target cell of the assigned ambulance (scene, hospital, or
    /// depot depending on phase).
    pub grid_id: GridId,
    /// Cell where the incident happened.
    pub incident_grid: GridId,
    pub urban: bool,
    /// Absolute time the call was received.
    pub call_received: i64,
    pub wait_prepare_departure: i64,
    /// `None` means the patient was not transported (cancelled on scene).
    pub wait_departure_scene: Option<i64>,
    /// Wait before the ambulance frees up at its last stop (hospital handover
    /// or on-scene closure). `None` when the record carries no value.
    pub wait_available: Option<i64>,
    pub metrics: IncidentMetrics,
    /// Travel seconds already added to the timer for the leg in progress,
    /// charged to the matching metric when the arrival is processed.
    pub pending_travel: i64,
}

impl Incident {
    /// Advance the timer by `seconds`, optionally charging a metric. Busy
    /// metrics also accrue on the assigned ambulance's unavailable time.
    pub fn advance(
        &mut self,
        seconds: i64,
        metric: Option<MetricKind>,
        ambulance: Option<&mut Ambulance>,
    ) {
        self.prev_timer = self.timer;
        self.timer += seconds;
        if let Some(kind) = metric {
            self.metrics.add(kind, seconds);
            if kind.is_ambulance_busy() {
                if let Some(ambulance) = ambulance {
                    ambulance.time_unavailable += seconds;
                }
            }
        }
    }

    /// Charge a metric without touching the timer (used when an arrival is
    /// processed for a leg whose travel time was advanced on entry).
    pub fn charge(
        &mut self,
        seconds: i64,
        metric: MetricKind,
        ambulance: Option<&mut Ambulance>,
    ) {
        self.metrics.add(metric, seconds);
        if metric.is_ambulance_busy() {
            if let Some(ambulance) = ambulance {
                ambulance.time_unavailable += seconds;
            }
        }
    }

    pub fn response_time(&self) -> i64 {
        self.metrics.response_time()
    }
}

/// One ambulance in the roster.
#[derive(Debug, Clone, Component)]
pub struct Ambulance {
    pub id: u32,
    /// Stations-row index of the depot this ambulance is allocated to. May
    /// change mid-run through reallocation; the vehicle follows on its next
    /// return leg.
    pub allocated_depot: usize,
    pub current_grid: GridId,
    pub assigned_incident: Option<Entity>,
    /// Cumulative seconds spent serving incidents.
    pub time_unavailable: i64,
    /// Cumulative seconds spent on breaks.
    pub time_not_working: i64,
    /// Wall-clock timestamps at which a break window opens, earliest first.
    pub scheduled_breaks: Vec<i64>,
    pub break_started: i64,
    /// 0 when not on a break.
    pub break_length: i64,
}

impl Ambulance {
    pub fn new(id: u32, allocated_depot: usize, current_grid: GridId) -> Self {
        Self {
            id,
            allocated_depot,
            current_grid,
            assigned_incident: None,
            time_unavailable: 0,
            time_not_working: 0,
            scheduled_breaks: Vec::new(),
            break_started: 0,
            break_length: 0,
        }
    }

    /// Start the next scheduled break if its window has opened.
    pub fn check_scheduled_break(&mut self, now: i64) {
        if let Some(&next) = self.scheduled_breaks.first() {
            if now >= next {
                self.break_started = now;
                self.break_length = BREAK_LENGTH_SECS;
                self.scheduled_breaks.remove(0);
            }
        }
    }

    /// Availability check with break side effects: an idle ambulance whose
    /// break window has opened enters the break here, and a finished break is
    /// closed out (crediting `time_not_working`) here.
    ///
    /// `assigned` carries the phase and triage of the incident this ambulance
    /// is currently serving, if any.
    pub fn is_available(
        &mut self,
        assigned: Option<(IncidentPhase, Triage)>,
        now: i64,
        incoming_triage: Triage,
        prioritize_triage: bool,
    ) -> bool {
        if self.break_length == 0 {
            if assigned.is_none() {
                self.check_scheduled_break(now);
            } else if self.scheduled_breaks.first().is_some_and(|&next| now >= next) {
                // Overdue for a break while busy: not eligible for another run.
                return false;
            }
        }

        if self.break_length != 0 {
            if now >= self.break_started + self.break_length {
                self.time_not_working += now - self.break_started;
                self.break_started = 0;
                self.break_length = 0;
                return true;
            }
            return false;
        }

        let Some((phase, triage)) = assigned else {
            return true;
        };

        if phase == IncidentPhase::DispatchingToDepot {
            return true;
        }

        if phase == IncidentPhase::DispatchingToScene
            && prioritize_triage
            && incoming_triage.outranks(triage)
        {
            return true;
        }

        false
    }

    /// Lay out two staggered breaks inside the shift: at least an hour after
    /// start, an hour before end, and four hours apart, offset per vehicle so
    /// a depot's crews do not all leave at once.
    pub fn schedule_breaks(
        &mut self,
        shift_start: i64,
        shift_end: i64,
        depot_size: usize,
        depot_number: usize,
    ) {
        let first_hour_end = shift_start + ONE_HOUR_SECS;
        let last_hour_start = shift_end - ONE_HOUR_SECS;
        let min_break_interval: i64 = 4 * ONE_HOUR_SECS;

        let depot_size = depot_size.max(1) as i64;
        let mut break1 = first_hour_end
            + (depot_number as i64 % depot_size) * (min_break_interval / depot_size);
        if break1 > last_hour_start - BREAK_LENGTH_SECS {
            break1 = first_hour_end;
        }

        let mut break2 = break1 + min_break_interval;
        if break2 + BREAK_LENGTH_SECS > last_hour_start {
            break2 = last_hour_start - BREAK_LENGTH_SECS;
        }

        self.scheduled_breaks.push(break1);
        self.scheduled_breaks.push(break2);
    }
}
