//! Simulation time: a wall-clock timeline of scheduled wake-ups.
//!
//! All timestamps are absolute **unix seconds** (the unit of the OD matrix,
//! shift windows, and scheduled breaks). The timeline advances by popping the
//! next scheduled wake-up; wake-ups at the same second are processed in FIFO
//! order via a monotonically increasing sequence number.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::{Entity, Resource};

/// One minute in seconds.
pub const ONE_MIN_SECS: i64 = 60;
/// One hour in seconds.
pub const ONE_HOUR_SECS: i64 = 60 * ONE_MIN_SECS;

/// Wake-up kinds, one per incident lifecycle step plus the reallocation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    AssigningAmbulance,
    DispatchingToScene,
    DispatchingToHospital,
    PreparingDispatchToDepot,
    DispatchingToDepot,
    Finishing,
    Reallocating,
}

/// Scheduled wake-up. `timestamp` is in unix seconds; `seq` orders wake-ups
/// that share a timestamp (first scheduled, first processed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: i64,
    pub kind: EventKind,
    pub subject: Option<Entity>,
    pub seq: u64,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap by timestamp; FIFO among equal timestamps.
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The wake-up currently being processed, inserted by the runner before the
/// schedule executes.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);

/// Simulation clock: pops wake-ups in timestamp order and tracks `now`.
///
/// A wake-up scheduled for an incident whose phase has since moved on (for
/// example a preempted incident) is a tombstone; the handler for the stale
/// kind observes the mismatch and ignores it.
#[derive(Debug, Clone, Resource, Default)]
pub struct SimulationClock {
    now: i64,
    next_seq: u64,
    events: BinaryHeap<Event>,
}

impl SimulationClock {
    /// Current simulation time in unix seconds (the timestamp of the last
    /// popped wake-up).
    pub fn now(&self) -> i64 {
        self.now
    }

    /// Schedule a wake-up at an absolute timestamp.
    pub fn schedule_at(&mut self, at: i64, kind: EventKind, subject: Option<Entity>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event {
            timestamp: at,
            kind,
            subject,
            seq,
        });
    }

    /// Schedule a wake-up `delta_secs` from now.
    pub fn schedule_in(&mut self, delta_secs: i64, kind: EventKind, subject: Option<Entity>) {
        self.schedule_at(self.now.saturating_add(delta_secs), kind, subject);
    }

    /// Pop the next wake-up (earliest timestamp, FIFO among ties) and advance
    /// `now` to its timestamp.
    pub fn pop_next(&mut self) -> Option<Event> {
        let event = self.events.pop()?;
        self.now = event.timestamp;
        Some(event)
    }

    /// Timestamp of the next wake-up without popping it.
    pub fn next_event_time(&self) -> Option<i64> {
        self.events.peek().map(|event| event.timestamp)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of wake-ups still queued (for tests and scenario validation).
    pub fn pending_event_count(&self) -> usize {
        self.events.len()
    }
}
