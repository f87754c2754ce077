// src/scheduler.rs
// Time-ordered event queue: the only structure deciding global processing order.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::{SimError, SimResult};
use crate::events::Event;

/// Internal wrapper giving events an ordering for the BinaryHeap.
/// We want a min-heap by scheduled time (earliest events first),
/// but Rust's BinaryHeap is a max-heap, so we invert the ordering.
/// Equal times fall back to insertion order.
#[derive(Debug)]
struct ScheduledEvent {
    seq: u64,
    event: Event,
}

impl Eq for ScheduledEvent {}

impl PartialEq for ScheduledEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering: smaller time (then smaller seq) = "greater" priority
        other
            .event
            .scheduled_time()
            .total_cmp(&self.event.scheduled_time())
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Default)]
pub struct EventScheduler {
    queue: BinaryHeap<ScheduledEvent>,
    next_seq: u64,
}

impl EventScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event. Any time is accepted, including times already passed.
    pub fn schedule_event(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(ScheduledEvent { seq, event });
    }

    pub fn exists_next_event(&self) -> bool {
        !self.queue.is_empty()
    }

    /// Earliest event, left in the queue.
    pub fn top_next_event(&self) -> SimResult<&Event> {
        self.queue
            .peek()
            .map(|se| &se.event)
            .ok_or(SimError::EmptyQueue)
    }

    /// Remove and return the earliest event.
    pub fn pop_next_event(&mut self) -> SimResult<Event> {
        self.queue
            .pop()
            .map(|se| se.event)
            .ok_or(SimError::EmptyQueue)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
