// src/events.rs
// Closed set of simulation events and their processing.

use tracing::{debug, warn};

use crate::agents::Agent;
use crate::context::SimulationContext;
use crate::messages::{AgentId, Message};
use crate::need::Need;

/// "This agent may now act on this need."
#[derive(Debug, Clone, PartialEq)]
pub struct NeedEvent {
    pub time: f64,
    pub agent: AgentId,
    pub need: Need,
}

impl NeedEvent {
    pub fn new(time: f64, agent: AgentId, need: Need) -> Self {
        Self { time, agent, need }
    }
}

/// Delivery of a message between agents.
#[derive(Debug, Clone, PartialEq)]
pub struct CommunicationEvent {
    pub time: f64,
    pub message: Message,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Need(NeedEvent),
    Communication(CommunicationEvent),
}

/// What processing an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    /// The need was satisfied or already active by the time the event ran.
    Stale,
    /// Addressed to an agent that does not exist.
    Undeliverable,
}

impl Event {
    pub fn need(time: f64, agent: AgentId, need: Need) -> Self {
        Event::Need(NeedEvent::new(time, agent, need))
    }

    pub fn communication(time: f64, message: Message) -> Self {
        Event::Communication(CommunicationEvent { time, message })
    }

    pub fn scheduled_time(&self) -> f64 {
        match self {
            Event::Need(e) => e.time,
            Event::Communication(e) => e.time,
        }
    }

    /// Process the event against the context. Consumes the event.
    pub fn process(self, ctx: &mut SimulationContext) -> EventOutcome {
        match self {
            Event::Need(ev) => process_need(ev, ctx),
            Event::Communication(ev) => process_communication(ev, ctx),
        }
    }
}

impl From<NeedEvent> for Event {
    fn from(ev: NeedEvent) -> Self {
        Event::Need(ev)
    }
}

fn process_need(ev: NeedEvent, ctx: &mut SimulationContext) -> EventOutcome {
    ctx.pending_needs.remove(ev.agent, &ev.need);

    let SimulationContext {
        consumers, products, ..
    } = ctx;
    let Some(agent) = consumers.iter_mut().find(|a| a.id() == ev.agent) else {
        warn!(agent = ev.agent, need = %ev.need, "need event for unknown agent dropped");
        return EventOutcome::Undeliverable;
    };

    // Another trigger may have handled this need since scheduling.
    if agent.is_need_satisfied(&ev.need, products) || !agent.activate_need(ev.need.clone()) {
        debug!(agent = ev.agent, need = %ev.need, "stale need event skipped");
        return EventOutcome::Stale;
    }

    debug!(agent = ev.agent, need = %ev.need, t = ev.time, "need activated");
    EventOutcome::Applied
}

fn process_communication(ev: CommunicationEvent, ctx: &mut SimulationContext) -> EventOutcome {
    let msg = ev.message;
    match ctx.agent_mut(msg.to) {
        Some(agent) => {
            agent.on_message(&msg);
            EventOutcome::Applied
        }
        None => {
            warn!(from = msg.from, to = msg.to, kind = %msg.msg_type(), "message for unknown agent dropped");
            EventOutcome::Undeliverable
        }
    }
}
