// src/context.rs
// Shared simulation state, handed explicitly to every operation.

use tracing::debug;

use crate::agents::{Agent, CompanyAgent, ConsumerAgent};
use crate::events::{Event, NeedEvent};
use crate::messages::AgentId;
use crate::need::Need;
use crate::pending::PendingNeedIndex;
use crate::product::ProductRegistry;
use crate::scheduler::EventScheduler;

#[derive(Debug)]
pub struct SimulationContext {
    /// Current simulation time.
    pub time: f64,
    pub scheduler: EventScheduler,
    pub pending_needs: PendingNeedIndex,
    pub consumers: Vec<ConsumerAgent>,
    pub companies: Vec<CompanyAgent>,
    pub products: ProductRegistry,
    /// Needs known to the simulation, without duplicates.
    pub needs: Vec<Need>,
}

impl SimulationContext {
    pub fn new(products: ProductRegistry, needs: Vec<Need>) -> Self {
        let mut unique: Vec<Need> = Vec::with_capacity(needs.len());
        for need in needs {
            if !unique.contains(&need) {
                unique.push(need);
            }
        }
        Self {
            time: 0.0,
            scheduler: EventScheduler::new(),
            pending_needs: PendingNeedIndex::new(),
            consumers: Vec::new(),
            companies: Vec::new(),
            products,
            needs: unique,
        }
    }

    pub fn now(&self) -> f64 {
        self.time
    }

    pub fn consumer(&self, id: AgentId) -> Option<&ConsumerAgent> {
        self.consumers.iter().find(|a| a.id() == id)
    }

    /// Any agent, consumer or company, by id.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut dyn Agent> {
        if let Some(idx) = self.consumers.iter().position(|a| a.id() == id) {
            return Some(&mut self.consumers[idx] as &mut dyn Agent);
        }
        self.companies
            .iter_mut()
            .find(|c| c.id() == id)
            .map(|c| c as &mut dyn Agent)
    }

    pub fn schedule_event(&mut self, event: Event) {
        self.scheduler.schedule_event(event);
    }

    /// Schedule need events, skipping (agent, need) pairs that already have
    /// one queued. Returns how many were scheduled.
    pub fn schedule_need_events(&mut self, events: Vec<NeedEvent>) -> usize {
        let mut scheduled = 0;
        for ev in events {
            if !self.pending_needs.insert(ev.agent, &ev.need) {
                debug!(agent = ev.agent, need = %ev.need, "need event already pending");
                continue;
            }
            self.scheduler.schedule_event(Event::Need(ev));
            scheduled += 1;
        }
        scheduled
    }
}
