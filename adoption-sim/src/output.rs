use std::collections::BTreeMap;

use tracing::info;

use crate::agents::ConsumerAgent;
use crate::product::ProductId;

/// Reporting collaborator called by the time model.
pub trait OutputWriter {
    /// Once per agent per step, before the step's events are drained.
    fn write_consumer_agent_state(&mut self, agent: &ConsumerAgent, time: u64);

    /// Once per step, after the process model ran.
    fn write_consumer_adoption(&mut self, consumers: &[ConsumerAgent], time: u64);
}

/// Fans every call out to the subscribed writers.
#[derive(Default)]
pub struct OutputBus {
    writers: Vec<Box<dyn OutputWriter>>,
}

impl OutputBus {
    pub fn new() -> Self {
        Self { writers: Vec::new() }
    }

    /// Subscribe a new writer.
    pub fn subscribe(&mut self, writer: Box<dyn OutputWriter>) {
        self.writers.push(writer);
    }

    pub fn len(&self) -> usize {
        self.writers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writers.is_empty()
    }
}

impl OutputWriter for OutputBus {
    fn write_consumer_agent_state(&mut self, agent: &ConsumerAgent, time: u64) {
        for writer in self.writers.iter_mut() {
            writer.write_consumer_agent_state(agent, time);
        }
    }

    fn write_consumer_adoption(&mut self, consumers: &[ConsumerAgent], time: u64) {
        for writer in self.writers.iter_mut() {
            writer.write_consumer_adoption(consumers, time);
        }
    }
}

/// Adopter count per product.
pub fn adopters_per_product(consumers: &[ConsumerAgent]) -> BTreeMap<ProductId, usize> {
    let mut counts = BTreeMap::new();
    for agent in consumers {
        for adoption in agent.adoptions() {
            *counts.entry(adoption.product).or_insert(0) += 1;
        }
    }
    counts
}

/// Fraction of `population` that adopted; 0 when there is nobody to count.
pub fn adoption_share(adopters: usize, population: usize) -> f64 {
    if population == 0 {
        return 0.0;
    }
    adopters as f64 / population as f64
}

/// Logs one aggregate line per step.
#[derive(Debug, Default)]
pub struct TracingOutput;

impl OutputWriter for TracingOutput {
    fn write_consumer_agent_state(&mut self, _agent: &ConsumerAgent, _time: u64) {}

    fn write_consumer_adoption(&mut self, consumers: &[ConsumerAgent], time: u64) {
        let adopters = consumers.iter().filter(|a| !a.adoptions().is_empty()).count();
        let active_needs: usize = consumers.iter().map(|a| a.active_needs().len()).sum();
        info!(
            step = time,
            adopters,
            share = adoption_share(adopters, consumers.len()),
            active_needs,
            "adoption state"
        );
    }
}
