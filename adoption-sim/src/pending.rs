use std::collections::HashSet;

use crate::messages::AgentId;
use crate::need::Need;

/// Index of (agent, need) pairs with a need event still in the queue.
#[derive(Debug, Default)]
pub struct PendingNeedIndex {
    pending: HashSet<(AgentId, Need)>,
}

impl PendingNeedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the pair was already pending.
    pub fn insert(&mut self, agent: AgentId, need: &Need) -> bool {
        self.pending.insert((agent, need.clone()))
    }

    pub fn remove(&mut self, agent: AgentId, need: &Need) -> bool {
        self.pending.remove(&(agent, need.clone()))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
