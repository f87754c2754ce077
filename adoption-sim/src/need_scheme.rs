// src/need_scheme.rs
// Policies turning agent/need state into newly scheduled need events.

use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::agents::{Agent, ConsumerAgent};
use crate::context::SimulationContext;
use crate::error::{SimError, SimResult};
use crate::events::NeedEvent;
use crate::messages::AgentId;
use crate::need::{Need, NeedIndicatorMap};
use crate::product::ProductId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedSchemeKind {
    /// Every unsatisfied need is emitted; indicators only rank needs.
    Deterministic,
    /// Each unsatisfied need is emitted with probability equal to its indicator.
    Stochastic,
}

impl FromStr for NeedSchemeKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deterministic" => Ok(NeedSchemeKind::Deterministic),
            "stochastic" => Ok(NeedSchemeKind::Stochastic),
            _ => Err(SimError::UnknownScheme(s.to_string())),
        }
    }
}

impl fmt::Display for NeedSchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeedSchemeKind::Deterministic => f.write_str("deterministic"),
            NeedSchemeKind::Stochastic => f.write_str("stochastic"),
        }
    }
}

#[derive(Debug)]
pub struct NeedDevelopmentScheme {
    kind: NeedSchemeKind,
    indicators: NeedIndicatorMap,
    rng: StdRng,
}

impl NeedDevelopmentScheme {
    pub fn new(kind: NeedSchemeKind, indicators: NeedIndicatorMap, rng: StdRng) -> Self {
        Self {
            kind,
            indicators,
            rng,
        }
    }

    /// Build from a configuration identifier. Unknown identifiers fail.
    /// Without a seed the random source is seeded from OS entropy.
    pub fn from_identifier(id: &str, indicators: NeedIndicatorMap, seed: Option<u64>) -> SimResult<Self> {
        let kind = id.parse::<NeedSchemeKind>()?;
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self::new(kind, indicators, rng))
    }

    /// Need events for every simulation need the agent has not satisfied,
    /// scheduled at the current simulation time.
    pub fn create_need_events(&mut self, ctx: &SimulationContext, agent: &ConsumerAgent) -> Vec<NeedEvent> {
        let time = ctx.now();
        let candidates: Vec<&Need> = ctx
            .needs
            .iter()
            .filter(|need| !agent.is_need_satisfied(need, &ctx.products))
            .collect();
        self.emit(candidates, agent.id(), time)
    }

    /// Need events after `expired_product` ran out: only needs of its group
    /// that no other adopted product still satisfies.
    pub fn product_expiration(
        &mut self,
        ctx: &SimulationContext,
        expired_product: ProductId,
        agent: &ConsumerAgent,
        time: f64,
    ) -> SimResult<Vec<NeedEvent>> {
        let group = ctx.products.group_of(expired_product)?;
        let candidates: Vec<&Need> = group
            .needs
            .iter()
            .filter(|need| !agent.is_need_satisfied_excluding(need, &ctx.products, Some(expired_product)))
            .collect();
        Ok(self.emit(candidates, agent.id(), time))
    }

    /// All needs of the indicator map, highest indicator first. Ties are
    /// ordered by need name.
    pub fn sort_needs_by_need_indicator_value(&self) -> Vec<Need> {
        let mut needs: Vec<(&Need, f64)> = self.indicators.iter().collect();
        needs.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        needs.into_iter().map(|(n, _)| n.clone()).collect()
    }

    fn emit(&mut self, candidates: Vec<&Need>, agent: AgentId, time: f64) -> Vec<NeedEvent> {
        let mut events: Vec<NeedEvent> = Vec::with_capacity(candidates.len());
        for need in candidates {
            if events.iter().any(|e| &e.need == need) {
                continue;
            }
            if self.should_emit(need) {
                events.push(NeedEvent::new(time, agent, need.clone()));
            }
        }
        events
    }

    fn should_emit(&mut self, need: &Need) -> bool {
        match self.kind {
            NeedSchemeKind::Deterministic => true,
            NeedSchemeKind::Stochastic => {
                let p = self.indicators.value_or_zero(need);
                // gen::<f64>() is in [0, 1): p = 0 never fires, p = 1 always does.
                self.rng.gen::<f64>() < p
            }
        }
    }
}
