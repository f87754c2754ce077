// src/process_model.rs
// Per-step decision processing over the consumer population.

use std::str::FromStr;

use tracing::debug;

use crate::agents::{Agent, ConsumerAgent};
use crate::context::SimulationContext;
use crate::error::{SimError, SimResult};
use crate::expiration;
use crate::need::Need;
use crate::need_scheme::NeedDevelopmentScheme;
use crate::product::{Product, ProductRegistry, PRICE_ATTRIBUTE};

/// Collaborator invoked once per step, after the step's events were drained.
pub trait ProcessModel {
    fn name(&self) -> &str;

    /// Called once before the first step. Returns how many events it scheduled.
    fn initialize(&mut self, _ctx: &mut SimulationContext) -> SimResult<usize> {
        Ok(0)
    }

    fn process_consumer_agents(&mut self, ctx: &mut SimulationContext, time: u64) -> SimResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessModelKind {
    NeedDriven,
}

impl FromStr for ProcessModelKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "need_driven" | "needdriven" => Ok(ProcessModelKind::NeedDriven),
            _ => Err(SimError::UnknownProcessModel(s.to_string())),
        }
    }
}

/// Counters for a single step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepStats {
    pub expirations: usize,
    pub adoptions: usize,
    pub need_events: usize,
    pub messages: usize,
}

/// Consumers act on their active needs by adopting the product with the best
/// perceived utility, provided it clears the adoption threshold.
#[derive(Debug)]
pub struct NeedDrivenProcessModel {
    need_scheme: NeedDevelopmentScheme,
    adoption_threshold: f64,
    price_sensitivity: f64,
    last_step: StepStats,
}

impl NeedDrivenProcessModel {
    pub fn new(need_scheme: NeedDevelopmentScheme, adoption_threshold: f64, price_sensitivity: f64) -> Self {
        Self {
            need_scheme,
            adoption_threshold,
            price_sensitivity,
            last_step: StepStats::default(),
        }
    }

    pub fn last_step(&self) -> StepStats {
        self.last_step
    }

    /// Preference-weighted perceived attributes minus the weighted price.
    /// Attributes the agent never perceived contribute nothing.
    pub fn utility(&self, agent: &ConsumerAgent, product: &Product) -> SimResult<f64> {
        let price = product.price()?;
        let benefit: f64 = product
            .attributes
            .keys()
            .filter(|attr| attr.as_str() != PRICE_ATTRIBUTE)
            .filter_map(|attr| {
                agent
                    .perceived_value(product.id, attr)
                    .map(|v| agent.preference(attr) * v)
            })
            .sum();
        Ok(benefit - self.price_sensitivity * price)
    }

    fn expire_adoptions(&mut self, ctx: &mut SimulationContext, time: u64) -> SimResult<usize> {
        let mut expired_count = 0;
        for idx in 0..ctx.consumers.len() {
            let expired = expiration::expired_products(&ctx.consumers[idx], &ctx.products, time);
            for product in expired {
                ctx.consumers[idx].remove_adoption(product);
                expired_count += 1;
                let events =
                    self.need_scheme
                        .product_expiration(ctx, product, &ctx.consumers[idx], time as f64)?;
                debug!(agent = ctx.consumers[idx].id(), product, needs = events.len(), "adoption expired");
                ctx.schedule_need_events(events);
            }
        }
        Ok(expired_count)
    }

    /// Active needs in the order they are acted upon: ranked by indicator,
    /// needs without an indicator last.
    fn ordered_needs(&self, agent: &ConsumerAgent, ranking: &[Need]) -> Vec<Need> {
        let active = agent.active_needs();
        let mut ordered: Vec<Need> = ranking.iter().filter(|n| active.contains(*n)).cloned().collect();
        ordered.extend(active.iter().filter(|n| !ranking.contains(*n)).cloned());
        ordered
    }

    fn best_candidate<'a>(
        &self,
        agent: &ConsumerAgent,
        products: &'a ProductRegistry,
        need: &'a Need,
    ) -> SimResult<Option<(&'a Product, f64)>> {
        let mut best: Option<(&Product, f64)> = None;
        for product in products.products_for_need(need) {
            if agent.has_adopted(product.id) {
                continue;
            }
            let utility = self.utility(agent, product)?;
            if best.map(|(_, u)| utility > u).unwrap_or(true) {
                best = Some((product, utility));
            }
        }
        Ok(best)
    }

    fn decide_adoptions(&mut self, ctx: &mut SimulationContext, time: u64) -> SimResult<usize> {
        let ranking = self.need_scheme.sort_needs_by_need_indicator_value();
        let SimulationContext {
            consumers, products, ..
        } = ctx;

        let mut adoptions = 0;
        for agent in consumers.iter_mut() {
            for need in self.ordered_needs(agent, &ranking) {
                if !agent.has_active_need(&need) {
                    continue;
                }
                let Some((product, utility)) = self.best_candidate(agent, products, &need)? else {
                    continue;
                };
                if utility < self.adoption_threshold {
                    continue;
                }
                agent.adopt(product.id, time);
                adoptions += 1;
                for satisfied in &products.group(product.group)?.needs {
                    agent.deactivate_need(satisfied);
                }
                debug!(agent = agent.id(), product = product.id, utility, "product adopted");
            }
        }
        Ok(adoptions)
    }

    fn develop_needs(&mut self, ctx: &mut SimulationContext) -> usize {
        let mut scheduled = 0;
        for idx in 0..ctx.consumers.len() {
            if !ctx.consumers[idx].active_needs().is_empty() {
                continue;
            }
            let events = self.need_scheme.create_need_events(ctx, &ctx.consumers[idx]);
            scheduled += ctx.schedule_need_events(events);
        }
        scheduled
    }

    fn advertise(ctx: &mut SimulationContext) -> SimResult<usize> {
        // Companies are moved out while they schedule into the shared context.
        let mut companies = std::mem::take(&mut ctx.companies);
        let mut total = 0;
        let mut result = Ok(());
        for company in companies.iter_mut() {
            match company.advertise(ctx) {
                Ok(n) => total += n,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        ctx.companies = companies;
        result.map(|_| total)
    }
}

impl ProcessModel for NeedDrivenProcessModel {
    fn name(&self) -> &str {
        "need_driven"
    }

    fn initialize(&mut self, ctx: &mut SimulationContext) -> SimResult<usize> {
        Ok(self.develop_needs(ctx))
    }

    fn process_consumer_agents(&mut self, ctx: &mut SimulationContext, time: u64) -> SimResult<()> {
        let expirations = self.expire_adoptions(ctx, time)?;
        let adoptions = self.decide_adoptions(ctx, time)?;
        let need_events = self.develop_needs(ctx);
        let messages = Self::advertise(ctx)?;

        self.last_step = StepStats {
            expirations,
            adoptions,
            need_events,
            messages,
        };
        debug!(
            step = time,
            expirations, adoptions, need_events, messages, "consumer agents processed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::CompanyAgent;
    use crate::communication::{AdvertisementScheme, MessageScheme};
    use crate::need::NeedIndicatorMap;
    use crate::need_scheme::NeedSchemeKind;
    use crate::product::ProductGroup;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::BTreeMap;

    fn context() -> SimulationContext {
        let mut products = ProductRegistry::new();
        products.add_group(ProductGroup::new(1, "heating", vec![Need::new("warmth")]));
        products
            .add_product(
                Product::new(10, "stove", 1)
                    .with_attribute("price", 1.0)
                    .with_attribute("quality", 0.4)
                    .with_lifetime(2),
            )
            .unwrap();
        products
            .add_product(
                Product::new(11, "heat pump", 1)
                    .with_attribute("price", 2.0)
                    .with_attribute("quality", 0.9),
            )
            .unwrap();
        let mut ctx = SimulationContext::new(products, vec![Need::new("warmth")]);
        let prefs = BTreeMap::from([("quality".to_string(), 1.0)]);
        ctx.consumers.push(ConsumerAgent::new(1, "c1").with_preferences(prefs));
        ctx
    }

    fn model(threshold: f64) -> NeedDrivenProcessModel {
        let indicators = NeedIndicatorMap::from_pairs([("warmth", 1.0)]).unwrap();
        let scheme = NeedDevelopmentScheme::new(NeedSchemeKind::Deterministic, indicators, StdRng::seed_from_u64(5));
        NeedDrivenProcessModel::new(scheme, threshold, 0.1)
    }

    #[test]
    fn unknown_process_model_is_rejected() {
        assert!(matches!(
            "gut_feeling".parse::<ProcessModelKind>(),
            Err(SimError::UnknownProcessModel(_))
        ));
        assert_eq!("need_driven".parse::<ProcessModelKind>().unwrap(), ProcessModelKind::NeedDriven);
    }

    #[test]
    fn utility_ignores_unperceived_attributes() {
        let ctx = context();
        let model = model(0.0);
        let mut agent = ctx.consumers[0].clone();
        let pump = ctx.products.product(11).unwrap();

        let u = model.utility(&agent, pump).unwrap();
        assert!((u - (-0.2)).abs() < 1e-12);

        agent.perceive(11, "quality", 0.9);
        let u = model.utility(&agent, pump).unwrap();
        assert!((u - 0.7).abs() < 1e-12);
    }

    #[test]
    fn missing_price_is_a_configuration_error() {
        let mut products = ProductRegistry::new();
        products.add_group(ProductGroup::new(1, "heating", vec![Need::new("warmth")]));
        products.add_product(Product::new(10, "free stove", 1)).unwrap();
        let mut ctx = SimulationContext::new(products, vec![Need::new("warmth")]);
        let mut agent = ConsumerAgent::new(1, "c1");
        agent.activate_need(Need::new("warmth"));
        ctx.consumers.push(agent);

        let err = model(0.0).process_consumer_agents(&mut ctx, 0).unwrap_err();
        assert!(matches!(err, SimError::MissingAttribute { product: 10, .. }));
    }

    #[test]
    fn best_perceived_product_is_adopted_and_need_cleared() {
        let mut ctx = context();
        ctx.consumers[0].activate_need(Need::new("warmth"));
        ctx.consumers[0].perceive(10, "quality", 0.4);
        ctx.consumers[0].perceive(11, "quality", 0.9);

        let mut model = model(0.1);
        model.process_consumer_agents(&mut ctx, 0).unwrap();

        let agent = &ctx.consumers[0];
        assert!(agent.has_adopted(11));
        assert!(!agent.has_adopted(10));
        assert!(agent.active_needs().is_empty());
        assert_eq!(model.last_step().adoptions, 1);
        // Need is satisfied, so no new need events.
        assert_eq!(model.last_step().need_events, 0);
    }

    #[test]
    fn below_threshold_keeps_need_active() {
        let mut ctx = context();
        ctx.consumers[0].activate_need(Need::new("warmth"));
        let mut model = model(0.5);
        model.process_consumer_agents(&mut ctx, 0).unwrap();
        assert!(ctx.consumers[0].adoptions().is_empty());
        assert!(ctx.consumers[0].has_active_need(&Need::new("warmth")));
    }

    #[test]
    fn idle_unsatisfied_agents_develop_needs() {
        let mut ctx = context();
        ctx.time = 3.0;
        let mut model = model(0.5);
        model.process_consumer_agents(&mut ctx, 3).unwrap();
        assert_eq!(model.last_step().need_events, 1);
        assert_eq!(ctx.scheduler.top_next_event().unwrap().scheduled_time(), 3.0);

        // Still pending: a second round does not double-schedule.
        model.process_consumer_agents(&mut ctx, 3).unwrap();
        assert_eq!(ctx.scheduler.len(), 1);
    }

    #[test]
    fn initialize_seeds_needs_at_current_time() {
        let mut ctx = context();
        let mut model = model(0.0);
        assert_eq!(model.initialize(&mut ctx).unwrap(), 1);
        let ev = ctx.scheduler.top_next_event().unwrap();
        assert_eq!(ev.scheduled_time(), 0.0);
    }

    #[test]
    fn expired_adoption_reschedules_need() {
        let mut ctx = context();
        ctx.consumers[0].adopt(10, 0);
        let mut model = model(10.0);

        model.process_consumer_agents(&mut ctx, 1).unwrap();
        assert!(ctx.consumers[0].has_adopted(10));
        assert!(ctx.scheduler.is_empty());

        model.process_consumer_agents(&mut ctx, 2).unwrap();
        assert!(!ctx.consumers[0].has_adopted(10));
        assert_eq!(model.last_step().expirations, 1);
        let ev = ctx.scheduler.pop_next_event().unwrap();
        assert_eq!(ev.scheduled_time(), 2.0);
    }

    #[test]
    fn companies_advertise_each_round() {
        let mut ctx = context();
        ctx.companies.push(CompanyAgent::new(
            100,
            "acme",
            vec![10, 11],
            AdvertisementScheme::new(MessageScheme::Uniform),
        ));
        let mut model = model(10.0);
        ctx.consumers[0].adopt(11, 0);

        model.process_consumer_agents(&mut ctx, 0).unwrap();
        // 2 products x 2 attributes x 1 consumer
        assert_eq!(model.last_step().messages, 4);
        assert_eq!(ctx.companies.len(), 1);
        assert_eq!(ctx.scheduler.len(), 4);
    }
}
