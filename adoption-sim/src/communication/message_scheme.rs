// src/communication/message_scheme.rs
// Policies producing the messages a company sends in one advertisement round.

use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::index;
use rand::Rng;

use crate::agents::company::CompanyView;
use crate::agents::Agent;
use crate::context::SimulationContext;
use crate::distribution::CountDistribution;
use crate::error::{SimError, SimResult};
use crate::messages::{AgentId, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSchemeKind {
    Empty,
    Default,
    Uniform,
}

impl FromStr for MessageSchemeKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "empty" | "none" => Ok(MessageSchemeKind::Empty),
            "default" => Ok(MessageSchemeKind::Default),
            "uniform" => Ok(MessageSchemeKind::Uniform),
            _ => Err(SimError::UnknownScheme(s.to_string())),
        }
    }
}

/// Preference pushed by every default-scheme message round.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceImpact {
    pub preference: String,
    pub amount: f64,
}

/// Reaches a sampled number of consumers with noisy attribute values.
#[derive(Debug)]
pub struct DefaultMessageScheme {
    targets: CountDistribution,
    /// Relative noise: observed = true * (1 + u), u uniform in [-noise, noise].
    noise: f64,
    preference: Option<PreferenceImpact>,
    rng: StdRng,
}

impl DefaultMessageScheme {
    pub fn new(
        targets: CountDistribution,
        noise: f64,
        preference: Option<PreferenceImpact>,
        rng: StdRng,
    ) -> SimResult<Self> {
        targets.validate()?;
        if !noise.is_finite() || noise < 0.0 {
            return Err(SimError::InvalidParameter(format!(
                "message noise must be finite and >= 0, got {noise}"
            )));
        }
        if let Some(p) = &preference {
            if !p.amount.is_finite() {
                return Err(SimError::InvalidParameter(format!(
                    "preference increase for '{}' must be finite",
                    p.preference
                )));
            }
        }
        Ok(Self {
            targets,
            noise,
            preference,
            rng,
        })
    }

    fn create_messages(&mut self, sender: &CompanyView<'_>, ctx: &SimulationContext) -> SimResult<Vec<Message>> {
        let population = ctx.consumers.len();
        let wanted = self.targets.sample(&mut self.rng)? as usize;
        let amount = wanted.min(population);
        if amount == 0 {
            return Ok(Vec::new());
        }

        // Resolve the portfolio first so a bad product id fails before any sampling.
        let mut products = Vec::with_capacity(sender.portfolio.len());
        for id in sender.portfolio {
            products.push(ctx.products.product(*id)?);
        }

        let chosen = index::sample(&mut self.rng, population, amount);
        let mut messages = Vec::new();
        for idx in chosen.iter() {
            let target = ctx.consumers[idx].id();
            for product in &products {
                for (attribute, value) in &product.attributes {
                    let observed = self.perturb(*value);
                    messages.push(Message::attribute_perception(
                        sender.id,
                        target,
                        product.id,
                        attribute.clone(),
                        observed,
                    ));
                }
            }
            if let Some(p) = &self.preference {
                messages.push(Message::preference_increase(
                    sender.id,
                    target,
                    p.preference.clone(),
                    p.amount,
                ));
            }
        }
        Ok(messages)
    }

    fn perturb(&mut self, value: f64) -> f64 {
        if self.noise == 0.0 {
            return value;
        }
        let u = self.rng.gen_range(-self.noise..=self.noise);
        value * (1.0 + u)
    }
}

#[derive(Debug)]
pub enum MessageScheme {
    /// Sends nothing.
    Empty,
    /// Sampled targets, noisy values, delivered at the current time.
    Default(DefaultMessageScheme),
    /// One true-value message per (product, attribute, consumer) triple,
    /// delivered one time unit later.
    ///
    /// Cost is O(products x attributes x consumers) messages per round.
    Uniform,
}

impl MessageScheme {
    pub fn create_messages(&mut self, sender: &CompanyView<'_>, ctx: &SimulationContext) -> SimResult<Vec<Message>> {
        match self {
            MessageScheme::Empty => Ok(Vec::new()),
            MessageScheme::Default(scheme) => scheme.create_messages(sender, ctx),
            MessageScheme::Uniform => uniform_messages(sender, ctx),
        }
    }

    /// Time at which messages created at `now` are delivered.
    pub fn delivery_time(&self, now: f64) -> f64 {
        match self {
            MessageScheme::Uniform => now + 1.0,
            MessageScheme::Empty | MessageScheme::Default(_) => now,
        }
    }
}

fn uniform_messages(sender: &CompanyView<'_>, ctx: &SimulationContext) -> SimResult<Vec<Message>> {
    let targets: Vec<AgentId> = ctx
        .consumers
        .iter()
        .map(|c| c.id())
        .filter(|id| *id != sender.id)
        .collect();

    let mut messages = Vec::new();
    for id in sender.portfolio {
        let product = ctx.products.product(*id)?;
        messages.reserve(product.attributes.len() * targets.len());
        for (attribute, value) in &product.attributes {
            for target in &targets {
                messages.push(Message::attribute_perception(
                    sender.id,
                    *target,
                    product.id,
                    attribute.clone(),
                    *value,
                ));
            }
        }
    }
    Ok(messages)
}
