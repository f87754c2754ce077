// src/scenarios/mod.rs
// Build a ready-to-run simulation from a JSON scenario.

use std::collections::HashSet;
use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::agents::{CompanyAgent, ConsumerAgent};
use crate::communication::{AdvertisementScheme, DefaultMessageScheme, MessageScheme, MessageSchemeKind, PreferenceImpact};
use crate::config::{AdvertisementConfig, SimConfig};
use crate::context::SimulationContext;
use crate::error::{SimError, SimResult};
use crate::need::{Need, NeedIndicatorMap};
use crate::need_scheme::NeedDevelopmentScheme;
use crate::process_model::{NeedDrivenProcessModel, ProcessModel, ProcessModelKind};
use crate::product::{Product, ProductGroup, ProductRegistry};

/// Locate a scenario by name or path.
pub fn find_config_file(scenario: &str) -> Option<String> {
    let candidates = [
        scenario.to_string(),
        format!("{}.json", scenario),
        format!("scenarios/{}.json", scenario),
        format!("adoption-sim/scenarios/{}.json", scenario),
    ];

    candidates.into_iter().find(|path| Path::new(path).is_file())
}

/// Read a scenario. A missing or malformed file is an error.
pub fn load_scenario(scenario: &str) -> SimResult<SimConfig> {
    let path = find_config_file(scenario).ok_or_else(|| {
        SimError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("scenario '{scenario}' not found"),
        ))
    })?;
    info!(path = %path, "[Scenario] found config");
    SimConfig::from_file(&path)
}

/// RNG for the `k`-th stochastic component.
pub fn component_rng(seed: Option<u64>, k: u64) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(k)),
        None => StdRng::from_entropy(),
    }
}

fn known_need(needs: &[Need], name: &str) -> SimResult<Need> {
    let need = Need::new(name);
    if needs.contains(&need) {
        Ok(need)
    } else {
        Err(SimError::UnknownNeed(name.to_string()))
    }
}

fn build_products(cfg: &SimConfig, needs: &[Need]) -> SimResult<ProductRegistry> {
    let mut registry = ProductRegistry::new();
    for group in &cfg.product_groups {
        let group_needs = group
            .needs
            .iter()
            .map(|n| known_need(needs, n))
            .collect::<SimResult<Vec<_>>>()?;
        registry.add_group(ProductGroup::new(group.id, group.name.clone(), group_needs));
    }
    for p in &cfg.products {
        let mut product = Product::new(p.id, p.name.clone(), p.group);
        for (attr, value) in &p.attributes {
            product = product.with_attribute(attr.clone(), *value);
        }
        if let Some(lifetime) = p.lifetime_steps {
            product = product.with_lifetime(lifetime);
        }
        // Price is needed for every adoption decision; fail now rather than mid-run.
        product.price()?;
        registry.add_product(product)?;
    }
    Ok(registry)
}

fn build_consumers(cfg: &SimConfig) -> SimResult<Vec<ConsumerAgent>> {
    let c = &cfg.consumers;
    (0..c.count)
        .map(|i| {
            let id = c.first_id.checked_add(i).ok_or_else(|| {
                SimError::InvalidParameter(format!(
                    "{} consumers starting at id {} exceed the id range",
                    c.count, c.first_id
                ))
            })?;
            Ok(ConsumerAgent::new(id, format!("{}_{}", c.name_prefix, i)).with_preferences(c.preferences.clone()))
        })
        .collect()
}

fn build_advertisement(ad: &AdvertisementConfig, rng: StdRng) -> SimResult<AdvertisementScheme> {
    let scheme = match ad.scheme.parse::<MessageSchemeKind>()? {
        MessageSchemeKind::Empty => MessageScheme::Empty,
        MessageSchemeKind::Uniform => MessageScheme::Uniform,
        MessageSchemeKind::Default => {
            let preference = ad.preference.as_ref().map(|p| PreferenceImpact {
                preference: p.name.clone(),
                amount: p.increase,
            });
            MessageScheme::Default(DefaultMessageScheme::new(ad.targets.clone(), ad.noise, preference, rng)?)
        }
    };
    Ok(AdvertisementScheme::new(scheme))
}

fn build_companies(cfg: &SimConfig, products: &ProductRegistry) -> SimResult<Vec<CompanyAgent>> {
    cfg.companies
        .iter()
        .enumerate()
        .map(|(i, c)| {
            for product in &c.portfolio {
                products.product(*product)?;
            }
            // k = 0 is the need scheme.
            let rng = component_rng(cfg.seed, i as u64 + 1);
            let advertisement = build_advertisement(&c.advertisement, rng)?;
            Ok(CompanyAgent::new(c.id, c.name.clone(), c.portfolio.clone(), advertisement))
        })
        .collect()
}

fn check_unique_agent_ids(consumers: &[ConsumerAgent], companies: &[CompanyAgent]) -> SimResult<()> {
    use crate::agents::Agent;

    let mut seen = HashSet::new();
    let ids = consumers
        .iter()
        .map(|a| a.id())
        .chain(companies.iter().map(|c| c.id()));
    for id in ids {
        if !seen.insert(id) {
            return Err(SimError::InvalidParameter(format!("duplicate agent id {id}")));
        }
    }
    Ok(())
}

/// Populated context for `cfg`. Every identifier and reference is checked.
pub fn build_context(cfg: &SimConfig) -> SimResult<SimulationContext> {
    let needs: Vec<Need> = cfg.needs.iter().map(Need::new).collect();
    let products = build_products(cfg, &needs)?;
    let consumers = build_consumers(cfg)?;
    let companies = build_companies(cfg, &products)?;
    check_unique_agent_ids(&consumers, &companies)?;

    let mut ctx = SimulationContext::new(products, needs);
    ctx.consumers = consumers;
    ctx.companies = companies;
    Ok(ctx)
}

pub fn build_need_scheme(cfg: &SimConfig) -> SimResult<NeedDevelopmentScheme> {
    let needs: Vec<Need> = cfg.needs.iter().map(Need::new).collect();
    let mut indicators = NeedIndicatorMap::new();
    for (name, value) in &cfg.need_development.indicators {
        indicators.insert(known_need(&needs, name)?, *value)?;
    }
    NeedDevelopmentScheme::from_identifier(&cfg.need_development.scheme, indicators, cfg.seed)
}

pub fn build_process_model(cfg: &SimConfig) -> SimResult<Box<dyn ProcessModel>> {
    let pm = &cfg.process_model;
    for (name, value) in [
        ("adoption_threshold", pm.adoption_threshold),
        ("price_sensitivity", pm.price_sensitivity),
    ] {
        if !value.is_finite() {
            return Err(SimError::InvalidParameter(format!("{name} must be finite, got {value}")));
        }
    }
    match pm.model.parse::<ProcessModelKind>()? {
        ProcessModelKind::NeedDriven => {
            let scheme = build_need_scheme(cfg)?;
            Ok(Box::new(NeedDrivenProcessModel::new(
                scheme,
                pm.adoption_threshold,
                pm.price_sensitivity,
            )))
        }
    }
}
