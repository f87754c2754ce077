use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::agents::Agent;
use crate::messages::{AgentId, Message, MessagePayload};
use crate::need::Need;
use crate::product::{ProductId, ProductRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Adoption {
    pub product: ProductId,
    pub adopted_at: u64,
}

/// Running sum of observations for one (product, attribute) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Perception {
    sum: f64,
    count: u32,
}

impl Perception {
    fn observe(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// `None` until at least one observation was made.
    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(self.sum / self.count as f64)
    }
}

#[derive(Debug, Clone)]
pub struct ConsumerAgent {
    id: AgentId,
    name: String,
    adoptions: Vec<Adoption>,
    active_needs: BTreeSet<Need>,
    perceptions: BTreeMap<(ProductId, String), Perception>,
    preferences: BTreeMap<String, f64>,
    messages_received: u64,
}

impl ConsumerAgent {
    pub fn new(id: AgentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            adoptions: Vec::new(),
            active_needs: BTreeSet::new(),
            perceptions: BTreeMap::new(),
            preferences: BTreeMap::new(),
            messages_received: 0,
        }
    }

    pub fn with_preferences(mut self, preferences: BTreeMap<String, f64>) -> Self {
        self.preferences = preferences
            .into_iter()
            .map(|(k, v)| (k, v.clamp(0.0, 1.0)))
            .collect();
        self
    }

    // ---- adoptions ----

    pub fn adoptions(&self) -> &[Adoption] {
        &self.adoptions
    }

    pub fn has_adopted(&self, product: ProductId) -> bool {
        self.adoptions.iter().any(|a| a.product == product)
    }

    pub fn adopt(&mut self, product: ProductId, time: u64) {
        if !self.has_adopted(product) {
            self.adoptions.push(Adoption {
                product,
                adopted_at: time,
            });
        }
    }

    pub fn remove_adoption(&mut self, product: ProductId) -> Option<Adoption> {
        let idx = self.adoptions.iter().position(|a| a.product == product)?;
        Some(self.adoptions.remove(idx))
    }

    /// True if an adopted product other than `excluding` belongs to a group
    /// satisfying `need`.
    pub fn is_need_satisfied_excluding(
        &self,
        need: &Need,
        products: &ProductRegistry,
        excluding: Option<ProductId>,
    ) -> bool {
        self.adoptions
            .iter()
            .filter(|a| Some(a.product) != excluding)
            .filter_map(|a| products.group_of(a.product).ok())
            .any(|g| g.satisfies(need))
    }

    pub fn is_need_satisfied(&self, need: &Need, products: &ProductRegistry) -> bool {
        self.is_need_satisfied_excluding(need, products, None)
    }

    // ---- needs ----

    pub fn active_needs(&self) -> &BTreeSet<Need> {
        &self.active_needs
    }

    pub fn has_active_need(&self, need: &Need) -> bool {
        self.active_needs.contains(need)
    }

    /// Returns false if the need was already active.
    pub fn activate_need(&mut self, need: Need) -> bool {
        self.active_needs.insert(need)
    }

    pub fn deactivate_need(&mut self, need: &Need) -> bool {
        self.active_needs.remove(need)
    }

    // ---- perceptions & preferences ----

    pub fn perceive(&mut self, product: ProductId, attribute: &str, value: f64) {
        self.perceptions
            .entry((product, attribute.to_string()))
            .or_default()
            .observe(value);
    }

    /// Mean of all observations of the attribute, `None` if never observed.
    pub fn perceived_value(&self, product: ProductId, attribute: &str) -> Option<f64> {
        self.perceptions
            .get(&(product, attribute.to_string()))
            .and_then(Perception::mean)
    }

    pub fn preference(&self, name: &str) -> f64 {
        self.preferences.get(name).copied().unwrap_or(0.0)
    }

    pub fn increase_preference(&mut self, name: &str, amount: f64) {
        let entry = self.preferences.entry(name.to_string()).or_insert(0.0);
        *entry = (*entry + amount).clamp(0.0, 1.0);
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received
    }
}

impl Agent for ConsumerAgent {
    fn id(&self) -> AgentId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn on_message(&mut self, msg: &Message) {
        self.messages_received += 1;
        match &msg.payload {
            MessagePayload::AttributePerception(p) => {
                self.perceive(p.product, &p.attribute, p.value);
            }
            MessagePayload::PreferenceIncrease(p) => {
                self.increase_preference(&p.preference, p.amount);
            }
        }
        debug!(agent = self.id, from = msg.from, kind = %msg.msg_type(), "message received");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::{Product, ProductGroup};

    #[test]
    fn perception_without_observations_is_none() {
        let mut agent = ConsumerAgent::new(1, "c1");
        assert_eq!(agent.perceived_value(7, "quality"), None);

        agent.perceive(7, "quality", 0.2);
        agent.perceive(7, "quality", 0.6);
        let mean = agent.perceived_value(7, "quality").unwrap();
        assert!((mean - 0.4).abs() < 1e-12);
    }

    #[test]
    fn messages_update_perceptions_and_preferences() {
        let mut agent = ConsumerAgent::new(1, "c1");
        agent.on_message(&Message::attribute_perception(9, 1, 3, "quality", 0.8));
        agent.on_message(&Message::preference_increase(9, 1, "eco", 0.7));
        agent.on_message(&Message::preference_increase(9, 1, "eco", 0.7));

        assert_eq!(agent.perceived_value(3, "quality"), Some(0.8));
        assert_eq!(agent.preference("eco"), 1.0);
        assert_eq!(agent.messages_received(), 3);
    }

    #[test]
    fn satisfaction_can_exclude_a_product() {
        let mut products = ProductRegistry::new();
        products.add_group(ProductGroup::new(1, "heating", vec![Need::new("warmth")]));
        products.add_product(Product::new(10, "stove", 1)).unwrap();
        products.add_product(Product::new(11, "heat pump", 1)).unwrap();

        let mut agent = ConsumerAgent::new(1, "c1");
        let warmth = Need::new("warmth");
        assert!(!agent.is_need_satisfied(&warmth, &products));

        agent.adopt(10, 0);
        agent.adopt(10, 3);
        assert_eq!(agent.adoptions().len(), 1);
        assert!(agent.is_need_satisfied(&warmth, &products));
        assert!(!agent.is_need_satisfied_excluding(&warmth, &products, Some(10)));

        agent.adopt(11, 4);
        assert!(agent.is_need_satisfied_excluding(&warmth, &products, Some(10)));
    }
}
