use crate::agents::{Adoption, ConsumerAgent};
use crate::product::{Product, ProductId, ProductRegistry};

pub fn is_expired(adoption: &Adoption, product: &Product, now: u64) -> bool {
    match product.lifetime_steps {
        Some(lifetime) => now >= adoption.adopted_at.saturating_add(lifetime),
        None => false,
    }
}

/// Products adopted by `agent` whose lifetime has run out at `now`.
/// Adoptions of products missing from the registry never expire.
pub fn expired_products(agent: &ConsumerAgent, products: &ProductRegistry, now: u64) -> Vec<ProductId> {
    agent
        .adoptions()
        .iter()
        .filter(|a| {
            products
                .product(a.product)
                .map(|p| is_expired(a, p, now))
                .unwrap_or(false)
        })
        .map(|a| a.product)
        .collect()
}
