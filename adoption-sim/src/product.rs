// src/product.rs
// Products, product groups and the registry the simulation looks them up in.

use std::collections::BTreeMap;

use crate::error::{SimError, SimResult};
use crate::need::Need;

pub type ProductId = u32;
pub type ProductGroupId = u32;

pub const PRICE_ATTRIBUTE: &str = "price";

/// A group of interchangeable products and the needs they satisfy.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductGroup {
    pub id: ProductGroupId,
    pub name: String,
    pub needs: Vec<Need>,
}

impl ProductGroup {
    pub fn new(id: ProductGroupId, name: impl Into<String>, needs: Vec<Need>) -> Self {
        Self {
            id,
            name: name.into(),
            needs,
        }
    }

    pub fn satisfies(&self, need: &Need) -> bool {
        self.needs.contains(need)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub group: ProductGroupId,
    /// Attribute name -> true value. Ordered so enumeration is stable.
    pub attributes: BTreeMap<String, f64>,
    /// Number of steps an adoption lasts; `None` never expires.
    pub lifetime_steps: Option<u64>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, group: ProductGroupId) -> Self {
        Self {
            id,
            name: name.into(),
            group,
            attributes: BTreeMap::new(),
            lifetime_steps: None,
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: f64) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    pub fn with_lifetime(mut self, steps: u64) -> Self {
        self.lifetime_steps = Some(steps);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<f64> {
        self.attributes.get(name).copied()
    }

    pub fn price(&self) -> SimResult<f64> {
        self.attribute(PRICE_ATTRIBUTE)
            .ok_or_else(|| SimError::MissingAttribute {
                product: self.id,
                attribute: PRICE_ATTRIBUTE.to_string(),
            })
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProductRegistry {
    groups: BTreeMap<ProductGroupId, ProductGroup>,
    products: BTreeMap<ProductId, Product>,
}

impl ProductRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_group(&mut self, group: ProductGroup) {
        self.groups.insert(group.id, group);
    }

    /// Register a product. Its group must already be known.
    pub fn add_product(&mut self, product: Product) -> SimResult<()> {
        if !self.groups.contains_key(&product.group) {
            return Err(SimError::UnknownProductGroup(product.group));
        }
        self.products.insert(product.id, product);
        Ok(())
    }

    pub fn product(&self, id: ProductId) -> SimResult<&Product> {
        self.products.get(&id).ok_or(SimError::UnknownProduct(id))
    }

    pub fn group(&self, id: ProductGroupId) -> SimResult<&ProductGroup> {
        self.groups.get(&id).ok_or(SimError::UnknownProductGroup(id))
    }

    /// Group of the given product.
    pub fn group_of(&self, product: ProductId) -> SimResult<&ProductGroup> {
        let product = self.product(product)?;
        self.group(product.group)
    }

    /// Products whose group satisfies `need`.
    pub fn products_for_need<'a>(&'a self, need: &'a Need) -> impl Iterator<Item = &'a Product> + 'a {
        self.products.values().filter(move |p| {
            self.groups
                .get(&p.group)
                .map(|g| g.satisfies(need))
                .unwrap_or(false)
        })
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
