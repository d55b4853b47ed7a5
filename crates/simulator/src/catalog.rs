//! Session catalog: products and discount rules.
//!
//! Loaded once at startup, all-or-nothing, and never mutated afterwards.
//! Everything downstream (filters, cart projections, views) borrows from
//! this one copy.

use std::collections::HashMap;

use thiserror::Error;

use cartlab_core::{DiscountRule, Product};

use crate::settlement::{SettlementApi, SettlementError};

/// Catalog load failure. Fatal at startup: without a catalog no product
/// list can ever be shown.
#[derive(Debug, Error)]
#[error("catalog load failed: {0}")]
pub struct CatalogError(#[from] SettlementError);

/// Products and discount rules for one session.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    discounts: Vec<DiscountRule>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Fetch products and discount rules from the settlement service.
    ///
    /// # Errors
    ///
    /// Fails if either fetch fails; no partial state is retained.
    pub async fn load(api: &dyn SettlementApi) -> Result<Self, CatalogError> {
        let (products, discounts) =
            tokio::try_join!(api.fetch_products(), api.fetch_discounts())?;
        Ok(Self::new(products, discounts))
    }

    /// Build a catalog from already-fetched data.
    #[must_use]
    pub fn new(products: Vec<Product>, discounts: Vec<DiscountRule>) -> Self {
        let index = products
            .iter()
            .enumerate()
            .map(|(position, product)| (product.id.clone(), position))
            .collect();
        Self {
            products,
            discounts,
            index,
        }
    }

    /// Look up a product by id.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.index.get(id).and_then(|&position| self.products.get(position))
    }

    /// All products, in load order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// All discount rules, in load order.
    #[must_use]
    pub fn discounts(&self) -> &[DiscountRule] {
        &self.discounts
    }

    /// Distinct product categories, sorted. Feeds the category filter
    /// control.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .products
            .iter()
            .map(|product| product.category.clone())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    /// Distinct discount rule types, sorted. Feeds the discount-type filter
    /// control.
    #[must_use]
    pub fn discount_types(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.discounts.iter().map(|rule| rule.kind.clone()).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}
