//! Discount rules and their applicability predicate.

use serde::{Deserialize, Serialize};

use crate::types::product::Product;

/// A discount rule advertised by the settlement service.
///
/// Only the identification and targeting fields matter on this side of the
/// wire; the thresholds, amounts, and stacking flags that drive the remote
/// computation are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountRule {
    /// Unique rule id (e.g. "D001").
    pub id: String,
    /// Rule type tag (e.g. "bundle", "category", "item").
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable description. Absent in some source data.
    #[serde(default)]
    pub description: String,
    /// Exact product this rule targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    /// Set of product ids this rule targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<String>>,
    /// Category this rule targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl DiscountRule {
    /// Whether this rule targets the given product, by exact id, by
    /// membership in `items`, or by category.
    ///
    /// A rule with no `product_id`, no `items`, and no `category` targets
    /// nothing.
    #[must_use]
    pub fn applies_to(&self, product: &Product) -> bool {
        if self.product_id.as_deref() == Some(product.id.as_str()) {
            return true;
        }
        if let Some(items) = &self.items
            && items.iter().any(|id| *id == product.id)
        {
            return true;
        }
        self.category.as_deref() == Some(product.category.as_str())
    }
}
