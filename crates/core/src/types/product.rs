//! Catalog products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product in the session catalog.
///
/// The catalog is loaded once at startup and never mutated, so products can
/// be shared freely by reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product id (e.g. "P001").
    pub id: String,
    /// Display name.
    pub name: String,
    /// Category tag, matched by category filters and category-scoped
    /// discount rules.
    pub category: String,
    /// Unit price, non-negative.
    pub price: Decimal,
}
