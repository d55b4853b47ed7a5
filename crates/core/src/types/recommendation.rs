//! Add-on recommendation payloads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::invoice::{Invoice, UsedDiscount};

/// One ranked add-on candidate from the scoring endpoint.
///
/// `name` and `score` are always present; the remaining fields are
/// enrichment that newer service versions include.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAddon {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addon_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub used_discounts: Vec<UsedDiscount>,
}

/// Response envelope of the ranked recommendation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAddonResponse {
    pub recommendations: Vec<RankedAddon>,
}

/// Single best pick with settlements before and after adding it to the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddonComparison {
    /// Recommended product id; `None` when the service has no pick.
    #[serde(default)]
    pub addon_id: Option<String>,
    #[serde(default)]
    pub before: Vec<Invoice>,
    #[serde(default)]
    pub after: Vec<Invoice>,
}

/// A recommendation result, shaped by the configured endpoint variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum Recommendation {
    /// Ranked candidate list.
    Ranked { recommendations: Vec<RankedAddon> },
    /// Single best pick with before/after settlement comparison.
    BestPick { comparison: AddonComparison },
}
