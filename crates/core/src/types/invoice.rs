//! Settlement results returned by the pricing service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One settlement unit. A single cart submission may be split into several
/// invoices; the splitting policy belongs to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Priced items grouped into this invoice, in service order.
    pub items: Vec<PricedItem>,
    /// The settlement computed for those items.
    pub result: Settlement,
}

/// A priced line inside an invoice.
///
/// The service enriches lines with display names; older deployments omit
/// them, so `name` and `category` stay optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Totals and applied discounts for one invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub original_total: Decimal,
    pub total_discount: Decimal,
    pub final_price: Decimal,
    #[serde(default)]
    pub used_discounts: Vec<UsedDiscount>,
}

/// One discount the service applied to an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsedDiscount {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
}
