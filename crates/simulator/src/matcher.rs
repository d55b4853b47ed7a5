//! Discount-applicability matching.
//!
//! Pure functions re-run on every product-list render; identical inputs
//! must produce identical output.

use std::collections::HashSet;

use cartlab_core::{DiscountRule, Product};

/// Product ids at least one rule of `discount_type` applies to.
///
/// Each rule of the requested type contributes every id in its `items`
/// set, every product whose category equals the rule's `category`, and its
/// exact `product_id`. A rule with none of the three contributes nothing.
#[must_use]
pub fn applicable_product_ids(
    rules: &[DiscountRule],
    discount_type: &str,
    products: &[Product],
) -> HashSet<String> {
    let mut ids = HashSet::new();
    for rule in rules.iter().filter(|rule| rule.kind == discount_type) {
        if let Some(items) = &rule.items {
            ids.extend(items.iter().cloned());
        }
        if let Some(category) = &rule.category {
            ids.extend(
                products
                    .iter()
                    .filter(|product| product.category == *category)
                    .map(|product| product.id.clone()),
            );
        }
        if let Some(product_id) = &rule.product_id {
            ids.insert(product_id.clone());
        }
    }
    ids
}

/// Products passing the combined category and discount-type filters.
///
/// An empty or unselected discount type bypasses the matcher entirely: all
/// products are eligible. The same applies to the category filter.
#[must_use]
pub fn filter_products<'a>(
    products: &'a [Product],
    category: Option<&str>,
    discount_type: Option<&str>,
    rules: &[DiscountRule],
) -> Vec<&'a Product> {
    let category = category.filter(|value| !value.is_empty());
    let discount_ids = discount_type
        .filter(|value| !value.is_empty())
        .map(|value| applicable_product_ids(rules, value, products));

    products
        .iter()
        .filter(|product| {
            category.is_none_or(|value| product.category == value)
                && discount_ids.as_ref().is_none_or(|ids| ids.contains(&product.id))
        })
        .collect()
}

/// Discount type tags that apply to one product, sorted and deduped.
///
/// Shown next to each product in the listing.
#[must_use]
pub fn discount_types_for(rules: &[DiscountRule], product: &Product) -> Vec<String> {
    let mut kinds: Vec<String> = rules
        .iter()
        .filter(|rule| rule.applies_to(product))
        .map(|rule| rule.kind.clone())
        .collect();
    kinds.sort();
    kinds.dedup();
    kinds
}
