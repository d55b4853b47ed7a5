//! Product listing with category and discount-applicability filters.

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::catalog::Catalog;
use crate::matcher;
use crate::state::AppState;

/// Filter query parameters. Empty strings mean "no filter", matching the
/// semantics of an unselected dropdown.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub category: Option<String>,
    pub discount_type: Option<String>,
}

/// Product display data.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    /// Quantity of this product currently in the cart.
    pub quantity: u32,
    /// Discount type tags that apply to this product.
    pub discount_types: Vec<String>,
}

/// Product listing plus the filter vocabulary for the UI controls.
#[derive(Debug, Serialize)]
pub struct ProductListView {
    pub products: Vec<ProductView>,
    pub categories: Vec<String>,
    pub discount_types: Vec<String>,
}

/// Build the filtered, annotated product views.
fn product_views(
    catalog: &Catalog,
    cart_lines: &[CartLine],
    category: Option<&str>,
    discount_type: Option<&str>,
) -> Vec<ProductView> {
    let quantity_of = |id: &str| {
        cart_lines
            .iter()
            .find(|line| line.product_id == id)
            .map_or(0, |line| line.quantity)
    };

    matcher::filter_products(catalog.products(), category, discount_type, catalog.discounts())
        .into_iter()
        .map(|product| ProductView {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            price: product.price,
            quantity: quantity_of(&product.id),
            discount_types: matcher::discount_types_for(catalog.discounts(), product),
        })
        .collect()
}

/// List products, filtered by category and/or applicable discount type.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Json<ProductListView> {
    let catalog = state.catalog();
    let cart_lines = state.simulator().cart_lines().await;

    let products = product_views(
        catalog,
        &cart_lines,
        query.category.as_deref(),
        query.discount_type.as_deref(),
    );

    Json(ProductListView {
        products,
        categories: catalog.categories(),
        discount_types: catalog.discount_types(),
    })
}

#[cfg(test)]
mod tests {
    use cartlab_core::{DiscountRule, Product};

    use super::*;

    fn catalog() -> Catalog {
        let products = vec![
            Product {
                id: "P001".to_string(),
                name: "Widget".to_string(),
                category: "tools".to_string(),
                price: Decimal::from(100),
            },
            Product {
                id: "P002".to_string(),
                name: "Snack".to_string(),
                category: "food".to_string(),
                price: Decimal::from(50),
            },
        ];
        let rules = vec![DiscountRule {
            id: "D001".to_string(),
            kind: "bundle".to_string(),
            description: String::new(),
            product_id: None,
            items: Some(vec!["P001".to_string()]),
            category: None,
        }];
        Catalog::new(products, rules)
    }

    #[test]
    fn annotates_products_with_cart_quantity_and_discount_tags() {
        let catalog = catalog();
        let lines = vec![CartLine {
            product_id: "P001".to_string(),
            quantity: 2,
        }];

        let views = product_views(&catalog, &lines, None, None);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].quantity, 2);
        assert_eq!(views[0].discount_types, vec!["bundle"]);
        assert_eq!(views[1].quantity, 0);
        assert!(views[1].discount_types.is_empty());
    }

    #[test]
    fn applies_discount_type_filter() {
        let catalog = catalog();

        let views = product_views(&catalog, &[], None, Some("bundle"));
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].id, "P001");
    }
}
