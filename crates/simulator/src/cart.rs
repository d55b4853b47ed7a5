//! Cart store: the only user-mutated state.

use thiserror::Error;

use cartlab_core::SnapshotItem;

use crate::catalog::Catalog;

/// A cart line references a product id missing from the catalog.
///
/// The catalog loads before any mutation is possible, so this indicates a
/// cart/catalog desync and is treated as a logic-error signal, never
/// silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cart references unknown product: {id}")]
pub struct UnknownProduct {
    pub id: String,
}

/// One cart line. `quantity` is always >= 1; a line that would drop below
/// 1 is removed from the cart instead of being stored at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: u32,
}

/// Product id -> quantity mapping, iterated in insertion order of the
/// first increment. The order carries no pricing semantics.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit, creating the line at quantity 1 if absent.
    ///
    /// Returns the new quantity.
    pub fn increment(&mut self, product_id: &str) -> u32 {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity += 1;
            return line.quantity;
        }
        self.lines.push(CartLine {
            product_id: product_id.to_string(),
            quantity: 1,
        });
        1
    }

    /// Remove one unit. A line that would reach zero is deleted, never
    /// stored at quantity 0.
    ///
    /// Returns the new quantity (0 once removed or when the line was
    /// absent).
    pub fn decrement(&mut self, product_id: &str) -> u32 {
        let Some(position) = self.lines.iter().position(|l| l.product_id == product_id) else {
            return 0;
        };
        let Some(line) = self.lines.get_mut(position) else {
            return 0;
        };
        if line.quantity > 1 {
            line.quantity -= 1;
            line.quantity
        } else {
            self.lines.remove(position);
            0
        }
    }

    /// Quantity of a product, 0 if absent.
    #[must_use]
    pub fn quantity(&self, product_id: &str) -> u32 {
        self.lines
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.quantity)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines in insertion order of the first increment.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Total units across all lines.
    #[must_use]
    pub fn total_units(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Project the cart against the catalog into the wire snapshot.
    ///
    /// # Errors
    ///
    /// Fails if a line references a product id the catalog does not hold.
    pub fn snapshot_items(&self, catalog: &Catalog) -> Result<Vec<SnapshotItem>, UnknownProduct> {
        self.lines
            .iter()
            .map(|line| {
                let product = catalog.product(&line.product_id).ok_or_else(|| UnknownProduct {
                    id: line.product_id.clone(),
                })?;
                Ok(SnapshotItem {
                    id: product.id.clone(),
                    price: product.price,
                    category: product.category.clone(),
                    qty: line.quantity,
                })
            })
            .collect()
    }
}
