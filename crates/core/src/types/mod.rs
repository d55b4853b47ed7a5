//! Core types for Cartlab.

pub mod cart;
pub mod discount;
pub mod invoice;
pub mod product;
pub mod recommendation;

pub use cart::{CartSubmission, SavedSimulation, SnapshotItem};
pub use discount::DiscountRule;
pub use invoice::{Invoice, PricedItem, Settlement, UsedDiscount};
pub use product::Product;
pub use recommendation::{AddonComparison, RankedAddon, RankedAddonResponse, Recommendation};
