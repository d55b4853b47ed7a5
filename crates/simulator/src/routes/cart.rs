//! Cart command and view handlers.
//!
//! Each mutation runs one orchestration cycle and returns the refreshed
//! cart view, so the caller always renders cart lines and simulation
//! results that belong together.

use axum::{Json, extract::State};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cartlab_core::{Invoice, Recommendation, UsedDiscount};

use crate::cart::{CartLine, UnknownProduct};
use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use crate::simulation::{PricingOutcome, RecommendationOutcome, SimulationSnapshot};
use crate::state::AppState;

/// Mutation command body.
#[derive(Debug, Deserialize)]
pub struct CartCommand {
    pub product_id: String,
}

/// One cart line with the client-side multiplicity math applied.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Invoice display data. `subtotal` is the settled price of the invoice;
/// an empty `used_discounts` list is the "no discount" indicator.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceView {
    pub items: Vec<InvoiceItemView>,
    pub used_discounts: Vec<UsedDiscount>,
    pub original_total: Decimal,
    pub total_discount: Decimal,
    pub subtotal: Decimal,
}

/// A priced line inside an invoice view.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceItemView {
    pub id: String,
    pub name: String,
    pub price: Decimal,
}

/// Pricing section of the simulation view.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PricingView {
    /// Cart is empty; nothing was priced.
    Empty,
    Ready { invoices: Vec<InvoiceView> },
    Failed { message: String },
}

/// Recommendation section of the simulation view.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecommendationView {
    /// Not requested: the cart was empty or pricing failed.
    Skipped,
    Ready { recommendation: Recommendation },
    Failed { message: String },
}

/// Simulation section of the cart view.
#[derive(Debug, Serialize)]
pub struct SimulationView {
    /// Cart mutation this result belongs to.
    pub generation: u64,
    pub pricing: PricingView,
    pub recommendation: RecommendationView,
}

/// Full cart view: lines plus the latest simulation snapshot.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub simulation: SimulationView,
}

/// Save response: the storage identifier assigned by the persistence
/// collaborator.
#[derive(Debug, Serialize)]
pub struct SaveView {
    pub file: String,
}

// =============================================================================
// Type Conversions
// =============================================================================

impl From<&Invoice> for InvoiceView {
    fn from(invoice: &Invoice) -> Self {
        Self {
            items: invoice
                .items
                .iter()
                .map(|item| InvoiceItemView {
                    id: item.id.clone(),
                    name: item.name.clone().unwrap_or_else(|| item.id.clone()),
                    price: item.price,
                })
                .collect(),
            used_discounts: invoice.result.used_discounts.clone(),
            original_total: invoice.result.original_total,
            total_discount: invoice.result.total_discount,
            subtotal: invoice.result.final_price,
        }
    }
}

impl From<SimulationSnapshot> for SimulationView {
    fn from(snapshot: SimulationSnapshot) -> Self {
        let pricing = match snapshot.pricing {
            PricingOutcome::EmptyCart => PricingView::Empty,
            PricingOutcome::Invoices(invoices) => PricingView::Ready {
                invoices: invoices.iter().map(InvoiceView::from).collect(),
            },
            PricingOutcome::Failed { message } => PricingView::Failed { message },
        };
        let recommendation = match snapshot.recommendation {
            RecommendationOutcome::Skipped => RecommendationView::Skipped,
            RecommendationOutcome::Ready(recommendation) => {
                RecommendationView::Ready { recommendation }
            }
            RecommendationOutcome::Failed { message } => RecommendationView::Failed { message },
        };
        Self {
            generation: snapshot.generation,
            pricing,
            recommendation,
        }
    }
}

fn line_view(line: &CartLine, catalog: &Catalog) -> Result<CartLineView> {
    let product = catalog
        .product(&line.product_id)
        .ok_or_else(|| UnknownProduct {
            id: line.product_id.clone(),
        })?;
    Ok(CartLineView {
        product_id: product.id.clone(),
        name: product.name.clone(),
        unit_price: product.price,
        quantity: line.quantity,
        line_total: product.price * Decimal::from(line.quantity),
    })
}

async fn cart_view(state: &AppState, snapshot: SimulationSnapshot) -> Result<CartView> {
    let catalog = state.catalog();
    let lines = state.simulator().cart_lines().await;
    let line_views = lines
        .iter()
        .map(|line| line_view(line, catalog))
        .collect::<Result<Vec<_>>>()?;
    let item_count = lines.iter().map(|line| line.quantity).sum();

    Ok(CartView {
        lines: line_views,
        item_count,
        simulation: snapshot.into(),
    })
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart with the latest simulation snapshot.
pub async fn show(State(state): State<AppState>) -> Result<Json<CartView>> {
    let snapshot = state.simulator().snapshot().await;
    Ok(Json(cart_view(&state, snapshot).await?))
}

/// Add one unit of a product and reconcile.
pub async fn increment(
    State(state): State<AppState>,
    Json(command): Json<CartCommand>,
) -> Result<Json<CartView>> {
    if state.catalog().product(&command.product_id).is_none() {
        return Err(AppError::NotFound(format!(
            "product {}",
            command.product_id
        )));
    }

    let snapshot = state.simulator().increment(&command.product_id).await?;
    Ok(Json(cart_view(&state, snapshot).await?))
}

/// Remove one unit of a product and reconcile.
pub async fn decrement(
    State(state): State<AppState>,
    Json(command): Json<CartCommand>,
) -> Result<Json<CartView>> {
    if state.catalog().product(&command.product_id).is_none() {
        return Err(AppError::NotFound(format!(
            "product {}",
            command.product_id
        )));
    }

    let snapshot = state.simulator().decrement(&command.product_id).await?;
    Ok(Json(cart_view(&state, snapshot).await?))
}

/// One-shot save of the current cart to the persistence collaborator.
pub async fn save(State(state): State<AppState>) -> Result<Json<SaveView>> {
    let saved = state.simulator().save().await.map_err(AppError::from)?;
    Ok(Json(SaveView { file: saved.file }))
}
