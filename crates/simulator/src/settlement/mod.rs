//! Settlement service client.
//!
//! The settlement service owns everything the simulator treats as remote:
//! the catalog source, invoice splitting and discount computation, add-on
//! recommendation, and persistence of saved simulations. This module
//! defines the transport error taxonomy and the [`SettlementApi`] trait the
//! orchestrator depends on; the HTTP implementation lives in `client`.
//!
//! All calls are plain JSON over HTTP with no authentication; two of the
//! endpoints take their payload as a multipart file upload (a quirk of the
//! service contract the client has to honor).

mod client;

pub use client::SettlementClient;

use async_trait::async_trait;
use thiserror::Error;

use cartlab_core::{
    AddonComparison, DiscountRule, Invoice, Product, RankedAddon, SavedSimulation, SnapshotItem,
};

/// Errors that can occur when calling the settlement service.
#[derive(Debug, Error)]
pub enum SettlementError {
    /// HTTP request failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned a non-success status.
    #[error("service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    /// JSON encoding or parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An endpoint path could not be joined onto the base URL.
    #[error("invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// The remote collaborators one orchestration cycle talks to.
///
/// Implemented over HTTP by [`SettlementClient`]; tests substitute scripted
/// stubs so the orchestrator can be exercised without a network.
#[async_trait]
pub trait SettlementApi: Send + Sync {
    /// `GET /products`
    async fn fetch_products(&self) -> Result<Vec<Product>, SettlementError>;

    /// `GET /discounts`
    async fn fetch_discounts(&self) -> Result<Vec<DiscountRule>, SettlementError>;

    /// `POST /cart_summary` (multipart file upload). Splits the submitted
    /// items into one or more settled invoices.
    async fn cart_summary(&self, items: &[SnapshotItem])
    -> Result<Vec<Invoice>, SettlementError>;

    /// `POST /simulate_addon` (JSON body). Ranked add-on candidates.
    async fn simulate_addon(
        &self,
        items: &[SnapshotItem],
    ) -> Result<Vec<RankedAddon>, SettlementError>;

    /// `POST /recommend_addon` (multipart file upload). Single best pick
    /// with before/after settlement comparison.
    async fn recommend_addon(
        &self,
        items: &[SnapshotItem],
    ) -> Result<AddonComparison, SettlementError>;

    /// `POST /save_simulation` (JSON body). Persists the submission and
    /// returns the storage identifier.
    async fn save_simulation(
        &self,
        items: &[SnapshotItem],
    ) -> Result<SavedSimulation, SettlementError>;
}
