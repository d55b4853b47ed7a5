//! Simulation orchestration: reconciling the local cart against the
//! settlement and recommendation services.
//!
//! Every cart mutation allocates the next generation token and runs one
//! pricing-then-recommendation cycle for it. Mutations can fire faster than
//! round-trips complete, so a cycle's result is applied only while its
//! token is still the current one; late results of superseded cycles are
//! discarded rather than displayed against a cart they no longer describe.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use cartlab_core::{Invoice, Recommendation, SavedSimulation, SnapshotItem};

use crate::cart::{Cart, CartLine, UnknownProduct};
use crate::catalog::Catalog;
use crate::config::RecommendationMode;
use crate::settlement::{SettlementApi, SettlementError};

/// Pricing outcome of one orchestration cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PricingOutcome {
    /// Empty cart: nothing was submitted.
    #[default]
    EmptyCart,
    /// The settlement service split the cart into these invoices.
    Invoices(Vec<Invoice>),
    /// The pricing call failed. Nothing from an earlier cycle is kept.
    Failed { message: String },
}

/// Recommendation outcome of one orchestration cycle.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RecommendationOutcome {
    /// Not requested: the cart was empty or pricing failed.
    #[default]
    Skipped,
    Ready(Recommendation),
    Failed { message: String },
}

/// The consistent result snapshot of one orchestration cycle.
///
/// `generation` identifies the cart mutation this snapshot was computed
/// for; the presentation layer can compare it against the current
/// generation to re-validate before display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationSnapshot {
    pub generation: u64,
    pub pricing: PricingOutcome,
    pub recommendation: RecommendationOutcome,
}

/// Save failure: either the cart could not be projected (desync) or the
/// persistence call failed.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    UnknownProduct(#[from] UnknownProduct),
    #[error("save failed: {0}")]
    Settlement(#[from] SettlementError),
}

/// Orchestrates cart mutations against the remote collaborators.
///
/// Owns the cart, a monotonically increasing generation counter, and the
/// latest applied snapshot.
pub struct Simulator {
    catalog: Arc<Catalog>,
    api: Arc<dyn SettlementApi>,
    mode: RecommendationMode,
    cart: RwLock<Cart>,
    generation: AtomicU64,
    latest: RwLock<SimulationSnapshot>,
}

impl Simulator {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, api: Arc<dyn SettlementApi>, mode: RecommendationMode) -> Self {
        Self {
            catalog,
            api,
            mode,
            cart: RwLock::new(Cart::new()),
            generation: AtomicU64::new(0),
            latest: RwLock::new(SimulationSnapshot::default()),
        }
    }

    /// The session catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current cart lines, for the presentation adapter.
    pub async fn cart_lines(&self) -> Vec<CartLine> {
        self.cart.read().await.lines().to_vec()
    }

    /// Latest applied snapshot.
    pub async fn snapshot(&self) -> SimulationSnapshot {
        self.latest.read().await.clone()
    }

    /// Add one unit of `product_id` and run one orchestration cycle.
    ///
    /// # Errors
    ///
    /// Fails without mutating anything if `product_id` is not in the
    /// catalog.
    #[instrument(skip(self))]
    pub async fn increment(&self, product_id: &str) -> Result<SimulationSnapshot, UnknownProduct> {
        self.mutate(product_id, Cart::increment).await
    }

    /// Remove one unit of `product_id` and run one orchestration cycle.
    ///
    /// # Errors
    ///
    /// Fails without mutating anything if `product_id` is not in the
    /// catalog.
    #[instrument(skip(self))]
    pub async fn decrement(&self, product_id: &str) -> Result<SimulationSnapshot, UnknownProduct> {
        self.mutate(product_id, Cart::decrement).await
    }

    async fn mutate(
        &self,
        product_id: &str,
        op: fn(&mut Cart, &str) -> u32,
    ) -> Result<SimulationSnapshot, UnknownProduct> {
        if self.catalog.product(product_id).is_none() {
            return Err(UnknownProduct {
                id: product_id.to_string(),
            });
        }

        // Mutate and allocate the generation under the cart lock, so
        // concurrent mutations get distinct, ordered generations matching
        // the cart states they describe.
        let (generation, items) = {
            let mut cart = self.cart.write().await;
            op(&mut cart, product_id);
            let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            (generation, cart.snapshot_items(&self.catalog)?)
        };

        Ok(self.run_cycle(generation, items).await)
    }

    /// Run one pricing-then-recommendation cycle and apply its result
    /// unless a newer mutation superseded it. Returns the latest applied
    /// snapshot either way.
    async fn run_cycle(&self, generation: u64, items: Vec<SnapshotItem>) -> SimulationSnapshot {
        let snapshot = self.compute(generation, &items).await;
        self.apply(snapshot).await
    }

    async fn compute(&self, generation: u64, items: &[SnapshotItem]) -> SimulationSnapshot {
        if items.is_empty() {
            // Nothing to price: short-circuit without any network call.
            return SimulationSnapshot {
                generation,
                ..SimulationSnapshot::default()
            };
        }

        let invoices = match self.api.cart_summary(items).await {
            Ok(invoices) => invoices,
            Err(error) => {
                warn!(%error, generation, "pricing call failed, aborting cycle");
                return SimulationSnapshot {
                    generation,
                    pricing: PricingOutcome::Failed {
                        message: error.to_string(),
                    },
                    recommendation: RecommendationOutcome::Skipped,
                };
            }
        };

        let recommendation = match self.recommend(items).await {
            Ok(recommendation) => RecommendationOutcome::Ready(recommendation),
            Err(error) => {
                warn!(%error, generation, "recommendation call failed, keeping invoices");
                RecommendationOutcome::Failed {
                    message: error.to_string(),
                }
            }
        };

        SimulationSnapshot {
            generation,
            pricing: PricingOutcome::Invoices(invoices),
            recommendation,
        }
    }

    async fn recommend(&self, items: &[SnapshotItem]) -> Result<Recommendation, SettlementError> {
        match self.mode {
            RecommendationMode::Ranked => {
                let recommendations = self.api.simulate_addon(items).await?;
                Ok(Recommendation::Ranked { recommendations })
            }
            RecommendationMode::BestPick => {
                let comparison = self.api.recommend_addon(items).await?;
                Ok(Recommendation::BestPick { comparison })
            }
        }
    }

    /// Apply a computed snapshot unless a newer mutation superseded it.
    async fn apply(&self, snapshot: SimulationSnapshot) -> SimulationSnapshot {
        let mut latest = self.latest.write().await;
        let current = self.generation.load(Ordering::SeqCst);
        if snapshot.generation == current {
            *latest = snapshot;
        } else {
            debug!(
                stale = snapshot.generation,
                current, "discarding superseded cycle result"
            );
        }
        latest.clone()
    }

    /// One-shot submit of the current cart to the persistence collaborator.
    ///
    /// Does not bump the generation, does not touch the snapshot, and is
    /// never retried.
    ///
    /// # Errors
    ///
    /// Fails on cart/catalog desync or when the persistence call fails.
    #[instrument(skip(self))]
    pub async fn save(&self) -> Result<SavedSimulation, SaveError> {
        let items = self.cart.read().await.snapshot_items(&self.catalog)?;
        Ok(self.api.save_simulation(&items).await?)
    }
}
