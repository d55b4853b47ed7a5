//! Orchestrator behavior against a scripted settlement service stub.
//!
//! These tests drive the `Simulator` the way the presentation adapter
//! does, with every remote collaborator replaced by an in-process stub
//! that records calls and can be scripted to fail, answer with fixed
//! invoices, or park a pricing call until the test releases it.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::{Mutex, Semaphore};

use cartlab_core::{
    AddonComparison, DiscountRule, Invoice, PricedItem, Product, RankedAddon, Recommendation,
    SavedSimulation, Settlement, SnapshotItem, UsedDiscount,
};
use cartlab_simulator::catalog::Catalog;
use cartlab_simulator::config::RecommendationMode;
use cartlab_simulator::settlement::{SettlementApi, SettlementError};
use cartlab_simulator::simulation::{PricingOutcome, RecommendationOutcome, Simulator};

// =============================================================================
// Fixtures
// =============================================================================

fn product(id: &str, category: &str, price: i64) -> Product {
    Product {
        id: id.to_string(),
        name: format!("product {id}"),
        category: category.to_string(),
        price: Decimal::from(price),
    }
}

fn catalog_products() -> Vec<Product> {
    vec![product("p1", "A", 100), product("p2", "B", 50)]
}

fn catalog_discounts() -> Vec<DiscountRule> {
    vec![DiscountRule {
        id: "D001".to_string(),
        kind: "bundle".to_string(),
        description: "p1 + p2 bundle".to_string(),
        product_id: None,
        items: Some(vec!["p1".to_string(), "p2".to_string()]),
        category: None,
    }]
}

fn catalog() -> Catalog {
    Catalog::new(catalog_products(), catalog_discounts())
}

fn invoice(final_price: i64, used_discounts: Vec<UsedDiscount>) -> Invoice {
    let total_discount: Decimal = used_discounts.iter().map(|d| d.amount).sum();
    Invoice {
        items: vec![],
        result: Settlement {
            original_total: Decimal::from(final_price) + total_discount,
            total_discount,
            final_price: Decimal::from(final_price),
            used_discounts,
        },
    }
}

fn service_error() -> SettlementError {
    SettlementError::Status {
        status: reqwest::StatusCode::BAD_GATEWAY,
        body: "unavailable".to_string(),
    }
}

// =============================================================================
// Stub collaborator
// =============================================================================

/// Parks the pricing call that consumes it until the test releases it.
struct Gate {
    entered: Semaphore,
    release: Semaphore,
}

impl Gate {
    fn new() -> Self {
        Self {
            entered: Semaphore::new(0),
            release: Semaphore::new(0),
        }
    }
}

#[derive(Default)]
struct StubApi {
    pricing_calls: AtomicUsize,
    ranked_calls: AtomicUsize,
    best_pick_calls: AtomicUsize,
    save_calls: AtomicUsize,
    fail_pricing: AtomicBool,
    fail_recommendation: AtomicBool,
    fail_save: AtomicBool,
    fail_discounts_fetch: AtomicBool,
    /// Scripted pricing responses, consumed in order; once drained, the
    /// stub synthesizes one invoice per submission.
    scripted_invoices: Mutex<VecDeque<Vec<Invoice>>>,
    /// Gate consumed by the next pricing call.
    pricing_hold: Mutex<Option<Arc<Gate>>>,
}

impl StubApi {
    async fn script_invoices(&self, responses: Vec<Vec<Invoice>>) {
        self.scripted_invoices.lock().await.extend(responses);
    }

    async fn hold_next_pricing(&self, gate: Arc<Gate>) {
        *self.pricing_hold.lock().await = Some(gate);
    }

    /// One invoice covering the whole submission, each line priced as a
    /// single unit (the service contract: `qty` may be ignored).
    fn synthesize(items: &[SnapshotItem]) -> Vec<Invoice> {
        let total: Decimal = items.iter().map(|item| item.price).sum();
        vec![Invoice {
            items: items
                .iter()
                .map(|item| PricedItem {
                    id: item.id.clone(),
                    name: None,
                    price: item.price,
                    category: Some(item.category.clone()),
                })
                .collect(),
            result: Settlement {
                original_total: total,
                total_discount: Decimal::ZERO,
                final_price: total,
                used_discounts: vec![],
            },
        }]
    }
}

#[async_trait]
impl SettlementApi for StubApi {
    async fn fetch_products(&self) -> Result<Vec<Product>, SettlementError> {
        Ok(catalog_products())
    }

    async fn fetch_discounts(&self) -> Result<Vec<DiscountRule>, SettlementError> {
        if self.fail_discounts_fetch.load(Ordering::SeqCst) {
            return Err(service_error());
        }
        Ok(catalog_discounts())
    }

    async fn cart_summary(&self, items: &[SnapshotItem]) -> Result<Vec<Invoice>, SettlementError> {
        self.pricing_calls.fetch_add(1, Ordering::SeqCst);

        let held = self.pricing_hold.lock().await.take();
        if let Some(gate) = held {
            gate.entered.add_permits(1);
            let permit = gate.release.acquire().await.unwrap();
            permit.forget();
        }

        if self.fail_pricing.load(Ordering::SeqCst) {
            return Err(service_error());
        }

        if let Some(scripted) = self.scripted_invoices.lock().await.pop_front() {
            return Ok(scripted);
        }
        Ok(Self::synthesize(items))
    }

    async fn simulate_addon(
        &self,
        _items: &[SnapshotItem],
    ) -> Result<Vec<RankedAddon>, SettlementError> {
        self.ranked_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_recommendation.load(Ordering::SeqCst) {
            return Err(service_error());
        }
        Ok(vec![RankedAddon {
            id: Some("p2".to_string()),
            name: "product p2".to_string(),
            score: 0.9,
            addon_price: None,
            after_price: None,
            saved: None,
            used_discounts: vec![],
        }])
    }

    async fn recommend_addon(
        &self,
        _items: &[SnapshotItem],
    ) -> Result<AddonComparison, SettlementError> {
        self.best_pick_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_recommendation.load(Ordering::SeqCst) {
            return Err(service_error());
        }
        Ok(AddonComparison {
            addon_id: Some("p2".to_string()),
            before: vec![invoice(100, vec![])],
            after: vec![invoice(130, vec![])],
        })
    }

    async fn save_simulation(
        &self,
        _items: &[SnapshotItem],
    ) -> Result<SavedSimulation, SettlementError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_save.load(Ordering::SeqCst) {
            return Err(service_error());
        }
        Ok(SavedSimulation {
            status: Some("OK".to_string()),
            file: "sim_test.json".to_string(),
        })
    }
}

fn simulator(stub: Arc<StubApi>, mode: RecommendationMode) -> Simulator {
    Simulator::new(Arc::new(catalog()), stub, mode)
}

// =============================================================================
// Catalog loading
// =============================================================================

#[tokio::test]
async fn catalog_load_is_all_or_nothing() {
    let stub = StubApi::default();
    let loaded = Catalog::load(&stub).await.unwrap();
    assert_eq!(loaded.products().len(), 2);
    assert_eq!(loaded.discounts().len(), 1);

    stub.fail_discounts_fetch.store(true, Ordering::SeqCst);
    assert!(Catalog::load(&stub).await.is_err());
}

// =============================================================================
// Orchestration cycles
// =============================================================================

#[tokio::test]
async fn empty_cart_short_circuits_without_network_calls() {
    let stub = Arc::new(StubApi::default());
    let sim = simulator(stub.clone(), RecommendationMode::Ranked);

    sim.increment("p1").await.unwrap();
    let snapshot = sim.decrement("p1").await.unwrap();

    assert_eq!(snapshot.generation, 2);
    assert_eq!(snapshot.pricing, PricingOutcome::EmptyCart);
    assert_eq!(snapshot.recommendation, RecommendationOutcome::Skipped);
    // Only the first mutation had anything to price.
    assert_eq!(stub.pricing_calls.load(Ordering::SeqCst), 1);
    assert_eq!(stub.ranked_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn successful_cycle_stores_invoices_and_recommendation() {
    let stub = Arc::new(StubApi::default());
    let sim = simulator(stub.clone(), RecommendationMode::Ranked);

    let snapshot = sim.increment("p1").await.unwrap();

    assert_eq!(snapshot.generation, 1);
    match &snapshot.pricing {
        PricingOutcome::Invoices(invoices) => {
            assert_eq!(invoices.len(), 1);
            assert_eq!(invoices[0].result.final_price, Decimal::from(100));
        }
        other => panic!("expected invoices, got {other:?}"),
    }
    match &snapshot.recommendation {
        RecommendationOutcome::Ready(Recommendation::Ranked { recommendations }) => {
            assert_eq!(recommendations.len(), 1);
        }
        other => panic!("expected ranked recommendation, got {other:?}"),
    }
}

#[tokio::test]
async fn best_pick_mode_uses_the_comparison_endpoint() {
    let stub = Arc::new(StubApi::default());
    let sim = simulator(stub.clone(), RecommendationMode::BestPick);

    let snapshot = sim.increment("p1").await.unwrap();

    assert_eq!(stub.best_pick_calls.load(Ordering::SeqCst), 1);
    assert_eq!(stub.ranked_calls.load(Ordering::SeqCst), 0);
    match &snapshot.recommendation {
        RecommendationOutcome::Ready(Recommendation::BestPick { comparison }) => {
            assert_eq!(comparison.addon_id.as_deref(), Some("p2"));
        }
        other => panic!("expected best pick, got {other:?}"),
    }
}

#[tokio::test]
async fn pricing_failure_aborts_cycle_and_clears_previous_invoices() {
    let stub = Arc::new(StubApi::default());
    let sim = simulator(stub.clone(), RecommendationMode::Ranked);

    // First cycle succeeds and stores invoices.
    let first = sim.increment("p1").await.unwrap();
    assert!(matches!(first.pricing, PricingOutcome::Invoices(_)));

    stub.fail_pricing.store(true, Ordering::SeqCst);
    let second = sim.increment("p2").await.unwrap();

    assert!(matches!(second.pricing, PricingOutcome::Failed { .. }));
    assert_eq!(second.recommendation, RecommendationOutcome::Skipped);
    // The recommendation collaborator was not consulted for the failed cycle.
    assert_eq!(stub.ranked_calls.load(Ordering::SeqCst), 1);
    // The failure replaced the stored snapshot; the old invoices are gone.
    let latest = sim.snapshot().await;
    assert_eq!(latest.generation, 2);
    assert!(matches!(latest.pricing, PricingOutcome::Failed { .. }));
}

#[tokio::test]
async fn recommendation_failure_keeps_invoices() {
    let stub = Arc::new(StubApi::default());
    let sim = simulator(stub.clone(), RecommendationMode::Ranked);

    stub.fail_recommendation.store(true, Ordering::SeqCst);
    let snapshot = sim.increment("p1").await.unwrap();

    match &snapshot.pricing {
        PricingOutcome::Invoices(invoices) => assert_eq!(invoices.len(), 1),
        other => panic!("expected invoices, got {other:?}"),
    }
    assert!(matches!(
        snapshot.recommendation,
        RecommendationOutcome::Failed { .. }
    ));
}

#[tokio::test]
async fn unknown_product_is_rejected_without_a_cycle() {
    let stub = Arc::new(StubApi::default());
    let sim = simulator(stub.clone(), RecommendationMode::Ranked);

    let err = sim.increment("p999").await.unwrap_err();
    assert_eq!(err.id, "p999");
    assert!(sim.cart_lines().await.is_empty());
    assert_eq!(stub.pricing_calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Stale-response discard
// =============================================================================

#[tokio::test]
async fn late_result_of_a_superseded_cycle_is_discarded() {
    let stub = Arc::new(StubApi::default());
    let sim = Arc::new(simulator(stub.clone(), RecommendationMode::Ranked));

    // Park the first mutation's pricing call inside the stub.
    let gate = Arc::new(Gate::new());
    stub.hold_next_pricing(gate.clone()).await;

    let first = {
        let sim = sim.clone();
        tokio::spawn(async move { sim.increment("p1").await })
    };
    let permit = gate.entered.acquire().await.unwrap();
    permit.forget();

    // Second mutation starts and finishes while the first is in flight.
    let second = sim.increment("p2").await.unwrap();
    assert_eq!(second.generation, 2);

    // Release the first cycle; its result must be discarded, and the
    // returned snapshot is the one the second mutation applied.
    gate.release.add_permits(1);
    let first = first.await.unwrap().unwrap();
    assert_eq!(first.generation, 2);

    let latest = sim.snapshot().await;
    assert_eq!(latest.generation, 2);
    match &latest.pricing {
        PricingOutcome::Invoices(invoices) => {
            // Two lines: the cart the second mutation described.
            assert_eq!(invoices[0].items.len(), 2);
        }
        other => panic!("expected invoices, got {other:?}"),
    }
}

// =============================================================================
// End-to-end example
// =============================================================================

#[tokio::test]
async fn settled_invoice_renders_and_is_replaced_on_decrement() {
    let stub = Arc::new(StubApi::default());
    let sim = simulator(stub.clone(), RecommendationMode::Ranked);

    // Build the cart {p1: 2, p2: 1}; the third submission settles at 240
    // with no discounts.
    stub.script_invoices(vec![
        vec![invoice(100, vec![])],
        vec![invoice(200, vec![])],
        vec![invoice(240, vec![])],
    ])
    .await;

    sim.increment("p1").await.unwrap();
    sim.increment("p1").await.unwrap();
    let snapshot = sim.increment("p2").await.unwrap();

    assert_eq!(sim.cart_lines().await.len(), 2);
    match &snapshot.pricing {
        PricingOutcome::Invoices(invoices) => {
            assert_eq!(invoices.len(), 1);
            assert_eq!(invoices[0].result.final_price, Decimal::from(240));
            assert!(invoices[0].result.used_discounts.is_empty());
        }
        other => panic!("expected a single settled invoice, got {other:?}"),
    }
    assert_eq!(stub.pricing_calls.load(Ordering::SeqCst), 3);

    // Decrementing p1 triggers exactly one new cycle and replaces the
    // displayed invoice.
    let replaced = sim.decrement("p1").await.unwrap();
    assert_eq!(stub.pricing_calls.load(Ordering::SeqCst), 4);
    assert_eq!(replaced.generation, 4);
    match &replaced.pricing {
        PricingOutcome::Invoices(invoices) => {
            // Synthesized from the two remaining lines: 100 + 50.
            assert_eq!(invoices[0].result.final_price, Decimal::from(150));
        }
        other => panic!("expected invoices, got {other:?}"),
    }
}

// =============================================================================
// Save
// =============================================================================

#[tokio::test]
async fn save_is_one_shot_and_does_not_touch_the_snapshot() {
    let stub = Arc::new(StubApi::default());
    let sim = simulator(stub.clone(), RecommendationMode::Ranked);

    sim.increment("p1").await.unwrap();
    let before = sim.snapshot().await;

    let saved = sim.save().await.unwrap();
    assert_eq!(saved.file, "sim_test.json");
    assert_eq!(stub.save_calls.load(Ordering::SeqCst), 1);

    // No generation bump, no snapshot change.
    let after = sim.snapshot().await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn save_failure_leaves_state_unchanged() {
    let stub = Arc::new(StubApi::default());
    let sim = simulator(stub.clone(), RecommendationMode::Ranked);

    sim.increment("p1").await.unwrap();
    let before = sim.snapshot().await;

    stub.fail_save.store(true, Ordering::SeqCst);
    assert!(sim.save().await.is_err());

    let after = sim.snapshot().await;
    assert_eq!(after, before);
    assert_eq!(sim.cart_lines().await.len(), 1);
}
