//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::SimulatorConfig;
use crate::settlement::SettlementClient;
use crate::simulation::Simulator;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration and the simulator owning the cart.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SimulatorConfig,
    simulator: Simulator,
}

impl AppState {
    /// Create application state from configuration, the settlement client,
    /// and an already-loaded catalog.
    #[must_use]
    pub fn new(config: SimulatorConfig, client: SettlementClient, catalog: Catalog) -> Self {
        let simulator = Simulator::new(
            Arc::new(catalog),
            Arc::new(client),
            config.recommendation_mode,
        );
        Self {
            inner: Arc::new(AppStateInner { config, simulator }),
        }
    }

    /// Get a reference to the simulator configuration.
    #[must_use]
    pub fn config(&self) -> &SimulatorConfig {
        &self.inner.config
    }

    /// Get a reference to the simulator.
    #[must_use]
    pub fn simulator(&self) -> &Simulator {
        &self.inner.simulator
    }

    /// Get a reference to the session catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.inner.simulator.catalog()
    }
}
