//! HTTP implementation of the settlement service client.
//!
//! Uses `reqwest` with plain JSON bodies, except for the two endpoints the
//! service exposes as file uploads: those send the submission as a single
//! multipart part named `file` with filename `cart.json`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use cartlab_core::{
    AddonComparison, CartSubmission, DiscountRule, Invoice, Product, RankedAddon,
    RankedAddonResponse, SavedSimulation, SnapshotItem,
};

use super::{SettlementApi, SettlementError};
use crate::config::ApiConfig;

/// Cap on response body excerpts embedded in errors.
const BODY_EXCERPT_CHARS: usize = 200;

/// Client for the settlement service HTTP API.
///
/// Cheaply cloneable; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct SettlementClient {
    inner: Arc<SettlementClientInner>,
}

struct SettlementClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl SettlementClient {
    /// Create a new settlement service client.
    #[must_use]
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            inner: Arc::new(SettlementClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url, SettlementError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Decode a response, mapping non-success statuses to errors carrying a
    /// body excerpt for diagnostics.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SettlementError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %excerpt(&body),
                "settlement service returned non-success status"
            );
            return Err(SettlementError::Status {
                status,
                body: excerpt(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SettlementError> {
        let response = self.inner.client.get(self.endpoint(path)?).send().await?;
        Self::decode(response).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, SettlementError> {
        let response = self
            .inner
            .client
            .post(self.endpoint(path)?)
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// POST a cart submission as a multipart file upload: one part named
    /// `file` whose content is the JSON submission.
    async fn post_cart_file<T: DeserializeOwned>(
        &self,
        path: &str,
        submission: &CartSubmission,
    ) -> Result<T, SettlementError> {
        let payload = serde_json::to_vec(submission)?;
        let part = Part::bytes(payload)
            .file_name("cart.json")
            .mime_str("application/json")?;
        let form = Form::new().part("file", part);

        let response = self
            .inner
            .client
            .post(self.endpoint(path)?)
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

fn submission(items: &[SnapshotItem]) -> CartSubmission {
    CartSubmission {
        items: items.to_vec(),
    }
}

#[async_trait]
impl SettlementApi for SettlementClient {
    #[instrument(skip(self))]
    async fn fetch_products(&self) -> Result<Vec<Product>, SettlementError> {
        self.get_json("products").await
    }

    #[instrument(skip(self))]
    async fn fetch_discounts(&self) -> Result<Vec<DiscountRule>, SettlementError> {
        self.get_json("discounts").await
    }

    #[instrument(skip(self, items), fields(lines = items.len()))]
    async fn cart_summary(
        &self,
        items: &[SnapshotItem],
    ) -> Result<Vec<Invoice>, SettlementError> {
        self.post_cart_file("cart_summary", &submission(items)).await
    }

    #[instrument(skip(self, items), fields(lines = items.len()))]
    async fn simulate_addon(
        &self,
        items: &[SnapshotItem],
    ) -> Result<Vec<RankedAddon>, SettlementError> {
        let response: RankedAddonResponse =
            self.post_json("simulate_addon", &submission(items)).await?;
        Ok(response.recommendations)
    }

    #[instrument(skip(self, items), fields(lines = items.len()))]
    async fn recommend_addon(
        &self,
        items: &[SnapshotItem],
    ) -> Result<AddonComparison, SettlementError> {
        self.post_cart_file("recommend_addon", &submission(items))
            .await
    }

    #[instrument(skip(self, items), fields(lines = items.len()))]
    async fn save_simulation(
        &self,
        items: &[SnapshotItem],
    ) -> Result<SavedSimulation, SettlementError> {
        self.post_json("save_simulation", &submission(items)).await
    }
}
