//! Route handlers for the presentation adapter.
//!
//! Handlers expose JSON views only; markup lives with whatever UI consumes
//! this API. Cart mutations are explicit command endpoints, so the logic
//! stays decoupled from any particular UI toolkit.

pub mod cart;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the route table.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list))
        .route("/cart", get(cart::show))
        .route("/cart/increment", post(cart::increment))
        .route("/cart/decrement", post(cart::decrement))
        .route("/cart/save", post(cart::save))
}
