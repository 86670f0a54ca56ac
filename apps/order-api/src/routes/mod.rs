//! # HTTP Routes
//!
//! Route modules and the assembled application router.
//!
//! ## Route Map
//! ```text
//! POST /api/orders               create order (the reconciliation gate)
//! GET  /api/orders/{id}          fetch one order document
//! POST /api/orders/{id}/status   advance the kitchen status
//! GET  /api/promotions           list currently-live promotions
//! GET  /health                   liveness + database check
//! ```

pub mod health;
pub mod orders;
pub mod promotions;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(promotions::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
