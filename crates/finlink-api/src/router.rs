//! Router assembly and shared state for the finlink API.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use finlink_provider::ProviderClient;
use finlink_sync::SyncQueue;
use sqlx::PgPool;

use crate::handlers::{
    create_link_token, exchange_token, list_accounts, list_transactions, receive_webhook,
};

/// Shared state for all API routes.
#[derive(Clone)]
pub struct ApiState {
    /// Database connection pool.
    pub pool: PgPool,
    /// Provider client used by the synchronous link-token endpoint.
    pub provider: Arc<dyn ProviderClient>,
    /// Queue feeding the sync worker pool.
    pub queue: SyncQueue,
    /// Absolute base URL pagination links are built from.
    pub site_url: String,
}

/// Create the API router.
///
/// # Endpoints
///
/// - `POST /link/token` - Create a link token for the client-side flow
/// - `POST /link/exchange` - Queue a public-token exchange
/// - `POST /webhooks/transactions` - Provider webhook intake
/// - `GET /accounts` - List mirrored accounts
/// - `GET /transactions` - List mirrored transactions
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/link/token", post(create_link_token))
        .route("/link/exchange", post(exchange_token))
        .route("/webhooks/transactions", post(receive_webhook))
        .route("/accounts", get(list_accounts))
        .route("/transactions", get(list_transactions))
        .with_state(state)
}
