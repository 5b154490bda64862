//! `OpenAPI` documentation and Swagger UI configuration.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use finlink_api::models::{
    AcceptedResponse, ExchangeTokenRequest, LinkTokenRequest, LinkTokenResponse,
};
use finlink_api::pagination::{AccountListResponse, TransactionListResponse};
use finlink_api::ErrorBody;
use finlink_db::{AccountWithOwner, TransactionWithOwner};

/// `OpenAPI` documentation for the finlink API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "finlink API",
        version = "0.1.0",
        description = "Banking-data mirror: link flow, webhook intake and read API"
    ),
    paths(
        finlink_api::handlers::link::create_link_token,
        finlink_api::handlers::link::exchange_token,
        finlink_api::handlers::webhooks::receive_webhook,
        finlink_api::handlers::accounts::list_accounts,
        finlink_api::handlers::transactions::list_transactions,
    ),
    components(schemas(
        AcceptedResponse,
        AccountListResponse,
        AccountWithOwner,
        ErrorBody,
        ExchangeTokenRequest,
        LinkTokenRequest,
        LinkTokenResponse,
        TransactionListResponse,
        TransactionWithOwner,
    )),
    tags(
        (name = "link", description = "Institution linking flow"),
        (name = "webhooks", description = "Provider webhook intake"),
        (name = "read", description = "Mirrored accounts and transactions"),
    )
)]
pub struct ApiDoc;

/// Swagger UI routes serving the generated document.
pub fn swagger_routes() -> Router {
    Router::new().merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
