//! Link flow handlers: token creation and public-token exchange.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use finlink_db::User;
use finlink_sync::SyncJob;
use tracing::info;

use crate::error::{ApiError, ErrorBody};
use crate::models::{AcceptedResponse, ExchangeTokenRequest, LinkTokenRequest, LinkTokenResponse};
use crate::router::ApiState;

/// Create a link token for the client-side linking flow.
///
/// Synchronous: the client needs the token in the response to open the
/// provider's widget.
#[utoipa::path(
    post,
    path = "/link/token",
    tag = "link",
    request_body = LinkTokenRequest,
    responses(
        (status = 200, description = "Link token created", body = LinkTokenResponse),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 502, description = "Provider unavailable", body = ErrorBody),
    )
)]
pub async fn create_link_token(
    State(state): State<ApiState>,
    Json(request): Json<LinkTokenRequest>,
) -> Result<Json<LinkTokenResponse>, ApiError> {
    let Some(user) = User::find_by_id(&state.pool, request.user_id).await? else {
        return Err(ApiError::NotFound(format!("user {}", request.user_id)));
    };

    let token = state
        .provider
        .create_link_token(&user.id.to_string())
        .await?;

    Ok(Json(LinkTokenResponse {
        success: true,
        link_token: token.link_token,
        expiration: token.expiration,
        request_id: token.request_id,
    }))
}

/// Queue a public-token exchange.
///
/// The exchange itself talks to the provider and can be slow or fail
/// transiently, so it runs on the worker pool; the response only confirms
/// the job was accepted.
#[utoipa::path(
    post,
    path = "/link/exchange",
    tag = "link",
    request_body = ExchangeTokenRequest,
    responses(
        (status = 202, description = "Exchange queued", body = AcceptedResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
    )
)]
pub async fn exchange_token(
    State(state): State<ApiState>,
    Json(request): Json<ExchangeTokenRequest>,
) -> Result<(StatusCode, Json<AcceptedResponse>), ApiError> {
    if request.public_token.is_empty() {
        return Err(ApiError::Validation("public_token must not be empty".to_string()));
    }
    if request.institution_id.is_empty() {
        return Err(ApiError::Validation(
            "institution_id must not be empty".to_string(),
        ));
    }

    info!(
        user_id = %request.user_id,
        institution_id = %request.institution_id,
        "Queueing public token exchange"
    );

    state.queue.enqueue(SyncJob::ExchangeToken {
        public_token: request.public_token,
        user_id: request.user_id,
        institution_id: request.institution_id,
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(AcceptedResponse::new("Exchange queued for processing")),
    ))
}
