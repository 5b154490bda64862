//! Webhook intake.
//!
//! The raw payload is persisted before anything interprets it, so the
//! audit log survives processing failures; interpretation happens on the
//! worker pool.

use axum::extract::State;
use axum::Json;
use finlink_db::WebhookEvent;
use finlink_sync::SyncJob;
use serde_json::Value as JsonValue;
use tracing::info;

use crate::error::{ApiError, ErrorBody};
use crate::models::AcceptedResponse;
use crate::router::ApiState;

/// Receive a provider transactions webhook.
#[utoipa::path(
    post,
    path = "/webhooks/transactions",
    tag = "webhooks",
    responses(
        (status = 200, description = "Webhook logged and queued", body = AcceptedResponse),
        (status = 500, description = "Payload could not be persisted", body = ErrorBody),
    )
)]
pub async fn receive_webhook(
    State(state): State<ApiState>,
    Json(payload): Json<JsonValue>,
) -> Result<Json<AcceptedResponse>, ApiError> {
    let event = WebhookEvent::create(&state.pool, &payload).await?;
    info!(
        event_id = event.id,
        webhook_type = payload.get("webhook_type").and_then(JsonValue::as_str),
        webhook_code = payload.get("webhook_code").and_then(JsonValue::as_str),
        "Logged inbound webhook"
    );

    state.queue.enqueue(SyncJob::ProcessWebhook { payload });

    Ok(Json(AcceptedResponse::new("Webhook accepted")))
}
