//! Request and response bodies for the link flow and webhook intake.

use finlink_core::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for `POST /link/token`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkTokenRequest {
    /// The user the client-side linking flow is for.
    pub user_id: UserId,
}

/// Response body for `POST /link/token`.
#[derive(Debug, Serialize, ToSchema)]
pub struct LinkTokenResponse {
    pub success: bool,
    /// Short-lived token the client hands to the provider's link widget.
    pub link_token: String,
    pub expiration: Option<String>,
    pub request_id: String,
}

/// Request body for `POST /link/exchange`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ExchangeTokenRequest {
    /// One-time public token produced by the client-side linking flow.
    pub public_token: String,
    pub user_id: UserId,
    /// Provider identifier of the institution being linked.
    pub institution_id: String,
}

/// Generic acknowledgement body for accepted asynchronous work.
#[derive(Debug, Serialize, ToSchema)]
pub struct AcceptedResponse {
    pub success: bool,
    pub message: String,
}

impl AcceptedResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}
