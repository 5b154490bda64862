//! Provider client trait and REST implementation.
//!
//! The provider exposes a JSON-over-POST API authenticated with a client
//! ID/secret pair plus a per-item access token. `fetch_transactions`
//! paginates transparently: the first page reports the total count and the
//! loop continues with offset-based requests until everything is retrieved.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{ProviderError, ProviderResult};
use crate::types::{AccountSnapshot, LinkToken, TokenExchange, TransactionSnapshot};

/// Fixed transaction page size requested from the provider.
pub const TRANSACTION_PAGE_SIZE: usize = 500;

/// Operations against the upstream banking-data provider.
///
/// The adapter is constructed once at process start and passed into every
/// reconciler and task explicitly; nothing looks it up from ambient scope.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Create a link token for the client-side linking flow.
    async fn create_link_token(&self, client_user_id: &str) -> ProviderResult<LinkToken>;

    /// Exchange a public token for a long-lived access token.
    async fn exchange_public_token(&self, public_token: &str) -> ProviderResult<TokenExchange>;

    /// Fetch all accounts visible through an access token.
    async fn fetch_accounts(&self, access_token: &str) -> ProviderResult<Vec<AccountSnapshot>>;

    /// Fetch all transactions in `[start_date, end_date]` (inclusive),
    /// following offset pagination until the reported total is retrieved.
    async fn fetch_transactions(
        &self,
        access_token: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ProviderResult<Vec<TransactionSnapshot>>;

    /// Register the webhook callback URL for an access token.
    async fn update_webhook(&self, access_token: &str, url: &str) -> ProviderResult<()>;
}

/// Configuration for the REST provider client.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Base URL of the provider environment (sandbox/development/production).
    pub base_url: String,
    pub client_id: String,
    pub secret: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Create a config with the default 30 second timeout.
    pub fn new(
        base_url: impl Into<String>,
        client_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            secret: secret.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Error body returned by the provider on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    error_type: String,
    #[serde(default)]
    error_code: String,
    #[serde(default)]
    error_message: String,
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    accounts: Vec<AccountSnapshot>,
}

#[derive(Debug, Deserialize)]
struct TransactionsResponse {
    transactions: Vec<TransactionSnapshot>,
    total_transactions: usize,
}

/// HTTP implementation of [`ProviderClient`].
pub struct RestProviderClient {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl RestProviderClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::InvalidRequest` if the HTTP client cannot be
    /// constructed from the configuration.
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::invalid_request(format!("HTTP client build: {e}")))?;

        Ok(Self { config, client })
    }

    /// POST a JSON body (client credentials injected) and decode the response.
    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        mut body: serde_json::Value,
    ) -> ProviderResult<T> {
        if let Some(map) = body.as_object_mut() {
            map.insert("client_id".to_string(), json!(self.config.client_id));
            map.insert("secret".to_string(), json!(self.config.secret));
        }

        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        message: format!("POST {path}: {e}"),
                    }
                } else {
                    ProviderError::network_with_source(format!("POST {path}"), e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.json::<ProviderErrorBody>().await.ok();
            return Err(classify_http_error(status, path, error_body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ProviderError::malformed(format!("POST {path}: {e}")))
    }
}

/// Map a non-2xx response to a classified provider error.
fn classify_http_error(
    status: StatusCode,
    path: &str,
    body: Option<ProviderErrorBody>,
) -> ProviderError {
    let detail = body
        .as_ref()
        .map(|b| format!("{} {}: {}", b.error_type, b.error_code, b.error_message))
        .unwrap_or_else(|| format!("HTTP {status} from {path}"));

    // The provider's own error_type is more precise than the HTTP status.
    if let Some(b) = &body {
        match b.error_type.as_str() {
            "RATE_LIMIT_EXCEEDED" => return ProviderError::RateLimited { message: detail },
            "INSTITUTION_ERROR" => {
                return ProviderError::InstitutionUnavailable { message: detail }
            }
            "API_ERROR" => return ProviderError::ProviderUnavailable { message: detail },
            "INVALID_INPUT" | "INVALID_REQUEST" => {
                return ProviderError::InvalidRequest { message: detail }
            }
            _ => {}
        }
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ProviderError::InvalidCredentials { message: detail }
        }
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited { message: detail },
        s if s.is_server_error() => ProviderError::ProviderUnavailable { message: detail },
        _ => ProviderError::InvalidRequest { message: detail },
    }
}

#[async_trait]
impl ProviderClient for RestProviderClient {
    async fn create_link_token(&self, client_user_id: &str) -> ProviderResult<LinkToken> {
        self.post(
            "/link/token/create",
            json!({
                "user": { "client_user_id": client_user_id },
                "products": ["transactions"],
                "client_name": "finlink",
                "country_codes": ["US"],
                "language": "en",
            }),
        )
        .await
    }

    async fn exchange_public_token(&self, public_token: &str) -> ProviderResult<TokenExchange> {
        let exchange: TokenExchange = self
            .post(
                "/item/public_token/exchange",
                json!({ "public_token": public_token }),
            )
            .await?;
        info!(item_id = %exchange.item_id, request_id = %exchange.request_id, "Exchanged public token");
        Ok(exchange)
    }

    async fn fetch_accounts(&self, access_token: &str) -> ProviderResult<Vec<AccountSnapshot>> {
        let response: AccountsResponse = self
            .post("/accounts/get", json!({ "access_token": access_token }))
            .await?;
        debug!(count = response.accounts.len(), "Fetched accounts");
        Ok(response.accounts)
    }

    async fn fetch_transactions(
        &self,
        access_token: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> ProviderResult<Vec<TransactionSnapshot>> {
        let first: TransactionsResponse = self
            .post(
                "/transactions/get",
                json!({
                    "access_token": access_token,
                    "start_date": start_date,
                    "end_date": end_date,
                    "options": { "count": TRANSACTION_PAGE_SIZE, "offset": 0 },
                }),
            )
            .await?;

        let total = first.total_transactions;
        let mut transactions = first.transactions;

        while transactions.len() < total {
            let page: TransactionsResponse = self
                .post(
                    "/transactions/get",
                    json!({
                        "access_token": access_token,
                        "start_date": start_date,
                        "end_date": end_date,
                        "options": {
                            "count": TRANSACTION_PAGE_SIZE,
                            "offset": transactions.len(),
                        },
                    }),
                )
                .await?;

            if page.transactions.is_empty() {
                // The provider reported more rows than it will serve; stop
                // rather than loop forever.
                return Err(ProviderError::malformed(format!(
                    "pagination stalled at {} of {total} transactions",
                    transactions.len()
                )));
            }
            transactions.extend(page.transactions);
        }

        debug!(
            count = transactions.len(),
            %start_date,
            %end_date,
            "Fetched transaction window"
        );
        Ok(transactions)
    }

    async fn update_webhook(&self, access_token: &str, url: &str) -> ProviderResult<()> {
        let _: serde_json::Value = self
            .post(
                "/item/webhook/update",
                json!({ "access_token": access_token, "webhook": url }),
            )
            .await?;
        info!(webhook_url = url, "Updated provider webhook URL");
        Ok(())
    }
}
