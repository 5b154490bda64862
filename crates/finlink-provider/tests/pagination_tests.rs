//! Pagination and classification tests for the REST provider client.
//!
//! Runs [`RestProviderClient`] against a wiremock server to verify that
//! the transaction loop follows offsets until the reported total is
//! assembled and that HTTP failures classify correctly.

use chrono::NaiveDate;
use finlink_provider::{ProviderClient, ProviderConfig, ProviderError, RestProviderClient};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

fn client_for(server: &MockServer) -> RestProviderClient {
    RestProviderClient::new(ProviderConfig::new(server.uri(), "client-id", "secret"))
        .expect("client builds")
}

fn tx_json(i: usize) -> Value {
    json!({
        "transaction_id": format!("tx-{i}"),
        "account_id": "acc-1",
        "amount": 4.25,
        "name": format!("Purchase {i}"),
        "payment_channel": "online",
        "pending": false,
        "date": "2024-03-02",
        "location": {},
        "payment_meta": {}
    })
}

fn window() -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(2024, 2, 1).expect("valid date"),
        NaiveDate::from_ymd_opt(2024, 3, 2).expect("valid date"),
    )
}

/// Serves slices of a fixed transaction list keyed on the request's
/// `options.offset`, the way the provider paginates.
struct OffsetResponder {
    total: usize,
    page_size: usize,
}

impl Respond for OffsetResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).expect("json body");
        let offset = body["options"]["offset"].as_u64().unwrap_or(0) as usize;
        let end = (offset + self.page_size).min(self.total);
        let transactions: Vec<Value> = (offset..end).map(tx_json).collect();

        ResponseTemplate::new(200).set_body_json(json!({
            "transactions": transactions,
            "total_transactions": self.total,
        }))
    }
}

#[tokio::test]
async fn test_fetch_transactions_single_page() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transactions/get"))
        .respond_with(OffsetResponder {
            total: 3,
            page_size: 500,
        })
        .mount(&server)
        .await;

    let (start, end) = window();
    let transactions = client_for(&server)
        .fetch_transactions("access-token", start, end)
        .await
        .expect("fetch succeeds");

    assert_eq!(transactions.len(), 3);
    assert_eq!(transactions[0].transaction_id, "tx-0");
}

#[tokio::test]
async fn test_fetch_transactions_follows_offsets_to_total() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/transactions/get"))
        .respond_with(OffsetResponder {
            total: 1200,
            page_size: 500,
        })
        .expect(3)
        .mount(&server)
        .await;

    let (start, end) = window();
    let transactions = client_for(&server)
        .fetch_transactions("access-token", start, end)
        .await
        .expect("fetch succeeds");

    assert_eq!(transactions.len(), 1200);
    assert_eq!(transactions[499].transaction_id, "tx-499");
    assert_eq!(transactions[1199].transaction_id, "tx-1199");
}

#[tokio::test]
async fn test_fetch_transactions_stalled_pagination_is_malformed() {
    // Claims 600 rows but serves nothing past the first page.
    let server_short = MockServer::start().await;
    struct ShortResponder;
    impl Respond for ShortResponder {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let body: Value = serde_json::from_slice(&request.body).expect("json body");
            let offset = body["options"]["offset"].as_u64().unwrap_or(0) as usize;
            let transactions: Vec<Value> = if offset == 0 {
                (0..500).map(tx_json).collect()
            } else {
                Vec::new()
            };
            ResponseTemplate::new(200).set_body_json(json!({
                "transactions": transactions,
                "total_transactions": 600,
            }))
        }
    }
    Mock::given(method("POST"))
        .and(path("/transactions/get"))
        .respond_with(ShortResponder)
        .mount(&server_short)
        .await;

    let (start, end) = window();
    let err = client_for(&server_short)
        .fetch_transactions("access-token", start, end)
        .await
        .expect_err("stalled pagination must fail");

    assert!(matches!(err, ProviderError::MalformedResponse { .. }));
}

#[tokio::test]
async fn test_rate_limited_response_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts/get"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error_type": "RATE_LIMIT_EXCEEDED",
            "error_code": "ACCOUNTS_LIMIT",
            "error_message": "rate limit exceeded"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_accounts("access-token")
        .await
        .expect_err("429 must fail");

    assert!(matches!(err, ProviderError::RateLimited { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_exchange_decodes_token_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/item/public_token/exchange"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-sandbox-123",
            "item_id": "item-abc",
            "request_id": "req-1"
        })))
        .mount(&server)
        .await;

    let exchange = client_for(&server)
        .exchange_public_token("public-sandbox-123")
        .await
        .expect("exchange succeeds");

    assert_eq!(exchange.access_token, "access-sandbox-123");
    assert_eq!(exchange.item_id, "item-abc");
}

#[tokio::test]
async fn test_invalid_credentials_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accounts/get"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error_type": "INVALID_INPUT",
            "error_code": "INVALID_ACCESS_TOKEN",
            "error_message": "could not find matching access token"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fetch_accounts("access-token")
        .await
        .expect_err("401 must fail");

    assert!(err.is_permanent());
}
