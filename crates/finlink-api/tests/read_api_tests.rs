//! Integration tests for the read endpoints and intake routes.
//!
//! These tests require a running PostgreSQL instance.
//! Run with: `cargo test -p finlink-api -- --ignored`

mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let body = serde_json::from_slice(&bytes).expect("body is json");
    (status, body)
}

async fn post_json(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request builds"),
        )
        .await
        .expect("request succeeds");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let body = serde_json::from_slice(&bytes).expect("body is json");
    (status, body)
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_accounts_filtered_by_institution() {
    let pool = create_test_pool().await;
    let user = create_test_user(&pool).await;
    let item_a = create_test_item(&pool, user.id, "ins_a").await;
    let item_b = create_test_item(&pool, user.id, "ins_b").await;
    create_test_account(&pool, &item_a, "acc-a1").await;
    create_test_account(&pool, &item_a, "acc-a2").await;
    create_test_account(&pool, &item_b, "acc-b1").await;

    let (app, _rx) = test_app(pool);
    let uri = format!(
        "/accounts?username={}&institution_id=ins_a",
        user.username
    );
    let (status, body) = get_json(app, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["count"], json!(2));
    let data = body["data"].as_array().unwrap();
    assert!(data
        .iter()
        .all(|row| row["institution_id"] == json!("ins_a")));
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_transactions_paging_walks_in_insertion_order() {
    let pool = create_test_pool().await;
    let user = create_test_user(&pool).await;
    let item = create_test_item(&pool, user.id, "ins_1").await;
    for i in 0..25 {
        create_test_transaction(&pool, &item, &format!("{}-tx-{i:02}", item.item_id)).await;
    }

    let base = format!("/transactions?username={}", user.username);

    let (app, _rx) = test_app(pool.clone());
    let (status, body) = get_json(app, &base).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(25));
    assert_eq!(body["data"].as_array().unwrap().len(), 20);
    assert_eq!(body["previous"], Value::Null);
    let next = body["next"].as_str().expect("next link present");
    assert!(next.starts_with(TEST_SITE_URL));
    assert!(next.contains("page=2"));

    // First page is the oldest inserted rows.
    assert_eq!(
        body["data"][0]["transaction_id"],
        json!(format!("{}-tx-00", item.item_id))
    );

    let (app, _rx) = test_app(pool.clone());
    let (status, body) = get_json(app, &format!("{base}&page=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 5);
    assert_eq!(body["next"], Value::Null);
    assert!(body["previous"].as_str().unwrap().contains("page=1"));

    let (app, _rx) = test_app(pool);
    let (status, body) = get_json(app, &format!("{base}&page=3")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_unknown_parameter_rejected_by_name() {
    let pool = create_test_pool().await;
    let (app, _rx) = test_app(pool);

    let (status, body) = get_json(app, "/transactions?amount=12").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("amount"));
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_webhook_intake_logs_then_queues() {
    let pool = create_test_pool().await;
    let (app, mut rx) = test_app(pool.clone());

    let payload = json!({
        "webhook_type": "TRANSACTIONS",
        "webhook_code": "DEFAULT_UPDATE",
        "item_id": format!("item-{}", finlink_core::UserId::new()),
    });
    let (status, body) = post_json(app, "/webhooks/transactions", payload.clone()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let job = rx.recv().await.expect("job queued");
    assert_eq!(job.kind(), "process_webhook");

    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM webhook_events WHERE payload->>'item_id' = $1")
            .bind(payload["item_id"].as_str().unwrap())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_exchange_accepted_and_queued() {
    let pool = create_test_pool().await;
    let user = create_test_user(&pool).await;
    let (app, mut rx) = test_app(pool);

    let (status, body) = post_json(
        app,
        "/link/exchange",
        json!({
            "public_token": "public-sandbox-1",
            "user_id": user.id,
            "institution_id": "ins_1",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(rx.recv().await.expect("job queued").kind(), "exchange_token");
}

#[tokio::test]
#[ignore = "Requires database - run locally with DATABASE_URL"]
async fn test_link_token_for_unknown_user_is_404() {
    let pool = create_test_pool().await;
    let (app, _rx) = test_app(pool);

    let (status, body) = post_json(
        app,
        "/link/token",
        json!({ "user_id": finlink_core::UserId::new() }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}
