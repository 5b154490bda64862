//! Read endpoint for mirrored transactions.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use finlink_db::{Transaction, TransactionWithOwner};

use crate::error::{ApiError, ErrorBody};
use crate::pagination::{ListResponse, Page, TransactionListResponse, PAGE_SIZE};
use crate::router::ApiState;
use crate::validation::parse_list_query;

/// List mirrored transactions.
///
/// Soft-deleted rows stay listable (`active=false`) so consumers can see
/// what the provider retracted.
#[utoipa::path(
    get,
    path = "/transactions",
    tag = "read",
    params(
        ("id" = Option<i64>, Query, description = "Filter by local row ID"),
        ("linked_item_id" = Option<String>, Query, description = "Filter by linked item"),
        ("user_id" = Option<String>, Query, description = "Filter by owning user"),
        ("username" = Option<String>, Query, description = "Filter by owning username"),
        ("institution_id" = Option<String>, Query, description = "Filter by institution"),
        ("active" = Option<bool>, Query, description = "Filter by active flag"),
        ("page" = Option<u32>, Query, description = "Page number, starting at 1"),
    ),
    responses(
        (status = 200, description = "One page of transactions", body = TransactionListResponse),
        (status = 400, description = "Unknown or invalid parameters", body = ErrorBody),
        (status = 404, description = "Page out of range", body = ErrorBody),
    )
)]
pub async fn list_transactions(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListResponse<TransactionWithOwner>>, ApiError> {
    let query = parse_list_query(&params)?;

    let count = Transaction::count(&state.pool, &query.filter).await?;
    let page = Page::new(query.page, count)?;
    let data = Transaction::list(&state.pool, &query.filter, PAGE_SIZE, page.offset()).await?;
    let (next, previous) = page.links(&state.site_url, "/transactions", &params);

    Ok(Json(ListResponse {
        success: true,
        next,
        previous,
        count,
        data,
    }))
}
