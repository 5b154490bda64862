//! Read endpoint for mirrored accounts.

use std::collections::HashMap;

use axum::extract::{Query, State};
use axum::Json;
use finlink_db::{Account, AccountWithOwner};

use crate::error::{ApiError, ErrorBody};
use crate::pagination::{AccountListResponse, ListResponse, Page, PAGE_SIZE};
use crate::router::ApiState;
use crate::validation::parse_list_query;

/// List mirrored accounts.
///
/// Rows are ordered by insertion identifier ascending, so the listing is
/// stable across pages while new data arrives.
#[utoipa::path(
    get,
    path = "/accounts",
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
        (status = 200, description = "One page of accounts", body = AccountListResponse),
        (status = 400, description = "Unknown or invalid parameters", body = ErrorBody),
        (status = 404, description = "Page out of range", body = ErrorBody),
    )
)]
pub async fn list_accounts(
    State(state): State<ApiState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ListResponse<AccountWithOwner>>, ApiError> {
    let query = parse_list_query(&params)?;

    let count = Account::count(&state.pool, &query.filter).await?;
    let page = Page::new(query.page, count)?;
    let data = Account::list(&state.pool, &query.filter, PAGE_SIZE, page.offset()).await?;
    let (next, previous) = page.links(&state.site_url, "/accounts", &params);

    Ok(Json(ListResponse {
        success: true,
        next,
        previous,
        count,
        data,
    }))
}
