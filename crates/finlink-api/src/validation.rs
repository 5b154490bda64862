//! Query parameter validation for the read endpoints.
//!
//! Both read endpoints accept the same allow-listed filter set. Anything
//! outside the list rejects the whole request with a message naming the
//! offending parameters, so typos fail loudly instead of silently
//! returning the unfiltered collection.

use std::collections::HashMap;

use finlink_db::ListFilter;

use crate::error::ApiError;

/// Parameters the read endpoints accept.
pub const ALLOWED_PARAMS: &[&str] = &[
    "id",
    "linked_item_id",
    "user_id",
    "username",
    "institution_id",
    "active",
    "page",
];

/// A validated read-endpoint query: the filter plus the requested page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub filter: ListFilter,
    pub page: u32,
}

/// Validate raw query parameters into a [`ListQuery`].
///
/// # Errors
///
/// Returns `ApiError::Validation` naming every unknown parameter, or
/// describing the first value that fails to parse.
pub fn parse_list_query(params: &HashMap<String, String>) -> Result<ListQuery, ApiError> {
    let mut unknown: Vec<&str> = params
        .keys()
        .map(String::as_str)
        .filter(|k| !ALLOWED_PARAMS.contains(k))
        .collect();

    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(ApiError::Validation(format!(
            "Unknown query parameters: {}",
            unknown.join(", ")
        )));
    }

    let filter = ListFilter {
        id: parse_param(params, "id")?,
        linked_item_id: parse_param(params, "linked_item_id")?,
        user_id: parse_param(params, "user_id")?,
        username: params.get("username").cloned(),
        institution_id: params.get("institution_id").cloned(),
        active: match params.get("active").map(String::as_str) {
            None => None,
            Some(v) if v.eq_ignore_ascii_case("true") => Some(true),
            Some(v) if v.eq_ignore_ascii_case("false") => Some(false),
            Some(v) => {
                return Err(ApiError::Validation(format!(
                    "Invalid value for active: {v}"
                )))
            }
        },
    };

    let page = match params.get("page") {
        None => 1,
        Some(v) => match v.parse::<u32>() {
            Ok(p) if p >= 1 => p,
            _ => {
                return Err(ApiError::Validation(format!("Invalid value for page: {v}")));
            }
        },
    };

    Ok(ListQuery { filter, page })
}

fn parse_param<T: std::str::FromStr>(
    params: &HashMap<String, String>,
    name: &str,
) -> Result<Option<T>, ApiError> {
    match params.get(name) {
        None => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|_| ApiError::Validation(format!("Invalid value for {name}: {v}"))),
    }
}
