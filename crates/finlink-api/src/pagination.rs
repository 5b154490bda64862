//! Page-number pagination for the read endpoints.
//!
//! Fixed page size of 20, absolute next/previous links built from the
//! configured site URL so responses are client-walkable without string
//! surgery.

use std::collections::HashMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;

/// Fixed number of rows per page.
pub const PAGE_SIZE: i64 = 20;

/// Response envelope for the read endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    AccountListResponse = ListResponse<finlink_db::AccountWithOwner>,
    TransactionListResponse = ListResponse<finlink_db::TransactionWithOwner>
)]
pub struct ListResponse<T: for<'a> ToSchema<'a>> {
    /// Always `true` on success responses.
    pub success: bool,
    /// Absolute URL of the next page, if any.
    pub next: Option<String>,
    /// Absolute URL of the previous page, if any.
    pub previous: Option<String>,
    /// Total number of rows matching the filter, across all pages.
    pub count: i64,
    /// The rows of the requested page.
    pub data: Vec<T>,
}

/// A page request validated against the total row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub total_pages: u32,
}

impl Page {
    /// Validate `page` against `count` rows.
    ///
    /// An empty result set still has one (empty) page; anything past the
    /// last page is an error rather than an empty success.
    pub fn new(page: u32, count: i64) -> Result<Self, ApiError> {
        let total_pages = total_pages(count);
        if page > total_pages {
            return Err(ApiError::InvalidPage);
        }
        Ok(Self {
            number: page,
            total_pages,
        })
    }

    /// Row offset of this page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.number - 1) * PAGE_SIZE
    }

    /// Absolute links to the next and previous pages, carrying the
    /// original filter parameters.
    #[must_use]
    pub fn links(
        &self,
        site_url: &str,
        path: &str,
        params: &HashMap<String, String>,
    ) -> (Option<String>, Option<String>) {
        let next = (self.number < self.total_pages)
            .then(|| page_url(site_url, path, params, self.number + 1));
        let previous = (self.number > 1).then(|| page_url(site_url, path, params, self.number - 1));
        (next, previous)
    }
}

/// Number of pages needed for `count` rows; zero rows still occupy one page.
fn total_pages(count: i64) -> u32 {
    let pages = (count + PAGE_SIZE - 1) / PAGE_SIZE;
    u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
}

/// Build an absolute page URL preserving every non-page query parameter.
///
/// Values arrive decoded from the request extractor, so they are
/// re-encoded here; a username containing `&` or `=` must survive the
/// round trip through the emitted link.
fn page_url(site_url: &str, path: &str, params: &HashMap<String, String>, page: u32) -> String {
    let mut pairs: Vec<(&str, &str)> = params
        .iter()
        .filter(|(k, _)| k.as_str() != "page")
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    pairs.sort_unstable();
    let page = page.to_string();
    pairs.push(("page", page.as_str()));

    // Serializing string pairs cannot fail.
    let query = serde_urlencoded::to_string(&pairs).unwrap_or_default();
    format!("{}{}?{}", site_url.trim_end_matches('/'), path, query)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_total_pages_rounding() {
        assert_eq!(total_pages(0), 1);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(20), 1);
        assert_eq!(total_pages(21), 2);
        assert_eq!(total_pages(40), 2);
        assert_eq!(total_pages(41), 3);
    }

    #[test]
    fn test_page_beyond_range_is_error() {
        assert!(Page::new(2, 20).is_err());
        assert!(Page::new(2, 21).is_ok());
        assert!(Page::new(1, 0).is_ok());
    }

    #[test]
    fn test_offset_math() {
        assert_eq!(Page::new(1, 100).unwrap().offset(), 0);
        assert_eq!(Page::new(3, 100).unwrap().offset(), 40);
    }

    #[test]
    fn test_links_on_middle_page() {
        let page = Page::new(2, 50).unwrap();
        let (next, previous) = page.links(
            "https://finlink.example.com",
            "/transactions",
            &params(&[("username", "sam"), ("page", "2")]),
        );
        assert_eq!(
            next.as_deref(),
            Some("https://finlink.example.com/transactions?username=sam&page=3")
        );
        assert_eq!(
            previous.as_deref(),
            Some("https://finlink.example.com/transactions?username=sam&page=1")
        );
    }

    #[test]
    fn test_links_encode_reserved_characters() {
        let page = Page::new(1, 50).unwrap();
        let (next, _) = page.links(
            "https://finlink.example.com",
            "/transactions",
            &params(&[("username", "a&active=true"), ("page", "1")]),
        );
        assert_eq!(
            next.as_deref(),
            Some("https://finlink.example.com/transactions?username=a%26active%3Dtrue&page=2")
        );
    }

    #[test]
    fn test_links_on_single_page() {
        let page = Page::new(1, 5).unwrap();
        let (next, previous) =
            page.links("https://finlink.example.com", "/accounts", &HashMap::new());
        assert_eq!(next, None);
        assert_eq!(previous, None);
    }
}
