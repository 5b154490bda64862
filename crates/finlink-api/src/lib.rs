//! HTTP surface of the finlink mirror.
//!
//! Three groups of routes: the link flow (token creation and queued
//! public-token exchange), provider webhook intake, and the paginated
//! read endpoints over the mirrored accounts and transactions.

pub mod error;
pub mod handlers;
pub mod models;
pub mod pagination;
pub mod router;
pub mod validation;

pub use error::{ApiError, ErrorBody};
pub use pagination::{ListResponse, Page, PAGE_SIZE};
pub use router::{router, ApiState};
pub use validation::{parse_list_query, ListQuery, ALLOWED_PARAMS};
