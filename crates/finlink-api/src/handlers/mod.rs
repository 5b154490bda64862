//! HTTP request handlers.

pub mod accounts;
pub mod link;
pub mod transactions;
pub mod webhooks;

pub use accounts::list_accounts;
pub use link::{create_link_token, exchange_token};
pub use transactions::list_transactions;
pub use webhooks::receive_webhook;
