//! Client adapter for the upstream banking-data provider.
//!
//! Wraps the provider's REST API behind the [`ProviderClient`] trait:
//! token exchange, account and transaction retrieval (with transparent
//! offset pagination) and webhook registration. Errors are classified
//! transient vs permanent so callers can retry safely via
//! [`resilience::RetryExecutor`].

pub mod client;
pub mod error;
pub mod resilience;
pub mod types;

pub use client::{ProviderClient, ProviderConfig, RestProviderClient};
pub use error::{ProviderError, ProviderResult};
pub use resilience::{RetryConfig, RetryExecutor};
pub use types::{AccountSnapshot, LinkToken, TokenExchange, TransactionSnapshot};
