//! finlink core library.
//!
//! Shared strongly typed identifiers used across the finlink crates.
//!
//! # Example
//!
//! ```
//! use finlink_core::{LinkedItemId, UserId};
//!
//! let user = UserId::new();
//! let item = LinkedItemId::new();
//!
//! // Type safety: cannot pass a UserId where a LinkedItemId is expected
//! fn requires_item(id: LinkedItemId) -> String {
//!     id.to_string()
//! }
//!
//! let _ = requires_item(item);
//! ```

pub mod ids;

pub use ids::{LinkedItemId, ParseIdError, UserId};
