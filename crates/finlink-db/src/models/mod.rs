//! Database models for the finlink mirror.

pub mod account;
pub mod linked_item;
pub mod transaction;
pub mod user;
pub mod webhook_event;

pub use account::{Account, AccountWithOwner, NewAccount};
pub use linked_item::{CreateLinkedItem, LinkedItem};
pub use transaction::{NewTransaction, Transaction, TransactionWithOwner};
pub use user::User;
pub use webhook_event::WebhookEvent;

use finlink_core::{LinkedItemId, UserId};

/// Immutable filter specification for the read API list queries.
///
/// Built once from validated query parameters and passed by reference;
/// never mutated between requests. The same allow-list applies to both
/// accounts and transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    /// Local row identifier.
    pub id: Option<i64>,
    /// Owning linked item.
    pub linked_item_id: Option<LinkedItemId>,
    /// Owning user, via the linked item.
    pub user_id: Option<UserId>,
    /// Owning user's username, via the linked item.
    pub username: Option<String>,
    /// Institution of the linked item.
    pub institution_id: Option<String>,
    /// Active flag on the row itself.
    pub active: Option<bool>,
}

impl ListFilter {
    /// An empty filter matching every row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no predicate is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Append `WHERE`/`AND` clauses for the shared list filter, qualifying
/// row-level columns with the `row` table alias. The joined item and user
/// tables are always aliased `li` and `u`. Returns the next free bind
/// position.
///
/// Clause order must match the bind order of [`bind_filter!`].
pub(crate) fn push_filter_clauses(query: &mut String, filter: &ListFilter, row: &str) -> usize {
    let mut param_idx = 1;
    let mut push = |query: &mut String, clause: String| {
        if param_idx == 1 {
            query.push_str(" WHERE ");
        } else {
            query.push_str(" AND ");
        }
        query.push_str(&format!("{clause} ${param_idx}"));
        param_idx += 1;
    };

    if filter.id.is_some() {
        push(query, format!("{row}.id ="));
    }
    if filter.linked_item_id.is_some() {
        push(query, format!("{row}.linked_item_id ="));
    }
    if filter.user_id.is_some() {
        push(query, "li.user_id =".to_string());
    }
    if filter.username.is_some() {
        push(query, "u.username =".to_string());
    }
    if filter.institution_id.is_some() {
        push(query, "li.institution_id =".to_string());
    }
    if filter.active.is_some() {
        push(query, format!("{row}.active ="));
    }

    param_idx
}

/// Bind the set predicates of a [`ListFilter`] in clause order. A macro
/// because `query_as` and `query_scalar` builders share no `bind` trait.
macro_rules! bind_filter {
    ($query:expr, $filter:expr) => {{
        let mut q = $query;
        if let Some(id) = $filter.id {
            q = q.bind(id);
        }
        if let Some(linked_item_id) = $filter.linked_item_id {
            q = q.bind(linked_item_id);
        }
        if let Some(user_id) = $filter.user_id {
            q = q.bind(user_id);
        }
        if let Some(ref username) = $filter.username {
            q = q.bind(username);
        }
        if let Some(ref institution_id) = $filter.institution_id {
            q = q.bind(institution_id);
        }
        if let Some(active) = $filter.active {
            q = q.bind(active);
        }
        q
    }};
}
pub(crate) use bind_filter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter() {
        let filter = ListFilter::new();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_filter_with_predicate_is_not_empty() {
        let filter = ListFilter {
            active: Some(true),
            ..ListFilter::default()
        };
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_filter_clauses_empty() {
        let mut query = String::new();
        let next = push_filter_clauses(&mut query, &ListFilter::default(), "a");
        assert_eq!(next, 1);
        assert!(query.is_empty());
    }

    #[test]
    fn test_filter_clauses_single() {
        let mut query = String::new();
        let filter = ListFilter {
            active: Some(true),
            ..ListFilter::default()
        };
        let next = push_filter_clauses(&mut query, &filter, "a");
        assert_eq!(next, 2);
        assert_eq!(query, " WHERE a.active = $1");
    }

    #[test]
    fn test_filter_clauses_combined() {
        let mut query = String::new();
        let filter = ListFilter {
            institution_id: Some("ins_1".to_string()),
            active: Some(false),
            username: Some("sam".to_string()),
            ..ListFilter::default()
        };
        let next = push_filter_clauses(&mut query, &filter, "t");
        assert_eq!(next, 4);
        assert_eq!(
            query,
            " WHERE u.username = $1 AND li.institution_id = $2 AND t.active = $3"
        );
    }

    #[test]
    fn test_filter_clauses_all_fields() {
        let filter = ListFilter {
            id: Some(7),
            linked_item_id: Some(LinkedItemId::new()),
            user_id: Some(UserId::new()),
            username: Some("sam".to_string()),
            institution_id: Some("ins_1".to_string()),
            active: Some(true),
        };

        let mut query = String::new();
        let next = push_filter_clauses(&mut query, &filter, "t");
        assert_eq!(next, 7);
        assert_eq!(
            query,
            " WHERE t.id = $1 AND t.linked_item_id = $2 AND li.user_id = $3 \
             AND u.username = $4 AND li.institution_id = $5 AND t.active = $6"
        );
    }

    #[test]
    fn test_filter_clauses_same_shape_for_both_aliases() {
        let filter = ListFilter {
            user_id: Some(UserId::new()),
            active: Some(true),
            ..ListFilter::default()
        };

        let mut accounts = String::new();
        let mut transactions = String::new();
        push_filter_clauses(&mut accounts, &filter, "a");
        push_filter_clauses(&mut transactions, &filter, "t");
        assert_eq!(accounts.replace("a.", "t."), transactions);
    }
}
