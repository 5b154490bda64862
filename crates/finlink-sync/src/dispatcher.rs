//! Webhook dispatcher.
//!
//! Turns an inbound provider webhook into an explicit action. Planning is a
//! pure function over the payload and today's date; execution looks up the
//! linked item and drives the reconcilers.

use chrono::{Days, Months, NaiveDate, Utc};
use finlink_db::LinkedItem;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::{SyncError, SyncResult};
use crate::transactions::TransactionReconciler;

/// Days of history covered by an incremental update.
const DEFAULT_UPDATE_DAYS: u64 = 7;

/// Months of history covered by the historical backfill.
const HISTORICAL_UPDATE_MONTHS: u32 = 24;

/// The webhook fields the dispatcher acts on. Unknown fields are ignored;
/// the full payload is already persisted verbatim by the intake handler.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    pub webhook_type: String,
    pub webhook_code: String,
    pub item_id: String,
    #[serde(default)]
    pub removed_transactions: Vec<String>,
}

/// What a webhook asks us to do, decided before touching any state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchPlan {
    /// Reconcile the transaction window `[start_date, end_date]`.
    Reconcile {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    /// Deactivate the listed provider transaction IDs.
    Remove { transaction_ids: Vec<String> },
    /// Nothing to do.
    Ignore(IgnoreReason),
}

/// Why a webhook was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Not a transactions webhook.
    NonTransaction,
    /// Initial update; the historical backfill that follows covers a
    /// superset of its window.
    InitialUpdate,
    /// A transactions code this service does not handle.
    UnknownCode,
}

/// Result of executing a webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The plan ran against the item's mirror.
    Handled(SyncReport),
    /// The webhook required no action.
    Ignored(IgnoreReason),
    /// No active linked item matches the payload's `item_id`.
    ItemNotFound { item_id: String },
}

/// What a handled webhook changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncReport {
    Reconciled {
        start_date: NaiveDate,
        end_date: NaiveDate,
        inserted: usize,
    },
    Removed { deactivated: u64 },
}

/// Classify a webhook payload into a plan. Pure; `today` is injected so
/// window math is testable.
pub fn plan(payload: &WebhookPayload, today: NaiveDate) -> DispatchPlan {
    if payload.webhook_type != "TRANSACTIONS" {
        return DispatchPlan::Ignore(IgnoreReason::NonTransaction);
    }

    match payload.webhook_code.as_str() {
        "INITIAL_UPDATE" => DispatchPlan::Ignore(IgnoreReason::InitialUpdate),
        "HISTORICAL_UPDATE" => DispatchPlan::Reconcile {
            start_date: today
                .checked_sub_months(Months::new(HISTORICAL_UPDATE_MONTHS))
                .unwrap_or(today),
            end_date: today,
        },
        "DEFAULT_UPDATE" => DispatchPlan::Reconcile {
            start_date: today
                .checked_sub_days(Days::new(DEFAULT_UPDATE_DAYS))
                .unwrap_or(today),
            end_date: today,
        },
        "TRANSACTIONS_REMOVED" => DispatchPlan::Remove {
            transaction_ids: payload.removed_transactions.clone(),
        },
        other => {
            warn!(webhook_code = other, "Unhandled transactions webhook code");
            DispatchPlan::Ignore(IgnoreReason::UnknownCode)
        }
    }
}

/// Executes webhook plans against the mirror.
pub struct WebhookDispatcher {
    pool: PgPool,
    transactions: TransactionReconciler,
}

impl WebhookDispatcher {
    /// Create a new dispatcher.
    pub fn new(pool: PgPool, transactions: TransactionReconciler) -> Self {
        Self { pool, transactions }
    }

    /// Interpret and execute a raw webhook payload.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::MalformedEvent` if the payload lacks the
    /// required webhook fields; reconciler failures propagate as-is.
    pub async fn dispatch(&self, raw: &JsonValue) -> SyncResult<DispatchOutcome> {
        let payload: WebhookPayload = serde_json::from_value(raw.clone())
            .map_err(|e| SyncError::malformed_event(e.to_string()))?;

        let today = Utc::now().date_naive();
        let plan = plan(&payload, today);

        info!(
            webhook_type = %payload.webhook_type,
            webhook_code = %payload.webhook_code,
            item_id = %payload.item_id,
            ?plan,
            "Dispatching webhook"
        );

        if let DispatchPlan::Ignore(reason) = plan {
            return Ok(DispatchOutcome::Ignored(reason));
        }

        let Some(item) = LinkedItem::find_by_item_id(&self.pool, &payload.item_id).await? else {
            warn!(item_id = %payload.item_id, "Webhook for unknown or inactive item");
            return Ok(DispatchOutcome::ItemNotFound {
                item_id: payload.item_id,
            });
        };

        match plan {
            DispatchPlan::Reconcile {
                start_date,
                end_date,
            } => {
                let inserted = self
                    .transactions
                    .reconcile_window(&item, start_date, end_date)
                    .await?;
                Ok(DispatchOutcome::Handled(SyncReport::Reconciled {
                    start_date,
                    end_date,
                    inserted,
                }))
            }
            DispatchPlan::Remove { transaction_ids } => {
                let deactivated = self.transactions.remove(&transaction_ids).await?;
                Ok(DispatchOutcome::Handled(SyncReport::Removed { deactivated }))
            }
            DispatchPlan::Ignore(_) => unreachable!("ignored plans return early"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(webhook_type: &str, webhook_code: &str) -> WebhookPayload {
        WebhookPayload {
            webhook_type: webhook_type.to_string(),
            webhook_code: webhook_code.to_string(),
            item_id: "item-1".to_string(),
            removed_transactions: Vec::new(),
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_non_transaction_type_ignored() {
        let plan = plan(&payload("ITEM", "ERROR"), day(2024, 6, 15));
        assert_eq!(plan, DispatchPlan::Ignore(IgnoreReason::NonTransaction));
    }

    #[test]
    fn test_initial_update_ignored() {
        let plan = plan(&payload("TRANSACTIONS", "INITIAL_UPDATE"), day(2024, 6, 15));
        assert_eq!(plan, DispatchPlan::Ignore(IgnoreReason::InitialUpdate));
    }

    #[test]
    fn test_unknown_code_ignored() {
        let plan = plan(
            &payload("TRANSACTIONS", "RECURRING_TRANSACTIONS_UPDATE"),
            day(2024, 6, 15),
        );
        assert_eq!(plan, DispatchPlan::Ignore(IgnoreReason::UnknownCode));
    }

    #[test]
    fn test_historical_update_two_year_window() {
        let plan = plan(
            &payload("TRANSACTIONS", "HISTORICAL_UPDATE"),
            day(2024, 6, 15),
        );
        assert_eq!(
            plan,
            DispatchPlan::Reconcile {
                start_date: day(2022, 6, 15),
                end_date: day(2024, 6, 15),
            }
        );
    }

    #[test]
    fn test_historical_update_clamps_month_end() {
        // Feb 29 two years back from a leap day lands on Feb 28.
        let plan = plan(
            &payload("TRANSACTIONS", "HISTORICAL_UPDATE"),
            day(2024, 2, 29),
        );
        assert_eq!(
            plan,
            DispatchPlan::Reconcile {
                start_date: day(2022, 2, 28),
                end_date: day(2024, 2, 29),
            }
        );
    }

    #[test]
    fn test_default_update_seven_day_window() {
        let plan = plan(&payload("TRANSACTIONS", "DEFAULT_UPDATE"), day(2024, 3, 4));
        assert_eq!(
            plan,
            DispatchPlan::Reconcile {
                start_date: day(2024, 2, 26),
                end_date: day(2024, 3, 4),
            }
        );
    }

    #[test]
    fn test_removed_carries_ids() {
        let mut p = payload("TRANSACTIONS", "TRANSACTIONS_REMOVED");
        p.removed_transactions = vec!["tx-1".to_string(), "tx-2".to_string()];
        let plan = plan(&p, day(2024, 6, 15));
        assert_eq!(
            plan,
            DispatchPlan::Remove {
                transaction_ids: vec!["tx-1".to_string(), "tx-2".to_string()],
            }
        );
    }

    #[test]
    fn test_payload_deserializes_without_removed_list() {
        let raw = json!({
            "webhook_type": "TRANSACTIONS",
            "webhook_code": "DEFAULT_UPDATE",
            "item_id": "item-9",
            "new_transactions": 3
        });
        let payload: WebhookPayload = serde_json::from_value(raw).unwrap();
        assert!(payload.removed_transactions.is_empty());
        assert_eq!(payload.item_id, "item-9");
    }
}
