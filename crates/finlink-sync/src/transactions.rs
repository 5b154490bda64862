//! Transaction reconciler.
//!
//! Pulls a date window of transactions from the provider and inserts the
//! ones the mirror does not have yet. Stored rows are never updated in
//! place; the only mutation is the bulk soft-delete driven by removal
//! webhooks.

use std::sync::Arc;

use chrono::NaiveDate;
use finlink_db::{is_unique_violation, Account, LinkedItem, NewTransaction, Transaction};
use finlink_provider::{ProviderClient, RetryExecutor, TransactionSnapshot};
use serde_json::json;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::error::SyncResult;

/// Reconciles stored transactions against a provider window.
pub struct TransactionReconciler {
    pool: PgPool,
    provider: Arc<dyn ProviderClient>,
    retry: RetryExecutor,
}

impl TransactionReconciler {
    /// Create a new transaction reconciler.
    pub fn new(pool: PgPool, provider: Arc<dyn ProviderClient>, retry: RetryExecutor) -> Self {
        Self {
            pool,
            provider,
            retry,
        }
    }

    /// Fetch all transactions in `[start_date, end_date]` and insert those
    /// not already stored as active rows. Returns the number inserted.
    ///
    /// The local comparison set is every active transaction for the item
    /// dated on or after `start_date`, a superset of any window ending
    /// today, so re-running the same window inserts nothing.
    pub async fn reconcile_window(
        &self,
        item: &LinkedItem,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> SyncResult<usize> {
        let snapshots = self
            .retry
            .execute(|| {
                self.provider
                    .fetch_transactions(&item.access_token, start_date, end_date)
            })
            .await?;

        if snapshots.is_empty() {
            info!(
                linked_item_id = %item.id,
                %start_date,
                %end_date,
                "Provider returned no transactions for window"
            );
            return Ok(0);
        }

        let known = Transaction::active_ids_since(&self.pool, item.id, start_date).await?;
        let account_refs = Account::provider_id_map(&self.pool, item.id).await?;

        let mut inserted = 0;
        for snapshot in &snapshots {
            if known.contains(&snapshot.transaction_id) {
                continue;
            }

            let account_ref = account_refs.get(&snapshot.account_id).copied();
            if account_ref.is_none() {
                // Transactions can reference an account the account
                // reconciler has not mirrored yet; keep the provider string
                // and leave the local link unset.
                warn!(
                    linked_item_id = %item.id,
                    account_id = %snapshot.account_id,
                    transaction_id = %snapshot.transaction_id,
                    "No stored account for transaction"
                );
            }

            match Transaction::create(&self.pool, &new_transaction(item, snapshot, account_ref))
                .await
            {
                Ok(_) => inserted += 1,
                Err(e) if is_unique_violation(&e) => {
                    warn!(
                        linked_item_id = %item.id,
                        transaction_id = %snapshot.transaction_id,
                        "Transaction inserted concurrently, skipping"
                    );
                }
                Err(e) => {
                    // One bad row must not abort the rest of the window.
                    error!(
                        linked_item_id = %item.id,
                        transaction_id = %snapshot.transaction_id,
                        error = %e,
                        "Failed to insert transaction, skipping"
                    );
                }
            }
        }

        info!(
            linked_item_id = %item.id,
            %start_date,
            %end_date,
            fetched = snapshots.len(),
            inserted,
            "Reconciled transaction window"
        );
        Ok(inserted)
    }

    /// Soft-delete the given provider transaction IDs in one bulk update.
    /// Returns the number of rows deactivated.
    pub async fn remove(&self, transaction_ids: &[String]) -> SyncResult<u64> {
        if transaction_ids.is_empty() {
            return Ok(0);
        }

        let deactivated = Transaction::deactivate_many(&self.pool, transaction_ids).await?;
        info!(
            requested = transaction_ids.len(),
            deactivated, "Deactivated removed transactions"
        );
        Ok(deactivated)
    }
}

fn new_transaction(
    item: &LinkedItem,
    snapshot: &TransactionSnapshot,
    account_ref: Option<i64>,
) -> NewTransaction {
    NewTransaction {
        linked_item_id: item.id,
        account_id: snapshot.account_id.clone(),
        account_ref,
        account_owner: snapshot.account_owner.clone(),
        transaction_id: snapshot.transaction_id.clone(),
        amount: snapshot.amount,
        name: snapshot.name.clone(),
        merchant_name: snapshot.merchant_name.clone(),
        category_id: snapshot.category_id.clone(),
        category: snapshot.category.clone(),
        iso_currency_code: snapshot.iso_currency_code.clone(),
        unofficial_currency_code: snapshot.unofficial_currency_code.clone(),
        location: coerce_object(&snapshot.location),
        payment_channel: snapshot.payment_channel.clone(),
        pending: snapshot.pending,
        payment_meta: coerce_object(&snapshot.payment_meta),
        date: snapshot.date,
        authorized_date: snapshot.authorized_date,
    }
}

/// The provider sends `null` for absent nested objects; the mirror columns
/// are non-nullable jsonb, so null becomes an empty object.
fn coerce_object(value: &JsonValue) -> JsonValue {
    if value.is_null() {
        json!({})
    } else {
        value.clone()
    }
}
