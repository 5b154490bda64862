//! Account reconciler.
//!
//! Mirrors the provider's account list into the local `accounts` table.
//! Insert-only: accounts already stored are never touched, and nothing is
//! ever removed, so re-running a reconcile is a no-op once the mirror is
//! complete.

use std::sync::Arc;

use finlink_db::{is_unique_violation, Account, LinkedItem, NewAccount};
use finlink_provider::{AccountSnapshot, ProviderClient, RetryExecutor};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::SyncResult;

/// Reconciles stored accounts against the provider's live account list.
pub struct AccountReconciler {
    pool: PgPool,
    provider: Arc<dyn ProviderClient>,
    retry: RetryExecutor,
}

impl AccountReconciler {
    /// Create a new account reconciler.
    pub fn new(pool: PgPool, provider: Arc<dyn ProviderClient>, retry: RetryExecutor) -> Self {
        Self {
            pool,
            provider,
            retry,
        }
    }

    /// Fetch the live account list for an item and insert any account not
    /// yet stored. Returns the number of rows inserted.
    pub async fn reconcile(&self, item: &LinkedItem) -> SyncResult<usize> {
        let snapshots = self
            .retry
            .execute(|| self.provider.fetch_accounts(&item.access_token))
            .await?;

        let stored = Account::provider_id_map(&self.pool, item.id).await?;

        let mut inserted = 0;
        for snapshot in &snapshots {
            if stored.contains_key(&snapshot.account_id) {
                continue;
            }

            match Account::create(&self.pool, &new_account(item, snapshot)).await {
                Ok(_) => inserted += 1,
                Err(e) if is_unique_violation(&e) => {
                    // A concurrent reconcile of the same item won the race.
                    warn!(
                        linked_item_id = %item.id,
                        account_id = %snapshot.account_id,
                        "Account inserted concurrently, skipping"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            linked_item_id = %item.id,
            fetched = snapshots.len(),
            inserted,
            "Reconciled accounts"
        );
        Ok(inserted)
    }
}

fn new_account(item: &LinkedItem, snapshot: &AccountSnapshot) -> NewAccount {
    NewAccount {
        linked_item_id: item.id,
        account_id: snapshot.account_id.clone(),
        mask: snapshot.mask.clone(),
        name: snapshot.name.clone(),
        official_name: snapshot.official_name.clone(),
        account_type: snapshot.account_type.clone(),
        account_subtype: snapshot.subtype.clone(),
    }
}
