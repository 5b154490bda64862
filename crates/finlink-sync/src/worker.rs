//! Sync worker pool.
//!
//! Consumes jobs from the sync queue with bounded concurrency. Job
//! failures never propagate to the HTTP layer; permanent errors are
//! logged and the job is dropped, transient provider errors are retried
//! inside the job body by the retry policy.

use std::sync::Arc;

use finlink_core::{LinkedItemId, UserId};
use finlink_db::{is_unique_violation, CreateLinkedItem, LinkedItem};
use finlink_provider::{ProviderClient, RetryConfig, RetryExecutor};
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument, warn};

use crate::accounts::AccountReconciler;
use crate::dispatcher::WebhookDispatcher;
use crate::error::SyncResult;
use crate::queue::SyncJob;
use crate::transactions::TransactionReconciler;

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Number of jobs processed concurrently.
    pub concurrency: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { concurrency: 4 }
    }
}

/// Background worker that executes sync jobs.
pub struct SyncWorker {
    pool: PgPool,
    provider: Arc<dyn ProviderClient>,
    webhook_url: String,
    retry: RetryExecutor,
    accounts: AccountReconciler,
    dispatcher: WebhookDispatcher,
    config: WorkerConfig,
}

impl SyncWorker {
    /// Create a worker pool over a shared pool and provider client.
    pub fn new(
        pool: PgPool,
        provider: Arc<dyn ProviderClient>,
        webhook_url: String,
        retry_config: RetryConfig,
        config: WorkerConfig,
    ) -> Self {
        let retry = RetryExecutor::new(retry_config);
        let accounts = AccountReconciler::new(pool.clone(), provider.clone(), retry.clone());
        let transactions =
            TransactionReconciler::new(pool.clone(), provider.clone(), retry.clone());
        let dispatcher = WebhookDispatcher::new(pool.clone(), transactions);

        Self {
            pool,
            provider,
            webhook_url,
            retry,
            accounts,
            dispatcher,
            config,
        }
    }

    /// Consume jobs until the queue's senders are dropped, then drain
    /// in-flight jobs and return.
    pub async fn run(self: Arc<Self>, mut jobs: UnboundedReceiver<SyncJob>) {
        info!(concurrency = self.config.concurrency, "Starting sync worker");

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));

        while let Some(job) = jobs.recv().await {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };

            let worker = self.clone();
            tokio::spawn(async move {
                let _permit = permit;
                worker.handle(job).await;
            });
        }

        info!("Sync queue closed, waiting for in-flight jobs");
        let _ = semaphore.acquire_many(self.config.concurrency as u32).await;
        info!("Sync worker stopped");
    }

    /// Execute one job; failures are logged and dropped.
    #[instrument(skip(self, job), fields(job = job.kind()))]
    async fn handle(&self, job: SyncJob) {
        let start = std::time::Instant::now();
        let kind = job.kind();

        let result = match job {
            SyncJob::ExchangeToken {
                public_token,
                user_id,
                institution_id,
            } => {
                self.exchange_token(&public_token, user_id, &institution_id)
                    .await
            }
            SyncJob::SyncAccounts { linked_item_id } => self.sync_accounts(linked_item_id).await,
            SyncJob::ProcessWebhook { payload } => self.process_webhook(&payload).await,
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        match result {
            Ok(()) => info!(job = kind, duration_ms, "Sync job completed"),
            Err(e) => error!(job = kind, duration_ms, error = %e, "Sync job failed"),
        }
    }

    /// Exchange a public token and bring the resulting item's accounts
    /// into the mirror.
    ///
    /// Idempotent per (user, institution): an existing active link skips
    /// the exchange and re-reconciles the accounts of the existing item.
    async fn exchange_token(
        &self,
        public_token: &str,
        user_id: UserId,
        institution_id: &str,
    ) -> SyncResult<()> {
        if let Some(existing) =
            LinkedItem::find_active(&self.pool, user_id, institution_id).await?
        {
            info!(
                %user_id,
                institution_id,
                linked_item_id = %existing.id,
                "Institution already linked, re-syncing accounts"
            );
            self.accounts.reconcile(&existing).await?;
            return Ok(());
        }

        let exchange = self
            .retry
            .execute(|| self.provider.exchange_public_token(public_token))
            .await?;

        let item = match LinkedItem::create(
            &self.pool,
            &CreateLinkedItem {
                user_id,
                institution_id: institution_id.to_string(),
                access_token: exchange.access_token.clone(),
                item_id: exchange.item_id.clone(),
                request_id: exchange.request_id.clone(),
            },
        )
        .await
        {
            Ok(item) => item,
            Err(e) if is_unique_violation(&e) => {
                // A concurrent exchange for the same pairing committed
                // first; adopt its link.
                warn!(%user_id, institution_id, "Concurrent exchange created the link first");
                let Some(existing) =
                    LinkedItem::find_active(&self.pool, user_id, institution_id).await?
                else {
                    return Err(e.into());
                };
                existing
            }
            Err(e) => return Err(e.into()),
        };

        self.retry
            .execute(|| self.provider.update_webhook(&item.access_token, &self.webhook_url))
            .await?;

        self.accounts.reconcile(&item).await?;
        Ok(())
    }

    /// Reconcile the account list of an existing item.
    async fn sync_accounts(&self, linked_item_id: LinkedItemId) -> SyncResult<()> {
        let Some(item) = LinkedItem::find_by_id(&self.pool, linked_item_id).await? else {
            warn!(%linked_item_id, "Sync requested for unknown item");
            return Ok(());
        };

        self.accounts.reconcile(&item).await?;
        Ok(())
    }

    /// Interpret and execute a logged webhook payload.
    async fn process_webhook(&self, payload: &JsonValue) -> SyncResult<()> {
        let outcome = self.dispatcher.dispatch(payload).await?;
        info!(?outcome, "Webhook processed");
        Ok(())
    }
}
