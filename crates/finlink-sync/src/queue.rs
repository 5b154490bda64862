//! In-process sync queue.
//!
//! HTTP handlers enqueue jobs and answer immediately; the worker pool
//! consumes them. The channel is unbounded so intake never blocks on a
//! slow provider.

use finlink_core::{LinkedItemId, UserId};
use serde_json::Value as JsonValue;
use tokio::sync::mpsc;
use tracing::error;

/// A unit of background work.
#[derive(Debug, Clone)]
pub enum SyncJob {
    /// Exchange a public token and link the resulting item.
    ExchangeToken {
        public_token: String,
        user_id: UserId,
        institution_id: String,
    },
    /// Reconcile the account list of an existing item.
    SyncAccounts { linked_item_id: LinkedItemId },
    /// Interpret and execute a logged webhook payload.
    ProcessWebhook { payload: JsonValue },
}

impl SyncJob {
    /// Short job name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            SyncJob::ExchangeToken { .. } => "exchange_token",
            SyncJob::SyncAccounts { .. } => "sync_accounts",
            SyncJob::ProcessWebhook { .. } => "process_webhook",
        }
    }
}

/// Sending half of the sync queue, held by the HTTP layer.
#[derive(Debug, Clone)]
pub struct SyncQueue {
    tx: mpsc::UnboundedSender<SyncJob>,
}

impl SyncQueue {
    /// Create a queue, returning the sender and the receiver the worker
    /// pool consumes.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SyncJob>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueue a job. Fire-and-forget: a send failure means the worker
    /// pool is gone, which only happens during shutdown.
    pub fn enqueue(&self, job: SyncJob) {
        let kind = job.kind();
        if self.tx.send(job).is_err() {
            error!(job = kind, "Sync queue closed, dropping job");
        }
    }
}
