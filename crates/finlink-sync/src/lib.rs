//! Reconciliation engine for the finlink mirror.
//!
//! Keeps the local mirror convergent with the provider: account and
//! transaction reconcilers, a webhook dispatcher that turns provider
//! callbacks into explicit plans, and an in-process queue plus worker
//! pool that runs sync jobs off the HTTP request path.

pub mod accounts;
pub mod dispatcher;
pub mod error;
pub mod queue;
pub mod transactions;
pub mod worker;

pub use accounts::AccountReconciler;
pub use dispatcher::{
    plan, DispatchOutcome, DispatchPlan, IgnoreReason, SyncReport, WebhookDispatcher,
    WebhookPayload,
};
pub use error::{SyncError, SyncResult};
pub use queue::{SyncJob, SyncQueue};
pub use transactions::TransactionReconciler;
pub use worker::{SyncWorker, WorkerConfig};
