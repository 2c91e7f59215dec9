use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::job::{BulkJob, JobId};
use crate::domain::quote::QuoteRequest;
use crate::errors::{ApplicationError, DomainError};
use crate::jobs::queue::{JobQueue, QueueError};
use crate::jobs::store::JobStore;

/// Accepts bulk pricing work and answers status lookups.
#[derive(Clone)]
pub struct BulkJobService {
    store: Arc<dyn JobStore>,
    queue: JobQueue,
}

impl BulkJobService {
    pub fn new(store: Arc<dyn JobStore>, queue: JobQueue) -> Self {
        Self { store, queue }
    }

    /// Stores a `Pending` job, then enqueues its id. The record is always
    /// visible before the worker can dequeue it, and is withdrawn again when
    /// the queue refuses the id.
    pub async fn submit(&self, quotes: Vec<QuoteRequest>) -> Result<JobId, ApplicationError> {
        if quotes.is_empty() {
            return Err(DomainError::EmptyBatch.into());
        }
        for quote in &quotes {
            quote.validate()?;
        }

        let job = BulkJob::pending(quotes);
        let job_id = job.job_id.clone();
        if self.queue.is_closed() {
            return Err(QueueError::Closed(job_id).into());
        }
        let quote_count = job.quotes().len();

        self.store.put(job).await;
        if let Err(error) = self.queue.enqueue(job_id.clone()) {
            self.store.remove(&job_id).await;
            warn!(
                event_name = "pricing.job.rejected",
                correlation_id = %job_id,
                job_id = %job_id,
                error = %error,
                "bulk job withdrawn because the queue is closed"
            );
            return Err(error.into());
        }

        info!(
            event_name = "pricing.job.submitted",
            correlation_id = %job_id,
            job_id = %job_id,
            quote_count,
            "bulk job accepted"
        );
        Ok(job_id)
    }

    pub async fn job(&self, job_id: &JobId) -> Result<BulkJob, ApplicationError> {
        self.store.get(job_id).await.ok_or_else(|| ApplicationError::JobNotFound(job_id.clone()))
    }
}
