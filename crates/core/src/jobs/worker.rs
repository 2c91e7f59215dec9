//! Single consumer that drains the bulk job queue.
//!
//! Jobs run strictly one at a time in FIFO order. Each job fetches the rule
//! set once and prices every quote against that snapshot. Any failure marks
//! the job `Failed` without results; nothing is retried.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::domain::job::{JobId, JobStatus};
use crate::domain::quote::{QuotePriceResult, QuoteRequest};
use crate::domain::rule::PricingRule;
use crate::errors::ApplicationError;
use crate::jobs::queue::JobQueueReceiver;
use crate::jobs::store::JobStore;
use crate::pricing::{PricingEngine, PricingError};
use crate::rules::RuleProvider;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    Completed { results: usize },
    Failed { reason: String },
    /// Shutdown arrived mid-job; the record stays `Processing`.
    Abandoned,
    /// The id could not be started (unknown, or not `Pending`).
    Skipped,
}

pub struct BulkWorker {
    store: Arc<dyn JobStore>,
    rules: Arc<dyn RuleProvider>,
    engine: Arc<dyn PricingEngine>,
}

impl BulkWorker {
    pub fn new(
        store: Arc<dyn JobStore>,
        rules: Arc<dyn RuleProvider>,
        engine: Arc<dyn PricingEngine>,
    ) -> Self {
        Self { store, rules, engine }
    }

    pub fn spawn(self, receiver: JobQueueReceiver, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(receiver, shutdown))
    }

    pub async fn run(self, mut receiver: JobQueueReceiver, shutdown: CancellationToken) {
        info!(
            event_name = "pricing.worker.started",
            correlation_id = "bootstrap",
            "bulk pricing worker started"
        );

        loop {
            let next = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                next = receiver.dequeue() => next,
            };
            let Some(job_id) = next else {
                break;
            };

            self.process(&job_id, &shutdown).await;
        }

        receiver.close();
        info!(
            event_name = "pricing.worker.stopped",
            correlation_id = "shutdown",
            "bulk pricing worker stopped"
        );
    }

    pub async fn process(&self, job_id: &JobId, shutdown: &CancellationToken) -> JobOutcome {
        let Some(job) = self.store.get(job_id).await else {
            warn!(
                event_name = "pricing.job.missing",
                correlation_id = %job_id,
                job_id = %job_id,
                "dequeued job has no record; skipping"
            );
            return JobOutcome::Skipped;
        };

        match self.store.update_status(job_id, JobStatus::Processing, None).await {
            Ok(true) => {}
            Ok(false) => return JobOutcome::Skipped,
            Err(error) => {
                warn!(
                    event_name = "pricing.job.not_startable",
                    correlation_id = %job_id,
                    job_id = %job_id,
                    error = %error,
                    "job could not enter processing; skipping"
                );
                return JobOutcome::Skipped;
            }
        }
        info!(
            event_name = "pricing.job.processing",
            correlation_id = %job_id,
            job_id = %job_id,
            quote_count = job.quotes().len(),
            "processing bulk job"
        );

        let fetched = tokio::select! {
            biased;
            _ = shutdown.cancelled() => {
                warn!(
                    event_name = "pricing.job.abandoned",
                    correlation_id = %job_id,
                    job_id = %job_id,
                    "shutdown while fetching rules; job left in processing"
                );
                return JobOutcome::Abandoned;
            }
            fetched = self.rules.fetch_rules() => fetched,
        };
        let rules = match fetched {
            Ok(rules) => rules,
            Err(error) => return self.fail(job_id, error.into()).await,
        };
        debug!(
            event_name = "pricing.job.rules_fetched",
            correlation_id = %job_id,
            job_id = %job_id,
            rule_count = rules.len(),
            "rule snapshot fetched"
        );

        let results = match self.price_all(job.quotes(), &rules) {
            Ok(results) => results,
            Err(error) => return self.fail(job_id, error.into()).await,
        };
        let count = results.len();

        match self.store.update_status(job_id, JobStatus::Completed, Some(results)).await {
            Ok(_) => {
                info!(
                    event_name = "pricing.job.completed",
                    correlation_id = %job_id,
                    job_id = %job_id,
                    result_count = count,
                    "bulk job completed"
                );
                JobOutcome::Completed { results: count }
            }
            Err(error) => self.fail(job_id, error.into()).await,
        }
    }

    fn price_all(
        &self,
        quotes: &[QuoteRequest],
        rules: &[PricingRule],
    ) -> Result<Vec<QuotePriceResult>, PricingError> {
        quotes.iter().map(|quote| self.engine.price(quote, rules)).collect()
    }

    async fn fail(&self, job_id: &JobId, cause: ApplicationError) -> JobOutcome {
        error!(
            event_name = "pricing.job.failed",
            correlation_id = %job_id,
            job_id = %job_id,
            error = %cause,
            "bulk job failed"
        );

        if let Err(error) = self.store.update_status(job_id, JobStatus::Failed, None).await {
            error!(
                event_name = "pricing.job.fail_commit_rejected",
                correlation_id = %job_id,
                job_id = %job_id,
                error = %error,
                "could not record job failure"
            );
        }

        JobOutcome::Failed { reason: cause.to_string() }
    }
}
