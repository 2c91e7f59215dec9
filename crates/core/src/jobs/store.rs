use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::job::{BulkJob, JobId, JobStatus};
use crate::domain::quote::QuotePriceResult;
use crate::errors::DomainError;

#[async_trait]
pub trait JobStore: Send + Sync {
    async fn put(&self, job: BulkJob);

    async fn get(&self, id: &JobId) -> Option<BulkJob>;

    /// Drops a record that never reached the worker. Returns whether it existed.
    async fn remove(&self, id: &JobId) -> bool;

    /// Applies a lifecycle transition in place. Unknown ids are ignored and
    /// reported as `Ok(false)`.
    async fn update_status(
        &self,
        id: &JobId,
        status: JobStatus,
        results: Option<Vec<QuotePriceResult>>,
    ) -> Result<bool, DomainError>;
}

/// Process-lifetime job records. Nothing is ever evicted.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<String, BulkJob>>,
}

impl InMemoryJobStore {
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put(&self, job: BulkJob) {
        let mut jobs = self.jobs.write().await;
        jobs.insert(job.job_id.0.clone(), job);
    }

    async fn get(&self, id: &JobId) -> Option<BulkJob> {
        let jobs = self.jobs.read().await;
        jobs.get(&id.0).cloned()
    }

    async fn remove(&self, id: &JobId) -> bool {
        let mut jobs = self.jobs.write().await;
        jobs.remove(&id.0).is_some()
    }

    async fn update_status(
        &self,
        id: &JobId,
        status: JobStatus,
        results: Option<Vec<QuotePriceResult>>,
    ) -> Result<bool, DomainError> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(&id.0) else {
            return Ok(false);
        };
        job.transition_to(status, results)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use crate::domain::job::{BulkJob, JobId, JobStatus};
    use crate::domain::quote::{QuotePriceResult, QuoteRequest};
    use crate::errors::DomainError;
    use crate::jobs::store::{InMemoryJobStore, JobStore};

    fn job() -> BulkJob {
        BulkJob::pending(vec![QuoteRequest::new(Decimal::new(10, 0), "Bangkok")])
    }

    #[tokio::test]
    async fn in_memory_job_store_round_trip() {
        let store = InMemoryJobStore::default();
        let job = job();

        store.put(job.clone()).await;
        let found = store.get(&job.job_id).await;

        assert_eq!(found, Some(job));
    }

    #[tokio::test]
    async fn unknown_job_is_absent_rather_than_defaulted() {
        let store = InMemoryJobStore::default();

        assert_eq!(store.get(&JobId("no-such-job".to_string())).await, None);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn removed_job_is_no_longer_visible() {
        let store = InMemoryJobStore::default();
        let job = job();
        store.put(job.clone()).await;

        assert!(store.remove(&job.job_id).await);
        assert_eq!(store.get(&job.job_id).await, None);
        assert!(!store.remove(&job.job_id).await);
    }

    #[tokio::test]
    async fn updates_are_visible_to_the_next_read() {
        let store = InMemoryJobStore::default();
        let job = job();
        store.put(job.clone()).await;

        let applied =
            store.update_status(&job.job_id, JobStatus::Processing, None).await.expect("update");
        assert!(applied);
        assert_eq!(
            store.get(&job.job_id).await.map(|job| job.status),
            Some(JobStatus::Processing)
        );

        store
            .update_status(
                &job.job_id,
                JobStatus::Completed,
                Some(vec![QuotePriceResult::default()]),
            )
            .await
            .expect("update");
        let completed = store.get(&job.job_id).await.expect("job present");

        assert_eq!(completed.status, JobStatus::Completed);
        assert_eq!(completed.results, Some(vec![QuotePriceResult::default()]));
    }

    #[tokio::test]
    async fn updating_an_unknown_job_is_a_no_op() {
        let store = InMemoryJobStore::default();

        let applied = store
            .update_status(&JobId("ghost".to_string()), JobStatus::Processing, None)
            .await
            .expect("no-op update");

        assert!(!applied);
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn illegal_transitions_leave_the_record_untouched() {
        let store = InMemoryJobStore::default();
        let job = job();
        store.put(job.clone()).await;

        let error = store
            .update_status(&job.job_id, JobStatus::Failed, None)
            .await
            .expect_err("pending -> failed should be rejected");

        assert!(matches!(error, DomainError::InvalidJobTransition { .. }));
        assert_eq!(store.get(&job.job_id).await, Some(job));
    }

    #[tokio::test]
    async fn concurrent_writers_each_land_their_job() {
        let store = Arc::new(InMemoryJobStore::default());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.put(job()).await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("writer task");
        }

        assert_eq!(store.len().await, 16);
    }
}
