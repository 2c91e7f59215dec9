//! Asynchronous bulk pricing: job records, the FIFO queue and its worker.

pub mod queue;
pub mod store;
pub mod submission;
pub mod worker;

pub use queue::{job_queue, JobQueue, JobQueueReceiver, QueueError};
pub use store::{InMemoryJobStore, JobStore};
pub use submission::BulkJobService;
pub use worker::{BulkWorker, JobOutcome};
