pub mod config;
pub mod domain;
pub mod errors;
pub mod jobs;
pub mod pricing;
pub mod rules;

pub use domain::job::{BulkJob, BulkJobRequest, JobId, JobStatus};
pub use domain::quote::{QuotePriceResult, QuoteRequest};
pub use domain::rule::{
    PricingRule, RemoteAreaSurcharge, RuleId, RuleKind, TimeWindowPromotion, WeightTier,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use jobs::{
    job_queue, BulkJobService, BulkWorker, InMemoryJobStore, JobOutcome, JobQueue,
    JobQueueReceiver, JobStore, QueueError,
};
pub use pricing::{PricingEngine, PricingError, RuleBasedPricingEngine};
pub use rules::{RuleProvider, RuleProviderError, StaticRuleProvider};
