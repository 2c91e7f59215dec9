use std::sync::Arc;

use shipquote_core::config::AppConfig;
use shipquote_core::jobs::{
    job_queue, BulkJobService, BulkWorker, InMemoryJobStore, JobQueueReceiver,
};
use shipquote_core::pricing::{PricingEngine, RuleBasedPricingEngine};
use shipquote_core::rules::RuleProvider;
use thiserror::Error;
use tracing::info;

use crate::api::ApiState;
use crate::rule_client::HttpRuleProvider;

/// Everything the server needs, wired once at startup. The queue receiver is
/// handed to the worker exactly once.
pub struct Application {
    pub config: AppConfig,
    pub api: ApiState,
    pub worker: BulkWorker,
    pub receiver: JobQueueReceiver,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("rule service client could not be built: {0}")]
    RuleClient(#[source] reqwest::Error),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let rule_client = HttpRuleProvider::new(&config.rules).map_err(BootstrapError::RuleClient)?;
    info!(
        event_name = "system.bootstrap.rule_client_ready",
        correlation_id = "bootstrap",
        rules_url = %rule_client.rules_url(),
        "rule service client configured"
    );
    let rules: Arc<dyn RuleProvider> = Arc::new(rule_client);

    Ok(assemble(config, rules))
}

/// Wires store, queue, engine and worker around the given rule source.
pub fn assemble(config: AppConfig, rules: Arc<dyn RuleProvider>) -> Application {
    let store = Arc::new(InMemoryJobStore::default());
    let (queue, receiver) = job_queue();
    let engine: Arc<dyn PricingEngine> =
        Arc::new(RuleBasedPricingEngine::new(config.pricing.currency_symbol.clone()));

    let worker = BulkWorker::new(store.clone(), rules.clone(), engine.clone());
    let api = ApiState { jobs: BulkJobService::new(store, queue), rules, engine };

    Application { config, api, worker, receiver }
}
