use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shipquote_core::config::RulesConfig;
use shipquote_core::domain::rule::PricingRule;
use shipquote_core::rules::{RuleProvider, RuleProviderError};
use tracing::{debug, warn};

/// Fetches the rule set from the external rule service on every call.
#[derive(Clone, Debug)]
pub struct HttpRuleProvider {
    client: Client,
    rules_url: String,
}

impl HttpRuleProvider {
    pub fn new(config: &RulesConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(config.timeout_secs)).build()?;
        Ok(Self { client, rules_url: rules_url(&config.base_url) })
    }

    pub fn rules_url(&self) -> &str {
        &self.rules_url
    }
}

fn rules_url(base_url: &str) -> String {
    format!("{}/rules", base_url.trim().trim_end_matches('/'))
}

#[async_trait]
impl RuleProvider for HttpRuleProvider {
    async fn fetch_rules(&self) -> Result<Vec<PricingRule>, RuleProviderError> {
        let response = self.client.get(&self.rules_url).send().await.map_err(|error| {
            warn!(
                event_name = "system.rules.request_failed",
                correlation_id = "rules",
                rules_url = %self.rules_url,
                error = %error,
                "rule service request failed"
            );
            RuleProviderError::Unreachable(error.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                event_name = "system.rules.bad_status",
                correlation_id = "rules",
                rules_url = %self.rules_url,
                status = status.as_u16(),
                "rule service returned a non-success status"
            );
            return Err(RuleProviderError::Status { status: status.as_u16() });
        }

        let rules: Vec<PricingRule> = response
            .json()
            .await
            .map_err(|error| RuleProviderError::Decode(error.to_string()))?;
        debug!(
            event_name = "system.rules.fetched",
            correlation_id = "rules",
            rule_count = rules.len(),
            "rule set fetched"
        );
        Ok(rules)
    }
}
