//! Read-only access to the current pricing rule set.
//!
//! The provider returns every rule it knows about; effectivity filtering is
//! the engine's job.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::rule::PricingRule;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RuleProviderError {
    #[error("rule service unreachable: {0}")]
    Unreachable(String),
    #[error("rule service responded with status {status}")]
    Status { status: u16 },
    #[error("rule service payload could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait RuleProvider: Send + Sync {
    async fn fetch_rules(&self) -> Result<Vec<PricingRule>, RuleProviderError>;
}

/// Serves a fixed rule snapshot.
#[derive(Clone, Debug, Default)]
pub struct StaticRuleProvider {
    rules: Vec<PricingRule>,
}

impl StaticRuleProvider {
    pub fn new(rules: Vec<PricingRule>) -> Self {
        Self { rules }
    }
}

#[async_trait]
impl RuleProvider for StaticRuleProvider {
    async fn fetch_rules(&self) -> Result<Vec<PricingRule>, RuleProviderError> {
        Ok(self.rules.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use super::{RuleProvider, StaticRuleProvider};
    use crate::domain::rule::{PricingRule, RuleKind, WeightTier};

    fn tier(name: &str) -> PricingRule {
        PricingRule::new(
            name,
            1,
            RuleKind::WeightTier(WeightTier {
                min_weight: Decimal::ZERO,
                max_weight: None,
                price_per_kg: Decimal::ONE,
            }),
        )
    }

    #[tokio::test]
    async fn static_provider_serves_its_snapshot_on_every_fetch() {
        let provider = StaticRuleProvider::new(vec![tier("Original"), tier("Extra")]);

        let first = provider.fetch_rules().await.expect("fetch");
        let second = provider.fetch_rules().await.expect("fetch");

        assert_eq!(first.len(), 2);
        assert_eq!(first[0].name, "Original");
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn default_provider_serves_empty_rule_set() {
        let provider: Arc<dyn RuleProvider> = Arc::new(StaticRuleProvider::default());

        assert!(provider.fetch_rules().await.expect("fetch").is_empty());
    }
}
