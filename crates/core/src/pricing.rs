//! Rule evaluation engine.
//!
//! Rules are filtered by effectivity, ordered by priority and applied in a
//! single pass against running totals. A promotion therefore discounts only
//! what earlier rules have already charged.

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::domain::quote::{QuotePriceResult, QuoteRequest};
use crate::domain::rule::{PricingRule, RuleKind};

pub const DEFAULT_CURRENCY_SYMBOL: &str = "฿";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("decimal overflow while applying rule `{rule}`")]
    Overflow { rule: String },
    #[error("decimal overflow while totalling quote")]
    TotalOverflow,
}

pub trait PricingEngine: Send + Sync {
    fn price(
        &self,
        request: &QuoteRequest,
        rules: &[PricingRule],
    ) -> Result<QuotePriceResult, PricingError>;
}

#[derive(Clone, Debug)]
pub struct RuleBasedPricingEngine {
    currency_symbol: String,
}

impl RuleBasedPricingEngine {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self { currency_symbol: currency_symbol.into() }
    }
}

impl Default for RuleBasedPricingEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL)
    }
}

impl PricingEngine for RuleBasedPricingEngine {
    fn price(
        &self,
        request: &QuoteRequest,
        rules: &[PricingRule],
    ) -> Result<QuotePriceResult, PricingError> {
        price_quote(request, rules, &self.currency_symbol)
    }
}

/// Rules in the order they would be applied to `request`: effective ones
/// only, ascending priority, ties kept in input order.
pub fn applicable_rules<'a>(
    request: &QuoteRequest,
    rules: &'a [PricingRule],
) -> Vec<&'a PricingRule> {
    let mut effective: Vec<&PricingRule> =
        rules.iter().filter(|rule| rule.is_effective_at(request.requested_at)).collect();
    effective.sort_by_key(|rule| rule.priority);
    effective
}

pub fn price_quote(
    request: &QuoteRequest,
    rules: &[PricingRule],
    currency_symbol: &str,
) -> Result<QuotePriceResult, PricingError> {
    let time_of_day = request.requested_at.time();
    let mut base_price = Decimal::ZERO;
    let mut surcharges = Decimal::ZERO;
    let mut discounts = Decimal::ZERO;
    let mut applied_rules = Vec::new();

    for rule in applicable_rules(request, rules) {
        let overflow = || PricingError::Overflow { rule: rule.name.clone() };

        match &rule.kind {
            RuleKind::WeightTier(tier) => {
                if !tier.covers(request.weight) {
                    continue;
                }
                let amount = request.weight.checked_mul(tier.price_per_kg).ok_or_else(overflow)?;
                base_price = base_price.checked_add(amount).ok_or_else(overflow)?;
                applied_rules.push(format!(
                    "Applied Weight Tier: {} (+{currency_symbol}{})",
                    rule.name,
                    money(amount)
                ));
            }
            RuleKind::RemoteAreaSurcharge(surcharge) => {
                if !surcharge.matches(&request.area) {
                    continue;
                }
                let amount = surcharge.surcharge_amount;
                surcharges = surcharges.checked_add(amount).ok_or_else(overflow)?;
                applied_rules.push(format!(
                    "Applied Surcharge: {} (+{currency_symbol}{})",
                    rule.name,
                    money(amount)
                ));
            }
            RuleKind::TimeWindowPromotion(promotion) => {
                if !promotion.is_open_at(time_of_day) {
                    continue;
                }
                let discount = base_price
                    .checked_add(surcharges)
                    .and_then(|charged| charged.checked_mul(promotion.discount_percentage))
                    .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
                    .ok_or_else(overflow)?;
                discounts = discounts.checked_add(discount).ok_or_else(overflow)?;
                applied_rules.push(format!(
                    "Applied Promotion: {} (-{currency_symbol}{})",
                    rule.name,
                    money(discount)
                ));
            }
        }
    }

    let total_price = base_price
        .checked_add(surcharges)
        .and_then(|charged| charged.checked_sub(discounts))
        .ok_or(PricingError::TotalOverflow)?;

    Ok(QuotePriceResult { base_price, surcharges, discounts, total_price, applied_rules })
}

/// Two decimal places, midpoints rounded away from zero, thousands grouped
/// with commas. Display only; totals keep full precision.
fn money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let digits = format!("{:.2}", rounded.abs());
    let (whole, fraction) = digits.split_once('.').unwrap_or((digits.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}
