use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::serde_helpers;
use crate::errors::DomainError;

/// A single shipment to be priced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Shipment weight in kilograms.
    pub weight: Decimal,
    pub area: String,
    /// Used for rule effectivity and time-of-day promotion checks.
    #[serde(
        default = "Utc::now",
        alias = "requestDate",
        deserialize_with = "serde_helpers::timestamp"
    )]
    pub requested_at: DateTime<Utc>,
}

impl QuoteRequest {
    pub fn new(weight: Decimal, area: impl Into<String>) -> Self {
        Self::at(weight, area, Utc::now())
    }

    pub fn at(weight: Decimal, area: impl Into<String>, requested_at: DateTime<Utc>) -> Self {
        Self { weight, area: area.into(), requested_at }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.weight <= Decimal::ZERO {
            return Err(DomainError::InvalidQuote(format!(
                "weight must be greater than zero (got {})",
                self.weight
            )));
        }
        Ok(())
    }
}

/// Money fields travel as JSON numbers; clients format them directly.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePriceResult {
    #[serde(with = "rust_decimal::serde::float")]
    pub base_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub surcharges: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub discounts: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    /// One entry per rule that fired, in application order.
    pub applied_rules: Vec<String>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{QuotePriceResult, QuoteRequest};
    use crate::errors::DomainError;

    #[test]
    fn rejects_non_positive_weight() {
        let zero = QuoteRequest::new(Decimal::ZERO, "Bangkok");
        let negative = QuoteRequest::new(Decimal::new(-5, 0), "Bangkok");

        assert!(matches!(zero.validate(), Err(DomainError::InvalidQuote(_))));
        assert!(matches!(negative.validate(), Err(DomainError::InvalidQuote(_))));
        assert!(QuoteRequest::new(Decimal::new(1, 1), "Bangkok").validate().is_ok());
    }

    #[test]
    fn wire_form_defaults_request_time_when_absent() {
        let before = Utc::now();
        let request: QuoteRequest =
            serde_json::from_str(r#"{"weight": 12.5, "area": "Phuket"}"#).expect("decode quote");

        assert_eq!(request.weight, Decimal::new(125, 1));
        assert_eq!(request.area, "Phuket");
        assert!(request.requested_at >= before);
    }

    #[test]
    fn wire_form_accepts_explicit_request_time() {
        let request: QuoteRequest = serde_json::from_str(
            r#"{"weight": "3", "area": "Krabi", "requestedAt": "2025-03-01T09:30:00Z"}"#,
        )
        .expect("decode quote");

        assert_eq!(request.requested_at, Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap());
    }

    #[test]
    fn wire_form_accepts_request_date_alias_without_offset() {
        let request: QuoteRequest = serde_json::from_str(
            r#"{"weight": 8, "area": "Krabi", "requestDate": "2025-03-01T21:15:00"}"#,
        )
        .expect("decode quote");

        assert_eq!(request.requested_at, Utc.with_ymd_and_hms(2025, 3, 1, 21, 15, 0).unwrap());
    }

    #[test]
    fn price_breakdown_serializes_money_as_numbers() {
        let result = QuotePriceResult {
            base_price: Decimal::new(75, 0),
            surcharges: Decimal::new(1205, 1),
            discounts: Decimal::new(75, 1),
            total_price: Decimal::new(188, 0),
            applied_rules: vec!["Applied Weight Tier: Standard (+฿75.00)".to_string()],
        };

        let payload = serde_json::to_value(&result).expect("encode result");

        assert_eq!(payload["basePrice"], serde_json::json!(75.0));
        assert_eq!(payload["surcharges"], serde_json::json!(120.5));
        assert_eq!(payload["discounts"], serde_json::json!(7.5));
        assert_eq!(payload["totalPrice"], serde_json::json!(188.0));
        assert_eq!(payload["appliedRules"][0], "Applied Weight Tier: Standard (+฿75.00)");
    }
}
