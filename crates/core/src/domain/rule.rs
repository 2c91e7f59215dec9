use chrono::{DateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::serde_helpers;

/// Surcharge rules carrying this area label match every destination.
pub const DEFAULT_AREA: &str = "Default";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(pub Uuid);

impl Default for RuleId {
    fn default() -> Self {
        Self(Uuid::new_v4())
    }
}

/// A pricing rule as published by the rule service.
///
/// The wire form is camelCase and internally tagged by `type`, matching the
/// rule-administration API.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingRule {
    #[serde(default)]
    pub id: RuleId,
    pub name: String,
    #[serde(default)]
    pub priority: i32,
    #[serde(rename = "isActive", default)]
    pub active: bool,
    #[serde(deserialize_with = "serde_helpers::timestamp")]
    pub effective_from: DateTime<Utc>,
    #[serde(
        rename = "effectiveTo",
        alias = "effectiveUntil",
        default,
        deserialize_with = "serde_helpers::timestamp_option"
    )]
    pub effective_until: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub kind: RuleKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RuleKind {
    WeightTier(WeightTier),
    RemoteAreaSurcharge(RemoteAreaSurcharge),
    TimeWindowPromotion(TimeWindowPromotion),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightTier {
    #[serde(default)]
    pub min_weight: Decimal,
    /// `None` leaves the tier open-ended.
    #[serde(default)]
    pub max_weight: Option<Decimal>,
    #[serde(default)]
    pub price_per_kg: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAreaSurcharge {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub surcharge_amount: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindowPromotion {
    #[serde(default)]
    pub discount_percentage: Decimal,
    #[serde(default)]
    pub from_time: Option<NaiveTime>,
    #[serde(default)]
    pub to_time: Option<NaiveTime>,
}

impl PricingRule {
    pub fn new(name: impl Into<String>, priority: i32, kind: RuleKind) -> Self {
        Self {
            id: RuleId::default(),
            name: name.into(),
            priority,
            active: true,
            effective_from: DateTime::<Utc>::MIN_UTC,
            effective_until: None,
            kind,
        }
    }

    /// True when the rule is switched on and `at` falls inside its effective window.
    pub fn is_effective_at(&self, at: DateTime<Utc>) -> bool {
        self.active
            && self.effective_from <= at
            && self.effective_until.map_or(true, |until| until >= at)
    }
}

impl WeightTier {
    pub fn covers(&self, weight: Decimal) -> bool {
        self.min_weight <= weight && self.max_weight.map_or(true, |max| max >= weight)
    }
}

impl RemoteAreaSurcharge {
    pub fn matches(&self, area: &str) -> bool {
        let Some(rule_area) = self.area.as_deref() else {
            return false;
        };
        if rule_area == DEFAULT_AREA {
            return true;
        }

        let rule_area = rule_area.to_lowercase();
        let area = area.to_lowercase();
        rule_area.contains(&area) || area.contains(&rule_area)
    }
}

impl TimeWindowPromotion {
    /// A window missing either bound is unrestricted. Windows are not wrapped
    /// across midnight, so a start after the end never matches.
    pub fn is_open_at(&self, time_of_day: NaiveTime) -> bool {
        match (self.from_time, self.to_time) {
            (Some(from), Some(to)) => from <= time_of_day && time_of_day <= to,
            _ => true,
        }
    }
}
