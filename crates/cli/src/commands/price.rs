use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shipquote_core::config::{AppConfig, LoadOptions};
use shipquote_core::domain::quote::QuoteRequest;
use shipquote_core::domain::rule::PricingRule;
use shipquote_core::pricing::{PricingEngine, RuleBasedPricingEngine};

use crate::commands::CommandResult;

const COMMAND: &str = "price";

#[derive(Debug, Clone)]
pub struct PriceArgs {
    pub weight: String,
    pub area: String,
    pub rules: PathBuf,
    pub at: Option<String>,
}

pub fn run(args: PriceArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            )
        }
    };

    let request = match build_request(&args) {
        Ok(request) => request,
        Err(message) => return CommandResult::failure(COMMAND, "invalid_input", message, 3),
    };
    let rules = match read_rules(&args.rules) {
        Ok(rules) => rules,
        Err(message) => return CommandResult::failure(COMMAND, "rules_file", message, 4),
    };

    let engine = RuleBasedPricingEngine::new(config.pricing.currency_symbol);
    let result = match engine.price(&request, &rules) {
        Ok(result) => result,
        Err(error) => return CommandResult::failure(COMMAND, "pricing", error.to_string(), 5),
    };

    let summary = format!(
        "priced {} kg to {} with {} of {} rules applied; total {}",
        request.weight,
        request.area,
        result.applied_rules.len(),
        rules.len(),
        result.total_price
    );
    match serde_json::to_value(&result) {
        Ok(data) => CommandResult::success_with_data(COMMAND, summary, Some(data)),
        Err(error) => CommandResult::failure(COMMAND, "serialization", error.to_string(), 1),
    }
}

fn build_request(args: &PriceArgs) -> Result<QuoteRequest, String> {
    let weight = Decimal::from_str(args.weight.trim())
        .map_err(|error| format!("weight `{}` is not a decimal number: {error}", args.weight))?;
    let requested_at = match args.at.as_deref() {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(|error| format!("--at `{raw}` is not an RFC 3339 timestamp: {error}"))?,
        None => Utc::now(),
    };

    let request = QuoteRequest::at(weight, args.area.clone(), requested_at);
    request.validate().map_err(|error| error.to_string())?;
    Ok(request)
}

fn read_rules(path: &Path) -> Result<Vec<PricingRule>, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("could not read rules file `{}`: {error}", path.display()))?;
    serde_json::from_str(&raw)
        .map_err(|error| format!("could not parse rules file `{}`: {error}", path.display()))
}
