use std::env;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

use rust_decimal::Decimal;
use serde_json::Value;
use shipquote_cli::commands::{config, price};
use tempfile::TempDir;

const RULES: &str = r#"[
  {
    "id": "0b6c7b1e-3f0a-4c43-9d7e-5a8f1f9d2c11",
    "name": "Standard Tier",
    "type": "WeightTier",
    "priority": 1,
    "isActive": true,
    "effectiveFrom": "2024-01-01T00:00:00Z",
    "minWeight": 10,
    "maxWeight": 100,
    "pricePerKg": 5
  },
  {
    "id": "9a3e2f44-6c1b-4b8e-a2d9-3c7f0e1b5a22",
    "name": "Office Hours Promo",
    "type": "TimeWindowPromotion",
    "priority": 2,
    "isActive": true,
    "effectiveFrom": "2024-01-01T00:00:00Z",
    "discountPercentage": 10,
    "fromTime": "09:00:00",
    "toTime": "17:00:00"
  }
]"#;

#[test]
fn price_returns_breakdown_with_valid_rules() {
    with_env(&[], || {
        let (_dir, rules) = rules_file(RULES);

        let result = price::run(args("15", rules, Some("2024-05-01T10:30:00Z")));
        assert_eq!(result.exit_code, 0, "expected successful pricing");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "price");
        assert_eq!(payload["status"], "ok");
        assert_eq!(decimal(&payload["data"]["basePrice"]), Decimal::new(75, 0));
        assert_eq!(decimal(&payload["data"]["discounts"]), Decimal::new(75, 1));
        assert_eq!(decimal(&payload["data"]["totalPrice"]), Decimal::new(675, 1));
        assert_eq!(payload["data"]["appliedRules"][0], "Applied Weight Tier: Standard Tier (+฿75.00)");
        assert_eq!(payload["data"]["appliedRules"][1], "Applied Promotion: Office Hours Promo (-฿7.50)");
    });
}

#[test]
fn price_skips_promotion_outside_its_window() {
    with_env(&[], || {
        let (_dir, rules) = rules_file(RULES);

        let result = price::run(args("15", rules, Some("2024-05-01T20:00:00Z")));
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(decimal(&payload["data"]["discounts"]), Decimal::ZERO);
        assert_eq!(decimal(&payload["data"]["totalPrice"]), Decimal::new(75, 0));
    });
}

#[test]
fn price_uses_configured_currency_symbol() {
    with_env(&[("SHIPQUOTE_PRICING_CURRENCY_SYMBOL", "$")], || {
        let (_dir, rules) = rules_file(RULES);

        let result = price::run(args("15", rules, Some("2024-05-01T20:00:00Z")));

        let payload = parse_payload(&result.output);
        assert_eq!(payload["data"]["appliedRules"][0], "Applied Weight Tier: Standard Tier (+$75.00)");
    });
}

#[test]
fn price_rejects_non_positive_weight() {
    with_env(&[], || {
        let (_dir, rules) = rules_file(RULES);

        let result = price::run(args("0", rules, None));
        assert_eq!(result.exit_code, 3, "expected input validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "invalid_input");
    });
}

#[test]
fn price_rejects_malformed_timestamp() {
    with_env(&[], || {
        let (_dir, rules) = rules_file(RULES);

        let result = price::run(args("5", rules, Some("yesterday")));
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert!(payload["message"].as_str().unwrap_or_default().contains("RFC 3339"));
    });
}

#[test]
fn price_reports_unreadable_rules_file() {
    with_env(&[], || {
        let dir = TempDir::new().expect("temp dir");

        let result = price::run(args("5", dir.path().join("missing.json"), None));
        assert_eq!(result.exit_code, 4, "expected rules file failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "rules_file");
    });
}

#[test]
fn price_returns_config_failure_when_config_invalid() {
    with_env(&[("SHIPQUOTE_RULES_TIMEOUT_SECS", "0")], || {
        let (_dir, rules) = rules_file(RULES);

        let result = price::run(args("5", rules, None));
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn config_reports_env_and_default_sources() {
    with_env(&[("SHIPQUOTE_SERVER_PORT", "9090"), ("SHIPQUOTE_LOG_LEVEL", "debug")], || {
        let output = config::run();

        assert!(output.starts_with("effective config"));
        assert!(output.contains("- server.port = 9090 (source: env (SHIPQUOTE_SERVER_PORT))"));
        assert!(output.contains("- logging.level = debug (source: env (SHIPQUOTE_LOG_LEVEL))"));
        assert!(output.contains("- rules.base_url = http://localhost:5000 (source: default)"));
    });
}

fn args(weight: &str, rules: PathBuf, at: Option<&str>) -> price::PriceArgs {
    price::PriceArgs {
        weight: weight.to_string(),
        area: "Bangkok".to_string(),
        rules,
        at: at.map(str::to_string),
    }
}

fn rules_file(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("rules.json");
    fs::write(&path, contents).expect("rules file should be writable");
    (dir, path)
}

fn decimal(value: &Value) -> Decimal {
    assert!(value.is_number(), "money should serialize as a JSON number, got {value}");
    Decimal::from_str(&value.to_string()).expect("valid decimal")
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SHIPQUOTE_SERVER_BIND_ADDRESS",
        "SHIPQUOTE_SERVER_PORT",
        "SHIPQUOTE_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "SHIPQUOTE_RULES_BASE_URL",
        "SHIPQUOTE_RULES_TIMEOUT_SECS",
        "SHIPQUOTE_PRICING_CURRENCY_SYMBOL",
        "SHIPQUOTE_LOGGING_LEVEL",
        "SHIPQUOTE_LOGGING_FORMAT",
        "SHIPQUOTE_LOG_LEVEL",
        "SHIPQUOTE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
