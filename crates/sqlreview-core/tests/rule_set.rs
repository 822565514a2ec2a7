//! Rule sets authored as JSON or TOML decode into the same definitions.

use serde_json::json;
use sqlreview_core::{review, Dialect, ReviewOptions, ReviewRequest, RuleLevel, RuleSet, RuleType};

const TOML_RULES: &str = r#"
[[rules]]
type = "table.drop-naming-convention"
level = "error"
dialect = "mssql"
payload = { format = "_del$" }

[[rules]]
type = "statement.maximum-limit-value"
payload = { number = 500 }

[[rules]]
type = "naming.column"
level = "disabled"
"#;

#[test]
fn toml_rule_set_decodes() {
    let rule_set: RuleSet = toml::from_str(TOML_RULES).unwrap();

    assert_eq!(rule_set.rules.len(), 3);
    let drop = &rule_set.rules[0];
    assert_eq!(drop.rule_type, RuleType::TABLE_DROP_NAMING_CONVENTION);
    assert_eq!(drop.level, RuleLevel::Error);
    assert_eq!(drop.dialect, Some(Dialect::Mssql));
    assert_eq!(drop.payload, Some(json!({ "format": "_del$" })));

    assert_eq!(rule_set.rules[1].level, RuleLevel::Warning);
    assert_eq!(rule_set.rules[1].payload, Some(json!({ "number": 500 })));
    assert_eq!(rule_set.rules[2].level, RuleLevel::Disabled);
}

#[test]
fn json_and_toml_rule_sets_agree() {
    let from_toml: RuleSet = toml::from_str(TOML_RULES).unwrap();
    let from_json: RuleSet = serde_json::from_value(json!({
        "rules": [
            { "type": "table.drop-naming-convention", "level": "error", "dialect": "mssql",
              "payload": { "format": "_del$" } },
            { "type": "statement.maximum-limit-value", "payload": { "number": 500 } },
            { "type": "naming.column", "level": "disabled" }
        ]
    }))
    .unwrap();
    assert_eq!(from_toml, from_json);
}

#[test]
fn toml_rule_set_drives_a_review() {
    let rule_set: RuleSet = toml::from_str(TOML_RULES).unwrap();
    let report = review(&ReviewRequest {
        sql: "DROP TABLE orders;".to_string(),
        dialect: Dialect::Mssql,
        rules: rule_set.rules,
        options: ReviewOptions::default(),
    })
    .unwrap();

    assert_eq!(report.advices.len(), 1);
    assert!(report.advices[0].content.starts_with("[orders] mismatches"));
    assert!(report.summary.has_errors());
}

#[test]
fn request_round_trips_through_json() {
    let request: ReviewRequest = serde_json::from_value(json!({
        "sql": "SELECT 1",
        "dialect": "postgres",
        "rules": [{ "type": "statement.where.require" }],
        "options": { "unsupportedRules": "report", "maxWorkers": 2, "timeoutMs": 1500 }
    }))
    .unwrap();

    assert_eq!(request.options.max_workers, 2);
    assert_eq!(request.options.timeout_ms, Some(1500));
    let report = review(&request).unwrap();
    assert!(report.is_clean());
}
