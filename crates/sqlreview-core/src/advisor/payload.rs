//! Decoding of rule payloads into typed matchers.
//!
//! Every payload is decoded strictly: unknown fields, wrong types and missing
//! required values are configuration errors, never silently defaulted.

use crate::error::ConfigError;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Payload shape an advisor expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// The rule takes no configuration
    None,
    /// `{ "format": "<regex>", "maxLength": <n> }`
    Naming,
    /// `{ "number": <n> }`
    Number,
    /// `{ "list": ["..."] }`
    StringList,
}

/// A decoded rule payload.
#[derive(Debug, Clone)]
pub enum RuleConfig {
    None,
    Naming(NamingFormat),
    Number(NumberLimit),
    StringList(StringSet),
}

impl RuleConfig {
    /// Decodes `payload` into the variant matching `shape`.
    pub fn decode(shape: PayloadShape, payload: Option<&Value>) -> Result<Self, ConfigError> {
        match shape {
            PayloadShape::None => match present(payload) {
                None => Ok(Self::None),
                Some(Value::Object(map)) if map.is_empty() => Ok(Self::None),
                Some(_) => Err(ConfigError::InvalidPayload(
                    "rule does not take a payload".to_string(),
                )),
            },
            PayloadShape::Naming => NamingFormat::decode(payload).map(Self::Naming),
            PayloadShape::Number => NumberLimit::decode(payload).map(Self::Number),
            PayloadShape::StringList => StringSet::decode(payload).map(Self::StringList),
        }
    }
}

/// Candidate test with a stable printed form for advice messages.
pub trait Matcher {
    fn matches(&self, candidate: &str) -> bool;

    fn describe(&self) -> String;
}

fn present(payload: Option<&Value>) -> Option<&Value> {
    payload.filter(|value| !value.is_null())
}

fn decode_strict<T: DeserializeOwned>(payload: Option<&Value>) -> Result<T, ConfigError> {
    let value = present(payload).ok_or(ConfigError::MissingPayload)?;
    T::deserialize(value).map_err(|err| ConfigError::InvalidPayload(err.to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct NamingPayload {
    format: String,
    #[serde(default)]
    max_length: usize,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NumberPayload {
    number: i64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StringListPayload {
    list: Vec<String>,
}

/// Naming convention: a regex plus an optional length cap (0 = unlimited).
#[derive(Debug, Clone)]
pub struct NamingFormat {
    regex: Regex,
    max_length: usize,
}

impl NamingFormat {
    pub fn decode(payload: Option<&Value>) -> Result<Self, ConfigError> {
        let NamingPayload { format, max_length } = decode_strict(payload)?;
        Self::new(&format, max_length)
    }

    pub fn new(format: &str, max_length: usize) -> Result<Self, ConfigError> {
        if format.is_empty() {
            return Err(ConfigError::InvalidPayload(
                "naming format must not be empty".to_string(),
            ));
        }
        let regex = Regex::new(format).map_err(|err| ConfigError::InvalidPattern {
            pattern: format.to_string(),
            message: err.to_string(),
        })?;
        Ok(Self { regex, max_length })
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Returns true when a length cap is set and `name` is longer than it.
    pub fn exceeds_length(&self, name: &str) -> bool {
        self.max_length > 0 && name.chars().count() > self.max_length
    }
}

impl Matcher for NamingFormat {
    fn matches(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }

    fn describe(&self) -> String {
        self.regex.as_str().to_string()
    }
}

/// Upper bound for a numeric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberLimit {
    max: i64,
}

impl NumberLimit {
    pub fn decode(payload: Option<&Value>) -> Result<Self, ConfigError> {
        let NumberPayload { number } = decode_strict(payload)?;
        Self::new(number)
    }

    pub fn new(max: i64) -> Result<Self, ConfigError> {
        if max < 0 {
            return Err(ConfigError::InvalidPayload(format!(
                "number must not be negative, got {max}"
            )));
        }
        Ok(Self { max })
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn allows(&self, value: i64) -> bool {
        value <= self.max
    }
}

impl Matcher for NumberLimit {
    /// Non-numeric candidates never match.
    fn matches(&self, candidate: &str) -> bool {
        candidate
            .trim()
            .parse::<i64>()
            .is_ok_and(|value| self.allows(value))
    }

    fn describe(&self) -> String {
        self.max.to_string()
    }
}

/// Case-insensitive set of strings, kept in configuration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringSet {
    values: Vec<String>,
}

impl StringSet {
    pub fn decode(payload: Option<&Value>) -> Result<Self, ConfigError> {
        let StringListPayload { list } = decode_strict(payload)?;
        Ok(Self::new(list))
    }

    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for value in values {
            let value = value.as_ref().trim().to_uppercase();
            if !value.is_empty() && !normalized.contains(&value) {
                normalized.push(value);
            }
        }
        Self { values: normalized }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Matcher for StringSet {
    fn matches(&self, candidate: &str) -> bool {
        let candidate = candidate.trim().to_uppercase();
        self.values.iter().any(|value| *value == candidate)
    }

    fn describe(&self) -> String {
        self.values.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_naming_format_decodes_pattern_and_length() {
        let payload = json!({ "format": "^tbl_", "maxLength": 10 });
        let format = NamingFormat::decode(Some(&payload)).unwrap();
        assert!(format.matches("tbl_archive"));
        assert!(!format.matches("orders"));
        assert_eq!(format.describe(), "^tbl_");
        assert!(format.exceeds_length("tbl_archive"));
        assert!(!format.exceeds_length("tbl_a"));
    }

    #[test]
    fn test_naming_format_length_defaults_to_unlimited() {
        let payload = json!({ "format": "^tbl_" });
        let format = NamingFormat::decode(Some(&payload)).unwrap();
        assert_eq!(format.max_length(), 0);
        assert!(!format.exceeds_length(&"x".repeat(500)));
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let payload = json!({ "format": "^tbl_(" });
        let err = NamingFormat::decode(Some(&payload)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref pattern, .. } if pattern == "^tbl_("));
    }

    #[test]
    fn test_missing_and_null_payload_are_missing() {
        assert_eq!(
            NamingFormat::decode(None).unwrap_err(),
            ConfigError::MissingPayload
        );
        assert_eq!(
            NamingFormat::decode(Some(&Value::Null)).unwrap_err(),
            ConfigError::MissingPayload
        );
    }

    #[test]
    fn test_shape_mismatch_is_config_error() {
        let payload = json!({ "number": 10 });
        let err = RuleConfig::decode(PayloadShape::Naming, Some(&payload)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPayload(_)));

        let payload = json!({ "format": "^a", "extra": true });
        let err = RuleConfig::decode(PayloadShape::Naming, Some(&payload)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPayload(_)));

        let payload = json!({ "number": "ten" });
        let err = RuleConfig::decode(PayloadShape::Number, Some(&payload)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPayload(_)));
    }

    #[test]
    fn test_no_payload_shape() {
        assert!(matches!(
            RuleConfig::decode(PayloadShape::None, None),
            Ok(RuleConfig::None)
        ));
        assert!(matches!(
            RuleConfig::decode(PayloadShape::None, Some(&json!({}))),
            Ok(RuleConfig::None)
        ));
        assert!(RuleConfig::decode(PayloadShape::None, Some(&json!({ "format": "x" }))).is_err());
    }

    #[test]
    fn test_number_limit() {
        let limit = NumberLimit::decode(Some(&json!({ "number": 1000 }))).unwrap();
        assert!(limit.matches("1000"));
        assert!(!limit.matches("1001"));
        assert!(!limit.matches("many"));
        assert_eq!(limit.describe(), "1000");
        assert!(NumberLimit::decode(Some(&json!({ "number": -1 }))).is_err());
    }

    #[test]
    fn test_string_set_is_case_insensitive_and_deduplicated() {
        let set = StringSet::decode(Some(&json!({ "list": ["json", "BLOB", "Json", " "] }))).unwrap();
        assert!(set.matches("JSON"));
        assert!(set.matches(" blob "));
        assert!(!set.matches("TEXT"));
        assert_eq!(set.describe(), "JSON, BLOB");
    }
}
