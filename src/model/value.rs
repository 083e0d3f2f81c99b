//! Typed option values and their wire encoding.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::facade::ValueType;

/// Decoded value of one option.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Boolean(bool),
    Scalar(String),
    List(BTreeSet<String>),
}

impl OptionValue {
    /// Decode a raw setting according to the option's type.
    ///
    /// Returns `None` for types the model does not hold.
    pub fn decode(value_type: &ValueType, raw: &str) -> Option<Self> {
        match value_type {
            ValueType::Scalar => Some(OptionValue::Scalar(raw.to_string())),
            ValueType::Boolean => Some(OptionValue::Boolean(parse_bool(raw))),
            ValueType::List => Some(OptionValue::List(split_list(raw))),
            ValueType::Other(_) => None,
        }
    }

    /// Wire string for this value; `None` for an empty list.
    pub fn encode(&self) -> Option<String> {
        match self {
            OptionValue::Scalar(s) => Some(s.clone()),
            OptionValue::Boolean(b) => Some(b.to_string()),
            OptionValue::List(items) if items.is_empty() => None,
            OptionValue::List(items) => Some(join_list(items)),
        }
    }

    /// Whether this value can be stored under an option of `value_type`.
    pub fn matches(&self, value_type: &ValueType) -> bool {
        matches!(
            (self, value_type),
            (OptionValue::Scalar(_), ValueType::Scalar)
                | (OptionValue::Boolean(_), ValueType::Boolean)
                | (OptionValue::List(_), ValueType::List)
        )
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&BTreeSet<String>> {
        match self {
            OptionValue::List(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode().unwrap_or_default())
    }
}

/// Boolean literal parsing: only a case-insensitive "true" is true.
pub fn parse_bool(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("true")
}

/// Split a comma-separated list into its distinct members, dropping empty segments.
pub fn split_list(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_list(items: &BTreeSet<String>) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}
