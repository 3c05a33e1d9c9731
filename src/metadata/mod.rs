//! Per-kind zone metadata shapes and the rules for converging them.
//!
//! The PowerDNS metadata store has no notion of "false" or "empty" for a
//! kind: absence of the record is the default state. Every shape therefore
//! converges towards its default by deleting the record, never by writing
//! a falsy sentinel.

pub mod registry;

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

/// Behaviour of one metadata kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataVariant {
    /// `"1"` when enabled, record absent when disabled.
    BinaryValue,
    /// Presence of the record alone means enabled; its content is ignored.
    BinaryPresence,
    /// Explicit `"1"`/`"0"`, or absent to inherit the server-wide setting.
    TernaryValue,
    /// Unordered list of strings.
    ListValue,
    /// Single string, empty meaning unset.
    StringValue,
}

/// Decoded value of one metadata kind on one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Bool(bool),
    Ternary(Option<bool>),
    List(Vec<String>),
    String(String),
}

/// What must be sent to the API to move one kind from its old value to a
/// new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataAction {
    NoOp,
    Modify(Vec<String>),
    Delete,
}

impl MetadataVariant {
    pub fn default_value(self) -> MetadataValue {
        match self {
            MetadataVariant::BinaryValue | MetadataVariant::BinaryPresence => {
                MetadataValue::Bool(false)
            }
            MetadataVariant::TernaryValue => MetadataValue::Ternary(None),
            MetadataVariant::ListValue => MetadataValue::List(Vec::new()),
            MetadataVariant::StringValue => MetadataValue::String(String::new()),
        }
    }

    /// Decode the raw record list the API returned for this kind.
    pub fn decode(self, records: &[String]) -> MetadataValue {
        let first_is_one = records.first().is_some_and(|r| r == "1");
        match self {
            MetadataVariant::BinaryValue => MetadataValue::Bool(first_is_one),
            MetadataVariant::BinaryPresence => MetadataValue::Bool(true),
            MetadataVariant::TernaryValue => MetadataValue::Ternary(Some(first_is_one)),
            MetadataVariant::ListValue => MetadataValue::List(records.to_vec()),
            MetadataVariant::StringValue => {
                MetadataValue::String(records.first().cloned().unwrap_or_default())
            }
        }
    }

    pub fn needs_update(self, old: &MetadataValue, new: &MetadataValue) -> bool {
        match (self, old, new) {
            (MetadataVariant::ListValue, MetadataValue::List(a), MetadataValue::List(b)) => {
                !same_members(a, b)
            }
            _ => old != new,
        }
    }

    /// Payload for setting `value` on a freshly created zone. `None` means
    /// nothing has to be written.
    pub fn encode_for_set(self, value: &MetadataValue) -> Option<Vec<String>> {
        match (self, value) {
            (MetadataVariant::BinaryValue, MetadataValue::Bool(true)) => Some(vec!["1".into()]),
            (MetadataVariant::BinaryPresence, MetadataValue::Bool(true)) => {
                Some(vec![String::new()])
            }
            (MetadataVariant::TernaryValue, MetadataValue::Ternary(Some(v))) => {
                Some(vec![if *v { "1" } else { "0" }.into()])
            }
            (MetadataVariant::ListValue, MetadataValue::List(items)) if !items.is_empty() => {
                Some(items.clone())
            }
            (MetadataVariant::StringValue, MetadataValue::String(s)) if !s.is_empty() => {
                Some(vec![s.clone()])
            }
            _ => None,
        }
    }

    pub fn encode_for_update(self, old: &MetadataValue, new: &MetadataValue) -> MetadataAction {
        if !self.needs_update(old, new) {
            return MetadataAction::NoOp;
        }
        match self.encode_for_set(new) {
            Some(payload) => MetadataAction::Modify(payload),
            None => MetadataAction::Delete,
        }
    }

    /// Interpret a user-supplied JSON value. `null` selects the default.
    pub fn parse_json(self, value: &Value) -> Result<MetadataValue, &'static str> {
        if value.is_null() {
            return Ok(self.default_value());
        }
        match self {
            MetadataVariant::BinaryValue | MetadataVariant::BinaryPresence => value
                .as_bool()
                .map(MetadataValue::Bool)
                .ok_or("a boolean"),
            MetadataVariant::TernaryValue => value
                .as_bool()
                .map(|b| MetadataValue::Ternary(Some(b)))
                .ok_or("a boolean or null"),
            MetadataVariant::ListValue => {
                let items = value.as_array().ok_or("a list of strings")?;
                items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .map(MetadataValue::List)
                    .ok_or("a list of strings")
            }
            MetadataVariant::StringValue => value
                .as_str()
                .map(|s| MetadataValue::String(s.to_string()))
                .ok_or("a string"),
        }
    }
}

/// Order-insensitive comparison of two string lists.
pub fn same_members(a: &[String], b: &[String]) -> bool {
    a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}
