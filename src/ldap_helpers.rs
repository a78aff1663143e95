//! LDAP Dump Helper Utilities
//!
//! Extension trait for working with objects from a directory JSON dump,
//! reducing boilerplate for common attribute extraction patterns.
//!
//! Dump objects carry their attributes in a nested `attributes` map. A
//! single-valued attribute may arrive either as a scalar or wrapped in a
//! one-element array; multi-valued attributes are arrays. Numeric attributes
//! may be serialized as numbers or as decimal strings.

use serde_json::Value;

/// Extension trait for dump objects to simplify attribute extraction
pub(crate) trait DumpObjectExt {
    /// Get a string attribute, returning empty string if not found
    fn get_string_attr(&self, name: &str) -> String;

    /// Get an optional string attribute (returns None if missing or empty)
    fn get_optional_attr(&self, name: &str) -> Option<String>;

    /// Get a u32 attribute, returning 0 if not found or invalid
    fn get_u32_attr(&self, name: &str) -> u32;

    /// Get all values for a multi-valued attribute
    fn get_multi_attr(&self, name: &str) -> Vec<String>;

    /// Check if attribute exists AND has at least one value
    fn has_values(&self, name: &str) -> bool;
}

/// Unwrap a possibly list-wrapped attribute to its first value
fn first_value<'a>(value: &'a Value) -> Option<&'a Value> {
    match value {
        Value::Array(items) => items.first(),
        other => Some(other),
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn attr<'a>(obj: &'a Value, name: &str) -> Option<&'a Value> {
    obj.get("attributes").and_then(|attrs| attrs.get(name))
}

impl DumpObjectExt for Value {
    fn get_string_attr(&self, name: &str) -> String {
        self.get_optional_attr(name).unwrap_or_default()
    }

    fn get_optional_attr(&self, name: &str) -> Option<String> {
        attr(self, name)
            .and_then(first_value)
            .and_then(value_to_string)
            .filter(|s| !s.is_empty())
    }

    fn get_u32_attr(&self, name: &str) -> u32 {
        match attr(self, name).and_then(first_value) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0) as u32,
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        }
    }

    fn get_multi_attr(&self, name: &str) -> Vec<String> {
        match attr(self, name) {
            Some(Value::Array(items)) => items.iter().filter_map(value_to_string).collect(),
            Some(single) => value_to_string(single).into_iter().collect(),
            None => Vec::new(),
        }
    }

    fn has_values(&self, name: &str) -> bool {
        match attr(self, name) {
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Null) | None => false,
            Some(_) => true,
        }
    }
}
