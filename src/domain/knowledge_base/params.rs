//! Coercion of string-typed client configuration values
//!
//! Splitter parameters arrive from clients as strings. They are coerced with
//! a fixed, total fallback order - int, then float, then string - and this
//! order is part of the config-ingestion contract, not an implementation
//! detail.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// A coerced configuration value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Coerce a raw string: int first, then float, then the string itself.
    pub fn coerce(raw: &str) -> Self {
        if let Ok(i) = raw.trim().parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(f) = raw.trim().parse::<f64>() {
            return Self::Float(f);
        }
        Self::Text(raw.to_string())
    }

    /// The value as a non-negative integer, if it is one.
    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Self::Int(i) if *i >= 0 => Some(*i as usize),
            _ => None,
        }
    }
}

/// Coerce every value of a string-typed parameter map.
pub fn coerce_params(raw: &HashMap<String, String>) -> BTreeMap<String, ParamValue> {
    raw.iter()
        .map(|(key, value)| (key.clone(), ParamValue::coerce(value)))
        .collect()
}
