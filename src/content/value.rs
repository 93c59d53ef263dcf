//! Tagged value model for flexible-content field data.
//!
//! Incoming block data is arbitrary nested JSON. Rather than type-sniffing
//! `serde_json::Value` at every use site, blocks are lifted into a
//! [`FieldValue`] tree once, sanitized structurally, and lowered back to
//! JSON for persistence. Unsupported values (nulls, or data nested beyond
//! [`MAX_DEPTH`]) are omitted from the lowered output and logged.

use std::collections::BTreeMap;

use serde_json::{Number, Value};
use tracing::warn;

use super::filter::sanitize_html;

/// Maximum nesting depth accepted in block data. Anything deeper is
/// treated as unsupported.
pub const MAX_DEPTH: usize = 32;

/// A single value inside a content block.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(Number),
    Boolean(bool),
    Sequence(Vec<FieldValue>),
    Mapping(BTreeMap<String, FieldValue>),
    /// A value this system does not carry: JSON null, or data nested
    /// beyond [`MAX_DEPTH`]. Omitted when lowering back to JSON.
    Unsupported,
}

impl FieldValue {
    /// Lift a JSON value into the tagged model.
    ///
    /// Emits a diagnostic for every value that maps to `Unsupported`.
    pub fn from_json(value: &Value) -> Self {
        Self::from_json_at(value, 0)
    }

    fn from_json_at(value: &Value, depth: usize) -> Self {
        if depth > MAX_DEPTH {
            warn!(depth, "block value nested too deeply, omitting");
            return Self::Unsupported;
        }

        match value {
            Value::Null => {
                warn!("null block value is unsupported, omitting");
                Self::Unsupported
            }
            Value::String(s) => Self::Text(s.clone()),
            Value::Number(n) => Self::Number(n.clone()),
            Value::Bool(b) => Self::Boolean(*b),
            Value::Array(items) => Self::Sequence(
                items
                    .iter()
                    .map(|item| Self::from_json_at(item, depth + 1))
                    .collect(),
            ),
            Value::Object(map) => Self::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json_at(v, depth + 1)))
                    .collect(),
            ),
        }
    }

    /// Sanitize the value structurally: text through the markup-stripping
    /// sanitizer, numbers and booleans unchanged, sequences and mappings
    /// recursed with the same rules.
    pub fn sanitize(self) -> Self {
        match self {
            Self::Text(s) => Self::Text(sanitize_html(&s)),
            Self::Number(_) | Self::Boolean(_) | Self::Unsupported => self,
            Self::Sequence(items) => {
                Self::Sequence(items.into_iter().map(FieldValue::sanitize).collect())
            }
            Self::Mapping(map) => Self::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, v.sanitize()))
                    .collect(),
            ),
        }
    }

    /// Lower back to JSON. Unsupported values become `None`; inside
    /// sequences and mappings they are dropped rather than serialized
    /// as null.
    pub fn into_json(self) -> Option<Value> {
        match self {
            Self::Text(s) => Some(Value::String(s)),
            Self::Number(n) => Some(Value::Number(n)),
            Self::Boolean(b) => Some(Value::Bool(b)),
            Self::Sequence(items) => Some(Value::Array(
                items.into_iter().filter_map(FieldValue::into_json).collect(),
            )),
            Self::Mapping(map) => Some(Value::Object(
                map.into_iter()
                    .filter_map(|(k, v)| v.into_json().map(|v| (k, v)))
                    .collect(),
            )),
            Self::Unsupported => None,
        }
    }
}

/// Lift, sanitize, and lower a JSON value in one pass.
pub fn sanitize_json(value: &Value) -> Option<Value> {
    FieldValue::from_json(value).sanitize().into_json()
}
