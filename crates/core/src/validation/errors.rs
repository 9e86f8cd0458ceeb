//! Validation error types.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Where an error was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorScope {
    /// A top-level leaf control.
    Field,
    /// A leaf control inside an array item.
    Group,
    /// A cross-field rule over the whole form.
    Form,
}

/// What went wrong, with the values involved.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ErrorKind {
    #[error("this field is required")]
    Required,

    #[error("value {actual} is less than minimum {min}")]
    Min { min: f64, actual: f64 },

    #[error("value {actual} is greater than maximum {max}")]
    Max { max: f64, actual: f64 },

    #[error("must be at least {min} characters (got {actual})")]
    MinLength { min: usize, actual: usize },

    #[error("must be at most {max} characters (got {actual})")]
    MaxLength { max: usize, actual: usize },

    #[error("value does not match pattern '{pattern}'")]
    Pattern { pattern: String },

    #[error("value {actual} must be a whole number")]
    Integer { actual: f64 },

    #[error("'{value}' is not a number")]
    NotANumber { value: String },

    #[error("'{value}' is not one of the allowed options")]
    InvalidOption { value: String },

    #[error("used ports ({actual}) exceed the total port count ({max})")]
    UsedPortsExceeded { actual: i64, max: i64 },

    #[error("transmit power ({transmit} dBm) is below receive power ({receive} dBm)")]
    InvalidPowerLevels { transmit: f64, receive: f64 },

    #[error("output port count ({actual}) does not match split ratio 1:{expected}")]
    InvalidSplitRatio { actual: i64, expected: i64 },

    #[error("used ports ({actual}) exceed port capacity ({max})")]
    PortCapacityExceeded { actual: i64, max: i64 },

    #[error("used rack units ({actual}) exceed rack unit capacity ({max})")]
    RackUnitsExceeded { actual: i64, max: i64 },

    #[error("rack unit capacity ({actual}) exceeds the physical height limit ({max})")]
    RackHeightExceeded { actual: i64, max: i64 },

    #[error("source and target must be different elements (both are '{id}')")]
    SameSourceAndTarget { id: String },
}

impl ErrorKind {
    /// Stable error code, matching the serialized `kind` tag.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Min { .. } => "min",
            Self::Max { .. } => "max",
            Self::MinLength { .. } => "minLength",
            Self::MaxLength { .. } => "maxLength",
            Self::Pattern { .. } => "pattern",
            Self::Integer { .. } => "integer",
            Self::NotANumber { .. } => "notANumber",
            Self::InvalidOption { .. } => "invalidOption",
            Self::UsedPortsExceeded { .. } => "usedPortsExceeded",
            Self::InvalidPowerLevels { .. } => "invalidPowerLevels",
            Self::InvalidSplitRatio { .. } => "invalidSplitRatio",
            Self::PortCapacityExceeded { .. } => "portCapacityExceeded",
            Self::RackUnitsExceeded { .. } => "rackUnitsExceeded",
            Self::RackHeightExceeded { .. } => "rackHeightExceeded",
            Self::SameSourceAndTarget { .. } => "sameSourceAndTarget",
        }
    }

    /// Parameters carried by this error, keyed by name.
    pub fn params(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(mut map)) => {
                map.remove("kind");
                map
            }
            _ => Map::new(),
        }
    }
}

/// Position of a leaf control inside an array field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemRef {
    /// Zero-based item index; shifts down when earlier items are removed.
    pub index: usize,
    /// Sub-field path within the item.
    pub field: String,
}

/// One reportable validation error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub scope: ErrorScope,
    /// Control path for field errors, array path for group errors, anchor
    /// field path for form errors.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemRef>,
    #[serde(flatten)]
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    fn new(scope: ErrorScope, path: &str, item: Option<ItemRef>, kind: ErrorKind) -> Self {
        let message = kind.to_string();
        Self { scope, path: path.to_string(), item, kind, message }
    }

    /// Error on a top-level control.
    pub fn field(path: &str, kind: ErrorKind) -> Self {
        Self::new(ErrorScope::Field, path, None, kind)
    }

    /// Error on a control inside array item `index`.
    pub fn group(array_path: &str, index: usize, field: &str, kind: ErrorKind) -> Self {
        Self::new(
            ErrorScope::Group,
            array_path,
            Some(ItemRef { index, field: field.to_string() }),
            kind,
        )
    }

    /// Error from a cross-field rule.
    pub fn form(anchor_path: &str, kind: ErrorKind) -> Self {
        Self::new(ErrorScope::Form, anchor_path, None, kind)
    }

    /// Parameters of the underlying kind.
    pub fn params(&self) -> Map<String, Value> {
        self.kind.params()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use serde_json::json;

    #[test]
    fn test_code_matches_serialized_tag() {
        let kinds = [
            ErrorKind::Required,
            ErrorKind::MinLength { min: 1, actual: 0 },
            ErrorKind::NotANumber { value: "x".into() },
            ErrorKind::UsedPortsExceeded { actual: 11, max: 10 },
            ErrorKind::SameSourceAndTarget { id: "a".into() },
        ];
        for kind in kinds {
            let raw = serde_json::to_value(&kind).unwrap();
            assert_eq!(raw["kind"], json!(kind.code()));
        }
    }

    #[test]
    fn test_params() {
        let kind = ErrorKind::InvalidSplitRatio { actual: 8, expected: 16 };
        let params = kind.params();
        assert_eq!(params.get("actual"), Some(&json!(8)));
        assert_eq!(params.get("expected"), Some(&json!(16)));
        assert!(!params.contains_key("kind"));

        assert!(ErrorKind::Required.params().is_empty());
    }

    #[test]
    fn test_messages() {
        assert_snapshot!(
            ErrorKind::UsedPortsExceeded { actual: 11, max: 10 }.to_string(),
            @"used ports (11) exceed the total port count (10)"
        );
        assert_snapshot!(
            ErrorKind::InvalidPowerLevels { transmit: -3.5, receive: 2.0 }.to_string(),
            @"transmit power (-3.5 dBm) is below receive power (2 dBm)"
        );
        assert_snapshot!(
            ErrorKind::InvalidSplitRatio { actual: 8, expected: 16 }.to_string(),
            @"output port count (8) does not match split ratio 1:16"
        );
    }

    #[test]
    fn test_group_error_serialization() {
        let err = ValidationError::group("metadata.cards", 1, "slot", ErrorKind::Required);
        let raw = serde_json::to_value(&err).unwrap();
        assert_eq!(
            raw,
            json!({
                "scope": "group",
                "path": "metadata.cards",
                "item": {"index": 1, "field": "slot"},
                "kind": "required",
                "message": "this field is required"
            })
        );
    }
}
