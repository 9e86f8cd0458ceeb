//! Per-field validation of control values.

use regex::Regex;
use serde_json::Value;

use super::errors::ErrorKind;
use crate::path;
use crate::schema::{FieldKind, Validator};

/// Everything needed to validate one leaf control.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRules {
    pub kind: FieldKind,
    pub options: Option<Vec<Value>>,
    pub validators: Vec<Validator>,
}

impl FieldRules {
    pub fn is_required(&self) -> bool {
        self.validators.contains(&Validator::Required)
    }

    /// Validate a value, returning every violated rule.
    ///
    /// An empty value only fails `required`; every other check is skipped so a
    /// blank optional field is always valid.
    pub fn check(&self, value: &Value) -> Vec<ErrorKind> {
        let mut errors = Vec::new();

        if path::is_empty(value) {
            if self.is_required() {
                errors.push(ErrorKind::Required);
            }
            return errors;
        }

        // Kind checks
        let number = match self.kind {
            FieldKind::Number => match path::as_number(value) {
                Some(n) => Some(n),
                None => {
                    errors.push(ErrorKind::NotANumber { value: display(value) });
                    return errors;
                }
            },
            _ => None,
        };

        if let Some(options) = &self.options {
            match (self.kind, value) {
                (FieldKind::Multiselect, Value::Array(selected)) => {
                    for v in selected {
                        if !options.contains(v) {
                            errors.push(ErrorKind::InvalidOption { value: display(v) });
                        }
                    }
                }
                (FieldKind::Select | FieldKind::Multiselect, v) if !options.contains(v) => {
                    errors.push(ErrorKind::InvalidOption { value: display(v) });
                }
                _ => {}
            }
        }

        for validator in &self.validators {
            if let Some(err) = check_one(validator, value, number) {
                errors.push(err);
            }
        }

        errors
    }
}

fn check_one(validator: &Validator, value: &Value, number: Option<f64>) -> Option<ErrorKind> {
    let number = number.or_else(|| path::as_number(value));
    match validator {
        Validator::Required => None,
        Validator::Min { value: min } => {
            number.filter(|n| n < min).map(|actual| ErrorKind::Min { min: *min, actual })
        }
        Validator::Max { value: max } => {
            number.filter(|n| n > max).map(|actual| ErrorKind::Max { max: *max, actual })
        }
        Validator::Integer => {
            number.filter(|n| n.fract() != 0.0).map(|actual| ErrorKind::Integer { actual })
        }
        Validator::MinLength { value: min } => {
            let actual = text_len(value)?;
            (actual < *min).then_some(ErrorKind::MinLength { min: *min, actual })
        }
        Validator::MaxLength { value: max } => {
            let actual = text_len(value)?;
            (actual > *max).then_some(ErrorKind::MaxLength { max: *max, actual })
        }
        Validator::Pattern { regex } => {
            let text = value.as_str()?;
            match Regex::new(regex) {
                Ok(re) if !re.is_match(text) => {
                    Some(ErrorKind::Pattern { pattern: regex.clone() })
                }
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!("ignoring invalid pattern '{}': {}", regex, e);
                    None
                }
            }
        }
    }
}

fn text_len(value: &Value) -> Option<usize> {
    value.as_str().map(|s| s.chars().count())
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
