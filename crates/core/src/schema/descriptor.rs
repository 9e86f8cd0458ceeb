//! Field kinds, descriptors and per-field validators.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of editor control a field is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text input.
    Text,
    /// Numeric input.
    Number,
    /// Single choice from `options`.
    Select,
    /// Multiple choices from `options`.
    Multiselect,
    /// Boolean toggle.
    Checkbox,
    /// Repeated sub-record group described by `sub_fields`.
    Array,
}

impl FieldKind {
    /// Get the display name for this field kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Checkbox => "checkbox",
            Self::Array => "array",
        }
    }

    /// Value a fresh control of this kind starts with.
    pub fn empty_value(&self) -> Value {
        match self {
            Self::Multiselect => Value::Array(vec![]),
            Self::Checkbox => Value::Bool(false),
            _ => Value::String(String::new()),
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "string" | "str" => Ok(Self::Text),
            "number" | "num" | "int" | "integer" | "float" => Ok(Self::Number),
            "select" | "enum" => Ok(Self::Select),
            "multiselect" | "multi-select" | "tags" => Ok(Self::Multiselect),
            "checkbox" | "bool" | "boolean" => Ok(Self::Checkbox),
            "array" | "list" => Ok(Self::Array),
            _ => Err(format!("unknown field kind: {}", s)),
        }
    }
}

/// A single per-field validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum Validator {
    /// Value must not be empty.
    Required,
    /// Numeric value must be at least `value`.
    Min { value: f64 },
    /// Numeric value must be at most `value`.
    Max { value: f64 },
    /// Text must have at least `value` characters.
    MinLength { value: usize },
    /// Text must have at most `value` characters.
    MaxLength { value: usize },
    /// Text must match the regular expression.
    Pattern { regex: String },
    /// Numeric value must be a whole number.
    Integer,
}

/// Declarative description of one editable field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Dot-path into the entity record; also the control's name.
    pub path: String,

    /// Control kind.
    pub kind: FieldKind,

    /// Label shown next to the control.
    #[serde(default)]
    pub label: String,

    /// Whether the field must be filled in.
    #[serde(default)]
    pub required: bool,

    /// Allowed values for select and multiselect fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,

    /// Item layout for array fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<FieldDescriptor>,

    /// Extra validators beyond `required`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl FieldDescriptor {
    fn new(path: &str, kind: FieldKind, label: &str) -> Self {
        Self {
            path: path.to_string(),
            kind,
            label: label.to_string(),
            required: false,
            options: None,
            sub_fields: Vec::new(),
            validators: Vec::new(),
        }
    }

    /// Create an optional text field.
    pub fn text(path: &str, label: &str) -> Self {
        Self::new(path, FieldKind::Text, label)
    }

    /// Create an optional number field.
    pub fn number(path: &str, label: &str) -> Self {
        Self::new(path, FieldKind::Number, label)
    }

    /// Create a whole-number field with a lower bound.
    pub fn count(path: &str, label: &str, min: f64) -> Self {
        Self::number(path, label).with(Validator::Integer).with(Validator::Min { value: min })
    }

    /// Create a select field over string options.
    pub fn select(path: &str, label: &str, options: &[&str]) -> Self {
        let mut field = Self::new(path, FieldKind::Select, label);
        field.options = Some(options.iter().map(|o| Value::String((*o).to_string())).collect());
        field
    }

    /// Create a multiselect field over string options.
    pub fn multiselect(path: &str, label: &str, options: &[&str]) -> Self {
        let mut field = Self::select(path, label, options);
        field.kind = FieldKind::Multiselect;
        field
    }

    /// Create a checkbox field.
    pub fn checkbox(path: &str, label: &str) -> Self {
        Self::new(path, FieldKind::Checkbox, label)
    }

    /// Create an array field with the given item layout.
    pub fn array(path: &str, label: &str, sub_fields: Vec<FieldDescriptor>) -> Self {
        let mut field = Self::new(path, FieldKind::Array, label);
        field.sub_fields = sub_fields;
        field
    }

    /// Mark the field as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a validator.
    pub fn with(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn is_array(&self) -> bool {
        self.kind == FieldKind::Array
    }

    /// Validators in evaluation order: `required` first, then the declared ones.
    pub fn effective_validators(&self) -> Vec<Validator> {
        let mut out = Vec::with_capacity(self.validators.len() + 1);
        if self.required {
            out.push(Validator::Required);
        }
        out.extend(self.validators.iter().filter(|v| **v != Validator::Required).cloned());
        out
    }
}
