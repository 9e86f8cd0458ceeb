//! Network element records and their type tags.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::path;

/// Errors raised when wrapping a raw record as an [`Entity`].
#[derive(Debug, Error)]
pub enum EntityError {
    /// The record is not a JSON object.
    #[error("entity record must be an object, got {0}")]
    NotAnObject(&'static str),
}

/// Kind of network element an entity describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    /// Optical line terminal.
    Olt,
    /// Optical network terminal at the subscriber side.
    Ont,
    /// Passive optical splitter.
    Splitter,
    /// Equipment rack or street cabinet.
    Rack,
    /// Fiber cable between two elements.
    Cable,
    /// Splice closure holding fiber splices.
    SpliceClosure,
}

impl ElementType {
    /// Every known element type, in display order.
    pub const ALL: [ElementType; 6] = [
        Self::Olt,
        Self::Ont,
        Self::Splitter,
        Self::Rack,
        Self::Cable,
        Self::SpliceClosure,
    ];

    /// Canonical type tag as stored in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Olt => "olt",
            Self::Ont => "ont",
            Self::Splitter => "splitter",
            Self::Rack => "rack",
            Self::Cable => "cable",
            Self::SpliceClosure => "splice-closure",
        }
    }

    /// Human-readable name for editor titles.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Olt => "OLT",
            Self::Ont => "ONT",
            Self::Splitter => "Splitter",
            Self::Rack => "Rack",
            Self::Cable => "Fiber Cable",
            Self::SpliceClosure => "Splice Closure",
        }
    }

    /// Icon identifier used by the host presentation layer.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Olt => "router",
            Self::Ont => "home-network",
            Self::Splitter => "call-split",
            Self::Rack => "server",
            Self::Cable => "cable",
            Self::SpliceClosure => "package-variant",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "olt" => Ok(Self::Olt),
            "ont" | "onu" => Ok(Self::Ont),
            "splitter" => Ok(Self::Splitter),
            "rack" | "cabinet" => Ok(Self::Rack),
            "cable" | "fiber-cable" | "fiber_cable" => Ok(Self::Cable),
            "splice-closure" | "splice_closure" | "closure" => Ok(Self::SpliceClosure),
            _ => Err(format!("unknown element type: {}", s)),
        }
    }
}

/// Display name for a raw type tag; unknown tags are shown verbatim.
pub fn type_display_name(type_name: &str) -> String {
    match type_name.parse::<ElementType>() {
        Ok(t) => t.display_name().to_string(),
        Err(_) => type_name.to_string(),
    }
}

/// Icon for a raw type tag; unknown tags get a generic device icon.
pub fn type_icon(type_name: &str) -> &'static str {
    type_name.parse::<ElementType>().map(|t| t.icon()).unwrap_or("help-network")
}

/// One network element record.
///
/// The record is opaque apart from `id`, `type` and the common editable fields
/// (`name`, `code`, `description`, `status`). Everything else is reached through
/// the dot-paths declared by the type's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Entity {
    record: Value,
}

impl Entity {
    /// Create a record with just an id and a type tag.
    pub fn new(id: impl Into<String>, type_name: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert("id".to_string(), Value::String(id.into()));
        map.insert("type".to_string(), Value::String(type_name.into()));
        Self { record: Value::Object(map) }
    }

    /// Wrap a raw JSON record.
    pub fn from_value(record: Value) -> Result<Self, EntityError> {
        match record {
            Value::Object(_) => Ok(Self { record }),
            Value::Null => Err(EntityError::NotAnObject("null")),
            Value::Bool(_) => Err(EntityError::NotAnObject("boolean")),
            Value::Number(_) => Err(EntityError::NotAnObject("number")),
            Value::String(_) => Err(EntityError::NotAnObject("string")),
            Value::Array(_) => Err(EntityError::NotAnObject("array")),
        }
    }

    /// Record id; numeric ids are rendered as text.
    pub fn id(&self) -> String {
        self.get("id").and_then(path::as_text).unwrap_or_default()
    }

    /// Raw type tag, empty when absent.
    pub fn type_name(&self) -> &str {
        self.get("type").and_then(Value::as_str).unwrap_or("")
    }

    /// Parsed element type, `None` for unrecognised tags.
    pub fn element_type(&self) -> Option<ElementType> {
        self.type_name().parse().ok()
    }

    /// Read a value by dot-path.
    pub fn get(&self, path: &str) -> Option<&Value> {
        path::get(&self.record, path)
    }

    /// Write a value by dot-path.
    pub fn set(&mut self, path: &str, value: Value) {
        path::set(&mut self.record, path, value);
    }

    /// Builder-style [`Entity::set`].
    pub fn with(mut self, path: &str, value: Value) -> Self {
        self.set(path, value);
        self
    }

    /// The underlying JSON record.
    pub fn as_value(&self) -> &Value {
        &self.record
    }

    pub fn into_value(self) -> Value {
        self.record
    }
}

impl TryFrom<Value> for Entity {
    type Error = EntityError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        entity.record
    }
}
