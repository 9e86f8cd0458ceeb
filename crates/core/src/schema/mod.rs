//! Declarative per-type schemas.
//!
//! Every element type maps to a [`TypeSchema`]: an ordered list of
//! [`FieldDescriptor`]s (the four common fields first), their validators, and
//! an optional [`FormValidator`] of cross-field rules. The [`SchemaRegistry`]
//! is built once and shared read-only by every edit session.

pub mod builtin;
pub mod descriptor;
pub mod discovery;
pub mod errors;
pub mod registry;
pub mod rules;

pub use builtin::{COMMON_FIELDS, common_fields};
pub use descriptor::{FieldDescriptor, FieldKind, Validator};
pub use discovery::{SchemaInfo, SchemaRepository, discover_schemas, load_schema_file};
pub use errors::SchemaError;
pub use registry::{SchemaRegistry, TypeSchema};
pub use rules::{Capacity, FieldLookup, FormRule, FormValidator, PortTerm};
