//! Field, group and form-level validation.

pub mod aggregator;
pub mod errors;
pub mod field;

pub use aggregator::{ValidationSummary, aggregate};
pub use errors::{ErrorKind, ErrorScope, ItemRef, ValidationError};
pub use field::FieldRules;
