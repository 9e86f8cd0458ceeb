//! Schema-driven edit forms for fiber network elements.
//!
//! An [`Entity`] is a loosely structured record addressed by dot-paths. The
//! [`SchemaRegistry`] says which fields each element type exposes and how they
//! are validated; [`form::build`] turns an entity into a [`FormModel`], and an
//! [`EditorController`] drives one load/edit/save session against an
//! [`EntityGateway`].

pub mod config;
pub mod editor;
pub mod entity;
pub mod form;
pub mod logging;
pub mod path;
pub mod schema;
pub mod validation;

pub use editor::{EditorController, EditorError, EditorState, EntityGateway, GatewayError};
pub use entity::{ElementType, Entity, EntityError};
pub use form::FormModel;
pub use schema::{SchemaRegistry, TypeSchema};
pub use validation::{ValidationError, ValidationSummary};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
