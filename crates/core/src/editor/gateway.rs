//! The fetch/persist collaborator an editor session talks to.

use async_trait::async_trait;
use thiserror::Error;

use crate::entity::Entity;

/// Failure reported by a gateway, carried to the user as a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GatewayError {
    pub message: String,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Loads and stores entities on behalf of the editor.
#[async_trait]
pub trait EntityGateway: Send + Sync {
    /// Fetch the entity with `id`.
    async fn fetch_entity(&self, id: &str) -> Result<Entity, GatewayError>;

    /// Store `entity` and return the canonical saved record.
    async fn persist(&self, id: &str, entity: &Entity) -> Result<Entity, GatewayError>;
}
