//! Edit sessions: loading an entity into a form and saving it back.

pub mod controller;
pub mod gateway;

pub use controller::{EditorController, EditorError, EditorState, RequestTicket, SaveRequest};
pub use gateway::{EntityGateway, GatewayError};
