//! Edit session state machine.
//!
//! ```text
//! Idle -> Loading -> Ready | LoadError
//! Ready -> Saving -> Closed | Ready (save failed, edits kept)
//! any -> Disposed
//! ```
//!
//! Requests are split into a `begin_*` step that hands out a [`RequestTicket`]
//! and a `finish_*` step that consumes it. Each ticket carries the session
//! generation at the time it was issued; disposing the session or starting a
//! new request moves the generation on, so late responses are dropped without
//! touching the form.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::gateway::{EntityGateway, GatewayError};
use crate::entity::Entity;
use crate::form::{self, FormModel};
use crate::schema::SchemaRegistry;
use crate::validation::{self, ValidationSummary};

/// Error type for editor session operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("a request is already in progress")]
    Busy,

    #[error("cannot {action} while {state}")]
    InvalidState { action: &'static str, state: EditorState },

    #[error("form has {errors} validation error(s)")]
    Blocked { errors: usize },

    #[error("failed to load entity: {0}")]
    Load(String),

    #[error("failed to save entity: {0}")]
    Save(String),
}

type Result<T> = std::result::Result<T, EditorError>;

/// Lifecycle state of one edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Loading,
    Ready,
    LoadError,
    Saving,
    Closed,
    Disposed,
}

impl EditorState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::LoadError => "load-error",
            Self::Saving => "saving",
            Self::Closed => "closed",
            Self::Disposed => "disposed",
        }
    }
}

impl std::fmt::Display for EditorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestKind {
    Load,
    Save,
}

/// Proof that a request was started by a given session generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
    kind: RequestKind,
}

/// Everything needed to issue a persist call.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub ticket: RequestTicket,
    pub id: String,
    pub entity: Entity,
}

/// One edit session over one entity.
#[derive(Debug)]
pub struct EditorController {
    registry: Arc<SchemaRegistry>,
    state: EditorState,
    generation: u64,
    entity_id: Option<String>,
    original: Option<Entity>,
    form: Option<FormModel>,
    last_error: Option<String>,
    saved: Option<Entity>,
}

impl EditorController {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            state: EditorState::Idle,
            generation: 0,
            entity_id: None,
            original: None,
            form: None,
            last_error: None,
            saved: None,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Whether a load or save is outstanding. Callers must not start another.
    pub fn is_busy(&self) -> bool {
        matches!(self.state, EditorState::Loading | EditorState::Saving)
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// The record as it was loaded.
    pub fn original(&self) -> Option<&Entity> {
        self.original.as_ref()
    }

    /// Message of the last failed load or save.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Canonical record returned by a successful save.
    pub fn saved_entity(&self) -> Option<&Entity> {
        self.saved.as_ref()
    }

    pub fn form(&self) -> Option<&FormModel> {
        self.form.as_ref()
    }

    /// Mutable access to the form, only while the session is `Ready`.
    pub fn form_mut(&mut self) -> Result<&mut FormModel> {
        if self.state != EditorState::Ready {
            return Err(EditorError::InvalidState { action: "edit", state: self.state });
        }
        self.form
            .as_mut()
            .ok_or(EditorError::InvalidState { action: "edit", state: self.state })
    }

    /// Current validation report, if a form is loaded.
    pub fn summary(&self) -> Option<ValidationSummary> {
        self.form.as_ref().map(validation::aggregate)
    }

    fn next_ticket(&mut self, kind: RequestKind) -> RequestTicket {
        self.generation += 1;
        RequestTicket { generation: self.generation, kind }
    }

    fn accepts(&self, ticket: RequestTicket, kind: RequestKind, state: EditorState) -> bool {
        ticket.kind == kind && ticket.generation == self.generation && self.state == state
    }

    /// Start loading `id`. Only allowed from `Idle`.
    pub fn begin_load(&mut self, id: &str) -> Result<RequestTicket> {
        if self.is_busy() {
            return Err(EditorError::Busy);
        }
        if self.state != EditorState::Idle {
            return Err(EditorError::InvalidState { action: "load", state: self.state });
        }
        self.entity_id = Some(id.to_string());
        self.state = EditorState::Loading;
        info!("loading entity {}", id);
        Ok(self.next_ticket(RequestKind::Load))
    }

    /// Apply a fetch result. Returns `false` if the response was stale and ignored.
    pub fn finish_load(
        &mut self,
        ticket: RequestTicket,
        result: std::result::Result<Entity, GatewayError>,
    ) -> bool {
        if !self.accepts(ticket, RequestKind::Load, EditorState::Loading) {
            debug!("ignoring stale load response");
            return false;
        }
        match result {
            Ok(entity) => {
                self.form = Some(form::build(&self.registry, &entity));
                self.original = Some(entity);
                self.last_error = None;
                self.state = EditorState::Ready;
                info!("entity {} ready", self.entity_id.as_deref().unwrap_or(""));
            }
            Err(e) => {
                warn!("load failed: {}", e);
                self.last_error = Some(e.message);
                self.state = EditorState::LoadError;
            }
        }
        true
    }

    /// Start saving. Only allowed from `Ready` with no validation errors.
    ///
    /// When errors block submission every control is marked touched so the
    /// errors become visible.
    pub fn begin_save(&mut self) -> Result<SaveRequest> {
        if self.is_busy() {
            return Err(EditorError::Busy);
        }
        if self.state != EditorState::Ready {
            return Err(EditorError::InvalidState { action: "save", state: self.state });
        }
        let (Some(form), Some(original)) = (self.form.as_mut(), self.original.as_ref()) else {
            return Err(EditorError::InvalidState { action: "save", state: self.state });
        };

        let summary = validation::aggregate(form);
        if !summary.can_submit() {
            form.mark_all_touched();
            debug!("save blocked by {} error(s)", summary.len());
            return Err(EditorError::Blocked { errors: summary.len() });
        }

        let entity = form::patch_entity(form, original);
        let id = self.entity_id.clone().unwrap_or_else(|| original.id());
        self.state = EditorState::Saving;
        info!("saving entity {}", id);
        Ok(SaveRequest { ticket: self.next_ticket(RequestKind::Save), id, entity })
    }

    /// Apply a persist result. Returns `false` if the response was stale and ignored.
    ///
    /// On failure the session returns to `Ready` with the form as it was.
    pub fn finish_save(
        &mut self,
        ticket: RequestTicket,
        result: std::result::Result<Entity, GatewayError>,
    ) -> bool {
        if !self.accepts(ticket, RequestKind::Save, EditorState::Saving) {
            debug!("ignoring stale save response");
            return false;
        }
        match result {
            Ok(saved) => {
                self.saved = Some(saved);
                self.form = None;
                self.last_error = None;
                self.state = EditorState::Closed;
                info!("entity {} saved", self.entity_id.as_deref().unwrap_or(""));
            }
            Err(e) => {
                warn!("save failed: {}", e);
                self.last_error = Some(e.message);
                self.state = EditorState::Ready;
            }
        }
        true
    }

    /// End the session. Outstanding responses will be ignored.
    pub fn dispose(&mut self) {
        self.generation += 1;
        self.form = None;
        self.state = EditorState::Disposed;
        debug!("session disposed");
    }

    /// Fetch `id` through `gateway` and populate the form.
    pub async fn load(&mut self, gateway: &dyn EntityGateway, id: &str) -> Result<()> {
        let ticket = self.begin_load(id)?;
        let result = gateway.fetch_entity(id).await;
        self.finish_load(ticket, result);
        match self.state {
            EditorState::LoadError => {
                Err(EditorError::Load(self.last_error.clone().unwrap_or_default()))
            }
            _ => Ok(()),
        }
    }

    /// Validate, persist through `gateway`, and close the session on success.
    pub async fn save(&mut self, gateway: &dyn EntityGateway) -> Result<Entity> {
        let request = self.begin_save()?;
        let result = gateway.persist(&request.id, &request.entity).await;
        self.finish_save(request.ticket, result.clone());
        result.map_err(|e| EditorError::Save(e.message))
    }
}
