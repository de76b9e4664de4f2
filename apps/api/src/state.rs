use crate::config::Config;
use crate::session::{SessionController, SessionStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    /// Drives every session transition. Wraps the pluggable `AiGateway`.
    pub controller: SessionController,
}
