use std::sync::Arc;

use crate::config::Config;
use crate::forms::FormsPublisher;
use crate::llm_client::ChatModel;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Clients are constructed once at startup and passed in explicitly —
/// there are no process-wide agent singletons, and both external seams
/// are trait objects so tests run against stubs.
#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn ChatModel>,
    pub forms: Arc<dyn FormsPublisher>,
    pub sessions: SessionStore,
    pub config: Config,
}
