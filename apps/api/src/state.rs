use std::sync::Arc;

use crate::config::IntakeSettings;
use crate::intake::export::SummaryExporter;
use crate::intake::session::SessionRegistry;
use crate::intake::slots::SlotPlan;
use crate::intake::store::CandidateStore;
use crate::llm_client::ChatModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable chat model. Default: `LlmClient` against the configured endpoint.
    pub llm: Arc<dyn ChatModel>,
    pub sessions: SessionRegistry,
    pub store: Arc<CandidateStore>,
    pub exporter: Arc<SummaryExporter>,
    /// Slot order for every new conversation, fixed at startup.
    pub plan: Arc<SlotPlan>,
    pub intake: IntakeSettings,
    /// Sessions created with this language (or none) skip translation.
    pub default_language: String,
}
