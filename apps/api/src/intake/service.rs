//! Turn orchestration — runs the state machine for one session, decorates the
//! replies for presentation, and finalizes completed conversations.
//!
//! Flow per turn: lock session → Conversation::handle_turn → present replies →
//! (on completion) append to store → export summary → response.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::conversation::{Conversation, EndReason, Phase};
use crate::intake::export::SummaryExporter;
use crate::intake::session::SessionEntry;
use crate::intake::store::{CandidateStore, StoreError};
use crate::intake::translator::{is_language_code, Presenter};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisplayMessage {
    pub speaker: Speaker,
    pub text: String,
}

/// Whether the interview summary can be downloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExportStatus {
    NotReady,
    Ready { summary_url: String },
    Failed { message: String },
}

#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub session_id: Uuid,
    pub messages: Vec<DisplayMessage>,
    pub phase: Phase,
    pub ended: bool,
    pub end_reason: Option<EndReason>,
    pub export: ExportStatus,
}

pub fn summary_url(session_id: Uuid) -> String {
    format!("/api/v1/sessions/{session_id}/summary")
}

/// Opens a new isolated conversation. A blank or missing language uses the default.
pub async fn start_session(
    state: &AppState,
    language: Option<&str>,
) -> Result<Arc<SessionEntry>, AppError> {
    let language = match language.map(str::trim).filter(|l| !l.is_empty()) {
        Some(code) if is_language_code(code) => code,
        Some(code) => {
            return Err(AppError::Validation(format!(
                "language must be a 2 or 3 letter code, got '{code}'"
            )))
        }
        None => state.default_language.as_str(),
    };
    let conversation = Conversation::new(state.plan.clone(), state.intake.clone());
    let presenter = Presenter::for_language(state.llm.clone(), language, &state.default_language);
    Ok(state.sessions.create(conversation, presenter).await)
}

pub async fn find_session(state: &AppState, session_id: Uuid) -> Result<Arc<SessionEntry>, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

/// Runs exactly one turn for `session_id`.
pub async fn take_turn(
    state: &AppState,
    session_id: Uuid,
    message: &str,
) -> Result<TurnResponse, AppError> {
    if message.trim().is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let session = find_session(state, session_id).await?;
    let mut conversation = session.conversation.lock().await;

    let outcome = conversation.handle_turn(state.llm.as_ref(), message).await?;

    let export = if outcome.completed {
        match finalize(&mut conversation, session_id, &state.store, &state.exporter).await {
            Ok(_) => ExportStatus::Ready {
                summary_url: summary_url(session_id),
            },
            Err(e) => {
                error!("Finalization failed for session {session_id}: {e}");
                ExportStatus::Failed {
                    message: "Your answers were recorded but the summary could not be saved yet. \
                              Retry the export to try again."
                        .to_string(),
                }
            }
        }
    } else {
        export_status(&conversation, session_id)
    };

    let mut messages = vec![DisplayMessage {
        speaker: Speaker::User,
        text: message.to_string(),
    }];
    for reply in &outcome.replies {
        messages.push(DisplayMessage {
            speaker: Speaker::Assistant,
            text: session.presenter.present(reply).await,
        });
    }

    Ok(TurnResponse {
        session_id,
        messages,
        phase: conversation.phase(),
        ended: conversation.is_ended(),
        end_reason: conversation.end_reason(),
        export,
    })
}

/// Persists and exports a completed conversation. Each step runs at most once
/// successfully, so a retry after a partial failure does not append twice.
pub async fn finalize(
    conversation: &mut Conversation,
    session_id: Uuid,
    store: &CandidateStore,
    exporter: &SummaryExporter,
) -> Result<Option<PathBuf>, StoreError> {
    let Some(record) = conversation.completed_record().cloned() else {
        return Ok(None);
    };

    if !conversation.is_persisted() {
        store.append(&record).await?;
        conversation.mark_persisted();
    }

    let path = exporter.path_for(session_id);
    if !conversation.is_exported() {
        exporter.export(session_id, &record).await?;
        conversation.mark_exported();
        info!("Session {session_id} finalized");
    }
    Ok(Some(path))
}

/// Retries finalization for a completed conversation.
pub async fn retry_export(state: &AppState, session_id: Uuid) -> Result<ExportStatus, AppError> {
    let session = find_session(state, session_id).await?;
    let mut conversation = session.conversation.lock().await;

    if conversation.completed_record().is_none() {
        return Err(AppError::Conflict(
            "Only completed conversations can be exported".to_string(),
        ));
    }

    finalize(&mut conversation, session_id, &state.store, &state.exporter).await?;
    Ok(ExportStatus::Ready {
        summary_url: summary_url(session_id),
    })
}

/// The exported summary text for a finalized session.
pub async fn read_summary(state: &AppState, session_id: Uuid) -> Result<String, AppError> {
    let session = find_session(state, session_id).await?;
    let exported = session.conversation.lock().await.is_exported();
    if !exported {
        return Err(AppError::NotFound(format!(
            "No summary available for session {session_id}"
        )));
    }
    Ok(state.exporter.read(session_id).await?)
}

pub fn export_status(conversation: &Conversation, session_id: Uuid) -> ExportStatus {
    match (conversation.completed_record(), conversation.is_exported()) {
        (Some(_), true) => ExportStatus::Ready {
            summary_url: summary_url(session_id),
        },
        (Some(_), false) => ExportStatus::Failed {
            message: "The summary has not been saved yet. Retry the export.".to_string(),
        },
        (None, _) => ExportStatus::NotReady,
    }
}
