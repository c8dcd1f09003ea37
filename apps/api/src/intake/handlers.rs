//! Axum route handlers for the Intake API.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::intake::conversation::{EndReason, Phase, Turn};
use crate::intake::record::CandidateRecord;
use crate::intake::service::{
    export_status, find_session, read_summary, retry_export, start_session, take_turn,
    ExportStatus, TurnResponse,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    pub language: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub phase: Phase,
    pub language: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SessionDetailResponse {
    pub session_id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_active: chrono::DateTime<chrono::Utc>,
    pub phase: Phase,
    /// 1-based slot position being filled, if any.
    pub current_slot: Option<usize>,
    pub end_reason: Option<EndReason>,
    pub record: CandidateRecord,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
    pub transcript: Vec<Turn>,
    pub export: ExportStatus,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
///
/// Opens a fresh conversation. The first turn produces the greeting.
pub async fn handle_create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let session = start_session(&state, request.language.as_deref()).await?;
    let phase = session.conversation.lock().await.phase();

    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id,
            phase,
            language: session.presenter.language().map(str::to_string),
        }),
    ))
}

/// POST /api/v1/sessions/:id/turns
pub async fn handle_turn(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let response = take_turn(&state, session_id, &request.message).await?;
    Ok(Json(response))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionDetailResponse>, AppError> {
    let session = find_session(&state, session_id).await?;
    let conversation = session.conversation.lock().await;

    Ok(Json(SessionDetailResponse {
        session_id,
        created_at: session.created_at,
        last_active: session.last_active(),
        phase: conversation.phase(),
        current_slot: conversation.current_slot(),
        end_reason: conversation.end_reason(),
        record: conversation.record().clone(),
        questions: conversation.questions().to_vec(),
        answers: conversation.answers().to_vec(),
        transcript: conversation.transcript().to_vec(),
        export: export_status(&conversation, session_id),
    }))
}

/// DELETE /api/v1/sessions/:id
///
/// External reset: the next conversation needs a new session.
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(session_id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {session_id} not found")))
    }
}

/// POST /api/v1/sessions/:id/export
///
/// Retries persistence and export for a completed conversation.
pub async fn handle_retry_export(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<ExportStatus>, AppError> {
    Ok(Json(retry_export(&state, session_id).await?))
}

/// GET /api/v1/sessions/:id/summary
///
/// Downloads the plain-text interview summary.
pub async fn handle_download_summary(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let summary = read_summary(&state, session_id).await?;
    let disposition = format!("attachment; filename=\"candidate_summary_{session_id}.txt\"");
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        summary,
    ))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CandidateRecord>>, AppError> {
    Ok(Json(state.store.load_all().await?))
}
