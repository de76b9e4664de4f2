//! Axum route handlers for the Session API.

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{DocumentKind, UploadedDocument};
use crate::session::controller::RewriteOutcome;
use crate::session::{SessionError, SharedSession};
use crate::state::AppState;
use crate::views::preview::{render_plain_text, PreviewLayout};
use crate::views::SessionView;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub job_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobDescriptionRequest {
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    pub experience_id: String,
    pub bullet_index: usize,
    /// Current on-screen text of the bullet; falls back to the stored text.
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RewriteResponse {
    pub rewrite: RewriteOutcome,
    pub session: SessionView,
}

#[derive(Debug, Deserialize)]
pub struct LayoutRequest {
    pub layout: PreviewLayout,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_session(state: &AppState, id: Uuid) -> Result<SharedSession, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

async fn session_view(state: &AppState, session: &SharedSession) -> SessionView {
    let guard = session.lock().await;
    SessionView::build(&guard, state.controller.is_configured())
}

/// A body over the configured upload limit surfaces as a multipart error; report it
/// as 413 rather than a malformed request.
fn multipart_error(context: &str, err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("Upload exceeds the size limit: {}", err.body_text()))
    } else {
        AppError::Validation(format!("{context}: {err}"))
    }
}

/// Reads the multipart upload: a required `file` part and an optional
/// `job_description` part. The file type is checked before its bytes are read.
async fn read_upload(
    mut multipart: Multipart,
) -> Result<(UploadedDocument, Option<String>), AppError> {
    let mut document = None;
    let mut job_description = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Malformed upload", e))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let declared = field.content_type().map(str::to_string);
                let kind = DocumentKind::detect(declared.as_deref(), file_name.as_deref())
                    .ok_or_else(|| {
                        AppError::UnsupportedMediaType(format!(
                            "{} (accepted: PDF, DOCX, plain text)",
                            declared.as_deref().unwrap_or("unknown type")
                        ))
                    })?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error("Could not read file", e))?;
                if bytes.is_empty() {
                    return Err(AppError::Validation("Uploaded file is empty".to_string()));
                }
                document = Some(UploadedDocument {
                    file_name,
                    kind,
                    bytes,
                });
            }
            Some("job_description") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| multipart_error("Could not read job_description", e))?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let document =
        document.ok_or_else(|| AppError::Validation("Missing 'file' field".to_string()))?;
    Ok((document, job_description))
}

/// `Jane Doe` → `jane-doe-resume.txt`
fn export_file_name(full_name: &str) -> String {
    let slug = full_name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        "resume.txt".to_string()
    } else {
        format!("{slug}-resume.txt")
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let (id, session) = state.sessions.create().await;
    info!("Session {id}: created ({} active)", state.sessions.len().await);
    (StatusCode::CREATED, Json(session_view(&state, &session).await))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = load_session(&state, id).await?;
    Ok(Json(session_view(&state, &session).await))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await? {
        info!("Session {id}: deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/sessions/:id/upload
///
/// Multipart upload. Parses the document and scores it against the session's job
/// description in one chain; responds once the session has left `Analyzing`.
pub async fn handle_upload(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<SessionView>, AppError> {
    let session = load_session(&state, id).await?;
    let (document, job_description) = read_upload(multipart).await?;

    state
        .controller
        .upload(&session, document, job_description)
        .await?;

    Ok(Json(session_view(&state, &session).await))
}

/// PUT /api/v1/sessions/:id/job-description
///
/// Stores the text without analysing it.
pub async fn handle_set_job_description(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<JobDescriptionRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = load_session(&state, id).await?;
    state
        .controller
        .set_job_description(&session, request.job_description)
        .await?;
    Ok(Json(session_view(&state, &session).await))
}

/// POST /api/v1/sessions/:id/analyze
///
/// Re-scores the current resume. An empty job description means general best practice.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = load_session(&state, id).await?;
    state
        .controller
        .reanalyze(&session, request.job_description)
        .await?;
    Ok(Json(session_view(&state, &session).await))
}

/// POST /api/v1/sessions/:id/reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = load_session(&state, id).await?;
    state.controller.reset(&session).await?;
    Ok(Json(session_view(&state, &session).await))
}

/// POST /api/v1/sessions/:id/rewrite
pub async fn handle_rewrite(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RewriteRequest>,
) -> Result<Json<RewriteResponse>, AppError> {
    let session = load_session(&state, id).await?;
    let rewrite = state
        .controller
        .rewrite_bullet(
            &session,
            &request.experience_id,
            request.bullet_index,
            request.text,
        )
        .await?;

    Ok(Json(RewriteResponse {
        rewrite,
        session: session_view(&state, &session).await,
    }))
}

/// PUT /api/v1/sessions/:id/layout
pub async fn handle_set_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<LayoutRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = load_session(&state, id).await?;
    state.controller.set_layout(&session, request.layout).await;
    Ok(Json(session_view(&state, &session).await))
}

/// GET /api/v1/sessions/:id/export
///
/// Plain-text download of the resume as currently edited.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = load_session(&state, id).await?;
    let guard = session.lock().await;
    let resume = guard.resume().ok_or(SessionError::NoResume)?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        export_file_name(&resume.full_name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_plain_text(resume),
    ))
}
