//! Session controller, the only writer of session state.
//!
//! Each operation follows the same shape: lock, validate and record the transition,
//! unlock, await the gateway, lock again to apply the result. The session lock is never
//! held across a gateway call, so rewrites of different bullets overlap freely while
//! phase-changing calls are serialized by the `Analyzing` phase itself.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::gateway::AiGateway;
use crate::models::UploadedDocument;
use crate::session::state::NoticeKind;
use crate::session::store::SharedSession;
use crate::views::preview::PreviewLayout;

/// Result of a bullet rewrite as reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteOutcome {
    pub experience_id: String,
    pub bullet_index: usize,
    pub text: String,
    /// False when the target slot no longer exists (resume replaced or unknown id).
    pub applied: bool,
}

#[derive(Clone)]
pub struct SessionController {
    gateway: Arc<dyn AiGateway>,
    /// Failed re-analysis returns to the dashboard with the last good analysis
    /// instead of regressing to upload.
    retain_analysis_on_failure: bool,
}

/// Runs a gateway-bound step on its own task. If the originating request is dropped
/// mid-call the step still completes, so a session never stays in `Analyzing` or keeps
/// a stale pending marker.
async fn detach<T, F>(task: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(task)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("session task aborted: {e}")))?
}

impl SessionController {
    pub fn new(gateway: Arc<dyn AiGateway>, retain_analysis_on_failure: bool) -> Self {
        Self {
            gateway,
            retain_analysis_on_failure,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.gateway.is_configured()
    }

    fn ensure_configured(&self) -> Result<(), AppError> {
        if self.gateway.is_configured() {
            Ok(())
        } else {
            Err(AppError::MissingCredentials)
        }
    }

    /// `Upload → Analyzing → Dashboard | Upload`: parse, then immediately score against
    /// the session's job description.
    pub async fn upload(
        &self,
        session: &SharedSession,
        document: UploadedDocument,
        job_description: Option<String>,
    ) -> Result<(), AppError> {
        self.ensure_configured()?;
        let (session_id, job_description) = {
            let mut guard = session.lock().await;
            (guard.id, guard.begin_upload(job_description)?)
        };
        info!(
            "Session {session_id}: parsing {:?} upload '{}' ({} bytes)",
            document.kind,
            document.file_name.as_deref().unwrap_or("unnamed"),
            document.bytes.len()
        );

        let this = self.clone();
        let session = session.clone();
        detach(async move {
            let resume = match this.gateway.parse_document(&document).await {
                Ok(resume) => resume,
                Err(e) => {
                    warn!("Session {session_id}: parse failed: {e}");
                    session
                        .lock()
                        .await
                        .fail_analysis(NoticeKind::ParseFailed, this.retain_analysis_on_failure);
                    return Err(e.into());
                }
            };

            session.lock().await.parse_succeeded();

            let analysis = match this.gateway.analyze_match(&resume, &job_description).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    warn!("Session {session_id}: analysis failed: {e}");
                    session
                        .lock()
                        .await
                        .fail_analysis(NoticeKind::AnalysisFailed, this.retain_analysis_on_failure);
                    return Err(e.into());
                }
            };

            info!(
                "Session {session_id}: dashboard ready (score {})",
                analysis.overall_score
            );
            session.lock().await.complete_analysis(Some(resume), analysis);
            Ok(())
        })
        .await
    }

    /// `Dashboard → Analyzing → Dashboard | Upload`: re-score the existing resume with an
    /// optionally updated job description. The resume itself is not touched.
    pub async fn reanalyze(
        &self,
        session: &SharedSession,
        job_description: Option<String>,
    ) -> Result<(), AppError> {
        self.ensure_configured()?;
        let (session_id, ticket) = {
            let mut guard = session.lock().await;
            (guard.id, guard.begin_reanalysis(job_description)?)
        };
        info!("Session {session_id}: re-analyzing against updated job description");

        let this = self.clone();
        let session = session.clone();
        detach(async move {
            match this
                .gateway
                .analyze_match(&ticket.resume, &ticket.job_description)
                .await
            {
                Ok(analysis) => {
                    session.lock().await.complete_analysis(None, analysis);
                    Ok(())
                }
                Err(e) => {
                    warn!("Session {session_id}: re-analysis failed: {e}");
                    session
                        .lock()
                        .await
                        .fail_analysis(NoticeKind::AnalysisFailed, this.retain_analysis_on_failure);
                    Err(e.into())
                }
            }
        })
        .await
    }

    pub async fn reset(&self, session: &SharedSession) -> Result<(), AppError> {
        let mut guard = session.lock().await;
        guard.reset()?;
        info!("Session {}: reset", guard.id);
        Ok(())
    }

    pub async fn set_job_description(
        &self,
        session: &SharedSession,
        job_description: String,
    ) -> Result<(), AppError> {
        session.lock().await.set_job_description(job_description)?;
        Ok(())
    }

    pub async fn set_layout(&self, session: &SharedSession, layout: PreviewLayout) {
        session.lock().await.set_layout(layout);
    }

    /// Rewrites one bullet in place. Does not change phase. A failure clears the pending
    /// marker and leaves the bullet's text as it was.
    pub async fn rewrite_bullet(
        &self,
        session: &SharedSession,
        experience_id: &str,
        bullet_index: usize,
        text: Option<String>,
    ) -> Result<RewriteOutcome, AppError> {
        self.ensure_configured()?;
        let (session_id, ticket) = {
            let mut guard = session.lock().await;
            (
                guard.id,
                guard.begin_rewrite(experience_id, bullet_index, text)?,
            )
        };

        let this = self.clone();
        let session = session.clone();
        detach(async move {
            match this.gateway.rewrite_bullet(&ticket.text, &ticket.role).await {
                Ok(text) => {
                    let applied = session.lock().await.apply_rewrite(&ticket, text.clone());
                    if !applied {
                        warn!(
                            "Session {session_id}: rewrite for {}[{}] had no target; dropped",
                            ticket.key.experience_id, ticket.key.index
                        );
                    }
                    Ok(RewriteOutcome {
                        experience_id: ticket.key.experience_id.clone(),
                        bullet_index: ticket.key.index,
                        text,
                        applied,
                    })
                }
                Err(e) => {
                    warn!("Session {session_id}: rewrite failed: {e}");
                    session.lock().await.abandon_rewrite(&ticket);
                    Err(e.into())
                }
            }
        })
        .await
    }
}
