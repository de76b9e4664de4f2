// Read-only projections of session state for the browser.
// Nothing here calls the gateway or mutates a session.

pub mod dashboard;
pub mod preview;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{AnalysisResult, ResumeData};
use crate::session::state::{BulletKey, Notice};
use crate::session::{AppPhase, Session};

use dashboard::DashboardView;
use preview::PreviewLayout;

/// Warning shown when the service credential is absent.
pub const MISSING_CREDENTIALS_WARNING: &str = "Missing API Key";

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: AppPhase,
    pub progress: Option<&'static str>,
    pub notice: Option<Notice>,
    pub job_description: String,
    pub layout: PreviewLayout,
    pub rewrite_enabled: bool,
    pub resume: Option<ResumeData>,
    pub analysis: Option<AnalysisResult>,
    pub dashboard: Option<DashboardView>,
    pub pending_bullets: Vec<BulletKey>,
    pub config_warning: Option<&'static str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionView {
    pub fn build(session: &Session, credentials_configured: bool) -> Self {
        let phase = session.phase();
        let dashboard = match (phase, session.analysis()) {
            (AppPhase::Dashboard, Some(analysis)) => Some(DashboardView::from_analysis(analysis)),
            _ => None,
        };

        Self {
            session_id: session.id,
            phase,
            progress: session.progress_label(),
            notice: session.notice().cloned(),
            job_description: session.job_description().to_string(),
            layout: session.layout(),
            rewrite_enabled: phase == AppPhase::Dashboard && session.layout().allows_rewrite(),
            resume: session.resume().cloned(),
            analysis: session.analysis().cloned(),
            dashboard,
            pending_bullets: session.pending_rewrites().cloned().collect(),
            config_warning: (!credentials_configured).then_some(MISSING_CREDENTIALS_WARNING),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}
