//! The per-session state machine.
//!
//! Phases: `Upload → Analyzing → Dashboard`, with `Dashboard → Upload` on reset.
//! `Analyzing` is transient and always resolves to `Dashboard` or back to `Upload`.
//! Every method here is synchronous; the controller calls them under the session lock
//! and never holds that lock across a gateway call.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::gateway::prompts::DEFAULT_ROLE_CONTEXT;
use crate::models::{AnalysisResult, ResumeData};
use crate::views::preview::PreviewLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppPhase {
    Upload,
    Analyzing,
    Dashboard,
}

impl AppPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppPhase::Upload => "upload",
            AppPhase::Analyzing => "analyzing",
            AppPhase::Dashboard => "dashboard",
        }
    }
}

impl fmt::Display for AppPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-step of `Analyzing`, surfaced only as a progress label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyzingStep {
    Parsing,
    Scoring,
}

impl AnalyzingStep {
    pub fn label(&self) -> &'static str {
        match self {
            AnalyzingStep::Parsing => "Parsing resume structure...",
            AnalyzingStep::Scoring => "Analyzing against ATS algorithms...",
        }
    }
}

/// What started the current `Analyzing` phase. Decides where a failure lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnalysisOrigin {
    Upload,
    Reanalysis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    ParseFailed,
    AnalysisFailed,
    RewriteFailed,
}

impl NoticeKind {
    pub fn message(&self) -> &'static str {
        match self {
            NoticeKind::ParseFailed => "Failed to parse resume. Please try a different file.",
            NoticeKind::AnalysisFailed => "Analysis failed.",
            NoticeKind::RewriteFailed => "Rewrite failed; the original bullet was kept.",
        }
    }
}

/// User-visible failure notice. Cleared by the next phase-changing action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: &'static str,
}

impl From<NoticeKind> for Notice {
    fn from(kind: NoticeKind) -> Self {
        Self {
            kind,
            message: kind.message(),
        }
    }
}

/// Addresses one bullet: `experience[experience_id].description[index]`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BulletKey {
    pub experience_id: String,
    pub index: usize,
}

/// Everything the controller needs to run a rewrite outside the lock, and to apply
/// the result afterwards.
#[derive(Debug, Clone)]
pub struct RewriteTicket {
    pub key: BulletKey,
    pub text: String,
    pub role: String,
    epoch: u64,
}

#[derive(Debug, Clone)]
pub struct ReanalysisTicket {
    pub resume: ResumeData,
    pub job_description: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("An analysis is already in progress")]
    Busy,

    #[error("This action is not available in the {0} phase")]
    WrongPhase(AppPhase),

    #[error("No resume has been loaded")]
    NoResume,

    #[error("A rewrite is already pending for bullet {index} of experience '{experience_id}'")]
    RewritePending { experience_id: String, index: usize },

    #[error("{0} bullet rewrite(s) still pending; wait for them before re-analyzing")]
    RewritesInFlight(usize),

    #[error("Bullet rewriting is not available in the one-page layout")]
    RewriteUnavailable,

    #[error("No bullet {index} in experience '{experience_id}'")]
    BulletNotFound { experience_id: String, index: usize },
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    phase: AppPhase,
    step: Option<AnalyzingStep>,
    origin: Option<AnalysisOrigin>,
    resume: Option<ResumeData>,
    analysis: Option<AnalysisResult>,
    job_description: String,
    notice: Option<Notice>,
    pending_rewrites: BTreeSet<BulletKey>,
    layout: PreviewLayout,
    /// Bumped whenever the resume is replaced or cleared. Rewrite results carrying an
    /// older epoch target a resume that no longer exists and are dropped.
    epoch: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            phase: AppPhase::Upload,
            step: None,
            origin: None,
            resume: None,
            analysis: None,
            job_description: String::new(),
            notice: None,
            pending_rewrites: BTreeSet::new(),
            layout: PreviewLayout::default(),
            epoch: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn phase(&self) -> AppPhase {
        self.phase
    }

    pub fn progress_label(&self) -> Option<&'static str> {
        self.step.map(|s| s.label())
    }

    pub fn resume(&self) -> Option<&ResumeData> {
        self.resume.as_ref()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn pending_rewrites(&self) -> impl Iterator<Item = &BulletKey> {
        self.pending_rewrites.iter()
    }

    pub fn is_pending(&self, key: &BulletKey) -> bool {
        self.pending_rewrites.contains(key)
    }

    pub fn layout(&self) -> PreviewLayout {
        self.layout
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn ensure_idle(&self) -> Result<(), SessionError> {
        if self.phase == AppPhase::Analyzing {
            return Err(SessionError::Busy);
        }
        Ok(())
    }

    fn drop_document(&mut self) {
        self.resume = None;
        self.analysis = None;
        self.pending_rewrites.clear();
        self.epoch += 1;
    }

    // ────────────────────────────────────────────────────────────────────────
    // Phase transitions
    // ────────────────────────────────────────────────────────────────────────

    /// `Upload --(file selected)--> Analyzing`. Returns the job description the
    /// chained analysis should use.
    pub fn begin_upload(&mut self, job_description: Option<String>) -> Result<String, SessionError> {
        self.ensure_idle()?;
        if self.phase != AppPhase::Upload {
            return Err(SessionError::WrongPhase(self.phase));
        }
        if let Some(jd) = job_description {
            self.job_description = jd;
        }
        self.phase = AppPhase::Analyzing;
        self.step = Some(AnalyzingStep::Parsing);
        self.origin = Some(AnalysisOrigin::Upload);
        self.notice = None;
        self.touch();
        Ok(self.job_description.clone())
    }

    /// Parsing finished; the chain moves straight on to scoring.
    pub fn parse_succeeded(&mut self) {
        if self.phase == AppPhase::Analyzing {
            self.step = Some(AnalyzingStep::Scoring);
            self.touch();
        }
    }

    /// `Dashboard --(job description submitted)--> Analyzing`. Re-scores the existing
    /// resume; parsing is not repeated.
    pub fn begin_reanalysis(
        &mut self,
        job_description: Option<String>,
    ) -> Result<ReanalysisTicket, SessionError> {
        self.ensure_idle()?;
        if self.phase != AppPhase::Dashboard {
            return Err(SessionError::WrongPhase(self.phase));
        }
        if !self.pending_rewrites.is_empty() {
            return Err(SessionError::RewritesInFlight(self.pending_rewrites.len()));
        }
        let resume = self.resume.clone().ok_or(SessionError::NoResume)?;
        if let Some(jd) = job_description {
            self.job_description = jd;
        }
        self.phase = AppPhase::Analyzing;
        self.step = Some(AnalyzingStep::Scoring);
        self.origin = Some(AnalysisOrigin::Reanalysis);
        self.notice = None;
        self.touch();
        Ok(ReanalysisTicket {
            resume,
            job_description: self.job_description.clone(),
        })
    }

    /// `Analyzing --(success)--> Dashboard`. `parsed` is `Some` for the upload chain,
    /// replacing the resume wholesale; re-analysis passes `None` and keeps it.
    pub fn complete_analysis(&mut self, parsed: Option<ResumeData>, analysis: AnalysisResult) {
        if let Some(resume) = parsed {
            self.resume = Some(resume);
            self.pending_rewrites.clear();
            self.epoch += 1;
        }
        self.analysis = Some(analysis);
        self.phase = AppPhase::Dashboard;
        self.step = None;
        self.origin = None;
        self.touch();
    }

    /// `Analyzing --(failure)--> Upload`, discarding the document.
    ///
    /// With `retain_last_good`, a failed re-analysis instead returns to `Dashboard`
    /// with the previous analysis intact. The job description text is kept either way.
    pub fn fail_analysis(&mut self, kind: NoticeKind, retain_last_good: bool) {
        let retain = retain_last_good
            && self.origin == Some(AnalysisOrigin::Reanalysis)
            && self.resume.is_some()
            && self.analysis.is_some();

        if retain {
            self.phase = AppPhase::Dashboard;
        } else {
            self.drop_document();
            self.phase = AppPhase::Upload;
        }
        self.step = None;
        self.origin = None;
        self.notice = Some(kind.into());
        self.touch();
    }

    /// `Dashboard --(reset)--> Upload`. Clears resume, analysis and job description.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.drop_document();
        self.job_description.clear();
        self.notice = None;
        self.layout = PreviewLayout::default();
        self.phase = AppPhase::Upload;
        self.touch();
        Ok(())
    }

    pub fn set_job_description(&mut self, text: String) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.job_description = text;
        self.touch();
        Ok(())
    }

    pub fn set_layout(&mut self, layout: PreviewLayout) {
        self.layout = layout;
        self.touch();
    }

    // ────────────────────────────────────────────────────────────────────────
    // Bullet rewrite (does not change phase)
    // ────────────────────────────────────────────────────────────────────────

    /// Marks one bullet pending and returns the inputs for the rewrite call.
    ///
    /// `text` overrides the stored bullet; when the experience id is unknown the call
    /// still runs (with the default role) as long as `text` is supplied.
    pub fn begin_rewrite(
        &mut self,
        experience_id: &str,
        index: usize,
        text: Option<String>,
    ) -> Result<RewriteTicket, SessionError> {
        if self.phase != AppPhase::Dashboard {
            return Err(SessionError::WrongPhase(self.phase));
        }
        if !self.layout.allows_rewrite() {
            return Err(SessionError::RewriteUnavailable);
        }
        let resume = self.resume.as_ref().ok_or(SessionError::NoResume)?;

        let key = BulletKey {
            experience_id: experience_id.to_string(),
            index,
        };
        if self.is_pending(&key) {
            return Err(SessionError::RewritePending {
                experience_id: key.experience_id,
                index,
            });
        }

        let text = text
            .or_else(|| resume.bullet(experience_id, index).map(String::from))
            .ok_or_else(|| SessionError::BulletNotFound {
                experience_id: experience_id.to_string(),
                index,
            })?;
        let role = resume
            .find_experience(experience_id)
            .map(|e| e.role.trim())
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_ROLE_CONTEXT)
            .to_string();

        self.pending_rewrites.insert(key.clone());
        self.touch();
        Ok(RewriteTicket {
            key,
            text,
            role,
            epoch: self.epoch,
        })
    }

    /// Writes a rewrite result into exactly one bullet slot. Returns whether the slot
    /// was updated; results for a replaced resume or a vanished slot are dropped.
    pub fn apply_rewrite(&mut self, ticket: &RewriteTicket, text: String) -> bool {
        if ticket.epoch != self.epoch {
            return false;
        }
        self.pending_rewrites.remove(&ticket.key);
        self.touch();
        match self
            .resume
            .as_mut()
            .and_then(|r| r.bullet_mut(&ticket.key.experience_id, ticket.key.index))
        {
            Some(slot) => {
                *slot = text;
                if self.notice.as_ref().map(|n| n.kind) == Some(NoticeKind::RewriteFailed) {
                    self.notice = None;
                }
                true
            }
            None => false,
        }
    }

    /// Clears the pending marker after a failed rewrite. The bullet keeps its text.
    pub fn abandon_rewrite(&mut self, ticket: &RewriteTicket) {
        if ticket.epoch != self.epoch {
            return;
        }
        self.pending_rewrites.remove(&ticket.key);
        self.notice = Some(NoticeKind::RewriteFailed.into());
        self.touch();
    }
}
