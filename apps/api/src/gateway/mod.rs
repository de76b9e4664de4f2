//! AI Gateway: the sole boundary between the session controller and the generative service.
//!
//! Three operations: parse a document into `ResumeData`, score a resume against a job
//! description, and rewrite a single bullet. `SessionController` holds an
//! `Arc<dyn AiGateway>`, so tests swap in a double without touching the controller.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AnalysisResult, ResumeData, UploadedDocument};

pub mod gemini;
pub mod normalize;
pub mod prompts;

pub use gemini::{GatewayModels, GeminiGateway};

/// Failure taxonomy for gateway calls. Every variant is all-or-nothing: no partial
/// result accompanies it.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Resume parsing failed: {0}")]
    Parse(String),

    #[error("Resume analysis failed: {0}")]
    Analysis(String),

    #[error("Bullet rewrite failed: {0}")]
    Rewrite(String),
}

#[async_trait]
pub trait AiGateway: Send + Sync {
    /// Whether service credentials are present. Callers check this before issuing any
    /// call so a missing key surfaces as a configuration warning.
    fn is_configured(&self) -> bool;

    /// Extracts a normalized resume from raw document bytes. The document kind has
    /// already been validated by the caller.
    async fn parse_document(&self, document: &UploadedDocument) -> Result<ResumeData, GatewayError>;

    /// Scores `resume` against `job_description`. An empty description means general
    /// best-practice evaluation.
    async fn analyze_match(
        &self,
        resume: &ResumeData,
        job_description: &str,
    ) -> Result<AnalysisResult, GatewayError>;

    /// Best-effort rewrite of one bullet. Returns `bullet` unchanged when the service
    /// produces no text; only outright call failures are errors.
    async fn rewrite_bullet(&self, bullet: &str, role_context: &str)
        -> Result<String, GatewayError>;
}
