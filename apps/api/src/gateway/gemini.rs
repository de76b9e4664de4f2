//! `AiGateway` backed by the Gemini `generateContent` API.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::gateway::normalize::{normalize_analysis, normalize_resume};
use crate::gateway::prompts::{analysis_prompt, parse_prompt, rewrite_prompt};
use crate::gateway::{AiGateway, GatewayError};
use crate::llm_client::schema::{analysis_schema, resume_schema};
use crate::llm_client::{GenerateRequest, LlmClient, LlmError};
use crate::models::{AnalysisResult, ResumeData, UploadedDocument};

/// Model identifiers per operation.
#[derive(Debug, Clone)]
pub struct GatewayModels {
    pub parse: String,
    pub analysis: String,
    pub rewrite: String,
}

pub struct GeminiGateway {
    llm: LlmClient,
    models: GatewayModels,
    /// Reasoning allowance granted to the scoring call before it commits to scores.
    thinking_budget: u32,
    resume_schema: serde_json::Value,
    analysis_schema: serde_json::Value,
}

impl GeminiGateway {
    pub fn new(llm: LlmClient, models: GatewayModels, thinking_budget: u32) -> Self {
        Self {
            llm,
            models,
            thinking_budget,
            resume_schema: resume_schema(),
            analysis_schema: analysis_schema(),
        }
    }
}

#[async_trait]
impl AiGateway for GeminiGateway {
    fn is_configured(&self) -> bool {
        self.llm.has_api_key()
    }

    async fn parse_document(&self, document: &UploadedDocument) -> Result<ResumeData, GatewayError> {
        let prompt = parse_prompt();
        let request = GenerateRequest {
            model: &self.models.parse,
            prompt: &prompt,
            inline_document: Some((document.kind.mime_type(), &document.bytes[..])),
            response_schema: Some(&self.resume_schema),
            thinking_budget: None,
        };

        let parsed: ResumeData = self
            .llm
            .call_json(&request)
            .await
            .map_err(|e| GatewayError::Parse(e.to_string()))?;

        let resume = normalize_resume(parsed).map_err(GatewayError::Parse)?;
        info!(
            "Parsed resume: {} experience entries, {} education entries",
            resume.experience.len(),
            resume.education.len()
        );
        Ok(resume)
    }

    async fn analyze_match(
        &self,
        resume: &ResumeData,
        job_description: &str,
    ) -> Result<AnalysisResult, GatewayError> {
        let resume_json =
            serde_json::to_string(resume).map_err(|e| GatewayError::Analysis(e.to_string()))?;
        let prompt = analysis_prompt(&resume_json, job_description);
        let request = GenerateRequest {
            model: &self.models.analysis,
            prompt: &prompt,
            inline_document: None,
            response_schema: Some(&self.analysis_schema),
            thinking_budget: Some(self.thinking_budget),
        };

        let analysis: AnalysisResult = self
            .llm
            .call_json(&request)
            .await
            .map_err(|e| GatewayError::Analysis(e.to_string()))?;

        let analysis = normalize_analysis(analysis).map_err(GatewayError::Analysis)?;
        info!(
            "Analysis complete: score={} categories={} targeted={}",
            analysis.overall_score,
            analysis.categories.len(),
            !job_description.trim().is_empty()
        );
        Ok(analysis)
    }

    async fn rewrite_bullet(
        &self,
        bullet: &str,
        role_context: &str,
    ) -> Result<String, GatewayError> {
        let prompt = rewrite_prompt(bullet, role_context);
        let request = GenerateRequest::text(&self.models.rewrite, &prompt);

        match self.llm.call_text(&request).await {
            Ok(text) => Ok(text),
            Err(LlmError::EmptyContent) => {
                warn!("Rewrite returned no text; keeping the original bullet");
                Ok(bullet.to_string())
            }
            Err(e) => Err(GatewayError::Rewrite(e.to_string())),
        }
    }
}
