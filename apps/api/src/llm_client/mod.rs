/// LLM Client: the single point of entry for all Gemini API calls in JobSuit.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All generative calls MUST go through this module (and are reached via `gateway`).
///
/// One attempt per call. Failures are surfaced to the caller, which decides what the
/// user sees; nothing here retries.
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod prompts;
pub mod schema;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("Prompt blocked by the service: {0}")]
    Blocked(String),

    #[error("No API key configured")]
    MissingApiKey,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
    /// Set on reasoning summaries; those never count as answer text.
    #[serde(default)]
    pub thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub thoughts_token_count: u32,
}

impl LlmResponse {
    /// Concatenates the answer text of the first candidate, skipping thought parts.
    /// Returns `None` when there is no non-blank text.
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Request description
// ────────────────────────────────────────────────────────────────────────────

/// One generation request, independent of the wire format.
#[derive(Debug, Clone)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    /// Inline document as (mime type, raw bytes). Sent before the prompt text.
    pub inline_document: Option<(&'a str, &'a [u8])>,
    /// When set, the response is constrained to JSON matching this schema.
    pub response_schema: Option<&'a Value>,
    pub thinking_budget: Option<u32>,
}

impl<'a> GenerateRequest<'a> {
    pub fn text(model: &'a str, prompt: &'a str) -> Self {
        Self {
            model,
            prompt,
            inline_document: None,
            response_schema: None,
            thinking_budget: None,
        }
    }

    fn to_wire(&self) -> GenerateContentRequest<'a> {
        let mut parts = Vec::with_capacity(2);
        if let Some((mime_type, bytes)) = self.inline_document {
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type,
                    data: BASE64.encode(bytes),
                },
            });
        }
        parts.push(Part::Text { text: self.prompt });

        let generation_config = if self.response_schema.is_some() || self.thinking_budget.is_some()
        {
            Some(GenerationConfig {
                response_mime_type: self.response_schema.map(|_| "application/json"),
                response_schema: self.response_schema,
                thinking_config: self.thinking_budget.map(|thinking_budget| ThinkingConfig {
                    thinking_budget,
                }),
            })
        } else {
            None
        };

        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
            generation_config,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

/// The single LLM client used by the gateway.
/// Wraps the Gemini `generateContent` endpoint with structured-output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/{API_VERSION}/models/{model}:generateContent",
            self.base_url
        )
    }

    /// Makes a raw call to the Gemini API, returning the full response object.
    pub async fn call(&self, request: &GenerateRequest<'_>) -> Result<LlmResponse, LlmError> {
        let api_key = self.api_key.as_deref().ok_or(LlmError::MissingApiKey)?;

        let response = self
            .client
            .post(self.endpoint(request.model))
            .header("x-goog-api-key", api_key)
            .json(&request.to_wire())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = response.json().await?;

        if let Some(reason) = llm_response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(LlmError::Blocked(reason));
        }

        let usage = llm_response.usage_metadata.as_ref();
        debug!(
            "LLM call succeeded: model={}, input_tokens={}, output_tokens={}, thought_tokens={}",
            request.model,
            usage.map_or(0, |u| u.prompt_token_count),
            usage.map_or(0, |u| u.candidates_token_count),
            usage.map_or(0, |u| u.thoughts_token_count),
        );

        Ok(llm_response)
    }

    /// Calls the model and returns the answer text, trimmed.
    pub async fn call_text(&self, request: &GenerateRequest<'_>) -> Result<String, LlmError> {
        let response = self.call(request).await?;
        let text = response.text().ok_or(LlmError::EmptyContent)?;
        Ok(text.trim().to_string())
    }

    /// Calls the model and deserializes the text response as JSON.
    /// The request should carry a response schema so the output is constrained.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        request: &GenerateRequest<'_>,
    ) -> Result<T, LlmError> {
        let text = self.call_text(request).await?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(&text);

        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use axum::{extract::Path, http::HeaderMap, routing::post, Json, Router};
    use serde_json::json;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_wire_request_for_document_with_schema() {
        let schema = json!({"type": "OBJECT"});
        let request = GenerateRequest {
            model: "m",
            prompt: "extract",
            inline_document: Some(("application/pdf", b"%PDF")),
            response_schema: Some(&schema),
            thinking_budget: None,
        };

        let wire = serde_json::to_value(request.to_wire()).unwrap();
        let parts = &wire["contents"][0]["parts"];
        assert_eq!(wire["contents"][0]["role"], "user");
        assert_eq!(parts[0]["inlineData"]["mimeType"], "application/pdf");
        assert_eq!(parts[0]["inlineData"]["data"], "JVBERg==");
        assert_eq!(parts[1]["text"], "extract");
        assert_eq!(
            wire["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(wire["generationConfig"]["responseSchema"]["type"], "OBJECT");
        assert!(wire["generationConfig"].get("thinkingConfig").is_none());
    }

    #[test]
    fn test_wire_request_plain_text_has_no_generation_config() {
        let wire = serde_json::to_value(GenerateRequest::text("m", "hi").to_wire()).unwrap();
        assert!(wire.get("generationConfig").is_none());
        assert_eq!(wire["contents"][0]["parts"][0]["text"], "hi");
    }

    #[test]
    fn test_wire_request_thinking_budget() {
        let mut request = GenerateRequest::text("m", "score");
        request.thinking_budget = Some(1024);
        let wire = serde_json::to_value(request.to_wire()).unwrap();
        assert_eq!(
            wire["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            1024
        );
    }

    #[test]
    fn test_response_text_skips_thoughts_and_blank() {
        let response: LlmResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"parts": [
                {"text": "reasoning...", "thought": true},
                {"text": "{\"a\":"},
                {"text": "1}"}
            ]}}]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{\"a\":1}"));

        let empty: LlmResponse =
            serde_json::from_value(json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]}))
                .unwrap();
        assert!(empty.text().is_none());

        let none: LlmResponse = serde_json::from_value(json!({})).unwrap();
        assert!(none.text().is_none());
    }

    /// Serves a single canned `generateContent` response on an ephemeral local port.
    /// The handler rejects calls that do not carry the expected API key header.
    pub(crate) async fn spawn_stub(status: u16, body: serde_json::Value) -> String {
        let app = Router::new().route(
            "/v1beta/models/:call",
            post(move |Path(_call): Path<String>, headers: HeaderMap, Json(_req): Json<Value>| {
                let body = body.clone();
                async move {
                    let code = if headers.get("x-goog-api-key").is_some() {
                        axum::http::StatusCode::from_u16(status)
                            .unwrap_or(axum::http::StatusCode::OK)
                    } else {
                        axum::http::StatusCode::UNAUTHORIZED
                    };
                    (code, Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn client_for(base_url: &str, key: Option<&str>) -> LlmClient {
        LlmClient::new(key.map(String::from), base_url, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_call_json_against_local_stub() {
        let base = spawn_stub(
            200,
            json!({
                "candidates": [{"content": {"parts": [{"text": "```json\n{\"value\": 7}\n```"}]}}],
                "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 3}
            }),
        )
        .await;

        #[derive(Deserialize)]
        struct Out {
            value: u32,
        }

        let out: Out = client_for(&base, Some("k"))
            .call_json(&GenerateRequest::text("gemini-test", "go"))
            .await
            .unwrap();
        assert_eq!(out.value, 7);
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let base = spawn_stub(
            429,
            json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}),
        )
        .await;

        let err = client_for(&base, Some("k"))
            .call_text(&GenerateRequest::text("gemini-test", "go"))
            .await
            .unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Quota exceeded");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_an_error() {
        let base = spawn_stub(200, json!({"promptFeedback": {"blockReason": "SAFETY"}})).await;
        let err = client_for(&base, Some("k"))
            .call(&GenerateRequest::text("gemini-test", "go"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Blocked(reason) if reason == "SAFETY"));
    }

    #[tokio::test]
    async fn test_missing_key_never_reaches_the_network() {
        let client = client_for("http://127.0.0.1:9", Some("   "));
        assert!(!client.has_api_key());
        let err = client
            .call(&GenerateRequest::text("gemini-test", "go"))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }
}
