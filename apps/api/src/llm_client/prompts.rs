// Shared prompt fragments used by more than one gateway operation.
// Operation-specific prompt templates live in gateway/prompts.rs.

/// Persona line shared by the parsing and scoring prompts.
pub const ATS_PERSONA: &str = "You are an expert ATS (Applicant Tracking System) analyst and resume coach.";

/// Appended to structured-output prompts. The response schema already constrains the
/// shape; this keeps the model from padding string fields with commentary.
pub const STRICT_JSON_INSTRUCTION: &str = "\
Return strict JSON matching the declared schema. \
Do not wrap the JSON in markdown code fences. \
Do not add fields that are not in the schema.";

/// Appended to free-text prompts whose output is substituted directly into the document.
pub const PLAIN_TEXT_ONLY_INSTRUCTION: &str = "\
Return ONLY the rewritten text, nothing else. \
No quotes, no bullet character, no explanations.";
