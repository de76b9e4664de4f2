//! Declared output schemas for structured generation.
//!
//! These mirror `models::ResumeData` and `models::AnalysisResult` field for field.
//! The service only constrains what is declared here, so a field added to the models
//! must be added here too.

use serde_json::{json, Value};

use crate::models::CategoryStatus;

fn string() -> Value {
    json!({ "type": "STRING" })
}

fn number() -> Value {
    json!({ "type": "NUMBER" })
}

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": string() })
}

/// Schema for `ResumeData`.
pub fn resume_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "fullName": string(),
            "contactInfo": {
                "type": "OBJECT",
                "properties": {
                    "email": string(),
                    "phone": string(),
                    "linkedin": string(),
                    "location": string(),
                },
            },
            "summary": string(),
            "skills": string_array(),
            "experience": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": string(),
                        "company": string(),
                        "role": string(),
                        "dates": string(),
                        "location": string(),
                        "description": string_array(),
                    },
                },
            },
            "education": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": string(),
                        "school": string(),
                        "degree": string(),
                        "dates": string(),
                    },
                },
            },
        },
    })
}

/// Schema for `AnalysisResult`. `status` is declared as an enum so the service can only
/// produce the three values `CategoryStatus` accepts.
pub fn analysis_schema() -> Value {
    let statuses: Vec<&str> = CategoryStatus::ALL.iter().map(|s| s.as_str()).collect();
    json!({
        "type": "OBJECT",
        "properties": {
            "overallScore": number(),
            "categories": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": string(),
                        "score": number(),
                        "feedback": string(),
                        "status": { "type": "STRING", "enum": statuses },
                    },
                    "required": ["name", "score", "status"],
                },
            },
            "keywordGaps": string_array(),
            "formattingIssues": string_array(),
            "topStrengths": string_array(),
            "tailoringSuggestions": string_array(),
        },
        "required": ["overallScore", "categories"],
    })
}
