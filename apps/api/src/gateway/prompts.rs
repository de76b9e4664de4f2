// Gateway prompt templates.
// Placeholders use `{name}` and are substituted by `fill` before sending.

use crate::llm_client::prompts::{ATS_PERSONA, PLAIN_TEXT_ONLY_INSTRUCTION, STRICT_JSON_INSTRUCTION};

/// Substituted for an empty job description.
pub const GENERAL_BEST_PRACTICE_JD: &str =
    "No specific job description provided. Analyze for general best practices.";

/// Role label used when the bullet's experience entry cannot be found.
pub const DEFAULT_ROLE_CONTEXT: &str = "Professional";

const PARSE_INSTRUCTION: &str = "\
Extract the structured data from this resume document.
Normalize the data into clean JSON.
For 'id' fields, generate a unique string for every experience and education entry.
Ensure 'description' in experience is an array of bullet point strings, one per bullet, in document order.
Leave a field empty rather than guessing when the document does not contain it.";

const ANALYSIS_TEMPLATE: &str = r#"RESUME DATA:
{resume_json}

TARGET JOB DESCRIPTION:
{job_description}

TASK:
Analyze the resume against the job description (if provided) or general ATS standards.
Provide an overall score (0-100) and a per-category breakdown. Every score is 0-100.
Set each category status to "good", "warning" or "critical".

SCORING RUBRIC:
- Parsing Success: Is the data structured well?
- Keyword Match: Do skills match the job description?
- Impact: Do bullets use action verbs and metrics?
- Formatting: Are there potential parsing risks?

Also list missing keywords, formatting issues, top strengths, and tailoring suggestions."#;

const REWRITE_TEMPLATE: &str = r#"Rewrite the following resume bullet point to be more ATS-friendly and impactful.
Use strong action verbs.
Quantify results where possible (use placeholders like [X]% if no real metric is available).
Context: This is for a {role} role.

Original Bullet: "{bullet}""#;

pub fn parse_prompt() -> String {
    format!("{ATS_PERSONA}\n{PARSE_INSTRUCTION}\n{STRICT_JSON_INSTRUCTION}")
}

pub fn analysis_prompt(resume_json: &str, job_description: &str) -> String {
    let job_description = match job_description.trim() {
        "" => GENERAL_BEST_PRACTICE_JD,
        jd => jd,
    };
    let body = fill(
        ANALYSIS_TEMPLATE,
        &[("resume_json", resume_json), ("job_description", job_description)],
    );
    format!("{ATS_PERSONA}\n\n{body}\n\n{STRICT_JSON_INSTRUCTION}")
}

pub fn rewrite_prompt(bullet: &str, role_context: &str) -> String {
    let role = match role_context.trim() {
        "" => DEFAULT_ROLE_CONTEXT,
        role => role,
    };
    let body = fill(REWRITE_TEMPLATE, &[("role", role), ("bullet", bullet)]);
    format!("{body}\n\n{PLAIN_TEXT_ONLY_INSTRUCTION}")
}

/// Substitutes `{name}` placeholders in a single pass over the template. Inserted
/// values are never rescanned, so braces in resume or bullet text stay verbatim.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = values.iter().find_map(|(name, value)| {
            tail[1..]
                .strip_prefix(*name)
                .and_then(|after| after.strip_prefix('}'))
                .map(|after| (*value, after))
        });
        match hit {
            Some((value, after)) => {
                out.push_str(value);
                rest = after;
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_jd_falls_back_to_best_practice() {
        let prompt = analysis_prompt("{}", "   ");
        assert!(prompt.contains(GENERAL_BEST_PRACTICE_JD));
        assert!(!prompt.contains("{job_description}"));
    }

    #[test]
    fn test_analysis_prompt_embeds_resume_and_jd() {
        let prompt = analysis_prompt(r#"{"fullName":"Jane"}"#, "Senior Rust Engineer");
        assert!(prompt.contains(r#"{"fullName":"Jane"}"#));
        assert!(prompt.contains("Senior Rust Engineer"));
        assert!(!prompt.contains(GENERAL_BEST_PRACTICE_JD));
        for dimension in ["Parsing Success", "Keyword Match", "Impact", "Formatting"] {
            assert!(prompt.contains(dimension), "missing rubric item {dimension}");
        }
    }

    #[test]
    fn test_rewrite_prompt_uses_role_and_placeholder_hint() {
        let prompt = rewrite_prompt("Worked on APIs", "Backend Engineer");
        assert!(prompt.contains("Backend Engineer role"));
        assert!(prompt.contains(r#"Original Bullet: "Worked on APIs""#));
        assert!(prompt.contains("[X]%"));
    }

    #[test]
    fn test_placeholder_text_inside_resume_is_kept_verbatim() {
        let prompt = analysis_prompt(r#"{"summary":"see {job_description}"}"#, "Rust JD");
        assert!(prompt.contains(r#"{"summary":"see {job_description}"}"#));
        assert_eq!(prompt.matches("Rust JD").count(), 1);
    }

    #[test]
    fn test_placeholder_text_inside_role_is_kept_verbatim() {
        let prompt = rewrite_prompt("Shipped the API", "Lead {bullet} Engineer");
        assert!(prompt.contains("Lead {bullet} Engineer role"));
        assert_eq!(prompt.matches("Shipped the API").count(), 1);
    }

    #[test]
    fn test_fill_leaves_unknown_braces_alone() {
        assert_eq!(
            fill("{a} {b} {", &[("a", "x{b}")]),
            "x{b} {b} {"
        );
    }

    #[test]
    fn test_rewrite_prompt_blank_role_defaults() {
        assert!(rewrite_prompt("x", " ").contains("Professional role"));
    }
}
