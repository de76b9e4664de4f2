//! Shapes service output into the invariants the rest of the crate relies on.
//!
//! Resume: non-empty name, pairwise-unique entry ids, trimmed non-blank bullets.
//! Analysis: finite scores within [0, 100], at least one category.

use std::collections::HashSet;

use tracing::warn;
use uuid::Uuid;

use crate::models::resume::RAW_TEXT_MARKER;
use crate::models::{AnalysisResult, ResumeData};

const MIN_SCORE: f64 = 0.0;
const MAX_SCORE: f64 = 100.0;

/// Validates a parsed resume and repairs entry ids. Returns the reason on rejection.
pub fn normalize_resume(mut resume: ResumeData) -> Result<ResumeData, String> {
    resume.full_name = resume.full_name.trim().to_string();
    if resume.full_name.is_empty() {
        return Err("document yielded no candidate name".to_string());
    }

    // Experience and education ids share one namespace so an id never addresses two entries.
    let mut seen = HashSet::new();
    for exp in &mut resume.experience {
        exp.id = unique_id(&exp.id, "exp", &mut seen);
        exp.description = exp
            .description
            .iter()
            .map(|b| b.trim())
            .filter(|b| !b.is_empty())
            .map(String::from)
            .collect();
    }
    for edu in &mut resume.education {
        edu.id = unique_id(&edu.id, "edu", &mut seen);
    }

    resume.skills = resume
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();
    resume.raw_text = Some(RAW_TEXT_MARKER.to_string());
    Ok(resume)
}

fn unique_id(candidate: &str, prefix: &str, seen: &mut HashSet<String>) -> String {
    let candidate = candidate.trim();
    if !candidate.is_empty() && seen.insert(candidate.to_string()) {
        return candidate.to_string();
    }
    loop {
        let fresh = format!("{prefix}-{}", Uuid::new_v4().simple());
        if seen.insert(fresh.clone()) {
            return fresh;
        }
    }
}

/// Validates an analysis payload. Finite out-of-range scores are clamped; non-finite
/// scores and an empty category list reject the payload.
pub fn normalize_analysis(mut analysis: AnalysisResult) -> Result<AnalysisResult, String> {
    if analysis.categories.is_empty() {
        return Err("analysis contained no score categories".to_string());
    }

    analysis.overall_score = clamp_score("overallScore", analysis.overall_score)?;
    for category in &mut analysis.categories {
        category.score = clamp_score(&category.name, category.score)?;
    }
    Ok(analysis)
}

fn clamp_score(label: &str, score: f64) -> Result<f64, String> {
    if !score.is_finite() {
        return Err(format!("score for '{label}' is not a number"));
    }
    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        warn!("Clamping out-of-range score for '{label}': {score}");
    }
    Ok(score.clamp(MIN_SCORE, MAX_SCORE))
}
