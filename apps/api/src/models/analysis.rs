use serde::{Deserialize, Serialize};

/// Status reported by the scoring service for one category.
///
/// Supplied independently of the numeric score; nothing in this crate derives one
/// from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryStatus {
    Good,
    Warning,
    Critical,
}

impl CategoryStatus {
    pub const ALL: [CategoryStatus; 3] = [
        CategoryStatus::Good,
        CategoryStatus::Warning,
        CategoryStatus::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryStatus::Good => "good",
            CategoryStatus::Warning => "warning",
            CategoryStatus::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCategory {
    pub name: String,
    /// 0 – 100
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
    pub status: CategoryStatus,
}

/// Scoring output for one (resume, job description) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 0 – 100
    pub overall_score: f64,
    #[serde(default)]
    pub categories: Vec<ScoreCategory>,
    #[serde(default)]
    pub keyword_gaps: Vec<String>,
    #[serde(default)]
    pub formatting_issues: Vec<String>,
    #[serde(default)]
    pub top_strengths: Vec<String>,
    #[serde(default)]
    pub tailoring_suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_lowercase() {
        let status: CategoryStatus = serde_json::from_str(r#""critical""#).unwrap();
        assert_eq!(status, CategoryStatus::Critical);
        assert_eq!(
            serde_json::to_string(&CategoryStatus::Warning).unwrap(),
            r#""warning""#
        );
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!(serde_json::from_str::<CategoryStatus>(r#""great""#).is_err());
    }

    #[test]
    fn test_analysis_deserializes_full_payload() {
        let json = r#"{
            "overallScore": 72,
            "categories": [
                {"name": "Keyword Match", "score": 55.5, "feedback": "Add Kubernetes", "status": "warning"}
            ],
            "keywordGaps": ["Kubernetes"],
            "formattingIssues": [],
            "topStrengths": ["Quantified impact"],
            "tailoringSuggestions": ["Mention on-call"]
        }"#;

        let analysis: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!((analysis.overall_score - 72.0).abs() < f64::EPSILON);
        assert_eq!(analysis.categories[0].status, CategoryStatus::Warning);
        assert_eq!(analysis.keyword_gaps, vec!["Kubernetes".to_string()]);
    }
}
