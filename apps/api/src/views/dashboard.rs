//! Dashboard projection of an `AnalysisResult`: gauge band, category rows and the
//! ordered "priority fixes" list.

use serde::Serialize;

use crate::models::{AnalysisResult, CategoryStatus};

/// Colour band of the overall score gauge. Presentation only; category statuses come
/// from the service and are never derived from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn from_score(score: f64) -> Self {
        if score > 80.0 {
            ScoreBand::High
        } else if score > 50.0 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub score: u8,
    pub status: CategoryStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryFix {
    pub name: String,
    pub feedback: String,
    pub status: CategoryStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PriorityFixes {
    pub missing_keywords: Vec<String>,
    /// Every category not reported as `good`, in service order.
    pub categories: Vec<CategoryFix>,
    pub formatting_issues: Vec<String>,
}

impl PriorityFixes {
    pub fn is_empty(&self) -> bool {
        self.missing_keywords.is_empty()
            && self.categories.is_empty()
            && self.formatting_issues.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub score: u8,
    pub band: ScoreBand,
    pub categories: Vec<CategoryRow>,
    pub priority_fixes: PriorityFixes,
    /// True when there is nothing to fix.
    pub all_clear: bool,
    pub top_strengths: Vec<String>,
    pub tailoring_suggestions: Vec<String>,
}

/// Scores are normalized to [0, 100] by the gateway; rounding is for display.
fn display_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}

impl DashboardView {
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        let categories = analysis
            .categories
            .iter()
            .map(|c| CategoryRow {
                name: c.name.clone(),
                score: display_score(c.score),
                status: c.status,
            })
            .collect();

        let priority_fixes = PriorityFixes {
            missing_keywords: analysis.keyword_gaps.clone(),
            categories: analysis
                .categories
                .iter()
                .filter(|c| c.status != CategoryStatus::Good)
                .map(|c| CategoryFix {
                    name: c.name.clone(),
                    feedback: c.feedback.clone(),
                    status: c.status,
                })
                .collect(),
            formatting_issues: analysis.formatting_issues.clone(),
        };

        Self {
            score: display_score(analysis.overall_score),
            band: ScoreBand::from_score(analysis.overall_score),
            categories,
            all_clear: priority_fixes.is_empty(),
            priority_fixes,
            top_strengths: analysis.top_strengths.clone(),
            tailoring_suggestions: analysis.tailoring_suggestions.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::session::state::tests::sample_analysis;

    #[test]
    fn test_band_thresholds() {
        assert_eq!(ScoreBand::from_score(81.0), ScoreBand::High);
        assert_eq!(ScoreBand::from_score(80.0), ScoreBand::Medium);
        assert_eq!(ScoreBand::from_score(51.0), ScoreBand::Medium);
        assert_eq!(ScoreBand::from_score(50.0), ScoreBand::Low);
        assert_eq!(ScoreBand::from_score(0.0), ScoreBand::Low);
    }

    #[test]
    fn test_priority_fixes_skip_good_categories() {
        let view = DashboardView::from_analysis(&sample_analysis(72.4));
        assert_eq!(view.score, 72);
        assert_eq!(view.band, ScoreBand::Medium);
        assert_eq!(view.categories.len(), 2);
        assert_eq!(view.priority_fixes.categories.len(), 1);
        assert_eq!(view.priority_fixes.categories[0].name, "Keyword Match");
        assert_eq!(view.priority_fixes.missing_keywords, vec!["Kubernetes"]);
        assert!(!view.all_clear);
    }

    #[test]
    fn test_band_ignores_category_status() {
        let mut analysis = sample_analysis(95.0);
        for c in &mut analysis.categories {
            c.status = CategoryStatus::Critical;
        }
        let view = DashboardView::from_analysis(&analysis);
        assert_eq!(view.band, ScoreBand::High);
        assert_eq!(view.priority_fixes.categories.len(), 2);
    }
}
