use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Full analysis result. Scores default to 0 and every list defaults to empty,
/// so views never have to deal with absent fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: Option<String>,
    pub cv_id: Option<String>,
    pub job_id: Option<String>,
    pub suitability_score: u32, // 0 – 100
    pub technical_score: u32,
    pub experience_score: u32,
    pub education_score: u32,
    pub scoring_rationale: String,
    /// Deduplicated, first occurrence order kept.
    pub matching_skills: Vec<String>,
    /// Deduplicated, first occurrence order kept.
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<String>,
    pub red_flags: Vec<String>,
    pub detailed_analysis: Option<Value>,
    pub analysis_date: Option<DateTime<Utc>>,
}

/// One row of the "recent analyses" history list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisListItem {
    pub id: Option<String>,
    pub cv_name: String,
    pub job_title: String,
    pub company: Option<String>,
    pub score: u32,
    /// Falls back to the normalization time when the backend sent no date.
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    pub excellent: usize, // ≥ 80
    pub good: usize,      // 60 – 79
    pub fair: usize,      // 40 – 59
    pub poor: usize,      // < 40
}

/// Aggregate figures over the loaded analysis history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisStatistics {
    pub total: usize,
    /// Rounded to two decimals; 0 for an empty history.
    pub average_score: f64,
    pub distribution: ScoreDistribution,
}

impl AnalysisStatistics {
    pub fn from_items(items: &[AnalysisListItem]) -> Self {
        if items.is_empty() {
            return Self::default();
        }

        let mut distribution = ScoreDistribution::default();
        for item in items {
            match item.score {
                80.. => distribution.excellent += 1,
                60..=79 => distribution.good += 1,
                40..=59 => distribution.fair += 1,
                _ => distribution.poor += 1,
            }
        }

        let sum: u32 = items.iter().map(|i| i.score).sum();
        let average = f64::from(sum) / items.len() as f64;

        Self {
            total: items.len(),
            average_score: (average * 100.0).round() / 100.0,
            distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(score: u32) -> AnalysisListItem {
        AnalysisListItem {
            id: None,
            cv_name: "cv.pdf".to_string(),
            job_title: "Engineer".to_string(),
            company: None,
            score,
            date: Utc::now(),
        }
    }

    #[test]
    fn test_statistics_distribution_boundaries() {
        let items: Vec<_> = [80, 79, 60, 59, 40, 39, 0].into_iter().map(item).collect();
        let stats = AnalysisStatistics::from_items(&items);
        assert_eq!(stats.total, 7);
        assert_eq!(
            stats.distribution,
            ScoreDistribution {
                excellent: 1,
                good: 2,
                fair: 2,
                poor: 2,
            }
        );
    }

    #[test]
    fn test_statistics_average_rounded() {
        let items: Vec<_> = [70, 71, 71].into_iter().map(item).collect();
        let stats = AnalysisStatistics::from_items(&items);
        assert!((stats.average_score - 70.67).abs() < 1e-9);
    }

    #[test]
    fn test_statistics_empty() {
        assert_eq!(AnalysisStatistics::from_items(&[]), AnalysisStatistics::default());
    }
}
