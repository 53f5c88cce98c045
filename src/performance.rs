//! Employee performance evaluation: KPI average blended with feedback
//! sentiment using role-specific weights.

use serde::{Deserialize, Serialize};

use crate::sentiment::Sentiment;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KpiScores {
    pub kpi_score: f32,
    pub quality_score: f32,
    pub efficiency_score: f32,
    pub teamwork_score: f32,
    pub innovation_score: f32,
    pub project_progress: f32,
}

impl KpiScores {
    fn values(&self) -> [f32; 6] {
        [
            self.kpi_score,
            self.quality_score,
            self.efficiency_score,
            self.teamwork_score,
            self.innovation_score,
            self.project_progress,
        ]
    }

    /// Mean of the strictly positive scores; 0 when none are set.
    pub fn average(&self) -> f32 {
        let valid: Vec<f32> = self.values().into_iter().filter(|v| *v > 0.0).collect();
        if valid.is_empty() {
            0.0
        } else {
            valid.iter().sum::<f32>() / valid.len() as f32
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoleWeights {
    pub quantitative: f32,
    pub qualitative: f32,
}

/// Unknown roles fall back to an even split.
pub fn role_weights(role: &str) -> RoleWeights {
    let (quantitative, qualitative) = match role {
        "developer" => (0.6, 0.4),
        "marketing_specialist" => (0.5, 0.5),
        "direct_mentor" => (0.4, 0.6),
        "indirect_mentor" => (0.45, 0.55),
        "hr_recruiter" => (0.7, 0.3),
        "business_development" => (0.5, 0.5),
        _ => (0.5, 0.5),
    };
    RoleWeights {
        quantitative,
        qualitative,
    }
}

/// Feedback verdict on a 0..100 scale: positive 85..100, neutral 65..85,
/// negative 40..65.
pub fn sentiment_points(sentiment: Sentiment, confidence: f32) -> f32 {
    match sentiment {
        Sentiment::Positive => 85.0 + confidence * 15.0,
        Sentiment::Neutral => 65.0 + confidence * 20.0,
        Sentiment::Negative => 40.0 + confidence * 25.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Average,
    BelowAverage,
    Poor,
}

impl PerformanceLevel {
    pub fn from_score(score: f32) -> Self {
        if score >= 90.0 {
            PerformanceLevel::Excellent
        } else if score >= 80.0 {
            PerformanceLevel::Good
        } else if score >= 70.0 {
            PerformanceLevel::Average
        } else if score >= 60.0 {
            PerformanceLevel::BelowAverage
        } else {
            PerformanceLevel::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentDistribution {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl SentimentDistribution {
    pub fn record(&mut self, sentiment: Sentiment) {
        match sentiment {
            Sentiment::Positive => self.positive += 1,
            Sentiment::Neutral => self.neutral += 1,
            Sentiment::Negative => self.negative += 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitativeAssessment {
    #[serde(flatten)]
    pub scores: KpiScores,
    pub average_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualitativeAssessment {
    pub feedback_count: usize,
    pub sentiment_distribution: SentimentDistribution,
    pub key_points: Vec<String>,
    pub average_score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedAssessment {
    pub quantitative_weight: f32,
    pub qualitative_weight: f32,
    pub combined_score: f32,
    pub performance_level: PerformanceLevel,
}

pub fn combine(quantitative: f32, qualitative: f32, role: &str) -> CombinedAssessment {
    let w = role_weights(role);
    let combined_score = quantitative * w.quantitative + qualitative * w.qualitative;
    CombinedAssessment {
        quantitative_weight: w.quantitative,
        qualitative_weight: w.qualitative,
        combined_score,
        performance_level: PerformanceLevel::from_score(combined_score),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kpi_average_ignores_unset_scores() {
        let k = KpiScores {
            kpi_score: 90.0,
            quality_score: 80.0,
            ..Default::default()
        };
        assert_eq!(k.average(), 85.0);
        assert_eq!(KpiScores::default().average(), 0.0);
    }

    #[test]
    fn unknown_role_is_even_split() {
        assert_eq!(role_weights("intern"), role_weights("marketing_specialist"));
        assert_eq!(role_weights("hr_recruiter").quantitative, 0.7);
    }

    #[test]
    fn sentiment_points_ranges() {
        assert_eq!(sentiment_points(Sentiment::Positive, 1.0), 100.0);
        assert_eq!(sentiment_points(Sentiment::Neutral, 0.0), 65.0);
        assert_eq!(sentiment_points(Sentiment::Negative, 1.0), 65.0);
    }

    #[test]
    fn level_thresholds() {
        assert_eq!(PerformanceLevel::from_score(90.0), PerformanceLevel::Excellent);
        assert_eq!(PerformanceLevel::from_score(89.9), PerformanceLevel::Good);
        assert_eq!(PerformanceLevel::from_score(70.0), PerformanceLevel::Average);
        assert_eq!(PerformanceLevel::from_score(60.0), PerformanceLevel::BelowAverage);
        assert_eq!(PerformanceLevel::from_score(59.0), PerformanceLevel::Poor);
    }

    #[test]
    fn developer_blend() {
        let c = combine(100.0, 50.0, "developer");
        assert!((c.combined_score - 80.0).abs() < 1e-4);
        assert_eq!(c.performance_level, PerformanceLevel::Good);
    }
}
