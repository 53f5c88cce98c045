//! Human-readable commission explanation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const STRONG_METRIC: f64 = 90.0;
const WEAK_METRIC: f64 = 70.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiCalculations {
    pub overall_score: Option<f64>,
    pub performance_level: Option<String>,
    /// Percent.
    pub ai_confidence: Option<f64>,
    pub personal_bonus: Option<f64>,
    pub quality_bonus: Option<f64>,
    pub innovation_bonus: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommissionSummary {
    pub role: Option<String>,
    /// Metric name to 0..100 score. Ordered by name.
    pub performance_metrics: Option<BTreeMap<String, f64>>,
    pub ai_calculations: Option<AiCalculations>,
    pub final_amount: Option<f64>,
}

/// `1234567.4` -> `"1,234,567 VND"`.
pub fn format_vnd(amount: f64) -> String {
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{grouped} VND")
    } else {
        format!("{grouped} VND")
    }
}

pub fn explain_commission(summary: &CommissionSummary) -> String {
    let mut parts = vec![format!(
        "Commission calculation for {}",
        summary.role.as_deref().unwrap_or("employee")
    )];

    if let Some(metrics) = &summary.performance_metrics {
        let strong: Vec<String> = metrics
            .iter()
            .filter(|(_, s)| **s >= STRONG_METRIC)
            .map(|(m, s)| format!("{m} ({s})"))
            .collect();
        let weak: Vec<String> = metrics
            .iter()
            .filter(|(_, s)| **s < WEAK_METRIC)
            .map(|(m, s)| format!("{m} ({s})"))
            .collect();
        if !strong.is_empty() {
            parts.push(format!("Strong performance in: {}", strong.join(", ")));
        }
        if !weak.is_empty() {
            parts.push(format!("Areas for improvement: {}", weak.join(", ")));
        }
    }

    if let Some(ai) = &summary.ai_calculations {
        if let Some(score) = ai.overall_score {
            parts.push(format!("Overall performance score: {score:.1}"));
        }
        if let Some(level) = &ai.performance_level {
            parts.push(format!("Performance level: {level}"));
        }
        if let Some(conf) = ai.ai_confidence {
            parts.push(format!("AI confidence in calculation: {conf:.1}%"));
        }

        let mut bonuses = Vec::new();
        if let Some(b) = ai.personal_bonus {
            bonuses.push(format!("Personal bonus: {}", format_vnd(b)));
        }
        if let Some(b) = ai.quality_bonus.filter(|b| *b > 0.0) {
            bonuses.push(format!("Quality bonus: {}", format_vnd(b)));
        }
        if let Some(b) = ai.innovation_bonus.filter(|b| *b > 0.0) {
            bonuses.push(format!("Innovation bonus: {}", format_vnd(b)));
        }
        if !bonuses.is_empty() {
            parts.push(format!("Bonus components: {}", bonuses.join(", ")));
        }
    }

    if let Some(total) = summary.final_amount {
        parts.push(format!("Total commission: {}", format_vnd(total)));
    }

    format!("{}.", parts.join(". "))
}
