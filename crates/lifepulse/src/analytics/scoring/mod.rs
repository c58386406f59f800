mod config;
mod policy;
mod rules;

pub use config::{
    financial_health, health_score, BMI, BUDGET_ADHERENCE, DEBT_MANAGEMENT, EMERGENCY_FUND,
    EXERCISE, FINANCIAL_HEALTH, GOAL_PROGRESS, HEALTH_SCORE, NUTRITION, SAVINGS_RATE, SLEEP,
    VITALS,
};
pub use policy::{MetricSpec, ScoringPolicy};
pub use rules::{NormalizationRule, ScoreBand};

use super::bands::Grade;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Measurement handed to a rule before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum RawMetric {
    Value(f64),
    Progress { value: f64, target: f64 },
    Samples(Vec<f64>),
    /// Nothing to measure; the reason becomes the explanation of a zero score.
    Unavailable(String),
}

impl RawMetric {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable(reason.into())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricInput {
    pub name: String,
    pub value: RawMetric,
}

impl MetricInput {
    pub fn new(name: impl Into<String>, value: RawMetric) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Discrete contribution to a composite, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricScore {
    pub metric: String,
    pub score: f64,
    pub max: f64,
    pub raw: Option<f64>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompositeScore {
    pub policy: String,
    pub total: f64,
    pub max: f64,
    pub percentage: f64,
    pub grade: Grade,
    pub breakdown: Vec<MetricScore>,
}

impl CompositeScore {
    pub fn metric(&self, name: &str) -> Option<&MetricScore> {
        self.breakdown.iter().find(|entry| entry.metric == name)
    }
}

/// Stateless scorer bound to one validated policy.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    policy: ScoringPolicy,
}

impl ScoringEngine {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn score(&self, inputs: &[MetricInput]) -> CompositeScore {
        let mut by_name: HashMap<&str, &RawMetric> = HashMap::new();
        for input in inputs {
            if self.policy.metrics().iter().all(|spec| spec.name != input.name) {
                debug!(
                    target: "lifepulse::scoring",
                    policy = self.policy.name(),
                    metric = %input.name,
                    "ignoring input for a metric outside the policy"
                );
                continue;
            }
            by_name.entry(input.name.as_str()).or_insert(&input.value);
        }

        let breakdown: Vec<MetricScore> = self
            .policy
            .metrics()
            .iter()
            .map(|spec| match by_name.get(spec.name.as_str()) {
                Some(raw) => {
                    let outcome = spec.rule.apply(raw, spec.weight);
                    MetricScore {
                        metric: spec.name.clone(),
                        score: clamp_score(outcome.score, spec.weight),
                        max: spec.weight,
                        raw: outcome.raw,
                        notes: outcome.notes,
                    }
                }
                None => MetricScore {
                    metric: spec.name.clone(),
                    score: 0.0,
                    max: spec.weight,
                    raw: None,
                    notes: "no data".to_string(),
                },
            })
            .collect();

        let total: f64 = breakdown.iter().map(|entry| entry.score).sum();
        let max = self.policy.max_score();
        let percentage = if max > 0.0 { total / max * 100.0 } else { 0.0 };

        CompositeScore {
            policy: self.policy.name().to_string(),
            total,
            max,
            percentage,
            grade: Grade::from_percentage(percentage),
            breakdown,
        }
    }
}

fn clamp_score(score: f64, weight: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, weight)
    }
}
