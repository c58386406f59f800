use super::super::domain::{reject, AnalyticsError};
use super::rules::NormalizationRule;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Weighted metric definition inside a policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    pub name: String,
    pub weight: f64,
    pub rule: NormalizationRule,
}

impl MetricSpec {
    pub fn new(name: impl Into<String>, weight: f64, rule: NormalizationRule) -> Self {
        Self {
            name: name.into(),
            weight,
            rule,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct PolicyDraft {
    name: String,
    metrics: Vec<MetricSpec>,
}

/// Validated set of metrics; the composite maximum is the sum of their weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolicyDraft")]
pub struct ScoringPolicy {
    name: String,
    metrics: Vec<MetricSpec>,
}

impl ScoringPolicy {
    pub fn new(name: impl Into<String>, metrics: Vec<MetricSpec>) -> Result<Self, AnalyticsError> {
        let policy = Self {
            name: name.into(),
            metrics,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub(crate) fn preset(name: &str, metrics: Vec<MetricSpec>) -> Self {
        Self {
            name: name.to_string(),
            metrics,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &[MetricSpec] {
        &self.metrics
    }

    pub fn max_score(&self) -> f64 {
        self.metrics.iter().map(|metric| metric.weight).sum()
    }

    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.metrics.is_empty() {
            return reject(AnalyticsError::EmptyPolicy {
                policy: self.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        for metric in &self.metrics {
            if !seen.insert(metric.name.as_str()) {
                return reject(AnalyticsError::DuplicateMetric {
                    policy: self.name.clone(),
                    metric: metric.name.clone(),
                });
            }

            if !metric.weight.is_finite() || metric.weight < 0.0 {
                return reject(AnalyticsError::InvalidWeight {
                    metric: metric.name.clone(),
                    weight: metric.weight,
                });
            }

            if let Some(reason) = rule_problem(&metric.rule) {
                return reject(AnalyticsError::InvalidRule {
                    metric: metric.name.clone(),
                    reason,
                });
            }
        }

        Ok(())
    }
}

impl TryFrom<PolicyDraft> for ScoringPolicy {
    type Error = AnalyticsError;

    fn try_from(value: PolicyDraft) -> Result<Self, Self::Error> {
        ScoringPolicy::new(value.name, value.metrics)
    }
}

fn rule_problem(rule: &NormalizationRule) -> Option<String> {
    match rule {
        NormalizationRule::LinearCap { target } => {
            (!target.is_finite() || *target <= 0.0).then(|| format!("target must be positive, got {target}"))
        }
        NormalizationRule::ThresholdBands { bands } => {
            if bands.is_empty() {
                return Some("at least one band is required".to_string());
            }
            if bands
                .iter()
                .any(|band| !band.min.is_finite() || !band.score.is_finite())
            {
                return Some("band bounds and scores must be finite".to_string());
            }
            bands
                .windows(2)
                .any(|pair| pair[0].min <= pair[1].min)
                .then(|| "bands must be ordered by strictly descending minimum".to_string())
        }
        NormalizationRule::InverseSpread { cap, k } => (!cap.is_finite()
            || !k.is_finite()
            || *cap < 0.0
            || *k < 0.0)
            .then(|| format!("cap ({cap}) and k ({k}) must be finite and non-negative")),
    }
}
