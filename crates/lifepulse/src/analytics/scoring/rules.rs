use super::super::stats;
use super::RawMetric;
use serde::{Deserialize, Serialize};

/// One step of a threshold table: values at or above `min` earn `score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub min: f64,
    pub score: f64,
}

impl ScoreBand {
    pub const fn new(min: f64, score: f64) -> Self {
        Self { min, score }
    }
}

/// Maps a raw measurement onto the `[0, weight]` scale of its metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NormalizationRule {
    /// `value / target * weight`. A progress input brings its own target.
    LinearCap { target: f64 },
    /// Bands ordered by descending `min`; the first band the value reaches wins.
    ThresholdBands { bands: Vec<ScoreBand> },
    /// `cap - stddev / mean * k` over samples, or over a precomputed ratio.
    InverseSpread { cap: f64, k: f64 },
}

pub(crate) struct RuleOutcome {
    pub raw: Option<f64>,
    pub score: f64,
    pub notes: String,
}

impl RuleOutcome {
    fn scored(raw: f64, score: f64, notes: String) -> Self {
        Self {
            raw: Some(raw),
            score,
            notes,
        }
    }

    fn zero(raw: Option<f64>, notes: impl Into<String>) -> Self {
        Self {
            raw,
            score: 0.0,
            notes: notes.into(),
        }
    }
}

impl NormalizationRule {
    pub(crate) fn apply(&self, input: &RawMetric, weight: f64) -> RuleOutcome {
        if let RawMetric::Unavailable(reason) = input {
            return RuleOutcome::zero(None, reason.clone());
        }

        match self {
            NormalizationRule::LinearCap { target } => linear_cap(input, *target, weight),
            NormalizationRule::ThresholdBands { bands } => threshold_bands(input, bands),
            NormalizationRule::InverseSpread { cap, k } => inverse_spread(input, *cap, *k),
        }
    }
}

fn linear_cap(input: &RawMetric, default_target: f64, weight: f64) -> RuleOutcome {
    let (value, target) = match input {
        RawMetric::Value(value) => (*value, default_target),
        RawMetric::Progress { value, target } => (*value, *target),
        RawMetric::Samples(samples) => match stats::mean(samples) {
            Some(mean) => (mean, default_target),
            None => return RuleOutcome::zero(None, "no samples"),
        },
        RawMetric::Unavailable(reason) => return RuleOutcome::zero(None, reason.clone()),
    };

    if !value.is_finite() {
        return RuleOutcome::zero(None, "value is not a finite number");
    }
    if target <= 0.0 || !target.is_finite() {
        return RuleOutcome::zero(Some(value), "target is zero");
    }

    let ratio = value / target;
    RuleOutcome::scored(
        value,
        ratio * weight,
        format!("{value:.2} of target {target:.2} ({:.1}%)", ratio * 100.0),
    )
}

fn threshold_bands(input: &RawMetric, bands: &[ScoreBand]) -> RuleOutcome {
    let value = match input {
        RawMetric::Value(value) => *value,
        RawMetric::Progress { value, target } => {
            if *target <= 0.0 {
                return RuleOutcome::zero(Some(*value), "target is zero");
            }
            value / target * 100.0
        }
        RawMetric::Samples(samples) => match stats::mean(samples) {
            Some(mean) => mean,
            None => return RuleOutcome::zero(None, "no samples"),
        },
        RawMetric::Unavailable(reason) => return RuleOutcome::zero(None, reason.clone()),
    };

    if !value.is_finite() {
        return RuleOutcome::zero(None, "value is not a finite number");
    }

    match bands.iter().find(|band| value >= band.min) {
        Some(band) => RuleOutcome::scored(
            value,
            band.score,
            format!("{value:.2} reaches band >= {}", band.min),
        ),
        None => RuleOutcome::zero(Some(value), format!("{value:.2} is below every band")),
    }
}

fn inverse_spread(input: &RawMetric, cap: f64, k: f64) -> RuleOutcome {
    let ratio = match input {
        RawMetric::Samples(samples) => {
            if samples.is_empty() {
                return RuleOutcome::zero(None, "no samples");
            }
            match stats::coefficient_of_variation(samples) {
                Some(ratio) => ratio,
                None => return RuleOutcome::zero(None, "mean is zero"),
            }
        }
        RawMetric::Value(ratio) => *ratio,
        RawMetric::Progress { .. } => {
            return RuleOutcome::zero(None, "spread needs samples, got a progress value")
        }
        RawMetric::Unavailable(reason) => return RuleOutcome::zero(None, reason.clone()),
    };

    if !ratio.is_finite() {
        return RuleOutcome::zero(None, "value is not a finite number");
    }

    let ratio = ratio.abs();
    RuleOutcome::scored(
        ratio,
        (cap - ratio * k).max(0.0),
        format!("coefficient of variation {ratio:.3}"),
    )
}
