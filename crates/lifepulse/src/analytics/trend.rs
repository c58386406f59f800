use super::domain::{reject, AnalyticsError};
use super::stats;
use serde::{Deserialize, Serialize};

/// Which direction counts as "better" for a metric. Every call site must choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    Improving,
    Stable,
    Worsening,
}

impl TrendLabel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Improving => "Improving",
            Self::Stable => "Stable",
            Self::Worsening => "Worsening",
        }
    }

    pub const fn inverse(self) -> Self {
        match self {
            Self::Improving => Self::Worsening,
            Self::Stable => Self::Stable,
            Self::Worsening => Self::Improving,
        }
    }
}

/// Relative change tolerated before a move counts as a trend, within `[0, 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "f64")]
pub struct Deadband(f64);

impl Deadband {
    pub fn new(value: f64) -> Result<Self, AnalyticsError> {
        if !(0.0..1.0).contains(&value) {
            return reject(AnalyticsError::InvalidDeadband(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl Default for Deadband {
    fn default() -> Self {
        Self(super::DEFAULT_TREND_DEADBAND)
    }
}

impl From<Deadband> for f64 {
    fn from(value: Deadband) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for Deadband {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = f64::deserialize(deserializer)?;
        Deadband::new(raw).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendAssessment {
    pub label: TrendLabel,
    pub polarity: Polarity,
    pub recent: f64,
    pub prior: f64,
    /// Change relative to `|prior|`. Moving away from a zero prior counts as a full step (`±1`).
    pub delta: f64,
    /// `delta` as a percentage; absent when `prior` is zero.
    pub change_percent: Option<f64>,
}

/// Classifies the move from `prior` to `recent`.
///
/// The change is measured against the magnitude of `prior`; anything within
/// the deadband is stable. A move away from a zero prior is never stable.
pub fn classify(recent: f64, prior: f64, polarity: Polarity, deadband: Deadband) -> TrendAssessment {
    let change = recent - prior;
    let delta = if !change.is_finite() || change == 0.0 {
        0.0
    } else if prior == 0.0 {
        change.signum()
    } else {
        change / prior.abs()
    };

    let label = if delta == 0.0 || (prior != 0.0 && delta.abs() <= deadband.value()) {
        TrendLabel::Stable
    } else {
        let increased = delta > 0.0;
        match (polarity, increased) {
            (Polarity::HigherIsBetter, true) | (Polarity::LowerIsBetter, false) => {
                TrendLabel::Improving
            }
            _ => TrendLabel::Worsening,
        }
    };

    let change_percent = (prior != 0.0).then(|| delta * 100.0);

    TrendAssessment {
        label,
        polarity,
        recent,
        prior,
        delta,
        change_percent,
    }
}

/// Compares the mean of the later half of `values` with the earlier half.
///
/// With an odd number of values the middle one belongs to the later half.
pub fn classify_series(values: &[f64], polarity: Polarity, deadband: Deadband) -> TrendAssessment {
    if values.len() < 2 {
        let only = values.first().copied().unwrap_or(0.0);
        return classify(only, only, polarity, deadband);
    }

    let (earlier, later) = values.split_at(values.len() / 2);
    let prior = stats::mean(earlier).unwrap_or(0.0);
    let recent = stats::mean(later).unwrap_or(0.0);
    classify(recent, prior, polarity, deadband)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_is_better_increase_improves() {
        let trend = classify(110.0, 100.0, Polarity::HigherIsBetter, Deadband::default());
        assert_eq!(trend.label, TrendLabel::Improving);
        assert_eq!(trend.change_percent, Some(10.0));
    }

    #[test]
    fn lower_is_better_increase_worsens() {
        let trend = classify(12.0, 8.0, Polarity::LowerIsBetter, Deadband::default());
        assert_eq!(trend.label, TrendLabel::Worsening);
    }

    #[test]
    fn small_moves_are_stable() {
        let trend = classify(102.0, 100.0, Polarity::HigherIsBetter, Deadband::default());
        assert_eq!(trend.label, TrendLabel::Stable);
    }

    #[test]
    fn deadband_is_relative_to_prior() {
        let above = classify(105.2, 100.0, Polarity::HigherIsBetter, Deadband::default());
        assert_eq!(above.label, TrendLabel::Improving);
        assert!((above.change_percent.expect("prior is non-zero") - 5.2).abs() < 1e-9);

        let edge = classify(95.0, 100.0, Polarity::HigherIsBetter, Deadband::default());
        assert_eq!(edge.label, TrendLabel::Stable);

        let below = classify(94.9, 100.0, Polarity::HigherIsBetter, Deadband::default());
        assert_eq!(below.label, TrendLabel::Worsening);
    }

    #[test]
    fn zero_prior_has_no_change_percent() {
        let trend = classify(5.0, 0.0, Polarity::HigherIsBetter, Deadband::default());
        assert_eq!(trend.label, TrendLabel::Improving);
        assert_eq!(trend.change_percent, None);

        let flat = classify(0.0, 0.0, Polarity::LowerIsBetter, Deadband::default());
        assert_eq!(flat.label, TrendLabel::Stable);
    }

    #[test]
    fn deadband_rejects_out_of_range_values() {
        assert_eq!(Deadband::new(1.0), Err(AnalyticsError::InvalidDeadband(1.0)));
        assert!(Deadband::new(-0.1).is_err());
        assert!(Deadband::new(f64::NAN).is_err());
        assert!(Deadband::new(0.0).is_ok());
    }

    #[test]
    fn series_compares_halves() {
        let energy = [4.0, 5.0, 7.0, 8.0];
        let trend = classify_series(&energy, Polarity::HigherIsBetter, Deadband::default());
        assert_eq!(trend.prior, 4.5);
        assert_eq!(trend.recent, 7.5);
        assert_eq!(trend.label, TrendLabel::Improving);

        let single = classify_series(&[3.0], Polarity::HigherIsBetter, Deadband::default());
        assert_eq!(single.label, TrendLabel::Stable);
    }
}
