//! Qualitative lookups over already-computed scores and counts.

use super::domain::{reject, AnalyticsError};
use super::trend::Polarity;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Inclusive lower bounds: 90 is `A+`, 89.99 is `A`.
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 90.0 => Self::APlus,
            p if p >= 80.0 => Self::A,
            p if p >= 70.0 => Self::B,
            p if p >= 60.0 => Self::C,
            p if p >= 50.0 => Self::D,
            _ => Self::F,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::APlus => "A+",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
struct RiskBandsDraft {
    medium: f64,
    high: f64,
}

/// Score thresholds for risk levels; both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RiskBandsDraft")]
pub struct RiskBands {
    medium: f64,
    high: f64,
}

impl RiskBands {
    pub const BURNOUT: Self = Self {
        medium: 30.0,
        high: 60.0,
    };

    pub fn new(medium: f64, high: f64) -> Result<Self, AnalyticsError> {
        let bands = Self { medium, high };
        bands.validate()?;
        Ok(bands)
    }

    pub fn medium(&self) -> f64 {
        self.medium
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn validate(&self) -> Result<(), AnalyticsError> {
        let (medium, high) = (self.medium, self.high);
        if !medium.is_finite() || !high.is_finite() || medium > high {
            return reject(AnalyticsError::InvalidRule {
                metric: "risk_bands".to_string(),
                reason: format!("medium threshold {medium} must not exceed high threshold {high}"),
            });
        }
        Ok(())
    }

    pub fn classify(&self, score: f64) -> RiskLevel {
        if score >= self.high {
            RiskLevel::High
        } else if score >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl TryFrom<RiskBandsDraft> for RiskBands {
    type Error = AnalyticsError;

    fn try_from(value: RiskBandsDraft) -> Result<Self, Self::Error> {
        RiskBands::new(value.medium, value.high)
    }
}

impl Default for RiskBands {
    fn default() -> Self {
        Self::BURNOUT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthBand {
    Excellent,
    Good,
    NeedsAttention,
}

impl HealthBand {
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            Self::Excellent
        } else if score >= 60.0 {
            Self::Good
        } else {
            Self::NeedsAttention
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::NeedsAttention => "Needs Attention",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorStatus {
    Good,
    Warning,
    Critical,
}

impl FactorStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Warning => "Warning",
            Self::Critical => "Critical",
        }
    }
}

/// Strict thresholds for a continuous factor.
///
/// For lower-is-better factors a value strictly above `critical` is critical;
/// for higher-is-better factors a value strictly below it is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorThresholds {
    pub polarity: Polarity,
    pub warning: f64,
    pub critical: f64,
}

impl FactorThresholds {
    pub const WEEKLY_WORK_HOURS: Self = Self {
        polarity: Polarity::LowerIsBetter,
        warning: 45.0,
        critical: 50.0,
    };

    pub const MEETING_HOURS: Self = Self {
        polarity: Polarity::LowerIsBetter,
        warning: 15.0,
        critical: 20.0,
    };

    pub const ENERGY: Self = Self {
        polarity: Polarity::HigherIsBetter,
        warning: 6.0,
        critical: 5.0,
    };

    /// Percentage of work sessions logged with stress above 7; no warning band.
    pub const HIGH_STRESS_SHARE: Self = Self {
        polarity: Polarity::LowerIsBetter,
        warning: 50.0,
        critical: 50.0,
    };

    pub fn classify(&self, value: f64) -> FactorStatus {
        match self.polarity {
            Polarity::LowerIsBetter if value > self.critical => FactorStatus::Critical,
            Polarity::LowerIsBetter if value > self.warning => FactorStatus::Warning,
            Polarity::HigherIsBetter if value < self.critical => FactorStatus::Critical,
            Polarity::HigherIsBetter if value < self.warning => FactorStatus::Warning,
            _ => FactorStatus::Good,
        }
    }
}

/// Inclusive count thresholds, e.g. boundary violations per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBands {
    pub warning_from: u32,
    pub critical_from: u32,
}

impl CountBands {
    pub const BOUNDARY_VIOLATIONS: Self = Self {
        warning_from: 6,
        critical_from: 11,
    };

    pub fn classify(&self, count: u32) -> FactorStatus {
        if count >= self.critical_from {
            FactorStatus::Critical
        } else if count >= self.warning_from {
            FactorStatus::Warning
        } else {
            FactorStatus::Good
        }
    }
}

/// Two or more critical factors are high risk; one critical or two warnings are medium.
pub fn overall_risk<I>(statuses: I) -> RiskLevel
where
    I: IntoIterator<Item = FactorStatus>,
{
    let (critical, warning) =
        statuses
            .into_iter()
            .fold((0usize, 0usize), |(critical, warning), status| match status {
                FactorStatus::Critical => (critical + 1, warning),
                FactorStatus::Warning => (critical, warning + 1),
                FactorStatus::Good => (critical, warning),
            });

    if critical >= 2 {
        RiskLevel::High
    } else if critical >= 1 || warning >= 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorTier {
    Green,
    Yellow,
    Red,
}

impl From<FactorStatus> for ColorTier {
    fn from(value: FactorStatus) -> Self {
        match value {
            FactorStatus::Good => Self::Green,
            FactorStatus::Warning => Self::Yellow,
            FactorStatus::Critical => Self::Red,
        }
    }
}

impl From<HealthBand> for ColorTier {
    fn from(value: HealthBand) -> Self {
        match value {
            HealthBand::Excellent => Self::Green,
            HealthBand::Good => Self::Yellow,
            HealthBand::NeedsAttention => Self::Red,
        }
    }
}

impl From<RiskLevel> for ColorTier {
    fn from(value: RiskLevel) -> Self {
        match value {
            RiskLevel::Low => Self::Green,
            RiskLevel::Medium => Self::Yellow,
            RiskLevel::High => Self::Red,
        }
    }
}

/// Closed-open (or closed) interval awarding `points` when a value falls inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRange {
    pub low: f64,
    pub high: f64,
    #[serde(default)]
    pub upper_inclusive: bool,
    pub points: f64,
}

impl TierRange {
    pub const fn closed(low: f64, high: f64, points: f64) -> Self {
        Self {
            low,
            high,
            upper_inclusive: true,
            points,
        }
    }

    pub const fn half_open(low: f64, high: f64, points: f64) -> Self {
        Self {
            low,
            high,
            upper_inclusive: false,
            points,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low
            && if self.upper_inclusive {
                value <= self.high
            } else {
                value < self.high
            }
    }
}

/// Two-sided tiers checked in order, best first; values outside every tier get `fallback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeTiers {
    pub tiers: Vec<TierRange>,
    pub fallback: f64,
}

impl RangeTiers {
    pub fn points(&self, value: f64) -> f64 {
        self.tiers
            .iter()
            .find(|tier| tier.contains(value))
            .map(|tier| tier.points)
            .unwrap_or(self.fallback)
    }

    pub fn bmi() -> Self {
        Self {
            tiers: vec![
                TierRange::half_open(18.5, 25.0, 20.0),
                TierRange::half_open(17.0, 27.0, 15.0),
                TierRange::half_open(16.0, 30.0, 10.0),
            ],
            fallback: 5.0,
        }
    }

    pub fn sleep_hours() -> Self {
        Self {
            tiers: vec![
                TierRange::closed(7.0, 9.0, 20.0),
                TierRange::closed(6.0, 10.0, 15.0),
                TierRange::closed(5.0, 11.0, 10.0),
            ],
            fallback: 5.0,
        }
    }

    pub fn systolic_pressure() -> Self {
        Self {
            tiers: vec![
                TierRange::closed(90.0, 120.0, 7.5),
                TierRange::half_open(90.0, 130.0, 5.0),
            ],
            fallback: 2.5,
        }
    }

    pub fn resting_heart_rate() -> Self {
        Self {
            tiers: vec![
                TierRange::closed(60.0, 80.0, 7.5),
                TierRange::closed(50.0, 100.0, 5.0),
            ],
            fallback: 2.5,
        }
    }
}
