use super::policy::{MetricSpec, ScoringPolicy};
use super::rules::{NormalizationRule, ScoreBand};

pub const FINANCIAL_HEALTH: &str = "financial_health";
pub const SAVINGS_RATE: &str = "savings_rate";
pub const BUDGET_ADHERENCE: &str = "budget_adherence";
pub const GOAL_PROGRESS: &str = "goal_progress";
pub const DEBT_MANAGEMENT: &str = "debt_management";
pub const EMERGENCY_FUND: &str = "emergency_fund";

pub const HEALTH_SCORE: &str = "health_score";
pub const BMI: &str = "bmi";
pub const SLEEP: &str = "sleep";
pub const EXERCISE: &str = "exercise";
pub const NUTRITION: &str = "nutrition";
pub const VITALS: &str = "vitals";

/// Savings rate 30, budget adherence 25, goal progress 20, debt 15, emergency fund 10.
pub fn financial_health() -> ScoringPolicy {
    ScoringPolicy::preset(
        FINANCIAL_HEALTH,
        vec![
            MetricSpec::new(
                SAVINGS_RATE,
                30.0,
                NormalizationRule::ThresholdBands {
                    bands: vec![
                        ScoreBand::new(20.0, 30.0),
                        ScoreBand::new(15.0, 25.0),
                        ScoreBand::new(10.0, 20.0),
                        ScoreBand::new(5.0, 15.0),
                        ScoreBand::new(0.0, 10.0),
                    ],
                },
            ),
            MetricSpec::new(
                BUDGET_ADHERENCE,
                25.0,
                NormalizationRule::LinearCap { target: 100.0 },
            ),
            MetricSpec::new(
                GOAL_PROGRESS,
                20.0,
                NormalizationRule::LinearCap { target: 100.0 },
            ),
            MetricSpec::new(
                DEBT_MANAGEMENT,
                15.0,
                NormalizationRule::LinearCap { target: 100.0 },
            ),
            MetricSpec::new(
                EMERGENCY_FUND,
                10.0,
                NormalizationRule::LinearCap { target: 100.0 },
            ),
        ],
    )
}

/// Range-tiered BMI and sleep points arrive pre-banded; exercise days are banded here.
pub fn health_score() -> ScoringPolicy {
    ScoringPolicy::preset(
        HEALTH_SCORE,
        vec![
            MetricSpec::new(BMI, 20.0, NormalizationRule::LinearCap { target: 20.0 }),
            MetricSpec::new(SLEEP, 20.0, NormalizationRule::LinearCap { target: 20.0 }),
            MetricSpec::new(
                EXERCISE,
                25.0,
                NormalizationRule::ThresholdBands {
                    bands: vec![
                        ScoreBand::new(5.0, 25.0),
                        ScoreBand::new(3.0, 20.0),
                        ScoreBand::new(1.0, 15.0),
                        ScoreBand::new(0.0, 5.0),
                    ],
                },
            ),
            MetricSpec::new(
                NUTRITION,
                20.0,
                NormalizationRule::LinearCap { target: 100.0 },
            ),
            MetricSpec::new(VITALS, 15.0, NormalizationRule::LinearCap { target: 15.0 }),
        ],
    )
}
