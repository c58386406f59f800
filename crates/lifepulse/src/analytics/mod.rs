//! Record aggregation, scoring, trend, band, and forecast primitives.
//!
//! Every entry point is a pure function of its inputs and an explicit `now`; the
//! [`AnalyticsEngine`] only bundles the validated tunables so callers can share
//! one instance across threads.

pub mod aggregate;
pub mod bands;
pub mod dashboards;
pub mod domain;
pub mod forecast;
pub mod scoring;
pub mod stats;
pub mod trend;
pub mod window;

#[cfg(test)]
mod tests;

pub use aggregate::{
    aggregate, aggregate_by_category, recorded_at, AggregationResult, Bucket, BucketKey,
    CategoryBreakdown, CategoryTotal, Granularity,
};
pub use bands::{
    overall_risk, ColorTier, CountBands, FactorStatus, FactorThresholds, Grade, HealthBand,
    RangeTiers, RiskBands, RiskLevel, TierRange,
};
pub use dashboards::{
    AlwaysOnPatterns, BalanceScore, Budget, BudgetStatus, BurnoutAssessment, BurnoutFactor,
    BurnoutFactorKind, FinanceProfile, FinancialHealthReport, HealthScoreReport, HealthSnapshot,
    SleepAnalysis,
};
pub use domain::{AnalyticsError, Goal, Record, RecordDomain, TransactionKind};
pub use forecast::{forecast, monthly_net_rate, ForecastResult, NetRate, ProjectionPoint};
pub use scoring::{
    CompositeScore, MetricInput, MetricScore, MetricSpec, NormalizationRule, RawMetric,
    ScoreBand, ScoringEngine, ScoringPolicy,
};
pub use trend::{classify, classify_series, Deadband, Polarity, TrendAssessment, TrendLabel};
pub use window::{Period, TimeWindow, WindowSpec};

use chrono::NaiveDateTime;
use domain::reject;
use serde::{Deserialize, Serialize};
use tracing::instrument;

pub const DEFAULT_TREND_DEADBAND: f64 = 0.05;
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 3;

/// Engine tunables. Validated by [`AnalyticsEngine::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub trend_deadband: f64,
    pub lookback_months: u32,
    pub burnout_bands: RiskBands,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trend_deadband: DEFAULT_TREND_DEADBAND,
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
            burnout_bands: RiskBands::BURNOUT,
        }
    }
}

/// Stateless facade over the analytics primitives.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine {
    config: EngineConfig,
    deadband: Deadband,
}

impl AnalyticsEngine {
    pub fn new(config: EngineConfig) -> Result<Self, AnalyticsError> {
        let deadband = Deadband::new(config.trend_deadband)?;
        if config.lookback_months == 0 {
            return reject(AnalyticsError::InvalidLookback);
        }
        config.burnout_bands.validate()?;
        Ok(Self { config, deadband })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn deadband(&self) -> Deadband {
        self.deadband
    }

    /// Buckets records by their logged timestamp.
    pub fn aggregate(
        &self,
        records: &[Record],
        window: &TimeWindow,
        granularity: Granularity,
        fields: &[String],
    ) -> AggregationResult {
        aggregate(records, recorded_at, window, granularity, fields)
    }

    pub fn score(&self, policy: &ScoringPolicy, inputs: &[MetricInput]) -> CompositeScore {
        ScoringEngine::new(policy.clone()).score(inputs)
    }

    pub fn trend(&self, recent: f64, prior: f64, polarity: Polarity) -> TrendAssessment {
        classify(recent, prior, polarity, self.deadband)
    }

    /// Compares the total of `field` in `window` against the equal-length window before it.
    pub fn compare_windows(
        &self,
        records: &[Record],
        window: &TimeWindow,
        domain: Option<RecordDomain>,
        field: &str,
        polarity: Polarity,
    ) -> Result<TrendAssessment, AnalyticsError> {
        let prior_window = window.preceding()?;
        let total = |span: &TimeWindow| -> f64 {
            records
                .iter()
                .filter(|record| domain.map_or(true, |domain| record.domain == domain))
                .filter(|record| span.contains(record.timestamp))
                .filter_map(|record| record.number(field))
                .filter(|value| value.is_finite())
                .sum()
        };

        Ok(self.trend(total(window), total(&prior_window), polarity))
    }

    pub fn monthly_net_rate(
        &self,
        records: &[Record],
        now: NaiveDateTime,
    ) -> Result<NetRate, AnalyticsError> {
        monthly_net_rate(records, now, self.config.lookback_months)
    }

    /// Forecasts `goal` at the net rate observed over the configured look-back.
    #[instrument(skip(self, records), fields(goal = goal.name()))]
    pub fn forecast_goal(
        &self,
        goal: &Goal,
        records: &[Record],
        now: NaiveDateTime,
    ) -> Result<ForecastResult, AnalyticsError> {
        let rate = self.monthly_net_rate(records, now)?;
        Ok(forecast(goal, rate.monthly_rate, now.date()))
    }

    pub fn financial_health(
        &self,
        records: &[Record],
        profile: &FinanceProfile,
        now: NaiveDateTime,
    ) -> Result<FinancialHealthReport, AnalyticsError> {
        dashboards::financial_health(records, profile, now, self.config.lookback_months)
    }

    pub fn budget_statuses(
        &self,
        records: &[Record],
        budgets: &[Budget],
        window: &TimeWindow,
    ) -> Vec<BudgetStatus> {
        dashboards::budget_statuses(records, budgets, window)
    }

    pub fn burnout(&self, records: &[Record], window: &TimeWindow) -> BurnoutAssessment {
        dashboards::burnout(records, window, self.deadband, &self.config.burnout_bands)
    }

    pub fn balance_score(&self, records: &[Record], window: &TimeWindow) -> BalanceScore {
        dashboards::balance_score(records, window)
    }

    pub fn health_score(&self, records: &[Record], window: &TimeWindow) -> HealthScoreReport {
        dashboards::health_score(HealthSnapshot::from_records(records, window))
    }

    pub fn sleep_analysis(&self, records: &[Record], window: &TimeWindow) -> Option<SleepAnalysis> {
        dashboards::sleep_analysis(records, window)
    }
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self {
            config: EngineConfig::default(),
            deadband: Deadband::default(),
        }
    }
}
