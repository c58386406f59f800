use crate::analytics::aggregate::{aggregate_by_category, CategoryBreakdown};
use crate::analytics::bands::{ColorTier, HealthBand};
use crate::analytics::domain::{AnalyticsError, Goal, Record, TransactionKind};
use crate::analytics::forecast::{monthly_net_rate, NetRate};
use crate::analytics::scoring::{
    self, CompositeScore, MetricInput, MetricScore, MetricSpec, NormalizationRule, RawMetric,
    ScoringEngine, ScoringPolicy, BUDGET_ADHERENCE, DEBT_MANAGEMENT, EMERGENCY_FUND,
    GOAL_PROGRESS, SAVINGS_RATE,
};
use crate::analytics::window::{Period, TimeWindow};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const CATEGORY_BALANCE: &str = "category_balance";

/// Spending limit for one expense category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub category: String,
    pub limit: f64,
}

impl Budget {
    pub fn new(category: impl Into<String>, limit: f64) -> Self {
        Self {
            category: category.into(),
            limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub category: String,
    pub spent: f64,
    pub limit: f64,
    /// Absent when the limit is zero or negative.
    pub percentage_used: Option<f64>,
    pub remaining: f64,
    /// Percentage used, capped at 100 for progress displays.
    pub progress: f64,
    pub over_budget: bool,
    pub color: ColorTier,
}

impl BudgetStatus {
    /// Adherence contribution in `[0, 100]`; `None` for unusable limits.
    pub fn adherence(&self) -> Option<f64> {
        self.percentage_used.map(|used| (100.0 - used).max(0.0))
    }
}

/// Sum of expense amounts per category within `window`.
pub fn spending_by_category(records: &[Record], window: &TimeWindow) -> CategoryBreakdown {
    aggregate_by_category(expenses(records), window, "category", "amount")
}

pub fn budget_statuses(
    records: &[Record],
    budgets: &[Budget],
    window: &TimeWindow,
) -> Vec<BudgetStatus> {
    let spending = spending_by_category(records, window);

    budgets
        .iter()
        .map(|budget| {
            let spent = spending.total_for(&budget.category);
            let percentage_used = (budget.limit > 0.0).then(|| spent / budget.limit * 100.0);
            let over_budget = spent > budget.limit;
            let color = match percentage_used {
                _ if over_budget => ColorTier::Red,
                Some(used) if used >= 80.0 => ColorTier::Yellow,
                _ => ColorTier::Green,
            };

            BudgetStatus {
                category: budget.category.clone(),
                spent,
                limit: budget.limit,
                percentage_used,
                remaining: (budget.limit - spent).max(0.0),
                progress: percentage_used.map_or(100.0, |used| used.min(100.0)),
                over_budget,
                color,
            }
        })
        .collect()
}

/// Evenness of spending across categories, scored 0-100 by inverse spread.
pub fn category_balance(breakdown: &CategoryBreakdown) -> MetricScore {
    let policy = ScoringPolicy::preset(
        CATEGORY_BALANCE,
        vec![MetricSpec::new(
            CATEGORY_BALANCE,
            100.0,
            NormalizationRule::InverseSpread { cap: 100.0, k: 50.0 },
        )],
    );
    let input = if breakdown.categories.is_empty() {
        RawMetric::unavailable("no spending recorded")
    } else {
        RawMetric::Samples(breakdown.totals())
    };

    let mut composite = ScoringEngine::new(policy).score(&[MetricInput::new(CATEGORY_BALANCE, input)]);
    composite.breakdown.remove(0)
}

/// Non-record inputs to the financial health score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinanceProfile {
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub total_debt: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialHealthReport {
    pub score: CompositeScore,
    pub band: HealthBand,
    pub color: ColorTier,
    pub net: NetRate,
    pub savings_rate: Option<f64>,
    pub budgets: Vec<BudgetStatus>,
    pub spending: CategoryBreakdown,
    pub balance: MetricScore,
    pub recommendations: Vec<String>,
}

pub fn financial_health(
    records: &[Record],
    profile: &FinanceProfile,
    now: NaiveDateTime,
    lookback_months: u32,
) -> Result<FinancialHealthReport, AnalyticsError> {
    let net = monthly_net_rate(records, now, lookback_months)?;
    let window = TimeWindow::new(Period::Month, lookback_months, now)?;
    let budgets = budget_statuses(records, &profile.budgets, &window);

    let savings_rate = net.savings_rate();
    let inputs = vec![
        MetricInput::new(
            SAVINGS_RATE,
            savings_rate.map_or_else(|| RawMetric::unavailable("no income recorded"), RawMetric::Value),
        ),
        MetricInput::new(BUDGET_ADHERENCE, budget_adherence(&budgets, profile.budgets.is_empty())),
        MetricInput::new(GOAL_PROGRESS, goal_progress(&profile.goals)),
        MetricInput::new(DEBT_MANAGEMENT, debt_headroom(profile.total_debt, &net)),
        MetricInput::new(EMERGENCY_FUND, emergency_fund(&profile.goals)),
    ];

    let score = ScoringEngine::new(scoring::financial_health()).score(&inputs);
    let band = HealthBand::from_score(score.percentage);
    let spending = spending_by_category(records, &window);
    let balance = category_balance(&spending);
    let recommendations = recommendations(&score);

    Ok(FinancialHealthReport {
        color: band.into(),
        band,
        score,
        net,
        savings_rate,
        budgets,
        spending,
        balance,
        recommendations,
    })
}

fn expenses(records: &[Record]) -> impl Iterator<Item = &Record> {
    records
        .iter()
        .filter(|record| record.transaction_kind() == Some(TransactionKind::Expense))
}

fn budget_adherence(statuses: &[BudgetStatus], none_set: bool) -> RawMetric {
    if none_set {
        return RawMetric::unavailable("no budgets set");
    }

    let adherence: Vec<f64> = statuses.iter().filter_map(BudgetStatus::adherence).collect();
    if adherence.is_empty() {
        return RawMetric::unavailable("no budget has a positive limit");
    }
    RawMetric::Samples(adherence)
}

fn goal_progress(goals: &[Goal]) -> RawMetric {
    if goals.is_empty() {
        return RawMetric::unavailable("no goals set");
    }
    RawMetric::Samples(goals.iter().map(Goal::progress_pct).collect())
}

fn debt_headroom(total_debt: f64, net: &NetRate) -> RawMetric {
    let monthly_income = net.monthly_income();
    if monthly_income <= 0.0 {
        return RawMetric::unavailable("no income recorded");
    }

    let debt_to_income = total_debt.max(0.0) / (monthly_income * 12.0) * 100.0;
    RawMetric::Value((100.0 - debt_to_income).max(0.0))
}

fn emergency_fund(goals: &[Goal]) -> RawMetric {
    goals
        .iter()
        .find(|goal| goal.name().to_ascii_lowercase().contains("emergency"))
        .map_or_else(
            || RawMetric::unavailable("no emergency fund goal"),
            |goal| RawMetric::Value(goal.progress_pct()),
        )
}

fn recommendations(score: &CompositeScore) -> Vec<String> {
    let points = |name: &str| score.metric(name).map_or(0.0, |metric| metric.score);
    let missing = |name: &str| score.metric(name).map_or(true, |metric| metric.raw.is_none());
    let mut advice = Vec::new();

    if points(SAVINGS_RATE) < 15.0 {
        advice.push("Increase your savings rate to at least 20% of income");
    }
    if missing(BUDGET_ADHERENCE) {
        advice.push("Set up budgets for your main expense categories");
    } else if points(BUDGET_ADHERENCE) < 15.0 {
        advice.push("Review and adjust your budgets to match spending patterns");
    }
    if missing(GOAL_PROGRESS) {
        advice.push("Create financial goals to stay motivated");
    } else if points(GOAL_PROGRESS) < 10.0 {
        advice.push("Focus on making consistent progress towards your goals");
    }
    if points(DEBT_MANAGEMENT) < 10.0 {
        advice.push("Prioritize paying down high-interest debt");
    }
    if points(EMERGENCY_FUND) < 5.0 {
        advice.push("Build an emergency fund covering 3-6 months of expenses");
    }

    if advice.is_empty() {
        advice.push("Great job! Keep up your excellent financial habits");
    }
    advice.into_iter().map(str::to_string).collect()
}
