//! Domain views composed from the generic engine pieces.

pub mod finance;
pub mod health;
pub mod worklife;

pub use finance::{
    budget_statuses, category_balance, financial_health, spending_by_category, Budget,
    BudgetStatus, FinanceProfile, FinancialHealthReport,
};
pub use health::{health_score, sleep_analysis, HealthScoreReport, HealthSnapshot, SleepAnalysis};
pub use worklife::{
    balance_score, burnout, AlwaysOnPatterns, BalanceScore, BurnoutAssessment, BurnoutFactor,
    BurnoutFactorKind,
};
