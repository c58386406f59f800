use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Source table a record was logged against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordDomain {
    Transaction,
    Meeting,
    Exercise,
    Sleep,
    Biometric,
    Meal,
    WorkSession,
    Energy,
    BoundaryViolation,
    SocialActivity,
    Other,
}

impl RecordDomain {
    pub const fn ordered() -> [Self; 11] {
        [
            Self::Transaction,
            Self::Meeting,
            Self::Exercise,
            Self::Sleep,
            Self::Biometric,
            Self::Meal,
            Self::WorkSession,
            Self::Energy,
            Self::BoundaryViolation,
            Self::SocialActivity,
            Self::Other,
        ]
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transaction => "transaction",
            Self::Meeting => "meeting",
            Self::Exercise => "exercise",
            Self::Sleep => "sleep",
            Self::Biometric => "biometric",
            Self::Meal => "meal",
            Self::WorkSession => "work_session",
            Self::Energy => "energy",
            Self::BoundaryViolation => "boundary_violation",
            Self::SocialActivity => "social_activity",
            Self::Other => "other",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Transaction => "Transaction",
            Self::Meeting => "Meeting",
            Self::Exercise => "Exercise",
            Self::Sleep => "Sleep",
            Self::Biometric => "Biometric",
            Self::Meal => "Meal",
            Self::WorkSession => "Work Session",
            Self::Energy => "Energy Level",
            Self::BoundaryViolation => "Boundary Violation",
            Self::SocialActivity => "Social Activity",
            Self::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ordered()
            .into_iter()
            .find(|domain| domain.as_str() == normalized)
    }
}

/// Direction of money movement for transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Immutable, dated observation supplied by the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(deserialize_with = "crate::records::deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub domain: RecordDomain,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub numeric: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categorical: BTreeMap<String, String>,
}

impl Record {
    pub fn new(domain: RecordDomain, timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            domain,
            numeric: BTreeMap::new(),
            categorical: BTreeMap::new(),
        }
    }

    pub fn with_number(mut self, field: impl Into<String>, value: f64) -> Self {
        self.numeric.insert(field.into(), value);
        self
    }

    pub fn with_category(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.categorical.insert(field.into(), value.into());
        self
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.numeric.get(field).copied()
    }

    pub fn category(&self, field: &str) -> Option<&str> {
        self.categorical
            .get(field)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Income/expense classification read from the `type` field of transactions.
    pub fn transaction_kind(&self) -> Option<TransactionKind> {
        if self.domain != RecordDomain::Transaction {
            return None;
        }

        match self.category("type")?.trim().to_ascii_lowercase().as_str() {
            "income" => Some(TransactionKind::Income),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct GoalSnapshot {
    name: String,
    target_amount: f64,
    #[serde(default)]
    current_amount: f64,
    target_date: NaiveDate,
}

/// Savings goal snapshot; the target amount is always positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GoalSnapshot")]
pub struct Goal {
    name: String,
    target_amount: f64,
    current_amount: f64,
    target_date: NaiveDate,
}

impl Goal {
    pub fn new(
        name: impl Into<String>,
        target_amount: f64,
        current_amount: f64,
        target_date: NaiveDate,
    ) -> Result<Self, AnalyticsError> {
        let name = name.into();
        if !target_amount.is_finite() || target_amount <= 0.0 {
            return reject(AnalyticsError::InvalidGoalTarget {
                name,
                target: target_amount,
            });
        }

        Ok(Self {
            name,
            target_amount,
            current_amount: if current_amount.is_finite() {
                current_amount
            } else {
                0.0
            },
            target_date,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target_amount(&self) -> f64 {
        self.target_amount
    }

    pub fn current_amount(&self) -> f64 {
        self.current_amount
    }

    pub fn target_date(&self) -> NaiveDate {
        self.target_date
    }

    pub fn remaining(&self) -> f64 {
        self.target_amount - self.current_amount
    }

    /// Progress toward the target as a percentage, capped at 100.
    pub fn progress_pct(&self) -> f64 {
        (self.current_amount / self.target_amount * 100.0).clamp(0.0, 100.0)
    }
}

impl TryFrom<GoalSnapshot> for Goal {
    type Error = AnalyticsError;

    fn try_from(value: GoalSnapshot) -> Result<Self, Self::Error> {
        Goal::new(
            value.name,
            value.target_amount,
            value.current_amount,
            value.target_date,
        )
    }
}

/// Configuration mistakes detected while building engine inputs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalyticsError {
    #[error("metric '{metric}' has invalid weight {weight}")]
    InvalidWeight { metric: String, weight: f64 },
    #[error("scoring policy '{policy}' defines no metrics")]
    EmptyPolicy { policy: String },
    #[error("scoring policy '{policy}' defines metric '{metric}' more than once")]
    DuplicateMetric { policy: String, metric: String },
    #[error("metric '{metric}' has an invalid normalization rule: {reason}")]
    InvalidRule { metric: String, reason: String },
    #[error("time window must span at least one period")]
    EmptyWindow,
    #[error("time window reaches outside the supported calendar range")]
    WindowOutOfRange,
    #[error("trend deadband must be within [0, 1), got {0}")]
    InvalidDeadband(f64),
    #[error("look-back window must cover at least one month")]
    InvalidLookback,
    #[error("goal '{name}' must have a positive target amount, got {target}")]
    InvalidGoalTarget { name: String, target: f64 },
    #[error("unknown {kind} '{value}' (expected {expected})")]
    UnknownName {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}

pub(crate) fn reject<T>(error: AnalyticsError) -> Result<T, AnalyticsError> {
    warn!(target: "lifepulse::config", %error, "rejected analytics configuration");
    Err(error)
}
