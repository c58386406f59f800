use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::analytics::{AnalyticsEngine, EngineConfig, Record, RecordDomain};

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

/// Wednesday, 2025-03-19 18:00.
pub(super) fn now() -> NaiveDateTime {
    at(2025, 3, 19, 18)
}

pub(super) fn days_ago(days: i64) -> NaiveDateTime {
    now() - Duration::days(days)
}

pub(super) fn engine() -> AnalyticsEngine {
    AnalyticsEngine::new(EngineConfig::default()).expect("default config is valid")
}

pub(super) fn expense(timestamp: NaiveDateTime, amount: f64, category: &str) -> Record {
    Record::new(RecordDomain::Transaction, timestamp)
        .with_number("amount", amount)
        .with_category("type", "expense")
        .with_category("category", category)
}

pub(super) fn income(timestamp: NaiveDateTime, amount: f64) -> Record {
    Record::new(RecordDomain::Transaction, timestamp)
        .with_number("amount", amount)
        .with_category("type", "income")
        .with_category("category", "Salary")
}

pub(super) fn work_session(timestamp: NaiveDateTime, hours: f64) -> Record {
    Record::new(RecordDomain::WorkSession, timestamp).with_number("duration_hours", hours)
}

pub(super) fn meeting(timestamp: NaiveDateTime, minutes: f64) -> Record {
    Record::new(RecordDomain::Meeting, timestamp).with_number("duration_minutes", minutes)
}

pub(super) fn energy(timestamp: NaiveDateTime, score: f64) -> Record {
    Record::new(RecordDomain::Energy, timestamp).with_number("energy_score", score)
}

pub(super) fn violation(timestamp: NaiveDateTime) -> Record {
    Record::new(RecordDomain::BoundaryViolation, timestamp)
}

pub(super) fn sleep(timestamp: NaiveDateTime, hours: f64, bedtime: f64) -> Record {
    Record::new(RecordDomain::Sleep, timestamp)
        .with_number("total_hours", hours)
        .with_number("bedtime", bedtime)
        .with_number("sleep_quality", 7.0)
}

pub(super) fn social(timestamp: NaiveDateTime, hours: f64) -> Record {
    Record::new(RecordDomain::SocialActivity, timestamp).with_number("duration_hours", hours)
}
