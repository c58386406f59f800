use crate::analytics::bands::{ColorTier, HealthBand, RangeTiers};
use crate::analytics::domain::{Record, RecordDomain};
use crate::analytics::scoring::{
    self, CompositeScore, MetricInput, RawMetric, ScoringEngine, BMI, EXERCISE, NUTRITION, SLEEP,
    VITALS,
};
use crate::analytics::stats;
use crate::analytics::window::TimeWindow;
use chrono::{NaiveDate, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Latest or averaged health measurements taken from a window of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub bmi: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub exercise_days: Option<u32>,
    pub nutrition_score: Option<f64>,
    pub systolic: Option<f64>,
    pub heart_rate: Option<f64>,
}

impl HealthSnapshot {
    pub fn from_records(records: &[Record], window: &TimeWindow) -> Self {
        let in_window: Vec<&Record> = records
            .iter()
            .filter(|record| window.contains(record.timestamp))
            .collect();

        let latest_biometric = in_window
            .iter()
            .filter(|record| record.domain == RecordDomain::Biometric)
            .max_by_key(|record| record.timestamp);

        let sleep_hours: Vec<f64> = numbers(&in_window, RecordDomain::Sleep, "total_hours");
        let nutrition: Vec<f64> = numbers(&in_window, RecordDomain::Meal, "nutrition_score");
        let exercise_days: BTreeSet<NaiveDate> = in_window
            .iter()
            .filter(|record| record.domain == RecordDomain::Exercise)
            .map(|record| record.timestamp.date())
            .collect();

        Self {
            bmi: latest_biometric.and_then(|record| bmi(record)),
            sleep_hours: stats::mean(&sleep_hours),
            exercise_days: Some(exercise_days.len() as u32),
            nutrition_score: stats::mean(&nutrition),
            systolic: latest_biometric.and_then(|record| record.number("blood_pressure_systolic")),
            heart_rate: latest_biometric.and_then(|record| record.number("heart_rate")),
        }
    }
}

fn numbers(records: &[&Record], domain: RecordDomain, field: &str) -> Vec<f64> {
    records
        .iter()
        .filter(|record| record.domain == domain)
        .filter_map(|record| record.number(field))
        .filter(|value| value.is_finite())
        .collect()
}

/// Recorded BMI, or weight over height squared.
fn bmi(record: &Record) -> Option<f64> {
    if let Some(bmi) = record.number("bmi").filter(|value| *value > 0.0) {
        return Some(bmi);
    }
    let weight = record.number("weight_kg")?;
    let height_m = record.number("height_cm")? / 100.0;
    (height_m > 0.0).then(|| weight / (height_m * height_m))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthScoreReport {
    pub snapshot: HealthSnapshot,
    pub score: CompositeScore,
    pub band: HealthBand,
    pub color: ColorTier,
}

pub fn health_score(snapshot: HealthSnapshot) -> HealthScoreReport {
    let tiered = |value: Option<f64>, tiers: RangeTiers| match value {
        Some(value) if value > 0.0 => RawMetric::Value(tiers.points(value)),
        _ => RawMetric::unavailable("no data"),
    };

    let vitals = match (snapshot.systolic, snapshot.heart_rate) {
        (None, None) => RawMetric::unavailable("no vitals recorded"),
        (systolic, heart_rate) => RawMetric::Value(
            systolic.map_or(0.0, |value| RangeTiers::systolic_pressure().points(value))
                + heart_rate.map_or(0.0, |value| RangeTiers::resting_heart_rate().points(value)),
        ),
    };

    let inputs = vec![
        MetricInput::new(BMI, tiered(snapshot.bmi, RangeTiers::bmi())),
        MetricInput::new(SLEEP, tiered(snapshot.sleep_hours, RangeTiers::sleep_hours())),
        MetricInput::new(
            EXERCISE,
            snapshot
                .exercise_days
                .map_or_else(|| RawMetric::unavailable("no data"), |days| RawMetric::Value(f64::from(days))),
        ),
        MetricInput::new(
            NUTRITION,
            snapshot
                .nutrition_score
                .map_or_else(|| RawMetric::unavailable("no meals scored"), RawMetric::Value),
        ),
        MetricInput::new(VITALS, vitals),
    ];

    let score = ScoringEngine::new(scoring::health_score()).score(&inputs);
    let band = HealthBand::from_score(score.percentage);

    HealthScoreReport {
        snapshot,
        score,
        band,
        color: band.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SleepAnalysis {
    pub nights_tracked: usize,
    pub average_hours: f64,
    pub average_quality: Option<f64>,
    pub average_deep_sleep_hours: Option<f64>,
    pub average_rem_hours: Option<f64>,
    pub average_interruptions: Option<f64>,
    /// `max(0, 100 - bedtime variance * 10)`; absent without bedtimes.
    pub consistency_score: Option<f64>,
    pub recommendations: Vec<String>,
}

/// Averages sleep records in `window`; `None` when nothing was logged.
pub fn sleep_analysis(records: &[Record], window: &TimeWindow) -> Option<SleepAnalysis> {
    let nights: Vec<&Record> = records
        .iter()
        .filter(|record| record.domain == RecordDomain::Sleep && window.contains(record.timestamp))
        .collect();
    if nights.is_empty() {
        return None;
    }

    let average_hours = stats::mean(&numbers(&nights, RecordDomain::Sleep, "total_hours")).unwrap_or(0.0);
    let average_quality = stats::mean(&numbers(&nights, RecordDomain::Sleep, "sleep_quality"));
    let bedtimes: Vec<f64> = nights.iter().filter_map(|record| bedtime_hour(record)).collect();
    let consistency_score =
        stats::variance(&bedtimes).map(|variance| (100.0 - variance * 10.0).max(0.0));

    let mut recommendations = Vec::new();
    if average_hours < 7.0 {
        recommendations.push("Aim for 7-9 hours of sleep per night".to_string());
    }
    if average_quality.is_some_and(|quality| quality < 6.0) {
        recommendations.push("Focus on improving sleep environment and bedtime routine".to_string());
    }
    if consistency_score.is_some_and(|score| score < 70.0) {
        recommendations.push("Try to maintain a consistent sleep schedule".to_string());
    }
    if recommendations.is_empty() {
        recommendations.push("Great sleep habits! Keep it up".to_string());
    }

    Some(SleepAnalysis {
        nights_tracked: nights.len(),
        average_hours,
        average_quality,
        average_deep_sleep_hours: stats::mean(&numbers(&nights, RecordDomain::Sleep, "deep_sleep_hours")),
        average_rem_hours: stats::mean(&numbers(&nights, RecordDomain::Sleep, "rem_sleep_hours")),
        average_interruptions: stats::mean(&numbers(&nights, RecordDomain::Sleep, "interruptions")),
        consistency_score,
        recommendations,
    })
}

/// Bedtime as fractional hours with early-morning times moved past midnight (01:00 -> 25.0).
fn bedtime_hour(record: &Record) -> Option<f64> {
    let hour = match record.number("bedtime") {
        Some(hour) => hour,
        None => {
            let time = chrono::NaiveTime::parse_from_str(record.category("bedtime")?.trim(), "%H:%M").ok()?;
            f64::from(time.hour()) + f64::from(time.minute()) / 60.0
        }
    };

    if !hour.is_finite() {
        return None;
    }
    Some(if hour < 12.0 { hour + 24.0 } else { hour })
}
