use chrono::{NaiveDate, NaiveDateTime};
use lifepulse::analytics::{
    AnalyticsEngine, BurnoutFactorKind, EngineConfig, Goal, Grade, Granularity, MetricInput,
    Period, Polarity, RawMetric, Record, RecordDomain, RiskLevel, ScoringPolicy, TimeWindow,
    TrendLabel,
};
use lifepulse::records::load_records;

const EXPORT: &str = "\
timestamp,domain,amount,type,category,duration_hours,energy_score
2025-02-03,transaction,5000,income,Salary,,
2025-03-03,transaction,5000,income,Salary,,
2025-02-10,transaction,1200,expense,Rent,,
2025-03-10,transaction,1200,expense,Rent,,
2025-03-12,transaction,300,expense,Food,,
2025-03-14 09:00:00,work_session,,,,9,
2025-03-17T09:00:00,work_session,,,,10,
2025-03-18,energy,,,,,7
";

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 19)
        .and_then(|date| date.and_hms_opt(18, 0, 0))
        .expect("valid timestamp")
}

fn engine() -> AnalyticsEngine {
    AnalyticsEngine::new(EngineConfig::default()).expect("default config is valid")
}

fn records() -> Vec<Record> {
    load_records(EXPORT.as_bytes()).expect("export loads")
}

#[test]
fn monthly_transaction_totals_come_back_in_date_order() {
    let transactions: Vec<Record> = records()
        .into_iter()
        .filter(|record| record.domain == RecordDomain::Transaction)
        .collect();
    let window = TimeWindow::new(Period::Month, 3, now()).expect("window");

    let result = engine().aggregate(
        &transactions,
        &window,
        Granularity::Month,
        &["amount".to_string()],
    );

    let labels: Vec<&str> = result
        .buckets
        .iter()
        .map(|bucket| bucket.key.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Feb 2025", "Mar 2025"]);
    assert_eq!(result.buckets[0].count, 2);
    assert_eq!(result.buckets[0].sum("amount"), 6200.0);
    assert_eq!(result.buckets[1].sum("amount"), 6500.0);
    assert_eq!(result.matched, 5);
    assert_eq!(result.total("amount"), 12_700.0);
}

#[test]
fn goal_forecast_uses_imported_cash_flow() {
    let goal = Goal::new(
        "Emergency Fund",
        10_000.0,
        1_000.0,
        NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date"),
    )
    .expect("valid goal");

    let result = engine()
        .forecast_goal(&goal, &records(), now())
        .expect("forecast builds");

    assert!((result.monthly_rate - 7300.0 / 3.0).abs() < 1e-9);
    assert_eq!(result.months_remaining, Some(4));
    assert_eq!(
        result.predicted_completion_date,
        NaiveDate::from_ymd_opt(2025, 7, 19)
    );
    assert!(result.on_track);
}

#[test]
fn moderate_week_reads_as_low_burnout_risk() {
    let window = TimeWindow::single(Period::Week, now()).expect("window");

    let assessment = engine().burnout(&records(), &window);

    let hours = assessment
        .factor(BurnoutFactorKind::WorkHours)
        .expect("work hours factor");
    assert_eq!(hours.value, Some(9.5));
    assert_eq!(assessment.overall_risk, RiskLevel::Low);
    assert_eq!(
        assessment.recommendations,
        vec!["Continue maintaining healthy work-life balance!".to_string()]
    );
}

#[test]
fn spending_trend_compares_consecutive_months() {
    let window = TimeWindow::single(Period::Month, now()).expect("window");

    let trend = engine()
        .compare_windows(
            &records(),
            &window,
            Some(RecordDomain::Transaction),
            "amount",
            Polarity::HigherIsBetter,
        )
        .expect("comparison");

    // The previous month holds the February salary and rent.
    assert_eq!(trend.recent, 6500.0);
    assert_eq!(trend.prior, 6200.0);
    assert_eq!(trend.label, TrendLabel::Stable);
}

#[test]
fn custom_policy_loads_from_json() {
    let policy: ScoringPolicy = serde_json::from_str(
        r#"{
            "name": "habits",
            "metrics": [
                { "name": "steps", "weight": 60,
                  "rule": { "kind": "linear_cap", "target": 10000 } },
                { "name": "water", "weight": 40,
                  "rule": { "kind": "threshold_bands",
                            "bands": [ { "min": 8, "score": 40 }, { "min": 4, "score": 20 } ] } }
            ]
        }"#,
    )
    .expect("policy parses");

    let score = engine().score(
        &policy,
        &[
            MetricInput::new("steps", RawMetric::Value(5000.0)),
            MetricInput::new("water", RawMetric::Value(5.0)),
        ],
    );

    assert_eq!(score.total, 50.0);
    assert_eq!(score.max, 100.0);
    assert_eq!(score.grade, Grade::D);
}

#[test]
fn policy_with_negative_weight_fails_to_load() {
    let result = serde_json::from_str::<ScoringPolicy>(
        r#"{ "name": "broken", "metrics": [
            { "name": "steps", "weight": -1, "rule": { "kind": "linear_cap", "target": 1 } }
        ] }"#,
    );
    assert!(result.is_err());
}
