use super::common::*;
use crate::analytics::dashboards::{category_balance, health_score, spending_by_category};
use crate::analytics::scoring::{
    BMI, BUDGET_ADHERENCE, DEBT_MANAGEMENT, EMERGENCY_FUND, EXERCISE, GOAL_PROGRESS, SLEEP,
    VITALS,
};
use crate::analytics::{
    AnalyticsEngine, AnalyticsError, Budget, BurnoutFactorKind, EngineConfig, FinanceProfile,
    Goal, HealthBand, HealthSnapshot, Period, Polarity, Record, RecordDomain, RiskBands,
    TimeWindow, TrendLabel,
};
use crate::analytics::{AlwaysOnPatterns, FactorStatus, RiskLevel};
use chrono::NaiveDate;

fn target_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date")
}

#[test]
fn financial_health_combines_all_components() {
    let records = vec![
        income(days_ago(40), 6000.0),
        income(days_ago(10), 6000.0),
        expense(days_ago(35), 2000.0, "Rent"),
        expense(days_ago(5), 2000.0, "Rent"),
        expense(days_ago(3), 400.0, "Food"),
    ];
    let profile = FinanceProfile {
        budgets: vec![Budget::new("Food", 1600.0), Budget::new("Rent", 16_000.0)],
        goals: vec![
            Goal::new("Emergency Fund", 10_000.0, 5_000.0, target_date()).expect("goal"),
            Goal::new("Vacation", 2_000.0, 2_000.0, target_date()).expect("goal"),
        ],
        total_debt: 12_000.0,
    };

    let report = engine()
        .financial_health(&records, &profile, now())
        .expect("report");

    // 12000 income and 4400 expenses over three months.
    assert!((report.savings_rate.expect("income present") - 63.333).abs() < 0.01);
    let metric = |name: &str| report.score.metric(name).expect("metric present").score;
    assert_eq!(metric(BUDGET_ADHERENCE), 18.75);
    assert_eq!(metric(GOAL_PROGRESS), 15.0);
    assert_eq!(metric(DEBT_MANAGEMENT), 11.25);
    assert_eq!(metric(EMERGENCY_FUND), 5.0);
    assert!((report.score.total - 80.0).abs() < 1e-9);
    assert_eq!(report.band, HealthBand::Excellent);
    assert_eq!(
        report.recommendations,
        vec!["Great job! Keep up your excellent financial habits".to_string()]
    );
}

#[test]
fn empty_profile_explains_missing_inputs() {
    let report = engine()
        .financial_health(&[], &FinanceProfile::default(), now())
        .expect("report");

    assert_eq!(report.score.total, 0.0);
    assert_eq!(
        report.score.metric(BUDGET_ADHERENCE).expect("budget").notes,
        "no budgets set"
    );
    assert_eq!(
        report.score.metric(EMERGENCY_FUND).expect("fund").notes,
        "no emergency fund goal"
    );
    assert!(report
        .recommendations
        .contains(&"Set up budgets for your main expense categories".to_string()));
    assert!(report
        .recommendations
        .contains(&"Create financial goals to stay motivated".to_string()));
}

#[test]
fn zero_limit_budget_has_no_percentage() {
    let records = vec![expense(days_ago(1), 25.0, "Fun")];
    let window = TimeWindow::single(Period::Month, now()).expect("window");

    let statuses = engine().budget_statuses(&records, &[Budget::new("Fun", 0.0)], &window);

    assert_eq!(statuses[0].percentage_used, None);
    assert!(statuses[0].over_budget);
    assert_eq!(statuses[0].progress, 100.0);
}

#[test]
fn balanced_spending_scores_higher_than_lopsided() {
    let window = TimeWindow::single(Period::Month, now()).expect("window");
    let even = vec![
        expense(days_ago(1), 100.0, "Food"),
        expense(days_ago(2), 100.0, "Transport"),
        expense(days_ago(3), 100.0, "Bills"),
    ];
    let lopsided = vec![
        expense(days_ago(1), 280.0, "Food"),
        expense(days_ago(2), 10.0, "Transport"),
        expense(days_ago(3), 10.0, "Bills"),
    ];

    let even_score = category_balance(&spending_by_category(&even, &window));
    let lopsided_score = category_balance(&spending_by_category(&lopsided, &window));

    assert_eq!(even_score.score, 100.0);
    assert!(lopsided_score.score < even_score.score);
    assert_eq!(category_balance(&spending_by_category(&[], &window)).score, 0.0);
}

#[test]
fn health_score_reads_latest_biometrics() {
    let records = vec![
        Record::new(RecordDomain::Biometric, days_ago(6))
            .with_number("weight_kg", 95.0)
            .with_number("height_cm", 180.0),
        Record::new(RecordDomain::Biometric, days_ago(1))
            .with_number("weight_kg", 72.0)
            .with_number("height_cm", 180.0)
            .with_number("blood_pressure_systolic", 118.0)
            .with_number("heart_rate", 88.0),
        sleep(days_ago(1), 7.5, 23.0),
        sleep(days_ago(2), 6.5, 23.5),
        Record::new(RecordDomain::Exercise, days_ago(1)),
        Record::new(RecordDomain::Exercise, days_ago(1)),
        Record::new(RecordDomain::Exercise, days_ago(3)),
        Record::new(RecordDomain::Exercise, days_ago(5)),
        Record::new(RecordDomain::Meal, days_ago(1)).with_number("nutrition_score", 80.0),
    ];
    let window = TimeWindow::single(Period::Week, now()).expect("window");

    let report = engine().health_score(&records, &window);
    let metric = |name: &str| report.score.metric(name).expect("metric").score;

    assert_eq!(report.snapshot.exercise_days, Some(3));
    assert_eq!(metric(BMI), 20.0);
    assert_eq!(metric(SLEEP), 20.0);
    assert_eq!(metric(EXERCISE), 20.0);
    assert_eq!(metric(VITALS), 12.5);
    assert!((report.score.total - 88.5).abs() < 1e-9);
    assert_eq!(report.band, HealthBand::Excellent);
}

#[test]
fn missing_health_inputs_score_zero() {
    let report = health_score(HealthSnapshot::default());
    assert_eq!(report.score.total, 0.0);
    assert_eq!(report.band, HealthBand::NeedsAttention);
}

#[test]
fn sleep_consistency_penalizes_irregular_bedtimes() {
    let window = TimeWindow::single(Period::Week, now()).expect("window");
    let steady = vec![
        sleep(days_ago(1), 7.5, 23.0),
        sleep(days_ago(2), 7.5, 23.0),
        sleep(days_ago(3), 7.5, 23.0),
    ];
    let erratic = vec![
        sleep(days_ago(1), 6.0, 21.0),
        sleep(days_ago(2), 6.0, 2.0),
        sleep(days_ago(3), 6.0, 23.0),
    ];

    let steady = engine()
        .sleep_analysis(&steady, &window)
        .expect("steady analysis");
    let erratic = engine()
        .sleep_analysis(&erratic, &window)
        .expect("erratic analysis");

    assert_eq!(steady.consistency_score, Some(100.0));
    assert_eq!(
        steady.recommendations,
        vec!["Great sleep habits! Keep it up".to_string()]
    );
    assert!(erratic
        .consistency_score
        .is_some_and(|score| score < 70.0));
    assert!(erratic
        .recommendations
        .contains(&"Try to maintain a consistent sleep schedule".to_string()));
    assert!(erratic
        .recommendations
        .contains(&"Aim for 7-9 hours of sleep per night".to_string()));
    assert!(engine().sleep_analysis(&[], &window).is_none());
}

#[test]
fn burnout_factors_trend_against_previous_window() {
    let records = vec![
        violation(days_ago(10)),
        violation(days_ago(9)),
        violation(days_ago(2)),
        meeting(days_ago(12), 600.0),
        meeting(days_ago(2), 300.0),
    ];
    let window = TimeWindow::single(Period::Week, now()).expect("window");

    let assessment = engine().burnout(&records, &window);

    let violations = assessment
        .factor(BurnoutFactorKind::BoundaryViolations)
        .expect("violations factor");
    let trend = violations.trend.expect("prior window has data");
    assert_eq!(trend.polarity, Polarity::LowerIsBetter);
    assert_eq!(trend.label, TrendLabel::Improving);

    let meetings = assessment
        .factor(BurnoutFactorKind::MeetingLoad)
        .expect("meeting factor");
    assert_eq!(meetings.value, Some(5.0));
    assert_eq!(
        meetings.trend.map(|trend| trend.label),
        Some(TrendLabel::Improving)
    );
}

#[test]
fn compare_windows_totals_a_field() {
    let records = vec![
        expense(days_ago(3), 50.0, "Food"),
        expense(days_ago(10), 200.0, "Food"),
        energy(days_ago(3), 9.0),
    ];
    let window = TimeWindow::single(Period::Week, now()).expect("window");

    let trend = engine()
        .compare_windows(
            &records,
            &window,
            Some(RecordDomain::Transaction),
            "amount",
            Polarity::LowerIsBetter,
        )
        .expect("comparison");

    assert_eq!(trend.recent, 50.0);
    assert_eq!(trend.prior, 200.0);
    assert_eq!(trend.label, TrendLabel::Improving);
    assert_eq!(trend.change_percent, Some(-75.0));
}

#[test]
fn engine_rejects_invalid_tunables() {
    let config = EngineConfig {
        trend_deadband: 1.5,
        ..EngineConfig::default()
    };
    assert_eq!(
        AnalyticsEngine::new(config).map(|_| ()),
        Err(AnalyticsError::InvalidDeadband(1.5))
    );

    let config = EngineConfig {
        lookback_months: 0,
        ..EngineConfig::default()
    };
    assert_eq!(
        AnalyticsEngine::new(config).map(|_| ()),
        Err(AnalyticsError::InvalidLookback)
    );
}

#[test]
fn inverted_burnout_bands_are_rejected() {
    let json = r#"{"burnout_bands":{"medium":80,"high":20}}"#;
    assert!(serde_json::from_str::<EngineConfig>(json).is_err());

    let json = r#"{"burnout_bands":{"medium":25,"high":55}}"#;
    let config: EngineConfig = serde_json::from_str(json).expect("ordered bands");
    assert_eq!(config.burnout_bands.medium(), 25.0);
    assert_eq!(config.burnout_bands.high(), 55.0);
    assert!(AnalyticsEngine::new(config).is_ok());

    assert!(matches!(
        RiskBands::new(80.0, 20.0),
        Err(AnalyticsError::InvalidRule { ref metric, .. }) if metric == "risk_bands"
    ));
}

#[test]
fn goal_deserialization_rejects_non_positive_target() {
    let json = r#"{"name":"Bike","target_amount":0,"current_amount":10,"target_date":"2025-06-01"}"#;
    assert!(serde_json::from_str::<Goal>(json).is_err());

    let json = r#"{"name":"Bike","target_amount":800,"target_date":"2025-06-01"}"#;
    let goal: Goal = serde_json::from_str(json).expect("valid goal");
    assert_eq!(goal.current_amount(), 0.0);
}

#[test]
fn meeting_and_violation_warnings_add_no_risk_points() {
    let mut records: Vec<Record> = (0..8).map(|_| violation(days_ago(1))).collect();
    records.push(meeting(days_ago(2), 1080.0));
    let window = TimeWindow::single(Period::Week, now()).expect("window");

    let assessment = engine().burnout(&records, &window);

    for kind in [BurnoutFactorKind::MeetingLoad, BurnoutFactorKind::BoundaryViolations] {
        let factor = assessment.factor(kind).expect("factor present");
        assert_eq!(factor.status, FactorStatus::Warning);
    }
    assert_eq!(assessment.risk_score, 0.0);
    assert_eq!(assessment.overall_risk, RiskLevel::Medium);

    records.extend((0..3).map(|_| violation(days_ago(1))));
    records.push(meeting(days_ago(1), 180.0));

    let assessment = engine().burnout(&records, &window);

    assert_eq!(assessment.risk_score, 35.0);
    assert_eq!(assessment.score_level, RiskLevel::Medium);
}

#[test]
fn mostly_stressed_sessions_count_as_high_stress() {
    let records = vec![
        work_session(at(2025, 3, 17, 10), 4.0).with_number("stress_level", 8.0),
        work_session(at(2025, 3, 18, 10), 4.0).with_number("stress_level", 9.0),
        work_session(at(2025, 3, 19, 10), 4.0).with_number("stress_level", 7.0),
    ];
    let window = TimeWindow::single(Period::Week, now()).expect("window");

    let assessment = engine().burnout(&records, &window);
    let stress = assessment
        .factor(BurnoutFactorKind::HighStress)
        .expect("stress factor");

    assert!(stress.value.is_some_and(|share| (share - 200.0 / 3.0).abs() < 1e-9));
    assert_eq!(stress.status, FactorStatus::Critical);
    assert_eq!(assessment.risk_score, 20.0);
    assert!(assessment.recommendations.contains(
        &"Practice stress management techniques and consider talking to a professional"
            .to_string()
    ));

    let assessment = engine().burnout(&records[1..], &window);
    let stress = assessment
        .factor(BurnoutFactorKind::HighStress)
        .expect("stress factor");
    assert_eq!(stress.value, Some(50.0));
    assert_eq!(stress.status, FactorStatus::Good);
    assert_eq!(assessment.risk_score, 0.0);
}

#[test]
fn sessions_at_unusual_hours_form_an_always_on_pattern() {
    let records = vec![
        work_session(at(2025, 3, 15, 10), 2.0),
        work_session(at(2025, 3, 17, 21), 1.0),
        work_session(at(2025, 3, 18, 5), 1.0),
        work_session(at(2025, 3, 19, 9), 8.0),
    ];
    let window = TimeWindow::single(Period::Week, now()).expect("window");

    let assessment = engine().burnout(&records, &window);

    assert_eq!(
        assessment.always_on,
        AlwaysOnPatterns {
            evening: 1,
            weekend: 1,
            early_morning: 1,
        }
    );
    let always_on = assessment
        .factor(BurnoutFactorKind::AlwaysOn)
        .expect("always-on factor");
    assert_eq!(always_on.value, Some(3.0));
    assert_eq!(always_on.status, FactorStatus::Warning);
    assert_eq!(assessment.risk_score, 15.0);
    assert!(assessment.recommendations.contains(
        &"Set clear work hours and disconnect from work communications after hours".to_string()
    ));

    let late_nights: Vec<Record> = (13..=18)
        .map(|day| work_session(at(2025, 3, day, 21), 1.0))
        .collect();
    let assessment = engine().burnout(&late_nights, &window);

    assert_eq!(assessment.always_on.evening, 6);
    assert_eq!(assessment.always_on.weekend, 2);
    assert_eq!(
        assessment
            .factor(BurnoutFactorKind::AlwaysOn)
            .expect("always-on factor")
            .status,
        FactorStatus::Critical
    );
    assert_eq!(assessment.risk_score, 15.0);
}

#[test]
fn balance_score_blends_social_ratio_energy_and_overtime() {
    let records = vec![
        work_session(at(2025, 3, 17, 9), 10.0).with_number("is_overtime", 1.0),
        work_session(at(2025, 3, 18, 9), 10.0).with_category("is_overtime", "true"),
        social(at(2025, 3, 16, 12), 10.0),
        energy(days_ago(1), 7.0),
        energy(days_ago(2), 9.0),
    ];
    let window = TimeWindow::single(Period::Week, now()).expect("window");

    let balance = engine().balance_score(&records, &window);

    assert_eq!(balance.work_hours, 20.0);
    assert_eq!(balance.social_hours, 10.0);
    assert_eq!(balance.overtime_sessions, 2);
    assert_eq!(balance.score, 86.0);
    assert_eq!(engine().burnout(&records, &window).balance, balance);

    let no_social = &records[..2];
    assert_eq!(engine().balance_score(no_social, &window).score, 46.0);

    let without_work = engine().balance_score(&records[2..], &window);
    assert_eq!(without_work.score, 50.0);
    assert_eq!(without_work.overtime_sessions, 0);
}
