use crate::infra::{parse_date, parse_datetime, resolve_now};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Args;
use lifepulse::analytics::{
    forecast, AggregationResult, AnalyticsEngine, FinanceProfile, ForecastResult, Goal,
    Granularity, Period, Record, RecordDomain, TimeWindow,
};
use lifepulse::config::AppConfig;
use lifepulse::error::AppError;
use lifepulse::records::load_records_from_path;
use std::path::PathBuf;
use tracing::info;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// CSV export with `timestamp`, `domain` and field columns
    #[arg(long)]
    pub(crate) records: PathBuf,
    /// Reporting time (defaults to now)
    #[arg(long, value_parser = parse_datetime)]
    pub(crate) now: Option<NaiveDateTime>,
    /// Window length unit: day, week, month or year
    #[arg(long, default_value = "month")]
    pub(crate) window: Period,
    /// Number of window units to look back
    #[arg(long, default_value_t = 1)]
    pub(crate) count: u32,
    /// Bucket size: day, week or month
    #[arg(long, default_value = "week")]
    pub(crate) granularity: Granularity,
    /// Numeric fields to total per bucket (repeatable)
    #[arg(long = "field")]
    pub(crate) fields: Vec<String>,
}

#[derive(Args, Debug)]
pub(crate) struct ForecastArgs {
    /// Goal name shown in the output
    #[arg(long, default_value = "Savings goal")]
    pub(crate) name: String,
    /// Amount to reach
    #[arg(long)]
    pub(crate) target: f64,
    /// Amount already saved
    #[arg(long, default_value_t = 0.0)]
    pub(crate) current: f64,
    /// Date the goal should be reached by (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) target_date: NaiveDate,
    /// CSV export used to derive the monthly savings rate
    #[arg(long)]
    pub(crate) records: Option<PathBuf>,
    /// Monthly savings rate; overrides the rate derived from records
    #[arg(long)]
    pub(crate) rate: Option<f64>,
    /// Reporting time (defaults to now)
    #[arg(long, value_parser = parse_datetime)]
    pub(crate) now: Option<NaiveDateTime>,
}

fn load_engine() -> Result<AnalyticsEngine, AppError> {
    let config = AppConfig::load()?;
    Ok(AnalyticsEngine::new(config.analytics.engine_config())?)
}

pub(crate) fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs {
        records,
        now,
        window,
        count,
        granularity,
        fields,
    } = args;

    let engine = load_engine()?;
    let records = load_records_from_path(&records)?;
    let now = resolve_now(now);
    let period = window;
    let window = TimeWindow::new(period, count, now)?;
    info!(records = records.len(), %now, "building analytics report");

    println!(
        "Window: {count} x {} from {} to {}",
        period.label(),
        window.cutoff(),
        window.now()
    );
    for line in domain_lines(&records, &window) {
        println!("{line}");
    }

    let aggregation = engine.aggregate(&records, &window, granularity, &fields);
    for line in aggregation_lines(&aggregation, &fields) {
        println!("{line}");
    }

    render_dashboards(&engine, &records, &window, now)
}

fn render_dashboards(
    engine: &AnalyticsEngine,
    records: &[Record],
    window: &TimeWindow,
    now: NaiveDateTime,
) -> Result<(), AppError> {
    let finance = engine.financial_health(records, &FinanceProfile::default(), now)?;
    println!(
        "\nFinancial health: {:.1}/{:.0} ({}, grade {})",
        finance.score.total,
        finance.score.max,
        finance.band.label(),
        finance.score.grade.label()
    );
    if let Some(rate) = finance.savings_rate {
        println!("- savings rate {rate:.1}% | net {:.2} per month", finance.net.monthly_rate);
    }
    for category in finance.spending.categories.iter().take(5) {
        println!("- {}: {:.2} across {} expense(s)", category.category, category.total, category.count);
    }

    let burnout = engine.burnout(records, window);
    println!(
        "\nBurnout risk: {} (score {:.0})",
        burnout.overall_risk.label(),
        burnout.risk_score
    );
    for factor in &burnout.factors {
        let trend = factor
            .trend
            .map(|trend| format!(" [{}]", trend.label.label()))
            .unwrap_or_default();
        println!(
            "- {} ({}): {}{}",
            factor.kind.label(),
            factor.status.label(),
            factor.detail,
            trend
        );
    }
    println!(
        "- work-life balance {:.0}/100 ({:.1}h work, {:.1}h social)",
        burnout.balance.score, burnout.balance.work_hours, burnout.balance.social_hours
    );

    let health = engine.health_score(records, window);
    println!(
        "\nHealth score: {:.1}/{:.0} ({})",
        health.score.total,
        health.score.max,
        health.band.label()
    );
    if let Some(sleep) = engine.sleep_analysis(records, window) {
        println!(
            "- sleep {:.1}h over {} night(s)",
            sleep.average_hours, sleep.nights_tracked
        );
    }

    println!("\nRecommendations:");
    for advice in finance.recommendations.iter().chain(&burnout.recommendations) {
        println!("- {advice}");
    }

    Ok(())
}

/// Per-domain record counts inside `window`, skipping empty domains.
fn domain_lines(records: &[Record], window: &TimeWindow) -> Vec<String> {
    RecordDomain::ordered()
        .into_iter()
        .filter_map(|domain| {
            let count = records
                .iter()
                .filter(|record| record.domain == domain && window.contains(record.timestamp))
                .count();
            (count > 0).then(|| format!("- {}: {count} record(s)", domain.label()))
        })
        .collect()
}

fn aggregation_lines(result: &AggregationResult, fields: &[String]) -> Vec<String> {
    let mut lines = vec![format!(
        "{} record(s) in {} bucket(s), {} skipped",
        result.matched,
        result.buckets.len(),
        result.skipped
    )];

    for bucket in &result.buckets {
        let sums: Vec<String> = fields
            .iter()
            .map(|field| format!("{field}={:.2}", bucket.sum(field)))
            .collect();
        let mut line = format!("- {}: {} record(s)", bucket.key.label, bucket.count);
        if !sums.is_empty() {
            line.push_str(" | ");
            line.push_str(&sums.join(", "));
        }
        lines.push(line);
    }

    lines
}

pub(crate) fn run_forecast(args: ForecastArgs) -> Result<(), AppError> {
    let ForecastArgs {
        name,
        target,
        current,
        target_date,
        records,
        rate,
        now,
    } = args;

    let goal = Goal::new(name, target, current, target_date)?;
    let now = resolve_now(now);

    let result = match (rate, records) {
        (Some(rate), _) => forecast(&goal, rate, now.date()),
        (None, Some(path)) => {
            let records = load_records_from_path(&path)?;
            load_engine()?.forecast_goal(&goal, &records, now)?
        }
        (None, None) => forecast(&goal, 0.0, now.date()),
    };

    for line in forecast_lines(&result) {
        println!("{line}");
    }
    Ok(())
}

fn forecast_lines(result: &ForecastResult) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{}: {:.2} of {:.2} saved, {:.2} to go",
            result.goal, result.current_amount, result.target_amount, result.remaining
        ),
        format!("Monthly rate: {:.2}", result.monthly_rate),
    ];

    if let Some(date) = result.predicted_completion_date {
        lines.push(format!(
            "Predicted completion: {} (target {})",
            date, result.target_date
        ));
    }
    lines.push(format!(
        "Status: {} ({})",
        if result.on_track { "on track" } else { "off track" },
        result.message
    ));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_lines_count_records_inside_the_window() {
        let now = NaiveDate::from_ymd_opt(2025, 3, 19)
            .and_then(|date| date.and_hms_opt(18, 0, 0))
            .expect("valid timestamp");
        let window = TimeWindow::new(Period::Week, 1, now).expect("window");
        let records = vec![
            Record::new(RecordDomain::WorkSession, now),
            Record::new(RecordDomain::WorkSession, now - chrono::Duration::days(2)),
            Record::new(RecordDomain::Energy, now - chrono::Duration::days(1)),
            Record::new(RecordDomain::Sleep, now - chrono::Duration::days(30)),
        ];

        let lines = domain_lines(&records, &window);

        assert_eq!(
            lines,
            vec![
                "- Work Session: 2 record(s)".to_string(),
                "- Energy Level: 1 record(s)".to_string(),
            ]
        );
    }

    #[test]
    fn forecast_lines_report_status() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid date");
        let target_date = NaiveDate::from_ymd_opt(2025, 7, 31).expect("valid date");
        let goal = Goal::new("Bike", 600.0, 300.0, target_date).expect("valid goal");

        let lines = forecast_lines(&forecast(&goal, 50.0, today));

        assert_eq!(lines[0], "Bike: 300.00 of 600.00 saved, 300.00 to go");
        assert_eq!(lines[2], "Predicted completion: 2025-07-31 (target 2025-07-31)");
        assert!(lines[3].starts_with("Status: on track"));
    }

    #[test]
    fn forecast_without_rate_is_off_track() {
        let today = NaiveDate::from_ymd_opt(2025, 1, 31).expect("valid date");
        let goal = Goal::new("Bike", 600.0, 0.0, today).expect("valid goal");

        let lines = forecast_lines(&forecast(&goal, 0.0, today));

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "Status: off track (no savings detected)");
    }
}
