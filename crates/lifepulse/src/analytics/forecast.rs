use super::domain::{reject, AnalyticsError, Goal, Record, TransactionKind};
use super::window::{Period, TimeWindow};
use chrono::{Months, NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Maximum number of monthly steps in a projection series.
pub const PROJECTION_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub month: u32,
    pub date: NaiveDate,
    pub amount: f64,
}

/// Freshly computed goal outlook. Nothing here is cached between calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    pub goal: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub remaining: f64,
    pub monthly_rate: f64,
    pub target_date: NaiveDate,
    pub months_remaining: Option<u32>,
    pub predicted_completion_date: Option<NaiveDate>,
    pub on_track: bool,
    pub message: String,
    pub projection: Vec<ProjectionPoint>,
}

/// Projects `goal` forward at `monthly_rate` from `today`.
pub fn forecast(goal: &Goal, monthly_rate: f64, today: NaiveDate) -> ForecastResult {
    let remaining = goal.remaining();
    let rate = if monthly_rate.is_finite() { monthly_rate } else { 0.0 };
    let projection = project(goal, rate, today);

    let base = ForecastResult {
        goal: goal.name().to_string(),
        target_amount: goal.target_amount(),
        current_amount: goal.current_amount(),
        remaining: remaining.max(0.0),
        monthly_rate: rate,
        target_date: goal.target_date(),
        months_remaining: None,
        predicted_completion_date: None,
        on_track: false,
        message: String::new(),
        projection,
    };

    if remaining <= 0.0 {
        return ForecastResult {
            months_remaining: Some(0),
            predicted_completion_date: Some(today),
            on_track: true,
            message: "goal achieved".to_string(),
            ..base
        };
    }

    if rate <= 0.0 {
        return ForecastResult {
            message: "no savings detected".to_string(),
            ..base
        };
    }

    let months_needed = (remaining / rate).ceil();
    let Some(months) = (months_needed <= f64::from(u32::MAX)).then_some(months_needed as u32)
    else {
        return ForecastResult {
            message: "completion is beyond the forecast range".to_string(),
            ..base
        };
    };

    let Some(predicted) = today.checked_add_months(Months::new(months)) else {
        return ForecastResult {
            months_remaining: Some(months),
            message: "completion is beyond the forecast range".to_string(),
            ..base
        };
    };

    let on_track = predicted <= goal.target_date();
    let message = if goal.target_date() < today {
        format!("target date has passed; {months} more month(s) needed")
    } else if on_track {
        format!("on track to finish in {months} month(s)")
    } else {
        format!("behind schedule; {months} month(s) needed at the current rate")
    };

    ForecastResult {
        months_remaining: Some(months),
        predicted_completion_date: Some(predicted),
        on_track,
        message,
        ..base
    }
}

fn project(goal: &Goal, rate: f64, today: NaiveDate) -> Vec<ProjectionPoint> {
    let target = goal.target_amount();
    let mut amount = goal.current_amount();
    let mut points = vec![ProjectionPoint {
        month: 0,
        date: today,
        amount: amount.min(target),
    }];

    if rate <= 0.0 {
        return points;
    }

    for month in 1..=PROJECTION_MONTHS {
        if amount >= target {
            break;
        }
        let Some(date) = today.checked_add_months(Months::new(month)) else {
            break;
        };
        amount += rate;
        points.push(ProjectionPoint {
            month,
            date,
            amount: amount.min(target),
        });
    }

    points
}

/// Income and expense totals over a look-back window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetRate {
    pub income: f64,
    pub expense: f64,
    pub months: u32,
    pub monthly_rate: f64,
}

impl NetRate {
    pub fn net(&self) -> f64 {
        self.income - self.expense
    }

    /// Net as a percentage of income; `None` without income.
    pub fn savings_rate(&self) -> Option<f64> {
        (self.income > 0.0).then(|| self.net() * 100.0 / self.income)
    }

    pub fn monthly_income(&self) -> f64 {
        self.income / f64::from(self.months)
    }
}

/// Averages `income - expense` per month over the last `lookback_months` months.
pub fn monthly_net_rate<'a, I>(
    records: I,
    now: NaiveDateTime,
    lookback_months: u32,
) -> Result<NetRate, AnalyticsError>
where
    I: IntoIterator<Item = &'a Record>,
{
    if lookback_months == 0 {
        return reject(AnalyticsError::InvalidLookback);
    }

    let window = TimeWindow::new(Period::Month, lookback_months, now)?;
    let (income, expense) = records
        .into_iter()
        .filter(|record| window.contains(record.timestamp))
        .filter_map(|record| {
            let amount = record.number("amount").filter(|value| value.is_finite())?;
            Some((record.transaction_kind()?, amount.abs()))
        })
        .fold((0.0, 0.0), |(income, expense), (kind, amount)| match kind {
            TransactionKind::Income => (income + amount, expense),
            TransactionKind::Expense => (income, expense + amount),
        });

    Ok(NetRate {
        income,
        expense,
        months: lookback_months,
        monthly_rate: (income - expense) / f64::from(lookback_months),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date")
    }

    fn goal(target: f64, current: f64, target_date: NaiveDate) -> Goal {
        Goal::new("Vacation", target, current, target_date).expect("valid goal")
    }

    #[test]
    fn achieved_goal_is_on_track_regardless_of_rate() {
        let past = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
        let result = forecast(&goal(1000.0, 1200.0, past), -50.0, today());
        assert!(result.on_track);
        assert_eq!(result.months_remaining, Some(0));
        assert_eq!(result.predicted_completion_date, Some(today()));
        assert_eq!(result.remaining, 0.0);
    }

    #[test]
    fn non_positive_rate_has_no_prediction() {
        let target_date = NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date");
        let result = forecast(&goal(5000.0, 1000.0, target_date), 0.0, today());
        assert!(!result.on_track);
        assert_eq!(result.message, "no savings detected");
        assert_eq!(result.predicted_completion_date, None);
        assert_eq!(result.projection.len(), 1);
    }

    #[test]
    fn past_target_date_is_never_on_track() {
        let past = NaiveDate::from_ymd_opt(2024, 12, 1).expect("valid date");
        let result = forecast(&goal(5000.0, 4900.0, past), 10_000.0, today());
        assert!(!result.on_track);
        assert_eq!(result.months_remaining, Some(1));
    }

    #[test]
    fn projection_stops_at_target() {
        let target_date = NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date");
        let result = forecast(&goal(1000.0, 0.0, target_date), 300.0, today());
        let amounts: Vec<f64> = result.projection.iter().map(|point| point.amount).collect();
        assert_eq!(amounts, vec![0.0, 300.0, 600.0, 900.0, 1000.0]);
        assert_eq!(result.months_remaining, Some(4));
    }

    #[test]
    fn projection_is_bounded_to_twelve_steps() {
        let target_date = NaiveDate::from_ymd_opt(2030, 1, 1).expect("valid date");
        let result = forecast(&goal(100_000.0, 0.0, target_date), 100.0, today());
        assert_eq!(result.projection.len(), 13);
        assert_eq!(result.projection[12].month, 12);
    }

    #[test]
    fn tiny_rates_do_not_overflow_dates() {
        let target_date = NaiveDate::from_ymd_opt(2030, 1, 1).expect("valid date");
        let result = forecast(&goal(1.0e12, 0.0, target_date), 1.0e-6, today());
        assert!(!result.on_track);
        assert_eq!(result.predicted_completion_date, None);
    }
}
