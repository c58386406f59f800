use super::domain::{reject, AnalyticsError};
use chrono::{Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl FromStr for Period {
    type Err = AnalyticsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(AnalyticsError::UnknownName {
                kind: "period",
                value: raw.to_string(),
                expected: "day, week, month or year",
            }),
        }
    }
}

impl Period {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Week => "Week",
            Self::Month => "Month",
            Self::Year => "Year",
        }
    }

    /// Steps back `count` periods. Month and year arithmetic is calendar based and
    /// clamps to the last valid day of the target month (Mar 31 - 1 month = Feb 28/29).
    pub fn step_back(self, from: NaiveDateTime, count: u32) -> Option<NaiveDateTime> {
        match self {
            Self::Day => from.checked_sub_signed(Duration::days(i64::from(count))),
            Self::Week => from.checked_sub_signed(Duration::weeks(i64::from(count))),
            Self::Month => from.checked_sub_months(Months::new(count)),
            Self::Year => from.checked_sub_months(Months::new(count.checked_mul(12)?)),
        }
    }
}

/// Serializable description of a window, resolved against an explicit `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSpec {
    pub period: Period,
    #[serde(default = "default_count")]
    pub count: u32,
}

fn default_count() -> u32 {
    1
}

impl WindowSpec {
    pub fn new(period: Period, count: u32) -> Self {
        Self { period, count }
    }

    pub fn resolve(&self, now: NaiveDateTime) -> Result<TimeWindow, AnalyticsError> {
        TimeWindow::new(self.period, self.count, now)
    }
}

/// A look-back range ending at `now`.
///
/// Membership is `cutoff <= ts <= now`. Windows produced by [`TimeWindow::preceding`]
/// exclude their upper bound so adjacent windows never share a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    period: Period,
    count: u32,
    now: NaiveDateTime,
    cutoff: NaiveDateTime,
    includes_now: bool,
}

impl TimeWindow {
    pub fn new(period: Period, count: u32, now: NaiveDateTime) -> Result<Self, AnalyticsError> {
        Self::build(period, count, now, true)
    }

    pub fn single(period: Period, now: NaiveDateTime) -> Result<Self, AnalyticsError> {
        Self::new(period, 1, now)
    }

    fn build(
        period: Period,
        count: u32,
        now: NaiveDateTime,
        includes_now: bool,
    ) -> Result<Self, AnalyticsError> {
        if count == 0 {
            return reject(AnalyticsError::EmptyWindow);
        }

        let Some(cutoff) = period.step_back(now, count) else {
            return reject(AnalyticsError::WindowOutOfRange);
        };

        debug_assert!(cutoff < now, "cutoff must precede now");

        Ok(Self {
            period,
            count,
            now,
            cutoff,
            includes_now,
        })
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn cutoff(&self) -> NaiveDateTime {
        self.cutoff
    }

    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        if timestamp < self.cutoff {
            return false;
        }

        if self.includes_now {
            timestamp <= self.now
        } else {
            timestamp < self.now
        }
    }

    /// The equal-length window that ends where this one starts.
    pub fn preceding(&self) -> Result<Self, AnalyticsError> {
        Self::build(self.period, self.count, self.cutoff, false)
    }

    pub fn span_days(&self) -> i64 {
        (self.now - self.cutoff).num_days()
    }
}
