use super::domain::{AnalyticsError, Record};
use super::window::TimeWindow;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::debug;

/// Calendar resolution used to bucket records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
    Month,
}

impl FromStr for Granularity {
    type Err = AnalyticsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(AnalyticsError::UnknownName {
                kind: "granularity",
                value: raw.to_string(),
                expected: "day, week or month",
            }),
        }
    }
}

impl Granularity {
    /// First day of the bucket that contains `date`. Weeks start on Monday.
    pub fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Self::Day => date,
            Self::Week => date - Duration::days(i64::from(date.weekday().num_days_from_monday())),
            Self::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// Display label only; ordering always uses the bucket start date.
    pub fn label(self, start: NaiveDate) -> String {
        match self {
            Self::Day => start.format("%a, %b %-d").to_string(),
            Self::Week => format!("Week of {}", start.format("%b %-d")),
            Self::Month => start.format("%b %Y").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct BucketKey {
    pub start: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: BucketKey,
    pub count: usize,
    pub sums: BTreeMap<String, f64>,
}

impl Bucket {
    fn new(granularity: Granularity, start: NaiveDate, fields: &[String]) -> Self {
        Self {
            key: BucketKey {
                start,
                label: granularity.label(start),
            },
            count: 0,
            sums: fields.iter().map(|field| (field.clone(), 0.0)).collect(),
        }
    }

    pub fn sum(&self, field: &str) -> f64 {
        self.sums.get(field).copied().unwrap_or(0.0)
    }

    pub fn average(&self, field: &str) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum(field) / self.count as f64
        }
    }
}

/// Buckets in ascending date order plus the bookkeeping needed to audit them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub granularity: Granularity,
    pub buckets: Vec<Bucket>,
    pub matched: usize,
    pub skipped: usize,
}

impl AggregationResult {
    pub fn total(&self, field: &str) -> f64 {
        self.buckets.iter().map(|bucket| bucket.sum(field)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.matched == 0
    }
}

/// Default extractor: the timestamp the record was logged with.
pub fn recorded_at(record: &Record) -> Option<NaiveDateTime> {
    Some(record.timestamp)
}

/// Filters `records` to `window` and sums `fields` per calendar bucket.
///
/// Records for which `extractor` yields no timestamp are counted as skipped.
/// Missing numeric fields contribute zero.
pub fn aggregate<'a, I, F>(
    records: I,
    extractor: F,
    window: &TimeWindow,
    granularity: Granularity,
    fields: &[String],
) -> AggregationResult
where
    I: IntoIterator<Item = &'a Record>,
    F: Fn(&Record) -> Option<NaiveDateTime>,
{
    let mut buckets: BTreeMap<NaiveDate, Bucket> = BTreeMap::new();
    let mut matched = 0;
    let mut skipped = 0;

    for record in records {
        let Some(timestamp) = extractor(record) else {
            skipped += 1;
            continue;
        };

        if !window.contains(timestamp) {
            continue;
        }

        let start = granularity.bucket_start(timestamp.date());
        let bucket = buckets
            .entry(start)
            .or_insert_with(|| Bucket::new(granularity, start, fields));

        bucket.count += 1;
        for field in fields {
            let value = record.number(field).filter(|value| value.is_finite());
            *bucket.sums.entry(field.clone()).or_insert(0.0) += value.unwrap_or(0.0);
        }
        matched += 1;
    }

    if skipped > 0 {
        debug!(
            target: "lifepulse::aggregate",
            skipped,
            matched,
            "records without a usable timestamp were skipped"
        );
    }

    AggregationResult {
        granularity,
        buckets: buckets.into_values().collect(),
        matched,
        skipped,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub count: usize,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub categories: Vec<CategoryTotal>,
    pub matched: usize,
    pub skipped: usize,
}

impl CategoryBreakdown {
    /// Total for `category`, matched without regard to case.
    pub fn total_for(&self, category: &str) -> f64 {
        let key = category_key(category);
        self.categories
            .iter()
            .filter(|entry| category_key(&entry.category) == key)
            .map(|entry| entry.total)
            .sum()
    }

    pub fn totals(&self) -> Vec<f64> {
        self.categories.iter().map(|entry| entry.total).collect()
    }
}

/// Grouping key for category names: trimmed and lowercased.
fn category_key(category: &str) -> String {
    category.trim().to_lowercase()
}

/// Groups in-window records by a categorical field, largest total first.
///
/// Names that differ only in case share a group, displayed with the first
/// spelling seen.
pub fn aggregate_by_category<'a, I>(
    records: I,
    window: &TimeWindow,
    category_field: &str,
    value_field: &str,
) -> CategoryBreakdown
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut totals: HashMap<String, CategoryTotal> = HashMap::new();
    let mut matched = 0;
    let mut skipped = 0;

    for record in records.into_iter().filter(|r| window.contains(r.timestamp)) {
        let Some(category) = record.category(category_field) else {
            skipped += 1;
            continue;
        };

        let entry = totals
            .entry(category_key(category))
            .or_insert_with(|| CategoryTotal {
                category: category.to_string(),
                count: 0,
                total: 0.0,
            });
        entry.count += 1;
        entry.total += record
            .number(value_field)
            .filter(|value| value.is_finite())
            .unwrap_or(0.0);
        matched += 1;
    }

    if skipped > 0 {
        debug!(
            target: "lifepulse::aggregate",
            skipped,
            category_field,
            "records missing the grouping field were skipped"
        );
    }

    let mut categories: Vec<CategoryTotal> = totals.into_values().collect();
    categories.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });

    CategoryBreakdown {
        categories,
        matched,
        skipped,
    }
}
