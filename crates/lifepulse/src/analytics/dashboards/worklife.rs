use crate::analytics::bands::{
    overall_risk, ColorTier, CountBands, FactorStatus, FactorThresholds, RiskBands, RiskLevel,
};
use crate::analytics::domain::{Record, RecordDomain};
use crate::analytics::stats;
use crate::analytics::trend::{classify, Deadband, Polarity, TrendAssessment};
use crate::analytics::window::TimeWindow;
use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnoutFactorKind {
    WorkHours,
    MeetingLoad,
    Energy,
    HighStress,
    BoundaryViolations,
    AlwaysOn,
}

impl BurnoutFactorKind {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::WorkHours,
            Self::MeetingLoad,
            Self::Energy,
            Self::HighStress,
            Self::BoundaryViolations,
            Self::AlwaysOn,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::WorkHours => "Work Hours",
            Self::MeetingLoad => "Meeting Load",
            Self::Energy => "Energy Level",
            Self::HighStress => "High Stress",
            Self::BoundaryViolations => "Boundary Violations",
            Self::AlwaysOn => "Always-On Pattern",
        }
    }

    pub const fn polarity(self) -> Polarity {
        match self {
            Self::Energy => Polarity::HigherIsBetter,
            Self::WorkHours
            | Self::MeetingLoad
            | Self::HighStress
            | Self::BoundaryViolations
            | Self::AlwaysOn => Polarity::LowerIsBetter,
        }
    }

    /// Risk points added to the burnout score at each status. Only work hours
    /// and energy score at warning; any detected always-on pattern scores.
    const fn risk_points(self, status: FactorStatus) -> f64 {
        match (self, status) {
            (_, FactorStatus::Good) => 0.0,
            (Self::WorkHours | Self::Energy, FactorStatus::Critical) => 25.0,
            (Self::WorkHours | Self::Energy, FactorStatus::Warning) => 15.0,
            (Self::MeetingLoad | Self::HighStress, FactorStatus::Critical) => 20.0,
            (Self::BoundaryViolations, FactorStatus::Critical) => 15.0,
            (Self::AlwaysOn, _) => 15.0,
            (Self::MeetingLoad | Self::HighStress | Self::BoundaryViolations, _) => 0.0,
        }
    }

    const fn advice(self) -> &'static str {
        match self {
            Self::WorkHours => "Reduce working hours to 40-45 hours per week",
            Self::MeetingLoad => {
                "Audit meetings - decline unnecessary ones and batch similar meetings"
            }
            Self::Energy => "Prioritize sleep, exercise, and take regular breaks during the day",
            Self::HighStress => {
                "Practice stress management techniques and consider talking to a professional"
            }
            Self::BoundaryViolations => "Strengthen and enforce your work-life boundaries",
            Self::AlwaysOn => {
                "Set clear work hours and disconnect from work communications after hours"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurnoutFactor {
    pub kind: BurnoutFactorKind,
    pub value: Option<f64>,
    pub status: FactorStatus,
    pub color: ColorTier,
    pub detail: String,
    pub trend: Option<TrendAssessment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BurnoutAssessment {
    pub factors: Vec<BurnoutFactor>,
    /// Sum of factor risk points, capped at 100.
    pub risk_score: f64,
    pub score_level: RiskLevel,
    pub overall_risk: RiskLevel,
    pub color: ColorTier,
    pub recommendations: Vec<String>,
    pub always_on: AlwaysOnPatterns,
    pub balance: BalanceScore,
}

impl BurnoutAssessment {
    pub fn factor(&self, kind: BurnoutFactorKind) -> Option<&BurnoutFactor> {
        self.factors.iter().find(|factor| factor.kind == kind)
    }
}

/// Work sessions started at unusual times. A session can count in more than
/// one pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlwaysOnPatterns {
    /// Started at 20:00 or later.
    pub evening: usize,
    pub weekend: usize,
    /// Started before 06:00.
    pub early_morning: usize,
}

impl AlwaysOnPatterns {
    fn from_sessions<'a>(sessions: impl IntoIterator<Item = &'a Record>) -> Self {
        sessions
            .into_iter()
            .fold(Self::default(), |mut patterns, session| {
                let started = session.timestamp;
                if started.hour() >= 20 {
                    patterns.evening += 1;
                }
                if matches!(started.weekday(), Weekday::Sat | Weekday::Sun) {
                    patterns.weekend += 1;
                }
                if started.hour() < 6 {
                    patterns.early_morning += 1;
                }
                patterns
            })
    }

    pub fn total(&self) -> usize {
        self.evening + self.weekend + self.early_morning
    }

    pub fn detected(&self) -> bool {
        self.total() > 0
    }

    /// Critical once evenings exceed 5 or weekends exceed 3.
    pub fn status(&self) -> FactorStatus {
        if self.evening > 5 || self.weekend > 3 {
            FactorStatus::Critical
        } else if self.detected() {
            FactorStatus::Warning
        } else {
            FactorStatus::Good
        }
    }
}

/// Work-life balance on a 0-100 scale, higher is better.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BalanceScore {
    pub score: f64,
    pub work_hours: f64,
    pub social_hours: f64,
    pub overtime_sessions: usize,
}

const IDEAL_SOCIAL_TO_WORK: f64 = 0.5;
const NEUTRAL_BALANCE: f64 = 50.0;

/// Blends the social-to-work hour ratio (ideal 0.5) with average energy, less
/// 2 points per overtime session up to 20. Without work sessions the score is a
/// neutral 50.
pub fn balance_score(records: &[Record], window: &TimeWindow) -> BalanceScore {
    let in_window: Vec<&Record> = records
        .iter()
        .filter(|record| window.contains(record.timestamp))
        .collect();
    let sessions: Vec<&Record> = of_domain(&in_window, RecordDomain::WorkSession).collect();
    let hours = |record: &Record| finite(record.number("duration_hours")).unwrap_or(0.0);

    let work_hours: f64 = sessions.iter().map(|session| hours(*session)).sum();
    let social_hours: f64 = of_domain(&in_window, RecordDomain::SocialActivity)
        .map(hours)
        .sum();
    let overtime_sessions = sessions.iter().filter(|session| is_overtime(session)).count();

    let score = if sessions.is_empty() {
        NEUTRAL_BALANCE
    } else {
        let ratio_score = if work_hours == 0.0 {
            100.0
        } else {
            (100.0 - (social_hours / work_hours - IDEAL_SOCIAL_TO_WORK).abs() * 100.0).max(0.0)
        };
        let energy: Vec<f64> = of_domain(&in_window, RecordDomain::Energy)
            .filter_map(|record| finite(record.number("energy_score")))
            .collect();
        let energy_score = stats::mean(&energy).map_or(NEUTRAL_BALANCE, |mean| mean * 10.0);
        let penalty = (overtime_sessions as f64 * 2.0).min(20.0);

        (ratio_score * 0.5 + energy_score * 0.5 - penalty)
            .round()
            .clamp(0.0, 100.0)
    };

    BalanceScore {
        score,
        work_hours,
        social_hours,
        overtime_sessions,
    }
}

fn is_overtime(session: &Record) -> bool {
    match session.number("is_overtime") {
        Some(flag) => flag > 0.0,
        None => session.category("is_overtime").is_some_and(|flag| {
            matches!(flag.trim().to_ascii_lowercase().as_str(), "true" | "yes")
        }),
    }
}

/// Raw factor measurements over one window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct FactorValues {
    weekly_hours: Option<f64>,
    meeting_hours: Option<f64>,
    energy: Option<f64>,
    stress_share: Option<f64>,
    violations: Option<f64>,
    always_on: Option<AlwaysOnPatterns>,
}

impl FactorValues {
    fn collect(records: &[Record], window: &TimeWindow) -> Self {
        let in_window: Vec<&Record> = records
            .iter()
            .filter(|record| window.contains(record.timestamp))
            .collect();
        let sessions: Vec<&Record> = of_domain(&in_window, RecordDomain::WorkSession).collect();
        let weekly_hours = (!sessions.is_empty()).then(|| {
            let weeks: BTreeSet<(i32, u32)> = sessions
                .iter()
                .map(|session| {
                    let week = session.timestamp.iso_week();
                    (week.year(), week.week())
                })
                .collect();
            let total: f64 = sessions
                .iter()
                .map(|session| finite(session.number("duration_hours")).unwrap_or(0.0))
                .sum();
            total / weeks.len() as f64
        });
        let stress_share = (!sessions.is_empty()).then(|| {
            let stressed = sessions
                .iter()
                .filter(|session| {
                    finite(session.number("stress_level")).is_some_and(|level| level > 7.0)
                })
                .count();
            stressed as f64 / sessions.len() as f64 * 100.0
        });
        let always_on = (!sessions.is_empty())
            .then(|| AlwaysOnPatterns::from_sessions(sessions.iter().copied()));

        let meetings: Vec<f64> = of_domain(&in_window, RecordDomain::Meeting)
            .map(|record| finite(record.number("duration_minutes")).unwrap_or(0.0))
            .collect();
        let meeting_hours = (!meetings.is_empty()).then(|| meetings.iter().sum::<f64>() / 60.0);

        let energy: Vec<f64> = of_domain(&in_window, RecordDomain::Energy)
            .filter_map(|record| finite(record.number("energy_score")))
            .collect();

        let violations: Vec<f64> = of_domain(&in_window, RecordDomain::BoundaryViolation)
            .map(|record| finite(record.number("count")).unwrap_or(1.0).max(0.0))
            .collect();

        Self {
            weekly_hours,
            meeting_hours,
            energy: stats::mean(&energy),
            stress_share,
            violations: (!violations.is_empty()).then(|| violations.iter().sum()),
            always_on,
        }
    }

    fn get(&self, kind: BurnoutFactorKind) -> Option<f64> {
        match kind {
            BurnoutFactorKind::WorkHours => self.weekly_hours,
            BurnoutFactorKind::MeetingLoad => self.meeting_hours,
            BurnoutFactorKind::Energy => self.energy,
            BurnoutFactorKind::HighStress => self.stress_share,
            BurnoutFactorKind::BoundaryViolations => self.violations,
            BurnoutFactorKind::AlwaysOn => self.always_on.map(|patterns| patterns.total() as f64),
        }
    }

    fn status(&self, kind: BurnoutFactorKind, value: f64) -> FactorStatus {
        match (kind, self.always_on) {
            (BurnoutFactorKind::AlwaysOn, Some(patterns)) => patterns.status(),
            _ => status_for(kind, value),
        }
    }
}

fn of_domain<'a>(
    records: &'a [&'a Record],
    domain: RecordDomain,
) -> impl Iterator<Item = &'a Record> + 'a {
    records
        .iter()
        .copied()
        .filter(move |record| record.domain == domain)
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}

fn status_for(kind: BurnoutFactorKind, value: f64) -> FactorStatus {
    match kind {
        BurnoutFactorKind::WorkHours => FactorThresholds::WEEKLY_WORK_HOURS.classify(value),
        BurnoutFactorKind::MeetingLoad => FactorThresholds::MEETING_HOURS.classify(value),
        BurnoutFactorKind::Energy => FactorThresholds::ENERGY.classify(value),
        BurnoutFactorKind::HighStress => FactorThresholds::HIGH_STRESS_SHARE.classify(value),
        BurnoutFactorKind::AlwaysOn if value > 0.0 => FactorStatus::Warning,
        BurnoutFactorKind::AlwaysOn => FactorStatus::Good,
        BurnoutFactorKind::BoundaryViolations => {
            let count = value.round().clamp(0.0, f64::from(u32::MAX)) as u32;
            CountBands::BOUNDARY_VIOLATIONS.classify(count)
        }
    }
}

fn describe(kind: BurnoutFactorKind, value: f64) -> String {
    match kind {
        BurnoutFactorKind::WorkHours => format!("{value:.1} hours per week"),
        BurnoutFactorKind::MeetingLoad => format!("{value:.1} meeting hours"),
        BurnoutFactorKind::Energy => format!("average energy {value:.1}/10"),
        BurnoutFactorKind::HighStress => format!("{value:.0}% of sessions under high stress"),
        BurnoutFactorKind::BoundaryViolations => format!("{value:.0} violation(s)"),
        BurnoutFactorKind::AlwaysOn => format!("{value:.0} session(s) at unusual hours"),
    }
}

/// Scores burnout factors in `window` and compares each with the preceding window.
pub fn burnout(
    records: &[Record],
    window: &TimeWindow,
    deadband: Deadband,
    risk_bands: &RiskBands,
) -> BurnoutAssessment {
    let current = FactorValues::collect(records, window);
    let prior = window
        .preceding()
        .map(|previous| FactorValues::collect(records, &previous))
        .unwrap_or_default();

    let factors: Vec<BurnoutFactor> = BurnoutFactorKind::ordered()
        .into_iter()
        .map(|kind| {
            let value = current.get(kind);
            let (status, detail) = match value {
                Some(value) => (current.status(kind, value), describe(kind, value)),
                None => (FactorStatus::Good, "no data".to_string()),
            };
            let trend = value
                .zip(prior.get(kind))
                .map(|(recent, before)| classify(recent, before, kind.polarity(), deadband));

            BurnoutFactor {
                kind,
                value,
                status,
                color: status.into(),
                detail,
                trend,
            }
        })
        .collect();

    let risk_score = factors
        .iter()
        .map(|factor| factor.kind.risk_points(factor.status))
        .sum::<f64>()
        .min(100.0);
    let overall = overall_risk(factors.iter().map(|factor| factor.status));

    let mut recommendations: Vec<String> = factors
        .iter()
        .filter(|factor| factor.status != FactorStatus::Good)
        .map(|factor| factor.kind.advice().to_string())
        .collect();
    if recommendations.is_empty() {
        recommendations.push("Continue maintaining healthy work-life balance!".to_string());
    }

    BurnoutAssessment {
        factors,
        risk_score,
        score_level: risk_bands.classify(risk_score),
        overall_risk: overall,
        color: overall.into(),
        recommendations,
        always_on: current.always_on.unwrap_or_default(),
        balance: balance_score(records, window),
    }
}
