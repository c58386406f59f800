use crate::infra::{deserialize_optional_datetime, resolve_now, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::NaiveDateTime;
use lifepulse::analytics::scoring;
use lifepulse::analytics::{
    classify_series, forecast, AggregationResult, Budget, BudgetStatus, BurnoutAssessment,
    CompositeScore, FinanceProfile, FinancialHealthReport, ForecastResult, Goal, Granularity,
    HealthScoreReport, MetricInput, Period, Polarity, Record, RecordDomain, ScoringPolicy,
    SleepAnalysis, TrendAssessment, WindowSpec,
};
use lifepulse::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub(crate) struct AggregateRequest {
    pub(crate) records: Vec<Record>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub(crate) now: Option<NaiveDateTime>,
    pub(crate) window: WindowSpec,
    pub(crate) granularity: Granularity,
    #[serde(default)]
    pub(crate) domain: Option<RecordDomain>,
    #[serde(default)]
    pub(crate) fields: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum PolicyPreset {
    FinancialHealth,
    HealthScore,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PolicySource {
    Preset(PolicyPreset),
    Custom(ScoringPolicy),
}

impl PolicySource {
    fn into_policy(self) -> ScoringPolicy {
        match self {
            PolicySource::Preset(PolicyPreset::FinancialHealth) => scoring::financial_health(),
            PolicySource::Preset(PolicyPreset::HealthScore) => scoring::health_score(),
            PolicySource::Custom(policy) => policy,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) policy: PolicySource,
    pub(crate) inputs: Vec<MetricInput>,
}

/// Three ways to ask for a trend: two totals, a series, or a field compared across windows.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TrendRequest {
    Windows {
        records: Vec<Record>,
        window: WindowSpec,
        field: String,
        #[serde(default)]
        domain: Option<RecordDomain>,
        polarity: Polarity,
        #[serde(default, deserialize_with = "deserialize_optional_datetime")]
        now: Option<NaiveDateTime>,
    },
    Pair {
        recent: f64,
        prior: f64,
        polarity: Polarity,
    },
    Series {
        values: Vec<f64>,
        polarity: Polarity,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastRequest {
    pub(crate) goal: Goal,
    #[serde(default)]
    pub(crate) records: Vec<Record>,
    /// Overrides the rate derived from `records`.
    #[serde(default)]
    pub(crate) monthly_rate: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub(crate) now: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FinancialHealthRequest {
    pub(crate) records: Vec<Record>,
    #[serde(default)]
    pub(crate) profile: FinanceProfile,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub(crate) now: Option<NaiveDateTime>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct BudgetRequest {
    pub(crate) records: Vec<Record>,
    pub(crate) budgets: Vec<Budget>,
    #[serde(default = "month_window")]
    pub(crate) window: WindowSpec,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub(crate) now: Option<NaiveDateTime>,
}

/// Shared shape of the burnout and health score requests.
#[derive(Debug, Deserialize)]
pub(crate) struct WindowedRequest {
    pub(crate) records: Vec<Record>,
    #[serde(default = "week_window")]
    pub(crate) window: WindowSpec,
    #[serde(default, deserialize_with = "deserialize_optional_datetime")]
    pub(crate) now: Option<NaiveDateTime>,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthScoreResponse {
    #[serde(flatten)]
    pub(crate) report: HealthScoreReport,
    pub(crate) sleep: Option<SleepAnalysis>,
}

fn month_window() -> WindowSpec {
    WindowSpec::new(Period::Month, 1)
}

fn week_window() -> WindowSpec {
    WindowSpec::new(Period::Week, 1)
}

pub(crate) fn analytics_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/analytics/aggregate", post(aggregate_endpoint))
        .route("/api/v1/analytics/score", post(score_endpoint))
        .route("/api/v1/analytics/trend", post(trend_endpoint))
        .route("/api/v1/analytics/forecast", post(forecast_endpoint))
        .route(
            "/api/v1/analytics/finance/health",
            post(financial_health_endpoint),
        )
        .route("/api/v1/analytics/finance/budgets", post(budgets_endpoint))
        .route("/api/v1/analytics/worklife/burnout", post(burnout_endpoint))
        .route("/api/v1/analytics/health/score", post(health_score_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn aggregate_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<AggregateRequest>,
) -> Result<Json<AggregationResult>, AppError> {
    let AggregateRequest {
        records,
        now,
        window,
        granularity,
        domain,
        fields,
    } = payload;

    let window = window.resolve(resolve_now(now))?;
    let records: Vec<Record> = match domain {
        Some(domain) => records
            .into_iter()
            .filter(|record| record.domain == domain)
            .collect(),
        None => records,
    };
    debug!(count = records.len(), ?granularity, "aggregating records");

    Ok(Json(
        state
            .engine
            .aggregate(&records, &window, granularity, &fields),
    ))
}

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Json<CompositeScore> {
    let policy = payload.policy.into_policy();
    Json(state.engine.score(&policy, &payload.inputs))
}

pub(crate) async fn trend_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<TrendRequest>,
) -> Result<Json<TrendAssessment>, AppError> {
    let engine = &state.engine;
    let trend = match payload {
        TrendRequest::Windows {
            records,
            window,
            field,
            domain,
            polarity,
            now,
        } => {
            let window = window.resolve(resolve_now(now))?;
            engine.compare_windows(&records, &window, domain, &field, polarity)?
        }
        TrendRequest::Pair {
            recent,
            prior,
            polarity,
        } => engine.trend(recent, prior, polarity),
        TrendRequest::Series { values, polarity } => {
            classify_series(&values, polarity, engine.deadband())
        }
    };

    Ok(Json(trend))
}

pub(crate) async fn forecast_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ForecastRequest>,
) -> Result<Json<ForecastResult>, AppError> {
    let now = resolve_now(payload.now);
    let result = match payload.monthly_rate {
        Some(rate) => forecast(&payload.goal, rate, now.date()),
        None => state
            .engine
            .forecast_goal(&payload.goal, &payload.records, now)?,
    };

    Ok(Json(result))
}

pub(crate) async fn financial_health_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<FinancialHealthRequest>,
) -> Result<Json<FinancialHealthReport>, AppError> {
    let report = state.engine.financial_health(
        &payload.records,
        &payload.profile,
        resolve_now(payload.now),
    )?;
    Ok(Json(report))
}

pub(crate) async fn budgets_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<BudgetRequest>,
) -> Result<Json<Vec<BudgetStatus>>, AppError> {
    let window = payload.window.resolve(resolve_now(payload.now))?;
    Ok(Json(state.engine.budget_statuses(
        &payload.records,
        &payload.budgets,
        &window,
    )))
}

pub(crate) async fn burnout_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<WindowedRequest>,
) -> Result<Json<BurnoutAssessment>, AppError> {
    let window = payload.window.resolve(resolve_now(payload.now))?;
    Ok(Json(state.engine.burnout(&payload.records, &window)))
}

pub(crate) async fn health_score_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<WindowedRequest>,
) -> Result<Json<HealthScoreResponse>, AppError> {
    let window = payload.window.resolve(resolve_now(payload.now))?;
    Ok(Json(HealthScoreResponse {
        report: state.engine.health_score(&payload.records, &window),
        sleep: state.engine.sleep_analysis(&payload.records, &window),
    }))
}
