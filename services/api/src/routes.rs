use crate::error::AppError;
use crate::infra::{
    evaluate_batch_with_timeout, evaluate_with_timeout, reload_context, AppState, ScoringState,
};
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::{DateTime, Utc};
use loan_scoring::scoring::{
    ApplicationInput, BatchFailure, ContextSummary, DecisionResult, FEATURE_SCHEMA_VERSION,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Serialize)]
pub(crate) struct ScoredApplication {
    pub(crate) evaluated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub(crate) result: DecisionResult,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RescoreRequest {
    pub(crate) applications: Vec<ApplicationInput>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RescoreResponse {
    pub(crate) evaluated_at: DateTime<Utc>,
    pub(crate) generation: u64,
    pub(crate) scored: usize,
    pub(crate) failed: usize,
    pub(crate) successes: Vec<DecisionResult>,
    pub(crate) failures: Vec<BatchFailure>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ModelView {
    pub(crate) feature_schema_version: &'static str,
    pub(crate) model_path: String,
    #[serde(flatten)]
    pub(crate) context: ContextSummary,
}

pub(crate) fn router(state: ScoringState) -> Router {
    Router::new()
        .route("/api/v1/applications/score", post(score_handler))
        .route("/api/v1/applications/rescore", post(rescore_handler))
        .route("/api/v1/model", get(model_handler))
        .route("/api/v1/model/reload", post(reload_handler))
        .with_state(state)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn score_handler(
    State(state): State<ScoringState>,
    Json(input): Json<ApplicationInput>,
) -> Response {
    match evaluate_with_timeout(&state, input).await {
        Ok(result) => {
            let body = ScoredApplication {
                evaluated_at: Utc::now(),
                result,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn rescore_handler(
    State(state): State<ScoringState>,
    Json(request): Json<RescoreRequest>,
) -> Response {
    match evaluate_batch_with_timeout(&state, request.applications).await {
        Ok(outcome) => {
            let body = RescoreResponse {
                evaluated_at: Utc::now(),
                generation: outcome.generation,
                scored: outcome.successes.len(),
                failed: outcome.failures.len(),
                successes: outcome.successes,
                failures: outcome.failures,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn model_handler(State(state): State<ScoringState>) -> Json<ModelView> {
    Json(ModelView {
        feature_schema_version: FEATURE_SCHEMA_VERSION,
        model_path: state.settings.model_path.display().to_string(),
        context: state.service.summary(),
    })
}

pub(crate) async fn reload_handler(State(state): State<ScoringState>) -> Response {
    match reload_context(&state).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "model reload failed; keeping current context");
            err.into_response()
        }
    }
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
