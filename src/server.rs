//! HTTP surface: the form page, a JSON prediction endpoint and health checks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::error::MedcostError;
use crate::features::FormInput;
use crate::inference::Predictor;
use crate::page::{render_page, Outcome};
use crate::report::Report;
use crate::simulation::SimulatedDistribution;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    predictor: Arc<Predictor>,
    distribution: Arc<SimulatedDistribution>,
    processing_delay: Duration,
}

impl AppState {
    /// Bundles the loaded artifacts with the precomputed chart data.
    pub fn new(
        predictor: Predictor,
        distribution: SimulatedDistribution,
        processing_delay: Duration,
    ) -> Self {
        Self {
            predictor: Arc::new(predictor),
            distribution: Arc::new(distribution),
            processing_delay,
        }
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(healthz))
        .route("/v1/predict", post(predict_handler))
        .route("/v1/distribution", get(distribution_handler))
        .with_state(state)
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Failure description.
    pub message: String,
}

/// Liveness check.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Renders the form, running the full pipeline for the submitted (or default) inputs.
pub async fn index(
    State(state): State<AppState>,
    Query(form): Query<FormInput>,
) -> (StatusCode, Html<String>) {
    if !state.processing_delay.is_zero() {
        tokio::time::sleep(state.processing_delay).await;
    }
    match build_report(&state.predictor, &form) {
        Ok(report) => {
            tracing::info!(prediction = report.prediction, "page prediction served");
            let html = render_page(&form, Outcome::Estimate(&report), &state.distribution);
            (StatusCode::OK, Html(html))
        }
        Err(err) => {
            tracing::error!(error = %err, "page prediction failed");
            let message = err.to_string();
            let html = render_page(&form, Outcome::Failure(&message), &state.distribution);
            (StatusCode::INTERNAL_SERVER_ERROR, Html(html))
        }
    }
}

/// Returns the report for a JSON form submission.
pub async fn predict_handler(
    State(state): State<AppState>,
    Json(form): Json<FormInput>,
) -> Result<Json<Report>, (StatusCode, Json<ErrorBody>)> {
    let start = Instant::now();
    let report = build_report(&state.predictor, &form).map_err(internal_error)?;
    tracing::info!(
        prediction = report.prediction,
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "api prediction served"
    );
    Ok(Json(report))
}

/// Returns the simulated distribution chart data.
pub async fn distribution_handler(State(state): State<AppState>) -> Json<SimulatedDistribution> {
    Json(state.distribution.as_ref().clone())
}

fn build_report(predictor: &Predictor, form: &FormInput) -> Result<Report, MedcostError> {
    let features = form.to_features();
    let prediction = predictor.predict(&features)?;
    Ok(Report::new(features, prediction))
}

fn internal_error(err: MedcostError) -> (StatusCode, Json<ErrorBody>) {
    tracing::error!(error = %err, "api prediction failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            message: err.to_string(),
        }),
    )
}
