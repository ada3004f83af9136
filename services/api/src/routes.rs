use crate::infra::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use egogram::assessment::{
    catalog_view, compute_all_scores, export_report, render_chart, AssessmentSummary,
    CatalogView, ChartStyle, Instrument, RatingEntry, RatingSheet,
};
use egogram::error::AppError;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

/// Ratings submitted by a client; statements without an entry keep the neutral rating.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AssessmentRequest {
    #[serde(default)]
    pub(crate) ratings: Vec<RatingEntry>,
}

/// Body extraction result; malformed JSON and type mismatches surface as `AppError::Request`.
type AssessmentBody = Result<Json<AssessmentRequest>, JsonRejection>;

impl AssessmentRequest {
    fn sheet_from(body: AssessmentBody) -> Result<RatingSheet, AppError> {
        let Json(request) = body?;
        Ok(RatingSheet::from_entries(request.ratings)?)
    }
}

pub(crate) fn assessment_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/catalog", get(catalog_endpoint))
        .route("/api/v1/assessment/scores", post(scores_endpoint))
        .route("/api/v1/assessment/charts/:instrument", post(chart_endpoint))
        .route("/api/v1/assessment/report", post(report_endpoint))
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

pub(crate) async fn catalog_endpoint() -> Json<CatalogView> {
    Json(catalog_view())
}

pub(crate) async fn scores_endpoint(
    payload: AssessmentBody,
) -> Result<Json<AssessmentSummary>, AppError> {
    let sheet = AssessmentRequest::sheet_from(payload)?;
    let scores = compute_all_scores(&sheet)?;
    Ok(Json(scores.summary()))
}

pub(crate) async fn chart_endpoint(
    Path(instrument): Path<String>,
    payload: AssessmentBody,
) -> Result<Response, AppError> {
    let instrument = match instrument.parse::<Instrument>() {
        Ok(instrument) => instrument,
        Err(err) => {
            return Ok((
                StatusCode::NOT_FOUND,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response())
        }
    };

    let sheet = AssessmentRequest::sheet_from(payload)?;
    let scores = compute_all_scores(&sheet)?;
    let png = render_chart(
        scores.get(instrument).dimensions(),
        &ChartStyle::for_instrument(instrument),
    )?;
    info!(instrument = instrument.key(), bytes = png.len(), "chart rendered");

    Ok((
        [(header::CONTENT_TYPE, mime::IMAGE_PNG.as_ref())],
        png,
    )
        .into_response())
}

pub(crate) async fn report_endpoint(
    Extension(state): Extension<AppState>,
    payload: AssessmentBody,
) -> Result<Response, AppError> {
    let sheet = AssessmentRequest::sheet_from(payload)?;
    let scores = compute_all_scores(&sheet)?;
    let pdf = export_report(&scores)?;

    let disposition = format!("attachment; filename=\"{}\"", state.report.file_name);
    info!(bytes = pdf.len(), file_name = %state.report.file_name, "report exported");

    Ok((
        [
            (header::CONTENT_TYPE, mime::APPLICATION_PDF.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    )
        .into_response())
}
