/*
 * Responsibility
 * - GET /health/ping (疎通用, DB に触れない)
 * - GET /health/db   (session を開いて DB の応答を確認)
 */
use axum::{Json, extract::State, http::StatusCode};

use crate::{
    api::v1::dto::health::HealthResponse,
    services::health::{DatabaseCheckUseCase, HealthCheckUseCase},
    state::AppState,
};

pub async fn ping() -> Json<HealthResponse> {
    Json(HealthCheckUseCase.execute().await.into())
}

pub async fn database(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let report = DatabaseCheckUseCase::new(state.sessions).execute().await;

    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report.into()))
}
