/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health を nest (bounded context ごとに router を分ける)
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::health::{database, ping};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().nest("/health", health_routes())
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/db", get(database))
}
