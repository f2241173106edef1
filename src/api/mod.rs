/*
 * Responsibility
 * - API version ごとの router を束ねる (/api/v1, /api/v2 ...)
 */
use axum::Router;

use crate::state::AppState;

pub mod v1;

pub fn routes() -> Router<AppState> {
    Router::new().nest("/v1", v1::routes())
}
