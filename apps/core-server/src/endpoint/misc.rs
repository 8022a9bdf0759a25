use axum::extract::State;
use axum::http::StatusCode;

use crate::router::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 204, description = "No content")
    ),
    tag = "other",
    summary = "Liveness probe",
    description = "Replies as soon as the HTTP layer is up.",
)]
pub(crate) async fn health_check() -> StatusCode {
    StatusCode::NO_CONTENT
}

#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "All event handlers are attached to the broker"),
        (status = 503, description = "At least one event handler lost its broker connection"),
    ),
    tag = "other",
    summary = "Readiness probe",
    description = "Reports whether the broker bound event handlers are receiving.",
)]
pub(crate) async fn health_ready(state: State<AppState>) -> StatusCode {
    if state.core.handlers.alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
