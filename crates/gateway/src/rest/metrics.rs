use axum::{extract::State, http::header, response::IntoResponse};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

/// Delivery counters in the Prometheus text exposition format.
pub async fn render_metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = state.metrics.render().map_err(|error| {
        tracing::error!(error = ?error, "failed to render metrics");
        ApiError::internal("failed to render metrics")
    })?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}
