use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::collections::HashMap;

use crate::core::metrics;
use crate::core::state::AppState;
use crate::schemas::{HealthResponse, RootResponse};

pub(crate) async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    let response = RootResponse {
        message: state.settings().api().project_name.clone(),
        version: state.settings().api().version.clone(),
        environment: state.settings().runtime().environment.as_str().to_string(),
    };

    Json(response)
}

pub(crate) async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut components = HashMap::new();

    let status = match state.source().ping().await {
        Ok(()) => {
            components.insert("data_root".to_string(), "healthy".to_string());
            StatusCode::OK
        }
        Err(err) => {
            tracing::warn!(error = %err, "Data root health check failed");
            components.insert("data_root".to_string(), format!("unhealthy: {err}"));
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let label = if status.is_success() { "healthy" } else { "unhealthy" };
    (
        status,
        Json(HealthResponse {
            service: "submission-roster".to_string(),
            status: label.to_string(),
            components,
        }),
    )
}

pub(crate) async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    if !state.settings().telemetry().prometheus_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    match metrics::render() {
        Some(body) => ([(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
            .into_response(),
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
