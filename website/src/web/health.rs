use axum::{body::Body, extract::State, http::StatusCode, response::Response};
use snafu::ResultExt;

use crate::{
    Result,
    error::JsonOutputSnafu,
    run::AppState,
    services::health::{check_liveness, check_readiness},
};

use super::json_response;

pub async fn health_live_handler() -> Result<Response<Body>> {
    let health = check_liveness();
    json_response(
        StatusCode::OK,
        serde_json::to_string(&health).context(JsonOutputSnafu)?,
    )
}

pub async fn health_ready_handler(State(state): State<AppState>) -> Result<Response<Body>> {
    let health = check_readiness(&state).await;
    let status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    json_response(
        status,
        serde_json::to_string(&health).context(JsonOutputSnafu)?,
    )
}
