use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::Response,
};
use snafu::ResultExt;

use crate::{
    Result,
    error::ResponseBuilderSnafu,
    run::AppState,
    services::logs::{log_download_name, read_log_svc},
};

pub async fn download_log_handler(State(state): State<AppState>) -> Result<Response<Body>> {
    let contents = read_log_svc(&state).await?;
    let disposition = format!("attachment; filename=\"{}\"", log_download_name(&state));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(header::CONTENT_DISPOSITION, disposition)
        .body(Body::from(contents))
        .context(ResponseBuilderSnafu)
}
