use axum::http::{StatusCode, header};
use axum::{body::Body, response::Response};
use snafu::ResultExt;

use crate::Result;
use crate::error::ResponseBuilderSnafu;

use super::HTML_CONTENT_TYPE;

pub fn html_response(status: StatusCode, html: String) -> Result<Response<Body>> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, HTML_CONTENT_TYPE)
        .body(Body::from(html))
        .context(ResponseBuilderSnafu)
}

pub fn json_response(status: StatusCode, data: String) -> Result<Response<Body>> {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(data))
        .context(ResponseBuilderSnafu)
}
