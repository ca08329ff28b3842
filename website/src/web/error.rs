use askama::Template;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use tracing::error;

use crate::{error::ErrorInfo, models::TemplateData, run::AppState};

use super::HTML_CONTENT_TYPE;

#[derive(Clone, Template)]
#[template(path = "pages/error.html")]
struct ErrorPageData {
    t: TemplateData,
    error: ErrorInfo,
}

pub async fn error_handler(State(state): State<AppState>) -> Response<Body> {
    handle_error(
        &state,
        ErrorInfo {
            status_code: StatusCode::NOT_FOUND,
            title: String::from("Not Found"),
            message: String::from("The page you are looking for cannot be found."),
        },
    )
}

/// Render an error page
pub fn handle_error(state: &AppState, error: ErrorInfo) -> Response<Body> {
    let status_code = error.status_code;

    let mut t = TemplateData::new(state);
    t.title = error.title.clone();

    let tpl = ErrorPageData { t, error };

    let body = match tpl.render() {
        Ok(html) => Body::from(html),
        Err(e) => {
            error!("Failed to render error page: {}", e);
            Body::from(tpl.error.message)
        }
    };

    let mut res = Response::new(body);
    *res.status_mut() = status_code;
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(HTML_CONTENT_TYPE),
    );
    res
}
