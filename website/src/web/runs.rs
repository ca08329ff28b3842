use askama::Template;
use axum::{Form, body::Body, extract::State, http::StatusCode, response::Response};
use snafu::ResultExt;

use autovote::batch::RunResult;

use crate::{
    Result,
    error::TemplateSnafu,
    models::{CsrfFormData, TemplateData},
    run::AppState,
    services::runs::run_all_svc,
};

use super::html_response;

struct RunResultRow {
    token_prefix: String,
    ok: bool,
    status: String,
    body: String,
}

impl From<RunResult> for RunResultRow {
    fn from(result: RunResult) -> Self {
        RunResultRow {
            token_prefix: result.token_prefix,
            ok: result.ok,
            status: result
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "-".to_string()),
            body: result.body.to_display(),
        }
    }
}

#[derive(Template)]
#[template(path = "pages/run_results.html")]
struct RunResultsTemplate {
    t: TemplateData,
    results: Vec<RunResultRow>,
    failed: usize,
}

pub async fn post_run_all_handler(
    State(state): State<AppState>,
    Form(payload): Form<CsrfFormData>,
) -> Result<Response<Body>> {
    let results = run_all_svc(&state, &payload).await?;

    let mut t = TemplateData::new(&state);
    t.title = String::from("Run results");

    let failed = results.iter().filter(|r| !r.ok).count();
    let tpl = RunResultsTemplate {
        t,
        results: results.into_iter().map(RunResultRow::from).collect(),
        failed,
    };

    html_response(StatusCode::OK, tpl.render().context(TemplateSnafu)?)
}
