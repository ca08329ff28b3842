use askama::Template;
use axum::{
    Form,
    body::Body,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use snafu::ResultExt;

use crate::{
    Error, Result,
    error::TemplateSnafu,
    models::{AddTokensFormData, CsrfFormData, TemplateData, TokenParams},
    run::AppState,
    services::tokens::{add_tokens_svc, delete_token_svc, test_token_svc},
};

use super::html_response;

#[derive(Template)]
#[template(path = "pages/test_result.html")]
struct TestResultTemplate {
    t: TemplateData,
    index: usize,
    token_prefix: String,
    ok: bool,
    status: String,
    body: String,
}

pub async fn post_add_tokens_handler(
    State(state): State<AppState>,
    Form(payload): Form<AddTokensFormData>,
) -> Result<Response<Body>> {
    match add_tokens_svc(&state, &payload).await {
        Ok(outcome) => Ok(redirect_home(
            "notice",
            &format!("Added {} tokens. Total: {}", outcome.added, outcome.total),
        )),
        // Bad input stays on the page as a warning
        Err(Error::Validation { msg }) => Ok(redirect_home("warning", &msg)),
        Err(err) => Err(err),
    }
}

pub async fn post_delete_token_handler(
    State(state): State<AppState>,
    Path(params): Path<TokenParams>,
    Form(payload): Form<CsrfFormData>,
) -> Result<Response<Body>> {
    delete_token_svc(&state, params.index, &payload).await?;
    Ok(redirect_home(
        "notice",
        &format!("Deleted token #{}", params.index),
    ))
}

pub async fn post_test_token_handler(
    State(state): State<AppState>,
    Path(params): Path<TokenParams>,
    Form(payload): Form<CsrfFormData>,
) -> Result<Response<Body>> {
    let tested = test_token_svc(&state, params.index, &payload).await?;

    let mut t = TemplateData::new(&state);
    t.title = String::from("Test result");

    let tpl = TestResultTemplate {
        t,
        index: tested.index,
        token_prefix: tested.token_prefix,
        ok: tested.outcome.ok,
        status: tested
            .outcome
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string()),
        body: tested.outcome.body.to_display(),
    };

    html_response(StatusCode::OK, tpl.render().context(TemplateSnafu)?)
}

fn redirect_home(key: &str, message: &str) -> Response<Body> {
    let url = format!("/?{}={}", key, urlencoding::encode(message));
    Redirect::to(&url).into_response()
}
