use askama::Template;
use axum::{
    body::Body,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use snafu::ResultExt;

use crate::{
    Result,
    error::TemplateSnafu,
    models::{NoticeQuery, TemplateData},
    run::AppState,
    services::{
        logs::has_log_svc,
        token::{
            ADD_TOKENS_FORM, DELETE_TOKEN_FORM, RUN_ALL_FORM, TEST_TOKEN_FORM,
            create_csrf_token_svc,
        },
        tokens::list_tokens_svc,
    },
};

use super::html_response;

struct TokenRow {
    index: usize,
    value: String,
}

struct FormTokens {
    add: String,
    delete: String,
    test: String,
    run: String,
}

#[derive(Template)]
#[template(path = "pages/index.html")]
struct IndexTemplate {
    t: TemplateData,
    tokens: Vec<TokenRow>,
    forms: FormTokens,
    notice: Option<String>,
    warning: Option<String>,
    has_log: bool,
}

pub async fn index_handler(
    State(state): State<AppState>,
    Query(query): Query<NoticeQuery>,
) -> Result<Response<Body>> {
    let secret = state.config.csrf_secret.as_str();

    let mut t = TemplateData::new(&state);
    t.title = String::from("Tokens");

    let tokens = list_tokens_svc(&state)
        .await
        .into_iter()
        .enumerate()
        .map(|(index, value)| TokenRow { index, value })
        .collect();

    let forms = FormTokens {
        add: create_csrf_token_svc(ADD_TOKENS_FORM, secret)?,
        delete: create_csrf_token_svc(DELETE_TOKEN_FORM, secret)?,
        test: create_csrf_token_svc(TEST_TOKEN_FORM, secret)?,
        run: create_csrf_token_svc(RUN_ALL_FORM, secret)?,
    };

    let tpl = IndexTemplate {
        t,
        tokens,
        forms,
        notice: query.notice,
        warning: query.warning,
        has_log: has_log_svc(&state).await,
    };

    html_response(StatusCode::OK, tpl.render().context(TemplateSnafu)?)
}
