use validator::Validate;

use autovote::token_store::AddOutcome;
use autovote::utils::token_prefix;
use autovote::validators::flatten_errors;
use autovote::vote::VoteOutcome;

use crate::Result;
use crate::error::ValidationSnafu;
use crate::models::{AddTokensFormData, CsrfFormData};
use crate::run::AppState;
use crate::services::token::{
    ADD_TOKENS_FORM, DELETE_TOKEN_FORM, TEST_TOKEN_FORM, verify_form_token,
};

/// Result of a one-off vote for a single stored token
pub struct TestedToken {
    pub index: usize,
    pub token_prefix: String,
    pub outcome: VoteOutcome,
}

pub async fn list_tokens_svc(state: &AppState) -> Vec<String> {
    state.store.load().await
}

pub async fn add_tokens_svc(state: &AppState, form: &AddTokensFormData) -> Result<AddOutcome> {
    if let Err(err) = form.validate() {
        return ValidationSnafu {
            msg: flatten_errors(&err),
        }
        .fail();
    }

    verify_form_token(&form.csrf_token, &state.config.csrf_secret, ADD_TOKENS_FORM)?;

    let outcome = state.store.add_from_text(&form.tokens).await?;
    state
        .log
        .append(&format!("UI: Added {} tokens", outcome.added))
        .await?;

    Ok(outcome)
}

pub async fn delete_token_svc(state: &AppState, index: usize, form: &CsrfFormData) -> Result<()> {
    verify_form_token(
        &form.csrf_token,
        &state.config.csrf_secret,
        DELETE_TOKEN_FORM,
    )?;

    state.store.delete(index).await?;
    state
        .log
        .append(&format!("UI: Deleted token index {}", index))
        .await?;

    Ok(())
}

pub async fn test_token_svc(
    state: &AppState,
    index: usize,
    form: &CsrfFormData,
) -> Result<TestedToken> {
    verify_form_token(&form.csrf_token, &state.config.csrf_secret, TEST_TOKEN_FORM)?;

    let token = state.store.get(index).await?;
    let outcome = state.client.submit(&token).await?;

    Ok(TestedToken {
        index,
        token_prefix: token_prefix(&token),
        outcome,
    })
}
