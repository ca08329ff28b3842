use autovote::batch::{RunResult, Trigger};

use crate::Result;
use crate::models::CsrfFormData;
use crate::run::AppState;
use crate::services::token::{RUN_ALL_FORM, verify_form_token};

pub async fn run_all_svc(state: &AppState, form: &CsrfFormData) -> Result<Vec<RunResult>> {
    verify_form_token(&form.csrf_token, &state.config.csrf_secret, RUN_ALL_FORM)?;

    let results = state.runner.run_stored(Trigger::Manual).await?;
    Ok(results)
}
