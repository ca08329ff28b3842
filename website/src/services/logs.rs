use snafu::OptionExt;

use crate::Result;
use crate::error::NotFoundSnafu;
use crate::run::AppState;

pub const LOG_DOWNLOAD_NAME: &str = "run_tokens.log";

pub async fn read_log_svc(state: &AppState) -> Result<String> {
    let contents = state.log.read_all().await?;
    contents.context(NotFoundSnafu {
        msg: "No log yet.",
    })
}

pub async fn has_log_svc(state: &AppState) -> bool {
    tokio::fs::try_exists(state.log.path())
        .await
        .unwrap_or(false)
}

/// File name offered to the browser for the log download
pub fn log_download_name(state: &AppState) -> String {
    state
        .log
        .path()
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(LOG_DOWNLOAD_NAME)
        .to_string()
}
