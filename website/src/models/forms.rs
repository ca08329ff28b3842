use serde::{Deserialize, Serialize};
use validator::Validate;

/// Upper bound on pasted token text
pub const MAX_TOKENS_TEXT_LEN: u64 = 100_000;

#[derive(Clone, Deserialize, Serialize, Validate)]
pub struct AddTokensFormData {
    #[validate(length(max = MAX_TOKENS_TEXT_LEN))]
    pub tokens: String,

    #[validate(length(min = 1))]
    pub csrf_token: String,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct CsrfFormData {
    pub csrf_token: String,
}
