use serde::Deserialize;

#[derive(Deserialize)]
pub struct TokenParams {
    pub index: usize,
}

/// Flash messages carried across a redirect
#[derive(Default, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
    pub warning: Option<String>,
}
