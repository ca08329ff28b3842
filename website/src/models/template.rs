use crate::run::AppState;

#[derive(Clone)]
pub struct TemplateData {
    pub title: String,
    pub schedule_time: String,
}

impl TemplateData {
    pub fn new(state: &AppState) -> TemplateData {
        TemplateData {
            title: String::from(""),
            schedule_time: state.config.schedule.at.to_string(),
        }
    }
}
