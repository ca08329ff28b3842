use validator::{ValidationError, ValidationErrors};

pub fn flatten_errors(errors: &ValidationErrors) -> String {
    // Collect field keys first
    let mut fields: Vec<String> = errors
        .field_errors()
        .keys()
        .map(|k| k.to_string())
        .collect();

    // Ensure error fields are sorted ascending
    fields.sort();

    let field_errors = errors.field_errors();
    let messages: Vec<String> = fields
        .into_iter()
        .map(|k| {
            let Some(item) = field_errors.get(k.as_str()) else {
                return format!("{}: invalid", k);
            };
            let msgs: Vec<String> = item.iter().map(error_to_string).collect();
            format!("{}: {}", k, msgs.join(", "))
        })
        .collect();

    messages.join(", ")
}

fn error_to_string(error: &ValidationError) -> String {
    match error.code.as_ref() {
        "length" => match (error.params.get("min"), error.params.get("max")) {
            (Some(min), Some(max)) => {
                format!("must be between {} and {} characters", min, max)
            }
            (Some(min), None) => format!("must be at least {} characters", min),
            (None, Some(max)) => format!("must be at most {} characters", max),
            _ => "invalid length".to_string(),
        },
        "required" => "required".to_string(),
        _ => "invalid".to_string(),
    }
}
