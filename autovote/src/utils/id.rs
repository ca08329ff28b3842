use uuid::Uuid;

const REQUEST_ID_LEN: usize = 16;

/// Random id sent along with each vote for tracing on the remote side
pub fn generate_request_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(REQUEST_ID_LEN);
    id
}

/// Random secret used when none is configured
pub fn generate_secret() -> String {
    format!("sec_{}", Uuid::now_v7().as_simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_id() {
        let id = generate_request_id();
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        // Two consecutive ids should never collide
        assert_ne!(id, generate_request_id());
    }

    #[test]
    fn test_generate_secret() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 36);
        assert!(secret.starts_with("sec_"));
    }
}
