/// Number of leading token characters allowed to reach logs and results
pub const TOKEN_PREFIX_LEN: usize = 8;

/// Keeps at most `max_chars` characters without adding an ellipsis
pub fn take_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

/// Redacted form of a bearer token, the only form that may be persisted
pub fn token_prefix(token: &str) -> String {
    format!("{}...", take_chars(token, TOKEN_PREFIX_LEN))
}
