/// Extracts the session token from an `Authorization` header value.
///
/// Accepts the bare token or `Bearer <token>`. Returns `None` for a missing or blank value.
pub fn session_token_from_header(value: Option<&str>) -> Option<&str> {
    let value = value?.trim();
    if value.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => value,
    };
    if token.is_empty() || token.contains(char::is_whitespace) {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_bearer_tokens_are_accepted() {
        assert_eq!(session_token_from_header(Some("abc123")), Some("abc123"));
        assert_eq!(session_token_from_header(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(session_token_from_header(Some("bearer  abc123 ")), Some("abc123"));
    }

    #[test]
    fn blank_or_malformed_values_are_rejected() {
        assert_eq!(session_token_from_header(None), None);
        assert_eq!(session_token_from_header(Some("   ")), None);
        assert_eq!(session_token_from_header(Some("Bearer ")), None);
        assert_eq!(session_token_from_header(Some("Basic a b")), None);
    }
}
