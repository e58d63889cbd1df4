use axum::http::{HeaderMap, header};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";
/// Name of the cookie carrying the pending OAuth `state` value.
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Reads a cookie value from the request headers.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .map(|s| s.trim())
        .find_map(|cookie| {
            let (key, val) = cookie.split_once('=')?;
            if key.trim() == name && !val.trim().is_empty() {
                Some(val.trim())
            } else {
                None
            }
        })
}

/// `Set-Cookie` value for a fresh session.
///
/// SameSite=Lax so the cookie survives the top-level redirect back from an
/// OAuth provider.
pub fn session_cookie(token: &str, ttl_hours: i64, secure: bool) -> String {
    build_cookie(SESSION_COOKIE, token, ttl_hours * 3600, secure)
}

pub fn clear_session_cookie(secure: bool) -> String {
    build_cookie(SESSION_COOKIE, "", 0, secure)
}

pub fn oauth_state_cookie(state: &str, secure: bool) -> String {
    build_cookie(OAUTH_STATE_COOKIE, state, 600, secure)
}

pub fn clear_oauth_state_cookie(secure: bool) -> String {
    build_cookie(OAUTH_STATE_COOKIE, "", 0, secure)
}

fn build_cookie(name: &str, value: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, value, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; session=abc-123; lang=en"),
        );
        assert_eq!(get_cookie(&headers, SESSION_COOKIE), Some("abc-123"));
        assert_eq!(get_cookie(&headers, "lang"), Some("en"));
        assert_eq!(get_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_value_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("session="));
        assert_eq!(get_cookie(&headers, SESSION_COOKIE), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let c = session_cookie("tok", 3, false);
        assert_eq!(c, "session=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=10800");
        assert!(session_cookie("tok", 3, true).ends_with("; Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }
}
