use axum::http::{header, HeaderMap};

pub const SESSION_TOKEN_COOKIE: &str = "session_token";

/// Session cookie for browser clients that cannot set an Authorization
/// header. SameSite=Lax is enough for a same-origin frontend.
pub fn build_session_cookie(token: &str, max_age_seconds: u64) -> String {
    format!(
        "{SESSION_TOKEN_COOKIE}={token}; Path=/; Max-Age={max_age_seconds}; HttpOnly; SameSite=Lax"
    )
}

pub fn build_clear_cookie() -> String {
    format!(
        "{SESSION_TOKEN_COOKIE}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Lax"
    )
}

pub fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|cookie_header| {
            cookie_header.split(';').find_map(|cookie| {
                let mut parts = cookie.trim().splitn(2, '=');
                let key = parts.next()?.trim();
                let value = parts.next()?.trim();
                if key == name {
                    Some(value.to_string())
                } else {
                    None
                }
            })
        })
}
