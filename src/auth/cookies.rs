//! Session cookie codec. Tokens travel both in the JSON body and as
//! HttpOnly/Secure cookies; this module owns the cookie names and the
//! `Cookie`/`Set-Cookie` header plumbing.

use axum::http::{header, HeaderMap, HeaderValue};

use crate::auth::dto::TokenPair;
use crate::auth::jwt::JwtKeys;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

fn session_cookie(name: &str, value: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; Secure; SameSite=Lax",
        name, value, max_age_secs
    )
}

fn expired_cookie(name: &str) -> String {
    session_cookie(name, "", 0)
}

/// Headers carrying both token cookies, lifetimes matching the token TTLs.
pub fn token_headers(keys: &JwtKeys, pair: &TokenPair) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append_set_cookie(
        &mut headers,
        &session_cookie(ACCESS_COOKIE, &pair.access_token, keys.access_ttl.as_secs()),
    );
    append_set_cookie(
        &mut headers,
        &session_cookie(
            REFRESH_COOKIE,
            &pair.refresh_token,
            keys.refresh_ttl.as_secs(),
        ),
    );
    headers
}

/// Headers expiring both token cookies (logout).
pub fn clear_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    append_set_cookie(&mut headers, &expired_cookie(ACCESS_COOKIE));
    append_set_cookie(&mut headers, &expired_cookie(REFRESH_COOKIE));
    headers
}

fn append_set_cookie(headers: &mut HeaderMap, cookie: &str) {
    // Token values are base64url, always header-safe.
    let value: HeaderValue = cookie.parse().unwrap();
    headers.append(header::SET_COOKIE, value);
}

/// Look a named cookie up in the request's `Cookie` header.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}
