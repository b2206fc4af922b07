// ABOUTME: Access gate middleware for request authorization
// ABOUTME: Lets public paths through and requires the access cookie everywhere else

use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json as ResponseJson, Redirect, Response},
};
use bulletin_core::{ACCESS_COOKIE_NAME, ACCESS_COOKIE_VALUE};
use tracing::debug;

use crate::response::ApiResponse;

/// Static assets and uploaded files
const STATIC_PREFIXES: &[&str] = &["/uploads", "/favicon", "/public"];

/// Pages reachable before access is granted
const PUBLIC_PAGES: &[&str] = &["/access", "/access-admin"];

/// API endpoints reachable before access is granted
const PUBLIC_API_PREFIXES: &[&str] = &["/api/access/", "/api/health"];

/// Access cookie lifetime (30 days)
pub const ACCESS_COOKIE_MAX_AGE: u64 = 60 * 60 * 24 * 30;

/// Check whether a path is reachable without the access cookie
pub fn is_public_path(path: &str) -> bool {
    STATIC_PREFIXES
        .iter()
        .chain(PUBLIC_PAGES)
        .chain(PUBLIC_API_PREFIXES)
        .any(|prefix| path.starts_with(prefix))
}

/// Look for `maistro_access=granted` among the request cookies
pub fn has_access_cookie(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(name, value)| name == ACCESS_COOKIE_NAME && value == ACCESS_COOKIE_VALUE)
}

/// `Set-Cookie` value granting access
pub fn access_cookie(secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        ACCESS_COOKIE_NAME, ACCESS_COOKIE_VALUE, ACCESS_COOKIE_MAX_AGE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn access_cookie_header(secure: bool) -> Option<HeaderValue> {
    HeaderValue::from_str(&access_cookie(secure)).ok()
}

/// Access gate middleware
pub async fn access_gate(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();

    if is_public_path(&path) {
        return next.run(request).await;
    }

    if has_access_cookie(request.headers()) {
        return next.run(request).await;
    }

    debug!(path = %path, "Request without access cookie");

    if path.starts_with("/api") {
        return (
            StatusCode::UNAUTHORIZED,
            ResponseJson(ApiResponse::<()>::error("Access required".to_string())),
        )
            .into_response();
    }

    Redirect::temporary(&format!("/access?next={}", urlencoding::encode(&path))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths() {
        assert!(is_public_path("/uploads/123-a.png"));
        assert!(is_public_path("/favicon.ico"));
        assert!(is_public_path("/access"));
        assert!(is_public_path("/access-admin"));
        assert!(is_public_path("/api/access/verify"));
        assert!(is_public_path("/api/health"));

        assert!(!is_public_path("/"));
        assert!(!is_public_path("/api/initiatives"));
        assert!(!is_public_path("/api/accessible"));
    }

    #[test]
    fn test_cookie_detection() {
        let mut headers = HeaderMap::new();
        assert!(!has_access_cookie(&headers));

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; maistro_access=granted"),
        );
        assert!(has_access_cookie(&headers));

        headers.insert(header::COOKIE, HeaderValue::from_static("maistro_access=pending"));
        assert!(!has_access_cookie(&headers));
    }

    #[test]
    fn test_access_cookie_attributes() {
        assert_eq!(
            access_cookie(true),
            "maistro_access=granted; Path=/; Max-Age=2592000; HttpOnly; SameSite=Lax; Secure"
        );
        assert!(!access_cookie(false).contains("Secure"));
    }
}
