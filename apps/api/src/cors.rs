//! CORS gate. Runs in front of every route.
//!
//! Allowed origins are echoed back; anything else (including no `Origin`
//! header at all) gets the literal `null`. Preflight requests are answered
//! here with an empty 200 and never reach a handler.

use std::collections::HashSet;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::state::AppState;

pub const ALLOWED_METHODS: &str = "GET,OPTIONS,PATCH,DELETE,POST,PUT";
pub const ALLOWED_HEADERS: &str = "X-CSRF-Token, X-Requested-With, Accept, Accept-Version, \
    Content-Length, Content-MD5, Content-Type, Date, X-Api-Version";

/// Writes the CORS response headers for a request from `origin`.
pub fn apply_cors_headers(
    headers: &mut HeaderMap,
    origin: Option<&HeaderValue>,
    allowed_origins: &HashSet<String>,
) {
    let matched = origin.filter(|value| {
        value
            .to_str()
            .map(|o| allowed_origins.contains(o))
            .unwrap_or(false)
    });
    if let (None, Some(value)) = (matched, origin) {
        debug!(origin = ?value, "Origin not in allow-list");
    }
    let allow_origin = matched
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("null"));

    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
}

/// `true` when the request is a preflight and processing must stop.
pub fn is_preflight(method: &Method) -> bool {
    *method == Method::OPTIONS
}

/// Middleware: short-circuits preflights, adds CORS headers to every response.
pub async fn cors_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let origin = request.headers().get(header::ORIGIN).cloned();

    let mut response = if is_preflight(request.method()) {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    apply_cors_headers(
        response.headers_mut(),
        origin.as_ref(),
        &state.config.allowed_origins,
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allow_list() -> HashSet<String> {
        ["https://app.example".to_string()].into_iter().collect()
    }

    fn headers_for(origin: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let origin = origin.map(HeaderValue::from_static);
        apply_cors_headers(&mut headers, origin.as_ref(), &allow_list());
        headers
    }

    #[test]
    fn test_allowed_origin_is_echoed() {
        let headers = headers_for(Some("https://app.example"));
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example"
        );
    }

    #[test]
    fn test_unknown_origin_gets_literal_null() {
        let headers = headers_for(Some("https://evil.example"));
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "null");
    }

    #[test]
    fn test_origin_match_is_case_sensitive() {
        let headers = headers_for(Some("https://APP.example"));
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "null");
    }

    #[test]
    fn test_missing_origin_gets_literal_null() {
        let headers = headers_for(None);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "null");
    }

    #[test]
    fn test_fixed_headers_always_set() {
        for origin in [None, Some("https://app.example"), Some("https://other.example")] {
            let headers = headers_for(origin);
            assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
            assert_eq!(
                headers[header::ACCESS_CONTROL_ALLOW_METHODS],
                "GET,OPTIONS,PATCH,DELETE,POST,PUT"
            );
            let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS].to_str().unwrap();
            for name in ["X-CSRF-Token", "Content-Type", "X-Api-Version", "Content-MD5"] {
                assert!(allowed.contains(name), "missing {name}");
            }
        }
    }

    #[test]
    fn test_only_options_is_preflight() {
        assert!(is_preflight(&Method::OPTIONS));
        assert!(!is_preflight(&Method::POST));
        assert!(!is_preflight(&Method::GET));
    }
}
