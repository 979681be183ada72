//! Candidate key extraction.
//!
//! # Responsibilities
//! - Read the caller's key from the `x-functions-key` header
//! - Fall back to the `code` query parameter
//!
//! # Design Decisions
//! - Header wins whenever it is present, even if its value is unusable
//! - Header values are read as UTF-8, matching what the query path decodes
//! - Header names are case-insensitive (`HeaderMap` normalizes them)
//! - Query parameter names are matched exactly, values are percent-decoded

use axum::http::{HeaderMap, HeaderName, Request};

/// Header carrying the caller's key.
pub const FUNCTIONS_KEY_HEADER: HeaderName = HeaderName::from_static("x-functions-key");

/// Query parameter carrying the caller's key.
pub const FUNCTIONS_KEY_QUERY: &str = "code";

/// Pull the candidate key out of request headers or the raw query string.
pub fn extract(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    if let Some(value) = headers.get_all(&FUNCTIONS_KEY_HEADER).iter().next() {
        // A present header blocks the query fallback. Only bytes that are not
        // valid UTF-8 count as absent.
        return std::str::from_utf8(value.as_bytes()).ok().map(str::to_owned);
    }

    query.and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(name, _)| name == FUNCTIONS_KEY_QUERY)
            .map(|(_, value)| value.into_owned())
    })
}

/// Convenience wrapper over [`extract`] for a full request.
pub fn extract_from_request<B>(request: &Request<B>) -> Option<String> {
    extract(request.headers(), request.uri().query())
}
