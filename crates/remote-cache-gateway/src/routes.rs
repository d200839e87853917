//! HTTP route definitions
//!
//! Every request goes through one dispatcher so the matching order stays
//! explicit: prefix check, then the exact routes in [`EXACT_ROUTES`], then the
//! artifact fallback.

use crate::config::API_PREFIX;
use crate::{handlers, middleware, ApiError, AppState};
use axum::{
    extract::State,
    http::{header, HeaderMap, Method, Uri},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Classification of an inbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision<'a> {
    /// `GET <prefix>/status`
    Status,
    /// `POST <prefix>/events`
    Events,
    /// `OPTIONS <prefix>/<hash>`
    Artifact { hash: &'a str },
    /// Anything else, answered with 404
    Unmatched,
}

/// Exact `(method, path below the prefix)` routes, checked in order
pub const EXACT_ROUTES: &[(&str, &str, RouteDecision<'static>)] = &[
    ("GET", "/status", RouteDecision::Status),
    ("POST", "/events", RouteDecision::Events),
];

impl<'a> RouteDecision<'a> {
    /// Classify a request. First match wins.
    ///
    /// `raw_path` is the path as received and is used for the exact routes.
    /// `canonical_path` is the normalized path used for the prefix check and
    /// the hash segment.
    pub fn classify(method: &Method, raw_path: &str, canonical_path: &'a str) -> Self {
        if !canonical_path.starts_with(API_PREFIX) {
            return Self::Unmatched;
        }

        let below_prefix = raw_path.strip_prefix(API_PREFIX);
        if let Some(&(_, _, decision)) = EXACT_ROUTES
            .iter()
            .find(|(m, p, _)| method.as_str() == *m && below_prefix == Some(*p))
        {
            return decision;
        }

        // The real verb travels in Access-Control-Request-Method; the request
        // itself must be the browser preflight.
        match canonical_path.split('/').nth(3) {
            Some(hash) if !hash.is_empty() && *method == Method::OPTIONS => Self::Artifact { hash },
            _ => Self::Unmatched,
        }
    }
}

/// Rebuild `<proto>://<host><path>` and return its normalized path.
///
/// The forwarded headers only feed URL parsing, never authorization.
pub fn canonical_path(headers: &HeaderMap, raw_path: &str) -> Option<String> {
    let proto = header_str(headers, "x-forwarded-proto")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("https");
    let host = header_str(headers, header::HOST.as_str())
        .filter(|v| !v.is_empty())
        .unwrap_or("localhost");

    url::Url::parse(&format!("{proto}://{host}{raw_path}"))
        .ok()
        .map(|location| location.path().to_string())
}

/// Header value as UTF-8, if present and valid
pub(crate) fn header_str<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .fallback(dispatch)
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Single entry point for every request
async fn dispatch(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let raw_path = uri.path();
    let canonical = canonical_path(&headers, raw_path).ok_or(ApiError::NotFound)?;

    match RouteDecision::classify(&method, raw_path, &canonical) {
        RouteDecision::Status => Ok(handlers::status().await.into_response()),
        RouteDecision::Events => Ok(handlers::events().await.into_response()),
        RouteDecision::Artifact { hash } => handlers::artifact_grant(&state, hash, &headers).await,
        RouteDecision::Unmatched => Err(ApiError::NotFound),
    }
}
