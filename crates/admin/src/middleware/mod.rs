//! HTTP middleware for admin.
//!
//! - [`session`]: tower-sessions layer backed by `PostgreSQL`
//! - [`auth`]: [`RequireAdminSession`] extractor for read endpoints
//! - [`with_security_headers`]: strict response headers for every route

pub mod auth;
pub mod session;

use axum::Router;
use axum::http::{HeaderValue, header};
use tower_http::set_header::SetResponseHeaderLayer;

pub use auth::RequireAdminSession;
pub use session::create_session_layer;

/// Add security headers to every response of `router`.
///
/// The service only serves JSON, so the CSP denies everything.
pub fn with_security_headers<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
}
